use crate::builtin::{Builtin, BuiltinOutput};
use crate::command::{Command, CommandError, ExitCode, Outcome};
use crate::env::Environment;
use crate::error::{ExecError, ExternalFailure};
use crate::external::ExternalCommand;
use crate::parser::parse_command_line;
use crate::session::Session;
use crate::substitute::substitute_command;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{ErrorKind, Write};
use tracing::{debug, error};

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns one [`Session`]: the variable store, the working
/// directory, the previous-output buffer and the last return code. Lines are
/// executed one at a time; stages within a line run strictly in order and hand
/// data to each other only through the previous-output buffer.
///
/// Example
/// ```
/// use pipesh::{Interpreter, Outcome};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let outcome = sh.run_line("X=world | echo hello $X", &mut out).unwrap();
/// assert_eq!(outcome, Outcome::Continue);
/// assert_eq!(String::from_utf8(out).unwrap(), "hello world\n");
/// ```
pub struct Interpreter {
    session: Session,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self {
            session: Session::new(env),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Last return code recorded by the session.
    pub fn return_code(&self) -> ExitCode {
        self.session.return_code()
    }

    /// Parse and execute one input line, emitting its final output to `out`.
    ///
    /// Whether the pipeline completes or aborts, the previous-output left by
    /// the last stage that ran is written once and then cleared. `exit` skips
    /// the emission, still clears the buffer, and returns [`Outcome::Exit`].
    pub fn run_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Outcome, ExecError> {
        let commands = parse_command_line(line);
        if commands.is_empty() {
            return Ok(Outcome::Continue);
        }
        self.evaluate_commands(&commands, out)
    }

    /// Execute already parsed stages; see [`Interpreter::run_line`].
    pub fn evaluate_commands(
        &mut self,
        commands: &[Command],
        out: &mut dyn Write,
    ) -> Result<Outcome, ExecError> {
        let result = self.run_stages(commands);
        if let Ok(Outcome::Exit(_)) = result {
            self.session.reset();
            return result;
        }

        let emitted = self.emit(out);
        self.session.reset();
        let outcome = result?;
        emitted?;
        Ok(outcome)
    }

    fn run_stages(&mut self, commands: &[Command]) -> Result<Outcome, ExecError> {
        for (stage, command) in commands.iter().enumerate() {
            let command = substitute_command(&self.session.env, command)?;
            debug!(stage, name = %command.name, args = ?command.arguments, "running stage");

            if let Some((name, value)) = command.as_assignment() {
                debug!(name, value, "assignment");
                self.session.env.set_var(name, value);
                continue;
            }

            let outcome = match Builtin::lookup(&command.name) {
                Some(builtin) => self.run_builtin(builtin, &command)?,
                None => self.run_external(&command)?,
            };
            if let Outcome::Exit(code) = outcome {
                debug!(code, "exit requested");
                return Ok(outcome);
            }
        }
        Ok(Outcome::Continue)
    }

    fn run_builtin(&mut self, builtin: Builtin, command: &Command) -> Result<Outcome, ExecError> {
        match builtin.run(&command.arguments, &mut self.session) {
            Ok(BuiltinOutput::Text(text)) => {
                self.session.set_previous_output(text);
                Ok(Outcome::Continue)
            }
            Ok(BuiltinOutput::Exit(code)) => Ok(Outcome::Exit(code)),
            Err(err) => {
                self.session.set_return_code(1);
                Err(builtin_failure(&command.name, err))
            }
        }
    }

    fn run_external(&mut self, command: &Command) -> Result<Outcome, ExecError> {
        let name = command.name.clone();
        let launched = ExternalCommand::new(&command.name, &command.arguments)
            .execute(&self.session.env.current_dir);

        let output = match launched {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.session.set_return_code(127);
                return Err(ExecError::NotFound(name));
            }
            Err(e) => {
                self.session.set_return_code(1);
                return Err(ExecError::Unexpected {
                    name,
                    cause: e.into(),
                });
            }
        };

        debug!(name = %name, code = output.code, "external command finished");
        if !output.stderr.is_empty() {
            debug!(name = %name, stderr = %output.stderr.trim_end(), "external stderr");
        }

        self.session.set_return_code(output.code);
        let success = output.success();
        self.session.set_previous_output(output.stdout);
        if success {
            Ok(Outcome::Continue)
        } else {
            Err(ExecError::External {
                name,
                cause: ExternalFailure {
                    code: output.code,
                    stderr: output.stderr,
                },
            })
        }
    }

    fn emit(&self, out: &mut dyn Write) -> std::io::Result<()> {
        match self.session.previous_output() {
            Some(text) if !text.is_empty() => {
                out.write_all(text.as_bytes())?;
                if !text.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
                out.flush()
            }
            _ => Ok(()),
        }
    }

    /// Interactive Read-Eval-Print Loop.
    ///
    /// Returns the code the process should exit with: the one carried by
    /// `exit`, or the last return code when input ends.
    pub fn repl(&mut self, prompt: &str) -> rustyline::Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = std::io::stdout();

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    match self.run_line(&line, &mut stdout) {
                        Ok(Outcome::Continue) => {}
                        Ok(Outcome::Exit(code)) => {
                            println!("{}", exit_notice(code));
                            return Ok(code);
                        }
                        Err(err) => error!("{}", err),
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!();
                    return Ok(self.return_code());
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Line printed by the read loop when `exit` ends the session.
fn exit_notice(code: ExitCode) -> String {
    format!("Exiting with code {}", code)
}

/// Sort a builtin failure into a usage error or an unexpected one.
fn builtin_failure(name: &str, err: anyhow::Error) -> ExecError {
    let name = name.to_string();
    match err.downcast::<CommandError>() {
        Ok(cause) => ExecError::Builtin { name, cause },
        Err(cause) => ExecError::Unexpected { name, cause },
    }
}

impl Default for Interpreter {
    /// Create an interpreter whose variables are seeded from the process environment.
    fn default() -> Self {
        Self::new(Environment::new())
    }
}
