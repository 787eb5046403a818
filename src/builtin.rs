use crate::command::{CommandError, ExitCode};
use crate::env::Environment;
use crate::session::Session;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use regex::{Regex, RegexBuilder};
use std::fs;
use std::io::ErrorKind;

/// Result of a successful builtin invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BuiltinOutput {
    /// Text that becomes the new previous-output.
    Text(String),
    /// `exit` ran; the process should terminate with this code.
    Exit(ExitCode),
}

/// The closed set of commands implemented inside the interpreter.
///
/// Lookup is a static match on the name; there is no runtime registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cat,
    Cd,
    Echo,
    Exit,
    Grep,
    Ls,
    Pwd,
    Wc,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Cat,
        Builtin::Cd,
        Builtin::Echo,
        Builtin::Exit,
        Builtin::Grep,
        Builtin::Ls,
        Builtin::Pwd,
        Builtin::Wc,
    ];

    /// Find the builtin registered under `name`.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cat => Cat::name(),
            Builtin::Cd => Cd::name(),
            Builtin::Echo => Echo::name(),
            Builtin::Exit => Exit::name(),
            Builtin::Grep => Grep::name(),
            Builtin::Ls => Ls::name(),
            Builtin::Pwd => Pwd::name(),
            Builtin::Wc => Wc::name(),
        }
    }

    /// Parse `args` for this builtin and run it against the session.
    ///
    /// Usage problems come back as a [`CommandError`] inside the
    /// [`anyhow::Error`]; any other error is an unexpected failure.
    pub(crate) fn run(self, args: &[String], session: &mut Session) -> Result<BuiltinOutput> {
        match self {
            Builtin::Cat => invoke::<Cat>(args, session),
            Builtin::Cd => invoke::<Cd>(args, session),
            Builtin::Echo => invoke::<Echo>(args, session),
            Builtin::Exit => invoke::<Exit>(args, session),
            Builtin::Grep => invoke::<Grep>(args, session),
            Builtin::Ls => invoke::<Ls>(args, session),
            Builtin::Pwd => invoke::<Pwd>(args, session),
            Builtin::Wc => invoke::<Wc>(args, session),
        }
    }
}

/// What argument parsing produced: a runnable command or a help text.
enum Invocation<T> {
    Run(T),
    Help(String),
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins without implicit stdin ignore the previous-output buffer. Those
/// with it (`cat`, `wc`, `grep`) read it when no file operand is given.
trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    fn parse(args: &[&str]) -> Result<Invocation<Self>>;

    fn execute(self, session: &mut Session) -> Result<BuiltinOutput>;
}

fn invoke<T: BuiltinCommand>(args: &[String], session: &mut Session) -> Result<BuiltinOutput> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match T::parse(&args)? {
        Invocation::Run(cmd) => cmd.execute(session),
        Invocation::Help(text) => Ok(BuiltinOutput::Text(text)),
    }
}

/// Parse with [`argh`], turning its early exits into help text or usage errors.
fn parse_with_argh<T: FromArgs>(name: &str, args: &[&str]) -> Result<Invocation<T>> {
    match T::from_args(&[name], args) {
        Ok(cmd) => Ok(Invocation::Run(cmd)),
        Err(EarlyExit {
            output,
            status: Ok(()),
        }) => Ok(Invocation::Help(output)),
        Err(EarlyExit {
            output,
            status: Err(()),
        }) => Err(usage(format!("{}: {}", name, output.trim_end()))),
    }
}

fn usage(message: impl Into<String>) -> anyhow::Error {
    CommandError::new(message).into()
}

/// Read a file operand relative to the session working directory.
fn read_operand(env: &Environment, name: &str) -> Result<String> {
    fs::read_to_string(env.resolve(name)).map_err(|e| match e.kind() {
        ErrorKind::NotFound => usage(format!("File not found: {}", name)),
        _ => usage(format!("Error reading file {}: {}", name, e)),
    })
}

/// Implicit stdin for builtins that fall back on it, rejecting an empty one.
fn non_empty(input: Option<&str>) -> Option<&str> {
    input.filter(|s| !s.is_empty())
}

#[derive(FromArgs)]
/// Concatenate files, or pass the previous output through.
pub struct Cat {
    #[argh(positional)]
    /// files to concatenate; the previous output is used when omitted.
    pub files: Vec<String>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn parse(args: &[&str]) -> Result<Invocation<Self>> {
        parse_with_argh(Self::name(), args)
    }

    fn execute(self, session: &mut Session) -> Result<BuiltinOutput> {
        if self.files.is_empty() {
            return match session.take_implicit_stdin() {
                Some(content) if !content.is_empty() => Ok(BuiltinOutput::Text(content)),
                _ => Err(usage("Usage: cat [FILE]")),
            };
        }

        let mut content = String::new();
        for name in &self.files {
            content.push_str(&read_operand(&session.env, name)?);
        }
        Ok(BuiltinOutput::Text(content))
    }
}

#[derive(FromArgs)]
/// Count lines, words and bytes.
pub struct Wc {
    #[argh(positional)]
    /// file to count; the previous output is used when omitted.
    pub files: Vec<String>,
}

impl Wc {
    fn count(text: &str) -> String {
        let lines = text.lines().count();
        let words = text.split_whitespace().count();
        let bytes = text.len();
        format!("Lines: {}, Words: {}, Bytes: {}", lines, words, bytes)
    }
}

impl BuiltinCommand for Wc {
    fn name() -> &'static str {
        "wc"
    }

    fn parse(args: &[&str]) -> Result<Invocation<Self>> {
        parse_with_argh(Self::name(), args)
    }

    fn execute(self, session: &mut Session) -> Result<BuiltinOutput> {
        let counts = match self.files.split_first() {
            None => {
                let text = non_empty(session.implicit_stdin()).ok_or_else(|| usage("Usage: wc [FILE]"))?;
                Self::count(text)
            }
            Some((first, rest)) => {
                if !rest.is_empty() {
                    tracing::warn!(ignored = ?rest, "wc counts only its first file");
                }
                Self::count(&read_operand(&session.env, first)?)
            }
        };
        Ok(BuiltinOutput::Text(counts))
    }
}

#[derive(FromArgs)]
/// Print the current working directory.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn parse(args: &[&str]) -> Result<Invocation<Self>> {
        parse_with_argh(Self::name(), args)
    }

    fn execute(self, session: &mut Session) -> Result<BuiltinOutput> {
        Ok(BuiltinOutput::Text(
            session.env.current_dir.to_string_lossy().into_owned(),
        ))
    }
}

/// Join the arguments with single spaces.
///
/// Arguments are taken verbatim, so `echo -n` prints `-n`.
pub struct Echo {
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn parse(args: &[&str]) -> Result<Invocation<Self>> {
        Ok(Invocation::Run(Echo {
            args: args.iter().map(|s| s.to_string()).collect(),
        }))
    }

    fn execute(self, _session: &mut Session) -> Result<BuiltinOutput> {
        Ok(BuiltinOutput::Text(self.args.join(" ")))
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn parse(args: &[&str]) -> Result<Invocation<Self>> {
        parse_with_argh(Self::name(), args)
    }

    fn execute(self, session: &mut Session) -> Result<BuiltinOutput> {
        let new_dir = session.env.resolve(&self.target);
        let canonical = fs::canonicalize(&new_dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound => usage(format!("cd: no such file or directory: {}", self.target)),
            _ => usage(format!("cd: {}: {}", self.target, e)),
        })?;
        if !canonical.is_dir() {
            return Err(usage(format!("cd: not a directory: {}", self.target)));
        }

        tracing::debug!(dir = %canonical.display(), "changed directory");
        session.env.current_dir = canonical;
        Ok(BuiltinOutput::Text(String::new()))
    }
}

#[derive(FromArgs)]
/// List directory entries, one per line.
pub struct Ls {
    #[argh(positional)]
    /// directory to list; defaults to the current directory.
    pub path: Option<String>,
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn parse(args: &[&str]) -> Result<Invocation<Self>> {
        parse_with_argh(Self::name(), args)
    }

    fn execute(self, session: &mut Session) -> Result<BuiltinOutput> {
        let shown = self.path.as_deref().unwrap_or(".");
        let dir = session.env.resolve(shown);
        let to_usage = |e: std::io::Error| match e.kind() {
            ErrorKind::NotFound => usage(format!("ls: no such file or directory: {}", shown)),
            ErrorKind::PermissionDenied => usage(format!("ls: permission denied: {}", shown)),
            _ => usage(format!("ls: cannot access {}: {}", shown, e)),
        };

        if !fs::metadata(&dir).map_err(to_usage)?.is_dir() {
            return Ok(BuiltinOutput::Text(shown.to_string()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(to_usage)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(BuiltinOutput::Text(names.join("\n")))
    }
}

#[derive(FromArgs)]
/// Print lines matching a pattern.
pub struct Grep {
    #[argh(positional)]
    /// the pattern to search for (a regular expression); a bare number such
    /// as `42` is a pattern too, only the value after `-A` is consumed
    pub pattern: String,

    #[argh(positional)]
    /// files to search. If none provided, reads the previous output.
    pub files: Vec<String>,

    #[argh(switch, short = 'w')]
    /// match only whole words
    pub word_regexp: bool,

    #[argh(switch, short = 'i')]
    /// ignore case distinctions
    pub ignore_case: bool,

    #[argh(option, short = 'A', default = "0")]
    /// print NUM lines of trailing context after matching lines
    pub after_context: usize,
}

impl Grep {
    fn regex(&self) -> Result<Regex> {
        let pattern = if self.word_regexp {
            format!(r"\b(?:{})\b", self.pattern)
        } else {
            self.pattern.clone()
        };

        RegexBuilder::new(&pattern)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|e| usage(format!("Invalid regex pattern: {}: {}", self.pattern, e)))
    }

    /// Lines that match plus their trailing context, each source line at most once.
    fn select<'t>(&self, text: &'t str, re: &Regex) -> Vec<&'t str> {
        let lines: Vec<&str> = text.lines().collect();
        let mut keep = vec![false; lines.len()];

        for (i, line) in lines.iter().enumerate() {
            if re.is_match(line) {
                let end = i
                    .saturating_add(self.after_context)
                    .saturating_add(1)
                    .min(lines.len());
                keep[i..end].fill(true);
            }
        }

        lines
            .into_iter()
            .zip(keep)
            .filter_map(|(line, kept)| kept.then_some(line))
            .collect()
    }
}

impl BuiltinCommand for Grep {
    fn name() -> &'static str {
        "grep"
    }

    fn parse(args: &[&str]) -> Result<Invocation<Self>> {
        parse_with_argh(Self::name(), args)
    }

    fn execute(self, session: &mut Session) -> Result<BuiltinOutput> {
        let re = self.regex()?;

        if self.files.is_empty() {
            let text = non_empty(session.implicit_stdin())
                .ok_or_else(|| usage("Usage: grep [-i] [-w] [-A NUM] PATTERN [FILE...]"))?;
            return Ok(BuiltinOutput::Text(self.select(text, &re).join("\n")));
        }

        let prefixed = self.files.len() > 1;
        let mut found = Vec::new();
        for name in &self.files {
            let content = read_operand(&session.env, name)?;
            for line in self.select(&content, &re) {
                if prefixed {
                    found.push(format!("{}:{}", name, line));
                } else {
                    found.push(line.to_string());
                }
            }
        }
        Ok(BuiltinOutput::Text(found.join("\n")))
    }
}

#[derive(FromArgs)]
/// Exit the shell with the last return code.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn parse(args: &[&str]) -> Result<Invocation<Self>> {
        parse_with_argh(Self::name(), args)
    }

    fn execute(self, session: &mut Session) -> Result<BuiltinOutput> {
        Ok(BuiltinOutput::Exit(session.return_code()))
    }
}
