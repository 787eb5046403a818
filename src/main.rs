use argh::FromArgs;
use pipesh::{Interpreter, Outcome};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// Line-oriented shell with builtins, `$VAR` substitution and simulated pipes.
struct Args {
    #[argh(option, short = 'c')]
    /// run a single line and exit with its return code
    command: Option<String>,

    #[argh(option, short = 'p', default = "String::from(\"> \")")]
    /// prompt shown by the interactive loop
    prompt: String,

    #[argh(option, default = "String::from(\"error\")")]
    /// log filter used when RUST_LOG is not set
    log_level: String,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().without_time().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut interpreter = Interpreter::default();
    let code = match args.command {
        Some(line) => run_once(&mut interpreter, &line),
        None => match interpreter.repl(&args.prompt) {
            Ok(code) => code,
            Err(e) => {
                error!("{}", e);
                1
            }
        },
    };
    ExitCode::from(code as u8)
}

fn run_once(interpreter: &mut Interpreter, line: &str) -> i32 {
    match interpreter.run_line(line, &mut std::io::stdout()) {
        Ok(Outcome::Exit(code)) => code,
        Ok(Outcome::Continue) => interpreter.return_code(),
        Err(e) => {
            error!("{}", e);
            interpreter.return_code()
        }
    }
}
