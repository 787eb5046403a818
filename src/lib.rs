//! The execution core of a tiny line-oriented shell.
//!
//! A line such as `cat notes.txt | grep -i todo | wc` is split into stages by
//! [`parser`], every token is rewritten by [`substitute`] against the session's
//! variables, and each stage then runs either as a builtin or as an external
//! program. Stages do not stream into each other: each one leaves a single
//! previous-output string behind, which the next builtin may read as its
//! implicit stdin and which is printed once the line is done.
//!
//! The main entry point is [`Interpreter`].

mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod parser;
pub mod session;
pub mod substitute;

pub use builtin::Builtin;
pub use command::{Command, CommandError, ExitCode, Outcome};
pub use error::ExecError;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
