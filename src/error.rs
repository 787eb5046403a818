use crate::command::{CommandError, ExitCode};
use crate::substitute::SubstitutionError;
use thiserror::Error;

/// Why an external program counted as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFailure {
    pub code: ExitCode,
    pub stderr: String,
}

impl std::fmt::Display for ExternalFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exited with status {}", self.code)?;
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, ": {}", stderr)?;
        }
        Ok(())
    }
}

/// Failure that aborted the remaining stages of a line.
///
/// The session survives every variant; the read loop reports it and moves on.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("variable substitution error: {0}")]
    Substitution(#[from] SubstitutionError),

    #[error("error executing builtin '{name}': {cause}")]
    Builtin { name: String, cause: CommandError },

    #[error("unexpected error executing '{name}': {cause}")]
    Unexpected { name: String, cause: anyhow::Error },

    #[error("error executing external command '{name}': {cause}")]
    External { name: String, cause: ExternalFailure },

    #[error("command not found: {0}")]
    NotFound(String),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
