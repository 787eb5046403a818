use thiserror::Error;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// One stage of a pipeline: a command name followed by its arguments.
///
/// Commands are never mutated after parsing. Variable substitution produces a
/// fresh `Command` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub arguments: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Recognize a whole-token variable assignment of the form `NAME=VALUE`.
    ///
    /// Only a stage without arguments qualifies, and `NAME` must be a non-empty
    /// run of ASCII letters, digits and underscores. The value may be empty.
    pub fn as_assignment(&self) -> Option<(&str, &str)> {
        if !self.arguments.is_empty() {
            return None;
        }
        let (name, value) = self.name.split_once('=')?;
        if is_variable_name(name) {
            Some((name, value))
        } else {
            None
        }
    }
}

/// Characters allowed in a variable name.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn is_variable_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_name_char)
}

/// Recoverable usage failure raised by a builtin.
///
/// Builtins return it wrapped in [`anyhow::Error`]; anything else coming out of
/// a builtin is treated as an unexpected failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What the read loop should do after a line has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading input.
    Continue,
    /// `exit` ran: terminate the process with this code.
    Exit(ExitCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(name: &str, args: &[&str]) -> Command {
        Command::new(name, args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_assignment_recognized() {
        assert_eq!(cmd("MY_VAR=value", &[]).as_assignment(), Some(("MY_VAR", "value")));
        assert_eq!(cmd("x1=", &[]).as_assignment(), Some(("x1", "")));
        assert_eq!(cmd("A=b=c", &[]).as_assignment(), Some(("A", "b=c")));
    }

    #[test]
    fn test_assignment_rejected() {
        assert_eq!(cmd("=value", &[]).as_assignment(), None);
        assert_eq!(cmd("MY-VAR=value", &[]).as_assignment(), None);
        assert_eq!(cmd("echo", &[]).as_assignment(), None);
        // trailing arguments make it an ordinary invocation
        assert_eq!(cmd("A=1", &["echo"]).as_assignment(), None);
    }

    #[test]
    fn test_command_error_display() {
        let e = CommandError::new("Usage: cat [FILE]");
        assert_eq!(e.to_string(), "Usage: cat [FILE]");
        assert_eq!(e.message(), "Usage: cat [FILE]");
    }
}
