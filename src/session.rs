use crate::command::ExitCode;
use crate::env::Environment;

/// Long-lived state of one interactive session.
///
/// Besides the [`Environment`], a session tracks the single rolling
/// previous-output value that stages of a pipeline hand to each other, and the
/// return code of the last command that set one.
#[derive(Debug)]
pub struct Session {
    pub env: Environment,
    previous_output: Option<String>,
    return_code: ExitCode,
}

impl Session {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            previous_output: None,
            return_code: 0,
        }
    }

    /// Data left by the preceding stage, offered to builtins run without
    /// file operands.
    pub fn implicit_stdin(&self) -> Option<&str> {
        self.previous_output.as_deref()
    }

    /// Consume the implicit stdin, leaving the buffer empty.
    pub fn take_implicit_stdin(&mut self) -> Option<String> {
        self.previous_output.take()
    }

    pub fn previous_output(&self) -> Option<&str> {
        self.previous_output.as_deref()
    }

    pub fn set_previous_output(&mut self, output: impl Into<String>) {
        self.previous_output = Some(output.into());
    }

    pub fn return_code(&self) -> ExitCode {
        self.return_code
    }

    pub fn set_return_code(&mut self, code: ExitCode) {
        self.return_code = code;
    }

    /// Drop per-line state before the next line runs.
    ///
    /// Variables and the return code survive.
    pub fn reset(&mut self) {
        self.previous_output = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Environment::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_vars_and_return_code() {
        let mut session = Session::new(Environment::with_vars([("HOME", "/h")], "/"));
        session.env.set_var("X", "1");
        session.set_previous_output("data");
        session.set_return_code(3);

        session.reset();

        assert_eq!(session.previous_output(), None);
        assert_eq!(session.return_code(), 3);
        assert_eq!(session.env.get_var("X"), Some("1"));
    }

    #[test]
    fn test_take_implicit_stdin_clears() {
        let mut session = Session::new(Environment::with_vars([("HOME", "/h")], "/"));
        session.set_previous_output("abc");
        assert_eq!(session.implicit_stdin(), Some("abc"));
        assert_eq!(session.take_implicit_stdin().as_deref(), Some("abc"));
        assert_eq!(session.implicit_stdin(), None);
    }
}
