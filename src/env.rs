use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Variables seeded from the process environment when a session starts.
const SEEDED_VARS: [&str; 2] = ["HOME", "USER"];

/// Variable store and working directory of one interpreter session.
///
/// The environment contains:
/// - `vars`: shell variables, seeded with `HOME` and `USER` and grown by
///   `NAME=VALUE` assignments. Nothing is ever removed.
/// - `current_dir`: the session working directory. `cd` changes it, relative
///   file operands resolve against it and external programs start in it.
#[derive(Debug, Clone)]
pub struct Environment {
    vars: HashMap<String, String>,
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture `HOME`, `USER` and the working directory of the current process.
    ///
    /// Missing or non-unicode variables are seeded as empty strings.
    pub fn new() -> Self {
        let vars = SEEDED_VARS
            .iter()
            .map(|&k| (k.to_string(), stdenv::var(k).unwrap_or_default()));
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_vars(vars, current_dir)
    }

    /// Build an environment from explicit variables, ignoring the process state.
    pub fn with_vars<I, K, V>(vars: I, current_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            current_dir: current_dir.into(),
        }
    }

    /// Get the value of a variable, if bound.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Resolve a path operand against the session working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::with_vars(Vec::<(String, String)>::new(), "/");

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");
        assert_eq!(env.get_var("KEY"), Some("VALUE"));

        env.set_var("KEY", "OTHER");
        assert_eq!(env.get_var("KEY"), Some("OTHER"));
    }

    #[test]
    fn test_env_seeds_only_home_and_user() {
        let env = Environment::new();
        assert!(env.get_var("HOME").is_some());
        assert!(env.get_var("USER").is_some());
        assert_eq!(env.get_var("PATH"), None);
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let env = Environment::with_vars([("HOME", "/home/u")], "/work");
        assert_eq!(env.resolve("a.txt"), PathBuf::from("/work/a.txt"));
        assert_eq!(env.resolve("/etc/hosts"), Path::new("/etc/hosts"));
    }
}
