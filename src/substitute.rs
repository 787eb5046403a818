//! `$NAME` expansion over single tokens.

use crate::command::{Command, is_name_char};
use crate::env::Environment;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubstitutionError {
    /// Such a word can never be passed to the operating system.
    #[error("word {0:?} contains an interior NUL byte")]
    InteriorNul(String),
}

/// Replace every `$NAME` in `word` with its value from `env`.
///
/// `NAME` is the longest run of ASCII letters, digits and underscores after the
/// `$`. Unbound names, and a `$` with no name after it, expand to nothing.
pub fn substitute_word(env: &Environment, word: &str) -> Result<String, SubstitutionError> {
    let mut result = String::with_capacity(word.len());
    let mut rest = word;

    while let Some(dollar) = rest.find('$') {
        result.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let name_len = after
            .find(|c: char| !is_name_char(c))
            .unwrap_or(after.len());
        let name = &after[..name_len];
        if !name.is_empty() {
            result.push_str(env.get_var(name).unwrap_or_default());
        }
        rest = &after[name_len..];
    }
    result.push_str(rest);

    if result.contains('\0') {
        return Err(SubstitutionError::InteriorNul(result));
    }
    Ok(result)
}

/// Substitute the name and every argument of `command` into a new command.
pub fn substitute_command(
    env: &Environment,
    command: &Command,
) -> Result<Command, SubstitutionError> {
    let name = substitute_word(env, &command.name)?;
    let arguments = command
        .arguments
        .iter()
        .map(|arg| substitute_word(env, arg))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Command { name, arguments })
}
