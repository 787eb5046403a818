use crate::command::Command;

/// Split a raw input line into pipeline stages.
///
/// The line is cut on every `|`, each segment is trimmed and split on runs of
/// whitespace. The first token of a segment is the command name, the rest are
/// its arguments. Empty segments are dropped, so `"a || b"` yields two stages
/// and `"|||"` yields none.
///
/// Quoting, escaping and redirection are not recognized: `'Hello,` stays a
/// single literal token including its quote.
pub fn parse_command_line(line: &str) -> Vec<Command> {
    line.split('|')
        .filter_map(|segment| {
            let mut tokens = segment.split_whitespace().map(str::to_string);
            let name = tokens.next()?;
            Some(Command::new(name, tokens.collect()))
        })
        .collect()
}
