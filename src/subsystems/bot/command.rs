//! Prefix command parsing.
//!
//! `?name args…`: the name runs up to the first whitespace; an argument is
//! either a double-quoted string (spaces allowed) or a single word.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ping,
    NewGaou,
    Cleanup,
    DmCleanup,
}

impl CommandKind {
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Ping => "ping",
            CommandKind::NewGaou => "new_gaou",
            CommandKind::Cleanup => "cleanup",
            CommandKind::DmCleanup => "dm_cleanup",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ping" => Some(CommandKind::Ping),
            "new_gaou" => Some(CommandKind::NewGaou),
            "cleanup" => Some(CommandKind::Cleanup),
            "dm_cleanup" => Some(CommandKind::DmCleanup),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Command \"{0}\" is not found")]
    Unknown(String),
    #[error("{0} is a required argument that is missing.")]
    MissingArgument(&'static str),
    #[error("Converting to \"int\" failed for parameter \"{name}\".")]
    BadArgument { name: &'static str, value: String },
    #[error("Expected closing \".")]
    UnclosedQuote,
}

/// A recognised command and its unparsed argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub kind: CommandKind,
    pub rest: &'a str,
}

/// `None` when `content` is not a command at all.
pub fn split_invocation<'a>(prefix: &str, content: &'a str) -> Option<Result<Invocation<'a>, CommandError>> {
    if prefix.is_empty() {
        return None;
    }
    let body = content.strip_prefix(prefix)?;
    let end = body.find(char::is_whitespace).unwrap_or(body.len());
    let (name, rest) = body.split_at(end);
    if name.is_empty() {
        return None;
    }
    Some(match CommandKind::from_name(name) {
        Some(kind) => Ok(Invocation { kind, rest }),
        None => Err(CommandError::Unknown(name.to_string())),
    })
}

/// Next argument of `input` and the remaining text, or `None` when exhausted.
pub fn next_argument(input: &str) -> Result<Option<(String, &str)>, CommandError> {
    let input = input.trim_start();
    if input.is_empty() {
        return Ok(None);
    }
    if let Some(quoted) = input.strip_prefix('"') {
        let close = quoted.find('"').ok_or(CommandError::UnclosedQuote)?;
        return Ok(Some((quoted[..close].to_string(), &quoted[close + 1..])));
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Ok(Some((input[..end].to_string(), &input[end..])))
}

pub fn required_text(rest: &str, name: &'static str) -> Result<String, CommandError> {
    next_argument(rest)?
        .map(|(arg, _)| arg)
        .ok_or(CommandError::MissingArgument(name))
}

pub fn required_count(rest: &str, name: &'static str) -> Result<usize, CommandError> {
    let raw = required_text(rest, name)?;
    raw.parse()
        .map_err(|_| CommandError::BadArgument { name, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(split_invocation("?", "hello there").is_none());
        assert!(split_invocation("?", "?").is_none());
        assert!(split_invocation("?", "? ping").is_none());
    }

    #[test]
    fn known_and_unknown_names() {
        let inv = split_invocation("?", "?cleanup 10").unwrap().unwrap();
        assert_eq!(inv.kind, CommandKind::Cleanup);
        assert_eq!(inv.rest, " 10");
        assert_eq!(
            split_invocation("?", "?dance").unwrap(),
            Err(CommandError::Unknown("dance".into()))
        );
    }

    #[test]
    fn custom_prefix() {
        let inv = split_invocation("!!", "!!ping").unwrap().unwrap();
        assert_eq!(inv.kind, CommandKind::Ping);
        assert!(split_invocation("!!", "?ping").is_none());
    }

    #[test]
    fn quoted_argument_keeps_spaces() {
        let text = required_text(r#" "I am Lambert, 15 years old" trailing"#, "parametre").unwrap();
        assert_eq!(text, "I am Lambert, 15 years old");
    }

    #[test]
    fn unquoted_argument_is_one_word() {
        assert_eq!(required_text("  Lambert is 15", "parametre").unwrap(), "Lambert");
    }

    #[test]
    fn missing_and_malformed_arguments() {
        assert_eq!(required_text("   ", "parametre"), Err(CommandError::MissingArgument("parametre")));
        assert_eq!(
            CommandError::MissingArgument("parametre").to_string(),
            "parametre is a required argument that is missing."
        );
        assert_eq!(required_text(r#" "open"#, "parametre"), Err(CommandError::UnclosedQuote));
        assert!(matches!(required_count(" ten", "limit"), Err(CommandError::BadArgument { .. })));
        assert!(matches!(required_count(" -3", "limit"), Err(CommandError::BadArgument { .. })));
        assert_eq!(required_count(" 25", "limit"), Ok(25));
    }
}
