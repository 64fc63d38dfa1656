//! Parser for commands arriving as JSON.
//!
//! Unknown command kinds are not an error: they parse to
//! `Command::Unrecognized` and the queue ignores them. Only input that cannot
//! be a command at all is rejected here, before it reaches the queue.

use serde_json::Value;
use thiserror::Error;

use super::types::Command;

/// Errors produced while parsing a command.
#[derive(Debug, Error)]
pub enum CommandParseError {
    /// The body was not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The JSON value was not an object.
    #[error("command must be a JSON object")]
    NotAnObject,

    /// The object had no string `type` field.
    #[error("command is missing a string `type` field")]
    MissingType,

    /// A known command kind had malformed fields.
    #[error("malformed {kind} command: {source}")]
    MalformedFields {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses a command from raw JSON bytes.
///
/// # Examples
///
/// ```
/// use offline_queue::commands::{Command, parse_command};
///
/// let cmd = parse_command(br#"{"type":"CONNECTIVITY_CHANGED","connected":false}"#).unwrap();
/// assert_eq!(cmd, Command::ConnectivityChanged { connected: false });
///
/// let cmd = parse_command(br#"{"type":"SOMETHING_ELSE"}"#).unwrap();
/// assert_eq!(cmd, Command::Unrecognized);
///
/// assert!(parse_command(b"[1, 2]").is_err());
/// ```
pub fn parse_command(bytes: &[u8]) -> Result<Command, CommandParseError> {
    let value: Value = serde_json::from_slice(bytes).map_err(CommandParseError::InvalidJson)?;
    parse_command_value(value)
}

/// Parses a command from an already decoded JSON value.
pub fn parse_command_value(value: Value) -> Result<Command, CommandParseError> {
    let kind = match &value {
        Value::Object(map) => match map.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return Err(CommandParseError::MissingType),
        },
        _ => return Err(CommandParseError::NotAnObject),
    };

    serde_json::from_value(value).map_err(|source| CommandParseError::MalformedFields { kind, source })
}
