//! Command Module
//!
//! Maps requests onto a closed set of commands and executes them against
//! the [`Store`].
//!
//! ## Commands
//! | Name      | Args               | Reply                          |
//! |-----------|--------------------|--------------------------------|
//! | `PING`    | `[message]`        | `+Pong` or `+message`          |
//! | `SET`     | `key value`        | `+OK`                          |
//! | `GET`     | `key`              | bulk or null                   |
//! | `HSET`    | `hash field value` | `+OK`                          |
//! | `HGET`    | `hash field`       | bulk or null                   |
//! | `HGETALL` | `hash`             | `[field, value, ...]` or null  |
//!
//! Names are matched case-insensitively. Handler-level failures never
//! escape as `Err`; they become protocol error values.

mod table;

use bytes::Bytes;
use thiserror::Error;

use crate::protocol::{Request, Value, MAX_SIMPLE_LEN};
use crate::store::Store;

pub use table::{lookup, CommandKind, CommandSpec, COMMAND_TABLE};

/// Reply to a `PING` without arguments
pub const PING_REPLY: &str = "Pong";

/// Errors that turn into an error reply instead of failing the request loop
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("ERR unknown command '{0}'")]
    Unknown(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(&'static str),
}

impl From<CommandError> for Value {
    fn from(err: CommandError) -> Self {
        Value::Error(err.to_string())
    }
}

/// A parsed, arity-checked command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Health check, optionally echoing a message
    ///
    /// The echo is a simple string, so the message is decoded as lossy
    /// UTF-8, CR and LF become spaces, and text past [`MAX_SIMPLE_LEN`]
    /// bytes is cut at a character boundary.
    Ping { message: Option<Bytes> },

    /// Set a string key
    Set { key: Bytes, value: Bytes },

    /// Get a string key
    Get { key: Bytes },

    /// Set one field of a hash
    HSet { hash: Bytes, field: Bytes, value: Bytes },

    /// Get one field of a hash
    HGet { hash: Bytes, field: Bytes },

    /// Get every field of a hash
    HGetAll { hash: Bytes },
}

impl Command {
    /// Resolve a request against the command table and check its arity
    pub fn parse(request: Request) -> Result<Self, CommandError> {
        let spec = lookup(request.name())
            .ok_or_else(|| CommandError::Unknown(printable(request.name().as_bytes())))?;
        let args = request.into_args();

        let command = match spec.kind {
            CommandKind::Ping => {
                if args.len() > 1 {
                    return Err(CommandError::WrongArity(spec.name));
                }
                Command::Ping {
                    message: args.into_iter().next(),
                }
            }
            CommandKind::Set => {
                let [key, value] = exact::<2>(args, spec)?;
                Command::Set { key, value }
            }
            CommandKind::Get => {
                let [key] = exact::<1>(args, spec)?;
                Command::Get { key }
            }
            CommandKind::HSet => {
                let [hash, field, value] = exact::<3>(args, spec)?;
                Command::HSet { hash, field, value }
            }
            CommandKind::HGet => {
                let [hash, field] = exact::<2>(args, spec)?;
                Command::HGet { hash, field }
            }
            CommandKind::HGetAll => {
                let [hash] = exact::<1>(args, spec)?;
                Command::HGetAll { hash }
            }
        };

        Ok(command)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Ping { .. } => CommandKind::Ping,
            Command::Set { .. } => CommandKind::Set,
            Command::Get { .. } => CommandKind::Get,
            Command::HSet { .. } => CommandKind::HSet,
            Command::HGet { .. } => CommandKind::HGet,
            Command::HGetAll { .. } => CommandKind::HGetAll,
        }
    }

    /// Canonical upper-case name
    pub fn name(&self) -> &'static str {
        self.kind().spec().name
    }

    /// True for commands that mutate the store (and so get logged)
    pub fn is_write(&self) -> bool {
        self.kind().spec().write
    }

    /// Canonical request form, as appended to the log
    pub fn to_value(&self) -> Value {
        let args: Vec<&Bytes> = match self {
            Command::Ping { message } => message.iter().collect(),
            Command::Set { key, value } => vec![key, value],
            Command::Get { key } => vec![key],
            Command::HSet { hash, field, value } => vec![hash, field, value],
            Command::HGet { hash, field } => vec![hash, field],
            Command::HGetAll { hash } => vec![hash],
        };

        let mut items = Vec::with_capacity(args.len() + 1);
        items.push(Value::BulkString(Bytes::from_static(self.name().as_bytes())));
        items.extend(args.into_iter().cloned().map(Value::BulkString));
        Value::Array(items)
    }

    /// Run the command against the store
    pub fn execute(self, store: &Store) -> Value {
        match self {
            Command::Ping { message: None } => Value::simple(PING_REPLY),
            Command::Ping { message: Some(message) } => {
                Value::SimpleString(fit_simple(printable(&message), MAX_SIMPLE_LEN))
            }
            Command::Set { key, value } => {
                store.set(key, value);
                Value::ok()
            }
            Command::Get { key } => Value::bulk_or_null(store.get(&key)),
            Command::HSet { hash, field, value } => {
                store.hset(hash, field, value);
                Value::ok()
            }
            Command::HGet { hash, field } => Value::bulk_or_null(store.hget(&hash, &field)),
            Command::HGetAll { hash } => match store.hgetall(&hash) {
                Some(pairs) => Value::Array(
                    pairs
                        .into_iter()
                        .flat_map(|(field, value)| {
                            [Value::BulkString(field), Value::BulkString(value)]
                        })
                        .collect(),
                ),
                None => Value::Null,
            },
        }
    }
}

/// Parse and run a request with no logging; every outcome is a value
pub fn dispatch(store: &Store, request: Request) -> Value {
    match Command::parse(request) {
        Ok(command) => command.execute(store),
        Err(err) => err.into(),
    }
}

fn exact<const N: usize>(
    args: Vec<Bytes>,
    spec: &CommandSpec,
) -> Result<[Bytes; N], CommandError> {
    <[Bytes; N]>::try_from(args).map_err(|_| CommandError::WrongArity(spec.name))
}

/// Text safe to place in a simple string or error line
fn printable(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}

/// Cut `text` to at most `max` bytes without splitting a character
fn fit_simple(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(parts: &[&str]) -> Request {
        Request::from_parts(parts).unwrap()
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let command = Command::parse(request(&["sEt", "k", "v"])).unwrap();
        assert_eq!(command.name(), "SET");
        assert!(command.is_write());
    }

    #[test]
    fn test_to_value_uses_canonical_name() {
        let command = Command::parse(request(&["hset", "h", "f", "v"])).unwrap();
        let value = command.to_value();
        assert_eq!(
            value,
            Value::array(vec!["HSET".into(), "h".into(), "f".into(), "v".into()])
        );
    }

    #[test]
    fn test_printable_strips_line_breaks() {
        assert_eq!(printable(b"a\r\nb"), "a  b");
    }

    #[test]
    fn test_unknown_command_name_is_sanitized() {
        let err = Command::parse(request(&["FOO\r\nBAR"])).unwrap_err();
        assert_eq!(err, CommandError::Unknown("FOO  BAR".to_string()));
    }

    #[test]
    fn test_fit_simple_at_and_past_limit() {
        assert_eq!(fit_simple("abcd".to_string(), 4), "abcd");
        assert_eq!(fit_simple("abcde".to_string(), 4), "abcd");
        // 'é' is two bytes and must not be split
        assert_eq!(fit_simple("abcé".to_string(), 4), "abc");
    }
}
