//! Value definitions
//!
//! A single protocol datum, as decoded from the wire or produced by a
//! command handler.

use bytes::Bytes;

/// Any RESP2 value
///
/// `Null` is written as the null bulk string (`$-1\r\n`). The null array
/// (`*-1\r\n`) is accepted on input and also decodes to `Null`.
///
/// Decoding accepts simple string and error text up to
/// [`MAX_SIMPLE_LEN`](super::MAX_SIMPLE_LEN) bytes and bulk payloads up to
/// [`MAX_BULK_LEN`](super::MAX_BULK_LEN); arrays may nest to any depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `+text`; must not contain CR or LF
    SimpleString(String),

    /// `-text`; must not contain CR or LF
    Error(String),

    /// `:n`
    Integer(i64),

    /// `$len` followed by `len` raw bytes
    BulkString(Bytes),

    /// `$-1`
    Null,

    /// `*count` followed by `count` values
    Array(Vec<Value>),
}

impl Value {
    /// The `+OK` reply
    pub fn ok() -> Self {
        Value::SimpleString("OK".to_string())
    }

    /// Create a simple string
    pub fn simple(text: impl Into<String>) -> Self {
        Value::SimpleString(text.into())
    }

    /// Create an error
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    /// Create a bulk string
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Value::BulkString(data.into())
    }

    /// Create an array
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(items)
    }

    /// Bulk string when present, `Null` otherwise
    pub fn bulk_or_null(data: Option<Bytes>) -> Self {
        data.map(Value::BulkString).unwrap_or(Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::BulkString(Bytes::copy_from_slice(s.as_bytes()))
    }
}
