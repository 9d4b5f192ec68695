//! Request definitions
//!
//! A client request is one array of bulk strings. The first element is the
//! command name, the rest are positional arguments.

use std::io::{BufRead, Write};

use bytes::Bytes;

use crate::error::{FerroError, Result};
use super::codec::{encode_value, read_frame_header, write_value, Frame};
use super::Value;

/// A structurally valid request (command name plus raw arguments)
///
/// The name is kept exactly as the client sent it; matching against the
/// command table is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    name: String,
    args: Vec<Bytes>,
}

impl Request {
    /// Build a request from string-ish parts, e.g. `["SET", "a", "1"]`
    pub fn from_parts<I, T>(parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut parts = parts.into_iter();
        let name = parts
            .next()
            .ok_or_else(|| FerroError::Protocol("empty request".to_string()))?;
        let name = command_name(name.as_ref())?;
        let args = parts
            .map(|part| Bytes::copy_from_slice(part.as_ref()))
            .collect();
        Ok(Self { name, args })
    }

    /// Convert a decoded value into a request
    ///
    /// Fails with a protocol error unless the value is a non-empty array of
    /// bulk strings with a UTF-8 first element.
    pub fn from_value(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(FerroError::Protocol(format!(
                    "expected request array, got {}",
                    kind_name(&other)
                )))
            }
        };

        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            parts.push(bulk_part(item)?);
        }
        Self::from_bulk_parts(parts)
    }

    fn from_bulk_parts(mut parts: Vec<Bytes>) -> Result<Self> {
        if parts.is_empty() {
            return Err(FerroError::Protocol("empty request".to_string()));
        }
        let name = command_name(&parts.remove(0))?;
        Ok(Self { name, args: parts })
    }

    /// Command name as sent
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn into_args(self) -> Vec<Bytes> {
        self.args
    }

    /// The request as a protocol array of bulk strings
    pub fn to_value(&self) -> Value {
        let mut items = Vec::with_capacity(self.args.len() + 1);
        items.push(Value::BulkString(Bytes::copy_from_slice(self.name.as_bytes())));
        items.extend(self.args.iter().cloned().map(Value::BulkString));
        Value::Array(items)
    }

    /// Wire encoding of the request (the form stored in the append log)
    pub fn encode(&self) -> Vec<u8> {
        encode_value(&self.to_value())
    }
}

/// Read the next request from a stream
///
/// `Ok(None)` means the peer closed the stream between requests. Elements
/// are checked as they arrive, so a nested array is rejected at its header
/// without being read.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<Request>> {
    if reader.fill_buf()?.is_empty() {
        return Ok(None);
    }

    let count = match read_frame_header(reader)? {
        Frame::Array(count) => count,
        Frame::Value(other) => {
            return Err(FerroError::Protocol(format!(
                "expected request array, got {}",
                kind_name(&other)
            )))
        }
    };

    let mut parts = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        match read_frame_header(reader)? {
            Frame::Value(item) => parts.push(bulk_part(item)?),
            Frame::Array(_) => {
                return Err(FerroError::Protocol(
                    "expected bulk string in request, got array".to_string(),
                ))
            }
        }
    }

    Request::from_bulk_parts(parts).map(Some)
}

/// Write a request to a stream and flush it
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    write_value(writer, &request.to_value())
}

fn bulk_part(value: Value) -> Result<Bytes> {
    match value {
        Value::BulkString(data) => Ok(data),
        other => Err(FerroError::Protocol(format!(
            "expected bulk string in request, got {}",
            kind_name(&other)
        ))),
    }
}

fn command_name(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| FerroError::Protocol("command name is not valid UTF-8".to_string()))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::SimpleString(_) => "simple string",
        Value::Error(_) => "error",
        Value::Integer(_) => "integer",
        Value::BulkString(_) => "bulk string",
        Value::Null => "null",
        Value::Array(_) => "array",
    }
}
