//! Protocol codec
//!
//! Encoding and decoding functions for RESP2 values.
//!
//! Decoding works on any `BufRead`, so the same code path serves live
//! connections and append log replay. A stream that is exhausted exactly at
//! a frame boundary yields `Ok(None)`; a stream that ends inside a frame
//! yields [`FerroError::UnexpectedEof`].

use std::io::{BufRead, Cursor, Read, Write};

use bytes::Bytes;

use crate::error::{FerroError, Result};
use super::Value;

/// Maximum bulk string payload (512 MB)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Maximum text of a simple string or error line, prefix and CRLF excluded
pub const MAX_SIMPLE_LEN: usize = MAX_BULK_LEN;

/// Maximum number of elements in one array
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Maximum length of an integer, bulk or array header line, CRLF included
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Cap on up-front allocation for a bulk payload; larger payloads grow as read
const PREALLOC_LIMIT: usize = 64 * 1024;

const CRLF: &[u8] = b"\r\n";

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value to bytes
pub fn encode_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

fn encode_into(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::SimpleString(text) => {
            buf.push(b'+');
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(CRLF);
        }
        Value::Error(text) => {
            buf.push(b'-');
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(CRLF);
        }
        Value::Integer(n) => {
            buf.push(b':');
            buf.extend_from_slice(n.to_string().as_bytes());
            buf.extend_from_slice(CRLF);
        }
        Value::BulkString(data) => {
            buf.reserve(data.len() + 16);
            buf.push(b'$');
            buf.extend_from_slice(data.len().to_string().as_bytes());
            buf.extend_from_slice(CRLF);
            buf.extend_from_slice(data);
            buf.extend_from_slice(CRLF);
        }
        Value::Null => buf.extend_from_slice(b"$-1\r\n"),
        Value::Array(items) => {
            buf.push(b'*');
            buf.extend_from_slice(items.len().to_string().as_bytes());
            buf.extend_from_slice(CRLF);
            for item in items {
                encode_into(item, buf);
            }
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a single value from the front of a byte slice
///
/// Trailing bytes after the first complete value are ignored.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(bytes);
    read_value(&mut cursor)?.ok_or(FerroError::UnexpectedEof)
}

/// Read one complete value from a stream
///
/// Returns `Ok(None)` when the stream is cleanly exhausted before the first
/// byte of a frame.
pub fn read_value<R: BufRead>(reader: &mut R) -> Result<Option<Value>> {
    if reader.fill_buf()?.is_empty() {
        return Ok(None);
    }
    read_frame(reader).map(Some)
}

/// One frame header: either a complete non-array value or the element
/// count of an array whose elements follow
#[derive(Debug)]
pub(crate) enum Frame {
    Value(Value),
    Array(usize),
}

/// Decode one value, keeping partially filled arrays on an explicit stack
/// so nesting depth costs heap rather than call stack
fn read_frame<R: BufRead>(reader: &mut R) -> Result<Value> {
    // (expected element count, elements read so far)
    let mut open: Vec<(usize, Vec<Value>)> = Vec::new();

    loop {
        let mut value = match read_frame_header(reader)? {
            Frame::Value(value) => value,
            Frame::Array(0) => Value::Array(Vec::new()),
            Frame::Array(count) => {
                open.push((count, Vec::with_capacity(count.min(1024))));
                continue;
            }
        };

        // Close every array this value completes
        loop {
            match open.pop() {
                None => return Ok(value),
                Some((count, mut items)) => {
                    items.push(value);
                    if items.len() < count {
                        open.push((count, items));
                        break;
                    }
                    value = Value::Array(items);
                }
            }
        }
    }
}

/// Read one frame header, plus the payload for bulk strings
///
/// Array elements are left on the stream for the caller.
pub(crate) fn read_frame_header<R: BufRead>(reader: &mut R) -> Result<Frame> {
    let prefix = reader
        .fill_buf()?
        .first()
        .copied()
        .ok_or(FerroError::UnexpectedEof)?;
    let max_line = match prefix {
        // prefix + text + CRLF
        b'+' | b'-' => MAX_SIMPLE_LEN + 3,
        _ => MAX_LINE_LEN,
    };

    let line = read_line(reader, max_line)?;
    let rest = line
        .get(1..)
        .ok_or_else(|| protocol_error("missing type prefix"))?;

    match prefix {
        b'+' => Ok(Frame::Value(Value::SimpleString(line_text(rest)?))),
        b'-' => Ok(Frame::Value(Value::Error(line_text(rest)?))),
        b':' => Ok(Frame::Value(Value::Integer(parse_integer(rest)?))),
        b'$' => {
            let len = parse_integer(rest)?;
            if len == -1 {
                return Ok(Frame::Value(Value::Null));
            }
            let len = checked_len(len, MAX_BULK_LEN, "bulk string")?;
            read_bulk(reader, len).map(|data| Frame::Value(Value::BulkString(data)))
        }
        b'*' => {
            let count = parse_integer(rest)?;
            if count == -1 {
                return Ok(Frame::Value(Value::Null));
            }
            checked_len(count, MAX_ARRAY_LEN, "array").map(Frame::Array)
        }
        other => Err(FerroError::Protocol(format!(
            "unknown type prefix '{}'",
            other.escape_ascii()
        ))),
    }
}

/// Read one CRLF-terminated line of at most `max_len` bytes (CRLF included)
/// and return it without the terminator
fn read_line<R: BufRead>(reader: &mut R, max_len: usize) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    reader
        .by_ref()
        .take(max_len as u64)
        .read_until(b'\n', &mut line)?;

    if !line.ends_with(b"\n") {
        if line.len() >= max_len {
            return Err(protocol_error("line too long"));
        }
        return Err(FerroError::UnexpectedEof);
    }
    if !line.ends_with(CRLF) {
        return Err(protocol_error("line not terminated by CRLF"));
    }
    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

fn read_bulk<R: BufRead>(reader: &mut R, len: usize) -> Result<Bytes> {
    let framed = len + CRLF.len();
    let mut data = Vec::with_capacity(framed.min(PREALLOC_LIMIT));
    reader.by_ref().take(framed as u64).read_to_end(&mut data)?;

    if data.len() < framed {
        return Err(FerroError::UnexpectedEof);
    }
    if &data[len..] != CRLF {
        return Err(protocol_error("bulk string length mismatch"));
    }
    data.truncate(len);
    Ok(Bytes::from(data))
}

fn line_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| protocol_error("invalid UTF-8 in line"))
}

fn parse_integer(bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            FerroError::Protocol(format!("invalid integer '{}'", bytes.escape_ascii()))
        })
}

fn checked_len(len: i64, max: usize, what: &str) -> Result<usize> {
    match usize::try_from(len) {
        Ok(len) if len <= max => Ok(len),
        Ok(len) => Err(FerroError::Protocol(format!(
            "{} length {} exceeds maximum {}",
            what, len, max
        ))),
        Err(_) => Err(FerroError::Protocol(format!(
            "invalid {} length {}",
            what, len
        ))),
    }
}

fn protocol_error(message: &str) -> FerroError {
    FerroError::Protocol(message.to_string())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a value to a stream and flush it
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    let bytes = encode_value(value);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
