//! Protocol Module
//!
//! Defines the wire protocol for client-server communication and for the
//! on-disk append log (both use the exact same framing).
//!
//! ## Protocol Format (RESP2)
//!
//! Every frame starts with a one-byte type prefix and ends with CRLF.
//!
//! ```text
//! +OK\r\n                         simple string
//! -ERR message\r\n                error
//! :1000\r\n                       integer
//! $5\r\nhello\r\n                 bulk string
//! $-1\r\n                         null (null bulk string)
//! *2\r\n$3\r\nGET\r\n$1\r\na\r\n  array
//! ```
//!
//! ### Requests
//! A request is one array of bulk strings: the command name (any case)
//! followed by its positional arguments.
//!
//! ### Responses
//! Exactly one value per request.

mod value;
mod request;
mod codec;

pub use value::Value;
pub use request::{Request, read_request, write_request};
pub use codec::{
    encode_value, decode_value, read_value, write_value,
    MAX_ARRAY_LEN, MAX_BULK_LEN, MAX_LINE_LEN, MAX_SIMPLE_LEN,
};
