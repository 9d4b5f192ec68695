//! Append-Only Log Module
//!
//! Provides durability through an append-only command log.
//!
//! ## Responsibilities
//! - Append the wire form of every mutating command
//! - Sync to stable storage on a schedule (or every write)
//! - Replay all recorded commands on startup
//! - Cut off a torn final frame left by a crash mid-append
//!
//! ## File Format
//! The log is a flat sequence of request arrays in the exact wire format
//! spoken to clients, so any RESP-aware tool can dump it:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ *3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n │  command 1
//! ├─────────────────────────────────────────┤
//! │ *4\r\n$4\r\nHSET\r\n ...                 │  command 2
//! ├─────────────────────────────────────────┤
//! │ ...                                     │
//! └─────────────────────────────────────────┘
//! ```
//! Nothing is ever rewritten or removed, except an incomplete trailing
//! frame during replay.

mod append_log;
mod replay;
mod flusher;

pub use append_log::AppendLog;
pub use replay::ReplayStats;
pub use flusher::LogFlusher;
