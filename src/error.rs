//! Error types for ferrokv
//!
//! Provides a unified error type for codec, log and engine operations.
//! Command-level failures (arity, unknown command) are not errors here;
//! they live in [`crate::command::CommandError`] and always become a
//! protocol error value.

use thiserror::Error;

/// Result type alias using FerroError
pub type Result<T> = std::result::Result<T, FerroError>;

/// Unified error type for ferrokv operations
#[derive(Debug, Error)]
pub enum FerroError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The stream ended part-way through a frame
    #[error("Protocol error: unexpected end of stream")]
    UnexpectedEof,

    // -------------------------------------------------------------------------
    // Append Log Errors
    // -------------------------------------------------------------------------
    #[error("Append log replay failed at offset {offset}: {reason}")]
    LogReplay { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FerroError {
    /// True when the error means the peer (or file) simply ran out of bytes
    /// mid-frame rather than sending garbage.
    pub fn is_unexpected_eof(&self) -> bool {
        match self {
            FerroError::UnexpectedEof => true,
            FerroError::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
