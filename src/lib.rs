//! # ferrokv
//!
//! A minimal in-memory key-value store with:
//! - RESP2 wire protocol (arrays of bulk strings in, one value out)
//! - Flat string keys and nested hashes
//! - Append-only command log for crash recovery
//! - Per-mapping readers/writer locking
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  RESP bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Codec  →  Request  →  Command                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! │        (append mutating commands, then apply)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────────────┐
//!   │ Append Log  │          │        Store        │
//!   │  (Mutex)    │          │ strings  │  hashes  │
//!   │ + flusher   │          │ (RwLock) │ (RwLock) │
//!   └─────────────┘          └─────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod command;
pub mod aof;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FerroError, Result};
pub use config::Config;
pub use engine::Engine;
pub use protocol::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ferrokv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
