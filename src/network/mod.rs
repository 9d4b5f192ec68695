//! Network Module
//!
//! TCP server, per-client connection handling, and a blocking client.
//!
//! ## Architecture
//! - Single acceptor thread, polling so it can notice shutdown
//! - One thread per connection, capped at `max_connections`
//! - Requests routed through [`crate::Engine`]

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use client::Client;
