//! Store Module
//!
//! In-memory data model served by the command handlers.
//!
//! ## Responsibilities
//! - Flat string keys (`SET` / `GET`)
//! - Nested hashes (`HSET` / `HGET` / `HGETALL`)
//! - Concurrent readers, exclusive writers, per mapping
//!
//! ## Data Structure Choice
//! Two `HashMap`s, each behind its own `parking_lot::RwLock`:
//! - No ordering is needed (no range scans, no flush to sorted files)
//! - A string write never blocks a hash read and vice versa
//! - Locks are held only for the lookup/insert itself

mod keyspace;

pub use keyspace::Store;
