//! Store implementation
//!
//! HashMap-based keyspace with one RwLock per mapping.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

type Hash = HashMap<Bytes, Bytes>;

/// Process-wide key-value state
///
/// Construct one per engine and share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct Store {
    /// key -> value
    strings: RwLock<HashMap<Bytes, Bytes>>,

    /// hash name -> (field -> value); a hash exists once it has a field
    hashes: RwLock<HashMap<Bytes, Hash>>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Flat strings
    // =========================================================================

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.strings.read().get(key).cloned()
    }

    /// Set a key, replacing any previous value (write lock)
    pub fn set(&self, key: Bytes, value: Bytes) {
        self.strings.write().insert(key, value);
    }

    /// Number of string keys
    pub fn string_count(&self) -> usize {
        self.strings.read().len()
    }

    // =========================================================================
    // Hashes
    // =========================================================================

    /// Get one field of a hash (read lock)
    pub fn hget(&self, hash: &[u8], field: &[u8]) -> Option<Bytes> {
        self.hashes
            .read()
            .get(hash)
            .and_then(|fields| fields.get(field))
            .cloned()
    }

    /// Set one field of a hash, creating the hash if needed (write lock)
    pub fn hset(&self, hash: Bytes, field: Bytes, value: Bytes) {
        self.hashes
            .write()
            .entry(hash)
            .or_default()
            .insert(field, value);
    }

    /// All field/value pairs of a hash, in no particular order
    ///
    /// Returns `None` when the hash does not exist. The pairs are copied out
    /// under the read lock so the caller never observes a concurrent write.
    pub fn hgetall(&self, hash: &[u8]) -> Option<Vec<(Bytes, Bytes)>> {
        self.hashes.read().get(hash).map(|fields| {
            fields
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect()
        })
    }

    /// Number of hashes
    pub fn hash_count(&self) -> usize {
        self.hashes.read().len()
    }
}
