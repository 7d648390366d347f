//! Opaque secret handle

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder for a configured secret.
///
/// A handle is only an address into the arena of the store that issued it:
/// `store_id` identifies the store, `index` the slot. It never carries the
/// plaintext, so it can be cloned, logged, and stored in requests freely.
/// The plaintext is substituted by the HTTP pipeline at send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecretHandle {
    store_id: u64,
    index: u32,
}

impl SecretHandle {
    /// Build a handle for slot `index` of store `store_id`.
    ///
    /// Stores call this when they are populated. A handle built by hand
    /// grants nothing beyond what `SecretStore::get` already hands out.
    pub const fn new(store_id: u64, index: u32) -> Self {
        Self { store_id, index }
    }

    pub const fn store_id(&self) -> u64 {
        self.store_id
    }

    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretHandle({}:{})", self.store_id, self.index)
    }
}
