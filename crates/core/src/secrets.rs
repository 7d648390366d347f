//! Secret store with opaque handles
//!
//! Secrets are loaded once, when the store is built. Each configured name
//! gets one [`SecretHandle`]; the plaintext sits in a private arena indexed by
//! that handle and is zeroized when the store is dropped.
//!
//! No public method returns plaintext. The only reader is the HTTP pipeline
//! in this crate, which substitutes values into the request it hands to the
//! transport.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use gametest_domain::{GametestError, Result, SecretHandle};
use serde_json::Value;
use zeroize::Zeroizing;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

struct SecretSlot {
    name: String,
    value: Zeroizing<String>,
}

/// Named secrets addressed through opaque handles.
pub struct SecretStore {
    id: u64,
    index: BTreeMap<String, SecretHandle>,
    slots: Vec<SecretSlot>,
}

impl SecretStore {
    /// Build a store from `(name, plaintext)` pairs.
    ///
    /// A name given twice keeps its first handle and takes the last value.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut store = Self::empty();
        for (name, value) in entries {
            store.insert(name.into(), value.into());
        }
        store
    }

    pub fn empty() -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            index: BTreeMap::new(),
            slots: Vec::new(),
        }
    }

    /// Build a store from a parsed JSON object of string values.
    ///
    /// # Errors
    /// Returns `GametestError::Config` if `json` is not an object or any
    /// value is not a string.
    pub fn from_json(json: Value) -> Result<Self> {
        let Value::Object(map) = json else {
            return Err(GametestError::Config(
                "secrets must be a JSON object of name/value pairs".to_string(),
            ));
        };

        let mut store = Self::empty();
        for (name, value) in map {
            match value {
                Value::String(plaintext) => store.insert(name, plaintext),
                // The offending value is a secret; report the name only.
                _ => {
                    return Err(GametestError::Config(format!(
                        "secret '{name}' must be a string"
                    )))
                }
            }
        }
        Ok(store)
    }

    fn insert(&mut self, name: String, value: String) {
        if let Some(handle) = self.index.get(&name) {
            self.slots[handle.index() as usize].value = Zeroizing::new(value);
            return;
        }

        let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        let handle = SecretHandle::new(self.id, slot);
        self.slots.push(SecretSlot { name: name.clone(), value: Zeroizing::new(value) });
        self.index.insert(name, handle);
    }

    /// Handle for the secret called `name`, if configured.
    pub fn get(&self, name: &str) -> Option<SecretHandle> {
        self.index.get(name).copied()
    }

    /// Configured secret names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.index.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Name a handle was issued for, if it belongs to this store.
    pub fn name_of(&self, handle: SecretHandle) -> Option<&str> {
        self.slot(handle).map(|slot| slot.name.as_str())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Plaintext behind `handle`. Only the pipeline may call this.
    pub(crate) fn reveal(&self, handle: SecretHandle) -> Option<&str> {
        self.slot(handle).map(|slot| slot.value.as_str())
    }

    fn slot(&self, handle: SecretHandle) -> Option<&SecretSlot> {
        if handle.store_id() != self.id {
            return None;
        }
        self.slots.get(handle.index() as usize)
    }
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore").field("id", &self.id).field("names", &self.names()).finish()
    }
}
