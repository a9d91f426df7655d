//! localStorage-backed local store
//!
//! The on-device half of the bridge. Synchronous, always available
//! once constructed, persisted for the lifetime of the browser
//! profile. Keys are namespaced with a prefix so the bridge cannot
//! collide with the host page's own localStorage entries.

use web_sys::Storage;

use crate::backend::LocalBackend;
use crate::error::{BridgeError, Result};

/// `LocalBackend` over the browser's localStorage
pub struct WebLocalStore {
    storage: Storage,
    prefix: String,
}

impl WebLocalStore {
    /// Open localStorage with the given key prefix.
    ///
    /// Fails if there is no window or localStorage is blocked (private
    /// browsing modes on some engines, or an embedder policy).
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::LocalCall("No window object".into()))?;
        let storage = window
            .local_storage()
            .map_err(|_| BridgeError::LocalCall("localStorage not available".into()))?
            .ok_or_else(|| BridgeError::LocalCall("localStorage is null".into()))?;

        Ok(Self {
            storage,
            prefix: prefix.into(),
        })
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl LocalBackend for WebLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(&self.scoped(key))
            .map_err(|e| BridgeError::LocalCall(format!("getItem failed: {:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(&self.scoped(key), value)
            .map_err(|e| BridgeError::LocalCall(format!("setItem failed: {:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(&self.scoped(key))
            .map_err(|e| BridgeError::LocalCall(format!("removeItem failed: {:?}", e)))
    }

    /// Enumerate by numeric index, keeping only keys under our prefix
    /// (with the prefix stripped).
    fn keys(&self) -> Result<Vec<String>> {
        let len = self
            .storage
            .length()
            .map_err(|e| BridgeError::LocalCall(format!("length failed: {:?}", e)))?;

        let mut keys = Vec::new();
        for i in 0..len {
            let key = self
                .storage
                .key(i)
                .map_err(|e| BridgeError::LocalCall(format!("key({}) failed: {:?}", i, e)))?;
            if let Some(key) = key {
                if let Some(stripped) = key.strip_prefix(&self.prefix) {
                    keys.push(stripped.to_string());
                }
            }
        }

        Ok(keys)
    }
}
