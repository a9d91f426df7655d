//! # Mini App Storage Bridge
//!
//! A dual-backend save-data bridge compiled to WebAssembly, for web
//! games embedded in a social-network "Mini App" container.
//!
//! The container offers a platform key/value store behind an
//! asynchronous, permission-gated handshake; the browser offers
//! localStorage. Neither alone is good enough: the platform store can
//! be slow, denied, or missing (plain-browser and WebView-wrapper
//! runs), and localStorage does not follow the player across devices.
//! The bridge merges them into one logical interface.
//!
//! ## Architecture
//!
//! ```text
//! Game / scraper glue (JS)
//!   ↓
//! MiniAppStorage (wasm facade)
//!   ↓
//! StorageBridge ── read-through cache, readiness gating
//!   ↓            ↓
//! PlatformRemoteStore   WebLocalStore
//! (async, handshake)    (sync, always there)
//! ```
//!
//! ## Guarantees
//!
//! - **Never blocks progress**: every operation degrades to the local
//!   store; no error reaches the caller as an exception
//! - **Local first**: a resolved `set` means the value is on this
//!   device; remote replication is best effort
//! - **Remote wins on read**: a reachable platform value overwrites a
//!   stale local copy

use wasm_bindgen::prelude::*;

// Modules
pub mod backend;
pub mod bridge;
mod error;
pub mod local;
pub mod memory;
pub mod progress;
pub mod remote;
pub mod runtime;

pub use backend::{LocalBackend, RemoteBackend};
pub use bridge::{
    BridgeStats, Readiness, StorageBridge, HANDSHAKE_POLL_ATTEMPTS, HANDSHAKE_POLL_INTERVAL_MS,
};
pub use error::{BridgeError, ErrorCode, Result};
pub use local::WebLocalStore;
pub use memory::{MemoryLocalStore, MemoryRemoteStore};
pub use progress::{ProgressSnapshot, ProgressStore, PROGRESS_KEY};
pub use remote::PlatformRemoteStore;

/// Default localStorage key prefix
pub const DEFAULT_KEY_PREFIX: &str = "miniapp_save_";

/// Initialize the bridge module
///
/// This sets up logging and any global state needed.
#[wasm_bindgen(start)]
pub fn init() {
    console_log::init_with_level(log::Level::Info).unwrap();

    log::info!("Mini App storage bridge initialized");
}

/// JS-facing storage facade
///
/// Owns one bridge over the injected platform capability and the
/// page's localStorage. Constructed once by the embedding glue and
/// used for the lifetime of the page.
#[wasm_bindgen]
pub struct MiniAppStorage {
    bridge: StorageBridge<WebLocalStore, PlatformRemoteStore>,
}

#[wasm_bindgen]
impl MiniAppStorage {
    /// Create the facade around the platform capability object.
    ///
    /// `platform` is duck-typed (`init`/`get`/`getMany`/`set`, each
    /// returning a Promise); nothing is called on it until first use.
    /// `prefix` namespaces the localStorage keys and defaults to
    /// `miniapp_save_`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        platform: JsValue,
        prefix: Option<String>,
    ) -> std::result::Result<MiniAppStorage, JsValue> {
        let local = WebLocalStore::new(prefix.unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()))?;
        let remote = PlatformRemoteStore::new(platform);

        log::info!("✅ Storage facade created");

        Ok(Self {
            bridge: StorageBridge::new(local, remote),
        })
    }

    /// Read a value. Resolves to a string or `null`; never rejects.
    #[wasm_bindgen]
    pub async fn get(&self, key: String) -> JsValue {
        match self.bridge.get(&key).await {
            Some(value) => JsValue::from_str(&value),
            None => JsValue::NULL,
        }
    }

    /// Write a value. Resolves to `true` once the value is durable on
    /// this device; remote replication has been attempted by then but
    /// does not affect the result. Never rejects. Callers who don't
    /// care may ignore the returned Promise entirely.
    #[wasm_bindgen]
    pub async fn set(&self, key: String, value: String) -> bool {
        self.bridge.set(&key, &value).await
    }

    /// Remove a value from this device and advisory-clear it on the
    /// platform. Never rejects.
    #[wasm_bindgen]
    pub async fn remove(&self, key: String) {
        self.bridge.remove(&key).await;
    }

    /// Bulk-fetch keys from the platform store into the cache and
    /// localStorage. Resolves to the number of keys obtained.
    #[wasm_bindgen]
    pub async fn prefetch(&self, keys: Vec<String>) -> u32 {
        self.bridge.prefetch(&keys).await as u32
    }

    /// Persist a scraped progress triple.
    #[wasm_bindgen(js_name = saveProgress)]
    pub async fn save_progress(&self, level: u32, group: u32, completed: Vec<String>) -> bool {
        let snapshot = ProgressSnapshot::new(level, group, completed.into_iter().collect());
        ProgressStore::new(&self.bridge).save(&snapshot).await
    }

    /// Load the saved progress triple, or `null` if there is none (or
    /// it is unreadable).
    #[wasm_bindgen(js_name = loadProgress)]
    pub async fn load_progress(&self) -> JsValue {
        match ProgressStore::new(&self.bridge).load().await {
            Some(snapshot) => serde_wasm_bindgen::to_value(&snapshot).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// Get bridge status
    #[wasm_bindgen]
    pub fn status(&self) -> JsValue {
        let stats = self.bridge.stats();

        serde_wasm_bindgen::to_value(&serde_json::json!({
            "ready": stats.readiness == Readiness::Ready,
            "readiness": format!("{:?}", stats.readiness),
            "cache_entries": stats.cache_entries,
            "handshake_window_spent": stats.handshake_window_spent,
        }))
        .unwrap()
    }
}
