//! Backend traits for the two physical stores
//!
//! The bridge is written against these seams so the browser-backed
//! implementations ([`WebLocalStore`](crate::local::WebLocalStore),
//! [`PlatformRemoteStore`](crate::remote::PlatformRemoteStore)) and the
//! in-memory ones used on native targets are interchangeable.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

/// The always-available, synchronous on-device store.
///
/// Values are opaque strings; callers serialize structured data
/// themselves. `set` may fail (quota exceeded, storage blocked by the
/// embedder) and the bridge treats that as non-fatal.
pub trait LocalBackend {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Enumerate all keys this backend currently holds.
    fn keys(&self) -> Result<Vec<String>>;
}

/// The platform-hosted store, reachable only after an asynchronous,
/// permission-gated handshake.
///
/// All failures look the same from the bridge's side: any `Err` means
/// "unavailable for this call". Futures are not `Send` because on
/// wasm32 they wrap JS promises.
#[async_trait(?Send)]
pub trait RemoteBackend {
    /// Run the platform handshake. Idempotent: implementations memoize
    /// the outcome and repeated calls return it without a new round
    /// trip. `Ok(false)` and `Err` both mean the store stays
    /// unreachable for the rest of the process.
    async fn init(&self) -> Result<bool>;

    /// Read one key. `Ok(None)` means the platform has no value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Read several keys in one round trip. Missing keys are simply
    /// absent from the returned map.
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, String>>;

    /// Write one key. `Ok(false)` means the platform refused the write
    /// without raising an error.
    async fn set(&self, key: &str, value: &str) -> Result<bool>;
}
