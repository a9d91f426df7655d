//! Dual-backend storage bridge
//!
//! One logical key/value interface over two physical stores: the
//! platform's asynchronous, permission-gated remote store and the
//! always-available local store. The remote side is preferred when it
//! is reachable and has data; the local side is the final fallback on
//! every path. No operation here ever raises — failure is an absent
//! read or a `false` write, which callers treat exactly as "no saved
//! data".

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::backend::{LocalBackend, RemoteBackend};
use crate::runtime;

/// Polling attempts a caller may spend waiting on an in-flight handshake
pub const HANDSHAKE_POLL_ATTEMPTS: u32 = 10;
/// Interval between handshake polls, in milliseconds
pub const HANDSHAKE_POLL_INTERVAL_MS: u32 = 100;

/// Remote backend availability, as seen by the bridge
///
/// `Failed` is permanent for the process; the handshake is never
/// retried once it has been rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotAttempted,
    InProgress,
    Ready,
    Failed,
}

/// Cache size and readiness snapshot
#[derive(Debug, Clone)]
pub struct BridgeStats {
    pub cache_entries: usize,
    pub readiness: Readiness,
    pub handshake_window_spent: bool,
}

/// Facade over a remote and a local key/value store.
///
/// Reads prefer the remote store and write winners through to the
/// local one; writes land locally first and replicate remotely on a
/// best-effort basis. An in-memory cache (advisory, process-lifetime
/// only) short-circuits repeat remote round trips.
///
/// Known limitation: there is no per-key write queue. Rapid repeated
/// `set`s to the same key replicate remotely in whatever order the
/// platform answers, so the remote copy can briefly trail or reorder
/// relative to local state. Acceptable for a low-frequency,
/// single-tab progress-saving workload.
pub struct StorageBridge<L, R> {
    local: L,
    remote: R,
    cache: RefCell<HashMap<String, String>>,
    readiness: Cell<Readiness>,
    handshake_window_spent: Cell<bool>,
}

impl<L: LocalBackend, R: RemoteBackend> StorageBridge<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            cache: RefCell::new(HashMap::new()),
            readiness: Cell::new(Readiness::NotAttempted),
            handshake_window_spent: Cell::new(false),
        }
    }

    /// Run or wait on the platform handshake, bounded.
    ///
    /// The first caller triggers the handshake and awaits it. Callers
    /// that arrive while it is in flight may poll for its outcome, but
    /// only within one process-wide window; once that window is spent,
    /// they proceed straight to the local-only path.
    async fn ensure_ready(&self) -> bool {
        match self.readiness.get() {
            Readiness::Ready => return true,
            Readiness::Failed => return false,
            Readiness::InProgress => return self.wait_for_handshake().await,
            Readiness::NotAttempted => {}
        }

        self.readiness.set(Readiness::InProgress);
        log::info!("Starting platform handshake");

        let ok = match self.remote.init().await {
            Ok(ok) => ok,
            Err(e) => {
                log::warn!("⚠️ Platform handshake failed: {}", e);
                false
            }
        };

        self.readiness.set(if ok {
            Readiness::Ready
        } else {
            Readiness::Failed
        });
        log::info!(
            "Platform handshake finished: {}",
            if ok { "ready" } else { "local-only from here on" }
        );
        ok
    }

    async fn wait_for_handshake(&self) -> bool {
        if self.handshake_window_spent.get() {
            return false;
        }
        self.handshake_window_spent.set(true);

        for _ in 0..HANDSHAKE_POLL_ATTEMPTS {
            runtime::sleep_ms(HANDSHAKE_POLL_INTERVAL_MS).await;
            match self.readiness.get() {
                Readiness::Ready => return true,
                Readiness::Failed => return false,
                _ => {}
            }
        }

        log::warn!("⚠️ Handshake still pending after bounded wait, proceeding local-only");
        false
    }

    /// Read a key. Never fails; worst case is `None`.
    ///
    /// Remote wins when it is reachable and holds a non-empty value
    /// (the value is written through to local). Otherwise the local
    /// value is returned, and uploaded to a ready remote so the two
    /// sides converge on whichever had data.
    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.cache.borrow().get(key) {
            log::debug!("Cache hit for {}", key);
            return Some(value.clone());
        }

        if self.ensure_ready().await {
            match self.remote.get(key).await {
                Ok(Some(value)) if !value.is_empty() => {
                    log::debug!("Remote hit for {} ({} bytes)", key, value.len());
                    self.cache.borrow_mut().insert(key.into(), value.clone());
                    if let Err(e) = self.local.set(key, &value) {
                        log::warn!("⚠️ Write-through to local failed for {}: {}", key, e);
                    }
                    return Some(value);
                }
                Ok(_) => log::debug!("Remote has nothing for {}, trying local", key),
                Err(e) => log::warn!("⚠️ Remote read failed for {}: {}", key, e),
            }
        }

        match self.local.get(key) {
            Ok(Some(value)) => {
                // Remote reachable but empty for this key: resolve the
                // divergence in favor of the side that has data.
                if self.readiness.get() == Readiness::Ready {
                    match self.remote.set(key, &value).await {
                        Ok(true) => log::debug!("Uploaded local value for {} to remote", key),
                        Ok(false) => log::warn!("⚠️ Remote refused upload of {}", key),
                        Err(e) => log::warn!("⚠️ Upload of {} to remote failed: {}", key, e),
                    }
                }
                self.cache.borrow_mut().insert(key.into(), value.clone());
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("⚠️ Local read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Write a key. Never fails; the return value reports local
    /// durability only.
    ///
    /// The local write happens first and unconditionally. If the
    /// remote store is ready, replication is attempted and awaited,
    /// but its failure is logged and swallowed — callers that want
    /// fire-and-forget simply don't await the returned future to
    /// completion before moving on.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        let local_ok = match self.local.set(key, value) {
            Ok(()) => {
                self.cache.borrow_mut().insert(key.into(), value.into());
                true
            }
            Err(e) => {
                log::warn!("⚠️ Local write failed for {}: {}", key, e);
                false
            }
        };

        if self.ensure_ready().await {
            match self.remote.set(key, value).await {
                Ok(true) => {
                    self.cache.borrow_mut().insert(key.into(), value.into());
                    log::debug!("Replicated {} to remote", key);
                }
                Ok(false) => log::warn!("⚠️ Remote refused write of {}", key),
                Err(e) => log::warn!("⚠️ Remote write failed for {}: {}", key, e),
            }
        }

        local_ok
    }

    /// Remove a key from cache and local store, and advisory-clear it
    /// remotely. The platform has no delete primitive, so "removed" is
    /// modeled as an empty value there. Never fails.
    pub async fn remove(&self, key: &str) {
        self.cache.borrow_mut().remove(key);

        if let Err(e) = self.local.remove(key) {
            log::warn!("⚠️ Local remove failed for {}: {}", key, e);
        }

        if self.ensure_ready().await {
            match self.remote.set(key, "").await {
                Ok(true) => log::debug!("Cleared {} on remote", key),
                Ok(false) => log::warn!("⚠️ Remote refused clear of {}", key),
                Err(e) => log::warn!("⚠️ Remote clear failed for {}: {}", key, e),
            }
        }
    }

    /// Pull several keys from the remote store in one round trip,
    /// warming the cache and the local store. Returns how many keys
    /// came back. Used at startup to fetch the progress keys together.
    pub async fn prefetch(&self, keys: &[String]) -> usize {
        if !self.ensure_ready().await {
            return 0;
        }

        let fetched = match self.remote.get_many(keys).await {
            Ok(map) => map,
            Err(e) => {
                log::warn!("⚠️ Prefetch of {} keys failed: {}", keys.len(), e);
                return 0;
            }
        };

        let mut count = 0;
        for (key, value) in fetched {
            if value.is_empty() {
                continue;
            }
            if let Err(e) = self.local.set(&key, &value) {
                log::warn!("⚠️ Write-through to local failed for {}: {}", key, e);
            }
            self.cache.borrow_mut().insert(key, value);
            count += 1;
        }

        log::info!("📦 Prefetched {} of {} keys", count, keys.len());
        count
    }

    /// Synchronous cache-only read. Advisory; may be stale or absent.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.cache.borrow().get(key).cloned()
    }

    /// Current remote availability as the bridge sees it
    pub fn readiness(&self) -> Readiness {
        self.readiness.get()
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            cache_entries: self.cache.borrow().len(),
            readiness: self.readiness.get(),
            handshake_window_spent: self.handshake_window_spent.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryLocalStore, MemoryRemoteStore};
    use futures::executor::block_on;

    type MemBridge = StorageBridge<MemoryLocalStore, MemoryRemoteStore>;

    fn harness(remote: MemoryRemoteStore) -> (MemBridge, MemoryLocalStore, MemoryRemoteStore) {
        let local = MemoryLocalStore::new();
        let bridge = StorageBridge::new(local.clone(), remote.clone());
        (bridge, local, remote)
    }

    #[test]
    fn test_set_is_locally_durable() {
        let (bridge, local, _remote) = harness(MemoryRemoteStore::new());

        assert!(block_on(bridge.set("k", "v")));
        assert_eq!(local.get("k").unwrap(), Some("v".into()));
    }

    #[test]
    fn test_set_survives_remote_failure() {
        let store = MemoryRemoteStore::new();
        store.fail_calls(true);
        let (bridge, local, remote) = harness(store);

        assert!(block_on(bridge.set("k", "v")));
        assert_eq!(local.get("k").unwrap(), Some("v".into()));
        assert_eq!(remote.value_of("k"), None);
    }

    #[test]
    fn test_set_reports_local_quota_failure() {
        let (bridge, local, remote) = harness(MemoryRemoteStore::new());
        local.fail_writes(true);

        assert!(!block_on(bridge.set("k", "v")));
        // Replication is still attempted; the remote copy lands.
        assert_eq!(remote.value_of("k"), Some("v".into()));
    }

    #[test]
    fn test_get_prefers_remote_and_writes_through() {
        let store = MemoryRemoteStore::new();
        store.seed("progress", "{level:3}");
        let (bridge, local, _remote) = harness(store);
        local.set("progress", "{level:1}").unwrap();

        assert_eq!(block_on(bridge.get("progress")), Some("{level:3}".into()));
        // The stale local copy has been overwritten.
        assert_eq!(local.get("progress").unwrap(), Some("{level:3}".into()));
    }

    #[test]
    fn test_get_falls_back_when_handshake_refused() {
        let (bridge, local, _remote) = harness(MemoryRemoteStore::refusing_handshake());
        local.set("progress", "{level:1}").unwrap();

        assert_eq!(block_on(bridge.get("progress")), Some("{level:1}".into()));
        assert_eq!(bridge.readiness(), Readiness::Failed);
    }

    #[test]
    fn test_get_falls_back_when_remote_call_fails() {
        let store = MemoryRemoteStore::new();
        store.fail_calls(true);
        let (bridge, local, _remote) = harness(store);
        local.set("k", "v").unwrap();

        assert_eq!(block_on(bridge.get("k")), Some("v".into()));
    }

    #[test]
    fn test_empty_remote_value_treated_as_absent() {
        let store = MemoryRemoteStore::new();
        store.seed("k", "");
        let (bridge, local, _remote) = harness(store);
        local.set("k", "local").unwrap();

        assert_eq!(block_on(bridge.get("k")), Some("local".into()));
    }

    #[test]
    fn test_get_absent_on_both_backends() {
        let (bridge, _local, _remote) = harness(MemoryRemoteStore::new());
        assert_eq!(block_on(bridge.get("missing")), None);
    }

    #[test]
    fn test_local_value_uploaded_to_empty_remote() {
        let (bridge, local, remote) = harness(MemoryRemoteStore::new());
        local.set("k", "v").unwrap();

        assert_eq!(block_on(bridge.get("k")), Some("v".into()));
        // Divergence resolved in favor of the side that had data.
        assert_eq!(remote.value_of("k"), Some("v".into()));
    }

    #[test]
    fn test_remove_clears_local_and_advisory_clears_remote() {
        let (bridge, local, remote) = harness(MemoryRemoteStore::new());
        block_on(bridge.set("k", "v"));

        block_on(bridge.remove("k"));

        assert_eq!(local.get("k").unwrap(), None);
        assert_eq!(bridge.peek("k"), None);
        // No delete primitive remotely; removed is empty.
        assert_eq!(remote.value_of("k"), Some(String::new()));
        assert_eq!(block_on(bridge.get("k")), None);
    }

    #[test]
    fn test_handshake_runs_once() {
        let (bridge, _local, remote) = harness(MemoryRemoteStore::new());

        block_on(bridge.get("a"));
        block_on(bridge.set("b", "1"));
        block_on(bridge.remove("b"));

        assert_eq!(remote.init_calls(), 1);
        assert_eq!(bridge.readiness(), Readiness::Ready);
    }

    #[test]
    fn test_failed_handshake_never_retried() {
        let (bridge, _local, remote) = harness(MemoryRemoteStore::refusing_handshake());

        block_on(bridge.get("a"));
        block_on(bridge.get("b"));
        block_on(bridge.set("c", "1"));

        assert_eq!(remote.init_calls(), 1);
        assert_eq!(bridge.readiness(), Readiness::Failed);
    }

    #[test]
    fn test_cache_short_circuits_remote() {
        let store = MemoryRemoteStore::new();
        store.seed("k", "first");
        let (bridge, _local, remote) = harness(store);

        assert_eq!(block_on(bridge.get("k")), Some("first".into()));

        // A remote change is not observed while the cache holds the key.
        remote.seed("k", "second");
        assert_eq!(block_on(bridge.get("k")), Some("first".into()));
        assert_eq!(bridge.peek("k"), Some("first".into()));
    }

    #[test]
    fn test_prefetch_warms_cache_and_local() {
        let store = MemoryRemoteStore::new();
        store.seed("a", "1");
        store.seed("b", "2");
        store.seed("empty", "");
        let (bridge, local, _remote) = harness(store);

        let keys: Vec<String> = ["a", "b", "empty", "missing"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(block_on(bridge.prefetch(&keys)), 2);

        assert_eq!(bridge.peek("a"), Some("1".into()));
        assert_eq!(local.get("b").unwrap(), Some("2".into()));
        assert_eq!(bridge.peek("empty"), None);
        assert_eq!(bridge.peek("missing"), None);
    }

    #[test]
    fn test_prefetch_degrades_to_zero() {
        let store = MemoryRemoteStore::new();
        store.fail_calls(true);
        let (bridge, _local, _remote) = harness(store);

        let keys = vec!["a".to_string()];
        assert_eq!(block_on(bridge.prefetch(&keys)), 0);
    }

    #[test]
    fn test_stats_reflect_state() {
        let (bridge, _local, _remote) = harness(MemoryRemoteStore::new());
        block_on(bridge.set("a", "1"));
        block_on(bridge.set("b", "2"));

        let stats = bridge.stats();
        assert_eq!(stats.cache_entries, 2);
        assert_eq!(stats.readiness, Readiness::Ready);
        assert!(!stats.handshake_window_spent);
    }
}
