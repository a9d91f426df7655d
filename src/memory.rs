//! In-memory backends
//!
//! Used by the test suite and for running the bridge on native targets
//! where no browser storage exists. Stores are cheap clones over
//! shared state, so a test can hand one to the bridge and keep a
//! handle for seeding and assertions. The remote store supports
//! failure injection and counts handshake round trips so idempotence
//! is observable.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;

use crate::backend::{LocalBackend, RemoteBackend};
use crate::error::{BridgeError, Result};

#[derive(Default)]
struct LocalInner {
    data: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

/// `LocalBackend` over a plain HashMap
#[derive(Clone, Default)]
pub struct MemoryLocalStore {
    inner: Rc<LocalInner>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail, as a full quota would.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.set(fail);
    }
}

impl LocalBackend for MemoryLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.inner.fail_writes.get() {
            return Err(BridgeError::LocalCall("quota exceeded".into()));
        }
        self.inner.data.borrow_mut().insert(key.into(), value.into());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.data.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.inner.data.borrow().keys().cloned().collect())
    }
}

#[derive(Default)]
struct RemoteInner {
    data: RefCell<HashMap<String, String>>,
    init_calls: Cell<u32>,
    init_outcome: Cell<Option<bool>>,
    reject_handshake: Cell<bool>,
    hang_handshake: Cell<bool>,
    fail_calls: Cell<bool>,
}

/// `RemoteBackend` over a plain HashMap, with failure injection
#[derive(Clone, Default)]
pub struct MemoryRemoteStore {
    inner: Rc<RemoteInner>,
}

impl MemoryRemoteStore {
    /// A store whose handshake succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose handshake reports failure (platform capability
    /// present but permission denied).
    pub fn refusing_handshake() -> Self {
        let store = Self::default();
        store.inner.reject_handshake.set(true);
        store
    }

    /// A store whose handshake never resolves.
    pub fn hanging_handshake() -> Self {
        let store = Self::default();
        store.inner.hang_handshake.set(true);
        store
    }

    /// Make every get/getMany/set round trip fail.
    pub fn fail_calls(&self, fail: bool) {
        self.inner.fail_calls.set(fail);
    }

    /// Seed a value as if the platform already held it.
    pub fn seed(&self, key: &str, value: &str) {
        self.inner.data.borrow_mut().insert(key.into(), value.into());
    }

    /// Direct view of a stored value, for assertions.
    pub fn value_of(&self, key: &str) -> Option<String> {
        self.inner.data.borrow().get(key).cloned()
    }

    /// How many handshake round trips actually ran.
    pub fn init_calls(&self) -> u32 {
        self.inner.init_calls.get()
    }
}

#[async_trait(?Send)]
impl RemoteBackend for MemoryRemoteStore {
    async fn init(&self) -> Result<bool> {
        if let Some(outcome) = self.inner.init_outcome.get() {
            return Ok(outcome);
        }
        if self.inner.hang_handshake.get() {
            futures::future::pending::<()>().await;
        }

        self.inner.init_calls.set(self.inner.init_calls.get() + 1);
        let ok = !self.inner.reject_handshake.get();
        self.inner.init_outcome.set(Some(ok));
        Ok(ok)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.inner.fail_calls.get() {
            return Err(BridgeError::RemoteCall("injected failure".into()));
        }
        Ok(self.inner.data.borrow().get(key).cloned())
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, String>> {
        if self.inner.fail_calls.get() {
            return Err(BridgeError::RemoteCall("injected failure".into()));
        }
        let data = self.inner.data.borrow();
        Ok(keys
            .iter()
            .filter_map(|k| data.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> Result<bool> {
        if self.inner.fail_calls.get() {
            return Err(BridgeError::RemoteCall("injected failure".into()));
        }
        self.inner.data.borrow_mut().insert(key.into(), value.into());
        Ok(true)
    }
}
