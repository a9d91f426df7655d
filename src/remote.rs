//! Platform-hosted remote store
//!
//! The Mini App container injects a save-data capability object into
//! the page. It is duck-typed: `init()`, `get(key)`, `getMany(keys)`
//! and `set(key, value)`, each returning a Promise. This module wraps
//! that object behind [`RemoteBackend`], going through `Reflect` so a
//! host that ships a partial capability degrades into errors instead
//! of panics.

use std::cell::Cell;
use std::collections::HashMap;

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::backend::RemoteBackend;
use crate::error::{BridgeError, Result};

/// `RemoteBackend` over the injected platform capability object
pub struct PlatformRemoteStore {
    platform: JsValue,
    // Handshake outcome, memoized for the process lifetime
    init_outcome: Cell<Option<bool>>,
}

impl PlatformRemoteStore {
    /// Wrap the platform object handed over by the embedding page.
    ///
    /// No validation happens here; a missing or malformed capability
    /// surfaces as a failed handshake on first use.
    pub fn new(platform: JsValue) -> Self {
        Self {
            platform,
            init_outcome: Cell::new(None),
        }
    }

    fn method(&self, name: &str) -> Result<Function> {
        let value = Reflect::get(&self.platform, &JsValue::from_str(name))
            .map_err(|e| BridgeError::RemoteCall(format!("platform.{} lookup failed: {:?}", name, e)))?;
        value
            .dyn_into::<Function>()
            .map_err(|_| BridgeError::RemoteCall(format!("platform.{} is not a function", name)))
    }

    /// Invoke a platform method and await its Promise.
    ///
    /// `Promise::resolve` tolerates hosts that answer synchronously.
    async fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue> {
        let func = self.method(name)?;

        let returned = match args {
            [] => func.call0(&self.platform),
            [a] => func.call1(&self.platform, a),
            [a, b] => func.call2(&self.platform, a, b),
            _ => unreachable!("platform methods take at most two arguments"),
        }
        .map_err(|e| BridgeError::RemoteCall(format!("platform.{} threw: {:?}", name, e)))?;

        let promise = Promise::resolve(&returned);
        JsFuture::from(promise)
            .await
            .map_err(|e| BridgeError::RemoteCall(format!("platform.{} rejected: {:?}", name, e)))
    }
}

#[async_trait(?Send)]
impl RemoteBackend for PlatformRemoteStore {
    async fn init(&self) -> Result<bool> {
        if let Some(outcome) = self.init_outcome.get() {
            return Ok(outcome);
        }

        match self.call("init", &[]).await {
            Ok(value) => {
                let ok = value.as_bool().unwrap_or(false);
                self.init_outcome.set(Some(ok));
                log::info!("Platform handshake completed: ready={}", ok);
                Ok(ok)
            }
            Err(e) => {
                // A rejected handshake is never retried this process.
                self.init_outcome.set(Some(false));
                Err(BridgeError::Handshake(e.to_string()))
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.call("get", &[JsValue::from_str(key)]).await?;

        if result.is_null() || result.is_undefined() {
            return Ok(None);
        }

        Ok(result.as_string())
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, String>> {
        let js_keys = Array::new();
        for key in keys {
            js_keys.push(&JsValue::from_str(key));
        }

        let result = self.call("getMany", &[js_keys.into()]).await?;

        let mut map = HashMap::new();
        if result.is_null() || result.is_undefined() {
            return Ok(map);
        }

        let object: &Object = result
            .dyn_ref()
            .ok_or_else(|| BridgeError::RemoteCall("getMany did not return an object".into()))?;

        for entry in Object::entries(object).iter() {
            let pair = Array::from(&entry);
            if let (Some(key), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                map.insert(key, value);
            }
        }

        log::debug!("getMany returned {} of {} keys", map.len(), keys.len());
        Ok(map)
    }

    async fn set(&self, key: &str, value: &str) -> Result<bool> {
        let result = self
            .call("set", &[JsValue::from_str(key), JsValue::from_str(value)])
            .await?;

        Ok(result.as_bool().unwrap_or(false))
    }
}
