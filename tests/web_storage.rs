//! Browser-only coverage of the localStorage backend
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use miniapp_bridge::{LocalBackend, WebLocalStore};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_set_get_remove() {
    let store = WebLocalStore::new("test_sgr_").unwrap();

    store.set("key", "value").unwrap();
    assert_eq!(store.get("key").unwrap(), Some("value".to_string()));

    store.remove("key").unwrap();
    assert_eq!(store.get("key").unwrap(), None);
}

#[wasm_bindgen_test]
fn test_overwrite() {
    let store = WebLocalStore::new("test_ow_").unwrap();

    store.set("key", "first").unwrap();
    store.set("key", "second").unwrap();
    assert_eq!(store.get("key").unwrap(), Some("second".to_string()));

    store.remove("key").unwrap();
}

#[wasm_bindgen_test]
fn test_prefix_isolation() {
    let a = WebLocalStore::new("test_iso_a_").unwrap();
    let b = WebLocalStore::new("test_iso_b_").unwrap();

    a.set("key", "from_a").unwrap();
    assert_eq!(b.get("key").unwrap(), None);

    a.remove("key").unwrap();
}

#[wasm_bindgen_test]
fn test_keys_strips_prefix() {
    let store = WebLocalStore::new("test_keys_").unwrap();

    store.set("one", "1").unwrap();
    store.set("two", "2").unwrap();

    let mut keys = store.keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["one".to_string(), "two".to_string()]);

    store.remove("one").unwrap();
    store.remove("two").unwrap();
}
