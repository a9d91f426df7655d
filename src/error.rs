//! Error types for the storage bridge
//!
//! Errors are classified by origin rather than by mechanism:
//! - Handshake failures degrade the process to local-only, permanently
//! - Remote call failures are transient and per-call
//! - Local call failures (quota, missing localStorage) are logged and
//!   surfaced as negative/absent return values, never as exceptions
//!
//! None of these ever cross the bridge's public operations; the type
//! exists for the backend layer and the constructors.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Handshake errors (1xx)
    HandshakeFailed = 100,

    // Remote call errors (2xx)
    RemoteCallFailed = 200,

    // Local storage errors (3xx)
    LocalCallFailed = 300,

    // Payload errors (4xx)
    SerializeFailed = 400,
}

/// Main error type for the storage bridge
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    /// The platform capability is absent or rejected the handshake.
    /// Permanent for the rest of the process; never retried.
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// A single remote round trip failed. The next call may succeed.
    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    /// localStorage is unavailable, full, or threw on a synchronous call.
    #[error("Local storage error: {0}")]
    LocalCall(String),

    /// A typed payload failed to encode or decode.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl BridgeError {
    /// Get the error code for programmatic handling
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::Handshake(_) => ErrorCode::HandshakeFailed,
            BridgeError::RemoteCall(_) => ErrorCode::RemoteCallFailed,
            BridgeError::LocalCall(_) => ErrorCode::LocalCallFailed,
            BridgeError::Serialize(_) => ErrorCode::SerializeFailed,
        }
    }

    /// Whether the same call may succeed if issued again
    ///
    /// A failed handshake is memoized for the process lifetime, and a
    /// local storage failure (quota, blocked storage) will not clear
    /// itself between calls.
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::RemoteCall(_))
    }

    /// Get a user-friendly message for display
    pub fn user_message(&self) -> String {
        match self {
            BridgeError::Handshake(_) => {
                "Cloud saves are unavailable. Progress is kept on this device only.".into()
            }
            BridgeError::RemoteCall(_) => {
                "Could not reach cloud saves. Progress is kept on this device.".into()
            }
            BridgeError::LocalCall(_) => {
                "Failed to save data. Please check browser storage permissions.".into()
            }
            BridgeError::Serialize(_) => {
                "Saved data could not be read. It may be from an older version.".into()
            }
        }
    }
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
