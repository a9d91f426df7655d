//! Typed game-progress snapshots over the bridge
//!
//! The state scraper running alongside the game hands over a
//! `(level, group, completed)` triple whenever it manages to pull one
//! out of the game's client state. This module is only the typed sink
//! for that triple; how the scraper finds it is its own business and
//! deliberately not modeled here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::backend::{LocalBackend, RemoteBackend};
use crate::bridge::StorageBridge;

/// Storage key the snapshot lives under
pub const PROGRESS_KEY: &str = "progress";

/// One scraped observation of the game's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub level: u32,
    pub group: u32,
    /// Identifiers of completed stages. A set, not a list: the scraper
    /// can observe the same stage twice across snapshots.
    pub completed: BTreeSet<String>,
}

impl ProgressSnapshot {
    pub fn new(level: u32, group: u32, completed: BTreeSet<String>) -> Self {
        Self {
            level,
            group,
            completed,
        }
    }
}

/// Save/load `ProgressSnapshot`s through a bridge.
///
/// Same failure policy as the bridge itself: `save` reports local
/// durability, `load` answers `None` for both "nothing saved" and
/// "saved payload unreadable".
pub struct ProgressStore<'a, L, R> {
    bridge: &'a StorageBridge<L, R>,
}

impl<'a, L: LocalBackend, R: RemoteBackend> ProgressStore<'a, L, R> {
    pub fn new(bridge: &'a StorageBridge<L, R>) -> Self {
        Self { bridge }
    }

    pub async fn save(&self, snapshot: &ProgressSnapshot) -> bool {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("⚠️ Could not encode progress snapshot: {}", e);
                return false;
            }
        };

        log::debug!(
            "💾 Saving progress: level={} group={} completed={}",
            snapshot.level,
            snapshot.group,
            snapshot.completed.len()
        );
        self.bridge.set(PROGRESS_KEY, &json).await
    }

    pub async fn load(&self) -> Option<ProgressSnapshot> {
        let json = self.bridge.get(PROGRESS_KEY).await?;

        match serde_json::from_str(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                // Older payloads or a foreign writer. Treat as unsaved.
                log::warn!("⚠️ Stored progress is unreadable: {}", e);
                None
            }
        }
    }
}
