// --- WebSocket Message Structures ---

use analytics::DashboardView;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// The maximum number of messages kept for replay to newly connected clients.
pub const WS_CACHE_SIZE: usize = 200;

/// Recent messages replayed to a client before it goes live.
pub type WsCache = Arc<Mutex<VecDeque<WsMessage>>>;

pub fn new_cache() -> WsCache {
    Arc::new(Mutex::new(VecDeque::with_capacity(WS_CACHE_SIZE)))
}

/// Appends to the replay cache, evicting the oldest entry when full.
pub fn push_cached(cache: &WsCache, msg: WsMessage) {
    // A poisoned cache only loses replay history.
    if let Ok(mut cache) = cache.lock() {
        if cache.len() >= WS_CACHE_SIZE {
            cache.pop_front();
        }
        cache.push_back(msg);
    }
}

/// A copy of the replay cache, oldest first.
pub fn cached_messages(cache: &WsCache) -> Vec<WsMessage> {
    cache
        .lock()
        .map(|cache| cache.iter().cloned().collect())
        .unwrap_or_default()
}

/// Represents a log message event to be sent to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct WsLogMessage {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

/// Which input slot triggered a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKind {
    Returns,
    Stats,
}

/// A freshly recomputed dashboard, rendered with the default parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WsSnapshotUpdate {
    pub timestamp: DateTime<Utc>,
    pub slot: SlotKind,
    pub view: DashboardView,
}

/// The top-level WebSocket message enum.
/// `tag` and `content` are used by serde for clean JSON representation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum WsMessage {
    Log(WsLogMessage),
    SnapshotUpdated(Box<WsSnapshotUpdate>),
}
