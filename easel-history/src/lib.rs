//! easel-history: linear undo/redo over serialized canvas snapshots.
//!
//! Design rules:
//! - History is an owned list of snapshots plus a cursor; no shared cells.
//! - Every capture reports the current state to a [`SaveSink`], skip or not.
//! - Undo/redo are two-phase: the cursor moves only after the canvas loaded the target.
//! - Redo tail truncation on a new action is configurable (on by default).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use easel_canvas::CanvasError;

pub mod history;

pub use history::{Direction, History, Restore};

/// One serialized canvas state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn new(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// What gets forwarded to project persistence on every capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub json: String,
    pub width: f32,
    pub height: f32,
}

/// Receiver of save payloads. Expected to tolerate redundant calls.
pub trait SaveSink {
    fn save(&mut self, payload: SavePayload);
}

impl<F> SaveSink for F
where
    F: FnMut(SavePayload),
{
    fn save(&mut self, payload: SavePayload) {
        self(payload)
    }
}

/// Sink that throws payloads away (e.g. read-only previews).
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl SaveSink for DiscardSink {
    fn save(&mut self, _payload: SavePayload) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Drop redo states when a new action is recorded after an undo.
    #[serde(default = "default_truncate_redo")]
    pub truncate_redo_on_new_action: bool,

    /// Oldest snapshots are discarded past this many. `None` keeps everything.
    #[serde(default)]
    pub max_states: Option<usize>,
}

fn default_truncate_redo() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            truncate_redo_on_new_action: default_truncate_redo(),
            max_states: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error("failed to restore snapshot {index}: {source}")]
    Load {
        index: usize,
        #[source]
        source: CanvasError,
    },

    #[error("restore of snapshot {index} no longer matches history")]
    StaleRestore { index: usize },
}
