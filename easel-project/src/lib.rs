//! easel-project: project records, where they are stored, and debounced autosave.
//!
//! Projects are the durable unit of work. They store:
//! - the serialized canvas (same JSON the history records)
//! - the workspace dimensions
//! - a display name

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use easel_history::SavePayload;

pub mod autosave;
pub mod store;

pub use autosave::{Autosave, AutosaveConfig, Clock, ManualClock, SystemClock};
pub use store::{FileProjectStore, MemoryProjectStore, ProjectStore, PROJECT_FILE_EXT};

/// Default workspace size for new projects.
pub const DEFAULT_WIDTH: f32 = 900.0;
pub const DEFAULT_HEIGHT: f32 = 1200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub name: String,
    /// Serialized canvas. Empty for a project that was never edited.
    #[serde(default)]
    pub json: String,
    pub width: f32,
    pub height: f32,
}

impl ProjectRecord {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Result<Self, ProjectError> {
        if !valid_dimension(width) || !valid_dimension(height) {
            tracing::error!(width, height, "rejecting project with invalid dimensions");
            return Err(ProjectError::InvalidDimensions { width, height });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            json: String::new(),
            width,
            height,
        })
    }

    /// Overwrite the stored canvas with a save payload.
    pub fn apply(&mut self, payload: &SavePayload) {
        self.json = payload.json.clone();
        self.width = payload.width;
        self.height = payload.height;
    }
}

/// Workspace dimensions must be positive and finite.
pub fn valid_dimension(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project not found: {id}")]
    NotFound { id: Uuid },

    #[error("dimensions must be positive finite numbers (got {width}x{height})")]
    InvalidDimensions { width: f32, height: f32 },
}
