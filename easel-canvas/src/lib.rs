//! easel-canvas: the canvas object graph the editor draws on.
//!
//! Design rules:
//! - The canvas is a flat, ordered list of objects (back to front).
//! - One object, the workspace (named [`WORKSPACE_NAME`]), defines the project size.
//! - Serialized state keeps base drawable fields plus only the allow-listed extras.
//! - Everything above this crate talks to the canvas through the [`Canvas`] trait.

use thiserror::Error;

pub mod document;
pub mod object;

pub use document::{Document, SerializedCanvas, CANVAS_FORMAT_VERSION};
pub use object::{CanvasObject, ObjectKind, ShapePreset};

/// Reserved name of the workspace object.
pub const WORKSPACE_NAME: &str = "clip";

/// Extra object properties kept in serialized snapshots.
pub const HISTORY_JSON_KEYS: &[&str] = &[
    "name",
    "gradientAngle",
    "selectable",
    "hasControls",
    "linkData",
    "editable",
    "extension",
    "extensionType",
];

/// Contract the history and editor layers rely on.
///
/// Mirrors what a retained-mode graphics canvas offers: serialize, clear,
/// reload, look objects up by name and repaint.
pub trait Canvas {
    /// Serialize the whole canvas, keeping only `keys` among the extra properties.
    fn serialize(&self, keys: &[&str]) -> Result<String, CanvasError>;

    /// Remove every object.
    fn clear(&mut self);

    /// Replace the canvas content with a previously serialized state.
    ///
    /// On error the canvas content is left as it was before the call.
    fn load_from_serialized(&mut self, data: &str) -> Result<(), CanvasError>;

    fn find_object_by_name(&self, name: &str) -> Option<&CanvasObject>;

    fn render_all(&mut self);
}

/// Canvas-level errors.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("failed to serialize canvas: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("malformed canvas state: {0}")]
    Malformed(#[source] serde_json::Error),
}
