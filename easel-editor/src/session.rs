//! Editor session: one open project with its canvas, history and autosave.
//!
//! Every canvas mutation goes through a command here, which records a
//! history snapshot afterwards. Snapshots feed the autosave, which decides
//! when the project actually gets written.

use egui::Color32;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use easel_canvas::{Canvas, CanvasError, CanvasObject, Document, ObjectKind, ShapePreset};
use easel_history::{History, HistoryError};
use easel_project::{valid_dimension, Autosave, Clock, ProjectRecord, ProjectStore, SystemClock};

use crate::tools::{ActiveTool, ToolEffect, ToolState};
use crate::EditorConfig;

/// Style applied to new objects; updated by the colour/width/opacity controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Color32,
    pub stroke: Color32,
    pub stroke_width: f32,
    pub stroke_dash_array: Vec<f32>,
    pub opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: easel_canvas::object::FILL_COLOR,
            stroke: easel_canvas::object::STROKE_COLOR,
            stroke_width: easel_canvas::object::DEFAULT_STROKE_WIDTH,
            stroke_dash_array: easel_canvas::object::STROKE_DASH_ARRAY.to_vec(),
            opacity: easel_canvas::object::DEFAULT_OPACITY,
        }
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("failed to open project: {0}")]
    Open(#[source] CanvasError),

    #[error(transparent)]
    Save(#[from] anyhow::Error),
}

pub struct EditorSession<S: ProjectStore, K: Clock = SystemClock> {
    name: String,
    canvas: Document,
    history: History,
    autosave: Autosave<S, K>,
    tools: ToolState,
    style: Style,
    config: EditorConfig,
}

impl<S: ProjectStore, K: Clock> EditorSession<S, K> {
    /// Open a project. A project without stored canvas gets a blank workspace.
    pub fn open(
        record: ProjectRecord,
        store: S,
        clock: K,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        info!(id = %record.id, name = %record.name, "Opening project");

        let mut canvas = if record.json.trim().is_empty() {
            Document::with_workspace(record.width, record.height)
        } else {
            let mut doc = Document::new();
            doc.load_from_serialized(&record.json)
                .map_err(EditorError::Open)?;
            if doc.workspace().is_none() {
                warn!("Stored project has no workspace object");
            }
            doc
        };
        canvas.render_all();

        let mut history = History::new(config.history.clone());
        history.reset(&canvas)?;

        let autosave = Autosave::new(record.id, store, clock, &config.autosave);

        Ok(Self {
            name: record.name,
            canvas,
            history,
            autosave,
            tools: ToolState::new(),
            style: Style::default(),
            config,
        })
    }

    // Record the current canvas and hand it to autosave.
    fn commit(&mut self) -> Result<(), EditorError> {
        self.canvas.render_all();
        self.history.capture(&self.canvas, false, &mut self.autosave)?;
        Ok(())
    }

    fn insert(&mut self, mut obj: CanvasObject) -> Result<usize, EditorError> {
        self.canvas.center_on_workspace(&mut obj);
        let index = self.canvas.add(obj);
        self.commit()?;
        Ok(index)
    }

    pub fn add_shape(&mut self, preset: ShapePreset) -> Result<usize, EditorError> {
        let mut obj = CanvasObject::from_preset(preset);
        obj.fill = self.style.fill;
        obj.stroke = self.style.stroke;
        obj.stroke_width = self.style.stroke_width;
        obj.stroke_dash_array = self.style.stroke_dash_array.clone();
        obj.opacity = self.style.opacity;
        self.insert(obj)
    }

    pub fn add_text(&mut self, text: impl Into<String>) -> Result<usize, EditorError> {
        let mut obj = CanvasObject::textbox(text);
        obj.fill = self.style.fill;
        self.insert(obj)
    }

    /// Finish a freehand stroke. Ignored unless drawing mode is on.
    pub fn finish_stroke(
        &mut self,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    ) -> Result<Option<usize>, EditorError> {
        if !self.canvas.drawing_mode() {
            debug!("Stroke ignored outside drawing mode");
            return Ok(None);
        }
        if ![left, top, width, height].iter().all(|v| v.is_finite()) {
            warn!(left, top, width, height, "Stroke ignored, non-finite geometry");
            return Ok(None);
        }
        let mut obj = CanvasObject::new(ObjectKind::Path, width, height);
        obj.left = left;
        obj.top = top;
        obj.fill = Color32::TRANSPARENT;
        obj.stroke = self.style.stroke;
        obj.stroke_width = self.style.stroke_width;
        obj.stroke_dash_array = self.style.stroke_dash_array.clone();
        let index = self.canvas.add(obj);
        self.canvas.clear_selection();
        self.commit()?;
        Ok(Some(index))
    }

    pub fn select(&mut self, indices: &[usize]) {
        self.canvas.select(indices);
        if self.canvas.selection().is_empty() {
            self.tools.selection_cleared();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.canvas.clear_selection() {
            self.tools.selection_cleared();
        }
    }

    // Apply `f` to every selected object, then record. `false` if nothing was selected.
    fn modify_selected(&mut self, f: impl Fn(&mut CanvasObject)) -> Result<bool, EditorError> {
        let selection = self.canvas.selection().to_vec();
        if selection.is_empty() {
            return Ok(false);
        }
        for index in selection {
            if let Some(obj) = self.canvas.object_mut(index) {
                f(obj);
            }
        }
        self.commit()?;
        Ok(true)
    }

    pub fn change_fill_color(&mut self, color: Color32) -> Result<bool, EditorError> {
        self.style.fill = color;
        self.modify_selected(|o| o.fill = color)
    }

    pub fn change_stroke_color(&mut self, color: Color32) -> Result<bool, EditorError> {
        self.style.stroke = color;
        self.modify_selected(|o| {
            // text has no outline; its stroke colour is its fill
            if o.kind == ObjectKind::Textbox {
                o.fill = color;
            } else {
                o.stroke = color;
            }
        })
    }

    /// Non-finite widths are ignored; negative ones become 0.
    pub fn change_stroke_width(&mut self, width: f32) -> Result<bool, EditorError> {
        if !width.is_finite() {
            warn!(width, "Ignoring non-finite stroke width");
            return Ok(false);
        }
        let width = width.max(0.0);
        self.style.stroke_width = width;
        self.modify_selected(|o| o.stroke_width = width)
    }

    /// An empty pattern means a solid line. Rejected if any segment is negative or non-finite.
    pub fn change_stroke_dash_array(&mut self, dash: Vec<f32>) -> Result<bool, EditorError> {
        if !dash.iter().all(|v| v.is_finite() && *v >= 0.0) {
            warn!(?dash, "Ignoring invalid stroke dash pattern");
            return Ok(false);
        }
        self.style.stroke_dash_array = dash.clone();
        self.modify_selected(|o| o.stroke_dash_array = dash.clone())
    }

    /// Opacity is clamped to [0, 1]; non-finite values are ignored.
    pub fn change_opacity(&mut self, opacity: f32) -> Result<bool, EditorError> {
        if !opacity.is_finite() {
            warn!(opacity, "Ignoring non-finite opacity");
            return Ok(false);
        }
        let opacity = opacity.clamp(0.0, 1.0);
        self.style.opacity = opacity;
        self.modify_selected(|o| o.opacity = opacity)
    }

    pub fn bring_forward(&mut self) -> Result<bool, EditorError> {
        let moved = self.canvas.bring_selection_forward();
        if moved {
            self.commit()?;
        }
        Ok(moved)
    }

    pub fn send_backwards(&mut self) -> Result<bool, EditorError> {
        let moved = self.canvas.send_selection_backwards();
        if moved {
            self.commit()?;
        }
        Ok(moved)
    }

    pub fn delete_selected(&mut self) -> Result<usize, EditorError> {
        let mut selection = self.canvas.selection().to_vec();
        if selection.is_empty() {
            return Ok(0);
        }
        selection.sort_unstable_by(|a, b| b.cmp(a));
        let removed = selection
            .into_iter()
            .filter_map(|index| self.canvas.remove(index))
            .count();
        self.tools.selection_cleared();
        self.commit()?;
        Ok(removed)
    }

    /// Resize the workspace (project dimensions).
    ///
    /// Dimensions follow the same rule as new projects: positive and finite.
    pub fn resize_workspace(&mut self, width: f32, height: f32) -> Result<bool, EditorError> {
        if !valid_dimension(width) || !valid_dimension(height) {
            warn!(width, height, "Ignoring invalid workspace size");
            return Ok(false);
        }
        match self.canvas.workspace_mut() {
            Some(ws) => {
                ws.width = width;
                ws.height = height;
            }
            None => {
                warn!("No workspace to resize");
                return Ok(false);
            }
        }
        info!(width, height, "Workspace resized");
        self.commit()?;
        Ok(true)
    }

    pub fn change_tool(&mut self, tool: ActiveTool) {
        for effect in self.tools.change(tool) {
            match effect {
                ToolEffect::EnableDrawing => self.canvas.set_drawing_mode(true),
                ToolEffect::DisableDrawing => self.canvas.set_drawing_mode(false),
            }
        }
    }

    /// Step back. The restored state is reported to autosave but not re-recorded.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        if !self.history.undo(&mut self.canvas)? {
            return Ok(false);
        }
        self.history.capture(&self.canvas, true, &mut self.autosave)?;
        Ok(true)
    }

    /// Step forward. The restored state is reported to autosave but not re-recorded.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        if !self.history.redo(&mut self.canvas)? {
            return Ok(false);
        }
        self.history.capture(&self.canvas, true, &mut self.autosave)?;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Let autosave deliver anything whose debounce window elapsed.
    pub fn tick(&mut self) -> Result<bool, EditorError> {
        Ok(self.autosave.poll()?)
    }

    /// Close the session, flushing or dropping the pending save per config.
    pub fn close(mut self) -> Result<(), EditorError> {
        if self.config.autosave.flush_on_close {
            self.autosave.flush()?;
        } else if self.autosave.cancel() {
            warn!("Discarded unsaved edit on close");
        }
        info!(name = %self.name, "Project closed");
        Ok(())
    }

    pub fn project_id(&self) -> Uuid {
        self.autosave.project_id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canvas(&self) -> &Document {
        &self.canvas
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn autosave(&self) -> &Autosave<S, K> {
        &self.autosave
    }

    pub fn active_tool(&self) -> ActiveTool {
        self.tools.active()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }
}
