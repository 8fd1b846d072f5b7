// In-memory canvas used by the editor session.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::{Canvas, CanvasError, CanvasObject};

/// Version tag written into every serialized canvas.
pub const CANVAS_FORMAT_VERSION: &str = "1";

/// On-disk / in-history shape of a serialized canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedCanvas {
    pub version: String,
    pub objects: Vec<CanvasObject>,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    objects: Vec<CanvasObject>,
    selection: Vec<usize>,
    drawing_mode: bool,
    render_count: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A blank document holding only a workspace of the given size.
    pub fn with_workspace(width: f32, height: f32) -> Self {
        info!("Creating document with {}x{} workspace", width, height);
        let mut doc = Self::new();
        doc.objects.push(CanvasObject::workspace(width, height));
        doc
    }

    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&CanvasObject> {
        self.objects.get(index)
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut CanvasObject> {
        self.objects.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn workspace(&self) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.is_workspace())
    }

    pub fn workspace_mut(&mut self) -> Option<&mut CanvasObject> {
        self.objects.iter_mut().find(|o| o.is_workspace())
    }

    /// Centre `obj` on the workspace (or leave it where it is without one).
    pub fn center_on_workspace(&self, obj: &mut CanvasObject) {
        match self.workspace() {
            Some(ws) => {
                let (cx, cy) = ws.center();
                obj.left = cx - obj.width / 2.0;
                obj.top = cy - obj.height / 2.0;
            }
            None => warn!("No workspace to centre object on"),
        }
    }

    /// Append an object on top and select it. Returns its index.
    pub fn add(&mut self, obj: CanvasObject) -> usize {
        debug!(kind = ?obj.kind, "Adding object");
        self.objects.push(obj);
        let index = self.objects.len() - 1;
        self.selection = vec![index];
        index
    }

    /// Remove the object at `index`, keeping selection indices consistent.
    pub fn remove(&mut self, index: usize) -> Option<CanvasObject> {
        if index >= self.objects.len() {
            warn!("Attempted to remove object at invalid index {}", index);
            return None;
        }
        let removed = self.objects.remove(index);
        self.selection.retain(|&i| i != index);
        for i in self.selection.iter_mut() {
            if *i > index {
                *i -= 1;
            }
        }
        debug!(kind = ?removed.kind, index, "Removed object");
        Some(removed)
    }

    /// Select the given objects. Unknown or unselectable indices are ignored.
    pub fn select(&mut self, indices: &[usize]) {
        self.selection = indices
            .iter()
            .copied()
            .filter(|&i| self.objects.get(i).is_some_and(|o| o.is_selectable()))
            .collect();
        trace!("Selection is now {:?}", self.selection);
    }

    /// Clear the selection. Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let had = !self.selection.is_empty();
        self.selection.clear();
        had
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Swap the object one step towards the front.
    pub fn bring_forward(&mut self, index: usize) -> bool {
        if index + 1 >= self.objects.len() {
            return false;
        }
        self.swap(index, index + 1);
        true
    }

    /// Swap the object one step towards the back, never below the workspace.
    pub fn send_backwards(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.objects.len() || self.objects[index - 1].is_workspace() {
            return false;
        }
        self.swap(index, index - 1);
        true
    }

    /// Move every selected object one step up, keeping their relative order.
    ///
    /// An object whose upper neighbour is also selected stays put.
    pub fn bring_selection_forward(&mut self) -> bool {
        let mut targets = self.selection.clone();
        targets.sort_unstable_by(|a, b| b.cmp(a));
        let mut moved = false;
        for index in targets {
            if self.selection.contains(&(index + 1)) {
                continue;
            }
            moved |= self.bring_forward(index);
        }
        moved
    }

    /// Move every selected object one step down, keeping their relative order.
    ///
    /// An object whose lower neighbour is also selected stays put.
    pub fn send_selection_backwards(&mut self) -> bool {
        let mut targets = self.selection.clone();
        targets.sort_unstable();
        let mut moved = false;
        for index in targets {
            if index > 0 && self.selection.contains(&(index - 1)) {
                continue;
            }
            moved |= self.send_backwards(index);
        }
        moved
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.objects.swap(a, b);
        for i in self.selection.iter_mut() {
            if *i == a {
                *i = b;
            } else if *i == b {
                *i = a;
            }
        }
    }

    pub fn drawing_mode(&self) -> bool {
        self.drawing_mode
    }

    pub fn set_drawing_mode(&mut self, enabled: bool) {
        debug!("Drawing mode {}", if enabled { "on" } else { "off" });
        self.drawing_mode = enabled;
        if enabled {
            self.selection.clear();
        }
    }

    /// How many times the canvas has been repainted.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }
}

impl Canvas for Document {
    fn serialize(&self, keys: &[&str]) -> Result<String, CanvasError> {
        let state = SerializedCanvas {
            version: CANVAS_FORMAT_VERSION.to_string(),
            objects: self.objects.iter().map(|o| o.filtered(keys)).collect(),
        };
        let json = serde_json::to_string(&state).map_err(CanvasError::Serialize)?;
        trace!("Serialized {} objects ({} bytes)", state.objects.len(), json.len());
        Ok(json)
    }

    fn clear(&mut self) {
        info!("Clearing canvas");
        self.objects.clear();
        self.selection.clear();
    }

    fn load_from_serialized(&mut self, data: &str) -> Result<(), CanvasError> {
        let state: SerializedCanvas = serde_json::from_str(data).map_err(CanvasError::Malformed)?;
        if state.version != CANVAS_FORMAT_VERSION {
            warn!(version = %state.version, "Loading canvas with unexpected format version");
        }
        debug!("Loaded {} objects", state.objects.len());
        self.objects = state.objects;
        self.selection.clear();
        Ok(())
    }

    fn find_object_by_name(&self, name: &str) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.name() == Some(name))
    }

    fn render_all(&mut self) {
        self.render_count += 1;
        trace!("Rendered canvas (#{})", self.render_count);
    }
}
