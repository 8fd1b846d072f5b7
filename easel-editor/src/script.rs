//! Edit scripts: a JSON list of editor commands replayed against a session.
//!
//! Used by `easel replay` to drive a project headlessly. Time only moves on
//! `wait` steps, so debounce behaviour is reproducible.

use anyhow::Context;
use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use easel_canvas::ShapePreset;
use easel_project::{ManualClock, ProjectStore};

use crate::{ActiveTool, EditorError, EditorSession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddShape { shape: ShapePreset },
    AddText { text: String },
    Stroke { left: f32, top: f32, width: f32, height: f32 },
    Select { indices: Vec<usize> },
    ClearSelection,
    Fill { color: Color32 },
    StrokeColor { color: Color32 },
    StrokeWidth { width: f32 },
    StrokeDash { dash: Vec<f32> },
    Opacity { value: f32 },
    BringForward,
    SendBackwards,
    Delete,
    Resize { width: f32, height: f32 },
    Tool { tool: ActiveTool },
    Undo,
    Redo,
    Wait { ms: u64 },
}

/// Summary of a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub history_len: usize,
    pub cursor: usize,
    pub objects: usize,
    pub saves: u64,
}

pub fn load_script(path: impl AsRef<Path>) -> anyhow::Result<Vec<EditCommand>> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read script file: {}", path.display()))?;
    let steps: Vec<EditCommand> = serde_json::from_str(&data).context("parse script json")?;
    Ok(steps)
}

impl<S: ProjectStore> EditorSession<S, ManualClock> {
    /// Apply one command. `wait` advances the session clock and polls autosave.
    pub fn apply(&mut self, command: &EditCommand) -> Result<(), EditorError> {
        debug!(?command, "Applying command");
        match command {
            EditCommand::AddShape { shape } => {
                self.add_shape(*shape)?;
            }
            EditCommand::AddText { text } => {
                self.add_text(text.clone())?;
            }
            EditCommand::Stroke {
                left,
                top,
                width,
                height,
            } => {
                self.finish_stroke(*left, *top, *width, *height)?;
            }
            EditCommand::Select { indices } => self.select(indices),
            EditCommand::ClearSelection => self.clear_selection(),
            EditCommand::Fill { color } => {
                self.change_fill_color(*color)?;
            }
            EditCommand::StrokeColor { color } => {
                self.change_stroke_color(*color)?;
            }
            EditCommand::StrokeWidth { width } => {
                self.change_stroke_width(*width)?;
            }
            EditCommand::StrokeDash { dash } => {
                self.change_stroke_dash_array(dash.clone())?;
            }
            EditCommand::Opacity { value } => {
                self.change_opacity(*value)?;
            }
            EditCommand::BringForward => {
                self.bring_forward()?;
            }
            EditCommand::SendBackwards => {
                self.send_backwards()?;
            }
            EditCommand::Delete => {
                self.delete_selected()?;
            }
            EditCommand::Resize { width, height } => {
                self.resize_workspace(*width, *height)?;
            }
            EditCommand::Tool { tool } => self.change_tool(*tool),
            EditCommand::Undo => {
                self.undo()?;
            }
            EditCommand::Redo => {
                self.redo()?;
            }
            EditCommand::Wait { ms } => {
                self.autosave().clock().advance(Duration::from_millis(*ms));
                self.tick()?;
            }
        }
        Ok(())
    }

    /// Apply every command in order and summarise the result.
    pub fn replay(&mut self, steps: &[EditCommand]) -> Result<ReplayReport, EditorError> {
        for step in steps {
            self.apply(step)?;
        }
        let report = ReplayReport {
            steps: steps.len(),
            history_len: self.history().len(),
            cursor: self.history().cursor(),
            objects: self.canvas().len(),
            saves: self.autosave().delivered(),
        };
        info!(?report, "Replay finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let steps: Vec<EditCommand> = serde_json::from_str(
            r#"[
                { "op": "add_shape", "shape": "circle" },
                { "op": "fill", "color": [255, 0, 0, 255] },
                { "op": "tool", "tool": "stroke-color" },
                { "op": "stroke_dash", "dash": [5, 5] },
                { "op": "undo" },
                { "op": "wait", "ms": 600 }
            ]"#,
        )
        .unwrap();

        assert_eq!(steps.len(), 6);
        assert_eq!(steps[0], EditCommand::AddShape { shape: ShapePreset::Circle });
        assert_eq!(steps[1], EditCommand::Fill { color: Color32::RED });
        assert_eq!(steps[2], EditCommand::Tool { tool: ActiveTool::StrokeColor });
        assert_eq!(steps[3], EditCommand::StrokeDash { dash: vec![5.0, 5.0] });
        assert_eq!(steps[5], EditCommand::Wait { ms: 600 });
    }

    #[test]
    fn test_unknown_op_rejected() {
        let result: Result<Vec<EditCommand>, _> =
            serde_json::from_str(r#"[{ "op": "explode" }]"#);
        assert!(result.is_err());
    }
}
