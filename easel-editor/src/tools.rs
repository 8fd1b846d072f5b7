// Tool activation for the editor sidebar.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Which sidebar panel / interaction mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveTool {
    #[default]
    Select,
    Shapes,
    Text,
    Images,
    Draw,
    Fill,
    StrokeColor,
    StrokeWidth,
    Font,
    Opacity,
    Filter,
    Settings,
    Ai,
    RemoveBg,
    Templates,
}

/// Tools that only make sense with something selected.
pub const SELECTION_DEPENDENT_TOOLS: &[ActiveTool] = &[
    ActiveTool::Fill,
    ActiveTool::Filter,
    ActiveTool::Font,
    ActiveTool::Opacity,
    ActiveTool::RemoveBg,
    ActiveTool::StrokeColor,
    ActiveTool::StrokeWidth,
];

impl ActiveTool {
    pub fn name(&self) -> &'static str {
        match self {
            ActiveTool::Select => "select",
            ActiveTool::Shapes => "shapes",
            ActiveTool::Text => "text",
            ActiveTool::Images => "images",
            ActiveTool::Draw => "draw",
            ActiveTool::Fill => "fill",
            ActiveTool::StrokeColor => "stroke-color",
            ActiveTool::StrokeWidth => "stroke-width",
            ActiveTool::Font => "font",
            ActiveTool::Opacity => "opacity",
            ActiveTool::Filter => "filter",
            ActiveTool::Settings => "settings",
            ActiveTool::Ai => "ai",
            ActiveTool::RemoveBg => "remove-bg",
            ActiveTool::Templates => "templates",
        }
    }

    pub fn needs_selection(&self) -> bool {
        SELECTION_DEPENDENT_TOOLS.contains(self)
    }
}

/// Side effects the canvas has to carry out after a tool change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEffect {
    EnableDrawing,
    DisableDrawing,
}

#[derive(Debug, Clone, Default)]
pub struct ToolState {
    active: ActiveTool,
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ActiveTool {
        self.active
    }

    /// Activate `tool`. Picking the tool that is already active toggles back to select.
    ///
    /// Effects are returned in the order they must be applied.
    pub fn change(&mut self, tool: ActiveTool) -> Vec<ToolEffect> {
        let mut effects = Vec::new();

        if tool == ActiveTool::Draw {
            effects.push(ToolEffect::EnableDrawing);
        }
        if self.active == ActiveTool::Draw {
            effects.push(ToolEffect::DisableDrawing);
        }

        let next = if tool == self.active {
            ActiveTool::Select
        } else {
            tool
        };
        debug!(from = self.active.name(), to = next.name(), "Tool changed");
        self.active = next;
        effects
    }

    /// Selection went away: tools that depend on it fall back to select.
    pub fn selection_cleared(&mut self) -> bool {
        if self.active.needs_selection() {
            trace!(tool = self.active.name(), "Selection cleared, back to select");
            self.active = ActiveTool::Select;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_tool() {
        let mut tools = ToolState::new();
        assert!(tools.change(ActiveTool::Shapes).is_empty());
        assert_eq!(tools.active(), ActiveTool::Shapes);
    }

    #[test]
    fn test_same_tool_toggles_to_select() {
        let mut tools = ToolState::new();
        tools.change(ActiveTool::Font);
        tools.change(ActiveTool::Font);
        assert_eq!(tools.active(), ActiveTool::Select);
    }

    #[test]
    fn test_draw_enables_and_leaving_disables() {
        let mut tools = ToolState::new();
        assert_eq!(tools.change(ActiveTool::Draw), vec![ToolEffect::EnableDrawing]);
        assert_eq!(tools.change(ActiveTool::Text), vec![ToolEffect::DisableDrawing]);
        assert_eq!(tools.active(), ActiveTool::Text);
    }

    #[test]
    fn test_draw_toggle_off_ends_disabled() {
        let mut tools = ToolState::new();
        tools.change(ActiveTool::Draw);
        let effects = tools.change(ActiveTool::Draw);
        assert_eq!(effects, vec![ToolEffect::EnableDrawing, ToolEffect::DisableDrawing]);
        assert_eq!(tools.active(), ActiveTool::Select);
    }

    #[test]
    fn test_selection_cleared_only_resets_dependent_tools() {
        let mut tools = ToolState::new();
        tools.change(ActiveTool::Opacity);
        assert!(tools.selection_cleared());
        assert_eq!(tools.active(), ActiveTool::Select);

        tools.change(ActiveTool::Templates);
        assert!(!tools.selection_cleared());
        assert_eq!(tools.active(), ActiveTool::Templates);
    }

    #[test]
    fn test_tool_names_match_serde() {
        for tool in [ActiveTool::RemoveBg, ActiveTool::StrokeColor, ActiveTool::Ai] {
            let json = serde_json::to_string(&tool).unwrap();
            assert_eq!(json, format!("\"{}\"", tool.name()));
        }
    }
}
