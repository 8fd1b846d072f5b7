//! Drawable objects and the presets the editor inserts.

use egui::Color32;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::WORKSPACE_NAME;

pub const DEFAULT_SHAPE_WIDTH: f32 = 150.0;
pub const DEFAULT_SHAPE_HEIGHT: f32 = 150.0;
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
pub const STROKE_DASH_ARRAY: &[f32] = &[];
pub const DEFAULT_OPACITY: f32 = 1.0;
pub const DEFAULT_FONT_SIZE: f32 = 40.0;
pub const FILL_COLOR: Color32 = Color32::BLACK;
pub const STROKE_COLOR: Color32 = Color32::BLACK;

/// What kind of drawable an object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Rect,
    Circle,
    Triangle,
    Polygon,
    Textbox,
    Image,
    Path,
}

/// Shapes offered by the shape sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapePreset {
    Circle,
    Rectangle,
    SoftRectangle,
    Triangle,
    InverseTriangle,
    Diamond,
}

/// A single object on the canvas.
///
/// Base drawable fields are always serialized. Anything else (name,
/// selectability, link data...) lives in `props` and is filtered by the
/// persisted allow-list on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub angle: f32,
    pub fill: Color32,
    pub stroke: Color32,
    pub stroke_width: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stroke_dash_array: Vec<f32>,
    pub opacity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl CanvasObject {
    pub fn new(kind: ObjectKind, width: f32, height: f32) -> Self {
        Self {
            kind,
            left: 0.0,
            top: 0.0,
            width,
            height,
            angle: 0.0,
            fill: FILL_COLOR,
            stroke: STROKE_COLOR,
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_dash_array: STROKE_DASH_ARRAY.to_vec(),
            opacity: DEFAULT_OPACITY,
            corner_radius: None,
            text: None,
            font_size: None,
            props: Map::new(),
        }
    }

    /// The white, locked rectangle that defines the project area.
    pub fn workspace(width: f32, height: f32) -> Self {
        let mut obj = Self::new(ObjectKind::Rect, width, height);
        obj.fill = Color32::WHITE;
        obj.stroke = Color32::TRANSPARENT;
        obj.stroke_width = 0.0;
        obj.with_prop("name", WORKSPACE_NAME)
            .with_prop("selectable", false)
            .with_prop("hasControls", false)
    }

    pub fn from_preset(preset: ShapePreset) -> Self {
        let (w, h) = (DEFAULT_SHAPE_WIDTH, DEFAULT_SHAPE_HEIGHT);
        match preset {
            ShapePreset::Circle => Self::new(ObjectKind::Circle, w, h),
            ShapePreset::Rectangle => Self::new(ObjectKind::Rect, w, h),
            ShapePreset::SoftRectangle => {
                let mut obj = Self::new(ObjectKind::Rect, w, h);
                obj.corner_radius = Some(50.0);
                obj
            }
            ShapePreset::Triangle => Self::new(ObjectKind::Triangle, w, h),
            ShapePreset::InverseTriangle => {
                let mut obj = Self::new(ObjectKind::Triangle, w, h);
                obj.angle = 180.0;
                obj
            }
            ShapePreset::Diamond => Self::new(ObjectKind::Polygon, 200.0, 200.0),
        }
    }

    pub fn textbox(text: impl Into<String>) -> Self {
        let mut obj = Self::new(ObjectKind::Textbox, 400.0, DEFAULT_FONT_SIZE);
        obj.left = 100.0;
        obj.top = 100.0;
        obj.stroke_width = 0.0;
        obj.text = Some(text.into());
        obj.font_size = Some(DEFAULT_FONT_SIZE);
        obj
    }

    /// Builder-style setter for an extra property.
    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.props.get("name").and_then(Value::as_str)
    }

    /// Objects are selectable unless explicitly marked otherwise.
    pub fn is_selectable(&self) -> bool {
        self.props
            .get("selectable")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn is_workspace(&self) -> bool {
        self.name() == Some(WORKSPACE_NAME)
    }

    /// Copy of this object with extra properties reduced to `keys`.
    pub fn filtered(&self, keys: &[&str]) -> Self {
        let mut obj = self.clone();
        obj.props.retain(|k, _| keys.contains(&k.as_str()));
        obj
    }

    pub fn center(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HISTORY_JSON_KEYS;

    #[test]
    fn test_workspace_is_locked() {
        let ws = CanvasObject::workspace(900.0, 1200.0);
        assert!(ws.is_workspace());
        assert!(!ws.is_selectable());
        assert_eq!(ws.fill, Color32::WHITE);
    }

    #[test]
    fn test_filtered_drops_unlisted_props() {
        let obj = CanvasObject::from_preset(ShapePreset::Rectangle)
            .with_prop("name", "box")
            .with_prop("linkData", "https://example.com")
            .with_prop("hoverCursor", "move");

        let filtered = obj.filtered(HISTORY_JSON_KEYS);
        assert_eq!(filtered.name(), Some("box"));
        assert!(filtered.props.contains_key("linkData"));
        assert!(!filtered.props.contains_key("hoverCursor"));
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let obj = CanvasObject::textbox("hello");
        let value = serde_json::to_value(&obj).unwrap();
        assert_eq!(value["type"], "textbox");
        assert_eq!(value["fontSize"], 40.0);
        assert!(value.get("strokeWidth").is_some());
        assert!(value.get("cornerRadius").is_none());
        assert!(value.get("strokeDashArray").is_none());
    }

    #[test]
    fn test_stroke_dash_array_roundtrip() {
        let mut obj = CanvasObject::from_preset(ShapePreset::Rectangle);
        obj.stroke_dash_array = vec![5.0, 5.0];
        let value = serde_json::to_value(&obj).unwrap();
        assert_eq!(value["strokeDashArray"], serde_json::json!([5.0, 5.0]));

        let back: CanvasObject = serde_json::from_value(value).unwrap();
        assert_eq!(back.stroke_dash_array, vec![5.0, 5.0]);
        assert!(!back.props.contains_key("strokeDashArray"));
    }

    #[test]
    fn test_presets() {
        assert_eq!(CanvasObject::from_preset(ShapePreset::Diamond).width, 200.0);
        assert_eq!(
            CanvasObject::from_preset(ShapePreset::InverseTriangle).angle,
            180.0
        );
        assert_eq!(
            CanvasObject::from_preset(ShapePreset::SoftRectangle).corner_radius,
            Some(50.0)
        );
    }
}
