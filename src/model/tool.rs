//! Tool and shape modes.

use annotrace_vision::ShapeRequest;
use serde::{Deserialize, Serialize};

use super::annotation::ShapeKind;

/// What a pointer-down on the canvas does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Freehand stroke, refined into a shape on release
    #[default]
    Draw,
    /// Drag out and edit an axis-aligned rectangle
    Rectangle,
    /// Pick an existing annotation
    Select,
}

impl ToolMode {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Draw => "Draw",
            ToolMode::Rectangle => "Rectangle",
            ToolMode::Select => "Select",
        }
    }

    pub fn all() -> &'static [ToolMode] {
        &[ToolMode::Draw, ToolMode::Rectangle, ToolMode::Select]
    }

    /// Parse the lowercase name used by hosts and scripts.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "draw" => Some(ToolMode::Draw),
            "rectangle" => Some(ToolMode::Rectangle),
            "select" => Some(ToolMode::Select),
            _ => None,
        }
    }
}

/// Which kind of shape a freehand stroke turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMode {
    #[default]
    Polygon,
    #[serde(rename = "bbox")]
    BBox,
}

impl ShapeMode {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeMode::Polygon => ShapeKind::Polygon,
            ShapeMode::BBox => ShapeKind::Bbox,
        }
    }

    /// Refinement request for this mode.
    pub fn request(&self, sides: u8) -> ShapeRequest {
        match self {
            ShapeMode::Polygon => ShapeRequest::Polygon { sides },
            ShapeMode::BBox => ShapeRequest::OrientedBox,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "polygon" => Some(ShapeMode::Polygon),
            "bbox" => Some(ShapeMode::BBox),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_round_trip() {
        for tool in ToolMode::all() {
            assert_eq!(ToolMode::from_name(tool.name()), Some(*tool));
        }
        assert_eq!(ToolMode::from_name("pan"), None);
    }

    #[test]
    fn test_shape_mode_request() {
        assert_eq!(
            ShapeMode::Polygon.request(6),
            ShapeRequest::Polygon { sides: 6 }
        );
        assert_eq!(ShapeMode::BBox.request(6), ShapeRequest::OrientedBox);
    }

    #[test]
    fn test_shape_mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&ShapeMode::BBox).expect("serialize"),
            "\"bbox\""
        );
        assert_eq!(ShapeMode::from_name("BBox"), Some(ShapeMode::BBox));
    }
}
