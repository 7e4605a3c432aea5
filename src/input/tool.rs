//! Brush and draw-mode selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Brush shape used for the next stroke.
///
/// The brush decides the line cap, the dash pattern and where the stroke color
/// comes from (see [`crate::draw::brush::stroke_rule`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BrushType {
    /// Round-capped solid line (default)
    #[default]
    Round,
    /// Square-capped solid line
    Square,
    /// Round dots spaced along the path
    Dotted,
    /// Solid shaft with a V-shaped head added on release
    Arrow,
    /// Paints the canvas background color over existing content
    Eraser,
}

impl BrushType {
    /// Human-readable brush name for logs and status output.
    pub fn name(self) -> &'static str {
        match self {
            BrushType::Round => "Round",
            BrushType::Square => "Square",
            BrushType::Dotted => "Dotted",
            BrushType::Arrow => "Arrow",
            BrushType::Eraser => "Eraser",
        }
    }
}

/// What happens to a finished stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// Commit the stroke onto the canvas immediately
    #[default]
    Normal,
    /// Let the stroke fade out instead of committing it
    Fading,
}
