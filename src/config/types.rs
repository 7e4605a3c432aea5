//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::input::{BrushType, DrawMode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Brush defaults applied when the overlay starts.
///
/// The host can change every one of these at runtime through the engine's
/// setters; the new values apply from the next stroke.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BrushConfig {
    /// Initial brush shape (round, square, dotted, arrow, eraser)
    #[serde(default)]
    pub default_type: BrushType,

    /// Initial pen color - either a named color (red, green, blue, yellow, orange, pink, white, black)
    /// or an RGB array like `[255, 0, 0]` for red
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Initial stroke width in pixels (valid range: 1.0 - 100.0)
    #[serde(default = "default_width")]
    pub default_width: f64,

    /// Initial stroke opacity (valid range: 0.05 - 1.0)
    #[serde(default = "default_opacity")]
    pub default_opacity: f64,

    /// Whether finished strokes commit (normal) or fade away (fading)
    #[serde(default)]
    pub default_mode: DrawMode,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            default_type: BrushType::default(),
            default_color: default_color(),
            default_width: default_width(),
            default_opacity: default_opacity(),
            default_mode: DrawMode::default(),
        }
    }
}

/// Canvas settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Color the eraser paints with and the export background when the host
    /// provides no image
    #[serde(default = "default_background_color")]
    pub background_color: ColorSpec,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
        }
    }
}

/// Undo/redo history settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Maximum snapshots kept per stack (valid range: 1 - 200)
    /// Each snapshot is a full copy of the canvas, so memory grows with
    /// canvas size times depth
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Fade animation settings for the fading draw mode.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FadeConfig {
    /// Opacity removed per tick (valid range: 0.005 - 1.0)
    #[serde(default = "default_fade_step")]
    pub step: f64,

    /// Milliseconds between ticks (valid range: 4 - 250)
    #[serde(default = "default_fade_tick_ms")]
    pub tick_ms: u64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            step: default_fade_step(),
            tick_ms: default_fade_tick_ms(),
        }
    }
}

/// Arrow drawing settings.
///
/// Controls the appearance of arrowheads when using the arrow brush. The head
/// length is `head_offset + brush width`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArrowConfig {
    /// Length added to the brush width for each head side (valid range: 0.0 - 100.0)
    #[serde(default = "default_arrow_offset")]
    pub head_offset: f64,

    /// Arrowhead angle in degrees (valid range: 10.0 - 80.0)
    /// Smaller angles create narrower arrowheads, larger angles create wider ones
    #[serde(default = "default_arrow_angle")]
    pub angle_degrees: f64,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            head_offset: default_arrow_offset(),
            angle_degrees: default_arrow_angle(),
        }
    }
}

/// Export settings used when no explicit output path is given.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportConfig {
    /// Directory for exported images (supports `~/`)
    #[serde(default = "default_save_directory")]
    pub save_directory: String,

    /// Filename template (chrono format specifiers, no extension)
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Image format extension (only "png" is supported)
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
            filename_template: default_filename_template(),
            format: default_format(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_width() -> f64 {
    5.0
}

fn default_opacity() -> f64 {
    1.0
}

fn default_background_color() -> ColorSpec {
    ColorSpec::Name("white".to_string())
}

fn default_max_depth() -> usize {
    crate::history::DEFAULT_MAX_DEPTH
}

fn default_fade_step() -> f64 {
    crate::fade::DEFAULT_FADE_STEP
}

fn default_fade_tick_ms() -> u64 {
    crate::fade::DEFAULT_FADE_TICK.as_millis() as u64
}

fn default_arrow_offset() -> f64 {
    crate::draw::geometry::ARROW_HEAD_OFFSET
}

fn default_arrow_angle() -> f64 {
    crate::draw::geometry::ARROW_HEAD_ANGLE_DEGREES
}

fn default_save_directory() -> String {
    "~/Pictures/Inkveil".to_string()
}

fn default_filename_template() -> String {
    "drawing_%Y-%m-%d_%H%M%S".to_string()
}

fn default_format() -> String {
    "png".to_string()
}
