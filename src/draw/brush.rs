//! Brush style and the per-brush stroke rules.

use super::color::{Color, RED};
use crate::input::BrushType;

/// Dash pattern of the dotted brush: 1 unit on, 30 units off.
pub const DOTTED_DASH: [f64; 2] = [1.0, 30.0];

/// Current paint settings, owned by the host and read on every draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushStyle {
    /// Stroke color (alpha is ignored, see [`BrushStyle::opacity`])
    pub color: Color,
    /// Stroke width in logical pixels
    pub width: f64,
    /// Opacity applied to the whole in-progress layer when compositing
    pub opacity: f64,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            color: RED,
            width: 5.0,
            opacity: 1.0,
        }
    }
}

/// Where a brush takes its stroke color from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSource {
    /// The active brush color at full alpha
    Brush,
    /// The canvas background color
    Background,
}

/// Fixed stroking policy for one brush type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeRule {
    pub cap: cairo::LineCap,
    /// Dash lengths in logical pixels; empty means solid
    pub dash: &'static [f64],
    pub source: ColorSource,
}

impl StrokeRule {
    /// Resolves the color this rule strokes with.
    pub fn color(&self, style: &BrushStyle, background: Color) -> Color {
        match self.source {
            ColorSource::Brush => style.color.opaque(),
            ColorSource::Background => background,
        }
    }

    /// Configures cap, join, width and dash on a Cairo context.
    pub fn apply(&self, ctx: &cairo::Context, width: f64) {
        ctx.set_line_width(width);
        ctx.set_line_cap(self.cap);
        ctx.set_line_join(cairo::LineJoin::Round);
        ctx.set_dash(self.dash, 0.0);
    }
}

/// Returns the stroke rule for a brush type.
pub fn stroke_rule(brush: BrushType) -> StrokeRule {
    match brush {
        BrushType::Round | BrushType::Arrow => StrokeRule {
            cap: cairo::LineCap::Round,
            dash: &[],
            source: ColorSource::Brush,
        },
        BrushType::Square => StrokeRule {
            cap: cairo::LineCap::Square,
            dash: &[],
            source: ColorSource::Brush,
        },
        BrushType::Dotted => StrokeRule {
            cap: cairo::LineCap::Round,
            dash: &DOTTED_DASH,
            source: ColorSource::Brush,
        },
        BrushType::Eraser => StrokeRule {
            cap: cairo::LineCap::Round,
            dash: &[],
            source: ColorSource::Background,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, WHITE};

    #[test]
    fn only_square_brush_uses_square_caps() {
        for brush in [
            BrushType::Round,
            BrushType::Dotted,
            BrushType::Arrow,
            BrushType::Eraser,
        ] {
            assert_eq!(stroke_rule(brush).cap, cairo::LineCap::Round, "{brush:?}");
        }
        assert_eq!(stroke_rule(BrushType::Square).cap, cairo::LineCap::Square);
    }

    #[test]
    fn dotted_brush_is_the_only_dashed_one() {
        assert_eq!(stroke_rule(BrushType::Dotted).dash, &[1.0, 30.0]);
        assert!(stroke_rule(BrushType::Round).dash.is_empty());
        assert!(stroke_rule(BrushType::Arrow).dash.is_empty());
    }

    #[test]
    fn eraser_strokes_with_background_color() {
        let style = BrushStyle {
            color: BLUE,
            width: 3.0,
            opacity: 0.4,
        };
        assert_eq!(stroke_rule(BrushType::Eraser).color(&style, WHITE), WHITE);
    }

    #[test]
    fn brush_color_is_forced_opaque() {
        let style = BrushStyle {
            color: Color::new(0.2, 0.4, 0.6, 0.3),
            width: 3.0,
            opacity: 0.5,
        };
        let color = stroke_rule(BrushType::Round).color(&style, WHITE);
        assert_eq!(color, Color::new(0.2, 0.4, 0.6, 1.0));
    }
}
