//! Cairo-based rendering functions for stroke pieces and layers.

use super::brush::StrokeRule;
use super::color::Color;
use super::geometry::Point;
use crate::error::OverlayError;

/// Strokes a straight segment using the given brush rule.
///
/// A zero-length segment is filled as the cap shape, so a tap leaves a dot of
/// the brush width: a square for square caps, a circle otherwise. Dash patterns
/// do not apply to the dot.
pub fn render_segment(
    ctx: &cairo::Context,
    from: Point,
    to: Point,
    rule: &StrokeRule,
    color: Color,
    width: f64,
) -> Result<(), OverlayError> {
    color.apply(ctx);
    rule.apply(ctx, width);

    // Cairo drops degenerate sub-paths for square caps and may for dashed ones.
    if from == to {
        let half = width / 2.0;
        if rule.cap == cairo::LineCap::Square {
            ctx.rectangle(from.x - half, from.y - half, width, width);
        } else {
            ctx.new_sub_path();
            ctx.arc(from.x, from.y, half, 0.0, std::f64::consts::TAU);
        }
        ctx.fill()?;
        return Ok(());
    }

    ctx.move_to(from.x, from.y);
    ctx.line_to(to.x, to.y);
    ctx.stroke()?;
    Ok(())
}

/// Renders the two arrowhead sides from the tip to each tail point.
pub fn render_arrow_head(
    ctx: &cairo::Context,
    tip: Point,
    tails: [Point; 2],
    color: Color,
    width: f64,
) -> Result<(), OverlayError> {
    color.apply(ctx);
    ctx.set_line_width(width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_dash(&[], 0.0);

    // Left side of arrowhead
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(tails[0].x, tails[0].y);
    ctx.stroke()?;

    // Right side of arrowhead
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(tails[1].x, tails[1].y);
    ctx.stroke()?;
    Ok(())
}

/// Paints a whole surface on top of the context's target at the given opacity.
///
/// Uses the normal OVER blend. Nothing is painted for a zero opacity.
pub fn paint_layer(
    ctx: &cairo::Context,
    surface: &cairo::ImageSurface,
    opacity: f64,
) -> Result<(), OverlayError> {
    if opacity <= 0.0 {
        return Ok(());
    }
    ctx.set_source_surface(surface, 0.0, 0.0)?;
    ctx.paint_with_alpha(opacity.clamp(0.0, 1.0))?;
    Ok(())
}

/// Floods the context's target with a solid color, replacing what was there.
pub fn fill_solid(ctx: &cairo::Context, color: Color) -> Result<(), OverlayError> {
    ctx.save()?;
    ctx.set_operator(cairo::Operator::Source);
    color.apply(ctx);
    ctx.paint()?;
    ctx.restore()?;
    Ok(())
}

/// Paints `background` stretched over a `width` x `height` pixel target.
pub fn paint_background(
    ctx: &cairo::Context,
    background: &cairo::ImageSurface,
    width: i32,
    height: i32,
) -> Result<(), OverlayError> {
    let (bg_width, bg_height) = (background.width(), background.height());
    if bg_width <= 0 || bg_height <= 0 {
        return Ok(());
    }

    ctx.save()?;
    ctx.scale(
        width as f64 / bg_width as f64,
        height as f64 / bg_height as f64,
    );
    ctx.set_source_surface(background, 0.0, 0.0)?;
    ctx.paint()?;
    ctx.restore()?;
    Ok(())
}
