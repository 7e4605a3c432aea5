use crate::draw::{BrushStyle, Color, solid_background};
use crate::error::OverlayError;
use crate::fade::FadeTick;
use crate::input::tool::{BrushType, DrawMode};
use crate::util;
use cairo::ImageSurface;
use log::{debug, info, warn};

use super::{OverlayState, StrokeState};

/// Narrowest stroke the engine will draw, in logical pixels.
const MIN_STROKE_WIDTH: f64 = 0.5;

impl OverlayState {
    /// Selects the brush for the next stroke.
    pub fn set_brush_type(&mut self, brush: BrushType) {
        if self.brush != brush {
            debug!("Brush set to {}", brush.name());
        }
        self.brush = brush;
    }

    /// Selects the draw mode for the next stroke.
    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        if self.mode != mode {
            debug!("Draw mode set to {mode:?}");
        }
        self.mode = mode;
    }

    /// Replaces the paint settings for the next stroke.
    ///
    /// Width is kept at or above half a pixel and opacity inside `0.0..=1.0`.
    pub fn set_style(&mut self, style: BrushStyle) {
        let width = if style.width.is_finite() {
            style.width.max(MIN_STROKE_WIDTH)
        } else {
            warn!("Ignoring non-finite brush width; keeping {:.1}", self.style.width);
            self.style.width
        };
        let opacity = if style.opacity.is_nan() {
            self.style.opacity
        } else {
            style.opacity.clamp(0.0, 1.0)
        };
        self.style = BrushStyle {
            color: style.color,
            width,
            opacity,
        };
        debug!(
            "Style set to {} width {:.1} opacity {:.2}",
            util::color_to_name(&self.style.color),
            self.style.width,
            self.style.opacity
        );
    }

    /// Changes the color the eraser paints with.
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Clears both layers. Undoable.
    ///
    /// An in-progress stroke is abandoned first, and a running fade stops.
    pub fn reset(&mut self) -> Result<(), OverlayError> {
        self.cancel_stroke();
        let compositor = self.compositor.as_mut().ok_or(OverlayError::MissingSurface)?;
        // Recorded before the clear, which can fail halfway.
        let snapshot = compositor.committed_snapshot()?;
        self.history.record_snapshot(snapshot);
        compositor.set_scratch_opacity(1.0);
        self.fade.cancel();
        let cleared = compositor.clear();
        self.mark_full_damage();
        cleared?;
        info!("Canvas reset");
        Ok(())
    }

    /// Floods the committed layer with `color`. Undoable.
    pub fn fill(&mut self, color: Color) -> Result<(), OverlayError> {
        if self.is_drawing() {
            warn!("Ignoring fill while a stroke is in progress");
            return Ok(());
        }
        let compositor = self.compositor.as_mut().ok_or(OverlayError::MissingSurface)?;
        let snapshot = compositor.committed_snapshot()?;
        compositor.fill(color)?;
        self.history.record_snapshot(snapshot);
        self.mark_full_damage();
        debug!("Canvas filled with {}", util::color_to_name(&color));
        Ok(())
    }

    /// Steps back one action.
    ///
    /// Returns `false` without touching anything when there is nothing to
    /// undo or a stroke is in progress.
    pub fn undo(&mut self) -> Result<bool, OverlayError> {
        if self.is_drawing() {
            warn!("Ignoring undo while a stroke is in progress");
            return Ok(false);
        }
        let compositor = self.compositor.as_mut().ok_or(OverlayError::MissingSurface)?;
        if !self.history.can_undo() {
            debug!("Nothing to undo");
            return Ok(false);
        }
        let current = compositor.committed_snapshot()?;
        let Some(previous) = self.history.undo(current) else {
            return Ok(false);
        };
        compositor.replace_committed(previous)?;
        self.mark_full_damage();
        debug!("Undo ({} left)", self.history.undo_len());
        Ok(true)
    }

    /// Re-applies the most recently undone action; the mirror of [`OverlayState::undo`].
    pub fn redo(&mut self) -> Result<bool, OverlayError> {
        if self.is_drawing() {
            warn!("Ignoring redo while a stroke is in progress");
            return Ok(false);
        }
        let compositor = self.compositor.as_mut().ok_or(OverlayError::MissingSurface)?;
        if !self.history.can_redo() {
            debug!("Nothing to redo");
            return Ok(false);
        }
        let current = compositor.committed_snapshot()?;
        let Some(next) = self.history.redo(current) else {
            return Ok(false);
        };
        compositor.replace_committed(next)?;
        self.mark_full_damage();
        debug!("Redo ({} left)", self.history.redo_len());
        Ok(true)
    }

    /// Abandons the in-progress stroke.
    ///
    /// Clears the scratch layer and drops the snapshot recorded when the
    /// stroke started. Returns `true` if a stroke was cancelled.
    pub fn cancel_stroke(&mut self) -> bool {
        if !self.is_drawing() {
            return false;
        }
        self.state = StrokeState::Idle;
        if let Some(compositor) = self.compositor.as_mut() {
            if let Err(err) = compositor.clear_scratch() {
                warn!("Failed to clear scratch layer while cancelling stroke: {err}");
            }
            compositor.set_scratch_opacity(1.0);
        }
        self.history.discard_last();
        self.mark_full_damage();
        debug!("Stroke cancelled");
        true
    }

    /// Advances the fade animation by one tick.
    pub fn fade_tick(&mut self) -> Result<FadeTick, OverlayError> {
        let Some(compositor) = self.compositor.as_mut() else {
            self.fade.cancel();
            return Ok(FadeTick::Finished);
        };
        if !self.fade.is_active() {
            return Ok(FadeTick::Finished);
        }
        let tick = self.fade.tick(compositor)?;
        self.mark_full_damage();
        Ok(tick)
    }

    /// Stops a running fade and drops the fading stroke.
    pub fn cancel_fade(&mut self) -> bool {
        if !self.fade.cancel() {
            return false;
        }
        if let Some(compositor) = self.compositor.as_mut() {
            if let Err(err) = compositor.clear_scratch() {
                warn!("Failed to clear fading stroke: {err}");
            }
            compositor.set_scratch_opacity(1.0);
        }
        self.mark_full_damage();
        true
    }

    /// Paints what the overlay currently shows into a host context.
    pub fn render(&self, ctx: &cairo::Context) -> Result<(), OverlayError> {
        self.compositor()?.render(ctx)
    }

    /// Composites the committed drawing over `background` at native resolution.
    pub fn export_image(&self, background: &ImageSurface) -> Result<ImageSurface, OverlayError> {
        self.compositor()?.composite_for_export(background)
    }

    /// Like [`OverlayState::export_image`], over a solid fill of `color`.
    pub fn export_on_color(&self, color: Color) -> Result<ImageSurface, OverlayError> {
        let compositor = self.compositor()?;
        let background = solid_background(compositor.size(), color)?;
        compositor.composite_for_export(&background)
    }
}
