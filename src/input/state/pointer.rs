use crate::draw::{Compositor, Point};
use crate::error::OverlayError;
use crate::input::events::PointerEvent;
use crate::input::tool::{BrushType, DrawMode};
use log::{debug, warn};

use super::{OverlayState, StrokeSession, StrokeState};

/// Mutable access to the layers, failing when no surface is configured.
fn layers(compositor: &mut Option<Compositor>) -> Result<&mut Compositor, OverlayError> {
    compositor.as_mut().ok_or(OverlayError::MissingSurface)
}

impl OverlayState {
    /// Routes a pointer event to the matching handler.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), OverlayError> {
        match event {
            PointerEvent::Down(point) => self.on_pointer_down(point),
            PointerEvent::Move(point) => self.on_pointer_move(point),
            PointerEvent::Up(point) => self.on_pointer_up(point),
        }
    }

    /// Starts a stroke at `point`.
    ///
    /// # Behavior
    /// - Snapshots the committed layer for undo before anything is drawn
    /// - Captures the current brush, mode and style for the whole gesture
    /// - Cancels a running fade and discards the fading stroke
    /// - Ignored while another contact is already drawing
    pub fn on_pointer_down(&mut self, point: Point) -> Result<(), OverlayError> {
        if self.is_drawing() {
            warn!(
                "Ignoring pointer-down at ({:.1}, {:.1}): a stroke is already in progress",
                point.x, point.y
            );
            return Ok(());
        }

        let compositor = layers(&mut self.compositor)?;
        let snapshot = compositor.committed_snapshot()?;

        if self.fade.is_active() {
            compositor.clear_scratch()?;
            compositor.set_scratch_opacity(1.0);
            self.fade.cancel();
            self.dirty_tracker.mark_full();
        }

        self.history.record_snapshot(snapshot);
        self.state = StrokeState::Drawing(StrokeSession {
            brush: self.brush,
            mode: self.mode,
            style: self.style,
            start: point,
            last: point,
            arrow_start: (self.brush == BrushType::Arrow).then_some(point),
            has_moved: false,
        });
        debug!(
            "Stroke started at ({:.1}, {:.1}) with {} brush",
            point.x,
            point.y,
            self.brush.name()
        );
        self.needs_redraw = true;
        Ok(())
    }

    /// Extends the active stroke with a segment ending at `point`.
    ///
    /// Moves without an active stroke are ignored.
    pub fn on_pointer_move(&mut self, point: Point) -> Result<(), OverlayError> {
        let StrokeState::Drawing(session) = &mut self.state else {
            return Ok(());
        };

        let compositor = layers(&mut self.compositor)?;
        compositor.draw_segment(
            session.last,
            point,
            &session.style,
            session.brush,
            self.background,
        )?;

        let from = session.last;
        let width = session.style.width;
        session.last = point;
        session.has_moved = true;

        self.mark_stroke_damage(&[from, point], width);
        Ok(())
    }

    /// Finishes the active stroke.
    ///
    /// # Behavior
    /// - A tap (no moves) draws a zero-length segment, which renders a dot
    /// - Arrow strokes get their head from the start point to `point`
    /// - Fading mode hands the scratch layer to the fade controller; normal
    ///   mode flattens it onto the committed layer
    /// - If any draw call fails, the stroke is rolled back: scratch is emptied
    ///   and the pointer-down snapshot is dropped, so layers and history look
    ///   as they did before the gesture
    pub fn on_pointer_up(&mut self, point: Point) -> Result<(), OverlayError> {
        let StrokeState::Drawing(session) = std::mem::replace(&mut self.state, StrokeState::Idle)
        else {
            return Ok(());
        };

        if let Err(err) = self.finish_stroke(&session, point) {
            warn!(
                "Stroke from ({:.1}, {:.1}) failed on release, rolling back: {err}",
                session.start.x, session.start.y
            );
            self.roll_back_stroke();
            return Err(err);
        }

        self.needs_redraw = true;
        Ok(())
    }

    fn finish_stroke(&mut self, session: &StrokeSession, point: Point) -> Result<(), OverlayError> {
        if !session.has_moved {
            layers(&mut self.compositor)?.draw_segment(
                session.last,
                session.last,
                &session.style,
                session.brush,
                self.background,
            )?;
            self.mark_stroke_damage(&[session.last], session.style.width);
        }

        if let Some(arrow_start) = session.arrow_start {
            let compositor = layers(&mut self.compositor)?;
            let [left, right] =
                compositor.draw_arrow_head(arrow_start, point, &session.style, &self.arrow)?;
            self.mark_stroke_damage(&[point, left, right], session.style.width);
        }

        match session.mode {
            DrawMode::Fading => {
                let generation = self.fade.start();
                debug!(
                    "Stroke from ({:.1}, {:.1}) handed to fade {generation}",
                    session.start.x, session.start.y
                );
            }
            DrawMode::Normal => {
                layers(&mut self.compositor)?.flatten()?;
                self.mark_full_damage();
                debug!(
                    "Stroke from ({:.1}, {:.1}) to ({:.1}, {:.1}) committed",
                    session.start.x, session.start.y, point.x, point.y
                );
            }
        }
        Ok(())
    }

    /// Discards a stroke whose release could not be completed.
    fn roll_back_stroke(&mut self) {
        if let Some(compositor) = self.compositor.as_mut() {
            if let Err(err) = compositor.clear_scratch() {
                warn!("Failed to clear scratch layer after a failed stroke: {err}");
            }
            compositor.set_scratch_opacity(1.0);
        }
        self.history.discard_last();
        self.mark_full_damage();
    }
}
