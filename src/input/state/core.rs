//! Stroke state machine and overlay engine state.

use crate::config::Config;
use crate::draw::{ArrowGeometry, BrushStyle, Color, Compositor, DirtyTracker, Point, SurfaceSize, WHITE};
use crate::error::OverlayError;
use crate::fade::{FadeController, FadeSettings};
use crate::history::History;
use crate::input::tool::{BrushType, DrawMode};
use crate::util::Rect;
use cairo::ImageSurface;
use log::{debug, info};

/// Per-gesture state, created on pointer-down and dropped on pointer-up.
///
/// Brush, mode and style are captured when the gesture starts, so changing
/// them mid-stroke only affects the next stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSession {
    /// Brush used for the whole gesture
    pub brush: BrushType,
    /// Draw mode applied when the gesture ends
    pub mode: DrawMode,
    /// Paint settings used for every segment
    pub style: BrushStyle,
    /// Where the pointer went down
    pub start: Point,
    /// End of the most recently drawn segment
    pub last: Point,
    /// Shaft origin for arrow strokes
    pub arrow_start: Option<Point>,
    /// Whether any move arrived since pointer-down
    pub has_moved: bool,
}

/// Gesture state machine: `Idle -> Drawing -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeState {
    /// No contact - waiting for pointer-down
    Idle,
    /// A single contact is drawing
    Drawing(StrokeSession),
}

/// Initial engine settings, usually derived from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    pub brush: BrushType,
    pub mode: DrawMode,
    pub style: BrushStyle,
    /// Canvas background used by the eraser
    pub background: Color,
    pub arrow: ArrowGeometry,
    /// Snapshots kept per history stack
    pub history_depth: usize,
    pub fade: FadeSettings,
}

impl From<&Config> for OverlaySettings {
    fn from(config: &Config) -> Self {
        Self {
            brush: config.brush.default_type,
            mode: config.brush.default_mode,
            style: BrushStyle {
                color: config.brush.default_color.to_color(),
                width: config.brush.default_width,
                opacity: config.brush.default_opacity,
            },
            background: config.canvas.background_color.to_color_or(WHITE),
            arrow: ArrowGeometry {
                head_offset: config.arrow.head_offset,
                angle_degrees: config.arrow.angle_degrees,
            },
            history_depth: config.history.max_depth,
            fade: FadeSettings::from(&config.fade),
        }
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// The drawing engine: compositor, history, fade controller and the active
/// stroke session.
///
/// Hosts construct one per overlay, call [`OverlayState::configure_surface`]
/// once the surface size is known, then feed it pointer events and commands.
/// After each call the host checks `needs_redraw` (and optionally drains
/// [`OverlayState::take_damage`]) and repaints with [`OverlayState::render`].
pub struct OverlayState {
    /// Raster layers; `None` until the host configures a surface
    pub(super) compositor: Option<Compositor>,
    /// Undo/redo snapshots of the committed layer
    pub(super) history: History<ImageSurface>,
    /// Fade animation for the fading draw mode
    pub(super) fade: FadeController,
    /// Current gesture state
    pub state: StrokeState,
    /// Brush for the next stroke
    pub(super) brush: BrushType,
    /// Draw mode for the next stroke
    pub(super) mode: DrawMode,
    /// Paint settings for the next stroke
    pub(super) style: BrushStyle,
    /// Color the eraser paints with
    pub(super) background: Color,
    /// Arrowhead shape
    pub(super) arrow: ArrowGeometry,
    /// Whether the display needs to be redrawn
    pub needs_redraw: bool,
    /// Tracks dirty regions between renders
    pub(crate) dirty_tracker: DirtyTracker,
}

impl OverlayState {
    /// Creates an engine with no surface yet.
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            compositor: None,
            history: History::new(settings.history_depth),
            fade: FadeController::new(settings.fade),
            state: StrokeState::Idle,
            brush: settings.brush,
            mode: settings.mode,
            style: settings.style,
            background: settings.background,
            arrow: settings.arrow,
            needs_redraw: true,
            dirty_tracker: DirtyTracker::new(),
        }
    }

    /// Allocates (or reallocates) the raster layers for the host surface.
    ///
    /// Reconfiguring with the same size keeps everything. A different size
    /// drops the canvas, the history, any running fade and the active stroke,
    /// since snapshots of the old size can no longer be restored.
    pub fn configure_surface(&mut self, size: SurfaceSize) -> Result<(), OverlayError> {
        if self.compositor.as_ref().is_some_and(|c| c.size() == size) {
            debug!("Surface unchanged at {}x{} (scale {})", size.width, size.height, size.scale);
            return Ok(());
        }

        let compositor = Compositor::new(size)?;
        if self.compositor.replace(compositor).is_some() {
            info!(
                "Surface resized to {}x{} (scale {}); discarding canvas and history",
                size.width, size.height, size.scale
            );
        }
        self.history.clear();
        self.fade.cancel();
        self.state = StrokeState::Idle;
        self.dirty_tracker.mark_full();
        self.needs_redraw = true;
        Ok(())
    }

    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.compositor.as_ref().map(Compositor::size)
    }

    /// Read access to the raster layers.
    pub fn compositor(&self) -> Result<&Compositor, OverlayError> {
        self.compositor.as_ref().ok_or(OverlayError::MissingSurface)
    }

    pub fn brush_type(&self) -> BrushType {
        self.brush
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.mode
    }

    pub fn style(&self) -> BrushStyle {
        self.style
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn arrow_geometry(&self) -> ArrowGeometry {
        self.arrow
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of snapshots on the (undo, redo) stacks.
    pub fn history_len(&self) -> (usize, usize) {
        (self.history.undo_len(), self.history.redo_len())
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing(_))
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_active()
    }

    /// Generation of the running fade; changes every time a new fade starts.
    pub fn fade_generation(&self) -> Option<u64> {
        self.fade.generation()
    }

    pub fn fade_settings(&self) -> FadeSettings {
        self.fade.settings()
    }

    /// Drains the device-pixel regions changed since the last call.
    pub fn take_damage(&mut self) -> Vec<Rect> {
        match self.surface_size() {
            Some(size) => self
                .dirty_tracker
                .take_regions(size.pixel_width(), size.pixel_height()),
            None => Vec::new(),
        }
    }

    /// Marks the stroke footprint through `points` as damaged.
    pub(super) fn mark_stroke_damage(&mut self, points: &[Point], width: f64) {
        if let Some(size) = self.surface_size() {
            let bounds = crate::draw::geometry::stroke_bounds(points, width, size.scale);
            self.dirty_tracker.mark_optional_rect(bounds);
        }
        self.needs_redraw = true;
    }

    /// Marks the whole surface as damaged.
    pub(super) fn mark_full_damage(&mut self) {
        self.dirty_tracker.mark_full();
        self.needs_redraw = true;
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new(OverlaySettings::default())
    }
}
