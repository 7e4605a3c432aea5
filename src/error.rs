//! Errors produced by the drawing engine.

use thiserror::Error;

/// Errors that can occur while drawing, compositing or exporting.
///
/// Empty undo/redo stacks are not errors; those operations simply report that
/// nothing changed.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("drawing surface has not been configured")]
    MissingSurface,

    #[error("invalid surface size {width}x{height} at scale {scale}")]
    InvalidSurfaceSize { width: i32, height: i32, scale: f64 },

    #[error("image is {found_width}x{found_height} px but the layer is {width}x{height} px")]
    SurfaceMismatch {
        width: i32,
        height: i32,
        found_width: i32,
        found_height: i32,
    },

    #[error("render context unavailable: {0}")]
    RenderContext(#[from] cairo::Error),

    #[error("pixel ({x}, {y}) lies outside the surface")]
    PixelOutOfBounds { x: i32, y: i32 },

    #[error("surface pixels are not accessible: {0}")]
    SurfaceBorrow(String),

    #[error("PNG codec error: {0}")]
    Png(String),

    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("event loop error: {0}")]
    EventLoop(String),
}
