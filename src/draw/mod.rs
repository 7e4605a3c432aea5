//! Raster drawing primitives (Cairo-based).
//!
//! This module defines the drawing core of the overlay:
//! - [`Color`] and [`BrushStyle`]: paint settings
//! - [`geometry`]: points, arrowheads and damage bounds
//! - [`Layer`] and [`Compositor`]: the committed and scratch raster layers
//! - [`DirtyTracker`]: repaint regions for the host

pub mod brush;
pub mod color;
pub mod compositor;
pub mod dirty;
pub mod geometry;
pub mod layer;
pub mod render;

// Re-export commonly used types at module level
pub use brush::{BrushStyle, ColorSource, StrokeRule, stroke_rule};
pub use color::Color;
pub use compositor::{Compositor, solid_background};
pub use dirty::DirtyTracker;
pub use geometry::{ArrowGeometry, Point};
pub use layer::{Layer, SurfaceSize, read_pixel};

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, WHITE, YELLOW};
