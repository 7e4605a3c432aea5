//! Input handling and the stroke state machine.
//!
//! This module translates host pointer events into drawing operations on the
//! compositor and history. It holds the active brush settings and the
//! per-gesture stroke session.

pub mod events;
pub mod state;
pub mod tool;

// Re-export commonly used types at module level
pub use events::PointerEvent;
pub use state::{OverlaySettings, OverlayState, StrokeSession, StrokeState};
pub use tool::{BrushType, DrawMode};
