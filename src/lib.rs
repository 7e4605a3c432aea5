//! Translucent drawing overlay engine.
//!
//! The host hands [`OverlayState`] a surface size and pointer events; the
//! engine rasterizes strokes into a scratch layer, commits or fades them, and
//! keeps a bounded undo/redo history of the committed layer.
//!
//! - [`draw`]: colors, geometry, layers and the compositor
//! - [`input`]: brushes, pointer events and the stroke state machine
//! - [`history`] and [`fade`]: undo/redo snapshots and the fade animation
//! - [`runtime`]: a `calloop` loop that ticks fades between host commands
//! - [`config`], [`export`] and [`script`]: settings, PNG output and replayable gestures

pub mod config;
pub mod draw;
pub mod error;
pub mod export;
pub mod fade;
pub mod history;
pub mod input;
pub mod runtime;
pub mod script;
pub mod util;

pub use config::Config;
pub use error::OverlayError;
pub use input::OverlayState;
