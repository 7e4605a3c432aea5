mod actions;
mod core;
mod pointer;

pub use self::core::{OverlaySettings, OverlayState, StrokeSession, StrokeState};
