//! Pointer events delivered by the host.

use crate::draw::Point;

/// Single-contact pointer event in logical canvas coordinates.
///
/// Hosts map their native touch or mouse events onto these three phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Contact started (touch began, primary button pressed)
    Down(Point),
    /// Contact moved while held
    Move(Point),
    /// Contact ended
    Up(Point),
}

impl PointerEvent {
    pub fn position(self) -> Point {
        match self {
            PointerEvent::Down(point) | PointerEvent::Move(point) | PointerEvent::Up(point) => point,
        }
    }
}
