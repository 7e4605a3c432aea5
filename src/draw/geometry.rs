//! Stroke geometry: points, arrowheads and damage bounds.
//!
//! Everything in here is pure math on canvas-space coordinates. The compositor
//! turns these results into Cairo paths.

use crate::util::Rect;
use serde::{Deserialize, Serialize};

/// Default distance added to the brush width to get the arrowhead length.
pub const ARROW_HEAD_OFFSET: f64 = 15.0;

/// Default angle between each arrowhead side and the reversed shaft.
pub const ARROW_HEAD_ANGLE_DEGREES: f64 = 30.0;

/// A coordinate in logical canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Arrowhead shape parameters.
///
/// The head length is `head_offset + width`, so heavier brushes get
/// proportionally larger heads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowGeometry {
    /// Length added on top of the brush width, in logical pixels
    pub head_offset: f64,
    /// Angle between each head side and the reversed shaft, in degrees
    pub angle_degrees: f64,
}

impl Default for ArrowGeometry {
    fn default() -> Self {
        Self {
            head_offset: ARROW_HEAD_OFFSET,
            angle_degrees: ARROW_HEAD_ANGLE_DEGREES,
        }
    }
}

impl ArrowGeometry {
    /// Length of each arrowhead side for a brush of the given width.
    pub fn head_length(&self, width: f64) -> f64 {
        self.head_offset + width
    }

    /// Tail points of the arrowhead for a shaft running from `start` to `end`.
    pub fn tails(&self, start: Point, end: Point, width: f64) -> [Point; 2] {
        calculate_arrowhead(start, end, self.head_length(width), self.angle_degrees)
    }
}

/// Calculates the two tail points of a V-shaped arrowhead sitting on `end`.
///
/// Each tail lies `length` away from `end`, rotated by `±angle_degrees` from the
/// direction pointing back along the shaft (from `end` towards `start`).
///
/// # Returns
/// `[left, right]`. For a degenerate shaft (start == end) the direction is
/// undefined and both tails collapse onto `end`.
pub fn calculate_arrowhead(start: Point, end: Point, length: f64, angle_degrees: f64) -> [Point; 2] {
    let dx = start.x - end.x; // Direction from END back to START
    let dy = start.y - end.y;
    let shaft_length = (dx * dx + dy * dy).sqrt();

    if shaft_length <= f64::EPSILON {
        return [end, end];
    }

    let ux = dx / shaft_length;
    let uy = dy / shaft_length;

    let angle = angle_degrees.to_radians();
    let (sin_a, cos_a) = angle.sin_cos();

    let left = Point::new(
        end.x + length * (ux * cos_a - uy * sin_a),
        end.y + length * (ux * sin_a + uy * cos_a),
    );
    let right = Point::new(
        end.x + length * (ux * cos_a + uy * sin_a),
        end.y + length * (uy * cos_a - ux * sin_a),
    );

    [left, right]
}

/// Pixel-space bounding box of a stroke through `points`, padded for the stroke width.
///
/// The padding covers square caps (half width times √2) plus a little slack for
/// anti-aliasing. `scale` converts logical coordinates into device pixels.
pub fn stroke_bounds(points: &[Point], width: f64, scale: f64) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for point in &points[1..] {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    let pad = width.max(1.0) * std::f64::consts::SQRT_2 / 2.0 + 2.0;
    Rect::from_min_max(
        to_device_px(((min_x - pad) * scale).floor()),
        to_device_px(((min_y - pad) * scale).floor()),
        to_device_px(((max_x + pad) * scale).ceil()),
        to_device_px(((max_y + pad) * scale).ceil()),
    )
}

/// Largest device coordinate a damage rectangle may reach.
///
/// Half of `i32::MAX` keeps `max - min` representable for any pair.
const DEVICE_PX_LIMIT: f64 = (i32::MAX / 2) as f64;

fn to_device_px(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(-DEVICE_PX_LIMIT, DEVICE_PX_LIMIT) as i32
}
