//! Basic geometry primitives for alignment and corridor operations.

use std::f64::consts::{PI, TAU};

mod point;
mod point3;
mod vector;

pub use point::Point;
pub use point3::Point3;
pub use vector::Vector2;

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Calculates the Euclidean distance between two 3D points.
pub fn distance3(a: Point3, b: Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

/// Unit direction from `a` towards `b`, `None` when the points coincide.
pub fn direction(a: Point, b: Point) -> Option<Vector2> {
    (b - a).normalized()
}

/// Wraps an angle into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Signed angle turning `from` onto `to`. Positive is counter-clockwise.
pub fn signed_angle(from: Vector2, to: Vector2) -> f64 {
    from.cross(to).atan2(from.dot(to))
}

/// Representation of a series of connected line segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub vertices: Vec<Point>,
}

impl Polyline {
    /// Creates a new polyline from a list of vertices.
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Returns the total length of all segments in the polyline.
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| distance(pair[0], pair[1]))
            .sum()
    }
}
