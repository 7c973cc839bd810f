//! Basic 2D point type used throughout the crate.

use std::ops::{Add, Sub};

use super::Vector2;

/// Representation of a 2D point in plan coordinates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Moves the point `distance` along `direction`.
    pub fn offset(self, direction: Vector2, distance: f64) -> Self {
        self + direction * distance
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add<Vector2> for Point {
    type Output = Point;

    fn add(self, rhs: Vector2) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<Vector2> for Point {
    type Output = Point;

    fn sub(self, rhs: Vector2) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub for Point {
    type Output = Vector2;

    fn sub(self, rhs: Point) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}
