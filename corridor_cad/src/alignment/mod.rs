//! Horizontal and vertical alignment engines and their 3D combination.

pub mod horizontal;
pub mod vertical;

pub use horizontal::{
    CurveDescriptor, HorizontalAlignmentEngine, HorizontalSegment, Pi, StationOffset,
    StationPoint, TurnDirection,
};
pub use vertical::{Pvi, VerticalAlignmentEngine, VerticalSegment};

use crate::error::Result;
use crate::geometry::{Point3, Vector2};

/// Combined horizontal and vertical alignment, i.e. the corridor directrix.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub horizontal: HorizontalAlignmentEngine,
    pub vertical: VerticalAlignmentEngine,
}

impl Alignment {
    pub fn new(horizontal: HorizontalAlignmentEngine, vertical: VerticalAlignmentEngine) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Length of the horizontal alignment.
    pub fn length(&self) -> f64 {
        self.horizontal.total_length()
    }

    /// Returns the 3D point on the alignment at the specified station.
    pub fn point3_at(&self, station: f64) -> Result<Point3> {
        let p = self.horizontal.get_point_at_station(station)?;
        let z = self.vertical.get_elevation(station)?;
        Ok(Point3::from_plan(p.position, z))
    }

    /// 3D point and plan heading at `station`.
    pub fn frame_at(&self, station: f64) -> Result<(Point3, Vector2)> {
        let p = self.horizontal.get_point_at_station(station)?;
        let z = self.vertical.get_elevation(station)?;
        Ok((Point3::from_plan(p.position, z), p.direction))
    }
}
