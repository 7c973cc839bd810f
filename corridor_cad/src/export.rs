//! Flat segment records for handing alignments to BIM exporters.

use crate::alignment::{
    HorizontalAlignmentEngine, HorizontalSegment, TurnDirection, VerticalAlignmentEngine,
    VerticalSegment,
};

/// One horizontal segment, including the zero-length endpoint marker.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlignmentSegmentRecord {
    pub index: usize,
    /// `Line`, `CircularArc` or `Endpoint`.
    pub kind: String,
    pub start_station: f64,
    pub start_x: f64,
    pub start_y: f64,
    /// Heading in radians, counter-clockwise from the x axis.
    pub start_direction: f64,
    pub length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ccw: Option<bool>,
    pub is_endpoint_marker: bool,
}

/// One vertical segment.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VerticalSegmentRecord {
    pub index: usize,
    /// `ConstantGradient` or `ParabolicArc`.
    pub kind: String,
    pub start_station: f64,
    pub start_elevation: f64,
    pub length: f64,
    pub start_gradient: f64,
    pub end_gradient: f64,
    /// Absent for grades and for curves between equal grades.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k_value: Option<f64>,
}

/// Horizontal and vertical records of one alignment.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlignmentExport {
    pub horizontal: Vec<AlignmentSegmentRecord>,
    pub vertical: Vec<VerticalSegmentRecord>,
}

impl AlignmentExport {
    pub fn new(horizontal: &HorizontalAlignmentEngine, vertical: &VerticalAlignmentEngine) -> Self {
        Self {
            horizontal: horizontal_records(horizontal),
            vertical: vertical_records(vertical),
        }
    }
}

pub fn horizontal_records(engine: &HorizontalAlignmentEngine) -> Vec<AlignmentSegmentRecord> {
    let mut station = 0.0;
    engine
        .segments()
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let start = segment.start_point();
            let (kind, radius, is_ccw) = match segment {
                HorizontalSegment::Tangent { .. } => ("Line", None, None),
                HorizontalSegment::Arc {
                    radius,
                    turn_direction,
                    ..
                } => (
                    "CircularArc",
                    Some(*radius),
                    Some(*turn_direction == TurnDirection::Left),
                ),
                HorizontalSegment::Terminator { .. } => ("Endpoint", None, None),
            };
            let record = AlignmentSegmentRecord {
                index,
                kind: kind.to_string(),
                start_station: station,
                start_x: start.x,
                start_y: start.y,
                start_direction: segment.start_direction().angle(),
                length: segment.length(),
                radius,
                is_ccw,
                is_endpoint_marker: segment.is_terminator(),
            };
            station += segment.length();
            record
        })
        .collect()
}

pub fn vertical_records(engine: &VerticalAlignmentEngine) -> Vec<VerticalSegmentRecord> {
    engine
        .segments()
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let (kind, start_gradient, end_gradient, k_value) = match segment {
                VerticalSegment::Grade { slope, .. } => ("ConstantGradient", *slope, *slope, None),
                VerticalSegment::Parabola {
                    grade_in,
                    grade_out,
                    k_value,
                    ..
                } => (
                    "ParabolicArc",
                    *grade_in,
                    *grade_out,
                    k_value.is_finite().then_some(*k_value),
                ),
            };
            VerticalSegmentRecord {
                index,
                kind: kind.to_string(),
                start_station: segment.start_station(),
                start_elevation: segment.start_elevation(),
                length: segment.length(),
                start_gradient,
                end_gradient,
                k_value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Pvi;
    use crate::geometry::Point;

    #[test]
    fn terminator_becomes_endpoint_marker() {
        let mut h = HorizontalAlignmentEngine::new(vec![
            Point::new(0.0, 0.0),
            Point::new(500.0, 0.0),
            Point::new(1000.0, 200.0),
        ])
        .unwrap();
        h.insert_curve(1, 300.0, TurnDirection::Left).unwrap();
        let records = horizontal_records(&h);
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].kind, "CircularArc");
        assert_eq!(records[1].is_ccw, Some(true));
        let last = records.last().unwrap();
        assert!(last.is_endpoint_marker);
        assert_eq!(last.length, 0.0);
        assert!((last.start_station - h.total_length()).abs() < 1e-9);
        assert!(records[..3].iter().all(|r| !r.is_endpoint_marker));
    }

    #[test]
    fn vertical_records_carry_k() {
        let v = VerticalAlignmentEngine::from_pvis([
            Pvi::new(0.0, 100.0, 0.0),
            Pvi::new(500.0, 110.0, 200.0),
            Pvi::new(1000.0, 105.0, 0.0),
        ])
        .unwrap();
        let records = vertical_records(&v);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].kind, "ParabolicArc");
        assert!((records[1].k_value.unwrap() - 6666.666_666).abs() < 1e-3);
        assert_eq!(records[0].k_value, None);
        let json = serde_json::to_string(&records[0]).unwrap();
        assert!(!json.contains("k_value"));
    }
}
