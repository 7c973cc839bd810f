//! Vertical alignment generated from points of vertical intersection (PVIs).

use crate::error::{ConfigurationError, GeometryError, Result, ValidationError};

const STATION_TOLERANCE: f64 = 1e-9;

/// Point of vertical intersection. `curve_length == 0` is a sharp grade break.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pvi {
    pub station: f64,
    pub elevation: f64,
    #[serde(default)]
    pub curve_length: f64,
}

impl Pvi {
    pub fn new(station: f64, elevation: f64, curve_length: f64) -> Self {
        Self {
            station,
            elevation,
            curve_length,
        }
    }
}

/// Types of vertical alignment elements.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum VerticalSegment {
    /// Constant grade.
    Grade {
        start_station: f64,
        start_elevation: f64,
        length: f64,
        slope: f64,
    },
    /// Symmetric parabolic curve. `k_value` is infinite when both grades match.
    Parabola {
        start_station: f64,
        start_elevation: f64,
        length: f64,
        grade_in: f64,
        grade_out: f64,
        k_value: f64,
    },
}

impl VerticalSegment {
    pub fn start_station(&self) -> f64 {
        match self {
            VerticalSegment::Grade { start_station, .. }
            | VerticalSegment::Parabola { start_station, .. } => *start_station,
        }
    }

    pub fn start_elevation(&self) -> f64 {
        match self {
            VerticalSegment::Grade {
                start_elevation, ..
            }
            | VerticalSegment::Parabola {
                start_elevation, ..
            } => *start_elevation,
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            VerticalSegment::Grade { length, .. } | VerticalSegment::Parabola { length, .. } => {
                *length
            }
        }
    }

    pub fn end_station(&self) -> f64 {
        self.start_station() + self.length()
    }

    pub fn end_elevation(&self) -> f64 {
        self.elevation_at(self.end_station())
    }

    /// Elevation at `station`, assumed to lie on this segment.
    pub fn elevation_at(&self, station: f64) -> f64 {
        let x = station - self.start_station();
        match self {
            VerticalSegment::Grade {
                start_elevation,
                slope,
                ..
            } => start_elevation + slope * x,
            VerticalSegment::Parabola {
                start_elevation,
                length,
                grade_in,
                grade_out,
                ..
            } => {
                let a = (grade_out - grade_in) / (2.0 * length);
                start_elevation + grade_in * x + a * x * x
            }
        }
    }

    /// Instantaneous grade at `station`.
    pub fn grade_at(&self, station: f64) -> f64 {
        match self {
            VerticalSegment::Grade { slope, .. } => *slope,
            VerticalSegment::Parabola {
                start_station,
                length,
                grade_in,
                grade_out,
                ..
            } => grade_in + (grade_out - grade_in) * (station - start_station) / length,
        }
    }
}

/// Owns the station-ordered PVI list and the segments derived from it.
#[derive(Debug, Clone, Default)]
pub struct VerticalAlignmentEngine {
    pvis: Vec<Pvi>,
    segments: Vec<VerticalSegment>,
}

impl VerticalAlignmentEngine {
    /// Creates an empty profile; PVIs are added with [`add_pvi`](Self::add_pvi).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a profile from PVIs in any order.
    pub fn from_pvis(pvis: impl IntoIterator<Item = Pvi>) -> Result<Self> {
        let mut pvis: Vec<Pvi> = pvis.into_iter().collect();
        pvis.sort_by(|a, b| a.station.total_cmp(&b.station));
        let mut engine = Self::new();
        for pvi in pvis {
            engine.add_pvi(pvi.station, pvi.elevation, pvi.curve_length)?;
        }
        Ok(engine)
    }

    pub fn pvis(&self) -> &[Pvi] {
        &self.pvis
    }

    pub fn segments(&self) -> &[VerticalSegment] {
        &self.segments
    }

    /// Inserts a PVI keeping station order.
    pub fn add_pvi(&mut self, station: f64, elevation: f64, curve_length: f64) -> Result<()> {
        validate_pvi(station, elevation, curve_length)?;
        if self
            .pvis
            .iter()
            .any(|p| (p.station - station).abs() <= STATION_TOLERANCE)
        {
            return Err(ValidationError::DuplicateStation { station }.into());
        }
        let mut pvis = self.pvis.clone();
        let at = pvis.partition_point(|p| p.station < station);
        pvis.insert(at, Pvi::new(station, elevation, curve_length));
        self.commit(pvis)
    }

    pub fn remove_pvi(&mut self, index: usize) -> Result<()> {
        if index >= self.pvis.len() {
            return Err(GeometryError::InvalidPvi { index }.into());
        }
        let mut pvis = self.pvis.clone();
        pvis.remove(index);
        self.commit(pvis)
    }

    /// Moves a PVI to a new station and elevation, keeping its curve length.
    pub fn move_pvi(&mut self, index: usize, station: f64, elevation: f64) -> Result<()> {
        let current = *self
            .pvis
            .get(index)
            .ok_or(GeometryError::InvalidPvi { index })?;
        validate_pvi(station, elevation, current.curve_length)?;
        let mut pvis = self.pvis.clone();
        pvis.remove(index);
        if pvis
            .iter()
            .any(|p| (p.station - station).abs() <= STATION_TOLERANCE)
        {
            return Err(ValidationError::DuplicateStation { station }.into());
        }
        let at = pvis.partition_point(|p| p.station < station);
        pvis.insert(at, Pvi::new(station, elevation, current.curve_length));
        self.commit(pvis)
    }

    pub fn set_curve_length(&mut self, index: usize, curve_length: f64) -> Result<()> {
        let mut pvis = self.pvis.clone();
        let pvi = pvis
            .get_mut(index)
            .ok_or(GeometryError::InvalidPvi { index })?;
        validate_pvi(pvi.station, pvi.elevation, curve_length)?;
        pvi.curve_length = curve_length;
        self.commit(pvis)
    }

    /// Rebuilds the segment list from the current PVIs.
    pub fn generate_segments(&mut self) -> Result<&[VerticalSegment]> {
        self.segments = build_segments(&self.pvis)?;
        Ok(&self.segments)
    }

    /// Station range covered by the profile.
    pub fn station_range(&self) -> Option<(f64, f64)> {
        match (self.pvis.first(), self.pvis.last()) {
            (Some(first), Some(last)) if self.pvis.len() >= 2 => Some((first.station, last.station)),
            _ => None,
        }
    }

    /// Design elevation at `station`, following vertical curves.
    ///
    /// Inside a curve this is the parabola, which passes below a crest PVI
    /// and above a sag PVI. Use [`Self::grade_elevation`] for the PVI's own
    /// elevation on the straight grade line.
    pub fn get_elevation(&self, station: f64) -> Result<f64> {
        let segment = self.segment_at(station)?;
        Ok(segment.elevation_at(station))
    }

    /// Design grade at `station`.
    pub fn grade_at(&self, station: f64) -> Result<f64> {
        let segment = self.segment_at(station)?;
        Ok(segment.grade_at(station))
    }

    /// Elevation of the straight grade lines joining the PVIs, ignoring curves.
    pub fn grade_elevation(&self, station: f64) -> Result<f64> {
        self.check_range(station)?;
        for pair in self.pvis.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if station <= b.station {
                let t = (station - a.station) / (b.station - a.station);
                return Ok(a.elevation + t * (b.elevation - a.elevation));
            }
        }
        Ok(self.pvis.last().map(|p| p.elevation).unwrap_or_default())
    }

    /// Segment boundaries (BVC/EVC) and PVI stations strictly inside the profile.
    pub fn key_stations(&self) -> Vec<f64> {
        let Some((first, last)) = self.station_range() else {
            return Vec::new();
        };
        let mut stations: Vec<f64> = self
            .segments
            .iter()
            .map(|s| s.start_station())
            .chain(self.pvis.iter().map(|p| p.station))
            .filter(|s| *s > first + STATION_TOLERANCE && *s < last - STATION_TOLERANCE)
            .collect();
        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() <= STATION_TOLERANCE);
        stations
    }

    fn check_range(&self, station: f64) -> Result<(f64, f64)> {
        let (first, last) = self.station_range().ok_or(ConfigurationError::TooFewPvis {
            count: self.pvis.len(),
        })?;
        if !station.is_finite()
            || station < first - STATION_TOLERANCE
            || station > last + STATION_TOLERANCE
        {
            return Err(GeometryError::StationOutOfRange {
                station,
                length: last,
            }
            .into());
        }
        Ok((first, last))
    }

    fn segment_at(&self, station: f64) -> Result<&VerticalSegment> {
        self.check_range(station)?;
        let last = self.segments.last().ok_or(ConfigurationError::TooFewPvis {
            count: self.pvis.len(),
        })?;
        Ok(self
            .segments
            .iter()
            .find(|s| station <= s.end_station())
            .unwrap_or(last))
    }

    fn commit(&mut self, pvis: Vec<Pvi>) -> Result<()> {
        let segments = build_segments(&pvis)?;
        self.pvis = pvis;
        self.segments = segments;
        Ok(())
    }
}

fn validate_pvi(station: f64, elevation: f64, curve_length: f64) -> Result<()> {
    if !station.is_finite() {
        return Err(ValidationError::NonFinite {
            what: "PVI station",
        }
        .into());
    }
    if !elevation.is_finite() {
        return Err(ValidationError::NonFinite {
            what: "PVI elevation",
        }
        .into());
    }
    if !curve_length.is_finite() || curve_length < 0.0 {
        return Err(ValidationError::NegativeCurveLength { curve_length }.into());
    }
    Ok(())
}

/// Builds grade and parabola segments for a station-ordered PVI list.
fn build_segments(pvis: &[Pvi]) -> Result<Vec<VerticalSegment>> {
    if pvis.len() < 2 {
        return Ok(Vec::new());
    }
    let last = pvis.len() - 1;
    let intervals: Vec<f64> = pvis.windows(2).map(|p| p[1].station - p[0].station).collect();
    let grades: Vec<f64> = pvis
        .windows(2)
        .zip(&intervals)
        .map(|(p, len)| (p[1].elevation - p[0].elevation) / len)
        .collect();

    // curves on the first and last PVI have no grade on one side and stay inactive
    let halves: Vec<f64> = pvis
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i == 0 || i == last {
                0.0
            } else {
                p.curve_length / 2.0
            }
        })
        .collect();

    // a curve no longer than either neighbouring interval leaves room for the
    // half curve of the PVI across that interval too
    for i in 1..last {
        let curve_length = pvis[i].curve_length;
        let available = intervals[i - 1].min(intervals[i]);
        if curve_length > available + STATION_TOLERANCE {
            return Err(GeometryError::CurveTooLong {
                index: i,
                curve_length,
                available,
            }
            .into());
        }
    }
    let mut segments = Vec::with_capacity(2 * pvis.len());
    for j in 0..intervals.len() {
        let start_station = pvis[j].station + halves[j];
        let length = intervals[j] - halves[j] - halves[j + 1];
        if length > STATION_TOLERANCE {
            segments.push(VerticalSegment::Grade {
                start_station,
                start_elevation: pvis[j].elevation + grades[j] * halves[j],
                length,
                slope: grades[j],
            });
        }
        let next = j + 1;
        let half = halves[next];
        if half > 0.0 {
            let grade_in = grades[j];
            let grade_out = grades[next];
            let change = (grade_out - grade_in).abs();
            let curve_length = 2.0 * half;
            segments.push(VerticalSegment::Parabola {
                start_station: pvis[next].station - half,
                start_elevation: pvis[next].elevation - grade_in * half,
                length: curve_length,
                grade_in,
                grade_out,
                k_value: if change > 0.0 {
                    curve_length / change
                } else {
                    f64::INFINITY
                },
            });
        }
    }
    log::debug!(
        "regenerated vertical alignment: {} PVIs, {} segments",
        pvis.len(),
        segments.len()
    );
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorridorError;

    fn sample() -> VerticalAlignmentEngine {
        let mut v = VerticalAlignmentEngine::new();
        v.add_pvi(0.0, 100.0, 0.0).unwrap();
        v.add_pvi(1000.0, 105.0, 0.0).unwrap();
        v.add_pvi(500.0, 110.0, 200.0).unwrap();
        v
    }

    #[test]
    fn parabola_parameters() {
        let v = sample();
        assert_eq!(v.segments().len(), 3);
        match v.segments()[1] {
            VerticalSegment::Parabola {
                start_station,
                start_elevation,
                length,
                grade_in,
                grade_out,
                k_value,
            } => {
                assert!((start_station - 400.0).abs() < 1e-9);
                assert!((start_elevation - 108.0).abs() < 1e-9);
                assert!((length - 200.0).abs() < 1e-9);
                assert!((grade_in - 0.02).abs() < 1e-12);
                assert!((grade_out + 0.01).abs() < 1e-12);
                assert!((k_value - 6666.666_666).abs() < 1e-3);
            }
            other => panic!("expected parabola, got {other:?}"),
        }
    }

    #[test]
    fn elevations_on_grades_and_curve() {
        let v = sample();
        assert!((v.get_elevation(0.0).unwrap() - 100.0).abs() < 1e-9);
        assert!((v.get_elevation(200.0).unwrap() - 104.0).abs() < 1e-9);
        // middle ordinate A * L / 8 below the PVI
        assert!((v.get_elevation(500.0).unwrap() - 109.25).abs() < 1e-9);
        assert!((v.grade_elevation(500.0).unwrap() - 110.0).abs() < 1e-9);
        assert!((v.get_elevation(600.0).unwrap() - 109.0).abs() < 1e-9);
        assert!((v.get_elevation(1000.0).unwrap() - 105.0).abs() < 1e-9);
        assert!((v.grade_at(500.0).unwrap() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn duplicate_station_rejected() {
        let mut v = sample();
        assert!(matches!(
            v.add_pvi(500.0, 1.0, 0.0),
            Err(CorridorError::Validation(ValidationError::DuplicateStation { .. }))
        ));
        assert_eq!(v.pvis().len(), 3);
    }

    #[test]
    fn curve_too_long_leaves_state() {
        let mut v = sample();
        let before = v.segments().to_vec();
        assert!(matches!(
            v.set_curve_length(1, 600.0),
            Err(CorridorError::Geometry(GeometryError::CurveTooLong { index: 1, .. }))
        ));
        assert_eq!(v.segments(), &before[..]);
        assert!(matches!(
            v.add_pvi(550.0, 111.0, 0.0),
            Err(CorridorError::Geometry(GeometryError::CurveTooLong { .. }))
        ));
        assert_eq!(v.pvis().len(), 3);
    }

    #[test]
    fn curve_longer_than_interval_rejected() {
        let mut v = VerticalAlignmentEngine::new();
        v.add_pvi(0.0, 0.0, 0.0).unwrap();
        v.add_pvi(100.0, 5.0, 80.0).unwrap();
        v.add_pvi(400.0, 0.0, 0.0).unwrap();
        v.add_pvi(220.0, 8.0, 0.0).unwrap();
        assert!(matches!(
            v.set_curve_length(2, 150.0),
            Err(CorridorError::Geometry(GeometryError::CurveTooLong { index: 2, .. }))
        ));
        v.set_curve_length(2, 40.0).unwrap();
    }

    #[test]
    fn endpoint_curve_is_inactive() {
        let mut v = VerticalAlignmentEngine::new();
        v.add_pvi(0.0, 10.0, 50.0).unwrap();
        v.add_pvi(100.0, 20.0, 0.0).unwrap();
        assert_eq!(v.segments().len(), 1);
        assert!((v.get_elevation(50.0).unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_and_too_few() {
        let mut v = VerticalAlignmentEngine::new();
        assert!(matches!(
            v.get_elevation(0.0),
            Err(CorridorError::Configuration(ConfigurationError::TooFewPvis { count: 0 }))
        ));
        v.add_pvi(0.0, 0.0, 0.0).unwrap();
        v.add_pvi(10.0, 1.0, 0.0).unwrap();
        assert!(matches!(
            v.get_elevation(10.5),
            Err(CorridorError::Geometry(GeometryError::StationOutOfRange { .. }))
        ));
        assert!(v.add_pvi(5.0, 0.0, -1.0).is_err());
    }

    #[test]
    fn move_pvi_reorders() {
        let mut v = sample();
        assert!(matches!(
            v.move_pvi(0, 1000.0, 100.0),
            Err(CorridorError::Validation(ValidationError::DuplicateStation { .. }))
        ));
        v.remove_pvi(1).unwrap();
        v.move_pvi(0, 1200.0, 100.0).unwrap();
        let stations: Vec<f64> = v.pvis().iter().map(|p| p.station).collect();
        assert_eq!(stations, vec![1000.0, 1200.0]);
    }

    #[test]
    fn key_stations_include_curve_ends() {
        let v = sample();
        assert_eq!(v.key_stations(), vec![400.0, 500.0, 600.0]);
    }

    #[test]
    fn regenerate_is_idempotent() {
        let mut v = sample();
        let first = v.segments().to_vec();
        assert_eq!(v.generate_segments().unwrap(), &first[..]);
        assert_eq!(v.generate_segments().unwrap(), &first[..]);
    }
}
