//! Horizontal alignment generated from points of intersection (PIs).
//!
//! Deflection angles are signed: positive turns counter-clockwise (left),
//! negative turns clockwise (right).

use crate::error::{ConfigurationError, GeometryError, Result, ValidationError};
use crate::geometry::{direction, distance, signed_angle, Point, Vector2};

const COINCIDENT_TOLERANCE: f64 = 1e-9;
const LENGTH_TOLERANCE: f64 = 1e-9;
const COLLINEAR_TOLERANCE: f64 = 1e-12;

/// Side towards which a circular curve turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// `+1` for left (counter-clockwise) turns, `-1` for right turns.
    pub fn sign(self) -> f64 {
        match self {
            TurnDirection::Left => 1.0,
            TurnDirection::Right => -1.0,
        }
    }

    /// Turn direction implied by a signed deflection angle.
    pub fn from_deflection(delta: f64) -> Option<Self> {
        if delta > COLLINEAR_TOLERANCE {
            Some(TurnDirection::Left)
        } else if delta < -COLLINEAR_TOLERANCE {
            Some(TurnDirection::Right)
        } else {
            None
        }
    }
}

/// Circular curve attached to an interior PI.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurveDescriptor {
    pub radius: f64,
    pub turn_direction: TurnDirection,
}

/// Point of intersection between two tangents.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pi {
    pub position: Point,
    pub curve: Option<CurveDescriptor>,
}

impl Pi {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            curve: None,
        }
    }
}

/// Individual elements of a generated horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum HorizontalSegment {
    /// Straight line leaving `start` along the unit `direction`.
    Tangent {
        start: Point,
        direction: Vector2,
        length: f64,
    },
    /// Circular arc from PC to PT; `direction` is the heading at the PC.
    Arc {
        start: Point,
        direction: Vector2,
        length: f64,
        radius: f64,
        turn_direction: TurnDirection,
    },
    /// Zero-length endpoint marker closing every segment list. Not geometry.
    Terminator { position: Point, direction: Vector2 },
}

impl HorizontalSegment {
    pub fn length(&self) -> f64 {
        match self {
            HorizontalSegment::Tangent { length, .. } | HorizontalSegment::Arc { length, .. } => {
                *length
            }
            HorizontalSegment::Terminator { .. } => 0.0,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, HorizontalSegment::Terminator { .. })
    }

    pub fn start_point(&self) -> Point {
        match self {
            HorizontalSegment::Tangent { start, .. } | HorizontalSegment::Arc { start, .. } => {
                *start
            }
            HorizontalSegment::Terminator { position, .. } => *position,
        }
    }

    pub fn start_direction(&self) -> Vector2 {
        match self {
            HorizontalSegment::Tangent { direction, .. }
            | HorizontalSegment::Arc { direction, .. }
            | HorizontalSegment::Terminator { direction, .. } => *direction,
        }
    }

    pub fn end_point(&self) -> Point {
        self.point_at(self.length())
    }

    /// Unsigned curvature, `1 / radius` on arcs and zero elsewhere.
    pub fn curvature(&self) -> f64 {
        match self {
            HorizontalSegment::Arc { radius, .. } => 1.0 / radius,
            _ => 0.0,
        }
    }

    /// Center of an arc segment.
    pub fn center(&self) -> Option<Point> {
        match self {
            HorizontalSegment::Arc {
                start,
                direction,
                radius,
                turn_direction,
                ..
            } => Some(start.offset(direction.left_normal(), radius * turn_direction.sign())),
            _ => None,
        }
    }

    /// Position at distance `s` from the segment start.
    pub fn point_at(&self, s: f64) -> Point {
        match self {
            HorizontalSegment::Tangent {
                start, direction, ..
            } => start.offset(*direction, s),
            HorizontalSegment::Arc {
                start,
                radius,
                turn_direction,
                ..
            } => {
                let center = self.center().unwrap_or(*start);
                let theta = turn_direction.sign() * s / radius;
                center + (*start - center).rotated(theta)
            }
            HorizontalSegment::Terminator { position, .. } => *position,
        }
    }

    /// Unit heading at distance `s` from the segment start.
    pub fn direction_at(&self, s: f64) -> Vector2 {
        match self {
            HorizontalSegment::Arc {
                direction,
                radius,
                turn_direction,
                ..
            } => direction.rotated(turn_direction.sign() * s / radius),
            _ => self.start_direction(),
        }
    }

    /// Closest point on the segment to `p`, as `(distance_along, distance_to_p)`.
    fn project(&self, p: Point) -> (f64, f64) {
        let len = self.length();
        let s = match self {
            HorizontalSegment::Tangent {
                start, direction, ..
            } => (p - *start).dot(*direction).clamp(0.0, len),
            HorizontalSegment::Arc {
                start,
                radius,
                turn_direction,
                ..
            } => {
                let center = self.center().unwrap_or(*start);
                let to_p = p - center;
                if to_p.length() <= f64::EPSILON {
                    0.0
                } else {
                    let swept = signed_angle(*start - center, to_p) * turn_direction.sign();
                    let s = swept * radius;
                    if (0.0..=len).contains(&s) {
                        s
                    } else if distance(p, *start) <= distance(p, self.end_point()) {
                        0.0
                    } else {
                        len
                    }
                }
            }
            HorizontalSegment::Terminator { .. } => 0.0,
        };
        (s, distance(p, self.point_at(s)))
    }
}

/// Position and heading returned by station queries.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StationPoint {
    pub position: Point,
    pub direction: Vector2,
}

/// Station and signed perpendicular offset (positive right) of a plan point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationOffset {
    pub station: f64,
    pub offset: f64,
}

/// Owns the PI list and the segment list derived from it.
///
/// Every edit validates a candidate PI list and rebuilds its segments before
/// committing, so a failed edit leaves the engine unchanged.
#[derive(Debug, Clone)]
pub struct HorizontalAlignmentEngine {
    pis: Vec<Pi>,
    segments: Vec<HorizontalSegment>,
}

impl HorizontalAlignmentEngine {
    /// Creates an alignment from tangent-only PIs.
    pub fn new(positions: Vec<Point>) -> Result<Self> {
        Self::from_pis(positions.into_iter().map(Pi::new).collect())
    }

    /// Creates an alignment from PIs that may already carry curves.
    pub fn from_pis(pis: Vec<Pi>) -> Result<Self> {
        let segments = build_segments(&pis)?;
        Ok(Self { pis, segments })
    }

    pub fn pis(&self) -> &[Pi] {
        &self.pis
    }

    /// Generated segments, terminator included.
    pub fn segments(&self) -> &[HorizontalSegment] {
        &self.segments
    }

    /// Generated segments without the terminator.
    pub fn real_segments(&self) -> impl Iterator<Item = &HorizontalSegment> {
        self.segments.iter().filter(|s| !s.is_terminator())
    }

    /// Sum of all real segment lengths.
    pub fn total_length(&self) -> f64 {
        self.real_segments().map(|s| s.length()).sum()
    }

    /// Appends a tangent PI.
    pub fn add_pi(&mut self, position: Point) -> Result<()> {
        let mut pis = self.pis.clone();
        pis.push(Pi::new(position));
        self.commit(pis)
    }

    /// Inserts a tangent PI before `index` (`index == len` appends).
    pub fn insert_pi(&mut self, index: usize, position: Point) -> Result<()> {
        if index > self.pis.len() {
            return Err(GeometryError::InvalidPi { index }.into());
        }
        let mut pis = self.pis.clone();
        pis.insert(index, Pi::new(position));
        self.commit(pis)
    }

    /// Moves a PI, keeping its curve descriptor.
    pub fn move_pi(&mut self, index: usize, position: Point) -> Result<()> {
        let mut pis = self.pis.clone();
        let pi = pis
            .get_mut(index)
            .ok_or(GeometryError::InvalidPi { index })?;
        pi.position = position;
        self.commit(pis)
    }

    /// Removes a PI. Curves on PIs that become endpoints are dropped.
    pub fn remove_pi(&mut self, index: usize) -> Result<()> {
        if index >= self.pis.len() {
            return Err(GeometryError::InvalidPi { index }.into());
        }
        if self.pis.len() <= 2 {
            return Err(ConfigurationError::TooFewPis {
                count: self.pis.len() - 1,
            }
            .into());
        }
        let mut pis = self.pis.clone();
        pis.remove(index);
        let last = pis.len() - 1;
        for end in [0, last] {
            if pis[end].curve.take().is_some() {
                log::warn!("dropping curve on PI {end}, it became an alignment endpoint");
            }
        }
        self.commit(pis)
    }

    /// Attaches a circular curve to an interior PI.
    pub fn insert_curve(
        &mut self,
        pi_index: usize,
        radius: f64,
        turn_direction: TurnDirection,
    ) -> Result<()> {
        if pi_index == 0 || pi_index + 1 >= self.pis.len() {
            return Err(GeometryError::InvalidPi { index: pi_index }.into());
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ValidationError::InvalidRadius { radius }.into());
        }
        let delta = self
            .deflection_at(pi_index)
            .ok_or(GeometryError::InvalidPi { index: pi_index })?;
        check_turn(pi_index, delta, turn_direction)?;
        let tangent = radius * (delta.abs() / 2.0).tan();

        let prev = &self.pis[pi_index - 1];
        let pi = &self.pis[pi_index];
        let next = &self.pis[pi_index + 1];
        let back_available =
            distance(prev.position, pi.position) - self.tangent_length_at(pi_index - 1);
        let ahead_available =
            distance(pi.position, next.position) - self.tangent_length_at(pi_index + 1);
        let available = back_available.min(ahead_available);
        if tangent > available + LENGTH_TOLERANCE {
            return Err(GeometryError::CurveDoesNotFit {
                index: pi_index,
                required: tangent,
                available,
            }
            .into());
        }

        let mut pis = self.pis.clone();
        pis[pi_index].curve = Some(CurveDescriptor {
            radius,
            turn_direction,
        });
        self.commit(pis)
    }

    /// Clears the curve at `pi_index`, turning it back into a tangent point.
    pub fn remove_curve(&mut self, pi_index: usize) -> Result<()> {
        let mut pis = self.pis.clone();
        let pi = pis
            .get_mut(pi_index)
            .ok_or(GeometryError::InvalidPi { index: pi_index })?;
        pi.curve = None;
        self.commit(pis)
    }

    /// Rebuilds the segment list from the current PIs.
    pub fn regenerate(&mut self) -> Result<()> {
        self.segments = build_segments(&self.pis)?;
        Ok(())
    }

    /// Signed deflection at an interior PI.
    pub fn deflection_at(&self, pi_index: usize) -> Option<f64> {
        if pi_index == 0 || pi_index + 1 >= self.pis.len() {
            return None;
        }
        let d_in = direction(self.pis[pi_index - 1].position, self.pis[pi_index].position)?;
        let d_out = direction(self.pis[pi_index].position, self.pis[pi_index + 1].position)?;
        Some(signed_angle(d_in, d_out))
    }

    /// Distance from the PI back to the PC (and forward to the PT); zero without a curve.
    pub fn tangent_length_at(&self, pi_index: usize) -> f64 {
        match (
            self.pis.get(pi_index).and_then(|p| p.curve),
            self.deflection_at(pi_index),
        ) {
            (Some(curve), Some(delta)) => curve.radius * (delta.abs() / 2.0).tan(),
            _ => 0.0,
        }
    }

    /// Position and heading at `distance` along the alignment.
    pub fn get_point_at_station(&self, distance: f64) -> Result<StationPoint> {
        let (segment, local) = self.locate(distance, false)?;
        Ok(StationPoint {
            position: segment.point_at(local),
            direction: segment.direction_at(local),
        })
    }

    /// Curvature of the segment starting at or containing `station`.
    pub fn curvature_at(&self, station: f64) -> Result<f64> {
        let (segment, _) = self.locate(station, true)?;
        Ok(segment.curvature())
    }

    /// Station of the closest projection of `point` onto the alignment.
    pub fn get_station_at_point(&self, point: Point) -> f64 {
        self.station_offset_at_point(point).station
    }

    /// Station and signed offset of the closest projection of `point`.
    pub fn station_offset_at_point(&self, point: Point) -> StationOffset {
        let mut best: Option<(f64, f64, &HorizontalSegment, f64)> = None;
        let mut start = 0.0;
        for segment in self.real_segments() {
            let (s, dist) = segment.project(point);
            if best.map_or(true, |(_, d, _, _)| dist < d) {
                best = Some((start + s, dist, segment, s));
            }
            start += segment.length();
        }
        match best {
            Some((station, _, segment, s)) => {
                let foot = segment.point_at(s);
                let offset = (point - foot).dot(segment.direction_at(s).right_normal());
                StationOffset { station, offset }
            }
            None => StationOffset {
                station: 0.0,
                offset: 0.0,
            },
        }
    }

    /// Stations of the boundaries between real segments (PC and PT stations).
    pub fn key_stations(&self) -> Vec<f64> {
        let mut stations = Vec::new();
        let mut acc = 0.0;
        let segments: Vec<_> = self.real_segments().collect();
        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            acc += segment.length();
            stations.push(acc);
        }
        stations
    }

    /// Finds the real segment owning `station` and the distance into it.
    /// With `forward` set, a station on a boundary belongs to the next segment.
    fn locate(&self, station: f64, forward: bool) -> Result<(&HorizontalSegment, f64)> {
        let length = self.total_length();
        if !station.is_finite() || station < 0.0 || station > length + LENGTH_TOLERANCE {
            return Err(GeometryError::StationOutOfRange { station, length }.into());
        }
        let mut remaining = station;
        let mut last = None;
        for segment in self.real_segments() {
            let len = segment.length();
            let inside = if forward {
                remaining < len
            } else {
                remaining <= len
            };
            if inside {
                return Ok((segment, remaining.max(0.0)));
            }
            remaining -= len;
            last = Some(segment);
        }
        let segment = last.ok_or(GeometryError::StationOutOfRange { station, length })?;
        Ok((segment, segment.length()))
    }

    fn commit(&mut self, pis: Vec<Pi>) -> Result<()> {
        let segments = build_segments(&pis)?;
        self.pis = pis;
        self.segments = segments;
        Ok(())
    }
}

fn check_turn(index: usize, delta: f64, turn_direction: TurnDirection) -> Result<()> {
    match TurnDirection::from_deflection(delta) {
        None => Err(GeometryError::CollinearTangents { index }.into()),
        Some(actual) if actual != turn_direction => {
            Err(GeometryError::TurnDirectionMismatch { index }.into())
        }
        Some(_) => Ok(()),
    }
}

/// Builds the full segment list for a PI list, validating it on the way.
fn build_segments(pis: &[Pi]) -> Result<Vec<HorizontalSegment>> {
    if pis.len() < 2 {
        return Err(ConfigurationError::TooFewPis { count: pis.len() }.into());
    }
    if pis.iter().any(|p| !p.position.is_finite()) {
        return Err(ValidationError::NonFinite {
            what: "PI position",
        }
        .into());
    }

    let mut directions = Vec::with_capacity(pis.len() - 1);
    let mut legs = Vec::with_capacity(pis.len() - 1);
    for (i, pair) in pis.windows(2).enumerate() {
        let leg = distance(pair[0].position, pair[1].position);
        if leg <= COINCIDENT_TOLERANCE {
            return Err(ValidationError::CoincidentPi { index: i + 1 }.into());
        }
        // the distance check above guarantees a direction
        let dir = direction(pair[0].position, pair[1].position)
            .ok_or(ValidationError::CoincidentPi { index: i + 1 })?;
        directions.push(dir);
        legs.push(leg);
    }

    let last = pis.len() - 1;
    let mut tangents = vec![0.0; pis.len()];
    let mut deflections = vec![0.0; pis.len()];
    for (i, pi) in pis.iter().enumerate() {
        let Some(curve) = pi.curve else { continue };
        if i == 0 || i == last {
            return Err(GeometryError::InvalidPi { index: i }.into());
        }
        if !curve.radius.is_finite() || curve.radius <= 0.0 {
            return Err(ValidationError::InvalidRadius {
                radius: curve.radius,
            }
            .into());
        }
        let delta = signed_angle(directions[i - 1], directions[i]);
        check_turn(i, delta, curve.turn_direction)?;
        deflections[i] = delta;
        tangents[i] = curve.radius * (delta.abs() / 2.0).tan();
    }

    for (j, leg) in legs.iter().enumerate() {
        let required = tangents[j] + tangents[j + 1];
        if required > leg + LENGTH_TOLERANCE {
            let index = if tangents[j + 1] > 0.0 { j + 1 } else { j };
            return Err(GeometryError::CurveDoesNotFit {
                index,
                required: tangents[index],
                available: leg - (required - tangents[index]),
            }
            .into());
        }
    }

    let mut segments = Vec::with_capacity(2 * pis.len());
    for j in 0..legs.len() {
        let dir = directions[j];
        let length = legs[j] - tangents[j] - tangents[j + 1];
        if length > LENGTH_TOLERANCE {
            segments.push(HorizontalSegment::Tangent {
                start: pis[j].position.offset(dir, tangents[j]),
                direction: dir,
                length,
            });
        }
        let next = j + 1;
        if next == last {
            continue;
        }
        if let Some(curve) = pis[next].curve {
            segments.push(HorizontalSegment::Arc {
                start: pis[next].position.offset(dir, -tangents[next]),
                direction: dir,
                length: curve.radius * deflections[next].abs(),
                radius: curve.radius,
                turn_direction: curve.turn_direction,
            });
        }
    }
    segments.push(HorizontalSegment::Terminator {
        position: pis[last].position,
        direction: directions[last - 1],
    });

    log::debug!(
        "regenerated horizontal alignment: {} PIs, {} segments",
        pis.len(),
        segments.len()
    );
    Ok(segments)
}
