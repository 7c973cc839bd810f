//! Station-based overrides of cross-section component parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const STATION_TOLERANCE: f64 = 1e-9;

/// Whether a constraint applies at a single station or over a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConstraintKind {
    Point,
    Range,
}

/// How a range constraint blends from its start value to its end value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Smoothstep, `t² (3 − 2t)`.
    Smooth,
    /// Holds the start value until the end station.
    Step,
}

impl Interpolation {
    /// Blends `start` and `end` at normalized position `t` in `0..=1`.
    pub fn apply(self, start: f64, end: f64, t: f64) -> f64 {
        match self {
            Interpolation::Linear => start + t * (end - start),
            Interpolation::Smooth => {
                let s = t * t * (3.0 - 2.0 * t);
                start + s * (end - start)
            }
            Interpolation::Step => {
                if t < 1.0 {
                    start
                } else {
                    end
                }
            }
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Point => write!(f, "Point"),
            ConstraintKind::Range => write!(f, "Range"),
        }
    }
}

impl FromStr for ConstraintKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(ConstraintKind::Point),
            "range" => Ok(ConstraintKind::Range),
            _ => Err(ValidationError::UnknownConstraintKind(s.to_string())),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolation::Linear => write!(f, "Linear"),
            Interpolation::Smooth => write!(f, "Smooth"),
            Interpolation::Step => write!(f, "Step"),
        }
    }
}

impl FromStr for Interpolation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Interpolation::Linear),
            "smooth" => Ok(Interpolation::Smooth),
            "step" => Ok(Interpolation::Step),
            _ => Err(ValidationError::UnknownInterpolation(s.to_string())),
        }
    }
}

/// Override of one component parameter at a station or over a station range.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParametricConstraint {
    pub component_name: String,
    pub parameter_name: String,
    pub kind: ConstraintKind,
    pub start_station: f64,
    pub end_station: f64,
    pub start_value: f64,
    pub end_value: f64,
    pub interpolation: Interpolation,
    pub enabled: bool,
}

impl ParametricConstraint {
    /// Fixed value at a single station.
    pub fn point(
        component: impl Into<String>,
        parameter: impl Into<String>,
        station: f64,
        value: f64,
    ) -> Result<Self, ValidationError> {
        let c = Self {
            component_name: component.into(),
            parameter_name: parameter.into(),
            kind: ConstraintKind::Point,
            start_station: station,
            end_station: station,
            start_value: value,
            end_value: value,
            interpolation: Interpolation::Linear,
            enabled: true,
        };
        c.validate()?;
        Ok(c)
    }

    /// Value blended from `start_value` to `end_value` between two stations.
    pub fn range(
        component: impl Into<String>,
        parameter: impl Into<String>,
        stations: (f64, f64),
        values: (f64, f64),
        interpolation: Interpolation,
    ) -> Result<Self, ValidationError> {
        let c = Self {
            component_name: component.into(),
            parameter_name: parameter.into(),
            kind: ConstraintKind::Range,
            start_station: stations.0,
            end_station: stations.1,
            start_value: values.0,
            end_value: values.1,
            interpolation,
            enabled: true,
        };
        c.validate()?;
        Ok(c)
    }

    /// Checks the point/range invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidConstraint {
            component: self.component_name.clone(),
            parameter: self.parameter_name.clone(),
            reason: reason.to_string(),
        };
        if self.component_name.is_empty() || self.parameter_name.is_empty() {
            return Err(invalid("component and parameter names are required"));
        }
        let numbers = [
            self.start_station,
            self.end_station,
            self.start_value,
            self.end_value,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return Err(invalid("stations and values must be finite"));
        }
        match self.kind {
            ConstraintKind::Point => {
                if self.start_station != self.end_station {
                    return Err(invalid("point constraint needs equal start and end stations"));
                }
                if self.start_value != self.end_value {
                    return Err(invalid("point constraint needs equal start and end values"));
                }
            }
            ConstraintKind::Range => {
                if self.start_station > self.end_station {
                    return Err(invalid("range starts after it ends"));
                }
            }
        }
        Ok(())
    }

    pub fn applies_to(&self, component: &str, parameter: &str) -> bool {
        self.enabled && self.component_name == component && self.parameter_name == parameter
    }

    pub fn contains(&self, station: f64) -> bool {
        match self.kind {
            ConstraintKind::Point => (station - self.start_station).abs() <= STATION_TOLERANCE,
            ConstraintKind::Range => station >= self.start_station && station <= self.end_station,
        }
    }

    /// Value at `station`, assuming [`contains`](Self::contains) holds.
    pub fn value_at(&self, station: f64) -> f64 {
        match self.kind {
            ConstraintKind::Point => self.start_value,
            ConstraintKind::Range => {
                let span = self.end_station - self.start_station;
                let t = if span <= 0.0 {
                    1.0
                } else {
                    ((station - self.start_station) / span).clamp(0.0, 1.0)
                };
                self.interpolation
                    .apply(self.start_value, self.end_value, t)
            }
        }
    }
}

/// Flat persisted form of a [`ParametricConstraint`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConstraintRecord {
    pub component: String,
    pub parameter: String,
    pub kind: String,
    pub start_station: f64,
    pub end_station: f64,
    pub start_value: f64,
    pub end_value: f64,
    pub interpolation: String,
    pub enabled: bool,
}

impl From<&ParametricConstraint> for ConstraintRecord {
    fn from(c: &ParametricConstraint) -> Self {
        Self {
            component: c.component_name.clone(),
            parameter: c.parameter_name.clone(),
            kind: c.kind.to_string(),
            start_station: c.start_station,
            end_station: c.end_station,
            start_value: c.start_value,
            end_value: c.end_value,
            interpolation: c.interpolation.to_string(),
            enabled: c.enabled,
        }
    }
}

impl TryFrom<ConstraintRecord> for ParametricConstraint {
    type Error = ValidationError;

    fn try_from(r: ConstraintRecord) -> Result<Self, Self::Error> {
        let c = Self {
            kind: r.kind.parse()?,
            interpolation: r.interpolation.parse()?,
            component_name: r.component,
            parameter_name: r.parameter,
            start_station: r.start_station,
            end_station: r.end_station,
            start_value: r.start_value,
            end_value: r.end_value,
            enabled: r.enabled,
        };
        c.validate()?;
        Ok(c)
    }
}

/// Owned collection of constraints, kept sorted by start station.
///
/// Constraints sharing a start station keep their insertion order. When
/// several enabled constraints match the same parameter at a station, the
/// one furthest down the list wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    constraints: Vec<ParametricConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts a constraint, returning its position in the list.
    pub fn add(&mut self, constraint: ParametricConstraint) -> Result<usize, ValidationError> {
        constraint.validate()?;
        let at = self
            .constraints
            .partition_point(|c| c.start_station <= constraint.start_station);
        self.constraints.insert(at, constraint);
        Ok(at)
    }

    pub fn remove(&mut self, index: usize) -> Option<ParametricConstraint> {
        (index < self.constraints.len()).then(|| self.constraints.remove(index))
    }

    /// Enables or disables a constraint; returns `false` for a bad index.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.constraints.get_mut(index) {
            Some(c) => {
                c.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParametricConstraint> {
        self.constraints.iter()
    }

    pub fn as_slice(&self) -> &[ParametricConstraint] {
        &self.constraints
    }

    /// Constraints targeting `component`, in precedence order.
    pub fn for_component<'a>(
        &'a self,
        component: &'a str,
    ) -> impl Iterator<Item = &'a ParametricConstraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| c.component_name == component)
    }

    pub fn resolver(&self) -> ConstraintResolver<'_> {
        ConstraintResolver::new(&self.constraints)
    }

    pub fn to_records(&self) -> Vec<ConstraintRecord> {
        self.constraints.iter().map(ConstraintRecord::from).collect()
    }

    pub fn from_records(
        records: impl IntoIterator<Item = ConstraintRecord>,
    ) -> Result<Self, ValidationError> {
        let mut set = Self::new();
        for record in records {
            set.add(ParametricConstraint::try_from(record)?)?;
        }
        Ok(set)
    }

    /// Builds a set from constraints, failing on the first invalid one.
    pub fn from_constraints(
        constraints: impl IntoIterator<Item = ParametricConstraint>,
    ) -> Result<Self, ValidationError> {
        let mut set = Self::new();
        for c in constraints {
            set.add(c)?;
        }
        Ok(set)
    }
}

/// Read-only view resolving effective parameter values.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintResolver<'a> {
    constraints: &'a [ParametricConstraint],
}

impl<'a> ConstraintResolver<'a> {
    /// Wraps constraints that are already in precedence order.
    pub fn new(constraints: &'a [ParametricConstraint]) -> Self {
        Self { constraints }
    }

    /// Resolver without any overrides; every lookup returns its default.
    pub fn empty() -> Self {
        Self { constraints: &[] }
    }

    /// Effective value of `component.parameter` at `station`, or `default`.
    pub fn resolve(&self, component: &str, parameter: &str, station: f64, default: f64) -> f64 {
        self.constraints
            .iter()
            .rev()
            .find(|c| c.applies_to(component, parameter) && c.contains(station))
            .map_or(default, |c| c.value_at(station))
    }
}
