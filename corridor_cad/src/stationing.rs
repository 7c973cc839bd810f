//! Conversion between distance along an alignment and station labels.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

static STATION_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-)?(\d+)\+(\d+(?:\.\d*)?)\s*$").expect("valid station regex"));

/// Length of one full station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum StationUnit {
    /// `1+000` stations of 1000 units.
    #[default]
    Metric,
    /// `1+00` stations of 100 units.
    Imperial,
}

impl StationUnit {
    pub fn length(self) -> f64 {
        match self {
            StationUnit::Metric => 1000.0,
            StationUnit::Imperial => 100.0,
        }
    }

    fn digits(self) -> usize {
        match self {
            StationUnit::Metric => 3,
            StationUnit::Imperial => 2,
        }
    }
}

/// Station labelling scheme for an alignment.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Stationing {
    /// Station value at the start of the alignment.
    pub start_station: f64,
    pub unit: StationUnit,
    /// Decimal places printed after the `+` part.
    pub precision: usize,
}

impl Default for Stationing {
    fn default() -> Self {
        Self {
            start_station: 0.0,
            unit: StationUnit::Metric,
            precision: 3,
        }
    }
}

impl Stationing {
    pub fn new(start_station: f64, unit: StationUnit) -> Self {
        Self {
            start_station,
            unit,
            ..Self::default()
        }
    }

    /// Formats a distance along the alignment as a station label, e.g. `1+234.560`.
    pub fn label(&self, distance: f64) -> String {
        let value = self.start_station + distance;
        let scale = 10f64.powi(self.precision as i32);
        let rounded = (value.abs() * scale).round() / scale;
        let unit = self.unit.length();
        let mut major = (rounded / unit).floor();
        let mut minor = rounded - major * unit;
        // guard against 999.9999... printing as 0+1000.000
        if minor >= unit - 0.5 / scale {
            major += 1.0;
            minor = 0.0;
        }
        let sign = if value < 0.0 && rounded > 0.0 { "-" } else { "" };
        let width = self.unit.digits()
            + if self.precision > 0 {
                self.precision + 1
            } else {
                0
            };
        format!(
            "{sign}{major:.0}+{minor:0width$.prec$}",
            width = width,
            prec = self.precision
        )
    }

    /// Parses a station label back into a distance along the alignment.
    pub fn distance(&self, label: &str) -> Result<f64, ValidationError> {
        let caps = STATION_LABEL
            .captures(label)
            .ok_or_else(|| ValidationError::InvalidStationLabel(label.to_string()))?;
        let invalid = || ValidationError::InvalidStationLabel(label.to_string());
        let major: f64 = caps[2].parse().map_err(|_| invalid())?;
        let minor: f64 = caps[3].parse().map_err(|_| invalid())?;
        if minor >= self.unit.length() {
            return Err(invalid());
        }
        let magnitude = major * self.unit.length() + minor;
        let value = if caps.get(1).is_some() {
            -magnitude
        } else {
            magnitude
        };
        Ok(value - self.start_station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_labels() {
        let s = Stationing::default();
        assert_eq!(s.label(0.0), "0+000.000");
        assert_eq!(s.label(1234.56), "1+234.560");
        assert_eq!(s.label(999.99996), "1+000.000");
        assert_eq!(s.label(-50.0), "-0+050.000");
    }

    #[test]
    fn imperial_labels_with_start_station() {
        let s = Stationing {
            start_station: 1000.0,
            unit: StationUnit::Imperial,
            precision: 2,
        };
        assert_eq!(s.label(234.5), "12+34.50");
        assert!((s.distance("12+34.50").unwrap() - 234.5).abs() < 1e-9);
    }

    #[test]
    fn parse_round_trips_and_rejects_garbage() {
        let s = Stationing::default();
        for d in [0.0, 12.345, 1500.0, 98765.432] {
            let label = s.label(d);
            assert!((s.distance(&label).unwrap() - d).abs() < 1e-9, "{label}");
        }
        assert!((s.distance("-0+050.000").unwrap() + 50.0).abs() < 1e-9);
        assert!(s.distance("abc").is_err());
        assert!(s.distance("1+2000").is_err());
    }
}
