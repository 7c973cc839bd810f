use crate::assembly::Assembly;
use crate::constraint::{Interpolation, ParametricConstraint};
use crate::error::ValidationError;
use crate::subassembly::{ComponentKind, Side};

/// Cross slopes of the travel lanes at one station.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SuperelevationPoint {
    pub station: f64,
    pub left_slope: f64,
    pub right_slope: f64,
}

pub type SuperelevationTable = Vec<SuperelevationPoint>;

/// Linearly interpolate left and right cross slopes from a table.
///
/// Stations outside the table take the nearest end row.
pub fn slopes_at(table: &[SuperelevationPoint], station: f64) -> Option<(f64, f64)> {
    let first = table.first()?;
    if station <= first.station {
        return Some((first.left_slope, first.right_slope));
    }
    for pair in table.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if station >= a.station && station <= b.station {
            let t = if (b.station - a.station).abs() < f64::EPSILON {
                0.0
            } else {
                (station - a.station) / (b.station - a.station)
            };
            let left = a.left_slope + t * (b.left_slope - a.left_slope);
            let right = a.right_slope + t * (b.right_slope - a.right_slope);
            return Some((left, right));
        }
    }
    table.last().map(|last| (last.left_slope, last.right_slope))
}

fn check_table(table: &[SuperelevationPoint]) -> Result<(), ValidationError> {
    for (i, row) in table.iter().enumerate() {
        if !(row.station.is_finite() && row.left_slope.is_finite() && row.right_slope.is_finite()) {
            return Err(ValidationError::NonFinite {
                what: "superelevation row",
            });
        }
        if i > 0 && row.station <= table[i - 1].station {
            return Err(ValidationError::DuplicateStation {
                station: row.station,
            });
        }
    }
    Ok(())
}

/// Expands a superelevation table into `cross_slope` range constraints.
///
/// Every lane of the assembly gets one linear range per pair of adjacent
/// rows, taking the left or right slope according to its side. Outside the
/// table the lanes keep their own cross slope.
pub fn to_constraints(
    table: &[SuperelevationPoint],
    assembly: &Assembly,
) -> Result<Vec<ParametricConstraint>, ValidationError> {
    check_table(table)?;
    let lanes: Vec<_> = assembly
        .components()
        .iter()
        .filter(|c| c.kind == ComponentKind::Lane)
        .collect();
    let mut constraints = Vec::new();
    for pair in table.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        for lane in &lanes {
            let values = match lane.side {
                Side::Left => (a.left_slope, b.left_slope),
                Side::Right => (a.right_slope, b.right_slope),
            };
            constraints.push(ParametricConstraint::range(
                lane.name.clone(),
                "cross_slope",
                (a.station, b.station),
                values,
                Interpolation::Linear,
            )?);
        }
    }
    Ok(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{ConstraintResolver, ConstraintSet};
    use crate::subassembly::lane;

    fn table() -> SuperelevationTable {
        vec![
            SuperelevationPoint {
                station: 100.0,
                left_slope: -0.02,
                right_slope: -0.02,
            },
            SuperelevationPoint {
                station: 200.0,
                left_slope: 0.06,
                right_slope: -0.06,
            },
        ]
    }

    #[test]
    fn interpolates_and_clamps() {
        let t = table();
        let (l, r) = slopes_at(&t, 150.0).unwrap();
        assert!((l - 0.02).abs() < 1e-9);
        assert!((r + 0.04).abs() < 1e-9);
        assert_eq!(slopes_at(&t, 0.0), Some((-0.02, -0.02)));
        assert_eq!(slopes_at(&t, 500.0), Some((0.06, -0.06)));
        assert_eq!(slopes_at(&[], 10.0), None);
    }

    #[test]
    fn expands_into_lane_constraints() {
        let assembly = Assembly::symmetric([lane("Right Lane", Side::Right)]).unwrap();
        let constraints = to_constraints(&table(), &assembly).unwrap();
        assert_eq!(constraints.len(), 2);
        let set = ConstraintSet::from_constraints(constraints).unwrap();
        let r: ConstraintResolver<'_> = set.resolver();
        assert!((r.resolve("Left Lane", "cross_slope", 150.0, 0.0) - 0.02).abs() < 1e-9);
        assert!((r.resolve("Right Lane", "cross_slope", 150.0, 0.0) + 0.04).abs() < 1e-9);
        assert_eq!(r.resolve("Right Lane", "cross_slope", 50.0, -0.025), -0.025);
    }

    #[test]
    fn unsorted_table_rejected() {
        let mut t = table();
        t.reverse();
        let assembly = Assembly::symmetric([lane("Right Lane", Side::Right)]).unwrap();
        assert!(matches!(
            to_constraints(&t, &assembly),
            Err(ValidationError::DuplicateStation { .. })
        ));
    }
}
