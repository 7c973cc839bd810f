use serde::{Deserialize, Serialize};

use crate::alignment::{Alignment, HorizontalAlignmentEngine, Pi, Pvi, VerticalAlignmentEngine};
use crate::assembly::Assembly;
use crate::constraint::{ConstraintRecord, ConstraintSet};
use crate::corridor::{Corridor, CorridorSettings};
use crate::error::Result;
use crate::superelevation::{self, SuperelevationTable};

/// Everything needed to rebuild one corridor, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    pub pis: Vec<Pi>,
    pub pvis: Vec<Pvi>,
    #[serde(default)]
    pub assembly: Assembly,
    #[serde(default)]
    pub constraints: Vec<ConstraintRecord>,
    #[serde(default)]
    pub superelevation: SuperelevationTable,
    #[serde(default)]
    pub settings: CorridorSettings,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the inputs of an existing corridor.
    pub fn from_corridor(name: impl Into<String>, corridor: &Corridor) -> Self {
        let alignment = corridor.alignment();
        Self {
            name: name.into(),
            pis: alignment.horizontal.pis().to_vec(),
            pvis: alignment.vertical.pvis().to_vec(),
            assembly: corridor.assembly().clone(),
            constraints: corridor.constraints().to_records(),
            superelevation: Vec::new(),
            settings: *corridor.settings(),
        }
    }

    pub fn horizontal(&self) -> Result<HorizontalAlignmentEngine> {
        HorizontalAlignmentEngine::from_pis(self.pis.clone())
    }

    pub fn vertical(&self) -> Result<VerticalAlignmentEngine> {
        VerticalAlignmentEngine::from_pvis(self.pvis.iter().copied())
    }

    pub fn alignment(&self) -> Result<Alignment> {
        Ok(Alignment::new(self.horizontal()?, self.vertical()?))
    }

    /// Stored constraints merged with the lane constraints of the superelevation table.
    ///
    /// Both go through the same start station ordering, so a stored range
    /// starting inside the superelevation span overrides it there.
    pub fn constraint_set(&self) -> Result<ConstraintSet> {
        let mut set = ConstraintSet::from_records(self.constraints.iter().cloned())?;
        for c in superelevation::to_constraints(&self.superelevation, &self.assembly)? {
            set.add(c)?;
        }
        Ok(set)
    }

    /// Builds the corridor and generates its profiles.
    pub fn build(&self) -> Result<Corridor> {
        Corridor::new(
            self.alignment()?,
            self.assembly.clone(),
            self.constraint_set()?,
            self.settings,
        )
    }
}

pub fn read_project_json(path: &str) -> std::io::Result<Project> {
    let contents = crate::io::read_to_string(path)?;
    let proj: Project = serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(proj)
}

pub fn write_project_json(path: &str, project: &Project) -> std::io::Result<()> {
    crate::io::write_json(path, project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{CurveDescriptor, TurnDirection};
    use crate::constraint::{Interpolation, ParametricConstraint};
    use crate::superelevation::SuperelevationPoint;
    use crate::geometry::Point;
    use crate::subassembly::{lane, Side};
    use tempfile::NamedTempFile;

    fn sample() -> Project {
        Project {
            name: "demo".into(),
            pis: vec![
                Pi::new(Point::new(0.0, 0.0)),
                Pi {
                    position: Point::new(500.0, 0.0),
                    curve: Some(CurveDescriptor {
                        radius: 300.0,
                        turn_direction: TurnDirection::Left,
                    }),
                },
                Pi::new(Point::new(1000.0, 200.0)),
            ],
            pvis: vec![Pvi::new(0.0, 100.0, 0.0), Pvi::new(1040.0, 110.0, 0.0)],
            assembly: Assembly::symmetric([lane("Right Lane", Side::Right)]).unwrap(),
            ..Project::default()
        }
    }

    #[test]
    fn roundtrip_through_file() {
        let project = sample();
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        write_project_json(path, &project).unwrap();
        let back = read_project_json(path).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn superelevation_follows_start_station_precedence() {
        let mut project = sample();
        project.superelevation = vec![
            SuperelevationPoint { station: 420.0, left_slope: -0.02, right_slope: -0.02 },
            SuperelevationPoint { station: 480.0, left_slope: 0.05, right_slope: -0.05 },
        ];
        let before = ParametricConstraint::range(
            "Right Lane",
            "cross_slope",
            (100.0, 600.0),
            (-0.03, -0.03),
            Interpolation::Linear,
        )
        .unwrap();
        let inside = ParametricConstraint::range(
            "Right Lane",
            "cross_slope",
            (440.0, 460.0),
            (-0.01, -0.01),
            Interpolation::Linear,
        )
        .unwrap();
        project.constraints = vec![(&inside).into(), (&before).into()];
        let set = project.constraint_set().unwrap();
        let r = set.resolver();
        assert!((r.resolve("Right Lane", "cross_slope", 300.0, 0.0) + 0.03).abs() < 1e-9);
        assert!((r.resolve("Right Lane", "cross_slope", 430.0, 0.0) + 0.025).abs() < 1e-9);
        assert!((r.resolve("Right Lane", "cross_slope", 450.0, 0.0) + 0.01).abs() < 1e-9);
    }

    #[test]
    fn malformed_json_is_invalid_data() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        crate::io::write_string(path, "{ \"pis\": 3 }").unwrap();
        let err = read_project_json(path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let json = r#"{"pis":[{"position":{"x":0,"y":0}},{"position":{"x":50,"y":0}}],
                       "pvis":[{"station":0,"elevation":10},{"station":50,"elevation":11}],
                       "assembly":[{"name":"Lane","side":"Right","type":"Lane"}]}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.settings, CorridorSettings::default());
        let corridor = project.build().unwrap();
        assert_eq!(corridor.profiles().len(), 6);
    }
}
