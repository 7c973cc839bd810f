use assert_fs::prelude::*;
use predicates::prelude::*;

use corridor_cad::alignment::{CurveDescriptor, Pi, Pvi, TurnDirection};
use corridor_cad::assembly::Assembly;
use corridor_cad::constraint::{ConstraintRecord, Interpolation, ParametricConstraint};
use corridor_cad::corridor::tags_consistent;
use corridor_cad::export::AlignmentExport;
use corridor_cad::geometry::Point;
use corridor_cad::io::project::{read_project_json, write_project_json, Project};
use corridor_cad::io::write_json;
use corridor_cad::subassembly::{lane, shoulder, Side};
use corridor_cad::superelevation::SuperelevationPoint;

fn project() -> Project {
    let widening = ParametricConstraint::range(
        "Right Lane",
        "width",
        (200.0, 300.0),
        (3.6, 4.2),
        Interpolation::Linear,
    )
    .unwrap();
    Project {
        name: "bypass".into(),
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
        pvis: vec![
            Pvi::new(0.0, 100.0, 0.0),
            Pvi::new(500.0, 110.0, 200.0),
            Pvi::new(1100.0, 105.0, 0.0),
        ],
        assembly: Assembly::symmetric([
            lane("Right Lane", Side::Right),
            shoulder("Right Shoulder", Side::Right),
        ])
        .unwrap(),
        constraints: vec![ConstraintRecord::from(&widening)],
        superelevation: vec![
            SuperelevationPoint {
                station: 420.0,
                left_slope: -0.02,
                right_slope: -0.02,
            },
            SuperelevationPoint {
                station: 480.0,
                left_slope: 0.05,
                right_slope: -0.05,
            },
        ],
        ..Project::default()
    }
}

#[test]
fn project_roundtrip_and_build() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("bypass.json");
    let path = file.path().to_str().unwrap();
    let original = project();
    write_project_json(path, &original).unwrap();
    file.assert(predicate::str::contains("\"superelevation\""));

    let loaded = read_project_json(path).unwrap();
    assert_eq!(loaded, original);

    let set = loaded.constraint_set().unwrap();
    // widening plus one range per lane from the superelevation table
    assert_eq!(set.len(), 3);

    let corridor = loaded.build().unwrap();
    assert!(tags_consistent(corridor.profiles()));
    let round = Project::from_corridor("bypass", &corridor);
    assert_eq!(round.pis, original.pis);
    assert_eq!(round.settings, original.settings);
    dir.close().unwrap();
}

#[test]
fn export_file_lists_endpoint_marker() {
    let dir = assert_fs::TempDir::new().unwrap();
    let out = dir.child("segments.json");
    let alignment = project().alignment().unwrap();
    let export = AlignmentExport::new(&alignment.horizontal, &alignment.vertical);
    write_json(out.path().to_str().unwrap(), &export).unwrap();
    out.assert(predicate::str::contains("\"is_endpoint_marker\": true"));
    out.assert(predicate::str::contains("CircularArc"));
    assert_eq!(export.horizontal.len(), 4);
    assert_eq!(export.vertical.len(), 3);
}

#[test]
fn bad_constraint_record_fails_build() {
    let mut p = project();
    p.constraints[0].interpolation = "Cubic".into();
    assert!(p.build().is_err());
}
