use corridor_cad::assembly::Assembly;
use corridor_cad::constraint::ConstraintSet;
use corridor_cad::corridor::generate;
use corridor_cad::alignment::{HorizontalAlignmentEngine, Pvi, VerticalAlignmentEngine};
use corridor_cad::geometry::Point;
use corridor_cad::subassembly::{lane, shoulder, Side};
use corridor_cad::superelevation::{
    slopes_at, to_constraints, SuperelevationPoint, SuperelevationTable,
};

#[test]
fn empty_table_has_no_slopes() {
    let table: SuperelevationTable = Vec::new();
    assert!(slopes_at(&table, 10.0).is_none());
}

#[test]
fn before_first_entry_returns_first_slopes() {
    let table = vec![
        SuperelevationPoint { station: 10.0, left_slope: -0.02, right_slope: 0.02 },
        SuperelevationPoint { station: 20.0, left_slope: 0.03, right_slope: -0.03 },
    ];
    let (left, right) = slopes_at(&table, 5.0).unwrap();
    assert!((left + 0.02).abs() < 1e-9);
    assert!((right - 0.02).abs() < 1e-9);
}

#[test]
fn interpolates_between_entries() {
    let table = vec![
        SuperelevationPoint { station: 0.0, left_slope: -0.02, right_slope: 0.02 },
        SuperelevationPoint { station: 100.0, left_slope: 0.04, right_slope: -0.04 },
    ];
    let (left, right) = slopes_at(&table, 50.0).unwrap();
    assert!((left - 0.01).abs() < 1e-9);
    assert!((right + 0.01).abs() < 1e-9);
}

#[test]
fn rotates_lanes_in_generated_sections() {
    let h = HorizontalAlignmentEngine::new(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)])
        .unwrap();
    let v = VerticalAlignmentEngine::from_pvis([
        Pvi::new(0.0, 50.0, 0.0),
        Pvi::new(100.0, 50.0, 0.0),
    ])
    .unwrap();
    let assembly = Assembly::symmetric([
        lane("Right Lane", Side::Right),
        shoulder("Right Shoulder", Side::Right),
    ])
    .unwrap();
    let table = vec![
        SuperelevationPoint { station: 20.0, left_slope: -0.02, right_slope: -0.02 },
        SuperelevationPoint { station: 80.0, left_slope: 0.04, right_slope: -0.04 },
    ];
    let set = ConstraintSet::from_constraints(to_constraints(&table, &assembly).unwrap()).unwrap();
    let profiles = generate(&h, &v, &assembly, &set.resolver(), 10.0, 1.0).unwrap();

    let edge = |station: f64, tag: &str| {
        let profile = profiles
            .iter()
            .find(|p| (p.station - station).abs() < 1e-9)
            .unwrap();
        profile
            .profile_points
            .iter()
            .find(|p| p.tag == tag)
            .unwrap()
            .elevation
    };
    // fully superelevated: the left lane rises, the right lane falls
    assert!((edge(80.0, "Left Lane/top_outer") - 3.6 * 0.04).abs() < 1e-9);
    assert!((edge(80.0, "Right Lane/top_outer") + 3.6 * 0.04).abs() < 1e-9);
    // halfway through the transition
    assert!((edge(50.0, "Left Lane/top_outer") - 3.6 * 0.01).abs() < 1e-9);
    // shoulders are left alone
    let shoulder_drop = edge(80.0, "Left Shoulder/top_outer") - edge(80.0, "Left Shoulder/top_inner");
    assert!((shoulder_drop + 2.5 * 0.04).abs() < 1e-9);
    // before the table the lanes keep their normal crown
    assert!((edge(10.0, "Left Lane/top_outer") + 3.6 * 0.02).abs() < 1e-9);
}
