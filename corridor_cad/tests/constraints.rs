use corridor_cad::constraint::{
    ConstraintRecord, ConstraintSet, Interpolation, ParametricConstraint,
};

fn widening(interpolation: Interpolation) -> ParametricConstraint {
    ParametricConstraint::range("Right Lane", "width", (200.0, 300.0), (3.6, 4.2), interpolation)
        .unwrap()
}

#[test]
fn widening_range() {
    let mut set = ConstraintSet::new();
    set.add(widening(Interpolation::Linear)).unwrap();
    let r = set.resolver();
    assert!((r.resolve("Right Lane", "width", 250.0, 3.6) - 3.9).abs() < 1e-6);
    assert!((r.resolve("Right Lane", "width", 150.0, 3.6) - 3.6).abs() < 1e-6);
    assert_eq!(r.resolve("Right Lane", "width", 300.0, 3.6), 4.2);
    assert_eq!(r.resolve("Right Lane", "width", 300.1, 3.6), 3.6);
}

#[test]
fn linear_values_stay_between_endpoints() {
    let c = widening(Interpolation::Linear);
    let mut last = c.value_at(200.0);
    for i in 1..=100 {
        let v = c.value_at(200.0 + i as f64);
        assert!(v >= last - 1e-12);
        assert!((3.6..=4.2 + 1e-12).contains(&v));
        last = v;
    }
}

#[test]
fn smooth_matches_linear_at_ends_and_middle() {
    let linear = widening(Interpolation::Linear);
    let smooth = widening(Interpolation::Smooth);
    for s in [200.0, 250.0, 300.0] {
        assert!((linear.value_at(s) - smooth.value_at(s)).abs() < 1e-12);
    }
    assert!(smooth.value_at(210.0) < linear.value_at(210.0));
}

#[test]
fn overlapping_ranges_later_wins() {
    let mut set = ConstraintSet::new();
    set.add(widening(Interpolation::Linear)).unwrap();
    set.add(
        ParametricConstraint::range("Right Lane", "width", (250.0, 400.0), (5.0, 5.0), Interpolation::Step)
            .unwrap(),
    )
    .unwrap();
    let r = set.resolver();
    assert!((r.resolve("Right Lane", "width", 240.0, 0.0) - 3.84).abs() < 1e-9);
    assert_eq!(r.resolve("Right Lane", "width", 260.0, 0.0), 5.0);
    assert_eq!(set.for_component("Right Lane").count(), 2);
    assert!(set.remove(1).is_some());
    assert!((set.resolver().resolve("Right Lane", "width", 260.0, 0.0) - 3.96).abs() < 1e-9);
}

#[test]
fn records_convert_losslessly() {
    let mut set = ConstraintSet::new();
    set.add(widening(Interpolation::Smooth)).unwrap();
    set.add(ParametricConstraint::point("Left Curb", "height", 120.0, 0.2).unwrap())
        .unwrap();
    set.set_enabled(1, false);
    let records = set.to_records();
    let json = serde_json::to_string(&records).unwrap();
    let back: Vec<ConstraintRecord> = serde_json::from_str(&json).unwrap();
    let rebuilt = ConstraintSet::from_records(back).unwrap();
    assert_eq!(rebuilt, set);
    assert!(!rebuilt.iter().nth(1).unwrap().enabled);
}
