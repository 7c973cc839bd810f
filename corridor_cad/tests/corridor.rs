use corridor_cad::alignment::{
    Alignment, HorizontalAlignmentEngine, Pvi, TurnDirection, VerticalAlignmentEngine,
};
use corridor_cad::assembly::Assembly;
use corridor_cad::constraint::{ConstraintSet, Interpolation, ParametricConstraint};
use corridor_cad::corridor::{
    generate, station_list, tags_consistent, Corridor, CorridorGenerator, CorridorSettings,
};
use corridor_cad::geometry::{distance, Point};
use corridor_cad::subassembly::{curb, ditch, lane, shoulder, slope_tie, Side};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn curved_alignment() -> Alignment {
    let mut h = HorizontalAlignmentEngine::new(vec![
        Point::new(0.0, 0.0),
        Point::new(500.0, 0.0),
        Point::new(1000.0, 200.0),
    ])
    .unwrap();
    h.insert_curve(1, 300.0, TurnDirection::Left).unwrap();
    let length = h.total_length();
    let v = VerticalAlignmentEngine::from_pvis([
        Pvi::new(0.0, 100.0, 0.0),
        Pvi::new(500.0, 110.0, 200.0),
        Pvi::new(length, 105.0, 0.0),
    ])
    .unwrap();
    Alignment::new(h, v)
}

fn urban_section() -> Assembly {
    Assembly::symmetric([
        lane("Right Lane", Side::Right),
        shoulder("Right Shoulder", Side::Right),
        curb("Right Curb", Side::Right),
    ])
    .unwrap()
}

#[test]
fn stations_cover_alignment() {
    init();
    let align = curved_alignment();
    let settings = CorridorSettings::default();
    let stations = station_list(&align.horizontal, &align.vertical, &settings).unwrap();
    assert_eq!(stations[0], 0.0);
    assert!((stations.last().unwrap() - align.length()).abs() < 1e-12);
    assert!(stations.windows(2).all(|w| w[1] > w[0]));
    assert!(stations
        .windows(2)
        .all(|w| w[1] - w[0] <= settings.max_spacing + 1e-9));
    for key in align
        .horizontal
        .key_stations()
        .into_iter()
        .chain(align.vertical.key_stations())
    {
        assert!(stations.iter().any(|s| (s - key).abs() < 1e-6), "missing {key}");
    }
}

#[test]
fn profiles_follow_directrix() {
    init();
    let align = curved_alignment();
    let set = ConstraintSet::new();
    let profiles = generate(
        &align.horizontal,
        &align.vertical,
        &urban_section(),
        &set.resolver(),
        20.0,
        1.0,
    )
    .unwrap();
    assert!(tags_consistent(&profiles));
    for p in &profiles {
        let expected = align.point3_at(p.station).unwrap();
        assert!((p.position.z - expected.z).abs() < 1e-9);
        assert!(distance(p.position.plan(), expected.plan()) < 1e-9);
        // centerline-adjacent points sit on the directrix
        let world = p.world_points();
        assert!(distance(world[0].plan(), p.position.plan()) < 1e-9);
    }
}

#[test]
fn widening_changes_only_its_side() {
    init();
    let align = curved_alignment();
    let mut set = ConstraintSet::new();
    set.add(
        ParametricConstraint::range(
            "Right Lane",
            "width",
            (200.0, 300.0),
            (3.6, 4.2),
            Interpolation::Linear,
        )
        .unwrap(),
    )
    .unwrap();
    let profiles = CorridorGenerator::new(CorridorSettings::default())
        .generate(&align.horizontal, &align.vertical, &urban_section(), &set.resolver())
        .unwrap();
    let at = |station: f64, tag: &str| {
        profiles
            .iter()
            .find(|p| (p.station - station).abs() < 1e-9)
            .and_then(|p| p.profile_points.iter().find(|pt| pt.tag == tag))
            .map(|pt| pt.offset)
            .unwrap()
    };
    assert!((at(250.0, "Right Lane/top_outer") - 3.9).abs() < 1e-9);
    assert!((at(250.0, "Left Lane/top_outer") + 3.6).abs() < 1e-9);
    assert!((at(300.0, "Right Curb/top_back") - (4.2 + 2.5 + 0.15)).abs() < 1e-9);
    assert!((at(150.0, "Right Lane/top_outer") - 3.6).abs() < 1e-9);
}

#[test]
fn rural_section_daylights_to_ground() {
    init();
    let align = curved_alignment();
    let assembly = Assembly::symmetric([
        lane("Right Lane", Side::Right),
        ditch("Right Ditch", Side::Right),
        slope_tie("Right Tie", Side::Right),
    ])
    .unwrap();
    // ground two metres under the grade line everywhere
    let ground = |x: f64, y: f64| {
        let h = &align.horizontal;
        let s = h.get_station_at_point(Point::new(x, y));
        align.vertical.get_elevation(s).ok().map(|z| z - 2.0)
    };
    let set = ConstraintSet::new();
    let profiles = CorridorGenerator::new(CorridorSettings {
        max_spacing: 50.0,
        ..CorridorSettings::default()
    })
    .with_surface(&ground)
    .generate(&align.horizontal, &align.vertical, &assembly, &set.resolver())
    .unwrap();
    assert!(tags_consistent(&profiles));
    let first = &profiles[0];
    let daylight = first
        .profile_points
        .iter()
        .find(|p| p.tag == "Right Tie/daylight")
        .unwrap();
    assert!((daylight.elevation + 2.0).abs() < 1e-6);
    assert!(daylight.offset < 30.0 + 3.6 + 15.0);
}

#[test]
fn corridor_rebuilds_on_constraint_change() {
    init();
    let mut corridor = Corridor::new(
        curved_alignment(),
        urban_section(),
        ConstraintSet::new(),
        CorridorSettings::default(),
    )
    .unwrap();
    let before = corridor.profiles().to_vec();
    let mut set = ConstraintSet::new();
    set.add(ParametricConstraint::point("Left Curb", "height", 0.0, 0.3).unwrap())
        .unwrap();
    corridor.set_constraints(set).unwrap();
    assert_eq!(corridor.profiles().len(), before.len());
    assert_ne!(corridor.profiles()[0], before[0]);
    assert_eq!(corridor.profiles()[1], before[1]);

    let mut bad = ConstraintSet::new();
    bad.add(ParametricConstraint::point("Left Curb", "height", 0.0, -0.3).unwrap())
        .unwrap();
    assert!(corridor.set_constraints(bad).is_err());
    assert_eq!(corridor.constraints().len(), 1);
}
