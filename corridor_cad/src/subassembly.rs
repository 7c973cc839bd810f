//! Library of reusable cross-section components.
//!
//! Every component computes its points in outward coordinates `(u, v)`:
//! `u` grows away from the centerline, `v` is elevation relative to the
//! directrix. The assembly mirrors left-side components afterwards.

use std::collections::BTreeMap;

use crate::assembly::ElevationSurface;
use crate::constraint::ConstraintResolver;
use crate::error::ValidationError;
use crate::geometry::{Point3, Vector2};

/// Bisection iterations used when locating a daylight point.
const DAYLIGHT_ITERATIONS: usize = 60;
/// Number of samples scanned outward before bisecting.
const DAYLIGHT_SAMPLES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Factor turning an outward distance into a signed offset (right positive).
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamClass {
    /// Widths, depths and heights; must not be negative.
    Dimension,
    /// Rise over run, limited to `|s| <= 1`.
    CrossSlope,
    /// Horizontal to vertical ratio, strictly positive.
    SideSlope,
}

#[derive(Debug, Clone, Copy)]
struct ParamSpec {
    name: &'static str,
    default: f64,
    class: ParamClass,
}

const fn param(name: &'static str, default: f64, class: ParamClass) -> ParamSpec {
    ParamSpec {
        name,
        default,
        class,
    }
}

const LANE: &[ParamSpec] = &[
    param("width", 3.6, ParamClass::Dimension),
    param("cross_slope", -0.02, ParamClass::CrossSlope),
    param("depth", 0.3, ParamClass::Dimension),
];
const SHOULDER: &[ParamSpec] = &[
    param("width", 2.5, ParamClass::Dimension),
    param("cross_slope", -0.04, ParamClass::CrossSlope),
    param("depth", 0.3, ParamClass::Dimension),
];
const CURB: &[ParamSpec] = &[
    param("height", 0.15, ParamClass::Dimension),
    param("width", 0.15, ParamClass::Dimension),
];
const SIDEWALK: &[ParamSpec] = &[
    param("width", 1.8, ParamClass::Dimension),
    param("cross_slope", 0.02, ParamClass::CrossSlope),
    param("depth", 0.1, ParamClass::Dimension),
];
const MEDIAN: &[ParamSpec] = &[
    param("width", 2.0, ParamClass::Dimension),
    param("height", 0.15, ParamClass::Dimension),
];
const DITCH: &[ParamSpec] = &[
    param("fore_slope", 4.0, ParamClass::SideSlope),
    param("depth", 1.0, ParamClass::Dimension),
    param("bottom_width", 1.0, ParamClass::Dimension),
    param("back_slope", 3.0, ParamClass::SideSlope),
];
const SLOPE_TIE: &[ParamSpec] = &[
    param("cut_slope", 2.0, ParamClass::SideSlope),
    param("fill_slope", 3.0, ParamClass::SideSlope),
    param("max_width", 30.0, ParamClass::Dimension),
];

const SURFACE_TAGS: &[&str] = &["top_inner", "top_outer", "bottom_outer", "bottom_inner"];

/// Kind of cross-section component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ComponentKind {
    Lane,
    Shoulder,
    Curb,
    Sidewalk,
    Median,
    Ditch,
    SlopeTie,
}

impl ComponentKind {
    fn specs(self) -> &'static [ParamSpec] {
        match self {
            ComponentKind::Lane => LANE,
            ComponentKind::Shoulder => SHOULDER,
            ComponentKind::Curb => CURB,
            ComponentKind::Sidewalk => SIDEWALK,
            ComponentKind::Median => MEDIAN,
            ComponentKind::Ditch => DITCH,
            ComponentKind::SlopeTie => SLOPE_TIE,
        }
    }

    /// Parameter names with their default values.
    pub fn defaults(self) -> impl Iterator<Item = (&'static str, f64)> {
        self.specs().iter().map(|s| (s.name, s.default))
    }

    pub fn default_value(self, parameter: &str) -> Option<f64> {
        self.specs()
            .iter()
            .find(|s| s.name == parameter)
            .map(|s| s.default)
    }

    /// Fixed labels of the points this kind emits, in emission order.
    pub fn point_labels(self) -> &'static [&'static str] {
        match self {
            ComponentKind::Lane | ComponentKind::Shoulder | ComponentKind::Sidewalk => SURFACE_TAGS,
            ComponentKind::Curb => &["flowline", "top_front", "top_back"],
            ComponentKind::Median => &["base_inner", "top_inner", "top_outer", "base_outer"],
            ComponentKind::Ditch => &["fore_top", "fore_bottom", "back_bottom", "back_top"],
            ComponentKind::SlopeTie => &["hinge", "daylight"],
        }
    }

    /// Index of the point the next component on the same side attaches to.
    pub fn trailing_index(self) -> usize {
        match self {
            ComponentKind::Lane | ComponentKind::Shoulder | ComponentKind::Sidewalk => 1,
            ComponentKind::Curb => 2,
            ComponentKind::Median | ComponentKind::Ditch => 3,
            ComponentKind::SlopeTie => 1,
        }
    }
}

/// Where a section sits in the world, needed by components that look at the ground.
#[derive(Clone, Copy)]
pub struct Placement<'a> {
    pub surface: &'a dyn ElevationSurface,
    /// Directrix point at the station.
    pub position: Point3,
    /// Unit heading of the alignment at the station.
    pub direction: Vector2,
}

impl std::fmt::Debug for Placement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Placement")
            .field("position", &self.position)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// A named component on one side of the assembly.
///
/// `name` is the key constraints use to target the component. `params`
/// holds base values replacing the kind's defaults; constraints override
/// both at evaluation time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Component {
    pub name: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,
}

impl Component {
    pub fn new(name: impl Into<String>, side: Side, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            side,
            kind,
            params: BTreeMap::new(),
        }
    }

    /// Replaces the base value of `parameter`.
    pub fn set_param(&mut self, parameter: &str, value: f64) -> Result<(), ValidationError> {
        if self.kind.default_value(parameter).is_none() {
            return Err(self.unknown(parameter));
        }
        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                what: "component parameter",
            });
        }
        self.params.insert(parameter.to_string(), value);
        Ok(())
    }

    pub fn with_param(mut self, parameter: &str, value: f64) -> Result<Self, ValidationError> {
        self.set_param(parameter, value)?;
        Ok(self)
    }

    /// Base value of `parameter` before constraints are applied.
    pub fn base_value(&self, parameter: &str) -> Option<f64> {
        self.params
            .get(parameter)
            .copied()
            .or_else(|| self.kind.default_value(parameter))
    }

    /// Checks that every stored parameter exists for this kind.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self
            .params
            .keys()
            .find(|p| self.kind.default_value(p).is_none())
        {
            return Err(self.unknown(name));
        }
        Ok(())
    }

    /// Tags of the emitted points, `"{name}/{label}"`.
    pub fn tags(&self) -> Vec<String> {
        self.kind
            .point_labels()
            .iter()
            .map(|label| format!("{}/{}", self.name, label))
            .collect()
    }

    /// Computes the component's points in outward coordinates starting at `attach`.
    pub fn points(
        &self,
        resolver: &ConstraintResolver<'_>,
        station: f64,
        attach: (f64, f64),
        placement: Option<&Placement<'_>>,
    ) -> Result<Vec<(f64, f64)>, ValidationError> {
        let (u, v) = attach;
        let pts = match self.kind {
            ComponentKind::Lane | ComponentKind::Shoulder | ComponentKind::Sidewalk => {
                let [width, slope, depth] = self.values(resolver, station)?;
                let outer = v + width * slope;
                vec![
                    (u, v),
                    (u + width, outer),
                    (u + width, outer - depth),
                    (u, v - depth),
                ]
            }
            ComponentKind::Curb => {
                let [height, width] = self.values(resolver, station)?;
                vec![(u, v), (u, v + height), (u + width, v + height)]
            }
            ComponentKind::Median => {
                let [width, height] = self.values(resolver, station)?;
                vec![(u, v), (u, v + height), (u + width, v + height), (u + width, v)]
            }
            ComponentKind::Ditch => {
                let [fore, depth, bottom, back] = self.values(resolver, station)?;
                let fore_run = fore * depth;
                let back_run = back * depth;
                vec![
                    (u, v),
                    (u + fore_run, v - depth),
                    (u + fore_run + bottom, v - depth),
                    (u + fore_run + bottom + back_run, v),
                ]
            }
            ComponentKind::SlopeTie => {
                let [cut, fill, max_width] = self.values(resolver, station)?;
                let daylight = self.daylight(attach, cut, fill, max_width, placement);
                vec![attach, daylight]
            }
        };
        Ok(pts)
    }

    /// Resolves all parameters of the kind in table order.
    fn values<const N: usize>(
        &self,
        resolver: &ConstraintResolver<'_>,
        station: f64,
    ) -> Result<[f64; N], ValidationError> {
        let specs = self.kind.specs();
        debug_assert_eq!(specs.len(), N);
        let mut out = [0.0; N];
        for (slot, spec) in out.iter_mut().zip(specs) {
            let base = self.base_value(spec.name).unwrap_or(spec.default);
            let value = resolver.resolve(&self.name, spec.name, station, base);
            check(&self.name, spec, value, station)?;
            *slot = value;
        }
        Ok(out)
    }

    /// Finds where the tie meets the ground, searching outward from `hinge`.
    fn daylight(
        &self,
        hinge: (f64, f64),
        cut: f64,
        fill: f64,
        max_width: f64,
        placement: Option<&Placement<'_>>,
    ) -> (f64, f64) {
        let fill_end = (hinge.0 + max_width, hinge.1 - max_width / fill);
        let Some(place) = placement else {
            return fill_end;
        };
        let ground = |x: f64| {
            let plan = place
                .position
                .plan()
                .offset(place.direction.right_normal(), self.side.sign() * (hinge.0 + x));
            place.surface.elevation_at(plan.x, plan.y)
        };
        let hinge_z = place.position.z + hinge.1;
        let Some(ground_at_hinge) = ground(0.0) else {
            log::warn!(
                "{}: no ground at hinge, running fill slope to {max_width}",
                self.name
            );
            return fill_end;
        };
        let in_cut = ground_at_hinge >= hinge_z;
        let rise = if in_cut { 1.0 / cut } else { -1.0 / fill };
        // negative until the slope line crosses the ground
        let gap = |x: f64| -> Option<f64> {
            let diff = hinge_z + x * rise - ground(x)?;
            Some(if in_cut { diff } else { -diff })
        };
        let point = |x: f64| (hinge.0 + x, hinge.1 + x * rise);

        if max_width <= 0.0 {
            return hinge;
        }
        let step = max_width / DAYLIGHT_SAMPLES as f64;
        let mut lo = 0.0;
        for i in 1..=DAYLIGHT_SAMPLES {
            let x = step * i as f64;
            let Some(g) = gap(x) else {
                log::warn!(
                    "{}: ground missing {x:.3} from hinge, running fill slope to {max_width}",
                    self.name
                );
                return fill_end;
            };
            if g >= 0.0 {
                let mut hi = x;
                for _ in 0..DAYLIGHT_ITERATIONS {
                    let mid = 0.5 * (lo + hi);
                    match gap(mid) {
                        Some(m) if m >= 0.0 => hi = mid,
                        Some(_) => lo = mid,
                        None => break,
                    }
                }
                return point(hi);
            }
            lo = x;
        }
        point(max_width)
    }

    fn unknown(&self, parameter: &str) -> ValidationError {
        ValidationError::UnknownParameter {
            component: self.name.clone(),
            parameter: parameter.to_string(),
        }
    }
}

fn check(component: &str, spec: &ParamSpec, value: f64, station: f64) -> Result<(), ValidationError> {
    let ok = match spec.class {
        ParamClass::Dimension => value >= 0.0 && value.is_finite(),
        ParamClass::CrossSlope => value.abs() <= 1.0,
        ParamClass::SideSlope => value > 0.0 && value.is_finite(),
    };
    if ok {
        return Ok(());
    }
    let (component, parameter) = (component.to_string(), spec.name.to_string());
    Err(match spec.class {
        ParamClass::Dimension => ValidationError::NegativeDimension {
            component,
            parameter,
            value,
            station,
        },
        ParamClass::CrossSlope | ParamClass::SideSlope => ValidationError::SlopeOutOfRange {
            component,
            parameter,
            value,
            station,
        },
    })
}

/// Creates a travel lane.
pub fn lane(name: impl Into<String>, side: Side) -> Component {
    Component::new(name, side, ComponentKind::Lane)
}

/// Creates a paved shoulder.
pub fn shoulder(name: impl Into<String>, side: Side) -> Component {
    Component::new(name, side, ComponentKind::Shoulder)
}

/// Creates a curb with a vertical face.
pub fn curb(name: impl Into<String>, side: Side) -> Component {
    Component::new(name, side, ComponentKind::Curb)
}

pub fn sidewalk(name: impl Into<String>, side: Side) -> Component {
    Component::new(name, side, ComponentKind::Sidewalk)
}

/// Creates a raised median that returns to grade at its outer edge.
pub fn median(name: impl Into<String>, side: Side) -> Component {
    Component::new(name, side, ComponentKind::Median)
}

/// Creates a trapezoidal ditch that starts and ends at attachment grade.
pub fn ditch(name: impl Into<String>, side: Side) -> Component {
    Component::new(name, side, ComponentKind::Ditch)
}

/// Creates a cut/fill slope running from the hinge to existing ground.
pub fn slope_tie(name: impl Into<String>, side: Side) -> Component {
    Component::new(name, side, ComponentKind::SlopeTie)
}
