//! Ordered cross-section assemblies built from [`Component`]s.

use crate::constraint::ConstraintResolver;
use crate::error::ValidationError;
use crate::subassembly::{Component, Placement, Side};

/// Existing ground queried by slope ties.
pub trait ElevationSurface {
    /// Elevation at plan coordinates, or `None` outside the surface.
    fn elevation_at(&self, x: f64, y: f64) -> Option<f64>;
}

impl<F> ElevationSurface for F
where
    F: Fn(f64, f64) -> Option<f64>,
{
    fn elevation_at(&self, x: f64, y: f64) -> Option<f64> {
        self(x, y)
    }
}

/// A tagged point of a cross-section profile.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfilePoint {
    /// Signed offset from the centerline, positive to the right.
    pub offset: f64,
    /// Elevation relative to the directrix.
    pub elevation: f64,
    pub tag: String,
}

/// Components composed outward from the centerline, per side, in list order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<Component>", into = "Vec<Component>")]
pub struct Assembly {
    components: Vec<Component>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_components(
        components: impl IntoIterator<Item = Component>,
    ) -> Result<Self, ValidationError> {
        let mut assembly = Self::new();
        for c in components {
            assembly.push(c)?;
        }
        Ok(assembly)
    }

    /// Appends a component; names must be unique since they key constraints and tags.
    pub fn push(&mut self, component: Component) -> Result<(), ValidationError> {
        component.validate()?;
        if self.components.iter().any(|c| c.name == component.name) {
            return Err(ValidationError::DuplicateComponent {
                name: component.name,
            });
        }
        self.components.push(component);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<Component> {
        (index < self.components.len()).then(|| self.components.remove(index))
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Builds a symmetric section from right-side components.
    ///
    /// The mirrored copies come first and take the right-side names with
    /// `Right` replaced by `Left` (or prefixed with `Left ` when the name has
    /// no `Right` in it).
    pub fn symmetric(right: impl IntoIterator<Item = Component>) -> Result<Self, ValidationError> {
        let right: Vec<Component> = right
            .into_iter()
            .map(|mut c| {
                c.side = Side::Right;
                c
            })
            .collect();
        let mut all: Vec<Component> = right
            .iter()
            .map(|c| {
                let name = if c.name.contains("Right") {
                    c.name.replace("Right", "Left")
                } else {
                    format!("Left {}", c.name)
                };
                Component {
                    name,
                    side: Side::Left,
                    ..c.clone()
                }
            })
            .collect();
        all.extend(right);
        Self::from_components(all)
    }

    /// Tags of every profile point, in output order.
    pub fn tags(&self) -> Vec<String> {
        self.components.iter().flat_map(Component::tags).collect()
    }

    /// Profile at `station` with constraint overrides applied.
    pub fn evaluate(
        &self,
        resolver: &ConstraintResolver<'_>,
        station: f64,
    ) -> Result<Vec<ProfilePoint>, ValidationError> {
        self.evaluate_placed(resolver, station, None)
    }

    /// Like [`evaluate`](Self::evaluate), with ground available to slope ties.
    pub fn evaluate_placed(
        &self,
        resolver: &ConstraintResolver<'_>,
        station: f64,
        placement: Option<&Placement<'_>>,
    ) -> Result<Vec<ProfilePoint>, ValidationError> {
        let mut left = (0.0, 0.0);
        let mut right = (0.0, 0.0);
        let mut profile = Vec::new();
        for component in &self.components {
            let attach = match component.side {
                Side::Left => &mut left,
                Side::Right => &mut right,
            };
            let pts = component.points(resolver, station, *attach, placement)?;
            if let Some(&trailing) = pts.get(component.kind.trailing_index()) {
                *attach = trailing;
            }
            let sign = component.side.sign();
            profile.extend(
                component
                    .kind
                    .point_labels()
                    .iter()
                    .zip(pts)
                    .map(|(label, (u, v))| ProfilePoint {
                        offset: sign * u,
                        elevation: v,
                        tag: format!("{}/{}", component.name, label),
                    }),
            );
        }
        Ok(profile)
    }

    /// Horizontal extent `(left, right)` of the section at `station`.
    pub fn total_width(
        &self,
        resolver: &ConstraintResolver<'_>,
        station: f64,
    ) -> Result<(f64, f64), ValidationError> {
        let profile = self.evaluate(resolver, station)?;
        let left = profile.iter().map(|p| -p.offset).fold(0.0, f64::max);
        let right = profile.iter().map(|p| p.offset).fold(0.0, f64::max);
        Ok((left, right))
    }
}

impl TryFrom<Vec<Component>> for Assembly {
    type Error = ValidationError;

    fn try_from(components: Vec<Component>) -> Result<Self, Self::Error> {
        Self::from_components(components)
    }
}

impl From<Assembly> for Vec<Component> {
    fn from(assembly: Assembly) -> Self {
        assembly.components
    }
}
