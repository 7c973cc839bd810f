//! Sampling of an assembly along a 3D alignment.

use std::sync::Arc;

use log::{debug, trace};

use crate::alignment::{Alignment, HorizontalAlignmentEngine, VerticalAlignmentEngine};
use crate::assembly::{Assembly, ElevationSurface, ProfilePoint};
use crate::constraint::{ConstraintResolver, ConstraintSet};
use crate::error::{ConfigurationError, Result, ValidationError};
use crate::geometry::{Point3, Vector2};
use crate::stationing::Stationing;
use crate::subassembly::Placement;

/// Gaps below this merge into the neighbouring station.
const STATION_MERGE: f64 = 1e-6;

fn default_max_spacing() -> f64 {
    10.0
}

fn default_min_spacing() -> f64 {
    1.0
}

fn default_max_stations() -> usize {
    100_000
}

/// Sampling options for corridor generation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CorridorSettings {
    #[serde(default = "default_max_spacing")]
    pub max_spacing: f64,
    #[serde(default = "default_min_spacing")]
    pub min_spacing: f64,
    /// Hard ceiling on the number of generated stations.
    #[serde(default = "default_max_stations")]
    pub max_stations: usize,
    #[serde(default)]
    pub stationing: Stationing,
}

impl Default for CorridorSettings {
    fn default() -> Self {
        Self {
            max_spacing: default_max_spacing(),
            min_spacing: default_min_spacing(),
            max_stations: default_max_stations(),
            stationing: Stationing::default(),
        }
    }
}

impl CorridorSettings {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let ok = self.min_spacing.is_finite()
            && self.max_spacing.is_finite()
            && self.min_spacing > 0.0
            && self.min_spacing <= self.max_spacing;
        if ok {
            Ok(())
        } else {
            Err(ValidationError::InvalidSpacing {
                min: self.min_spacing,
                max: self.max_spacing,
            })
        }
    }

    /// Step length where the path has the given curvature.
    pub fn spacing_for(&self, curvature: f64) -> f64 {
        if curvature.abs() <= f64::EPSILON {
            self.max_spacing
        } else {
            (self.min_spacing / curvature.abs())
                .max(self.min_spacing)
                .min(self.max_spacing)
        }
    }
}

/// Cross-section sampled at one station of the corridor.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StationProfile {
    pub station: f64,
    /// Directrix point at the station.
    pub position: Point3,
    /// Unit plan heading at the station.
    pub direction: Vector2,
    pub profile_points: Vec<ProfilePoint>,
}

impl StationProfile {
    /// Profile points placed in world coordinates.
    pub fn world_points(&self) -> Vec<Point3> {
        let right = self.direction.right_normal();
        self.profile_points
            .iter()
            .map(|p| {
                let plan = self.position.plan().offset(right, p.offset);
                Point3::from_plan(plan, self.position.z + p.elevation)
            })
            .collect()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.profile_points.iter().map(|p| p.tag.as_str())
    }
}

/// Checks that every profile carries the same tags in the same order.
pub fn tags_consistent(profiles: &[StationProfile]) -> bool {
    match profiles.split_first() {
        Some((first, rest)) => rest.iter().all(|p| p.tags().eq(first.tags())),
        None => true,
    }
}

/// Stations at which the corridor is sampled.
///
/// Always starts at 0 and ends at the horizontal length. Steps are
/// `max_spacing` on tangents and shrink with curvature on arcs; horizontal
/// and vertical key stations are never stepped over.
pub fn station_list(
    horizontal: &HorizontalAlignmentEngine,
    vertical: &VerticalAlignmentEngine,
    settings: &CorridorSettings,
) -> Result<Vec<f64>> {
    settings.validate()?;
    let length = horizontal.total_length();
    let limit = settings.max_stations;
    // bound in f64 first, tiny spacings overflow usize
    let lower_bound = (length / settings.max_spacing).ceil() + 1.0;
    if lower_bound > limit as f64 {
        return Err(ConfigurationError::TooManyStations {
            count: lower_bound.min(usize::MAX as f64) as usize,
            limit,
        }
        .into());
    }

    let mut keys: Vec<f64> = horizontal
        .key_stations()
        .into_iter()
        .chain(vertical.key_stations())
        .filter(|s| *s > STATION_MERGE && *s < length - STATION_MERGE)
        .collect();
    keys.sort_by(f64::total_cmp);
    keys.dedup_by(|a, b| (*a - *b).abs() <= STATION_MERGE);
    keys.push(length);

    let mut stations = vec![0.0];
    let mut current = 0.0;
    let mut next_key = keys.iter().copied().peekable();
    while current < length {
        while next_key.next_if(|k| *k <= current + STATION_MERGE).is_some() {}
        let key = next_key.peek().copied().unwrap_or(length);
        let step = settings.spacing_for(horizontal.curvature_at(current)?);
        let candidate = current + step;
        current = if candidate >= key - STATION_MERGE {
            key
        } else {
            candidate
        };
        stations.push(current);
        if stations.len() > limit {
            return Err(ConfigurationError::TooManyStations {
                count: stations.len(),
                limit,
            }
            .into());
        }
    }
    Ok(stations)
}

/// Generates station profiles from a pair of alignment engines and an assembly.
#[derive(Clone, Copy, Default)]
pub struct CorridorGenerator<'a> {
    settings: CorridorSettings,
    surface: Option<&'a dyn ElevationSurface>,
}

impl<'a> CorridorGenerator<'a> {
    pub fn new(settings: CorridorSettings) -> Self {
        Self {
            settings,
            surface: None,
        }
    }

    /// Supplies existing ground for slope ties.
    pub fn with_surface(mut self, surface: &'a dyn ElevationSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn settings(&self) -> &CorridorSettings {
        &self.settings
    }

    pub fn generate(
        &self,
        horizontal: &HorizontalAlignmentEngine,
        vertical: &VerticalAlignmentEngine,
        assembly: &Assembly,
        resolver: &ConstraintResolver<'_>,
    ) -> Result<Vec<StationProfile>> {
        if assembly.is_empty() {
            return Err(ConfigurationError::EmptyAssembly.into());
        }
        let stations = station_list(horizontal, vertical, &self.settings)?;
        let mut profiles = Vec::with_capacity(stations.len());
        for station in stations {
            let at = horizontal.get_point_at_station(station)?;
            let z = vertical.get_elevation(station)?;
            let position = Point3::from_plan(at.position, z);
            let placement = self.surface.map(|surface| Placement {
                surface,
                position,
                direction: at.direction,
            });
            let profile_points =
                assembly.evaluate_placed(resolver, station, placement.as_ref())?;
            trace!(
                "station {}: {} profile points",
                self.settings.stationing.label(station),
                profile_points.len()
            );
            profiles.push(StationProfile {
                station,
                position,
                direction: at.direction,
                profile_points,
            });
        }
        debug!(
            "generated {} station profiles over {:.3}",
            profiles.len(),
            horizontal.total_length()
        );
        Ok(profiles)
    }
}

impl std::fmt::Debug for CorridorGenerator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorridorGenerator")
            .field("settings", &self.settings)
            .field("surface", &self.surface.is_some())
            .finish()
    }
}

/// Generates station profiles with explicit spacing and default limits.
pub fn generate(
    horizontal: &HorizontalAlignmentEngine,
    vertical: &VerticalAlignmentEngine,
    assembly: &Assembly,
    resolver: &ConstraintResolver<'_>,
    max_spacing: f64,
    min_spacing: f64,
) -> Result<Vec<StationProfile>> {
    let settings = CorridorSettings {
        max_spacing,
        min_spacing,
        ..CorridorSettings::default()
    };
    CorridorGenerator::new(settings).generate(horizontal, vertical, assembly, resolver)
}

/// Ground shared with a [`Corridor`].
pub type SharedSurface = Arc<dyn ElevationSurface + Send + Sync>;

/// Corridor model that rebuilds its profiles whenever an input is replaced.
///
/// Setters build the new profiles first and leave the corridor untouched
/// when generation fails.
#[derive(Clone)]
pub struct Corridor {
    alignment: Alignment,
    assembly: Assembly,
    constraints: ConstraintSet,
    settings: CorridorSettings,
    surface: Option<SharedSurface>,
    profiles: Vec<StationProfile>,
}

impl Corridor {
    /// Creates a new corridor and immediately generates its profiles.
    pub fn new(
        alignment: Alignment,
        assembly: Assembly,
        constraints: ConstraintSet,
        settings: CorridorSettings,
    ) -> Result<Self> {
        let mut corridor = Self {
            alignment,
            assembly,
            constraints,
            settings,
            surface: None,
            profiles: Vec::new(),
        };
        corridor.rebuild()?;
        Ok(corridor)
    }

    fn build(
        alignment: &Alignment,
        assembly: &Assembly,
        constraints: &ConstraintSet,
        settings: &CorridorSettings,
        surface: Option<&SharedSurface>,
    ) -> Result<Vec<StationProfile>> {
        let mut generator = CorridorGenerator::new(*settings);
        if let Some(s) = surface {
            generator = generator.with_surface(s.as_ref());
        }
        generator.generate(
            &alignment.horizontal,
            &alignment.vertical,
            assembly,
            &constraints.resolver(),
        )
    }

    /// Regenerates the profiles from the current inputs.
    pub fn rebuild(&mut self) -> Result<()> {
        self.profiles = Self::build(
            &self.alignment,
            &self.assembly,
            &self.constraints,
            &self.settings,
            self.surface.as_ref(),
        )?;
        Ok(())
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> Result<()> {
        self.profiles = Self::build(
            &alignment,
            &self.assembly,
            &self.constraints,
            &self.settings,
            self.surface.as_ref(),
        )?;
        self.alignment = alignment;
        Ok(())
    }

    pub fn set_assembly(&mut self, assembly: Assembly) -> Result<()> {
        self.profiles = Self::build(
            &self.alignment,
            &assembly,
            &self.constraints,
            &self.settings,
            self.surface.as_ref(),
        )?;
        self.assembly = assembly;
        Ok(())
    }

    pub fn set_constraints(&mut self, constraints: ConstraintSet) -> Result<()> {
        self.profiles = Self::build(
            &self.alignment,
            &self.assembly,
            &constraints,
            &self.settings,
            self.surface.as_ref(),
        )?;
        self.constraints = constraints;
        Ok(())
    }

    pub fn set_settings(&mut self, settings: CorridorSettings) -> Result<()> {
        self.profiles = Self::build(
            &self.alignment,
            &self.assembly,
            &self.constraints,
            &settings,
            self.surface.as_ref(),
        )?;
        self.settings = settings;
        Ok(())
    }

    pub fn set_surface(&mut self, surface: Option<SharedSurface>) -> Result<()> {
        self.profiles = Self::build(
            &self.alignment,
            &self.assembly,
            &self.constraints,
            &self.settings,
            surface.as_ref(),
        )?;
        self.surface = surface;
        Ok(())
    }

    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn settings(&self) -> &CorridorSettings {
        &self.settings
    }

    /// Returns the current station profiles.
    pub fn profiles(&self) -> &[StationProfile] {
        &self.profiles
    }
}

impl std::fmt::Debug for Corridor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Corridor")
            .field("alignment", &self.alignment)
            .field("assembly", &self.assembly)
            .field("constraints", &self.constraints)
            .field("settings", &self.settings)
            .field("surface", &self.surface.is_some())
            .field("profiles", &self.profiles.len())
            .finish()
    }
}
