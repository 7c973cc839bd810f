//! Error types shared by the alignment, assembly and corridor engines.

/// Invalid setup that cannot be corrected by retrying the same call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("an alignment needs at least 2 PIs, got {count}")]
    TooFewPis { count: usize },

    #[error("a vertical alignment needs at least 2 PVIs, got {count}")]
    TooFewPvis { count: usize },

    #[error("assembly has no components")]
    EmptyAssembly,

    #[error("corridor would need {count} stations, limit is {limit}")]
    TooManyStations { count: usize, limit: usize },
}

/// The requested geometry cannot be constructed or queried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("PI {index} cannot carry a curve (only interior PIs can)")]
    InvalidPi { index: usize },

    #[error("PVI index {index} is out of range")]
    InvalidPvi { index: usize },

    #[error("curve at PI {index} needs tangent length {required:.3} but only {available:.3} is available")]
    CurveDoesNotFit {
        index: usize,
        required: f64,
        available: f64,
    },

    #[error("tangents at PI {index} are collinear, no curve can be placed")]
    CollinearTangents { index: usize },

    #[error("turn direction of curve at PI {index} disagrees with the tangent deflection")]
    TurnDirectionMismatch { index: usize },

    #[error("station {station:.3} is outside 0..={length:.3}")]
    StationOutOfRange { station: f64, length: f64 },

    #[error("vertical curve at PVI {index} of length {curve_length:.3} exceeds the available {available:.3}")]
    CurveTooLong {
        index: usize,
        curve_length: f64,
        available: f64,
    },
}

/// Input rejected before any state was changed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("station {station:.3} is duplicated or out of order")]
    DuplicateStation { station: f64 },

    #[error("PI {index} coincides with its neighbour")]
    CoincidentPi { index: usize },

    #[error("curve radius must be positive and finite, got {radius}")]
    InvalidRadius { radius: f64 },

    #[error("vertical curve length must be zero or positive, got {curve_length}")]
    NegativeCurveLength { curve_length: f64 },

    #[error("{component}.{parameter} must not be negative, got {value} at station {station:.3}")]
    NegativeDimension {
        component: String,
        parameter: String,
        value: f64,
        station: f64,
    },

    #[error("{component}.{parameter} = {value} is out of range at station {station:.3}")]
    SlopeOutOfRange {
        component: String,
        parameter: String,
        value: f64,
        station: f64,
    },

    #[error("{component} has no parameter named '{parameter}'")]
    UnknownParameter { component: String, parameter: String },

    #[error("assembly already has a component named '{name}'")]
    DuplicateComponent { name: String },

    #[error("spacing must satisfy 0 < min ({min}) <= max ({max})")]
    InvalidSpacing { min: f64, max: f64 },

    #[error("invalid constraint on {component}.{parameter}: {reason}")]
    InvalidConstraint {
        component: String,
        parameter: String,
        reason: String,
    },

    #[error("unknown constraint kind '{0}'")]
    UnknownConstraintKind(String),

    #[error("unknown interpolation '{0}'")]
    UnknownInterpolation(String),

    #[error("'{0}' is not a valid station label")]
    InvalidStationLabel(String),

    #[error("{what} must be finite")]
    NonFinite { what: &'static str },
}

/// Umbrella error returned by engine operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CorridorError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

pub type Result<T, E = CorridorError> = std::result::Result<T, E>;
