//! Core library for corridor design: alignments, cross-section assemblies
//! and station-by-station corridor generation.

pub mod alignment;
pub mod assembly;
pub mod constraint;
pub mod corridor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod io;
pub mod session;
pub mod stationing;
pub mod subassembly;
pub mod superelevation;

pub use error::{ConfigurationError, CorridorError, GeometryError, Result, ValidationError};
