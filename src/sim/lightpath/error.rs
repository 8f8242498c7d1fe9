use thiserror::Error;

use crate::sim::materials::{IndexCurveError, Region};

/// Errors returned by light path calculations.
///
/// Total internal reflection and non-convergence are not errors:
/// they are reported through flags on the result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("no light path has been computed for this result")]
    PathNotComputed,

    #[error("invalid detector geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid refractive index curve for {region}: {reason}")]
    InvalidIndexCurve {
        region: Region,
        reason: IndexCurveError,
    },
}
