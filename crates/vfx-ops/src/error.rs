//! Error types for color operations.

use thiserror::Error;
use vfx_lut::LutError;

/// Error type for color operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Pixel buffer has the wrong shape.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The inverse of an op does not exist.
    #[error("non-invertible: {0}")]
    NonInvertible(String),

    /// Parameters need a newer format version.
    #[error("version mismatch: {0}")]
    VersionMismatch(String),

    /// Parameter validation or file error from the format layer.
    #[error(transparent)]
    Lut(#[from] LutError),
}

/// Result type for color operations.
pub type OpsResult<T> = Result<T, OpsError>;
