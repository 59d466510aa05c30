//! Error types for config loading and CDL transforms.
//!
//! Lower-level failures from `vfx-lut` (file parsing, selection) and
//! `vfx-ops` (validation, inversion) are wrapped unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for OCIO operations.
pub type OcioResult<T> = Result<T, OcioError>;

/// Errors that can occur during OCIO operations.
#[derive(Debug, Error)]
pub enum OcioError {
    /// I/O error reading config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// Invalid config version.
    #[error("unsupported config version: {version} (supported: 1.x, 2.x)")]
    UnsupportedVersion {
        /// Version string from config.
        version: String,
    },

    /// Config value has the wrong shape.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Description of what's wrong.
        reason: String,
    },

    /// File parsing, selection or serialization error.
    #[error(transparent)]
    Lut(#[from] vfx_lut::LutError),

    /// Op construction error.
    #[error(transparent)]
    Ops(#[from] vfx_ops::OpsError),
}
