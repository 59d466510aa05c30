//! OCIO configuration subset.
//!
//! Only the keys that change how a CDL compiles are read:
//!
//! ```yaml
//! ocio_profile_version: 1   # 1 = legacy CDL decomposition, 2 = single CDL op
//! name: show_config
//! luma: [0.2126, 0.7152, 0.0722]
//! ```
//!
//! Everything else in a full config file is ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vfx_ops::cdl::DEFAULT_LUMA;

use crate::error::{OcioError, OcioResult};

/// OCIO config version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigVersion {
    /// OCIO v1: CDLs compile to matrix and exponent ops.
    V1,
    /// OCIO v2: CDLs compile to one CDL op.
    #[default]
    V2,
}

/// Loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    name: String,
    version: ConfigVersion,
    luma: [f64; 3],
    working_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: ConfigVersion::V2,
            luma: DEFAULT_LUMA,
            working_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Creates a default v2 config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config of the given version with default luma.
    pub fn with_version(version: ConfigVersion) -> Self {
        Self { version, ..Self::default() }
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> OcioResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OcioError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let working_dir = path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::from_yaml_str(&content)?;
        config.working_dir = working_dir;
        Ok(config)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> OcioResult<Self> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> OcioResult<Self> {
        let profile = raw.ocio_profile_version.trim();
        let version = if profile.starts_with('2') {
            ConfigVersion::V2
        } else if profile.starts_with('1') {
            ConfigVersion::V1
        } else {
            return Err(OcioError::UnsupportedVersion {
                version: raw.ocio_profile_version,
            });
        };

        let luma = match raw.luma {
            None => DEFAULT_LUMA,
            Some(values) => <[f64; 3]>::try_from(values.as_slice()).map_err(|_| {
                OcioError::InvalidConfig {
                    reason: format!("luma expects 3 coefficients, got {}", values.len()),
                }
            })?,
        };

        Ok(Self {
            name: raw.name.unwrap_or_default(),
            version,
            luma,
            working_dir: PathBuf::from("."),
        })
    }

    /// Config name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Config version.
    #[inline]
    pub fn version(&self) -> ConfigVersion {
        self.version
    }

    /// Luma coefficients used by saturation.
    #[inline]
    pub fn luma(&self) -> [f64; 3] {
        self.luma
    }

    /// Directory the config was loaded from.
    #[inline]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ocio_profile_version: String,
    name: Option<String>,
    luma: Option<Vec<f64>>,
}
