//! Error types for configuration loading and the plugin lifecycle

use crate::host::HostStatus;
use keyaxis_device::DeviceError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating an axis table
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Axis index {0} out of range (0-{max})", max = crate::config::AXIS_COUNT - 1)]
    IndexOutOfRange(usize),

    #[error("Axis {index}: {reason}")]
    InvalidAxis { index: usize, reason: String },
}

/// Errors that abort plugin initialisation
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Unsupported input API version {major}.{minor}")]
    UnsupportedApi { major: u32, minor: u32 },

    #[error("Analog device initialisation failed: {0}")]
    Device(#[from] DeviceError),

    #[error("Unable to register device: {0}")]
    Registration(HostStatus),
}

impl PluginError {
    /// Status code reported to the host for this failure
    pub fn status(&self) -> HostStatus {
        match self {
            PluginError::UnsupportedApi { .. } => HostStatus::Unsupported,
            PluginError::Device(_) | PluginError::Registration(_) => HostStatus::GenericError,
        }
    }
}
