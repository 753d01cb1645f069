//! Error types for the ecobee integration

use std::path::PathBuf;

use ha_entity::EntityError;
use thiserror::Error;

pub type EcobeeResult<T> = Result<T, EcobeeError>;

/// Errors talking to the ecobee data source
#[derive(Debug, Error)]
pub enum EcobeeError {
    /// The client could not fetch thermostats
    #[error("failed to fetch thermostats: {0}")]
    Fetch(String),

    /// The thermostat payload did not match the ecobee schema
    #[error("invalid thermostat payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shared data source was dropped by its owner
    #[error("ecobee data source has been shut down")]
    DataSourceGone,
}

impl From<EcobeeError> for EntityError {
    fn from(err: EcobeeError) -> Self {
        match err {
            EcobeeError::DataSourceGone => {
                EntityError::DataSourceGone(crate::constants::DOMAIN.to_string())
            }
            other => EntityError::UpdateFailed(other.to_string()),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading the ecobee configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no 'ecobee:' section in {path}")]
    MissingSection { path: PathBuf },

    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
