//! ecobee configuration
//!
//! Parses the `ecobee:` section of a YAML configuration file:
//!
//! ```yaml
//! ecobee:
//!   api_key: "your-application-key"
//!   snapshot_file: ecobee.json
//!   scan_interval: 60
//!   min_time_between_updates: 180
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};

/// Settings for one ecobee account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcobeeConfig {
    /// Application key handed to the API client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Thermostat payload read by the file-backed client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_file: Option<PathBuf>,

    /// Seconds between two poll cycles
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    /// Seconds a fetched snapshot stays fresh
    #[serde(default = "default_min_time_between_updates")]
    pub min_time_between_updates: u64,
}

fn default_scan_interval() -> u64 {
    30
}

fn default_min_time_between_updates() -> u64 {
    180
}

impl Default for EcobeeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            snapshot_file: None,
            scan_interval: default_scan_interval(),
            min_time_between_updates: default_min_time_between_updates(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    ecobee: Option<EcobeeConfig>,
}

impl EcobeeConfig {
    /// Load and validate the `ecobee:` section of a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading ecobee config from {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content, path)?;

        // Relative snapshot paths are relative to the config file
        if let Some(file) = config.snapshot_file.take() {
            config.snapshot_file = Some(match path.parent() {
                Some(dir) if file.is_relative() => dir.join(file),
                _ => file,
            });
        }
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, Path::new("<string>"))
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        let file: ConfigFile =
            serde_yaml::from_str(content).map_err(|source| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })?;
        let config = file.ecobee.ok_or_else(|| ConfigError::MissingSection {
            path: path.to_path_buf(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.scan_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scan_interval".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.min_time_between_updates == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_time_between_updates".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.scan_interval >= self.min_time_between_updates {
            warn!(
                "scan_interval ({}s) is not shorter than min_time_between_updates ({}s), \
                 every poll cycle will fetch from ecobee",
                self.scan_interval, self.min_time_between_updates
            );
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }

    pub fn min_time_between_updates(&self) -> Duration {
        Duration::from_secs(self.min_time_between_updates)
    }
}
