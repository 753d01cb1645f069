//! File-backed ecobee client
//!
//! Serves thermostats from a saved `thermostat` endpoint response. The file
//! is read again on every fetch, so editing it between polls is picked up.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ha_ecobee::data::ThermostatResponse;
use ha_ecobee::{EcobeeClient, EcobeeError, EcobeeResult, Thermostat};
use tracing::debug;

pub struct SnapshotClient {
    path: PathBuf,
}

impl SnapshotClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EcobeeClient for SnapshotClient {
    async fn fetch_thermostats(&self) -> EcobeeResult<Vec<Thermostat>> {
        debug!("Reading thermostat snapshot from {:?}", self.path);
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| EcobeeError::ReadFile {
                path: self.path.clone(),
                source,
            })?;
        Ok(ThermostatResponse::from_json(&body)?.thermostat_list)
    }
}
