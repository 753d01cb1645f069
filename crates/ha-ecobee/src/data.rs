//! Shared ecobee data source
//!
//! [`EcobeeData`] owns the latest thermostat snapshot for one account. The
//! snapshot is an immutable value that is swapped wholesale on every fetch,
//! so everything reading it between two fetches sees the same data.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

use crate::error::EcobeeResult;

/// Default staleness window of the snapshot
pub const DEFAULT_MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(180);

/// A thermostat as returned by the ecobee `thermostat` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thermostat {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model_number: String,
    pub runtime: Runtime,
    #[serde(default)]
    pub remote_sensors: Vec<RemoteSensor>,
}

impl Thermostat {
    /// First remote sensor with this name
    pub fn remote_sensor(&self, name: &str) -> Option<&RemoteSensor> {
        self.remote_sensors.iter().find(|s| s.name == name)
    }
}

/// Live telemetry block of a thermostat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    #[serde(default)]
    pub connected: bool,
    /// Every other runtime field, by its ecobee name
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl Runtime {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// A sensor attached to a thermostat, including the thermostat's own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSensor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,
    /// Pairing code, only present on wireless room sensors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub capability: Vec<Capability>,
}

impl RemoteSensor {
    pub fn capability(&self, kind: &str) -> Option<&Capability> {
        self.capability.iter().find(|c| c.kind == kind)
    }
}

/// One measurable quantity a sensor declares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

/// Body of a `thermostat` endpoint response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatResponse {
    #[serde(default)]
    pub thermostat_list: Vec<Thermostat>,
}

impl ThermostatResponse {
    pub fn from_json(json: &str) -> EcobeeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Anything that can fetch the thermostats of an ecobee account
#[async_trait]
pub trait EcobeeClient: Send + Sync {
    async fn fetch_thermostats(&self) -> EcobeeResult<Vec<Thermostat>>;
}

/// Shared thermostat snapshot for one ecobee account
///
/// The host owns this behind an `Arc`; entities keep a `Weak` to it.
pub struct EcobeeData {
    client: Arc<dyn EcobeeClient>,
    snapshot: RwLock<Arc<Vec<Thermostat>>>,
    /// Start time of the last successful fetch. Held across the fetch so
    /// that concurrent callers wait for one fetch instead of starting their
    /// own.
    last_update: Mutex<Option<Instant>>,
    min_time_between_updates: Duration,
}

impl EcobeeData {
    /// Create a data source with an empty snapshot
    pub fn new(client: Arc<dyn EcobeeClient>, min_time_between_updates: Duration) -> Self {
        Self {
            client,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            last_update: Mutex::new(None),
            min_time_between_updates,
        }
    }

    /// Fetch a new snapshot unless the current one is still fresh
    ///
    /// Returns whether a fetch happened. The window is measured from the
    /// start of the fetch, so a caller polling exactly once per window
    /// fetches every time. A failed fetch leaves the previous snapshot in
    /// place and is retried on the next call.
    #[instrument(skip(self))]
    pub async fn update(&self) -> EcobeeResult<bool> {
        let mut last_update = self.last_update.lock().await;

        if let Some(at) = *last_update {
            if at.elapsed() < self.min_time_between_updates {
                trace!("Snapshot still fresh, skipping fetch");
                return Ok(false);
            }
        }

        let started = Instant::now();
        let thermostats = match self.client.fetch_thermostats().await {
            Ok(thermostats) => thermostats,
            Err(err) => {
                warn!("Error updating ecobee thermostats: {}", err);
                return Err(err);
            }
        };

        debug!(thermostats = thermostats.len(), "Fetched ecobee thermostats");
        *self.write_snapshot() = Arc::new(thermostats);
        *last_update = Some(started);
        Ok(true)
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<Vec<Thermostat>> {
        self.read_snapshot().clone()
    }

    pub fn thermostat_count(&self) -> usize {
        self.read_snapshot().len()
    }

    pub fn thermostat(&self, index: usize) -> Option<Thermostat> {
        self.read_snapshot().get(index).cloned()
    }

    /// Remote sensors of a thermostat, empty if the index is out of range
    pub fn remote_sensors(&self, index: usize) -> Vec<RemoteSensor> {
        self.read_snapshot()
            .get(index)
            .map(|t| t.remote_sensors.clone())
            .unwrap_or_default()
    }

    pub fn min_time_between_updates(&self) -> Duration {
        self.min_time_between_updates
    }

    // The guarded value is only ever replaced whole, so a poisoned lock
    // still holds a consistent snapshot.
    fn read_snapshot(&self) -> RwLockReadGuard<'_, Arc<Vec<Thermostat>>> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_snapshot(&self) -> RwLockWriteGuard<'_, Arc<Vec<Thermostat>>> {
        self.snapshot.write().unwrap_or_else(|e| e.into_inner())
    }
}
