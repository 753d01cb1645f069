//! Test helpers for the ecobee integration
//!
//! A mock client whose thermostats can be swapped between polls, and
//! builders for thermostat payloads.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ha_ecobee::data::{Capability, Runtime};
use ha_ecobee::{EcobeeClient, EcobeeData, EcobeeError, EcobeeResult, RemoteSensor, Thermostat};
use serde_json::{json, Value};

/// Client returning whatever thermostats the test last set
#[derive(Default)]
pub struct MockEcobeeClient {
    thermostats: Mutex<Vec<Thermostat>>,
    fail: AtomicBool,
    calls: AtomicUsize,
    fetch_delay: Mutex<Duration>,
}

impl MockEcobeeClient {
    pub fn new(thermostats: Vec<Thermostat>) -> Arc<Self> {
        Arc::new(Self {
            thermostats: Mutex::new(thermostats),
            ..Default::default()
        })
    }

    /// Replace the payload served by the next fetch
    pub fn set_thermostats(&self, thermostats: Vec<Thermostat>) {
        *self.thermostats.lock().unwrap() = thermostats;
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make every fetch take this long
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EcobeeClient for MockEcobeeClient {
    async fn fetch_thermostats(&self) -> EcobeeResult<Vec<Thermostat>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(EcobeeError::Fetch("connection reset".to_string()));
        }
        Ok(self.thermostats.lock().unwrap().clone())
    }
}

/// Data source that refetches on every update, already loaded once
pub async fn loaded_data(client: &Arc<MockEcobeeClient>) -> Arc<EcobeeData> {
    let data = Arc::new(EcobeeData::new(client.clone(), Duration::ZERO));
    data.update().await.unwrap();
    data
}

pub fn capability(kind: &str, value: &str) -> Capability {
    Capability {
        id: None,
        kind: kind.to_string(),
        value: value.to_string(),
    }
}

/// Wireless room sensor (has a pairing code)
pub fn room_sensor(id: &str, name: &str, code: &str, capabilities: &[&str]) -> RemoteSensor {
    RemoteSensor {
        id: id.to_string(),
        name: name.to_string(),
        sensor_type: Some("ecobee3_remote_sensor".to_string()),
        code: Some(code.to_string()),
        capability: capabilities.iter().map(|kind| capability(kind, "0")).collect(),
    }
}

/// The thermostat's built-in sensor (no pairing code)
pub fn builtin_sensor(id: &str, name: &str, capabilities: &[&str]) -> RemoteSensor {
    RemoteSensor {
        id: id.to_string(),
        name: name.to_string(),
        sensor_type: Some("thermostat".to_string()),
        code: None,
        capability: capabilities.iter().map(|kind| capability(kind, "0")).collect(),
    }
}

pub fn thermostat(
    identifier: &str,
    model_number: &str,
    connected: bool,
    runtime: Value,
    remote_sensors: Vec<RemoteSensor>,
) -> Thermostat {
    let fields = match runtime {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    Thermostat {
        identifier: identifier.to_string(),
        name: format!("Thermostat {}", identifier),
        model_number: model_number.to_string(),
        runtime: Runtime { connected, fields },
        remote_sensors,
    }
}

/// Runtime block with every field the catalog reads
pub fn full_runtime() -> Value {
    json!({
        "actualTemperature": 725,
        "actualHumidity": 41,
        "actualCO2": 612,
        "actualVOC": 180,
        "actualAQScore": 23,
    })
}

/// One connected ecobee3 with its built-in sensor and a bedroom room sensor
pub fn default_thermostats() -> Vec<Thermostat> {
    vec![thermostat(
        "TH1",
        "athenaSmart",
        true,
        full_runtime(),
        vec![
            builtin_sensor("ei:0", "Living Room", &["temperature", "humidity", "occupancy"]),
            room_sensor("rs:100", "Bedroom", "RS:100", &["temperature", "occupancy"]),
        ],
    )]
}
