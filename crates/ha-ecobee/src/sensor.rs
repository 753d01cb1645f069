//! ecobee sensors
//!
//! One [`EcobeeSensor`] exists per (remote sensor, known capability) pair
//! found when the platform is set up. Sensors are never recreated: each poll
//! they look their remote sensor up again by name in the fresh snapshot and
//! only their cached reading changes.
//!
//! Remote sensors are matched by `name` because that is the only key the
//! payload keeps stable from the user's point of view. ecobee does not allow
//! two sensors of one thermostat to share a name; if it ever happens, both
//! entities follow the first sensor with that name.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use ha_entity::sensor::{NativeValue, DOMAIN as SENSOR_DOMAIN};
use ha_entity::{DeviceIdentifier, DeviceInfo, Entity, EntityPlatform, EntityResult};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::{self, EcobeeSensorDescription};
use crate::constants::{
    model_name, DOMAIN, ECOBEE_STATE_CALIBRATING, ECOBEE_STATE_UNKNOWN, MANUFACTURER,
    REMOTE_SENSOR_MODEL,
};
use crate::data::{EcobeeData, Thermostat};
use crate::error::{EcobeeError, EcobeeResult};

/// Raw values that mean "no reading right now"
const NO_DATA_VALUES: [&str; 2] = [ECOBEE_STATE_CALIBRATING, ECOBEE_STATE_UNKNOWN];

/// Result of refreshing one sensor
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// The sensor is reachable; `None` means it has no data right now
    Value(Option<NativeValue>),
    /// Thermostat offline, or the sensor or capability is gone
    Unavailable,
}

/// Create one sensor per known capability of every remote sensor
///
/// Capability types missing from the catalog are skipped.
pub fn materialize(data: &Arc<EcobeeData>) -> Vec<EcobeeSensor> {
    let mut sensors = Vec::new();

    for index in 0..data.thermostat_count() {
        for remote in data.remote_sensors(index) {
            for capability in &remote.capability {
                match catalog::lookup(&capability.kind) {
                    Some(description) => {
                        sensors.push(EcobeeSensor::new(data, &remote.name, index, description));
                    }
                    None => debug!(
                        "Skipping unsupported capability {} of {}",
                        capability.kind, remote.name
                    ),
                }
            }
        }
    }

    sensors
}

/// Set up ecobee sensors on a sensor platform
///
/// Every sensor is refreshed once before it is added. Returns the number of
/// entities added.
pub async fn async_setup_entry(data: &Arc<EcobeeData>, platform: &mut EntityPlatform) -> usize {
    let entities: Vec<Box<dyn Entity>> = materialize(data)
        .into_iter()
        .map(|sensor| Box::new(sensor) as Box<dyn Entity>)
        .collect();

    info!("Setting up {} ecobee sensors", entities.len());
    platform.add_entities(entities, true).await
}

/// A single capability of an ecobee remote sensor
pub struct EcobeeSensor {
    data: Weak<EcobeeData>,
    sensor_name: String,
    index: usize,
    description: &'static EcobeeSensorDescription,
    /// Owning thermostat as of the last refresh
    thermostat: Option<Thermostat>,
    /// Whether the sensor and capability were found on the last refresh
    present: bool,
    raw: Option<Value>,
}

impl EcobeeSensor {
    pub fn new(
        data: &Arc<EcobeeData>,
        sensor_name: &str,
        index: usize,
        description: &'static EcobeeSensorDescription,
    ) -> Self {
        Self {
            data: Arc::downgrade(data),
            sensor_name: sensor_name.to_string(),
            index,
            description,
            thermostat: data.thermostat(index),
            present: true,
            raw: None,
        }
    }

    pub fn sensor_name(&self) -> &str {
        &self.sensor_name
    }

    pub fn thermostat_index(&self) -> usize {
        self.index
    }

    pub fn description(&self) -> &'static EcobeeSensorDescription {
        self.description
    }

    /// Raw runtime value seen on the last successful lookup
    pub fn raw_value(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// Refresh the shared snapshot if stale and pick up this sensor's value
    ///
    /// Only a failing fetch is an error; a sensor or capability that
    /// disappeared turns the sensor unavailable.
    pub async fn refresh(&mut self) -> EcobeeResult<Reading> {
        let data = self.data.upgrade().ok_or(EcobeeError::DataSourceGone)?;
        data.update().await?;

        let Some(thermostat) = data.thermostat(self.index) else {
            self.mark_missing("thermostat");
            self.thermostat = None;
            return Ok(Reading::Unavailable);
        };

        let found = thermostat
            .remote_sensor(&self.sensor_name)
            .and_then(|sensor| sensor.capability(self.description.key()))
            .is_some();

        if found {
            self.present = true;
            self.raw = thermostat.runtime.field(self.description.runtime_key).cloned();
        } else {
            self.mark_missing("sensor");
        }
        self.thermostat = Some(thermostat);

        if self.available() {
            Ok(Reading::Value(self.native_value()))
        } else {
            Ok(Reading::Unavailable)
        }
    }

    /// Current value in the sensor's native unit, `None` when there is no data
    pub fn native_value(&self) -> Option<NativeValue> {
        self.raw
            .as_ref()
            .and_then(|raw| normalize(raw, self.description))
    }

    fn mark_missing(&mut self, what: &str) {
        if self.present {
            debug!(
                "{} of {} {} is gone, marking unavailable",
                what, self.sensor_name, self.description.entity.name
            );
        }
        self.present = false;
    }

    fn device_class_str(&self) -> &'static str {
        self.description
            .entity
            .device_class
            .map(|c| c.as_str())
            .unwrap_or("none")
    }
}

/// Turn a raw runtime value into a native value
///
/// Sentinel strings mean no data. Temperatures are sent as tenths of a
/// degree.
fn normalize(raw: &Value, description: &EcobeeSensorDescription) -> Option<NativeValue> {
    if let Value::String(s) = raw {
        if NO_DATA_VALUES.contains(&s.as_str()) {
            return None;
        }
    }

    let value = NativeValue::from_json(raw)?;
    if !description.is_temperature() {
        return Some(value);
    }

    match value.as_f64() {
        Some(tenths) => Some(NativeValue::Float(tenths / 10.0)),
        None => {
            warn!("Unexpected temperature value from ecobee: {}", raw);
            None
        }
    }
}

#[async_trait]
impl Entity for EcobeeSensor {
    fn domain(&self) -> &'static str {
        SENSOR_DOMAIN
    }

    fn unique_id(&self) -> Option<String> {
        let data = self.data.upgrade()?;
        let thermostat = data.thermostat(self.index)?;
        let sensor = thermostat.remote_sensor(&self.sensor_name)?;

        Some(match &sensor.code {
            Some(code) => format!("{}-{}", code, self.device_class_str()),
            None => format!(
                "{}-{}-{}",
                thermostat.identifier,
                sensor.id,
                self.device_class_str()
            ),
        })
    }

    fn name(&self) -> Option<String> {
        Some(format!("{} {}", self.sensor_name, self.description.entity.name))
    }

    fn device_class(&self) -> Option<String> {
        self.description
            .entity
            .device_class
            .map(|c| c.as_str().to_string())
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        let data = self.data.upgrade()?;
        let thermostat = data.thermostat(self.index)?;
        let sensor = thermostat.remote_sensor(&self.sensor_name)?;

        let (identifier, model) = match &sensor.code {
            Some(code) => (code.clone(), REMOTE_SENSOR_MODEL.to_string()),
            None => {
                // Unknown thermostat models get no device
                let name = model_name(&thermostat.model_number)?;
                (thermostat.identifier.clone(), format!("{} Thermostat", name))
            }
        };

        Some(DeviceInfo {
            identifiers: vec![DeviceIdentifier::new(DOMAIN, identifier)],
            manufacturer: Some(MANUFACTURER.to_string()),
            model: Some(model),
            name: Some(self.sensor_name.clone()),
        })
    }

    fn available(&self) -> bool {
        self.present
            && self
                .thermostat
                .as_ref()
                .map(|t| t.runtime.connected)
                .unwrap_or(false)
    }

    fn state(&self) -> Option<String> {
        self.native_value().map(|v| v.to_string())
    }

    fn state_attributes(&self) -> HashMap<String, Value> {
        self.description.entity.state_attributes()
    }

    async fn update(&mut self) -> EntityResult<()> {
        self.refresh().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn description(key: &str) -> &'static EcobeeSensorDescription {
        catalog::lookup(key).unwrap()
    }

    #[test]
    fn test_normalize_temperature_tenths() {
        let temperature = description("temperature");
        assert_eq!(normalize(&json!(725), temperature), Some(NativeValue::Float(72.5)));
        assert_eq!(normalize(&json!("700"), temperature), Some(NativeValue::Float(70.0)));
        assert_eq!(normalize(&json!(-50), temperature), Some(NativeValue::Float(-5.0)));
    }

    #[test]
    fn test_normalize_sentinels_are_no_data() {
        for key in ["temperature", "humidity", "co2PPM", "vocPPM", "airQuality"] {
            let description = description(key);
            assert_eq!(normalize(&json!("unknown"), description), None);
            assert_eq!(normalize(&json!(ECOBEE_STATE_CALIBRATING), description), None);
            assert_eq!(normalize(&json!(null), description), None);
        }
    }

    #[test]
    fn test_normalize_passes_other_classes_through() {
        assert_eq!(
            normalize(&json!(41), description("humidity")),
            Some(NativeValue::Int(41))
        );
        assert_eq!(
            normalize(&json!("612"), description("co2PPM")),
            Some(NativeValue::Text("612".into()))
        );
        assert_eq!(
            normalize(&json!(3.5), description("airQuality")),
            Some(NativeValue::Float(3.5))
        );
    }

    #[test]
    fn test_normalize_garbage_temperature_is_no_data() {
        assert_eq!(normalize(&json!("warm"), description("temperature")), None);
    }
}
