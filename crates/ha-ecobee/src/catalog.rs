//! Capabilities the integration turns into sensors
//!
//! Each entry pairs the sensor description with the `runtime` field of the
//! thermostat that carries the live value, since the poll payload does not
//! use the capability type as its field name. Adding an entry here is all it
//! takes for the setup pass to create sensors for a new capability type.

use ha_entity::sensor::{units, SensorDeviceClass, SensorEntityDescription, SensorStateClass};

/// A capability type the integration knows how to read
#[derive(Debug, Clone, PartialEq)]
pub struct EcobeeSensorDescription {
    pub entity: SensorEntityDescription,
    /// Field of the thermostat runtime block holding the value
    pub runtime_key: &'static str,
}

impl EcobeeSensorDescription {
    /// Capability type string, e.g. "co2PPM"
    pub fn key(&self) -> &'static str {
        self.entity.key
    }

    /// Temperatures arrive in tenths of a degree
    pub fn is_temperature(&self) -> bool {
        self.entity.device_class == Some(SensorDeviceClass::Temperature)
    }
}

pub static SENSOR_TYPES: [EcobeeSensorDescription; 5] = [
    EcobeeSensorDescription {
        entity: SensorEntityDescription {
            key: "temperature",
            name: "Temperature",
            native_unit_of_measurement: Some(units::TEMP_FAHRENHEIT),
            device_class: Some(SensorDeviceClass::Temperature),
            state_class: Some(SensorStateClass::Measurement),
        },
        runtime_key: "actualTemperature",
    },
    EcobeeSensorDescription {
        entity: SensorEntityDescription {
            key: "humidity",
            name: "Humidity",
            native_unit_of_measurement: Some(units::PERCENTAGE),
            device_class: Some(SensorDeviceClass::Humidity),
            state_class: Some(SensorStateClass::Measurement),
        },
        runtime_key: "actualHumidity",
    },
    EcobeeSensorDescription {
        entity: SensorEntityDescription {
            key: "co2PPM",
            name: "CO2",
            native_unit_of_measurement: Some(units::CONCENTRATION_PARTS_PER_MILLION),
            device_class: Some(SensorDeviceClass::CarbonDioxide),
            state_class: Some(SensorStateClass::Measurement),
        },
        runtime_key: "actualCO2",
    },
    EcobeeSensorDescription {
        entity: SensorEntityDescription {
            key: "vocPPM",
            name: "VOC",
            native_unit_of_measurement: Some(units::CONCENTRATION_MICROGRAMS_PER_CUBIC_METER),
            device_class: Some(SensorDeviceClass::VolatileOrganicCompounds),
            state_class: Some(SensorStateClass::Measurement),
        },
        runtime_key: "actualVOC",
    },
    EcobeeSensorDescription {
        entity: SensorEntityDescription {
            key: "airQuality",
            name: "Air Quality Index",
            native_unit_of_measurement: None,
            device_class: Some(SensorDeviceClass::Aqi),
            state_class: Some(SensorStateClass::Measurement),
        },
        runtime_key: "actualAQScore",
    },
];

/// Description for a capability type, if it is one we read
pub fn lookup(capability_type: &str) -> Option<&'static EcobeeSensorDescription> {
    SENSOR_TYPES.iter().find(|d| d.key() == capability_type)
}

pub fn descriptions() -> &'static [EcobeeSensorDescription] {
    &SENSOR_TYPES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup() {
        let co2 = lookup("co2PPM").unwrap();
        assert_eq!(co2.entity.name, "CO2");
        assert_eq!(co2.runtime_key, "actualCO2");
        assert!(!co2.is_temperature());

        assert!(lookup("temperature").unwrap().is_temperature());
        assert!(lookup("occupancy").is_none());
        // Capability types are case sensitive
        assert!(lookup("Temperature").is_none());
    }

    #[test]
    fn test_keys_and_runtime_fields_are_unique() {
        let keys: HashSet<_> = descriptions().iter().map(|d| d.key()).collect();
        let fields: HashSet<_> = descriptions().iter().map(|d| d.runtime_key).collect();
        assert_eq!(keys.len(), descriptions().len());
        assert_eq!(fields.len(), descriptions().len());
    }

    #[test]
    fn test_every_entry_is_a_measurement() {
        for description in descriptions() {
            assert_eq!(description.entity.state_class, Some(SensorStateClass::Measurement));
            assert!(description.entity.device_class.is_some());
        }
    }
}
