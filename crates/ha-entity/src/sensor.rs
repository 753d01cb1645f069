//! Sensor entity domain
//!
//! Types shared by every integration that publishes measurements: device
//! classes, state classes, units and the description an integration uses to
//! declare a kind of sensor.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DOMAIN: &str = "sensor";

/// Units of measurement
pub mod units {
    pub const TEMP_FAHRENHEIT: &str = "°F";
    pub const TEMP_CELSIUS: &str = "°C";
    pub const PERCENTAGE: &str = "%";
    pub const CONCENTRATION_PARTS_PER_MILLION: &str = "ppm";
    pub const CONCENTRATION_MICROGRAMS_PER_CUBIC_METER: &str = "µg/m³";
}

/// What a sensor measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorDeviceClass {
    Aqi,
    Battery,
    CarbonDioxide,
    CarbonMonoxide,
    Humidity,
    Illuminance,
    Pressure,
    Temperature,
    VolatileOrganicCompounds,
}

impl SensorDeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aqi => "aqi",
            Self::Battery => "battery",
            Self::CarbonDioxide => "carbon_dioxide",
            Self::CarbonMonoxide => "carbon_monoxide",
            Self::Humidity => "humidity",
            Self::Illuminance => "illuminance",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::VolatileOrganicCompounds => "volatile_organic_compounds",
        }
    }
}

impl fmt::Display for SensorDeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How values of a sensor aggregate over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStateClass {
    /// Instantaneous reading
    Measurement,
    Total,
    TotalIncreasing,
}

impl SensorStateClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
            Self::Total => "total",
            Self::TotalIncreasing => "total_increasing",
        }
    }
}

/// Static description of one kind of sensor
#[derive(Debug, Clone, PartialEq)]
pub struct SensorEntityDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub native_unit_of_measurement: Option<&'static str>,
    pub device_class: Option<SensorDeviceClass>,
    pub state_class: Option<SensorStateClass>,
}

impl SensorEntityDescription {
    /// Attributes every sensor built from this description reports
    pub fn state_attributes(&self) -> HashMap<String, serde_json::Value> {
        let mut attributes = HashMap::new();
        if let Some(unit) = self.native_unit_of_measurement {
            attributes.insert("unit_of_measurement".to_string(), json!(unit));
        }
        if let Some(state_class) = self.state_class {
            attributes.insert("state_class".to_string(), json!(state_class.as_str()));
        }
        attributes
    }
}

/// Value a sensor reports in its native unit
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NativeValue {
    /// Convert a JSON scalar; `null`, arrays and objects have no native value
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Int(i)),
                None => n.as_f64().map(Self::Float),
            },
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            // Floats always keep a decimal, 72.0 stays "72.0"
            Self::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_value_rendering() {
        assert_eq!(NativeValue::Float(72.5).to_string(), "72.5");
        assert_eq!(NativeValue::Float(72.0).to_string(), "72.0");
        assert_eq!(NativeValue::Int(45).to_string(), "45");
        assert_eq!(NativeValue::Text("good".into()).to_string(), "good");
    }

    #[test]
    fn test_native_value_from_json() {
        assert_eq!(NativeValue::from_json(&json!(725)), Some(NativeValue::Int(725)));
        assert_eq!(NativeValue::from_json(&json!(1.5)), Some(NativeValue::Float(1.5)));
        assert_eq!(
            NativeValue::from_json(&json!("440")),
            Some(NativeValue::Text("440".into()))
        );
        assert_eq!(NativeValue::from_json(&json!(null)), None);
        assert_eq!(NativeValue::Text(" 725 ".into()).as_f64(), Some(725.0));
    }

    #[test]
    fn test_description_state_attributes() {
        let description = SensorEntityDescription {
            key: "humidity",
            name: "Humidity",
            native_unit_of_measurement: Some(units::PERCENTAGE),
            device_class: Some(SensorDeviceClass::Humidity),
            state_class: Some(SensorStateClass::Measurement),
        };
        let attributes = description.state_attributes();
        assert_eq!(attributes["unit_of_measurement"], json!("%"));
        assert_eq!(attributes["state_class"], json!("measurement"));

        let no_unit = SensorEntityDescription {
            native_unit_of_measurement: None,
            state_class: None,
            ..description
        };
        assert!(no_unit.state_attributes().is_empty());
    }
}
