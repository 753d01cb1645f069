//! Constants for the ecobee integration

pub const DOMAIN: &str = "ecobee";
pub const MANUFACTURER: &str = "ecobee";

/// Capability value reported while a sensor calibrates after power-up
pub const ECOBEE_STATE_CALIBRATING: &str = "calibrating";
/// Capability value reported when the thermostat has no reading
pub const ECOBEE_STATE_UNKNOWN: &str = "unknown";

/// Model reported for remote sensors (the ones with a vendor code)
pub const REMOTE_SENSOR_MODEL: &str = "ecobee Room Sensor";

/// Thermostat `modelNumber` to marketing name
const ECOBEE_MODEL_TO_NAME: &[(&str, &str)] = &[
    ("idtSmart", "ecobee Smart"),
    ("idtEms", "ecobee Smart EMS"),
    ("siSmart", "ecobee Si Smart"),
    ("siEms", "ecobee Si EMS"),
    ("athenaSmart", "ecobee3 Smart"),
    ("athenaEms", "ecobee3 EMS"),
    ("corSmart", "Carrier/Bryant Cor"),
    ("nikeSmart", "ecobee3 lite Smart"),
    ("nikeEms", "ecobee3 lite EMS"),
    ("apolloSmart", "ecobee4 Smart"),
    ("vulcanSmart", "ecobee4 Smart"),
    ("aresSmart", "ecobee Smart Premium"),
    ("artemisSmart", "ecobee Smart Enhanced"),
];

/// Marketing name for a thermostat model number
pub fn model_name(model_number: &str) -> Option<&'static str> {
    ECOBEE_MODEL_TO_NAME
        .iter()
        .find(|(number, _)| *number == model_number)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name() {
        assert_eq!(model_name("athenaSmart"), Some("ecobee3 Smart"));
        assert_eq!(model_name("nikeSmart"), Some("ecobee3 lite Smart"));
        assert_eq!(model_name("prototypeX"), None);
    }
}
