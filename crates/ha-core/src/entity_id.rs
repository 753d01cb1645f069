//! Entity ID type representing a domain.object_id pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for invalid entity IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityIdError {
    #[error("entity_id must contain exactly one '.' separator")]
    InvalidFormat,

    #[error("domain cannot be empty")]
    EmptyDomain,

    #[error("object_id cannot be empty")]
    EmptyObjectId,

    #[error("domain '{0}' must be lowercase alphanumeric with single underscores")]
    InvalidDomainChars(String),

    #[error("object_id '{0}' must be lowercase alphanumeric with underscores")]
    InvalidObjectIdChars(String),
}

/// Represents a Home Assistant entity ID (e.g., "sensor.living_room_temperature")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    domain: String,
    object_id: String,
}

impl EntityId {
    /// Create a new EntityId from domain and object_id parts
    pub fn new(
        domain: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Result<Self, EntityIdError> {
        let domain = domain.into();
        let object_id = object_id.into();

        if domain.is_empty() {
            return Err(EntityIdError::EmptyDomain);
        }
        if object_id.is_empty() {
            return Err(EntityIdError::EmptyObjectId);
        }
        if domain.contains("__") || !is_slug(&domain) {
            return Err(EntityIdError::InvalidDomainChars(domain));
        }
        if !is_slug(&object_id) {
            return Err(EntityIdError::InvalidObjectIdChars(object_id));
        }

        Ok(Self { domain, object_id })
    }

    /// Build an entity id from a human readable name, e.g.
    /// `("sensor", "Living Room Temperature")` -> `sensor.living_room_temperature`
    pub fn from_name(domain: impl Into<String>, name: &str) -> Result<Self, EntityIdError> {
        Self::new(domain, slugify(name))
    }

    /// Same id with `_<n>` appended to the object_id
    pub fn with_suffix(&self, n: usize) -> Self {
        Self {
            domain: self.domain.clone(),
            object_id: format!("{}_{}", self.object_id, n),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }
}

/// Lowercase alphanumerics and underscores, not starting or ending with `_`
fn is_slug(s: &str) -> bool {
    !s.starts_with('_')
        && !s.ends_with('_')
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Turn arbitrary text into a valid object_id
///
/// Runs of anything that is not an ASCII letter or digit collapse into a
/// single underscore. Text with nothing usable slugifies to "unknown".
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    if slug.is_empty() {
        crate::STATE_UNKNOWN.to_string()
    } else {
        slug
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((domain, object_id)) if !object_id.contains('.') => Self::new(domain, object_id),
            _ => Err(EntityIdError::InvalidFormat),
        }
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: EntityId = "sensor.hallway_temperature".parse().unwrap();
        assert_eq!(id.domain(), "sensor");
        assert_eq!(id.object_id(), "hallway_temperature");
        assert_eq!(id.to_string(), "sensor.hallway_temperature");
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(
            "sensor".parse::<EntityId>(),
            Err(EntityIdError::InvalidFormat)
        );
        assert_eq!(
            "a.b.c".parse::<EntityId>(),
            Err(EntityIdError::InvalidFormat)
        );
        assert_eq!(EntityId::new("", "x"), Err(EntityIdError::EmptyDomain));
        assert_eq!(EntityId::new("sensor", ""), Err(EntityIdError::EmptyObjectId));
        assert!(matches!(
            EntityId::new("Sensor", "x"),
            Err(EntityIdError::InvalidDomainChars(_))
        ));
        assert!(matches!(
            EntityId::new("binary__sensor", "x"),
            Err(EntityIdError::InvalidDomainChars(_))
        ));
        assert!(matches!(
            EntityId::new("sensor", "_x"),
            Err(EntityIdError::InvalidObjectIdChars(_))
        ));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Living Room Temperature"), "living_room_temperature");
        assert_eq!(slugify("  Den -- CO2 "), "den_co2");
        assert_eq!(slugify("Air Quality Index"), "air_quality_index");
        assert_eq!(slugify("Temp °F"), "temp_f");
        assert_eq!(slugify("***"), "unknown");
    }

    #[test]
    fn test_from_name_and_suffix() {
        let id = EntityId::from_name("sensor", "Bedroom Humidity").unwrap();
        assert_eq!(id.to_string(), "sensor.bedroom_humidity");
        assert_eq!(id.with_suffix(2).to_string(), "sensor.bedroom_humidity_2");
    }

    #[test]
    fn test_serde_as_string() {
        let id = EntityId::new("binary_sensor", "door").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"binary_sensor.door\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
