//! The Entity trait and the metadata an entity reports about itself

use std::collections::HashMap;

use async_trait::async_trait;
use ha_core::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by entities
#[derive(Debug, Error)]
pub enum EntityError {
    /// The entity refuses to be added (message is the reason)
    #[error("{0}")]
    Invalid(String),

    /// The entity's backing data could not be refreshed
    #[error("update failed: {0}")]
    UpdateFailed(String),

    /// The shared data source is gone (platform torn down)
    #[error("data source for {0} is no longer available")]
    DataSourceGone(String),
}

pub type EntityResult<T> = Result<T, EntityError>;

/// Entity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    /// Configuration entity
    Config,
    /// Diagnostic entity
    Diagnostic,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Diagnostic => "diagnostic",
        }
    }
}

/// A device identifier (integration domain, id) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentifier(pub String, pub String);

impl DeviceIdentifier {
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Self {
        Self(domain.into(), id.into())
    }

    pub fn domain(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> &str {
        &self.1
    }
}

/// Device an entity belongs to, used to group entities in the device registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub identifiers: Vec<DeviceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An entity as seen by an [`EntityPlatform`](crate::EntityPlatform)
///
/// Only `domain` and `state` are required. Everything else has the default a
/// bare Home Assistant entity has: no name, no unique id, always available,
/// polled, nothing to update.
#[async_trait]
pub trait Entity: Send + Sync {
    /// Entity domain this entity publishes into (e.g. "sensor")
    fn domain(&self) -> &'static str;

    /// Entity id requested by the integration, if any
    fn entity_id(&self) -> Option<EntityId> {
        None
    }

    /// Stable identifier for the registry. May be unresolvable for a while.
    fn unique_id(&self) -> Option<String> {
        None
    }

    fn name(&self) -> Option<String> {
        None
    }

    /// Whether `name` is relative to the device name
    fn has_entity_name(&self) -> bool {
        false
    }

    fn device_class(&self) -> Option<String> {
        None
    }

    fn device_info(&self) -> Option<DeviceInfo> {
        None
    }

    fn entity_category(&self) -> Option<EntityCategory> {
        None
    }

    fn icon(&self) -> Option<String> {
        None
    }

    fn available(&self) -> bool {
        true
    }

    /// Rendered state value, `None` when unknown
    fn state(&self) -> Option<String>;

    /// Domain specific attributes (unit, state class, ...)
    fn state_attributes(&self) -> HashMap<String, serde_json::Value> {
        HashMap::new()
    }

    fn should_poll(&self) -> bool {
        true
    }

    /// Checked once before the entity is added to a platform
    fn validate(&self) -> EntityResult<()> {
        Ok(())
    }

    /// Fetch the latest data for this entity
    async fn update(&mut self) -> EntityResult<()> {
        Ok(())
    }

    /// Name shown in the frontend
    ///
    /// Entities with `has_entity_name` are named relative to their device:
    /// "<device name> <entity name>", or just the device name when the
    /// entity itself has no name.
    fn friendly_name(&self) -> Option<String> {
        let name = self.name();
        if !self.has_entity_name() {
            return name;
        }
        match (self.device_info().and_then(|d| d.name), name) {
            (Some(device), Some(name)) => Some(format!("{} {}", device, name)),
            (Some(device), None) => Some(device),
            (None, name) => name,
        }
    }
}
