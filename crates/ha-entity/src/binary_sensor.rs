//! Binary sensor entity domain
//!
//! A binary sensor is either on or off (or unknown). Its name can be derived
//! from its device class, and it can never be a configuration entity.

use std::fmt;

use async_trait::async_trait;
use ha_core::{EntityId, STATE_OFF, STATE_ON};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityCategory, EntityError, EntityResult};

pub const DOMAIN: &str = "binary_sensor";

/// What a binary sensor detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinarySensorDeviceClass {
    Battery,
    BatteryCharging,
    CarbonMonoxide,
    Cold,
    Connectivity,
    Door,
    GarageDoor,
    Gas,
    Heat,
    Light,
    Lock,
    Moisture,
    Motion,
    Moving,
    Occupancy,
    Opening,
    Plug,
    Power,
    Presence,
    Problem,
    Running,
    Safety,
    Smoke,
    Sound,
    Tamper,
    Update,
    Vibration,
    Window,
}

impl BinarySensorDeviceClass {
    pub const ALL: [Self; 28] = [
        Self::Battery,
        Self::BatteryCharging,
        Self::CarbonMonoxide,
        Self::Cold,
        Self::Connectivity,
        Self::Door,
        Self::GarageDoor,
        Self::Gas,
        Self::Heat,
        Self::Light,
        Self::Lock,
        Self::Moisture,
        Self::Motion,
        Self::Moving,
        Self::Occupancy,
        Self::Opening,
        Self::Plug,
        Self::Power,
        Self::Presence,
        Self::Problem,
        Self::Running,
        Self::Safety,
        Self::Smoke,
        Self::Sound,
        Self::Tamper,
        Self::Update,
        Self::Vibration,
        Self::Window,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::BatteryCharging => "battery_charging",
            Self::CarbonMonoxide => "carbon_monoxide",
            Self::Cold => "cold",
            Self::Connectivity => "connectivity",
            Self::Door => "door",
            Self::GarageDoor => "garage_door",
            Self::Gas => "gas",
            Self::Heat => "heat",
            Self::Light => "light",
            Self::Lock => "lock",
            Self::Moisture => "moisture",
            Self::Motion => "motion",
            Self::Moving => "moving",
            Self::Occupancy => "occupancy",
            Self::Opening => "opening",
            Self::Plug => "plug",
            Self::Power => "power",
            Self::Presence => "presence",
            Self::Problem => "problem",
            Self::Running => "running",
            Self::Safety => "safety",
            Self::Smoke => "smoke",
            Self::Sound => "sound",
            Self::Tamper => "tamper",
            Self::Update => "update",
            Self::Vibration => "vibration",
            Self::Window => "window",
        }
    }

    /// English name used when an entity is named after its device class
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Battery => "Battery",
            Self::BatteryCharging => "Charging",
            Self::CarbonMonoxide => "Carbon monoxide",
            Self::Cold => "Cold",
            Self::Connectivity => "Connectivity",
            Self::Door => "Door",
            Self::GarageDoor => "Garage door",
            Self::Gas => "Gas",
            Self::Heat => "Heat",
            Self::Light => "Light",
            Self::Lock => "Lock",
            Self::Moisture => "Moisture",
            Self::Motion => "Motion",
            Self::Moving => "Moving",
            Self::Occupancy => "Occupancy",
            Self::Opening => "Opening",
            Self::Plug => "Plug",
            Self::Power => "Power",
            Self::Presence => "Presence",
            Self::Problem => "Problem",
            Self::Running => "Running",
            Self::Safety => "Safety",
            Self::Smoke => "Smoke",
            Self::Sound => "Sound",
            Self::Tamper => "Tamper",
            Self::Update => "Update",
            Self::Vibration => "Vibration",
            Self::Window => "Window",
        }
    }
}

impl fmt::Display for BinarySensorDeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a binary sensor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySensorEntityDescription {
    pub key: String,
    pub device_class: Option<BinarySensorDeviceClass>,
    pub entity_category: Option<EntityCategory>,
    pub has_entity_name: bool,
    pub name: Option<String>,
    pub icon: Option<String>,
}

impl BinarySensorEntityDescription {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            device_class: None,
            entity_category: None,
            has_entity_name: false,
            name: None,
            icon: None,
        }
    }

    pub fn with_device_class(mut self, device_class: BinarySensorDeviceClass) -> Self {
        self.device_class = Some(device_class);
        self
    }

    pub fn with_entity_category(mut self, category: EntityCategory) -> Self {
        self.entity_category = Some(category);
        self
    }

    pub fn with_has_entity_name(mut self, has_entity_name: bool) -> Self {
        self.has_entity_name = has_entity_name;
        self
    }
}

/// A binary sensor
///
/// Attributes set directly on the entity win over the description.
#[derive(Debug, Clone, Default)]
pub struct BinarySensorEntity {
    pub description: Option<BinarySensorEntityDescription>,
    pub entity_id: Option<EntityId>,
    pub unique_id: Option<String>,
    pub attr_name: Option<String>,
    pub attr_device_class: Option<BinarySensorDeviceClass>,
    pub attr_has_entity_name: Option<bool>,
    pub attr_icon: Option<String>,
    pub is_on: Option<bool>,
}

impl BinarySensorEntity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity_id(mut self, entity_id: EntityId) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_description(mut self, description: BinarySensorEntityDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_device_class(mut self, device_class: BinarySensorDeviceClass) -> Self {
        self.attr_device_class = Some(device_class);
        self
    }

    pub fn with_has_entity_name(mut self, has_entity_name: bool) -> Self {
        self.attr_has_entity_name = Some(has_entity_name);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.attr_icon = Some(icon.into());
        self
    }

    pub fn turn_on(&mut self) {
        self.is_on = Some(true);
    }

    pub fn turn_off(&mut self) {
        self.is_on = Some(false);
    }

    /// Effective device class
    pub fn binary_device_class(&self) -> Option<BinarySensorDeviceClass> {
        self.attr_device_class
            .or_else(|| self.description.as_ref().and_then(|d| d.device_class))
    }
}

#[async_trait]
impl Entity for BinarySensorEntity {
    fn domain(&self) -> &'static str {
        DOMAIN
    }

    fn entity_id(&self) -> Option<EntityId> {
        self.entity_id.clone()
    }

    fn unique_id(&self) -> Option<String> {
        self.unique_id.clone()
    }

    fn name(&self) -> Option<String> {
        if let Some(name) = &self.attr_name {
            return Some(name.clone());
        }
        if let Some(name) = self.description.as_ref().and_then(|d| d.name.clone()) {
            return Some(name);
        }
        // Unnamed entities only borrow the device class name when they are
        // named relative to their device
        if self.has_entity_name() {
            return self
                .binary_device_class()
                .map(|class| class.display_name().to_string());
        }
        None
    }

    fn has_entity_name(&self) -> bool {
        self.attr_has_entity_name
            .or_else(|| self.description.as_ref().map(|d| d.has_entity_name))
            .unwrap_or(false)
    }

    fn device_class(&self) -> Option<String> {
        self.binary_device_class().map(|c| c.as_str().to_string())
    }

    fn entity_category(&self) -> Option<EntityCategory> {
        self.description.as_ref().and_then(|d| d.entity_category)
    }

    fn icon(&self) -> Option<String> {
        self.attr_icon
            .clone()
            .or_else(|| self.description.as_ref().and_then(|d| d.icon.clone()))
    }

    fn state(&self) -> Option<String> {
        self.is_on.map(|on| {
            let state = if on { STATE_ON } else { STATE_OFF };
            state.to_string()
        })
    }

    fn validate(&self) -> EntityResult<()> {
        if self.entity_category() == Some(EntityCategory::Config) {
            return Err(EntityError::Invalid(
                "the entity category is set to config".to_string(),
            ));
        }
        Ok(())
    }

    fn should_poll(&self) -> bool {
        false
    }
}
