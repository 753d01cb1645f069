//! Home Assistant entity framework
//!
//! This crate provides the pieces an integration needs to publish entities:
//! - the [`Entity`] trait and its device metadata
//! - the `sensor` and `binary_sensor` entity domains
//! - [`EntityPlatform`], which names, validates, polls and writes entities
//!   into the state machine

pub mod binary_sensor;
mod entity;
mod platform;
pub mod sensor;

pub use entity::{DeviceIdentifier, DeviceInfo, Entity, EntityCategory, EntityError, EntityResult};
pub use platform::{EntityPlatform, PollSummary, Rejection};
