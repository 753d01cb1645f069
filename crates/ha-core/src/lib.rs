//! Core types for Home Assistant
//!
//! This crate provides the fundamental types shared by the entity framework
//! and integrations: EntityId and State, plus the well-known state values.

mod entity_id;
mod state;

pub use entity_id::{slugify, EntityId, EntityIdError};
pub use state::State;

/// Maximum length for a state value
pub const MAX_STATE_LENGTH: usize = 255;

/// State value for an entity whose value is not known
pub const STATE_UNKNOWN: &str = "unknown";

/// State value for an entity that cannot currently be reached
pub const STATE_UNAVAILABLE: &str = "unavailable";

pub const STATE_ON: &str = "on";
pub const STATE_OFF: &str = "off";
