//! ecobee integration
//!
//! Turns the remote sensors reported by ecobee thermostats into sensor
//! entities. Every capability a remote sensor declares (temperature,
//! humidity, CO2, ...) that the [`catalog`] knows about becomes one entity.
//!
//! The cloud API client is not part of this crate: anything implementing
//! [`EcobeeClient`] can feed [`EcobeeData`], the snapshot shared by all
//! entities of one account.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod data;
mod error;
pub mod sensor;

pub use config::EcobeeConfig;
pub use data::{EcobeeClient, EcobeeData, RemoteSensor, Thermostat};
pub use error::{ConfigError, ConfigResult, EcobeeError, EcobeeResult};
pub use sensor::{async_setup_entry, materialize, EcobeeSensor, Reading};
