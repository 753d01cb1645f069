//! ecobee sensor host
//!
//! Loads the `ecobee:` configuration, sets up the ecobee sensor platform and
//! polls it until interrupted.
//!
//! Usage: `ecobee-sensors [configuration.yaml]`

mod snapshot_client;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ha_ecobee::{async_setup_entry, EcobeeConfig, EcobeeData};
use ha_entity::sensor::DOMAIN as SENSOR_DOMAIN;
use ha_entity::EntityPlatform;
use ha_state_machine::StateMachine;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::snapshot_client::SnapshotClient;

const DEFAULT_CONFIG_PATH: &str = "configuration.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = EcobeeConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    let Some(snapshot_file) = config.snapshot_file.clone() else {
        bail!("ecobee.snapshot_file is required to run without the cloud client");
    };

    info!("Starting ecobee sensors from {:?}", snapshot_file);

    let client = Arc::new(SnapshotClient::new(snapshot_file));
    debug!("Using snapshot client for {:?}", client.path());
    let data = Arc::new(EcobeeData::new(client, config.min_time_between_updates()));

    let states = Arc::new(StateMachine::new());
    let mut platform = EntityPlatform::new(
        SENSOR_DOMAIN,
        ha_ecobee::constants::DOMAIN,
        states.clone(),
    );

    let added = async_setup_entry(&data, &mut platform).await;
    info!("Added {} ecobee sensors", added);
    log_states(&states);

    let mut ticker = interval(config.scan_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick fires immediately and setup already updated everything
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = platform.poll().await;
                info!(
                    updated = summary.updated,
                    failed = summary.failed,
                    "Polled ecobee sensors"
                );
                log_states(&states);
            }
            result = tokio::signal::ctrl_c() => {
                result.context("waiting for Ctrl-C")?;
                break;
            }
        }
    }

    info!("Shutting down...");
    platform.reset();
    Ok(())
}

fn log_states(states: &StateMachine) {
    let mut current = states.domain_states(SENSOR_DOMAIN);
    current.sort_by(|a, b| a.entity_id.to_string().cmp(&b.entity_id.to_string()));
    for state in current {
        info!("{} = {}", state.entity_id, state.state);
    }
}
