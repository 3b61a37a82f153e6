//! Connectivity probe.

use anyhow::Result;
use sanctum_core::config::Config;
use sanctum_core::interrupt;
use sanctum_core::setup::PROBE_FAILURE_MESSAGE;
use tracing::warn;

use super::services;

pub async fn run(config: &Config) -> Result<()> {
    let (_, db) = services(config);
    let url = config.endpoint().url;

    match interrupt::interruptible(db.probe()).await {
        Ok(()) => {
            println!("Sanctum reachable at {url}");
            Ok(())
        }
        Err(err) if err.downcast_ref::<interrupt::InterruptedError>().is_some() => Err(err),
        Err(err) => {
            warn!("Connectivity probe failed: {err:#}");
            anyhow::bail!(PROBE_FAILURE_MESSAGE)
        }
    }
}
