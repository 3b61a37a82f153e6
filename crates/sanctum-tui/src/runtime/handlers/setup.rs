use std::pin::pin;

use futures_util::StreamExt;
use sanctum_core::config::Config;
use sanctum_core::database::DatabaseService;
use sanctum_core::setup::{COMPLETE_DELAY, STEP_INTERVAL, step_schedule};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::describe;
use crate::events::{SetupUiEvent, UiEvent};
use crate::runtime::inbox::UiEventSender;

pub async fn probe(db: DatabaseService) -> UiEvent {
    let result = db.probe().await.map_err(|err| describe(&err));
    SetupUiEvent::ProbeFinished(result).into()
}

/// Sends `StepDone` for each step as its interval elapses.
pub async fn run_steps(tx: UiEventSender, cancel: Option<CancellationToken>) -> UiEvent {
    let mut steps = pin!(step_schedule(STEP_INTERVAL, cancel.unwrap_or_default()));
    while let Some(index) = steps.next().await {
        if tx.send(SetupUiEvent::StepDone(index).into()).is_err() {
            break;
        }
    }
    SetupUiEvent::StepsFinished.into()
}

pub async fn finish_delay() -> UiEvent {
    tokio::time::sleep(COMPLETE_DELAY).await;
    SetupUiEvent::CompletionElapsed.into()
}

/// Failures are logged; the in-memory flag stays set.
pub fn persist_setup_completed() {
    if let Err(err) = Config::save_setup_completed(true) {
        warn!("Failed to persist setup_completed: {err:#}");
    }
}
