//! First-run connection ritual.
//!
//! `Idle → Connecting → Step(0..=5) → Connected`. The probe decides whether
//! the steps run at all; the steps themselves are cosmetic and paced by
//! `step_schedule`.

use std::time::Duration;

use anyhow::Result;
use futures_util::Stream;
use futures_util::stream;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Step labels, in order.
pub const STEPS: [&str; 6] = [
    "Opening uplink",
    "Verifying anon key",
    "Mapping chambers",
    "Indexing entities",
    "Calibrating resonance",
    "Unsealing the archive",
];

pub const STEP_INTERVAL: Duration = Duration::from_millis(800);

/// Pause on `Connected` before handing control back.
pub const COMPLETE_DELAY: Duration = Duration::from_millis(1500);

pub const PROBE_FAILURE_MESSAGE: &str =
    "Unable to reach the sanctum. Check your connection and try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupPhase {
    Idle { error: Option<String> },
    Connecting,
    Step(usize),
    Connected,
}

impl Default for SetupPhase {
    fn default() -> Self {
        SetupPhase::Idle { error: None }
    }
}

/// How the setup screen was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Completed,
    /// Bypassed; the app runs without a verified connection.
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupFlow {
    phase: SetupPhase,
}

impl SetupFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SetupPhase {
        &self.phase
    }

    /// Starts connecting. Returns false (and does nothing) unless idle.
    pub fn connect(&mut self) -> bool {
        if matches!(self.phase, SetupPhase::Idle { .. }) {
            self.phase = SetupPhase::Connecting;
            true
        } else {
            false
        }
    }

    /// Applies the probe result. Ignored unless connecting.
    pub fn probe_finished(&mut self, result: Result<()>) {
        if self.phase != SetupPhase::Connecting {
            return;
        }
        self.phase = match result {
            Ok(()) => SetupPhase::Step(0),
            Err(err) => {
                warn!("Connectivity probe failed: {err:#}");
                SetupPhase::Idle {
                    error: Some(PROBE_FAILURE_MESSAGE.to_string()),
                }
            }
        };
    }

    /// Marks step `completed` as done. Stale indices are ignored.
    pub fn advance(&mut self, completed: usize) {
        if self.phase != SetupPhase::Step(completed) {
            return;
        }
        self.phase = if completed + 1 < STEPS.len() {
            SetupPhase::Step(completed + 1)
        } else {
            SetupPhase::Connected
        };
    }

    /// Leaves setup without connecting, from any phase.
    pub fn skip(&mut self) -> SetupOutcome {
        self.phase = SetupPhase::default();
        SetupOutcome::Skipped
    }

    /// Hands control back once the pause on `Connected` has elapsed.
    pub fn complete(&self) -> Option<SetupOutcome> {
        self.is_connected().then_some(SetupOutcome::Completed)
    }

    pub fn is_connected(&self) -> bool {
        self.phase == SetupPhase::Connected
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            SetupPhase::Idle { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Label of the active step, if steps are running.
    pub fn current_step(&self) -> Option<&'static str> {
        match self.phase {
            SetupPhase::Step(index) => STEPS.get(index).copied(),
            _ => None,
        }
    }
}

/// Yields `0..STEPS.len()`, one index per `interval`, each meaning "this step
/// is done". Ends early once `cancel` fires.
pub fn step_schedule(interval: Duration, cancel: CancellationToken) -> impl Stream<Item = usize> {
    stream::unfold(0usize, move |index| {
        let cancel = cancel.clone();
        async move {
            if index >= STEPS.len() {
                return None;
            }
            tokio::select! {
                () = cancel.cancelled() => None,
                () = tokio::time::sleep(interval) => Some((index, index + 1)),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_only_from_idle() {
        let mut flow = SetupFlow::new();
        assert!(flow.connect());
        assert!(!flow.connect());
        assert_eq!(flow.phase(), &SetupPhase::Connecting);
    }

    #[test]
    fn test_probe_failure_returns_to_idle_with_message() {
        let mut flow = SetupFlow::new();
        flow.connect();
        flow.probe_finished(Err(anyhow::anyhow!("connection refused")));
        assert_eq!(flow.error(), Some(PROBE_FAILURE_MESSAGE));
        assert!(flow.connect());
    }

    #[test]
    fn test_steps_then_connected() {
        let mut flow = SetupFlow::new();
        flow.connect();
        flow.probe_finished(Ok(()));
        for (i, step) in STEPS.iter().enumerate() {
            assert_eq!(flow.current_step(), Some(*step));
            assert_eq!(flow.complete(), None);
            flow.advance(i);
        }
        assert!(flow.is_connected());
        assert_eq!(flow.complete(), Some(SetupOutcome::Completed));
    }

    #[test]
    fn test_stale_advance_ignored() {
        let mut flow = SetupFlow::new();
        flow.connect();
        flow.probe_finished(Ok(()));
        flow.advance(3);
        assert_eq!(flow.phase(), &SetupPhase::Step(0));
    }

    #[test]
    fn test_probe_result_ignored_when_not_connecting() {
        let mut flow = SetupFlow::new();
        flow.probe_finished(Ok(()));
        assert_eq!(flow.phase(), &SetupPhase::default());
    }

    #[test]
    fn test_skip_from_any_phase() {
        let mut flow = SetupFlow::new();
        flow.connect();
        assert_eq!(flow.skip(), SetupOutcome::Skipped);
        assert_eq!(flow.phase(), &SetupPhase::default());
    }
}
