//! Setup screen reducer.
//!
//! The probe result decides whether the cosmetic steps run. Skipping is
//! allowed from any phase and cancels whatever is in flight.

use crossterm::event::{KeyCode, KeyEvent};
use sanctum_core::setup::{SetupOutcome, SetupPhase};

use crate::auth;
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::SetupUiEvent;
use crate::state::{AppState, Screen};

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter | KeyCode::Char('c') => connect(app),
        KeyCode::Esc | KeyCode::Char('s') => skip(app),
        KeyCode::Char('q') => vec![UiEffect::Quit],
        _ => vec![],
    }
}

fn connect(app: &mut AppState) -> Vec<UiEffect> {
    if !app.setup.connect() {
        return vec![];
    }
    let task = app.task_seq.next_id();
    vec![UiEffect::ProbeConnection { task }]
}

fn skip(app: &mut AppState) -> Vec<UiEffect> {
    let token = app.tasks.setup_steps.cancel.clone();
    app.tasks.setup_steps.clear();
    app.tasks.probe.clear();
    let outcome = app.setup.skip();

    let mut effects = vec![UiEffect::CancelTask {
        kind: TaskKind::SetupSteps,
        token,
    }];
    effects.extend(leave(app, outcome));
    effects
}

/// Hands off to the auth screen. Only a completed ritual is remembered.
fn leave(app: &mut AppState, outcome: SetupOutcome) -> Vec<UiEffect> {
    app.local_mode = outcome == SetupOutcome::Skipped;
    let mut effects = Vec::new();
    if outcome == SetupOutcome::Completed {
        app.config.setup_completed = true;
        effects.push(UiEffect::PersistSetupCompleted);
    }
    effects.extend(auth::begin_restore(app));
    effects
}

pub fn handle_event(app: &mut AppState, event: SetupUiEvent) -> Vec<UiEffect> {
    if app.screen != Screen::Setup {
        return vec![];
    }
    match event {
        SetupUiEvent::ProbeFinished(result) => {
            app.setup.probe_finished(result.map_err(anyhow::Error::msg));
            if *app.setup.phase() == SetupPhase::Step(0) {
                let task = app.task_seq.next_id();
                vec![UiEffect::RunSetupSteps { task }]
            } else {
                vec![]
            }
        }
        SetupUiEvent::StepDone(index) => {
            app.setup.advance(index);
            if app.setup.is_connected() {
                vec![UiEffect::FinishSetup]
            } else {
                vec![]
            }
        }
        SetupUiEvent::StepsFinished => vec![],
        SetupUiEvent::CompletionElapsed => match app.setup.complete() {
            Some(outcome) => leave(app, outcome),
            None => vec![],
        },
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use sanctum_core::backend::Endpoint;
    use sanctum_core::config::Config;
    use sanctum_core::setup::{PROBE_FAILURE_MESSAGE, STEPS};
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::common::TaskStarted;

    fn app() -> AppState {
        AppState::new(Config::default(), Endpoint::new("http://localhost", "anon"))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_connect_emits_probe_once() {
        let mut app = app();
        let effects = handle_key(&mut app, key(KeyCode::Enter));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::ProbeConnection { .. }]
        ));
        assert!(handle_key(&mut app, key(KeyCode::Enter)).is_empty());
    }

    #[test]
    fn test_probe_failure_shows_fixed_message() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        let effects = handle_event(
            &mut app,
            SetupUiEvent::ProbeFinished(Err("dns error: no such host".to_string())),
        );
        assert!(effects.is_empty());
        assert_eq!(app.setup.error(), Some(PROBE_FAILURE_MESSAGE));
    }

    #[test]
    fn test_full_ritual_reaches_auth() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        let effects = handle_event(&mut app, SetupUiEvent::ProbeFinished(Ok(())));
        assert!(matches!(effects.as_slice(), [UiEffect::RunSetupSteps { .. }]));

        let last_step = STEPS.len() - 1;
        for index in 0..last_step {
            assert!(handle_event(&mut app, SetupUiEvent::StepDone(index)).is_empty());
        }
        let last = handle_event(&mut app, SetupUiEvent::StepDone(last_step));
        assert!(matches!(last.as_slice(), [UiEffect::FinishSetup]));
        assert_eq!(app.screen, Screen::Setup);

        let effects = handle_event(&mut app, SetupUiEvent::CompletionElapsed);
        assert_eq!(app.screen, Screen::Auth);
        assert!(!app.local_mode);
        assert!(app.config.setup_completed);
        assert!(matches!(
            effects.as_slice(),
            [
                UiEffect::PersistSetupCompleted,
                UiEffect::RestoreSession { .. }
            ]
        ));
    }

    #[test]
    fn test_skip_cancels_steps_and_enters_local_mode() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        handle_event(&mut app, SetupUiEvent::ProbeFinished(Ok(())));
        let cancel = CancellationToken::new();
        let id = app.task_seq.next_id();
        app.tasks.setup_steps.on_started(&TaskStarted {
            id,
            cancel: Some(cancel.clone()),
        });

        let effects = handle_key(&mut app, key(KeyCode::Esc));

        assert!(app.local_mode);
        assert!(!app.config.setup_completed);
        assert_eq!(app.screen, Screen::Auth);
        assert!(!app.tasks.setup_steps.is_running());
        assert!(matches!(
            effects.as_slice(),
            [
                UiEffect::CancelTask {
                    kind: TaskKind::SetupSteps,
                    token: Some(_)
                },
                UiEffect::RestoreSession { .. }
            ]
        ));

        // Late step ticks are ignored once setup is left.
        assert!(handle_event(&mut app, SetupUiEvent::StepDone(1)).is_empty());
        assert_eq!(app.screen, Screen::Auth);
    }
}
