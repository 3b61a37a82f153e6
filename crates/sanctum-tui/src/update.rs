//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, Screen};
use crate::{auth, home, setup};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.terminal_size = (width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            app.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                vec![]
            }
        }
        UiEvent::Setup(event) => setup::handle_event(app, event),
        UiEvent::Auth(event) => auth::handle_event(app, event),
        UiEvent::Home(event) => {
            if app.screen == Screen::Home {
                home::handle_event(app, event)
            } else {
                vec![]
            }
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return vec![];
            }
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return vec![UiEffect::Quit];
            }
            match app.screen {
                Screen::Setup => setup::handle_key(app, key),
                Screen::Auth => auth::handle_key(app, key),
                Screen::Home => home::handle_key(app, key),
            }
        }
        Event::Paste(text) => {
            if app.screen == Screen::Auth {
                auth::handle_paste(app, &text);
            }
            vec![]
        }
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEvent;
    use sanctum_core::auth_flow::AuthError;
    use sanctum_core::backend::Endpoint;
    use sanctum_core::config::Config;

    use super::*;
    use crate::common::{TaskCompleted, TaskKind, TaskStarted};
    use crate::events::{AuthUiEvent, SetupUiEvent};

    fn app() -> AppState {
        AppState::new(Config::default(), Endpoint::new("http://localhost", "anon"))
    }

    #[test]
    fn test_ctrl_c_quits_from_any_screen() {
        let mut app = app();
        let effects = update(
            &mut app,
            UiEvent::Terminal(Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            ))),
        );
        assert!(matches!(effects.as_slice(), [UiEffect::Quit]));
    }

    #[test]
    fn test_stale_task_result_dropped() {
        let mut app = app();
        app.screen = Screen::Auth;
        let old = app.task_seq.next_id();
        let current = app.task_seq.next_id();
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::SignOut,
                started: TaskStarted {
                    id: current,
                    cancel: None,
                },
            },
        );

        update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::SignOut,
                completed: TaskCompleted {
                    id: old,
                    result: Box::new(
                        AuthUiEvent::SignedOut(Err(AuthError::Service("late".into()))).into(),
                    ),
                },
            },
        );
        assert!(app.home.status.is_none());
        assert!(app.tasks.state(TaskKind::SignOut).is_running());
    }

    #[test]
    fn test_completed_task_result_is_applied() {
        let mut app = app();
        update(&mut app, UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        ))));
        let id = app.task_seq.next_id();
        update(
            &mut app,
            UiEvent::TaskStarted {
                kind: TaskKind::Probe,
                started: TaskStarted { id, cancel: None },
            },
        );
        let effects = update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::Probe,
                completed: TaskCompleted {
                    id,
                    result: Box::new(SetupUiEvent::ProbeFinished(Ok(())).into()),
                },
            },
        );
        assert!(matches!(effects.as_slice(), [UiEffect::RunSetupSteps { .. }]));
        assert!(!app.tasks.state(TaskKind::Probe).is_running());
    }

    #[test]
    fn test_tick_advances_spinner() {
        let mut app = app();
        update(&mut app, UiEvent::Tick);
        update(&mut app, UiEvent::Tick);
        assert_eq!(app.spinner_frame, 2);
    }
}
