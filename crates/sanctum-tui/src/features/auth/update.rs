//! Auth feature reducer.
//!
//! Handles form editing, submission, sign-up notices and sign-out results.
//! The signed-in user only ever arrives through `AuthUiEvent::Authenticated`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sanctum_core::auth_flow::{AuthError, AuthOutcome};
use sanctum_core::validation::{AuthMode, FormField, validate};

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::AuthUiEvent;
use crate::home;
use crate::state::{AppState, Screen};

/// Switches to the auth screen and starts restoring a stored session.
pub fn begin_restore(app: &mut AppState) -> Vec<UiEffect> {
    app.screen = Screen::Auth;
    app.auth.restoring = true;
    let task = app.task_seq.next_id();
    vec![UiEffect::RestoreSession { task }]
}

pub fn is_busy(app: &AppState) -> bool {
    app.auth.restoring || app.tasks.state(TaskKind::Submit).is_running()
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if is_busy(app) {
        return vec![];
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('t') if ctrl => {
            app.auth.toggle_mode();
            vec![]
        }
        KeyCode::Tab | KeyCode::Down => {
            app.auth.focus_next();
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.auth.focus_prev();
            vec![]
        }
        KeyCode::Enter => submit(app),
        KeyCode::Esc => {
            app.auth.clear_messages();
            vec![]
        }
        KeyCode::Backspace => {
            let focus = app.auth.focus;
            app.auth.value_mut(focus).pop();
            clear_field_error(app, focus);
            vec![]
        }
        KeyCode::Char(c) if !ctrl => {
            let focus = app.auth.focus;
            app.auth.value_mut(focus).push(c);
            clear_field_error(app, focus);
            vec![]
        }
        _ => vec![],
    }
}

/// Inserts pasted text into the focused field (first line only).
pub fn handle_paste(app: &mut AppState, text: &str) {
    if is_busy(app) {
        return;
    }
    let line = text.lines().next().unwrap_or_default();
    let focus = app.auth.focus;
    app.auth.value_mut(focus).push_str(line);
    clear_field_error(app, focus);
}

fn clear_field_error(app: &mut AppState, field: FormField) {
    if app.auth.error_for(field).is_some() {
        app.auth.field_error = None;
    }
}

fn submit(app: &mut AppState) -> Vec<UiEffect> {
    let mode = app.auth.mode;
    if let Err(err) = validate(mode, &app.auth.form) {
        app.auth.show_validation(err);
        return vec![];
    }

    app.auth.clear_messages();
    app.auth.return_pending = false;
    let task = app.task_seq.next_id();
    vec![UiEffect::SubmitAuth {
        task,
        mode,
        form: app.auth.form.clone(),
    }]
}

pub fn handle_event(app: &mut AppState, event: AuthUiEvent) -> Vec<UiEffect> {
    match event {
        AuthUiEvent::Authenticated(user) => {
            app.auth.restoring = false;
            app.auth.clear_passwords();
            app.user = Some(user);
            home::enter(app)
        }
        AuthUiEvent::Restored(result) => {
            app.auth.restoring = false;
            if let Err(message) = result {
                app.auth.error = Some(message);
            }
            vec![]
        }
        AuthUiEvent::Submitted(result) => handle_submitted(app, result),
        AuthUiEvent::ReturnToLogin => {
            if app.auth.return_pending {
                let notice = app.auth.notice.take();
                app.auth.set_mode(AuthMode::Login);
                app.auth.notice = notice;
                app.auth.clear_passwords();
                app.auth.focus = FormField::Password;
            }
            vec![]
        }
        AuthUiEvent::SignedOut(result) => {
            match result {
                Ok(()) => {
                    app.user = None;
                    app.home = home::HomeState::default();
                    app.tasks.clear_home();
                    app.auth.set_mode(AuthMode::Login);
                    app.auth.clear_passwords();
                    app.auth.focus = FormField::Email;
                    app.screen = Screen::Auth;
                }
                Err(err) => {
                    app.home.status = Some(home::Status::Error(err.to_string()));
                }
            }
            vec![]
        }
    }
}

fn handle_submitted(app: &mut AppState, result: Result<AuthOutcome, AuthError>) -> Vec<UiEffect> {
    match result {
        Ok(AuthOutcome::SignedIn(_)) => {
            // Navigation already happened on `Authenticated`.
            app.auth.clear_passwords();
            vec![]
        }
        Ok(AuthOutcome::SignedUp(outcome)) => {
            app.auth.notice = Some(outcome.notice);
            app.auth.return_pending = true;
            vec![UiEffect::ScheduleReturnToLogin {
                delay: outcome.return_to_login_after,
            }]
        }
        Err(AuthError::Validation(err)) => {
            app.auth.show_validation(err);
            vec![]
        }
        Err(err @ AuthError::Service(_)) => {
            app.auth.error = Some(err.to_string());
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sanctum_core::auth_flow::SignUpOutcome;
    use sanctum_core::backend::Endpoint;
    use sanctum_core::config::Config;
    use sanctum_core::models::AccessLevel;
    use sanctum_core::session::AuthUser;
    use uuid::Uuid;

    use super::*;
    use crate::common::TaskStarted;

    fn app() -> AppState {
        let mut app = AppState::new(Config::default(), Endpoint::new("http://localhost", "anon"));
        app.screen = Screen::Auth;
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c)));
        }
    }

    fn fill_signup(app: &mut AppState, password: &str, confirm: &str) {
        app.auth.set_mode(AuthMode::Signup);
        app.auth.form.email = "neo@x.com".to_string();
        app.auth.form.username = "Neo".to_string();
        app.auth.form.password = password.to_string();
        app.auth.form.confirm_password = confirm.to_string();
    }

    #[test]
    fn test_typing_fills_focused_field() {
        let mut app = app();
        type_text(&mut app, "a@b.co");
        handle_key(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "pw");
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.auth.form.email, "a@b.co");
        assert_eq!(app.auth.form.password, "p");
    }

    #[test]
    fn test_invalid_submit_shows_inline_error_without_effects() {
        let mut app = app();
        app.auth.form.email = "user@test.com".to_string();

        let effects = handle_key(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(app.auth.focus, FormField::Password);
        assert!(app.auth.error_for(FormField::Password).is_some());
    }

    #[test]
    fn test_mismatch_reported_on_confirm_field() {
        let mut app = app();
        fill_signup(&mut app, "secret1", "secret2");

        let effects = handle_key(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(
            app.auth.error_for(FormField::ConfirmPassword).map(str::to_lowercase),
            Some("passphrases do not harmonize".to_string())
        );
    }

    #[test]
    fn test_valid_submit_emits_effect() {
        let mut app = app();
        fill_signup(&mut app, "secret1", "secret1");

        let effects = handle_key(&mut app, key(KeyCode::Enter));

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SubmitAuth {
                mode: AuthMode::Signup,
                ..
            }]
        ));
    }

    #[test]
    fn test_keys_ignored_while_submitting() {
        let mut app = app();
        let id = app.task_seq.next_id();
        app.tasks
            .state_mut(TaskKind::Submit)
            .on_started(&TaskStarted { id, cancel: None });
        type_text(&mut app, "x");
        assert!(app.auth.form.email.is_empty());
    }

    #[test]
    fn test_signup_returns_to_login_with_passwords_cleared() {
        let mut app = app();
        fill_signup(&mut app, "secret1", "secret1");

        let effects = handle_event(
            &mut app,
            AuthUiEvent::Submitted(Ok(AuthOutcome::SignedUp(SignUpOutcome {
                notice: "Check your email".to_string(),
                return_to_login_after: Duration::from_secs(3),
            }))),
        );
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::ScheduleReturnToLogin { delay }] if *delay == Duration::from_secs(3)
        ));
        assert!(app.user.is_none());
        assert_eq!(app.auth.mode, AuthMode::Signup);

        handle_event(&mut app, AuthUiEvent::ReturnToLogin);

        assert_eq!(app.auth.mode, AuthMode::Login);
        assert!(app.auth.form.password.is_empty());
        assert!(app.auth.form.confirm_password.is_empty());
        assert_eq!(app.auth.form.email, "neo@x.com");
        assert_eq!(app.auth.notice.as_deref(), Some("Check your email"));
        assert_eq!(app.screen, Screen::Auth);
    }

    #[test]
    fn test_stale_return_to_login_ignored() {
        let mut app = app();
        app.auth.set_mode(AuthMode::Signup);
        app.auth.form.password = "keep".to_string();
        handle_event(&mut app, AuthUiEvent::ReturnToLogin);
        assert_eq!(app.auth.mode, AuthMode::Signup);
        assert_eq!(app.auth.form.password, "keep");
    }

    #[test]
    fn test_service_error_shown_with_marker() {
        let mut app = app();
        handle_event(
            &mut app,
            AuthUiEvent::Submitted(Err(AuthError::Service("Invalid login credentials".into()))),
        );
        assert_eq!(
            app.auth.error.as_deref(),
            Some("[FAULT] Invalid login credentials")
        );
    }

    #[test]
    fn test_authenticated_enters_home_and_loads() {
        let mut app = app();
        app.auth.form.password = "secret".to_string();
        let effects = handle_event(
            &mut app,
            AuthUiEvent::Authenticated(AuthUser {
                id: Uuid::nil(),
                username: "abc".to_string(),
                email: "abc@x.com".to_string(),
                access_level: AccessLevel::Guest,
                authenticated: true,
            }),
        );

        assert_eq!(app.screen, Screen::Home);
        assert!(app.auth.form.password.is_empty());
        assert!(effects.iter().any(|e| matches!(e, UiEffect::LoadProfile { .. })));
        assert!(effects.iter().any(|e| matches!(e, UiEffect::LoadTab { .. })));
    }
}
