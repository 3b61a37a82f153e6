//! Application state composition.
//!
//! ```text
//! AppState
//! ├── screen: Screen          (which view owns input)
//! ├── setup: SetupFlow        (first-run connection ritual)
//! ├── auth: AuthState         (login/signup form)
//! ├── home: HomeState         (profile header + data tabs)
//! ├── user: Option<AuthUser>  (set only through the auth callback event)
//! ├── task_seq / tasks        (async task ids and lifecycle)
//! └── config, local_mode, endpoint
//! ```

use sanctum_core::backend::Endpoint;
use sanctum_core::config::Config;
use sanctum_core::session::AuthUser;
use sanctum_core::setup::SetupFlow;

use crate::auth::AuthState;
use crate::common::{TaskSeq, Tasks};
use crate::effects::UiEffect;
use crate::home::HomeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Auth,
    Home,
}

pub struct AppState {
    pub should_quit: bool,
    pub screen: Screen,
    pub config: Config,
    pub endpoint: Endpoint,
    /// True after setup was skipped; the connection is unverified.
    pub local_mode: bool,
    pub setup: SetupFlow,
    pub auth: AuthState,
    pub home: HomeState,
    pub user: Option<AuthUser>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
    pub terminal_size: (u16, u16),
}

impl AppState {
    pub fn new(config: Config, endpoint: Endpoint) -> Self {
        let screen = if config.setup_completed {
            Screen::Auth
        } else {
            Screen::Setup
        };
        Self {
            should_quit: false,
            screen,
            config,
            endpoint,
            local_mode: false,
            setup: SetupFlow::new(),
            auth: AuthState::default(),
            home: HomeState::default(),
            user: None,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
            terminal_size: (0, 0),
        }
    }

    /// Effects to run before the first frame.
    pub fn startup_effects(&mut self) -> Vec<UiEffect> {
        match self.screen {
            Screen::Auth => crate::auth::begin_restore(self),
            Screen::Setup | Screen::Home => vec![],
        }
    }

    pub fn list_limit(&self) -> usize {
        self.config.ui.list_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new("http://localhost:54321", "anon")
    }

    #[test]
    fn test_first_run_starts_on_setup() {
        let mut app = AppState::new(Config::default(), endpoint());
        assert_eq!(app.screen, Screen::Setup);
        assert!(app.startup_effects().is_empty());
    }

    #[test]
    fn test_completed_setup_starts_on_auth_with_restore() {
        let config = Config {
            setup_completed: true,
            ..Config::default()
        };
        let mut app = AppState::new(config, endpoint());
        assert_eq!(app.screen, Screen::Auth);

        let effects = app.startup_effects();
        assert!(matches!(effects.as_slice(), [UiEffect::RestoreSession { .. }]));
        assert!(app.auth.restoring);
    }
}
