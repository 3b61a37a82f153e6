//! UI event types.
//!
//! Everything the reducer reacts to: terminal input, frame ticks, task
//! lifecycle notifications, and results sent back by effect handlers.

use crossterm::event::Event;
use sanctum_core::auth_flow::{AuthError, AuthOutcome};
use sanctum_core::models::UserProfile;
use sanctum_core::session::AuthUser;
use uuid::Uuid;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};
use crate::home::{HomeTab, TabRows};

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick (spinner animation, render cadence).
    Tick,
    /// Current terminal size, sent before other events each loop iteration.
    Frame { width: u16, height: u16 },
    Terminal(Event),

    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    Setup(SetupUiEvent),
    Auth(AuthUiEvent),
    Home(HomeUiEvent),
}

#[derive(Debug)]
pub enum SetupUiEvent {
    /// Probe result; the error text is for the log only.
    ProbeFinished(Result<(), String>),
    /// Step `n` finished its interval.
    StepDone(usize),
    /// The step schedule ended (all steps done or cancelled).
    StepsFinished,
    /// The pause after `Connected` elapsed.
    CompletionElapsed,
}

#[derive(Debug)]
pub enum AuthUiEvent {
    /// Sent by the auth flow's callback after sign-in or restore.
    Authenticated(AuthUser),
    /// Startup restore finished; `None` means show the form.
    Restored(Result<Option<AuthUser>, String>),
    Submitted(Result<AuthOutcome, AuthError>),
    /// The post-signup notice delay elapsed.
    ReturnToLogin,
    SignedOut(Result<(), AuthError>),
}

#[derive(Debug)]
pub enum HomeUiEvent {
    ProfileLoaded(Result<UserProfile, String>),
    TabLoaded {
        tab: HomeTab,
        result: Result<TabRows, String>,
    },
    CraftedItemDeleted(Result<Uuid, String>),
}

impl From<SetupUiEvent> for UiEvent {
    fn from(event: SetupUiEvent) -> Self {
        UiEvent::Setup(event)
    }
}

impl From<AuthUiEvent> for UiEvent {
    fn from(event: AuthUiEvent) -> Self {
        UiEvent::Auth(event)
    }
}

impl From<HomeUiEvent> for UiEvent {
    fn from(event: HomeUiEvent) -> Self {
        UiEvent::Home(event)
    }
}
