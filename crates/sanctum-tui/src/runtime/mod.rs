//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces
//! effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! - Handlers are async functions returning a `UiEvent`
//! - `spawn_task` wraps them in `TaskStarted`/`TaskCompleted`
//! - Everything lands in `inbox_rx`, drained once per frame
//!
//! The auth flow's callback also writes to the inbox, which is how the
//! signed-in user reaches the reducer.

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use sanctum_core::auth_flow::AuthFlow;
use sanctum_core::backend::AuthClient;
use sanctum_core::config::{Config, paths};
use sanctum_core::database::DatabaseService;
use sanctum_core::interrupt;
use sanctum_core::session::{SessionContext, SessionStore};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::{AuthUiEvent, UiEvent};
use crate::state::AppState;
use crate::{render, terminal, update};

/// Frame cadence while something is animating.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    auth: AuthFlow,
    db: DatabaseService,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Wires the session context, auth flow and data façade, then takes over
    /// the terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(config: Config) -> Result<Self> {
        let endpoint = config.endpoint();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let session = SessionContext::new();
        let store = SessionStore::new(paths::session_path());
        let callback_tx = inbox_tx.clone();
        let auth = AuthFlow::new(AuthClient::new(endpoint.clone()), session.clone(), store)
            .on_authenticated(move |user| {
                let _ = callback_tx.send(AuthUiEvent::Authenticated(user.clone()).into());
            });
        let db = DatabaseService::from_endpoint(endpoint.clone(), session);
        debug!(url = %endpoint.url, "tui runtime wired");

        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });
        interrupt::reset();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let state = AppState::new(config, endpoint);

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            auth,
            db,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until quit or Ctrl+C.
    ///
    /// # Errors
    /// Returns an error if drawing or reading terminal events fails.
    pub fn run(&mut self) -> Result<()> {
        let effects = self.state.startup_effects();
        self.execute_effects(effects);

        let mut dirty = true;
        while !self.state.should_quit {
            if interrupt::is_interrupted() {
                self.state.should_quit = true;
                break;
            }

            let mut events = self.collect_events()?;
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Renders are batched to tick cadence.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll = self.state.tasks.is_any_running()
            || self.state.auth.restoring
            || recent_terminal_activity;
        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };
        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }
        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns untracked work whose result goes straight to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    /// Spawns an async task with a uniform `TaskStarted`/`TaskCompleted`
    /// lifecycle.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, cancelable: bool, f: F)
    where
        F: FnOnce(Option<CancellationToken>) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = cancelable.then(CancellationToken::new);
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
        };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = f(cancel).await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::CancelTask { token, .. } => {
                if let Some(cancel) = token {
                    cancel.cancel();
                }
            }

            // Setup
            UiEffect::ProbeConnection { task } => {
                let db = self.db.clone();
                self.spawn_task(TaskKind::Probe, task, false, move |_| handlers::probe(db));
            }
            UiEffect::RunSetupSteps { task } => {
                let tx = self.inbox_tx.clone();
                self.spawn_task(TaskKind::SetupSteps, task, true, move |cancel| {
                    handlers::run_steps(tx, cancel)
                });
            }
            UiEffect::FinishSetup => {
                self.spawn_effect(handlers::finish_delay);
            }
            UiEffect::PersistSetupCompleted => {
                handlers::persist_setup_completed();
            }

            // Auth
            UiEffect::RestoreSession { task } => {
                let auth = self.auth.clone();
                self.spawn_task(TaskKind::Restore, task, false, move |_| {
                    handlers::restore(auth)
                });
            }
            UiEffect::SubmitAuth { task, mode, form } => {
                let auth = self.auth.clone();
                self.spawn_task(TaskKind::Submit, task, false, move |_| {
                    handlers::submit(auth, mode, form)
                });
            }
            UiEffect::ScheduleReturnToLogin { delay } => {
                self.spawn_effect(move || handlers::return_to_login(delay));
            }
            UiEffect::SignOut { task } => {
                let auth = self.auth.clone();
                self.spawn_task(TaskKind::SignOut, task, false, move |_| {
                    handlers::sign_out(auth)
                });
            }

            // Home
            UiEffect::LoadProfile { task, user_id } => {
                let db = self.db.clone();
                self.spawn_task(TaskKind::Profile, task, false, move |_| {
                    handlers::load_profile(db, user_id)
                });
            }
            UiEffect::LoadTab { task, tab, owner } => {
                let db = self.db.clone();
                let limit = self.state.list_limit();
                self.spawn_task(TaskKind::TabLoad(tab), task, false, move |_| {
                    handlers::load_tab(db, tab, owner, limit)
                });
            }
            UiEffect::DeleteCraftedItem { task, id, owner } => {
                let db = self.db.clone();
                self.spawn_task(TaskKind::Delete, task, false, move |_| {
                    handlers::delete_crafted_item(db, id, owner)
                });
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
