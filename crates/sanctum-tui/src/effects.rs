//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! Effects that start tracked work carry the `TaskId` the reducer allocated;
//! the runtime reports `TaskStarted`/`TaskCompleted` under that id so stale
//! results can be dropped.

use std::time::Duration;

use sanctum_core::validation::{AuthForm, AuthMode};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::common::{TaskId, TaskKind};
use crate::home::HomeTab;

#[derive(Debug)]
pub enum UiEffect {
    Quit,

    /// Run the connectivity probe.
    ProbeConnection { task: TaskId },
    /// Pace the cosmetic setup steps.
    RunSetupSteps { task: TaskId },
    /// Wait out the pause on `Connected`.
    FinishSetup,
    /// Record `setup_completed = true` in the config file.
    PersistSetupCompleted,

    /// Restore a stored session.
    RestoreSession { task: TaskId },
    /// Validate and send the auth form.
    SubmitAuth {
        task: TaskId,
        mode: AuthMode,
        form: AuthForm,
    },
    /// Flip back to login mode after `delay`.
    ScheduleReturnToLogin { delay: Duration },
    SignOut { task: TaskId },

    LoadProfile { task: TaskId, user_id: Uuid },
    LoadTab {
        task: TaskId,
        tab: HomeTab,
        owner: Uuid,
    },
    DeleteCraftedItem {
        task: TaskId,
        id: Uuid,
        owner: Uuid,
    },

    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
