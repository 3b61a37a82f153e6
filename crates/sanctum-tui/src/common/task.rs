use tokio_util::sync::CancellationToken;

use crate::home::HomeTab;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Probe,
    SetupSteps,
    Restore,
    Submit,
    SignOut,
    Profile,
    TabLoad(HomeTab),
    Delete,
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        self.active = Some(started.id);
        self.cancel = started.cancel.clone();
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub probe: TaskState,
    pub setup_steps: TaskState,
    pub restore: TaskState,
    pub submit: TaskState,
    pub sign_out: TaskState,
    pub profile: TaskState,
    pub tabs: [TaskState; HomeTab::ALL.len()],
    pub delete: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Probe => &self.probe,
            TaskKind::SetupSteps => &self.setup_steps,
            TaskKind::Restore => &self.restore,
            TaskKind::Submit => &self.submit,
            TaskKind::SignOut => &self.sign_out,
            TaskKind::Profile => &self.profile,
            TaskKind::TabLoad(tab) => &self.tabs[tab.index()],
            TaskKind::Delete => &self.delete,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Probe => &mut self.probe,
            TaskKind::SetupSteps => &mut self.setup_steps,
            TaskKind::Restore => &mut self.restore,
            TaskKind::Submit => &mut self.submit,
            TaskKind::SignOut => &mut self.sign_out,
            TaskKind::Profile => &mut self.profile,
            TaskKind::TabLoad(tab) => &mut self.tabs[tab.index()],
            TaskKind::Delete => &mut self.delete,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.probe.is_running()
            || self.setup_steps.is_running()
            || self.restore.is_running()
            || self.submit.is_running()
            || self.sign_out.is_running()
            || self.profile.is_running()
            || self.tabs.iter().any(TaskState::is_running)
            || self.delete.is_running()
    }

    /// Forgets every home-screen task so late results are dropped.
    pub fn clear_home(&mut self) {
        self.profile.clear();
        self.delete.clear();
        for tab in &mut self.tabs {
            tab.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_only_matching_task() {
        let mut seq = TaskSeq::default();
        let first = seq.next_id();
        let second = seq.next_id();

        let mut state = TaskState::default();
        state.on_started(&TaskStarted {
            id: second,
            cancel: None,
        });

        assert!(!state.finish_if_active(first));
        assert!(state.is_running());
        assert!(state.finish_if_active(second));
        assert!(!state.is_running());
    }

    #[test]
    fn test_tab_states_are_independent() {
        let mut tasks = Tasks::default();
        tasks
            .state_mut(TaskKind::TabLoad(HomeTab::Events))
            .on_started(&TaskStarted {
                id: TaskId(4),
                cancel: None,
            });
        assert!(tasks.state(TaskKind::TabLoad(HomeTab::Events)).is_running());
        assert!(!tasks.state(TaskKind::TabLoad(HomeTab::Entities)).is_running());

        tasks.clear_home();
        assert!(!tasks.is_any_running());
    }
}
