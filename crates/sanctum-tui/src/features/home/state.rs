//! Home screen state: profile header and the data tabs.

use sanctum_core::models::{CraftedItem, EntityRecord, Prediction, SystemEvent, UserProfile};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HomeTab {
    #[default]
    Entities,
    Crafted,
    Predictions,
    Events,
}

impl HomeTab {
    pub const ALL: [HomeTab; 4] = [
        HomeTab::Entities,
        HomeTab::Crafted,
        HomeTab::Predictions,
        HomeTab::Events,
    ];

    pub fn index(self) -> usize {
        match self {
            HomeTab::Entities => 0,
            HomeTab::Crafted => 1,
            HomeTab::Predictions => 2,
            HomeTab::Events => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            HomeTab::Entities => "Entities",
            HomeTab::Crafted => "Crafted",
            HomeTab::Predictions => "Predictions",
            HomeTab::Events => "Events",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Rows fetched for one tab.
#[derive(Debug, Clone)]
pub enum TabRows {
    Entities(Vec<EntityRecord>),
    Crafted(Vec<CraftedItem>),
    Predictions(Vec<Prediction>),
    Events(Vec<SystemEvent>),
}

#[derive(Debug, Clone)]
pub struct TabContent<T> {
    pub rows: Vec<T>,
    pub selected: usize,
    pub loaded: bool,
    pub error: Option<String>,
}

impl<T> Default for TabContent<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            selected: 0,
            loaded: false,
            error: None,
        }
    }
}

impl<T> TabContent<T> {
    pub fn replace(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.loaded = true;
        self.error = None;
        self.clamp();
    }

    pub fn fail(&mut self, message: String) {
        self.loaded = true;
        self.error = Some(message);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_row(&self) -> Option<&T> {
        self.rows.get(self.selected)
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }
}

/// One-line message under the tab body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Prompt(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(text) | Status::Prompt(text) | Status::Error(text) => text,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub tab: HomeTab,
    pub profile: Option<UserProfile>,
    pub profile_error: Option<String>,
    pub entities: TabContent<EntityRecord>,
    pub crafted: TabContent<CraftedItem>,
    pub predictions: TabContent<Prediction>,
    pub events: TabContent<SystemEvent>,
    /// Crafted item awaiting a `y` to confirm deletion.
    pub pending_delete: Option<Uuid>,
    pub status: Option<Status>,
}

impl HomeState {
    pub fn is_loaded(&self, tab: HomeTab) -> bool {
        match tab {
            HomeTab::Entities => self.entities.loaded,
            HomeTab::Crafted => self.crafted.loaded,
            HomeTab::Predictions => self.predictions.loaded,
            HomeTab::Events => self.events.loaded,
        }
    }

    pub fn row_count(&self, tab: HomeTab) -> usize {
        match tab {
            HomeTab::Entities => self.entities.rows.len(),
            HomeTab::Crafted => self.crafted.rows.len(),
            HomeTab::Predictions => self.predictions.rows.len(),
            HomeTab::Events => self.events.rows.len(),
        }
    }

    pub fn selected(&self, tab: HomeTab) -> usize {
        match tab {
            HomeTab::Entities => self.entities.selected,
            HomeTab::Crafted => self.crafted.selected,
            HomeTab::Predictions => self.predictions.selected,
            HomeTab::Events => self.events.selected,
        }
    }

    pub fn error(&self, tab: HomeTab) -> Option<&str> {
        match tab {
            HomeTab::Entities => self.entities.error.as_deref(),
            HomeTab::Crafted => self.crafted.error.as_deref(),
            HomeTab::Predictions => self.predictions.error.as_deref(),
            HomeTab::Events => self.events.error.as_deref(),
        }
    }

    pub fn apply_rows(&mut self, rows: TabRows) {
        match rows {
            TabRows::Entities(rows) => self.entities.replace(rows),
            TabRows::Crafted(rows) => self.crafted.replace(rows),
            TabRows::Predictions(rows) => self.predictions.replace(rows),
            TabRows::Events(rows) => self.events.replace(rows),
        }
    }

    pub fn apply_error(&mut self, tab: HomeTab, message: String) {
        match tab {
            HomeTab::Entities => self.entities.fail(message),
            HomeTab::Crafted => self.crafted.fail(message),
            HomeTab::Predictions => self.predictions.fail(message),
            HomeTab::Events => self.events.fail(message),
        }
    }

    pub fn select_next(&mut self) {
        match self.tab {
            HomeTab::Entities => self.entities.select_next(),
            HomeTab::Crafted => self.crafted.select_next(),
            HomeTab::Predictions => self.predictions.select_next(),
            HomeTab::Events => self.events.select_next(),
        }
    }

    pub fn select_prev(&mut self) {
        match self.tab {
            HomeTab::Entities => self.entities.select_prev(),
            HomeTab::Crafted => self.crafted.select_prev(),
            HomeTab::Predictions => self.predictions.select_prev(),
            HomeTab::Events => self.events.select_prev(),
        }
    }

    /// Removes a deleted crafted item and keeps the selection in range.
    pub fn remove_crafted(&mut self, id: Uuid) -> Option<CraftedItem> {
        let index = self.crafted.rows.iter().position(|item| item.id == id)?;
        let item = self.crafted.rows.remove(index);
        self.crafted.clamp();
        Some(item)
    }
}
