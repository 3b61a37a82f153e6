//! Home screen reducer.

use crossterm::event::{KeyCode, KeyEvent};

use super::state::{HomeState, HomeTab, Status};
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::HomeUiEvent;
use crate::state::{AppState, Screen};

/// Shows the home screen for the signed-in user and loads its data.
pub fn enter(app: &mut AppState) -> Vec<UiEffect> {
    app.screen = Screen::Home;
    app.home = HomeState::default();
    app.tasks.clear_home();

    let Some(user_id) = app.user.as_ref().map(|user| user.id) else {
        return vec![];
    };
    let task = app.task_seq.next_id();
    let mut effects = vec![UiEffect::LoadProfile { task, user_id }];
    effects.extend(load_tab(app, app.home.tab));
    effects
}

fn load_tab(app: &mut AppState, tab: HomeTab) -> Vec<UiEffect> {
    let Some(owner) = app.user.as_ref().map(|user| user.id) else {
        return vec![];
    };
    if app.tasks.state(TaskKind::TabLoad(tab)).is_running() {
        return vec![];
    }
    let task = app.task_seq.next_id();
    vec![UiEffect::LoadTab { task, tab, owner }]
}

fn switch_tab(app: &mut AppState, tab: HomeTab) -> Vec<UiEffect> {
    app.home.tab = tab;
    app.home.pending_delete = None;
    if app.home.is_loaded(tab) {
        vec![]
    } else {
        load_tab(app, tab)
    }
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if app.home.pending_delete.is_some() {
        return confirm_delete(app, key);
    }

    match key.code {
        KeyCode::Right | KeyCode::Tab => switch_tab(app, app.home.tab.next()),
        KeyCode::Left | KeyCode::BackTab => switch_tab(app, app.home.tab.prev()),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            match HomeTab::from_index(index) {
                Some(tab) => switch_tab(app, tab),
                None => vec![],
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.home.select_next();
            vec![]
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.home.select_prev();
            vec![]
        }
        KeyCode::Char('r') => {
            app.home.status = None;
            load_tab(app, app.home.tab)
        }
        KeyCode::Char('d') => arm_delete(app),
        KeyCode::Char('o') => sign_out(app),
        KeyCode::Char('q') => vec![UiEffect::Quit],
        _ => vec![],
    }
}

fn arm_delete(app: &mut AppState) -> Vec<UiEffect> {
    if app.home.tab != HomeTab::Crafted || app.tasks.state(TaskKind::Delete).is_running() {
        return vec![];
    }
    let Some(user_id) = app.user.as_ref().map(|user| user.id) else {
        return vec![];
    };
    let Some(item) = app.home.crafted.selected_row() else {
        return vec![];
    };
    if item.created_by != user_id {
        app.home.status = Some(Status::Error(
            "Only the crafter may dissolve this item.".to_string(),
        ));
        return vec![];
    }
    app.home.status = Some(Status::Prompt(format!(
        "Dissolve \"{}\"? y to confirm",
        item.name
    )));
    app.home.pending_delete = Some(item.id);
    vec![]
}

fn confirm_delete(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let pending = app.home.pending_delete.take();
    app.home.status = None;
    match (key.code, pending, app.user.as_ref()) {
        (KeyCode::Char('y' | 'Y'), Some(id), Some(user)) => {
            let owner = user.id;
            let task = app.task_seq.next_id();
            vec![UiEffect::DeleteCraftedItem { task, id, owner }]
        }
        _ => vec![],
    }
}

fn sign_out(app: &mut AppState) -> Vec<UiEffect> {
    if app.tasks.state(TaskKind::SignOut).is_running() {
        return vec![];
    }
    app.home.status = Some(Status::Info("Severing the link...".to_string()));
    let task = app.task_seq.next_id();
    vec![UiEffect::SignOut { task }]
}

pub fn handle_event(app: &mut AppState, event: HomeUiEvent) -> Vec<UiEffect> {
    match event {
        HomeUiEvent::ProfileLoaded(Ok(profile)) => {
            app.home.profile = Some(profile);
            app.home.profile_error = None;
        }
        HomeUiEvent::ProfileLoaded(Err(message)) => {
            app.home.profile_error = Some(message);
        }
        HomeUiEvent::TabLoaded {
            tab: _,
            result: Ok(rows),
        } => {
            app.home.apply_rows(rows);
        }
        HomeUiEvent::TabLoaded {
            tab,
            result: Err(message),
        } => {
            app.home.apply_error(tab, message);
        }
        HomeUiEvent::CraftedItemDeleted(Ok(id)) => {
            let text = match app.home.remove_crafted(id) {
                Some(item) => format!("Dissolved \"{}\".", item.name),
                None => "Dissolved.".to_string(),
            };
            app.home.status = Some(Status::Info(text));
        }
        HomeUiEvent::CraftedItemDeleted(Err(message)) => {
            app.home.status = Some(Status::Error(message));
        }
    }
    vec![]
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crossterm::event::KeyModifiers;
    use sanctum_core::backend::Endpoint;
    use sanctum_core::config::Config;
    use sanctum_core::models::{AccessLevel, CraftedItem};
    use sanctum_core::session::AuthUser;
    use uuid::Uuid;

    use super::*;
    use crate::home::TabRows;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn signed_in() -> AppState {
        let mut app = AppState::new(Config::default(), Endpoint::new("http://localhost", "anon"));
        app.user = Some(AuthUser {
            id: Uuid::from_u128(7),
            username: "neo".to_string(),
            email: "neo@x.com".to_string(),
            access_level: AccessLevel::Executor,
            authenticated: true,
        });
        enter(&mut app);
        app
    }

    fn item(id: u128, owner: Uuid) -> CraftedItem {
        CraftedItem {
            id: Uuid::from_u128(id),
            name: format!("relic-{id}"),
            description: None,
            components: vec![],
            power: 1.0,
            stability: 1.0,
            created_by: owner,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_enter_loads_profile_and_first_tab() {
        let mut app = signed_in();
        let effects = enter(&mut app);
        assert_eq!(app.screen, Screen::Home);
        assert!(matches!(
            effects.as_slice(),
            [
                UiEffect::LoadProfile { .. },
                UiEffect::LoadTab {
                    tab: HomeTab::Entities,
                    ..
                }
            ]
        ));
    }

    #[test]
    fn test_switching_to_unloaded_tab_loads_it_once() {
        let mut app = signed_in();
        let effects = handle_key(&mut app, key(KeyCode::Char('4')));
        assert_eq!(app.home.tab, HomeTab::Events);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadTab {
                tab: HomeTab::Events,
                ..
            }]
        ));

        handle_event(
            &mut app,
            HomeUiEvent::TabLoaded {
                tab: HomeTab::Events,
                result: Ok(TabRows::Events(vec![])),
            },
        );
        handle_key(&mut app, key(KeyCode::Left));
        let effects = handle_key(&mut app, key(KeyCode::Right));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = signed_in();
        let owner = Uuid::from_u128(7);
        handle_key(&mut app, key(KeyCode::Char('2')));
        handle_event(
            &mut app,
            HomeUiEvent::TabLoaded {
                tab: HomeTab::Crafted,
                result: Ok(TabRows::Crafted(vec![item(1, owner), item(2, owner)])),
            },
        );
        handle_key(&mut app, key(KeyCode::Down));

        assert!(handle_key(&mut app, key(KeyCode::Char('d'))).is_empty());
        assert_eq!(app.home.pending_delete, Some(Uuid::from_u128(2)));

        let effects = handle_key(&mut app, key(KeyCode::Char('y')));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::DeleteCraftedItem { id, owner: o, .. }]
                if *id == Uuid::from_u128(2) && *o == owner
        ));

        handle_event(
            &mut app,
            HomeUiEvent::CraftedItemDeleted(Ok(Uuid::from_u128(2))),
        );
        assert_eq!(app.home.crafted.rows.len(), 1);
        assert_eq!(app.home.crafted.selected, 0);
    }

    #[test]
    fn test_other_key_cancels_pending_delete() {
        let mut app = signed_in();
        handle_key(&mut app, key(KeyCode::Char('2')));
        handle_event(
            &mut app,
            HomeUiEvent::TabLoaded {
                tab: HomeTab::Crafted,
                result: Ok(TabRows::Crafted(vec![item(1, Uuid::from_u128(7))])),
            },
        );
        handle_key(&mut app, key(KeyCode::Char('d')));
        let effects = handle_key(&mut app, key(KeyCode::Char('n')));
        assert!(effects.is_empty());
        assert!(app.home.pending_delete.is_none());
        assert_eq!(app.home.crafted.rows.len(), 1);
    }

    #[test]
    fn test_foreign_item_cannot_be_armed() {
        let mut app = signed_in();
        handle_key(&mut app, key(KeyCode::Char('2')));
        handle_event(
            &mut app,
            HomeUiEvent::TabLoaded {
                tab: HomeTab::Crafted,
                result: Ok(TabRows::Crafted(vec![item(1, Uuid::from_u128(99))])),
            },
        );
        handle_key(&mut app, key(KeyCode::Char('d')));
        assert!(app.home.pending_delete.is_none());
        assert!(matches!(app.home.status, Some(Status::Error(_))));
    }

    #[test]
    fn test_tab_error_is_kept_per_tab() {
        let mut app = signed_in();
        handle_event(
            &mut app,
            HomeUiEvent::TabLoaded {
                tab: HomeTab::Predictions,
                result: Err("permission denied".to_string()),
            },
        );
        assert_eq!(app.home.error(HomeTab::Predictions), Some("permission denied"));
        assert_eq!(app.home.error(HomeTab::Entities), None);
    }

    #[test]
    fn test_sign_out_key_emits_effect() {
        let mut app = signed_in();
        let effects = handle_key(&mut app, key(KeyCode::Char('o')));
        assert!(matches!(effects.as_slice(), [UiEffect::SignOut { .. }]));
    }
}
