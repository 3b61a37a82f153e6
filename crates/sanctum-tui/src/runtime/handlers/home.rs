use sanctum_core::database::DatabaseService;
use uuid::Uuid;

use super::describe;
use crate::events::{HomeUiEvent, UiEvent};
use crate::home::{HomeTab, TabRows};

pub const NOTHING_DELETED: &str = "Nothing was dissolved; the item is gone or not yours.";

pub async fn load_profile(db: DatabaseService, user_id: Uuid) -> UiEvent {
    let result = db.get_profile(user_id).await.map_err(|err| describe(&err));
    HomeUiEvent::ProfileLoaded(result).into()
}

/// Entities, predictions and events are shared; crafted items are the
/// owner's own.
pub async fn load_tab(db: DatabaseService, tab: HomeTab, owner: Uuid, limit: usize) -> UiEvent {
    let limit = Some(limit);
    let result = match tab {
        HomeTab::Entities => db.list_entities(None, limit).await.map(TabRows::Entities),
        HomeTab::Crafted => db
            .list_crafted_items(Some(owner), limit)
            .await
            .map(TabRows::Crafted),
        HomeTab::Predictions => db
            .list_predictions(None, limit)
            .await
            .map(TabRows::Predictions),
        HomeTab::Events => db.list_system_events(limit).await.map(TabRows::Events),
    };
    HomeUiEvent::TabLoaded {
        tab,
        result: result.map_err(|err| describe(&err)),
    }
    .into()
}

pub async fn delete_crafted_item(db: DatabaseService, id: Uuid, owner: Uuid) -> UiEvent {
    let result = match db.delete_crafted_item(id, owner).await {
        Ok(0) => Err(NOTHING_DELETED.to_string()),
        Ok(_) => Ok(id),
        Err(err) => Err(describe(&err)),
    };
    HomeUiEvent::CraftedItemDeleted(result).into()
}
