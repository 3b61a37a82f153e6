//! Typed access to the service tables.
//!
//! Every call is a single request. Service errors are returned unchanged
//! (downcast to `ServiceError`); there are no retries and no local fallbacks.

use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::{Endpoint, Filter, Order, RestClient, SelectQuery};
use crate::models::{
    AllocationUpsert, CraftedItem, CraftedItemPatch, EntityPatch, EntityRecord, NewCraftedItem,
    NewEntity, NewPrediction, NewProfile, NewSystemEvent, NewTransformation, Prediction,
    PredictionPatch, ProfilePatch, ResourceAllocation, SystemEvent, TransformationRecord,
    UserProfile,
};
use crate::session::SessionContext;

/// Row cap applied when the caller doesn't pass one.
pub const DEFAULT_LIST_LIMIT: usize = 50;

const PROFILES: &str = "profiles";
const ENTITIES: &str = "entities";
const TRANSFORMATIONS: &str = "transformations";
const CRAFTED_ITEMS: &str = "crafted_items";
const PREDICTIONS: &str = "predictions";
const SYSTEM_EVENTS: &str = "system_events";
const ENERGY_ALLOCATIONS: &str = "energy_allocations";

const CREATED_AT: &str = "created_at";
const CREATED_BY: &str = "created_by";

#[derive(Debug, Clone)]
pub struct DatabaseService {
    rest: RestClient,
    session: SessionContext,
}

impl DatabaseService {
    pub fn new(rest: RestClient, session: SessionContext) -> Self {
        Self { rest, session }
    }

    pub fn from_endpoint(endpoint: Endpoint, session: SessionContext) -> Self {
        Self::new(RestClient::new(endpoint), session)
    }

    /// Session access token, or the anon key when signed out.
    fn bearer(&self) -> String {
        self.session
            .access_token()
            .unwrap_or_else(|| self.rest.endpoint().anon_key.clone())
    }

    fn newest_first(owner: Option<Uuid>, limit: Option<usize>) -> SelectQuery {
        let mut query = SelectQuery::new();
        if let Some(owner) = owner {
            query = query.eq(CREATED_BY, owner);
        }
        query
            .order(Order::desc(CREATED_AT))
            .limit(limit.unwrap_or(DEFAULT_LIST_LIMIT))
    }

    fn by_id(id: Uuid) -> Vec<Filter> {
        vec![Filter::eq("id", id)]
    }

    fn by_id_and_owner(id: Uuid, owner: Uuid) -> Vec<Filter> {
        vec![Filter::eq("id", id), Filter::eq(CREATED_BY, owner)]
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, table: &str, id: Uuid) -> Result<T> {
        self.rest
            .select_single(table, &SelectQuery::new().eq("id", id), &self.bearer())
            .await
    }

    /// Cheap reachability check: selects one profile id with the anon key.
    ///
    /// # Errors
    /// Returns the transport or service error unchanged.
    pub async fn probe(&self) -> Result<()> {
        #[derive(Deserialize)]
        struct IdOnly {
            #[serde(rename = "id")]
            _id: Uuid,
        }

        let anon_key = self.rest.endpoint().anon_key.clone();
        let _: Vec<IdOnly> = self
            .rest
            .select(PROFILES, &SelectQuery::new().columns("id").limit(1), &anon_key)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // profiles
    // ------------------------------------------------------------------------

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn list_profiles(&self, limit: Option<usize>) -> Result<Vec<UserProfile>> {
        self.rest
            .select(PROFILES, &Self::newest_first(None, limit), &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged, including when no row matches.
    pub async fn get_profile(&self, id: Uuid) -> Result<UserProfile> {
        self.get(PROFILES, id).await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<UserProfile> {
        self.rest.insert(PROFILES, profile, &self.bearer()).await
    }

    /// Applies `patch`; the service stamps `updated_at`.
    ///
    /// # Errors
    /// Returns the service error unchanged.
    pub async fn update_profile(&self, id: Uuid, patch: &ProfilePatch) -> Result<UserProfile> {
        self.rest
            .update(PROFILES, &Self::by_id(id), patch, &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn delete_profile(&self, id: Uuid) -> Result<usize> {
        self.rest
            .delete(PROFILES, &Self::by_id(id), &self.bearer())
            .await
    }

    // ------------------------------------------------------------------------
    // entities
    // ------------------------------------------------------------------------

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn list_entities(
        &self,
        owner: Option<Uuid>,
        limit: Option<usize>,
    ) -> Result<Vec<EntityRecord>> {
        self.rest
            .select(ENTITIES, &Self::newest_first(owner, limit), &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged, including when no row matches.
    pub async fn get_entity(&self, id: Uuid) -> Result<EntityRecord> {
        self.get(ENTITIES, id).await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn create_entity(&self, entity: &NewEntity) -> Result<EntityRecord> {
        self.rest.insert(ENTITIES, entity, &self.bearer()).await
    }

    /// Applies `patch`; the service stamps `updated_at`.
    ///
    /// # Errors
    /// Returns the service error unchanged.
    pub async fn update_entity(&self, id: Uuid, patch: &EntityPatch) -> Result<EntityRecord> {
        self.rest
            .update(ENTITIES, &Self::by_id(id), patch, &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn delete_entity(&self, id: Uuid) -> Result<usize> {
        self.rest
            .delete(ENTITIES, &Self::by_id(id), &self.bearer())
            .await
    }

    // ------------------------------------------------------------------------
    // transformations
    // ------------------------------------------------------------------------

    /// Transformations of one entity, newest first.
    ///
    /// # Errors
    /// Returns the service error unchanged.
    pub async fn list_transformations(
        &self,
        entity_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<TransformationRecord>> {
        let query = SelectQuery::new()
            .eq("entity_id", entity_id)
            .order(Order::desc(CREATED_AT))
            .limit(limit.unwrap_or(DEFAULT_LIST_LIMIT));
        self.rest
            .select(TRANSFORMATIONS, &query, &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged, including when no row matches.
    pub async fn get_transformation(&self, id: Uuid) -> Result<TransformationRecord> {
        self.get(TRANSFORMATIONS, id).await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn create_transformation(
        &self,
        transformation: &NewTransformation,
    ) -> Result<TransformationRecord> {
        self.rest
            .insert(TRANSFORMATIONS, transformation, &self.bearer())
            .await
    }

    // ------------------------------------------------------------------------
    // crafted_items
    // ------------------------------------------------------------------------

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn list_crafted_items(
        &self,
        owner: Option<Uuid>,
        limit: Option<usize>,
    ) -> Result<Vec<CraftedItem>> {
        self.rest
            .select(CRAFTED_ITEMS, &Self::newest_first(owner, limit), &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged, including when no row matches.
    pub async fn get_crafted_item(&self, id: Uuid) -> Result<CraftedItem> {
        self.get(CRAFTED_ITEMS, id).await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn create_crafted_item(&self, item: &NewCraftedItem) -> Result<CraftedItem> {
        self.rest.insert(CRAFTED_ITEMS, item, &self.bearer()).await
    }

    /// Updates an item only if `owner` created it.
    ///
    /// # Errors
    /// Returns the service error unchanged (no match is a service error).
    pub async fn update_crafted_item(
        &self,
        id: Uuid,
        owner: Uuid,
        patch: &CraftedItemPatch,
    ) -> Result<CraftedItem> {
        self.rest
            .update(
                CRAFTED_ITEMS,
                &Self::by_id_and_owner(id, owner),
                patch,
                &self.bearer(),
            )
            .await
    }

    /// Deletes an item only if `owner` created it.
    ///
    /// # Errors
    /// Returns the service error unchanged.
    pub async fn delete_crafted_item(&self, id: Uuid, owner: Uuid) -> Result<usize> {
        self.rest
            .delete(
                CRAFTED_ITEMS,
                &Self::by_id_and_owner(id, owner),
                &self.bearer(),
            )
            .await
    }

    // ------------------------------------------------------------------------
    // predictions
    // ------------------------------------------------------------------------

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn list_predictions(
        &self,
        owner: Option<Uuid>,
        limit: Option<usize>,
    ) -> Result<Vec<Prediction>> {
        self.rest
            .select(PREDICTIONS, &Self::newest_first(owner, limit), &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged, including when no row matches.
    pub async fn get_prediction(&self, id: Uuid) -> Result<Prediction> {
        self.get(PREDICTIONS, id).await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn create_prediction(&self, prediction: &NewPrediction) -> Result<Prediction> {
        self.rest.insert(PREDICTIONS, prediction, &self.bearer()).await
    }

    /// Applies `patch`; the service stamps `updated_at`.
    ///
    /// # Errors
    /// Returns the service error unchanged.
    pub async fn update_prediction(&self, id: Uuid, patch: &PredictionPatch) -> Result<Prediction> {
        self.rest
            .update(PREDICTIONS, &Self::by_id(id), patch, &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn delete_prediction(&self, id: Uuid) -> Result<usize> {
        self.rest
            .delete(PREDICTIONS, &Self::by_id(id), &self.bearer())
            .await
    }

    // ------------------------------------------------------------------------
    // system_events
    // ------------------------------------------------------------------------

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn list_system_events(&self, limit: Option<usize>) -> Result<Vec<SystemEvent>> {
        self.rest
            .select(SYSTEM_EVENTS, &Self::newest_first(None, limit), &self.bearer())
            .await
    }

    /// # Errors
    /// Returns the service error unchanged.
    pub async fn log_system_event(&self, event: &NewSystemEvent) -> Result<SystemEvent> {
        self.rest.insert(SYSTEM_EVENTS, event, &self.bearer()).await
    }

    // ------------------------------------------------------------------------
    // energy_allocations
    // ------------------------------------------------------------------------

    /// All chambers, alphabetically.
    ///
    /// # Errors
    /// Returns the service error unchanged.
    pub async fn list_energy_allocations(&self) -> Result<Vec<ResourceAllocation>> {
        self.rest
            .select(
                ENERGY_ALLOCATIONS,
                &SelectQuery::new().order(Order::asc("chamber")),
                &self.bearer(),
            )
            .await
    }

    /// # Errors
    /// Returns the service error unchanged, including when no row matches.
    pub async fn get_energy_allocation(&self, chamber: &str) -> Result<ResourceAllocation> {
        self.rest
            .select_single(
                ENERGY_ALLOCATIONS,
                &SelectQuery::new().eq("chamber", chamber),
                &self.bearer(),
            )
            .await
    }

    /// Inserts or merges the allocation for `chamber`.
    ///
    /// # Errors
    /// Returns the service error unchanged.
    pub async fn update_energy_allocation(
        &self,
        chamber: &str,
        allocated: f64,
        maximum: f64,
        efficiency: f64,
        updated_by: Uuid,
    ) -> Result<ResourceAllocation> {
        let row = AllocationUpsert {
            chamber: chamber.to_string(),
            allocated,
            maximum,
            efficiency,
            updated_by,
            updated_at: Utc::now(),
        };
        self.rest
            .upsert(ENERGY_ALLOCATIONS, "chamber", &row, &self.bearer())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityStatus;

    #[test]
    fn test_newest_first_defaults() {
        let pairs = DatabaseService::newest_first(None, None).query_pairs();
        assert!(pairs.contains(&("order".to_string(), "created_at.desc".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "50".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == CREATED_BY));
    }

    #[test]
    fn test_owner_scoped_filters() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        assert_eq!(
            DatabaseService::by_id_and_owner(id, owner),
            vec![Filter::eq("id", id), Filter::eq("created_by", owner)]
        );
    }

    #[test]
    fn test_patch_body_carries_no_timestamp() {
        let patch = EntityPatch {
            status: Some(EntityStatus::Archived),
            ..Default::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body["status"], "archived");
        assert!(body.get("updated_at").is_none());
        assert!(body.get("name").is_none());
    }

    #[test]
    fn test_bearer_falls_back_to_anon_key() {
        let db = DatabaseService::from_endpoint(
            Endpoint::new("http://localhost", "anon"),
            SessionContext::new(),
        );
        assert_eq!(db.bearer(), "anon");
    }
}
