//! Row types for the service tables.
//!
//! Ids and timestamps are assigned by the service. `New*` structs carry the
//! writable columns for inserts; `*Patch` structs carry partial updates and
//! omit every `None` field from the request body.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Privilege tier stored in user metadata and on the profile row.
///
/// Purely informational on the client; enforcement belongs to the service's
/// row-level policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Guest,
    Executor,
    Root,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Guest => "guest",
            AccessLevel::Executor => "executor",
            AccessLevel::Root => "root",
        }
    }

    /// Parses a metadata value (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "guest" => Some(AccessLevel::Guest),
            "executor" => Some(AccessLevel::Executor),
            "root" => Some(AccessLevel::Root),
            _ => None,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// profiles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub access_level: AccessLevel,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile rows share the auth identity's id, so the id is supplied here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub username: String,
    pub access_level: AccessLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_history: Option<Vec<String>>,
}

// ============================================================================
// entities
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    #[default]
    Active,
    Dormant,
    Transformed,
    Archived,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Dormant => "dormant",
            EntityStatus::Transformed => "transformed",
            EntityStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: Uuid,
    pub name: String,
    pub original_form: String,
    pub current_form: String,
    #[serde(default)]
    pub status: EntityStatus,
    pub chamber: String,
    #[serde(default)]
    pub signature: f64,
    #[serde(default)]
    pub stability: f64,
    #[serde(default)]
    pub visibility_level: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntity {
    pub name: String,
    pub original_form: String,
    pub current_form: String,
    pub status: EntityStatus,
    pub chamber: String,
    pub signature: f64,
    pub stability: f64,
    pub visibility_level: i32,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chamber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_level: Option<i32>,
}

// ============================================================================
// transformations (append-only)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationRecord {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub from_form: String,
    pub to_form: String,
    pub chamber: String,
    pub operator_id: Uuid,
    pub success: bool,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransformation {
    pub entity_id: Uuid,
    pub from_form: String,
    pub to_form: String,
    pub chamber: String,
    pub operator_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// crafted_items (owner-scoped writes)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftedItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub stability: f64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCraftedItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub components: Vec<String>,
    pub power: f64,
    pub stability: f64,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CraftedItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
}

// ============================================================================
// predictions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionCategory {
    Anomaly,
    Convergence,
    Entity,
    System,
}

impl PredictionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PredictionCategory::Anomaly => "anomaly",
            PredictionCategory::Convergence => "convergence",
            PredictionCategory::Entity => "entity",
            PredictionCategory::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    #[default]
    Active,
    Fulfilled,
    Averted,
    Expired,
}

impl PredictionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PredictionStatus::Active => "active",
            PredictionStatus::Fulfilled => "fulfilled",
            PredictionStatus::Averted => "averted",
            PredictionStatus::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: PredictionCategory,
    #[serde(default)]
    pub probability: f64,
    pub timeframe: String,
    #[serde(default)]
    pub chamber: Option<String>,
    #[serde(default)]
    pub entity_refs: Vec<Uuid>,
    #[serde(default)]
    pub status: PredictionStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
    pub title: String,
    pub content: String,
    pub category: PredictionCategory,
    pub probability: f64,
    pub timeframe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chamber: Option<String>,
    pub entity_refs: Vec<Uuid>,
    pub status: PredictionStatus,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PredictionStatus>,
}

// ============================================================================
// system_events (append-only audit log)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Access,
    Transformation,
    Crafting,
    Prediction,
    Allocation,
    System,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Access => "access",
            EventType::Transformation => "transformation",
            EventType::Crafting => "crafting",
            EventType::Prediction => "prediction",
            EventType::Allocation => "allocation",
            EventType::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub chamber: Option<String>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSystemEvent {
    pub event_type: EventType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chamber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub metadata: Value,
}

// ============================================================================
// energy_allocations (keyed by chamber)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAllocation {
    pub chamber: String,
    pub allocated: f64,
    pub maximum: f64,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub updated_by: Option<Uuid>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Upsert body; `updated_at` is the one client-assigned timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationUpsert {
    pub chamber: String,
    pub allocated: f64,
    pub maximum: f64,
    pub efficiency: f64,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}
