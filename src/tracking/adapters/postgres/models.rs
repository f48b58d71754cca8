//! Diesel row models for tracked item persistence.

use super::schema::tracked_items;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for tracked items.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = tracked_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemRow {
    /// Item identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: uuid::Uuid,
    /// Kind discriminator.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub kind: String,
    /// Owning scope.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub scope_id: String,
    /// Repository grouping key.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub category: Option<String>,
    /// Title.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub title: String,
    /// Body.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub body: String,
    /// Supplementary text.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub supplementary_text: String,
    /// Priority.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub priority: String,
    /// Lifecycle status.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub status: String,
    /// Claimant JSON payload.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Jsonb>)]
    pub claimant: Option<Value>,
    /// Creator JSON payload.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub creator: Value,
    /// Tags JSON array.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub tags: Value,
    /// Due date.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Date>)]
    pub due_date: Option<NaiveDate>,
    /// Detail surface reference.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub detail_surface_id: Option<String>,
    /// Detail message reference.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub detail_message_id: Option<String>,
    /// List entry reference.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub list_message_id: Option<String>,
    /// Replay message reference.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub replay_message_id: Option<String>,
    /// Update log JSON array.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub update_log: Value,
    /// Reopen log JSON array.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub reopen_log: Value,
    /// Deletion-armed timestamp.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub deletion_armed_at: Option<DateTime<Utc>>,
    /// Replay flag.
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub replay_pending: bool,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
}

/// Insert model for tracked items.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tracked_items)]
pub struct NewItemRow {
    /// Item identifier.
    pub id: uuid::Uuid,
    /// Kind discriminator.
    pub kind: String,
    /// Owning scope.
    pub scope_id: String,
    /// Repository grouping key.
    pub category: Option<String>,
    /// Title.
    pub title: String,
    /// Body.
    pub body: String,
    /// Supplementary text.
    pub supplementary_text: String,
    /// Priority.
    pub priority: String,
    /// Initial status.
    pub status: String,
    /// Creator JSON payload.
    pub creator: Value,
    /// Tags JSON array.
    pub tags: Value,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Empty update log.
    pub update_log: Value,
    /// Empty reopen log.
    pub reopen_log: Value,
    /// Initial replay flag.
    pub replay_pending: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Partial update for tracked items.
///
/// `None` leaves a column untouched; `Some(None)` writes `NULL`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = tracked_items)]
pub struct ItemChanges {
    /// New status.
    pub status: Option<String>,
    /// New claimant payload.
    pub claimant: Option<Option<Value>>,
    /// New detail surface reference.
    pub detail_surface_id: Option<Option<String>>,
    /// New detail message reference.
    pub detail_message_id: Option<Option<String>>,
    /// New list entry reference.
    pub list_message_id: Option<Option<String>>,
    /// New replay message reference.
    pub replay_message_id: Option<Option<String>>,
    /// New deletion-armed timestamp.
    pub deletion_armed_at: Option<Option<DateTime<Utc>>>,
    /// New replay flag.
    pub replay_pending: Option<bool>,
}
