//! `PostgreSQL` item store.
//!
//! Compare-and-set is a status-matched conditional `UPDATE`; the row lock
//! taken by the update serializes racing writers, and a non-matching status
//! simply updates zero rows.

use super::{
    models::{ItemChanges, ItemRow, NewItemRow},
    schema::tracked_items,
};
use crate::tracking::{
    domain::{
        Actor, Creator, Item, ItemDraft, ItemFieldUpdate, ItemId, ItemKind, ItemStatus, LogEntry,
        MessageId, PersistedItemData, PresentationRefs, Priority, ReopenEntry, ScopeId, SurfaceId,
        TrackingDomainError, UpdateEntry,
    },
    ports::{ItemStore, ItemStoreError, ItemStoreResult, StatusSwap},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use serde_json::Value;

/// `PostgreSQL` connection pool type used by the item store.
pub type ItemPgPool = Pool<ConnectionManager<PgConnection>>;

const TERMINAL_STATUSES: [&str; 2] = [
    ItemStatus::Resolved.as_str(),
    ItemStatus::Rejected.as_str(),
];

/// `PostgreSQL`-backed item store.
#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: ItemPgPool,
}

impl PostgresItemStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ItemPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ItemStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ItemStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ItemStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ItemStoreError::persistence)?
    }

    async fn update_where(
        &self,
        id: ItemId,
        expected: Option<ItemStatus>,
        changes: ItemChanges,
    ) -> ItemStoreResult<Option<Item>> {
        self.run_blocking(move |connection| {
            let target = tracked_items::table.filter(tracked_items::id.eq(id.into_inner()));
            let row = match expected {
                Some(status) => diesel::update(
                    target.filter(tracked_items::status.eq(status.as_str())),
                )
                .set(&changes)
                .returning(ItemRow::as_returning())
                .get_result::<ItemRow>(connection),
                None => diesel::update(target)
                    .set(&changes)
                    .returning(ItemRow::as_returning())
                    .get_result::<ItemRow>(connection),
            }
            .optional()
            .map_err(ItemStoreError::persistence)?;
            row.map(row_to_item).transpose()
        })
        .await
    }

    async fn load_many<F>(&self, query: F) -> ItemStoreResult<Vec<Item>>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<Vec<ItemRow>> + Send + 'static,
    {
        self.run_blocking(move |connection| {
            query(connection)
                .map_err(ItemStoreError::persistence)?
                .into_iter()
                .map(row_to_item)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    async fn create(&self, draft: ItemDraft) -> ItemStoreResult<Item> {
        let new_row = to_new_row(ItemId::new(), &draft)?;
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tracked_items::table)
                .values(&new_row)
                .returning(ItemRow::as_returning())
                .get_result::<ItemRow>(connection)
                .map_err(ItemStoreError::persistence)?;
            row_to_item(row)
        })
        .await
    }

    async fn get_by_id(&self, id: ItemId) -> ItemStoreResult<Option<Item>> {
        self.run_blocking(move |connection| {
            let row = tracked_items::table
                .filter(tracked_items::id.eq(id.into_inner()))
                .select(ItemRow::as_select())
                .first::<ItemRow>(connection)
                .optional()
                .map_err(ItemStoreError::persistence)?;
            row.map(row_to_item).transpose()
        })
        .await
    }

    async fn compare_and_set_status(
        &self,
        id: ItemId,
        expected: ItemStatus,
        new_status: ItemStatus,
        extra: &[ItemFieldUpdate],
    ) -> ItemStoreResult<StatusSwap> {
        let mut changes = ItemChanges {
            status: Some(new_status.as_str().to_owned()),
            ..ItemChanges::default()
        };
        for update in extra {
            merge_update(&mut changes, update.clone())?;
        }
        let swapped = self.update_where(id, Some(expected), changes).await?;
        Ok(swapped.map_or(StatusSwap::NoMatch, StatusSwap::Swapped))
    }

    async fn append_to_log(&self, id: ItemId, entry: LogEntry) -> ItemStoreResult<Option<Item>> {
        let (sql, payload) = match &entry {
            LogEntry::Update(update) => (
                "UPDATE tracked_items SET update_log = update_log || $2 WHERE id = $1 RETURNING *",
                serde_json::to_value([update]),
            ),
            LogEntry::Reopen(reopen) => (
                "UPDATE tracked_items SET reopen_log = reopen_log || $2 WHERE id = $1 RETURNING *",
                serde_json::to_value([reopen]),
            ),
        };
        let payload = payload.map_err(ItemStoreError::persistence)?;
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(sql)
                .bind::<diesel::sql_types::Uuid, _>(id.into_inner())
                .bind::<diesel::sql_types::Jsonb, _>(payload)
                .get_result::<ItemRow>(connection)
                .optional()
                .map_err(ItemStoreError::persistence)?;
            row.map(row_to_item).transpose()
        })
        .await
    }

    async fn set_field(
        &self,
        id: ItemId,
        update: ItemFieldUpdate,
    ) -> ItemStoreResult<Option<Item>> {
        let mut changes = ItemChanges::default();
        merge_update(&mut changes, update)?;
        self.update_where(id, None, changes).await
    }

    async fn query_by_scope(&self, kind: ItemKind, scope: &ScopeId) -> ItemStoreResult<Vec<Item>> {
        let scope_id = scope.as_str().to_owned();
        self.load_many(move |connection| {
            tracked_items::table
                .filter(tracked_items::kind.eq(kind.as_str()))
                .filter(tracked_items::scope_id.eq(scope_id))
                .order((tracked_items::created_at.asc(), tracked_items::id.asc()))
                .select(ItemRow::as_select())
                .load::<ItemRow>(connection)
        })
        .await
    }

    async fn query_terminal_with_armed_deletion(&self) -> ItemStoreResult<Vec<Item>> {
        self.load_many(|connection| {
            tracked_items::table
                .filter(tracked_items::status.eq_any(TERMINAL_STATUSES))
                .filter(tracked_items::deletion_armed_at.is_not_null())
                .order((tracked_items::created_at.asc(), tracked_items::id.asc()))
                .select(ItemRow::as_select())
                .load::<ItemRow>(connection)
        })
        .await
    }

    async fn query_replay_pending(&self) -> ItemStoreResult<Vec<Item>> {
        self.load_many(|connection| {
            tracked_items::table
                .filter(tracked_items::replay_pending.eq(true))
                .order((tracked_items::created_at.asc(), tracked_items::id.asc()))
                .select(ItemRow::as_select())
                .load::<ItemRow>(connection)
        })
        .await
    }
}

fn merge_update(changes: &mut ItemChanges, update: ItemFieldUpdate) -> ItemStoreResult<()> {
    match update {
        ItemFieldUpdate::DetailSurface(value) => {
            changes.detail_surface_id = Some(value.map(|id| id.as_str().to_owned()));
        }
        ItemFieldUpdate::DetailMessage(value) => {
            changes.detail_message_id = Some(value.map(|id| id.as_str().to_owned()));
        }
        ItemFieldUpdate::ListMessage(value) => {
            changes.list_message_id = Some(value.map(|id| id.as_str().to_owned()));
        }
        ItemFieldUpdate::ReplayMessage(value) => {
            changes.replay_message_id = Some(value.map(|id| id.as_str().to_owned()));
        }
        ItemFieldUpdate::Claimant(value) => {
            let payload = value
                .map(|actor| serde_json::to_value(actor).map_err(ItemStoreError::persistence))
                .transpose()?;
            changes.claimant = Some(payload);
        }
        ItemFieldUpdate::DeletionArmedAt(value) => changes.deletion_armed_at = Some(value),
        ItemFieldUpdate::ReplayPending(value) => changes.replay_pending = Some(value),
    }
    Ok(())
}

fn to_new_row(id: ItemId, draft: &ItemDraft) -> ItemStoreResult<NewItemRow> {
    let creator = serde_json::to_value(&draft.creator).map_err(ItemStoreError::persistence)?;
    let tags = serde_json::to_value(&draft.tags).map_err(ItemStoreError::persistence)?;
    Ok(NewItemRow {
        id: id.into_inner(),
        kind: draft.kind.as_str().to_owned(),
        scope_id: draft.scope.as_str().to_owned(),
        category: draft.category.clone(),
        title: draft.title.clone(),
        body: draft.body.clone(),
        supplementary_text: draft.supplementary_text.clone(),
        priority: draft.priority.as_str().to_owned(),
        status: ItemStatus::Open.as_str().to_owned(),
        creator,
        tags,
        due_date: draft.due_date,
        update_log: Value::Array(Vec::new()),
        reopen_log: Value::Array(Vec::new()),
        replay_pending: false,
        created_at: draft.created_at,
    })
}

fn invalid_record(err: impl std::fmt::Display) -> ItemStoreError {
    ItemStoreError::InvalidRecord(err.to_string())
}

fn optional_ref<T, F>(value: Option<String>, parse: F) -> ItemStoreResult<Option<T>>
where
    F: FnOnce(String) -> Result<T, TrackingDomainError>,
{
    value.map(parse).transpose().map_err(invalid_record)
}

fn row_to_item(row: ItemRow) -> ItemStoreResult<Item> {
    let ItemRow {
        id,
        kind,
        scope_id,
        category,
        title,
        body,
        supplementary_text,
        priority,
        status,
        claimant,
        creator,
        tags,
        due_date,
        detail_surface_id,
        detail_message_id,
        list_message_id,
        replay_message_id,
        update_log,
        reopen_log,
        deletion_armed_at,
        replay_pending,
        created_at,
    } = row;

    let draft = ItemDraft {
        kind: ItemKind::try_from(kind.as_str()).map_err(invalid_record)?,
        scope: ScopeId::new(scope_id).map_err(invalid_record)?,
        category,
        title,
        body,
        supplementary_text,
        priority: Priority::try_from(priority.as_str()).map_err(invalid_record)?,
        creator: serde_json::from_value::<Creator>(creator).map_err(invalid_record)?,
        tags: serde_json::from_value::<Vec<String>>(tags).map_err(invalid_record)?,
        due_date,
        created_at,
    };
    let presentation = PresentationRefs {
        detail_surface_id: optional_ref(detail_surface_id, SurfaceId::new)?,
        detail_message_id: optional_ref(detail_message_id, MessageId::new)?,
        list_message_id: optional_ref(list_message_id, MessageId::new)?,
        replay_message_id: optional_ref(replay_message_id, MessageId::new)?,
    };
    let data = PersistedItemData {
        id: ItemId::from_uuid(id),
        draft,
        status: ItemStatus::try_from(status.as_str()).map_err(invalid_record)?,
        claimant: claimant
            .map(serde_json::from_value::<Actor>)
            .transpose()
            .map_err(invalid_record)?,
        presentation,
        update_log: serde_json::from_value::<Vec<UpdateEntry>>(update_log)
            .map_err(invalid_record)?,
        reopen_log: serde_json::from_value::<Vec<ReopenEntry>>(reopen_log)
            .map_err(invalid_record)?,
        deletion_armed_at,
        replay_pending,
    };
    Ok(Item::from_persisted(data))
}
