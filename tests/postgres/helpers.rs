//! Shared test helpers for `PostgreSQL` integration tests.

use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use itemflow::tracking::{
    adapters::postgres::PostgresItemStore,
    domain::{Actor, ActorId, Creator, ItemDraft, ItemKind, Priority, ScopeId},
};
use uuid::Uuid;

/// Environment variable naming the test server.
pub const DATABASE_URL_ENV: &str = "ITEMFLOW_TEST_DATABASE_URL";

/// SQL creating the item table.
pub const CREATE_ITEMS_SQL: &str =
    include_str!("../../migrations/2026-01-15-000000_create_tracked_items/up.sql");

/// Boxed error used by fixtures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Store bound to a throwaway schema; dropping it drops the schema.
pub struct TestSchema {
    base_url: String,
    name: String,
    pub store: PostgresItemStore,
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        if let Ok(mut connection) = PgConnection::establish(&self.base_url) {
            let statement = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name);
            if let Err(err) = connection.batch_execute(&statement) {
                tracing::warn!(schema = %self.name, error = %err, "dropping test schema failed");
            }
        }
    }
}

/// Creates a migrated schema and a store whose connections use it.
///
/// Returns `Ok(None)` when no test server is configured.
///
/// # Errors
///
/// Returns an error if the schema cannot be created or migrated.
pub fn setup_store() -> Result<Option<TestSchema>, BoxError> {
    let Ok(base_url) = std::env::var(DATABASE_URL_ENV) else {
        return Ok(None);
    };
    let name = format!("itemflow_test_{}", Uuid::new_v4().simple());
    let mut admin = PgConnection::establish(&base_url)?;
    admin.batch_execute(&format!("CREATE SCHEMA {name}"))?;

    let separator = if base_url.contains('?') { '&' } else { '?' };
    let scoped_url = format!("{base_url}{separator}options=-csearch_path%3D{name}");
    let mut scoped = PgConnection::establish(&scoped_url)?;
    scoped.batch_execute(CREATE_ITEMS_SQL)?;

    let pool = Pool::builder()
        .max_size(4)
        .build(ConnectionManager::<PgConnection>::new(scoped_url))?;
    Ok(Some(TestSchema {
        base_url,
        name,
        store: PostgresItemStore::new(pool),
    }))
}

/// Returns a test actor.
///
/// # Errors
///
/// Returns an error when `name` is blank.
pub fn actor(name: &str) -> Result<Actor, BoxError> {
    Ok(Actor::new(ActorId::new(name)?, name.to_uppercase()))
}

/// Returns a fully populated draft.
///
/// # Errors
///
/// Returns an error if the fixed identifiers are rejected.
pub fn draft(kind: ItemKind, title: &str) -> Result<ItemDraft, BoxError> {
    Ok(ItemDraft {
        kind,
        scope: ScopeId::new("guild-pg")?,
        category: Some("acme/editor".to_owned()),
        title: title.to_owned(),
        body: "Steps to reproduce attached.".to_owned(),
        supplementary_text: "1. open\n2. save".to_owned(),
        priority: Priority::High,
        creator: Creator::chat(&actor("reporter")?),
        tags: vec!["ui".to_owned(), "regression".to_owned()],
        due_date: chrono::NaiveDate::from_ymd_opt(2026, 12, 1),
        created_at: Utc::now(),
    })
}
