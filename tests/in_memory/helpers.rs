//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use chrono::Utc;
use itemflow::config::{DeleteDelays, EngineConfig};
use itemflow::tracking::{
    adapters::memory::{InMemoryItemStore, InMemorySurface},
    domain::{Actor, ActorId, Creator, ItemDraft, ItemKind, Priority, ScopeId},
    services::{CreateItemRequest, ItemLifecycleService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type wired to in-memory adapters.
pub type TestService = ItemLifecycleService<InMemoryItemStore, InMemorySurface, DefaultClock>;

/// Service plus handles on the adapters it writes to.
pub struct Engine {
    pub store: Arc<InMemoryItemStore>,
    pub surface: Arc<InMemorySurface>,
    pub service: TestService,
}

impl Engine {
    /// Builds an engine whose cleanup delay is `seconds` for every kind.
    #[must_use]
    pub fn with_delay(seconds: u64) -> Self {
        let store = Arc::new(InMemoryItemStore::new());
        let surface = Arc::new(InMemorySurface::new());
        let config = EngineConfig {
            delete_delay_secs: DeleteDelays::uniform(seconds),
            ..EngineConfig::default()
        };
        let service = ItemLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&surface),
            Arc::new(DefaultClock),
            config,
        );
        Self {
            store,
            surface,
            service,
        }
    }
}

/// Provides an engine with an hour-long cleanup delay.
#[fixture]
pub fn engine() -> Engine {
    Engine::with_delay(3_600)
}

/// Provides a fresh in-memory store.
#[fixture]
pub fn store() -> InMemoryItemStore {
    InMemoryItemStore::new()
}

/// Returns the scope every helper files items under.
#[must_use]
pub fn scope() -> ScopeId {
    ScopeId::new("guild-42").expect("valid scope")
}

/// Returns an actor whose display name is `name` capitalised.
///
/// # Panics
///
/// Panics when `name` is blank.
#[must_use]
pub fn actor(name: &str) -> Actor {
    let display: String = name
        .chars()
        .next()
        .map(|first| first.to_uppercase().chain(name.chars().skip(1)).collect())
        .unwrap_or_default();
    Actor::new(ActorId::new(name).expect("valid actor"), display)
}

/// Returns a creation request from the chat platform.
#[must_use]
pub fn request(kind: ItemKind, title: &str) -> CreateItemRequest {
    CreateItemRequest::new(kind, scope(), title, Creator::chat(&actor("reporter")))
}

/// Returns a store draft with default fields.
#[must_use]
pub fn draft(kind: ItemKind, title: &str) -> ItemDraft {
    ItemDraft {
        kind,
        scope: scope(),
        category: None,
        title: title.to_owned(),
        body: String::new(),
        supplementary_text: String::new(),
        priority: Priority::Medium,
        creator: Creator::chat(&actor("reporter")),
        tags: Vec::new(),
        due_date: None,
        created_at: Utc::now(),
    }
}
