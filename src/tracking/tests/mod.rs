//! Unit tests for the tracking bounded context.


use std::sync::Arc;

use crate::config::{DeleteDelays, EngineConfig};
use crate::tracking::{
    adapters::memory::{InMemoryItemStore, InMemorySurface},
    domain::{Actor, ActorId, Creator, ItemKind, ScopeId},
    services::{CreateItemRequest, ItemLifecycleService},
};
use mockable::DefaultClock;

pub(super) type TestService = ItemLifecycleService<InMemoryItemStore, InMemorySurface, DefaultClock>;

/// Service wired to in-memory adapters, with handles on both adapters.
pub(super) struct Harness {
    pub store: Arc<InMemoryItemStore>,
    pub surface: Arc<InMemorySurface>,
    pub service: TestService,
}

pub(super) fn harness_with_delay(seconds: u64) -> Harness {
    let store = Arc::new(InMemoryItemStore::new());
    let surface = Arc::new(InMemorySurface::new());
    let config = EngineConfig {
        delete_delay_secs: DeleteDelays::uniform(seconds),
        min_rearm_delay_ms: 1_000,
    };
    let service = ItemLifecycleService::new(
        Arc::clone(&store),
        Arc::clone(&surface),
        Arc::new(DefaultClock),
        config,
    );
    Harness {
        store,
        surface,
        service,
    }
}

pub(super) fn harness() -> Harness {
    harness_with_delay(3_600)
}

pub(super) fn scope() -> ScopeId {
    ScopeId::new("guild-1").expect("valid scope")
}

pub(super) fn actor(id: &str) -> Actor {
    Actor::new(ActorId::new(id).expect("valid actor"), id.to_uppercase())
}

pub(super) fn request(kind: ItemKind, title: &str) -> CreateItemRequest {
    CreateItemRequest::new(kind, scope(), title, Creator::chat(&actor("reporter")))
}

/// Builds a fresh service over the same adapters, as after a process restart.
pub(super) fn restart(harness: &Harness) -> TestService {
    ItemLifecycleService::new(
        Arc::clone(&harness.store),
        Arc::clone(&harness.surface),
        Arc::new(DefaultClock),
        *harness.service.config(),
    )
}
