//! Shared world state for tracked item lifecycle scenarios.

use std::sync::Arc;

use itemflow::config::EngineConfig;
use itemflow::tracking::{
    adapters::memory::{InMemoryItemStore, InMemorySurface},
    domain::{Actor, ActorId, Item, SurfaceId},
    services::{ItemLifecycleService, TransitionOutcome},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestItemService = ItemLifecycleService<InMemoryItemStore, InMemorySurface, DefaultClock>;

/// Scenario world for item lifecycle behaviour tests.
pub struct LifecycleWorld {
    pub store: Arc<InMemoryItemStore>,
    pub surface: Arc<InMemorySurface>,
    pub service: TestItemService,
    pub item: Option<Item>,
    pub original_detail_surface: Option<SurfaceId>,
    pub last_outcome: Option<TransitionOutcome>,
    pub claim_outcomes: Vec<TransitionOutcome>,
}

impl LifecycleWorld {
    /// Creates a world over fresh in-memory adapters.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryItemStore::new());
        let surface = Arc::new(InMemorySurface::new());
        let service = ItemLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&surface),
            Arc::new(DefaultClock),
            EngineConfig::default(),
        );
        Self {
            store,
            surface,
            service,
            item: None,
            original_detail_surface: None,
            last_outcome: None,
            claim_outcomes: Vec::new(),
        }
    }

    /// Returns the item under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no item has been created yet.
    pub fn item(&self) -> Result<&Item, eyre::Report> {
        self.item
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing item in scenario world"))
    }

    /// Records an outcome, keeping the applied snapshot.
    pub fn record(&mut self, outcome: TransitionOutcome) {
        if let TransitionOutcome::Applied(item) = &outcome {
            self.item = Some(item.clone());
        }
        self.last_outcome = Some(outcome);
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Builds an actor whose display name is `name` capitalised.
///
/// # Errors
///
/// Returns an error when `name` is blank.
pub fn actor(name: &str) -> Result<Actor, eyre::Report> {
    let mut chars = name.chars();
    let display: String = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    Ok(Actor::new(ActorId::new(name)?, display))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
