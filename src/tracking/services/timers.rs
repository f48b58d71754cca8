//! Process-local registry of deferred cleanup timers.
//!
//! The registry holds at most one timer per item. It is a cache: the durable
//! record of "cleanup is due" is the item's `deletion_armed_at`, which
//! recovery turns back into timers after a restart.

use crate::tracking::domain::ItemId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Registry of armed one-shot cleanup timers keyed by item.
#[derive(Debug, Clone, Default)]
pub struct DeletionTimers {
    table: Arc<Mutex<TimerTable>>,
}

#[derive(Debug, Default)]
struct TimerTable {
    next_generation: u64,
    entries: HashMap<ItemId, ArmedTimer>,
}

#[derive(Debug)]
struct ArmedTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl DeletionTimers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TimerTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arms a timer for `id`, replacing any timer already armed for it.
    ///
    /// Returns immediately. After `delay`, `on_fire` runs unless the timer was
    /// cancelled or replaced first. `on_fire` must re-check item state before
    /// doing anything destructive.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn arm<F, Fut>(&self, id: ItemId, delay: Duration, on_fire: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // The table lock is held across spawn and insert so a zero-delay
        // timer cannot look itself up before it is registered.
        let mut table = self.lock();
        table.next_generation = table.next_generation.wrapping_add(1);
        let generation = table.next_generation;
        let registry = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if registry.retire(id, generation) {
                on_fire().await;
            }
        });
        if let Some(previous) = table
            .entries
            .insert(id, ArmedTimer { generation, handle })
        {
            previous.handle.abort();
            debug!(item_id = %id, "replaced armed cleanup timer");
        }
    }

    /// Cancels the timer for `id`.
    ///
    /// Returns whether a timer was armed. Cancelling an absent timer is a
    /// no-op.
    pub fn cancel(&self, id: ItemId) -> bool {
        let Some(timer) = self.lock().entries.remove(&id) else {
            return false;
        };
        timer.handle.abort();
        true
    }

    /// Returns whether a timer is armed for `id`.
    #[must_use]
    pub fn is_armed(&self, id: ItemId) -> bool {
        self.lock().entries.contains_key(&id)
    }

    /// Returns the number of armed timers.
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Removes the entry for a firing timer if it is still the current one.
    fn retire(&self, id: ItemId, generation: u64) -> bool {
        let mut table = self.lock();
        match table.entries.get(&id) {
            Some(timer) if timer.generation == generation => {
                table.entries.remove(&id);
                true
            }
            _ => false,
        }
    }
}
