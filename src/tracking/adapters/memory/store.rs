//! In-memory item store for lifecycle tests and single-process hosts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::tracking::{
    domain::{Item, ItemDraft, ItemFieldUpdate, ItemId, ItemKind, ItemStatus, LogEntry, ScopeId},
    ports::{ItemStore, ItemStoreError, ItemStoreResult, StatusSwap},
};

/// Thread-safe in-memory item store.
///
/// Every write takes the state lock, so a compare-and-set is atomic with
/// respect to every other write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    state: Arc<RwLock<InMemoryItemState>>,
}

#[derive(Debug, Default)]
struct InMemoryItemState {
    items: HashMap<ItemId, Item>,
}

impl InMemoryItemStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a fully formed item, bypassing the lifecycle.
    ///
    /// Used to seed crash-recovery states in tests.
    ///
    /// # Errors
    ///
    /// Returns [`ItemStoreError::Persistence`] when the lock is poisoned.
    pub fn insert_raw(&self, item: Item) -> ItemStoreResult<()> {
        let mut state = self.write()?;
        state.items.insert(item.id(), item);
        Ok(())
    }

    fn read(&self) -> ItemStoreResult<std::sync::RwLockReadGuard<'_, InMemoryItemState>> {
        self.state
            .read()
            .map_err(|err| ItemStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> ItemStoreResult<std::sync::RwLockWriteGuard<'_, InMemoryItemState>> {
        self.state
            .write()
            .map_err(|err| ItemStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

fn sorted_by_creation(mut items: Vec<Item>) -> Vec<Item> {
    items.sort_by_key(|item| (item.created_at(), item.id()));
    items
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn create(&self, draft: ItemDraft) -> ItemStoreResult<Item> {
        let mut state = self.write()?;
        let mut id = ItemId::new();
        while state.items.contains_key(&id) {
            id = ItemId::new();
        }
        let item = Item::from_draft(id, draft);
        state.items.insert(id, item.clone());
        Ok(item)
    }

    async fn get_by_id(&self, id: ItemId) -> ItemStoreResult<Option<Item>> {
        let state = self.read()?;
        Ok(state.items.get(&id).cloned())
    }

    async fn compare_and_set_status(
        &self,
        id: ItemId,
        expected: ItemStatus,
        new_status: ItemStatus,
        extra: &[ItemFieldUpdate],
    ) -> ItemStoreResult<StatusSwap> {
        let mut state = self.write()?;
        let Some(item) = state.items.get_mut(&id) else {
            return Ok(StatusSwap::NoMatch);
        };
        if item.swap_status(expected, new_status, extra) {
            Ok(StatusSwap::Swapped(item.clone()))
        } else {
            Ok(StatusSwap::NoMatch)
        }
    }

    async fn append_to_log(&self, id: ItemId, entry: LogEntry) -> ItemStoreResult<Option<Item>> {
        let mut state = self.write()?;
        Ok(state.items.get_mut(&id).map(|item| {
            item.append(entry);
            item.clone()
        }))
    }

    async fn set_field(
        &self,
        id: ItemId,
        update: ItemFieldUpdate,
    ) -> ItemStoreResult<Option<Item>> {
        let mut state = self.write()?;
        Ok(state.items.get_mut(&id).map(|item| {
            item.apply(update);
            item.clone()
        }))
    }

    async fn query_by_scope(&self, kind: ItemKind, scope: &ScopeId) -> ItemStoreResult<Vec<Item>> {
        let state = self.read()?;
        let items = state
            .items
            .values()
            .filter(|item| item.kind() == kind && item.scope() == scope)
            .cloned()
            .collect();
        Ok(sorted_by_creation(items))
    }

    async fn query_terminal_with_armed_deletion(&self) -> ItemStoreResult<Vec<Item>> {
        let state = self.read()?;
        let items = state
            .items
            .values()
            .filter(|item| item.status().is_terminal() && item.deletion_armed_at().is_some())
            .cloned()
            .collect();
        Ok(sorted_by_creation(items))
    }

    async fn query_replay_pending(&self) -> ItemStoreResult<Vec<Item>> {
        let state = self.read()?;
        let items = state
            .items
            .values()
            .filter(|item| item.replay_pending())
            .cloned()
            .collect();
        Ok(sorted_by_creation(items))
    }
}
