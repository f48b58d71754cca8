//! Store port for durable item documents.
//!
//! The store is the only writer of item state. Status changes go exclusively
//! through [`ItemStore::compare_and_set_status`]; every other write is a
//! single-field update or a log append.

use crate::tracking::domain::{
    Item, ItemDraft, ItemFieldUpdate, ItemId, ItemKind, ItemStatus, LogEntry, ScopeId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for item store operations.
pub type ItemStoreResult<T> = Result<T, ItemStoreError>;

/// Outcome of a conditional status swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSwap {
    /// The stored status matched and was replaced; carries the new snapshot.
    Swapped(Item),
    /// The stored status did not match, or the item does not exist.
    NoMatch,
}

impl StatusSwap {
    /// Returns the swapped item, if the swap succeeded.
    #[must_use]
    pub fn into_item(self) -> Option<Item> {
        match self {
            Self::Swapped(item) => Some(item),
            Self::NoMatch => None,
        }
    }
}

/// Durable item persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Allocates an identifier and stores a new `Open` item.
    ///
    /// # Errors
    ///
    /// Returns [`ItemStoreError::Persistence`] when the store is unavailable.
    async fn create(&self, draft: ItemDraft) -> ItemStoreResult<Item>;

    /// Finds an item by identifier.
    ///
    /// Returns `None` when the item does not exist.
    async fn get_by_id(&self, id: ItemId) -> ItemStoreResult<Option<Item>>;

    /// Atomically replaces `expected` with `new_status` and applies `extra`.
    ///
    /// A mismatch is not an error: it yields [`StatusSwap::NoMatch`] and
    /// leaves the stored item untouched.
    async fn compare_and_set_status(
        &self,
        id: ItemId,
        expected: ItemStatus,
        new_status: ItemStatus,
        extra: &[ItemFieldUpdate],
    ) -> ItemStoreResult<StatusSwap>;

    /// Atomically appends an entry to one of the item's logs.
    ///
    /// Returns `None` when the item does not exist.
    async fn append_to_log(&self, id: ItemId, entry: LogEntry) -> ItemStoreResult<Option<Item>>;

    /// Writes a single non-status field.
    ///
    /// Returns `None` when the item does not exist.
    async fn set_field(&self, id: ItemId, update: ItemFieldUpdate)
    -> ItemStoreResult<Option<Item>>;

    /// Returns every item of `kind` in `scope`, oldest first.
    async fn query_by_scope(&self, kind: ItemKind, scope: &ScopeId) -> ItemStoreResult<Vec<Item>>;

    /// Returns every terminal item whose deletion timestamp is set.
    async fn query_terminal_with_armed_deletion(&self) -> ItemStoreResult<Vec<Item>>;

    /// Returns every item whose replay flag is set.
    async fn query_replay_pending(&self) -> ItemStoreResult<Vec<Item>>;
}

/// Errors returned by item store implementations.
#[derive(Debug, Clone, Error)]
pub enum ItemStoreError {
    /// A stored record could not be mapped back into the domain.
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ItemStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
