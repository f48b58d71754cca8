//! Lifecycle engine: creation, status transitions, updates, and cleanup.
//!
//! Every status change is a store compare-and-set. The engine holds no lock
//! over item state; racing operations on one item are settled by exactly one
//! swap succeeding. Presentation work runs after the durable write and its
//! failures are logged, never returned.

use super::presentation::{BackfillReport, PresentationError, PresentationSync};
use super::render::Notice;
use super::timers::DeletionTimers;
use crate::config::EngineConfig;
use crate::tracking::{
    domain::{
        Actor, Creator, Item, ItemDraft, ItemFieldUpdate, ItemId, ItemKind, ItemStatus, LogEntry,
        Priority, ReopenEntry, ScopeId, TrackingDomainError, TransitionRule, Trigger, UpdateEntry,
    },
    ports::{ItemStore, ItemStoreError, PresentationSurface, StatusSwap},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a tracked item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateItemRequest {
    kind: ItemKind,
    scope: ScopeId,
    title: String,
    creator: Creator,
    body: String,
    supplementary_text: String,
    priority: Option<Priority>,
    category: Option<String>,
    tags: Vec<String>,
    due_date: Option<NaiveDate>,
}

impl CreateItemRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(kind: ItemKind, scope: ScopeId, title: impl Into<String>, creator: Creator) -> Self {
        Self {
            kind,
            scope,
            title: title.into(),
            creator,
            body: String::new(),
            supplementary_text: String::new(),
            priority: None,
            category: None,
            tags: Vec::new(),
            due_date: None,
        }
    }

    /// Sets the body text.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets supplementary text such as reproduction steps.
    #[must_use]
    pub fn with_supplementary_text(mut self, text: impl Into<String>) -> Self {
        self.supplementary_text = text.into();
        self
    }

    /// Sets the priority; the kind's default applies otherwise.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Files the item under a repository.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Named result of a lifecycle operation.
///
/// Guard failures are ordinary values; the caller picks the wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The operation succeeded; carries the resulting item.
    Applied(Item),
    /// Claim lost: the item was already claimed or is closed.
    AlreadyClaimedOrClosed,
    /// Resolve found the item in no resolvable state.
    NotResolvable,
    /// Reject is unsupported by the kind or found no rejectable state.
    NotRejectable,
    /// Reopen found the item in no terminal state.
    NotReopenable,
    /// The item does not exist.
    NotFound,
}

impl TransitionOutcome {
    /// Returns the resulting item when the operation was applied.
    #[must_use]
    pub fn applied(self) -> Option<Item> {
        match self {
            Self::Applied(item) => Some(item),
            _ => None,
        }
    }

    /// Returns whether the operation was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    const fn guard_for(trigger: Trigger) -> Self {
        match trigger {
            Trigger::Claim => Self::AlreadyClaimedOrClosed,
            Trigger::Resolve => Self::NotResolvable,
            Trigger::Reject => Self::NotRejectable,
            Trigger::Reopen => Self::NotReopenable,
        }
    }
}

/// Result of a cleanup timer firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The detail surface was removed; carries the updated item.
    Cleaned(Item),
    /// The item left the armed state; nothing was done.
    Stale,
    /// The surface refused deletion; the item stays armed for the next
    /// startup.
    SurfaceRetained,
    /// The item was reopened while its surface was being deleted; the detail
    /// surface was rebuilt. Carries the updated item.
    Reopened(Item),
}

/// Service-level errors for lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TrackingDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] ItemStoreError),
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Lifecycle orchestration service, generic over every item kind.
pub struct ItemLifecycleService<R, S, C>
where
    R: ItemStore,
    S: PresentationSurface,
    C: Clock + Send + Sync,
{
    store: Arc<R>,
    presentation: PresentationSync<R, S>,
    timers: DeletionTimers,
    clock: Arc<C>,
    config: EngineConfig,
}

impl<R, S, C> Clone for ItemLifecycleService<R, S, C>
where
    R: ItemStore,
    S: PresentationSurface,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            presentation: self.presentation.clone(),
            timers: self.timers.clone(),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<R, S, C> ItemLifecycleService<R, S, C>
where
    R: ItemStore + 'static,
    S: PresentationSurface + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new lifecycle service with an empty timer registry.
    #[must_use]
    pub fn new(store: Arc<R>, surface: Arc<S>, clock: Arc<C>, config: EngineConfig) -> Self {
        let presentation = PresentationSync::new(Arc::clone(&store), surface);
        Self {
            store,
            presentation,
            timers: DeletionTimers::new(),
            clock,
            config,
        }
    }

    /// Returns the timer registry.
    #[must_use]
    pub const fn timers(&self) -> &DeletionTimers {
        &self.timers
    }

    /// Returns the presentation sync.
    #[must_use]
    pub const fn presentation(&self) -> &PresentationSync<R, S> {
        &self.presentation
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) const fn store(&self) -> &Arc<R> {
        &self.store
    }

    pub(crate) const fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    /// Retrieves an item by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the lookup fails.
    pub async fn find(&self, id: ItemId) -> LifecycleResult<Option<Item>> {
        Ok(self.store.get_by_id(id).await?)
    }

    /// Creates an item, then renders its detail surface and list entry.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Domain`] when the title is blank or
    /// [`LifecycleError::Store`] when persistence fails.
    pub async fn create_item(&self, request: CreateItemRequest) -> LifecycleResult<Item> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(TrackingDomainError::EmptyTitle.into());
        }
        let draft = ItemDraft {
            kind: request.kind,
            scope: request.scope,
            category: request
                .category
                .map(|category| category.trim().to_owned())
                .filter(|category| !category.is_empty()),
            title: title.to_owned(),
            body: request.body,
            supplementary_text: request.supplementary_text,
            priority: request
                .priority
                .unwrap_or(request.kind.descriptor().default_priority),
            creator: request.creator,
            tags: request.tags,
            due_date: request.due_date,
            created_at: self.clock.utc(),
        };
        let item = self.store.create(draft).await?;
        debug!(item_id = %item.id(), kind = %item.kind(), "created item");
        Ok(self.sync_presentation(item, None).await)
    }

    /// Claims an open item for `actor`.
    ///
    /// At most one of any number of concurrent claims succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store is unavailable.
    pub async fn claim(&self, id: ItemId, actor: &Actor) -> LifecycleResult<TransitionOutcome> {
        let extra = [ItemFieldUpdate::Claimant(Some(actor.clone()))];
        let outcome = self.transition(id, Trigger::Claim, &extra).await?;
        let TransitionOutcome::Applied(item) = outcome else {
            return Ok(outcome);
        };
        let notice = Notice::Claimed(actor.clone());
        Ok(TransitionOutcome::Applied(
            self.sync_presentation(item, Some(notice)).await,
        ))
    }

    /// Resolves an item from `InProgress` or directly from `Open`.
    ///
    /// Clears the claimant and, when the kind cleans up resolved items, arms
    /// the cleanup timer.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store is unavailable.
    pub async fn resolve(&self, id: ItemId, actor: &Actor) -> LifecycleResult<TransitionOutcome> {
        self.close(id, actor, Trigger::Resolve).await
    }

    /// Rejects an item of a kind that supports rejection.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store is unavailable.
    pub async fn reject(&self, id: ItemId, actor: &Actor) -> LifecycleResult<TransitionOutcome> {
        self.close(id, actor, Trigger::Reject).await
    }

    /// Appends free-form commentary regardless of status.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Domain`] when the text is blank or
    /// [`LifecycleError::Store`] when the store is unavailable.
    pub async fn add_update(
        &self,
        id: ItemId,
        actor: &Actor,
        text: &str,
    ) -> LifecycleResult<TransitionOutcome> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TrackingDomainError::EmptyUpdateText.into());
        }
        let entry = UpdateEntry {
            author: actor.clone(),
            text: trimmed.to_owned(),
            created_at: self.clock.utc(),
        };
        let Some(item) = self
            .store
            .append_to_log(id, LogEntry::Update(entry.clone()))
            .await?
        else {
            return Ok(TransitionOutcome::NotFound);
        };
        if let Err(error) = self.presentation.post_update(&item, &entry).await {
            log_desync(id, "post update", &error);
        }
        Ok(TransitionOutcome::Applied(item))
    }

    /// Returns a terminal item to `Open`.
    ///
    /// Cancels any armed cleanup, clears the claimant, and records the reopen.
    /// A surviving detail surface gets a notice and an in-place re-render; a
    /// missing one is recreated with a full history replay.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store is unavailable.
    pub async fn reopen(&self, id: ItemId, actor: &Actor) -> LifecycleResult<TransitionOutcome> {
        let Some(current) = self.store.get_by_id(id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let Some(rule) = current.kind().descriptor().rule(Trigger::Reopen) else {
            return Ok(TransitionOutcome::NotReopenable);
        };
        if !rule.accepts(current.status()) {
            return Ok(TransitionOutcome::NotReopenable);
        }
        let extra = [
            ItemFieldUpdate::Claimant(None),
            ItemFieldUpdate::DeletionArmedAt(None),
        ];
        let swap = self
            .store
            .compare_and_set_status(id, current.status(), rule.to, &extra)
            .await?;
        let StatusSwap::Swapped(_) = swap else {
            return Ok(TransitionOutcome::NotReopenable);
        };
        if self.timers.cancel(id) {
            debug!(item_id = %id, "cancelled cleanup timer on reopen");
        }
        let entry = ReopenEntry {
            author: actor.clone(),
            reopened_at: self.clock.utc(),
        };
        let Some(reopened) = self
            .store
            .append_to_log(id, LogEntry::Reopen(entry))
            .await?
        else {
            return Ok(TransitionOutcome::NotFound);
        };
        debug!(item_id = %id, from = %current.status(), "reopened item");
        Ok(TransitionOutcome::Applied(
            self.sync_reopened(reopened, actor).await,
        ))
    }

    /// Creates missing detail surfaces and reposts the list view oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store is unavailable.
    /// Surface failures are logged and end the pass early.
    pub async fn backfill(&self, kind: ItemKind, scope: &ScopeId) -> LifecycleResult<BackfillReport> {
        match self.presentation.backfill(kind, scope).await {
            Ok(report) => Ok(report),
            Err(PresentationError::Store(error)) => Err(error.into()),
            Err(error) => {
                warn!(kind = %kind, scope = %scope, error = %error, "backfill stopped early");
                Ok(BackfillReport::default())
            }
        }
    }

    /// Runs a cleanup for an item armed in `armed_status`.
    ///
    /// Re-fetches the item and proceeds only if it is still in `armed_status`
    /// with deletion armed; otherwise this is a silent no-op. The deletion
    /// mark is cleared by a compare-and-set on `armed_status` before the
    /// detail surface is deleted, so a reopen that already landed wins. On
    /// success the surface references are cleared and the list entry is
    /// re-rendered. A reopen that lands while the surface is being deleted
    /// gets its detail surface rebuilt with a history replay.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when the store is unavailable.
    pub async fn run_cleanup(
        &self,
        id: ItemId,
        armed_status: ItemStatus,
    ) -> LifecycleResult<CleanupOutcome> {
        let Some(item) = self.store.get_by_id(id).await? else {
            debug!(item_id = %id, "cleanup fired for missing item");
            return Ok(CleanupOutcome::Stale);
        };
        let Some(armed_at) = item.deletion_armed_at() else {
            debug!(item_id = %id, "cleanup fired without a deletion mark");
            return Ok(CleanupOutcome::Stale);
        };
        let disarm = [ItemFieldUpdate::DeletionArmedAt(None)];
        let claimed = self
            .store
            .compare_and_set_status(id, armed_status, armed_status, &disarm)
            .await?;
        let Some(claimed_item) = claimed.into_item() else {
            debug!(
                item_id = %id,
                armed_status = %armed_status,
                status = %item.status(),
                "cleanup fired on stale state"
            );
            return Ok(CleanupOutcome::Stale);
        };
        match self.presentation.delete_detail_surface(&claimed_item).await {
            Ok(_) => {}
            Err(PresentationError::Store(error)) => return Err(error.into()),
            Err(error) => {
                warn!(item_id = %id, error = %error, "detail surface deletion failed");
                let rearm = [ItemFieldUpdate::DeletionArmedAt(Some(armed_at))];
                self.store
                    .compare_and_set_status(id, armed_status, armed_status, &rearm)
                    .await?;
                return Ok(CleanupOutcome::SurfaceRetained);
            }
        }
        let Some(current) = self.store.get_by_id(id).await? else {
            return Ok(CleanupOutcome::Stale);
        };
        if current.status() != armed_status {
            info!(item_id = %id, status = %current.status(), "item reopened during cleanup");
            let replayed = self
                .presentation
                .replay_history(current.clone())
                .await
                .unwrap_or_else(|error| {
                    log_desync(id, "replay history", &error);
                    current
                });
            return Ok(CleanupOutcome::Reopened(self.relist(replayed).await));
        }
        let mut cleared = current;
        for update in [
            ItemFieldUpdate::DetailSurface(None),
            ItemFieldUpdate::DetailMessage(None),
            ItemFieldUpdate::ReplayMessage(None),
        ] {
            let Some(updated) = self.store.set_field(id, update).await? else {
                return Ok(CleanupOutcome::Stale);
            };
            cleared = updated;
        }
        let listed = self.relist(cleared).await;
        info!(item_id = %id, kind = %listed.kind(), "cleaned up detail surface");
        Ok(CleanupOutcome::Cleaned(listed))
    }

    /// Arms the cleanup timer for an item entering `armed_status`.
    pub(crate) fn arm_cleanup(
        &self,
        id: ItemId,
        armed_status: ItemStatus,
        delay: std::time::Duration,
    ) {
        let service = self.clone();
        self.timers.arm(id, delay, move || async move {
            if let Err(error) = service.run_cleanup(id, armed_status).await {
                warn!(item_id = %id, error = %error, "cleanup failed");
            }
        });
    }

    async fn close(
        &self,
        id: ItemId,
        actor: &Actor,
        trigger: Trigger,
    ) -> LifecycleResult<TransitionOutcome> {
        let Some(current) = self.store.get_by_id(id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let descriptor = current.kind().descriptor();
        let Some(rule) = descriptor.rule(trigger) else {
            return Ok(TransitionOutcome::guard_for(trigger));
        };
        let arms_cleanup = descriptor.is_cleanup_eligible(rule.to);
        let armed_at = arms_cleanup.then(|| self.clock.utc());
        let extra = [
            ItemFieldUpdate::Claimant(None),
            ItemFieldUpdate::DeletionArmedAt(armed_at),
        ];
        let Some(item) = self.swap_from_any(id, rule, &extra).await? else {
            return Ok(TransitionOutcome::guard_for(trigger));
        };
        if arms_cleanup {
            self.arm_cleanup(id, rule.to, self.config.delete_delay(item.kind()));
        }
        let notice = if trigger == Trigger::Reject {
            Notice::Rejected(actor.clone())
        } else {
            Notice::Resolved(actor.clone())
        };
        Ok(TransitionOutcome::Applied(
            self.sync_presentation(item, Some(notice)).await,
        ))
    }

    async fn transition(
        &self,
        id: ItemId,
        trigger: Trigger,
        extra: &[ItemFieldUpdate],
    ) -> LifecycleResult<TransitionOutcome> {
        let Some(current) = self.store.get_by_id(id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let Some(rule) = current.kind().descriptor().rule(trigger) else {
            return Ok(TransitionOutcome::guard_for(trigger));
        };
        Ok(self
            .swap_from_any(id, rule, extra)
            .await?
            .map_or(TransitionOutcome::guard_for(trigger), TransitionOutcome::Applied))
    }

    /// Attempts the rule's swap from each source state in order.
    async fn swap_from_any(
        &self,
        id: ItemId,
        rule: &TransitionRule,
        extra: &[ItemFieldUpdate],
    ) -> LifecycleResult<Option<Item>> {
        for from in rule.from {
            let swap = self
                .store
                .compare_and_set_status(id, *from, rule.to, extra)
                .await?;
            if let Some(item) = swap.into_item() {
                debug!(
                    item_id = %id,
                    trigger = %rule.trigger,
                    from = %from,
                    to = %rule.to,
                    "status swapped"
                );
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    async fn sync_presentation(&self, item: Item, notice: Option<Notice>) -> Item {
        let id = item.id();
        if let Some(notice) = notice
            && let Err(error) = self.presentation.post_notice(&item, &notice).await
        {
            log_desync(id, "post notice", &error);
        }
        let rendered = self
            .presentation
            .render_detail(item.clone())
            .await
            .unwrap_or_else(|error| {
                log_desync(id, "render detail", &error);
                item
            });
        self.relist(rendered).await
    }

    async fn relist(&self, item: Item) -> Item {
        let id = item.id();
        self.presentation
            .update_list_entry(item.clone())
            .await
            .unwrap_or_else(|error| {
                log_desync(id, "update list entry", &error);
                item
            })
    }

    async fn sync_reopened(&self, item: Item, actor: &Actor) -> Item {
        let id = item.id();
        let live = self
            .presentation
            .live_detail_surface(&item)
            .await
            .unwrap_or_else(|error| {
                log_desync(id, "check detail surface", &error);
                None
            })
            .is_some();
        if live {
            return self
                .sync_presentation(item, Some(Notice::Reopened(actor.clone())))
                .await;
        }
        let replayed = self
            .presentation
            .replay_history(item.clone())
            .await
            .unwrap_or_else(|error| {
                log_desync(id, "replay history", &error);
                item
            });
        self.relist(replayed).await
    }
}

fn log_desync(id: ItemId, step: &str, error: &PresentationError) {
    warn!(item_id = %id, step, error = %error, "presentation out of sync");
}
