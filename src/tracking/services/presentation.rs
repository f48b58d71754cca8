//! Presentation sync: keeps detail and list surfaces in step with the store.
//!
//! Surfaces are reconciled through the message references stored on the
//! item. Existing messages are edited in place; a message that is gone or
//! cannot be edited is reposted and its reference replaced.

use super::render::{ItemRenderer, Notice, RenderError};
use crate::tracking::{
    domain::{
        Item, ItemFieldUpdate, ItemId, ItemKind, MessageContent, MessageId, ScopeId, SurfaceId,
        UpdateEntry, category_name, detail_surface_name, surface_suffix_hint,
    },
    ports::{
        DetailSurfaceRequest, ItemStore, ItemStoreError, PresentationSurface, SurfaceError,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while syncing presentation surfaces.
#[derive(Debug, Error)]
pub enum PresentationError {
    /// A surface call failed.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    /// A store call failed.
    #[error(transparent)]
    Store(#[from] ItemStoreError),
    /// A template failed to render.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The item was removed from the store mid-sync.
    #[error("item {0} disappeared during presentation sync")]
    ItemMissing(ItemId),
}

/// Result type for presentation sync.
pub type PresentationResult<T> = Result<T, PresentationError>;

/// Summary of a backfill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Detail surfaces created for items that lacked one.
    pub surfaces_created: usize,
    /// List entries posted, oldest item first.
    pub list_entries_posted: usize,
}

/// Renders item state onto detail and list surfaces.
pub struct PresentationSync<R, S>
where
    R: ItemStore,
    S: PresentationSurface,
{
    store: Arc<R>,
    surface: Arc<S>,
    renderer: Arc<ItemRenderer>,
}

impl<R, S> Clone for PresentationSync<R, S>
where
    R: ItemStore,
    S: PresentationSurface,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            surface: Arc::clone(&self.surface),
            renderer: Arc::clone(&self.renderer),
        }
    }
}

impl<R, S> PresentationSync<R, S>
where
    R: ItemStore,
    S: PresentationSurface,
{
    /// Creates a presentation sync over a store and a surface.
    #[must_use]
    pub fn new(store: Arc<R>, surface: Arc<S>) -> Self {
        Self {
            store,
            surface,
            renderer: Arc::new(ItemRenderer::new()),
        }
    }

    /// Returns the underlying surface.
    #[must_use]
    pub const fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    /// Returns the renderer.
    #[must_use]
    pub fn renderer(&self) -> &ItemRenderer {
        &self.renderer
    }

    async fn set(&self, id: ItemId, update: ItemFieldUpdate) -> PresentationResult<Item> {
        self.store
            .set_field(id, update)
            .await?
            .ok_or(PresentationError::ItemMissing(id))
    }

    /// Returns the item's detail surface if it still exists.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError::Surface`] when the existence check fails.
    pub async fn live_detail_surface(&self, item: &Item) -> PresentationResult<Option<SurfaceId>> {
        let Some(surface) = item.presentation().detail_surface_id.as_ref() else {
            return Ok(None);
        };
        if self.surface.surface_exists(surface).await? {
            Ok(Some(surface.clone()))
        } else {
            Ok(None)
        }
    }

    /// Returns the item's live detail surface, creating one when needed.
    ///
    /// A new surface invalidates the stored detail and replay message
    /// references, which are cleared before the surface reference is stored.
    async fn ensure_detail_surface(&self, item: Item) -> PresentationResult<(Item, SurfaceId)> {
        if let Some(surface) = self.live_detail_surface(&item).await? {
            return Ok((item, surface));
        }
        let request = DetailSurfaceRequest {
            scope: item.scope().clone(),
            kind: item.kind(),
            category_name: category_name(item.kind(), item.category()),
            surface_name: detail_surface_name(item.kind(), item.title()),
            suffix_hint: surface_suffix_hint(item.id()),
        };
        let surface = self.surface.create_detail_surface(&request).await?;
        let id = item.id();
        self.set(id, ItemFieldUpdate::DetailMessage(None)).await?;
        self.set(id, ItemFieldUpdate::ReplayMessage(None)).await?;
        let updated = self
            .set(id, ItemFieldUpdate::DetailSurface(Some(surface.clone())))
            .await?;
        debug!(item_id = %id, surface = %surface, "created detail surface");
        Ok((updated, surface))
    }

    /// Makes the message in `slot` show `content`, reposting when needed.
    async fn reconcile_message(
        &self,
        item: Item,
        surface: &SurfaceId,
        current: Option<MessageId>,
        content: &MessageContent,
        slot: fn(Option<MessageId>) -> ItemFieldUpdate,
    ) -> PresentationResult<Item> {
        if let Some(message) = current {
            match self.surface.fetch_message(surface, &message).await {
                Ok(Some(existing)) if existing == *content => return Ok(item),
                Ok(Some(_)) => match self.surface.edit_message(surface, &message, content).await {
                    Ok(()) => return Ok(item),
                    Err(error) => warn!(
                        item_id = %item.id(),
                        message = %message,
                        error = %error,
                        "editing detail message failed; reposting"
                    ),
                },
                Ok(None) => warn!(
                    item_id = %item.id(),
                    message = %message,
                    "detail message is gone; reposting"
                ),
                Err(error) => warn!(
                    item_id = %item.id(),
                    message = %message,
                    error = %error,
                    "fetching detail message failed; reposting"
                ),
            }
        }
        let posted = self.surface.post_message(surface, content).await?;
        self.set(item.id(), slot(Some(posted))).await
    }

    async fn sync_detail(&self, item: Item) -> PresentationResult<(Item, SurfaceId)> {
        let (with_surface, surface) = self.ensure_detail_surface(item).await?;
        let content = self.renderer.detail_view(&with_surface)?;
        let current = with_surface.presentation().detail_message_id.clone();
        let updated = self
            .reconcile_message(
                with_surface,
                &surface,
                current,
                &content,
                ItemFieldUpdate::DetailMessage,
            )
            .await?;
        Ok((updated, surface))
    }

    /// Renders the detail view, creating the detail surface once.
    ///
    /// Idempotent: when the stored detail message already shows the current
    /// state, nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError`] when a surface or store call fails.
    pub async fn render_detail(&self, item: Item) -> PresentationResult<Item> {
        self.sync_detail(item).await.map(|(updated, _)| updated)
    }

    /// Edits the item's list entry in place, posting a new one on failure.
    ///
    /// Scopes without a list surface are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError`] when posting the replacement entry or
    /// storing its reference fails.
    pub async fn update_list_entry(&self, item: Item) -> PresentationResult<Item> {
        let Some(list) = self.surface.list_surface(item.scope(), item.kind()).await? else {
            return Ok(item);
        };
        let content = self.renderer.list_entry(&item)?;
        if let Some(message) = item.presentation().list_message_id.as_ref() {
            match self.surface.edit_message(&list, message, &content).await {
                Ok(()) => return Ok(item),
                Err(error) => warn!(
                    item_id = %item.id(),
                    message = %message,
                    error = %error,
                    "editing list entry failed; reposting"
                ),
            }
        }
        let posted = self.surface.post_message(&list, &content).await?;
        self.set(item.id(), ItemFieldUpdate::ListMessage(Some(posted)))
            .await
    }

    /// Posts a lifecycle notice to the live detail surface, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError`] when rendering or posting fails.
    pub async fn post_notice(&self, item: &Item, notice: &Notice) -> PresentationResult<()> {
        let Some(surface) = self.live_detail_surface(item).await? else {
            debug!(item_id = %item.id(), "no detail surface for notice");
            return Ok(());
        };
        let content = self.renderer.notice(item, notice)?;
        self.surface.post_message(&surface, &content).await?;
        Ok(())
    }

    /// Posts an update as a new message on the live detail surface, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError`] when rendering or posting fails.
    pub async fn post_update(&self, item: &Item, entry: &UpdateEntry) -> PresentationResult<()> {
        let Some(surface) = self.live_detail_surface(item).await? else {
            debug!(item_id = %item.id(), "no detail surface for update");
            return Ok(());
        };
        let content = self.renderer.update_message(item, entry)?;
        self.surface.post_message(&surface, &content).await?;
        Ok(())
    }

    /// Rebuilds the detail view and merged history on the detail surface.
    ///
    /// The replay flag is raised for the duration so a crash mid-replay is
    /// detected at the next startup. Both messages are reconciled by
    /// reference, so repeated replays never duplicate history.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError`] when a surface or store call fails; the
    /// replay flag then stays raised.
    pub async fn replay_history(&self, item: Item) -> PresentationResult<Item> {
        let id = item.id();
        let flagged = if item.replay_pending() {
            item
        } else {
            self.set(id, ItemFieldUpdate::ReplayPending(true)).await?
        };
        let (rendered, surface) = self.sync_detail(flagged).await?;
        let content = self.renderer.history_block(&rendered)?;
        let current = rendered.presentation().replay_message_id.clone();
        self.reconcile_message(
            rendered,
            &surface,
            current,
            &content,
            ItemFieldUpdate::ReplayMessage,
        )
        .await?;
        let done = self.set(id, ItemFieldUpdate::ReplayPending(false)).await?;
        debug!(item_id = %id, entries = done.history().len(), "replayed history");
        Ok(done)
    }

    /// Deletes the item's detail surface.
    ///
    /// Returns `false` when there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError::Surface`] when deletion fails for a
    /// reason other than the surface already being gone.
    pub async fn delete_detail_surface(&self, item: &Item) -> PresentationResult<bool> {
        let Some(surface) = item.presentation().detail_surface_id.as_ref() else {
            return Ok(false);
        };
        match self.surface.delete_surface(surface).await {
            Ok(()) => Ok(true),
            Err(SurfaceError::NotFound) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    /// Creates missing detail surfaces and reposts the whole list view.
    ///
    /// Non-terminal items without a live detail surface get one. Every list
    /// reference in the scope is then cleared and reissued oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError`] on the first failing store or surface
    /// call.
    pub async fn backfill(
        &self,
        kind: ItemKind,
        scope: &ScopeId,
    ) -> PresentationResult<BackfillReport> {
        let mut items = self.store.query_by_scope(kind, scope).await?;
        items.sort_by_key(|item| (item.created_at(), item.id()));

        let mut report = BackfillReport::default();
        for slot in &mut items {
            if slot.status().is_terminal() || self.live_detail_surface(slot).await?.is_some() {
                continue;
            }
            *slot = self.render_detail(slot.clone()).await?;
            report.surfaces_created += 1;
        }

        for item in items {
            let cleared = self
                .set(item.id(), ItemFieldUpdate::ListMessage(None))
                .await?;
            let posted = self.update_list_entry(cleared).await?;
            if posted.presentation().list_message_id.is_some() {
                report.list_entries_posted += 1;
            }
        }

        info!(
            kind = %kind,
            scope = %scope,
            surfaces_created = report.surfaces_created,
            list_entries_posted = report.list_entries_posted,
            "backfill complete"
        );
        Ok(report)
    }
}
