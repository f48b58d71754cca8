//! Presentation surface port.
//!
//! Surfaces are external and externally mutable: a moderator or the platform
//! may delete a channel or message at any time. Callers treat every failure as
//! "the surface may be stale".

use crate::tracking::domain::{ItemKind, MessageContent, MessageId, ScopeId, SurfaceId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for presentation surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Parameters for creating an item's detail surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSurfaceRequest {
    /// Owning community.
    pub scope: ScopeId,
    /// Kind of the item the surface belongs to.
    pub kind: ItemKind,
    /// Category the surface is filed under, such as `Bugs: widgets`.
    pub category_name: String,
    /// Preferred surface name, such as `bug-crash-on-save`.
    pub surface_name: String,
    /// Suffix to append when the preferred name is taken.
    pub suffix_hint: String,
}

/// Chat-platform presentation contract.
#[async_trait]
pub trait PresentationSurface: Send + Sync {
    /// Creates a detail surface, creating its category when needed.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::PermissionDenied`] when the platform refuses
    /// the creation.
    async fn create_detail_surface(&self, request: &DetailSurfaceRequest)
    -> SurfaceResult<SurfaceId>;

    /// Returns whether the surface still exists.
    async fn surface_exists(&self, surface: &SurfaceId) -> SurfaceResult<bool>;

    /// Returns the scope-wide list surface for `kind`, if one is configured.
    async fn list_surface(&self, scope: &ScopeId, kind: ItemKind)
    -> SurfaceResult<Option<SurfaceId>>;

    /// Posts a new message.
    async fn post_message(
        &self,
        surface: &SurfaceId,
        content: &MessageContent,
    ) -> SurfaceResult<MessageId>;

    /// Replaces the content of an existing message.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::NotFound`] when the message or surface is gone.
    async fn edit_message(
        &self,
        surface: &SurfaceId,
        message: &MessageId,
        content: &MessageContent,
    ) -> SurfaceResult<()>;

    /// Deletes a surface and everything on it.
    async fn delete_surface(&self, surface: &SurfaceId) -> SurfaceResult<()>;

    /// Fetches the current content of a message.
    ///
    /// Returns `None` when the message or surface is gone.
    async fn fetch_message(
        &self,
        surface: &SurfaceId,
        message: &MessageId,
    ) -> SurfaceResult<Option<MessageContent>>;
}

/// Errors returned by presentation surface implementations.
#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    /// The surface or message no longer exists.
    #[error("surface or message not found")]
    NotFound,

    /// The platform rejected the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Transport-layer failure.
    #[error("surface transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl SurfaceError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
