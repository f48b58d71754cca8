//! In-memory presentation surface.
//!
//! Models a chat platform closely enough to exercise desync handling: tests
//! can delete surfaces or messages behind the engine's back and make edits
//! fail.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::tracking::{
    domain::{ItemKind, MessageContent, MessageId, ScopeId, SurfaceId},
    ports::{DetailSurfaceRequest, PresentationSurface, SurfaceError, SurfaceResult},
};

/// Thread-safe in-memory presentation surface.
#[derive(Debug, Clone, Default)]
pub struct InMemorySurface {
    state: Arc<Mutex<SurfaceState>>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    next_id: u64,
    surfaces: HashMap<SurfaceId, SurfaceRecord>,
    list_surfaces: HashMap<(ScopeId, ItemKind), SurfaceId>,
    fail_edits: bool,
    deny_creation: bool,
}

#[derive(Debug)]
struct SurfaceRecord {
    name: String,
    category: String,
    messages: Vec<(MessageId, MessageContent)>,
}

impl SurfaceState {
    fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn name_taken(&self, category: &str, name: &str) -> bool {
        self.surfaces
            .values()
            .any(|record| record.category == category && record.name == name)
    }

    fn insert_surface(&mut self, name: String, category: String) -> SurfaceResult<SurfaceId> {
        let raw = self.allocate("surface");
        let id = SurfaceId::new(raw).map_err(SurfaceError::transport)?;
        self.surfaces.insert(
            id.clone(),
            SurfaceRecord {
                name,
                category,
                messages: Vec::new(),
            },
        );
        Ok(id)
    }
}

impl InMemorySurface {
    /// Creates an empty surface registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the messages on a surface in posting order.
    #[must_use]
    pub fn messages(&self, surface: &SurfaceId) -> Vec<MessageContent> {
        self.lock()
            .surfaces
            .get(surface)
            .map(|record| {
                record
                    .messages
                    .iter()
                    .map(|(_, content)| content.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the message identifiers on a surface in posting order.
    #[must_use]
    pub fn message_ids(&self, surface: &SurfaceId) -> Vec<MessageId> {
        self.lock()
            .surfaces
            .get(surface)
            .map(|record| record.messages.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns the name a surface was created with.
    #[must_use]
    pub fn surface_name(&self, surface: &SurfaceId) -> Option<String> {
        self.lock()
            .surfaces
            .get(surface)
            .map(|record| record.name.clone())
    }

    /// Returns the category a surface was filed under.
    #[must_use]
    pub fn surface_category(&self, surface: &SurfaceId) -> Option<String> {
        self.lock()
            .surfaces
            .get(surface)
            .map(|record| record.category.clone())
    }

    /// Returns the list surface for a scope and kind, if one was created.
    #[must_use]
    pub fn existing_list_surface(&self, scope: &ScopeId, kind: ItemKind) -> Option<SurfaceId> {
        self.lock()
            .list_surfaces
            .get(&(scope.clone(), kind))
            .cloned()
    }

    /// Deletes a message as a moderator would.
    pub fn remove_message(&self, surface: &SurfaceId, message: &MessageId) -> bool {
        let mut state = self.lock();
        let Some(record) = state.surfaces.get_mut(surface) else {
            return false;
        };
        let before = record.messages.len();
        record.messages.retain(|(id, _)| id != message);
        record.messages.len() != before
    }

    /// Deletes a surface as a moderator would.
    pub fn remove_surface(&self, surface: &SurfaceId) -> bool {
        self.lock().surfaces.remove(surface).is_some()
    }

    /// Makes every subsequent edit fail with a permission error.
    pub fn set_edit_failure(&self, fail: bool) {
        self.lock().fail_edits = fail;
    }

    /// Makes every subsequent detail surface creation fail.
    pub fn set_creation_denied(&self, deny: bool) {
        self.lock().deny_creation = deny;
    }
}

#[async_trait]
impl PresentationSurface for InMemorySurface {
    async fn create_detail_surface(
        &self,
        request: &DetailSurfaceRequest,
    ) -> SurfaceResult<SurfaceId> {
        let mut state = self.lock();
        if state.deny_creation {
            return Err(SurfaceError::PermissionDenied(
                "surface creation denied".to_owned(),
            ));
        }
        let name = if state.name_taken(&request.category_name, &request.surface_name) {
            format!("{}-{}", request.surface_name, request.suffix_hint)
        } else {
            request.surface_name.clone()
        };
        state.insert_surface(name, request.category_name.clone())
    }

    async fn surface_exists(&self, surface: &SurfaceId) -> SurfaceResult<bool> {
        Ok(self.lock().surfaces.contains_key(surface))
    }

    async fn list_surface(
        &self,
        scope: &ScopeId,
        kind: ItemKind,
    ) -> SurfaceResult<Option<SurfaceId>> {
        let mut state = self.lock();
        let key = (scope.clone(), kind);
        if let Some(existing) = state.list_surfaces.get(&key)
            && state.surfaces.contains_key(existing)
        {
            return Ok(Some(existing.clone()));
        }
        let descriptor = kind.descriptor();
        let name = format!("{}-list", descriptor.noun);
        let id = state.insert_surface(name, descriptor.plural_title.to_owned())?;
        state.list_surfaces.insert(key, id.clone());
        Ok(Some(id))
    }

    async fn post_message(
        &self,
        surface: &SurfaceId,
        content: &MessageContent,
    ) -> SurfaceResult<MessageId> {
        let mut state = self.lock();
        let raw = state.allocate("message");
        let id = MessageId::new(raw).map_err(SurfaceError::transport)?;
        let record = state
            .surfaces
            .get_mut(surface)
            .ok_or(SurfaceError::NotFound)?;
        record.messages.push((id.clone(), content.clone()));
        Ok(id)
    }

    async fn edit_message(
        &self,
        surface: &SurfaceId,
        message: &MessageId,
        content: &MessageContent,
    ) -> SurfaceResult<()> {
        let mut state = self.lock();
        if state.fail_edits {
            return Err(SurfaceError::PermissionDenied("edit denied".to_owned()));
        }
        let slot = state
            .surfaces
            .get_mut(surface)
            .and_then(|record| record.messages.iter_mut().find(|(id, _)| id == message))
            .ok_or(SurfaceError::NotFound)?;
        slot.1 = content.clone();
        Ok(())
    }

    async fn delete_surface(&self, surface: &SurfaceId) -> SurfaceResult<()> {
        self.lock()
            .surfaces
            .remove(surface)
            .map(|_| ())
            .ok_or(SurfaceError::NotFound)
    }

    async fn fetch_message(
        &self,
        surface: &SurfaceId,
        message: &MessageId,
    ) -> SurfaceResult<Option<MessageContent>> {
        Ok(self.lock().surfaces.get(surface).and_then(|record| {
            record
                .messages
                .iter()
                .find(|(id, _)| id == message)
                .map(|(_, content)| content.clone())
        }))
    }
}
