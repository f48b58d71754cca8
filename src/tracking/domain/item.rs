//! Tracked item aggregate root and related value types.

use super::{
    Actor, ActorId, HistoryEntry, ItemId, ItemKind, ItemStatus, MessageId,
    ParseCreatorPlatformError, ParsePriorityError, ScopeId, SurfaceId, TrackingDomainError,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority or severity of an item; immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Minor.
    Low,
    /// Default.
    Medium,
    /// Important.
    High,
    /// Blocking.
    Critical,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" | "normal" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Surface through which an item was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatorPlatform {
    /// Chat command or UI interaction.
    Chat,
    /// External API call.
    Api,
    /// Inbound webhook delivery.
    Webhook,
}

impl CreatorPlatform {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Api => "api",
            Self::Webhook => "webhook",
        }
    }
}

impl TryFrom<&str> for CreatorPlatform {
    type Error = ParseCreatorPlatformError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "api" => Ok(Self::Api),
            "webhook" => Ok(Self::Webhook),
            _ => Err(ParseCreatorPlatformError(value.to_owned())),
        }
    }
}

/// Who created an item and through which surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Originating surface.
    pub platform: CreatorPlatform,
    /// Platform identity, when the creator is a chat user.
    pub actor_id: Option<ActorId>,
    /// Human-readable name.
    pub display_name: String,
}

impl Creator {
    /// Creator for an item reported by a chat user.
    #[must_use]
    pub fn chat(actor: &Actor) -> Self {
        Self {
            platform: CreatorPlatform::Chat,
            actor_id: Some(actor.id.clone()),
            display_name: actor.display_name.clone(),
        }
    }

    /// Creator for an item reported by a non-chat actor.
    #[must_use]
    pub fn external(platform: CreatorPlatform, display_name: impl Into<String>) -> Self {
        Self {
            platform,
            actor_id: None,
            display_name: display_name.into(),
        }
    }
}

/// Free-form commentary appended to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEntry {
    /// Author of the update.
    pub author: Actor,
    /// Update text.
    pub text: String,
    /// When the update was recorded.
    pub created_at: DateTime<Utc>,
}

/// Record of one reopen transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReopenEntry {
    /// Actor who reopened the item.
    pub author: Actor,
    /// When the item was reopened.
    pub reopened_at: DateTime<Utc>,
}

/// An entry for one of the append-only logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "log", rename_all = "snake_case")]
pub enum LogEntry {
    /// Append to the update log.
    Update(UpdateEntry),
    /// Append to the reopen log.
    Reopen(ReopenEntry),
}

/// References to the external surfaces rendering an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationRefs {
    /// Detail surface (channel) dedicated to the item.
    pub detail_surface_id: Option<SurfaceId>,
    /// Detail view message on the detail surface.
    pub detail_message_id: Option<MessageId>,
    /// Entry on the scope-wide list surface.
    pub list_message_id: Option<MessageId>,
    /// History replay message on the detail surface.
    pub replay_message_id: Option<MessageId>,
}

/// A single-field write, used by `set_field` and as compare-and-set extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFieldUpdate {
    /// Sets or clears the detail surface reference.
    DetailSurface(Option<SurfaceId>),
    /// Sets or clears the detail message reference.
    DetailMessage(Option<MessageId>),
    /// Sets or clears the list entry reference.
    ListMessage(Option<MessageId>),
    /// Sets or clears the replay message reference.
    ReplayMessage(Option<MessageId>),
    /// Sets or clears the claimant.
    Claimant(Option<Actor>),
    /// Sets or clears the deletion-armed timestamp.
    DeletionArmedAt(Option<DateTime<Utc>>),
    /// Sets the replay-in-flight flag.
    ReplayPending(bool),
}

/// Validated creation fields handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    /// Item kind.
    pub kind: ItemKind,
    /// Owning community.
    pub scope: ScopeId,
    /// Optional grouping key (repository name).
    pub category: Option<String>,
    /// Non-empty title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Supplementary text such as reproduction steps.
    pub supplementary_text: String,
    /// Priority or severity.
    pub priority: Priority,
    /// Creator identity and platform.
    pub creator: Creator,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Tracked item aggregate root.
///
/// Instances are snapshots returned by the store. The store is the only
/// writer; the mutators below are crate-internal and exist for in-process
/// store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    scope: ScopeId,
    category: Option<String>,
    title: String,
    body: String,
    supplementary_text: String,
    priority: Priority,
    status: ItemStatus,
    claimant: Option<Actor>,
    creator: Creator,
    tags: Vec<String>,
    due_date: Option<NaiveDate>,
    presentation: PresentationRefs,
    update_log: Vec<UpdateEntry>,
    reopen_log: Vec<ReopenEntry>,
    deletion_armed_at: Option<DateTime<Utc>>,
    replay_pending: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedItemData {
    /// Persisted identifier.
    pub id: ItemId,
    /// Persisted creation fields.
    pub draft: ItemDraft,
    /// Persisted status.
    pub status: ItemStatus,
    /// Persisted claimant.
    pub claimant: Option<Actor>,
    /// Persisted presentation references.
    pub presentation: PresentationRefs,
    /// Persisted update log.
    pub update_log: Vec<UpdateEntry>,
    /// Persisted reopen log.
    pub reopen_log: Vec<ReopenEntry>,
    /// Persisted deletion-armed timestamp.
    pub deletion_armed_at: Option<DateTime<Utc>>,
    /// Persisted replay flag.
    pub replay_pending: bool,
}

impl Item {
    /// Creates a fresh `Open` item from a draft with a store-assigned id.
    #[must_use]
    pub fn from_draft(id: ItemId, draft: ItemDraft) -> Self {
        Self::from_persisted(PersistedItemData {
            id,
            draft,
            status: ItemStatus::Open,
            claimant: None,
            presentation: PresentationRefs::default(),
            update_log: Vec::new(),
            reopen_log: Vec::new(),
            deletion_armed_at: None,
            replay_pending: false,
        })
    }

    /// Reconstructs an item from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedItemData) -> Self {
        let PersistedItemData {
            id,
            draft,
            status,
            claimant,
            presentation,
            update_log,
            reopen_log,
            deletion_armed_at,
            replay_pending,
        } = data;
        Self {
            id,
            kind: draft.kind,
            scope: draft.scope,
            category: draft.category,
            title: draft.title,
            body: draft.body,
            supplementary_text: draft.supplementary_text,
            priority: draft.priority,
            status,
            claimant,
            creator: draft.creator,
            tags: draft.tags,
            due_date: draft.due_date,
            presentation,
            update_log,
            reopen_log,
            deletion_armed_at,
            replay_pending,
            created_at: draft.created_at,
        }
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the item kind.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Returns the owning scope.
    #[must_use]
    pub const fn scope(&self) -> &ScopeId {
        &self.scope
    }

    /// Returns the grouping key, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the supplementary text.
    #[must_use]
    pub fn supplementary_text(&self) -> &str {
        &self.supplementary_text
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ItemStatus {
        self.status
    }

    /// Returns the current claimant, if any.
    #[must_use]
    pub const fn claimant(&self) -> Option<&Actor> {
        self.claimant.as_ref()
    }

    /// Returns the creator.
    #[must_use]
    pub const fn creator(&self) -> &Creator {
        &self.creator
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the presentation references.
    #[must_use]
    pub const fn presentation(&self) -> &PresentationRefs {
        &self.presentation
    }

    /// Returns the update log.
    #[must_use]
    pub fn update_log(&self) -> &[UpdateEntry] {
        &self.update_log
    }

    /// Returns the reopen log.
    #[must_use]
    pub fn reopen_log(&self) -> &[ReopenEntry] {
        &self.reopen_log
    }

    /// Returns when the cleanup timer was armed, if it is armed.
    #[must_use]
    pub const fn deletion_armed_at(&self) -> Option<DateTime<Utc>> {
        self.deletion_armed_at
    }

    /// Returns whether a history replay is in flight.
    #[must_use]
    pub const fn replay_pending(&self) -> bool {
        self.replay_pending
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the update and reopen logs merged in chronological order.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        HistoryEntry::merge(&self.update_log, &self.reopen_log)
    }

    /// Swaps the status when it currently equals `expected`.
    ///
    /// Returns `false`, leaving the item untouched, on mismatch.
    pub(crate) fn swap_status(
        &mut self,
        expected: ItemStatus,
        new_status: ItemStatus,
        extra: &[ItemFieldUpdate],
    ) -> bool {
        if self.status != expected {
            return false;
        }
        self.status = new_status;
        for update in extra {
            self.apply(update.clone());
        }
        true
    }

    /// Appends to one of the logs.
    pub(crate) fn append(&mut self, entry: LogEntry) {
        match entry {
            LogEntry::Update(update) => self.update_log.push(update),
            LogEntry::Reopen(reopen) => self.reopen_log.push(reopen),
        }
    }

    /// Applies a single-field write.
    pub(crate) fn apply(&mut self, update: ItemFieldUpdate) {
        match update {
            ItemFieldUpdate::DetailSurface(value) => self.presentation.detail_surface_id = value,
            ItemFieldUpdate::DetailMessage(value) => self.presentation.detail_message_id = value,
            ItemFieldUpdate::ListMessage(value) => self.presentation.list_message_id = value,
            ItemFieldUpdate::ReplayMessage(value) => self.presentation.replay_message_id = value,
            ItemFieldUpdate::Claimant(value) => self.claimant = value,
            ItemFieldUpdate::DeletionArmedAt(value) => self.deletion_armed_at = value,
            ItemFieldUpdate::ReplayPending(value) => self.replay_pending = value,
        }
    }
}

/// Splits comma-separated tag input, dropping blanks.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parses a `YYYY-MM-DD` due date.
///
/// # Errors
///
/// Returns [`TrackingDomainError::InvalidDueDate`] when the value does not
/// parse.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, TrackingDomainError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| TrackingDomainError::InvalidDueDate(raw.to_owned()))
}
