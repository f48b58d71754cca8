//! Domain model for tracked item lifecycles.
//!
//! Every item kind shares one status machine. Kinds differ only in the
//! [`KindDescriptor`] data they carry: labels, enabled transitions, and
//! cleanup policy. Nothing in this module performs I/O.

mod content;
mod error;
mod history;
mod ids;
mod item;
mod kind;
mod naming;
mod status;

pub use content::{
    ActionButton, ButtonStyle, Card, CardField, ItemAction, MessageContent, action_custom_id,
    parse_action_custom_id,
};
pub use error::{
    ParseCreatorPlatformError, ParseItemKindError, ParseItemStatusError, ParsePriorityError,
    TrackingDomainError,
};
pub use history::HistoryEntry;
pub use ids::{Actor, ActorId, ItemId, MessageId, ScopeId, SurfaceId};
pub use item::{
    Creator, CreatorPlatform, Item, ItemDraft, ItemFieldUpdate, LogEntry, PersistedItemData,
    PresentationRefs, Priority, ReopenEntry, UpdateEntry, parse_due_date, parse_tags,
};
pub use kind::{ColourScheme, ItemKind, KindDescriptor, StatusLabels};
pub use naming::{MAX_SLUG_LEN, category_name, detail_surface_name, slugify, surface_suffix_hint};
pub use status::{ItemStatus, Trigger, TransitionRule};
