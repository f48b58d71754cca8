//! Application services for tracked item lifecycles.

mod lifecycle;
mod presentation;
mod recovery;
mod render;
mod timers;

pub use lifecycle::{
    CleanupOutcome, CreateItemRequest, ItemLifecycleService, LifecycleError, LifecycleResult,
    TransitionOutcome,
};
pub use presentation::{BackfillReport, PresentationError, PresentationResult, PresentationSync};
pub use recovery::{RecoveryReport, RecoveryService, remaining_delay};
pub use render::{ItemRenderer, Notice, RenderError, RenderResult};
pub use timers::DeletionTimers;
