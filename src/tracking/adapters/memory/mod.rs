//! In-memory adapters for the tracking ports.

mod store;
mod surface;

pub use store::InMemoryItemStore;
pub use surface::InMemorySurface;
