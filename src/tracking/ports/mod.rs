//! Port contracts for tracked item lifecycles.
//!
//! Ports define infrastructure-agnostic interfaces used by tracking services.

pub mod store;
pub mod surface;

#[cfg(test)]
pub use store::MockItemStore;
pub use store::{ItemStore, ItemStoreError, ItemStoreResult, StatusSwap};
pub use surface::{DetailSurfaceRequest, PresentationSurface, SurfaceError, SurfaceResult};
