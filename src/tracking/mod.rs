//! Tracked item lifecycle management.
//!
//! Bugs, todos, features, and ideas share one parametrized state machine.
//! Each kind is data: a [`domain::KindDescriptor`] names its labels, its
//! enabled transitions, and which terminal states schedule cleanup of the
//! item's detail surface. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
