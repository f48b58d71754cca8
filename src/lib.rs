//! Itemflow: lifecycle engine for tracked work items.
//!
//! This crate manages user-reported items (bugs, todos, features, ideas)
//! through a shared status machine. Status changes are atomic
//! compare-and-set writes against a store. Each item's state is mirrored
//! onto an external detail surface and a scope-wide list view, and detail
//! surfaces of closed items are cleaned up after a configurable delay.
//!
//! # Architecture
//!
//! Itemflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure lifecycle rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the store and the chat surface
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`tracking`]: Item lifecycle, presentation sync, cleanup, and recovery
//! - [`config`]: Engine configuration

pub mod config;
pub mod tracking;
