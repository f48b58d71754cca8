//! `PostgreSQL` adapters for tracked item persistence.

mod models;
mod schema;
mod store;

pub use store::{ItemPgPool, PostgresItemStore};
