//! `PostgreSQL` adapters for task lifecycle persistence.

mod catalog;
mod event_store;
mod models;
mod schema;

pub use catalog::PostgresTaskCatalog;
pub use event_store::{PostgresTaskEventStore, TaskPgPool};
