//! `PostgreSQL` adapters for progression persistence.

mod models;
mod schema;
mod store;

pub use store::{PostgresProgressionStore, ProgressionPgPool};
