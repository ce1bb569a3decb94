//! In-memory adapters for task lifecycle ports.

mod catalog;
mod event_store;

pub use catalog::InMemoryTaskCatalog;
pub use event_store::InMemoryTaskEventStore;
