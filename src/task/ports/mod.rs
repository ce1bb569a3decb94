//! Port contracts for the task lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod catalog;
pub mod event_store;
pub mod observer;

pub use catalog::{CatalogError, CatalogResult, TaskCatalog};
pub use event_store::{EventStoreError, EventStoreResult, TaskEventStore};
pub use observer::{ObserverError, TaskEventObserver};
