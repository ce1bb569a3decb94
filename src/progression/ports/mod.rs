//! Port contracts for progression persistence.

pub mod store;

pub use store::{ProgressionStore, ProgressionStoreError, ProgressionStoreResult};
