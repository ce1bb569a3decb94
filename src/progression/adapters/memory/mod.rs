//! In-memory progression adapters.

mod store;

pub use store::InMemoryProgressionStore;
