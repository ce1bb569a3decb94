//! Adapter implementations of progression ports.

pub mod memory;
pub mod postgres;
