//! Employee progression: XP, levels, and skills earned by completing tasks.
//!
//! Progression is a read-side projection of the task event stream. It can be
//! updated incrementally by registering [`services::ProgressionProjector`] as
//! a task event observer, or rebuilt at any time by replaying the whole log.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Projection services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
