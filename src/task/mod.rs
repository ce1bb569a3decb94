//! Task catalog, event-sourced task lifecycle, and task read models.
//!
//! An employee picks a catalog task, works on it, submits it, and, when the
//! assignment requires it, a reviewer approves or rejects the submission.
//! Every change is an appended [`domain::TaskEvent`]; current state is always
//! derived by replaying those events. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Command and query services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
