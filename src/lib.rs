//! Taskquest: event-sourced task lifecycle with XP progression.
//!
//! Employees pick tasks from a catalog, submit their work, and, where the
//! assignment requires it, have it approved or rejected. Every change is an
//! event appended to a per-task stream with optimistic concurrency; current
//! state is always a replay of those events. Completed tasks earn the
//! assignee XP, from which employee and skill levels are derived.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Command handlers, queries, and projections
//!
//! # Modules
//!
//! - [`task`]: Catalog, task aggregate, event store, commands, and read models
//! - [`progression`]: XP projection, levels, and skill summaries

pub mod progression;
pub mod task;
