//! Application services that maintain and read employee progression.

mod error;
mod projector;

pub use error::{ProgressionError, ProgressionResult};
pub use projector::{ProgressionProjector, ProjectorPolicy};
