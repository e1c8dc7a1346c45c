//! Pipeline module.
//!
//! This module provides the cleaning pipeline and related components.

mod builder;
mod executor;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use executor::{CleaningExecutor, clean};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
