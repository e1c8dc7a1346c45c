//! Song Virality Library
//!
//! Cleaning, labeling and descriptive statistics for song popularity
//! datasets, built on Polars.
//!
//! # Overview
//!
//! - **Cleaning**: duplicate removal and dropping rows that miss any
//!   required audio feature
//! - **Normalization**: the `Explicit` column becomes a 0/1 integer flag
//! - **Labeling**: a binary `Viral` column derived from `Popularity`
//! - **Reporting**: per-feature distributions split by the label, a
//!   correlation matrix and the most frequent genres among viral songs
//! - **Progress Reporting**: stage-by-stage updates through a callback
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use song_virality::{Pipeline, PipelineConfig, io};
//! use song_virality::reporting::ReportGenerator;
//!
//! let df = io::load_csv("spotify.csv")?;
//! let config = PipelineConfig::builder().viral_threshold(80.0).build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config.clone())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//!
//! for action in &result.report.actions {
//!     println!("{}", action);
//! }
//!
//! let report = ReportGenerator::build_analysis_report("spotify.csv", None, &result, &config)?;
//! println!("{} viral songs", report.statistics.viral_rows);
//! ```
//!
//! For a single call without progress reporting use [`clean`]:
//!
//! ```rust,ignore
//! let (cleaned, report) = song_virality::clean(df, &PipelineConfig::default())?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod io;
pub mod labeling;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, normalize_explicit};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{Result as ViralityResult, ResultExt, ViralityError};
pub use labeling::derive_viral;
pub use pipeline::{
    CleaningExecutor, ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate, clean,
};
pub use reporting::{AnalysisReport, DescriptiveStatistics, ReportGenerator, describe_dataset};
pub use types::{CleaningReport, ExplicitNormalization, PipelineResult};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};
