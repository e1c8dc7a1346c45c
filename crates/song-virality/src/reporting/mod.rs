//! Report generation module.
//!
//! Descriptive statistics of a cleaned dataset: per-feature distributions
//! split by the viral label, a correlation matrix over the features and the
//! label, and the most frequent genres among viral songs.
//!
//! # Example
//!
//! ```rust,ignore
//! use song_virality::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_analysis_report(
//!     "data/spotify.csv",
//!     Some("outputs/cleaned_spotify_data.csv"),
//!     &pipeline_result,
//!     &config,
//! )?;
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! ReportGenerator::new("outputs").write_report_to_file(&report, "spotify")?;
//! ```

mod generator;
pub mod genres;
pub mod statistics;

pub use generator::{
    AnalysisReport, CorrelationMatrix, DescriptiveStatistics, FeatureDistribution,
    ReportGenerator, describe_dataset,
};
pub use genres::{GenreCount, rank_viral_genres};
pub use statistics::{DensityCurve, DistributionSummary};
