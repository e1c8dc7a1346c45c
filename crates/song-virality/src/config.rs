//! Configuration types for the cleaning pipeline.
//!
//! The defaults describe the Spotify song dataset: ten required feature
//! columns, a `Popularity` threshold of 80 for the `Viral` label and a top-10
//! genre ranking. Use [`PipelineConfig::builder()`] to override any of them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Columns that must be present and non-missing on every surviving row.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "Popularity",
    "Energy",
    "Danceability",
    "Positiveness",
    "Speechiness",
    "Liveness",
    "Acousticness",
    "Instrumentalness",
    "Tempo",
    "Loudness (db)",
];

/// Numeric features summarised by the descriptive report.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "Energy",
    "Danceability",
    "Positiveness",
    "Speechiness",
    "Liveness",
    "Acousticness",
    "Instrumentalness",
    "Tempo",
    "Loudness (db)",
];

pub const DEFAULT_VIRAL_THRESHOLD: f64 = 80.0;
pub const DEFAULT_TOP_GENRES: usize = 10;
pub const DEFAULT_KDE_POINTS: usize = 200;
pub const DEFAULT_OUTPUT_NAME: &str = "cleaned_spotify_data";

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// Configuration for the cleaning pipeline and the descriptive report.
///
/// # Example
///
/// ```rust,ignore
/// use song_virality::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .viral_threshold(75.0)
///     .top_genres(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Columns that must exist, and rows missing any of them are dropped.
    pub required_columns: Vec<String>,

    /// Numeric columns summarised per `Viral` group and correlated.
    pub feature_columns: Vec<String>,

    /// Column the `Viral` label is derived from.
    /// Default: "Popularity"
    pub popularity_column: String,

    /// Optional explicit-content flag column normalized to 0/1.
    /// Default: "Explicit"
    pub explicit_column: String,

    /// Optional genre column used for the viral genre ranking.
    /// Default: "Genre"
    pub genre_column: String,

    /// Name of the derived label column.
    /// Default: "Viral"
    pub viral_column: String,

    /// A row is viral when popularity is at least this value.
    /// Default: 80.0
    pub viral_threshold: f64,

    /// Whether to remove exact duplicate rows.
    /// Default: true
    pub remove_duplicates: bool,

    /// How many genres the viral ranking keeps.
    /// Default: 10
    pub top_genres: usize,

    /// Number of grid points in each density curve.
    /// Default: 200
    pub kde_points: usize,

    /// Output directory for the cleaned file and reports.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// Output file name (without extension).
    /// Default: "cleaned_spotify_data"
    pub output_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            required_columns: owned(&REQUIRED_COLUMNS),
            feature_columns: owned(&FEATURE_COLUMNS),
            popularity_column: "Popularity".to_string(),
            explicit_column: "Explicit".to_string(),
            genre_column: "Genre".to_string(),
            viral_column: "Viral".to_string(),
            viral_threshold: DEFAULT_VIRAL_THRESHOLD,
            remove_duplicates: true,
            top_genres: DEFAULT_TOP_GENRES,
            kde_points: DEFAULT_KDE_POINTS,
            output_dir: PathBuf::from("outputs"),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Path of the exported CSV file.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.output_name))
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.required_columns.is_empty() {
            return Err(ConfigValidationError::NoRequiredColumns);
        }

        let mut seen = HashSet::new();
        for column in &self.required_columns {
            if !seen.insert(column.as_str()) {
                return Err(ConfigValidationError::DuplicateColumn(column.clone()));
            }
        }

        if !seen.contains(self.popularity_column.as_str()) {
            return Err(ConfigValidationError::PopularityNotRequired(
                self.popularity_column.clone(),
            ));
        }

        if !self.viral_threshold.is_finite() {
            return Err(ConfigValidationError::InvalidThreshold(self.viral_threshold));
        }

        if self.top_genres == 0 {
            return Err(ConfigValidationError::InvalidTopGenres(self.top_genres));
        }

        if self.kde_points < 2 {
            return Err(ConfigValidationError::InvalidKdePoints(self.kde_points));
        }

        if self.output_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyOutputName);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("At least one required column must be configured")]
    NoRequiredColumns,

    #[error("Column '{0}' is listed more than once in required columns")]
    DuplicateColumn(String),

    #[error("Popularity column '{0}' must be one of the required columns")]
    PopularityNotRequired(String),

    #[error("Invalid viral threshold: {0} (must be a finite number)")]
    InvalidThreshold(f64),

    #[error("Invalid top genres count: {0} (must be at least 1)")]
    InvalidTopGenres(usize),

    #[error("Invalid density grid size: {0} (must be at least 2)")]
    InvalidKdePoints(usize),

    #[error("Output name must not be empty")]
    EmptyOutputName,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    required_columns: Option<Vec<String>>,
    feature_columns: Option<Vec<String>>,
    popularity_column: Option<String>,
    explicit_column: Option<String>,
    genre_column: Option<String>,
    viral_column: Option<String>,
    viral_threshold: Option<f64>,
    remove_duplicates: Option<bool>,
    top_genres: Option<usize>,
    kde_points: Option<usize>,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
}

impl PipelineConfigBuilder {
    /// Replace the set of required feature columns.
    pub fn required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the set of features summarised in the report.
    pub fn feature_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn popularity_column(mut self, column: impl Into<String>) -> Self {
        self.popularity_column = Some(column.into());
        self
    }

    pub fn explicit_column(mut self, column: impl Into<String>) -> Self {
        self.explicit_column = Some(column.into());
        self
    }

    pub fn genre_column(mut self, column: impl Into<String>) -> Self {
        self.genre_column = Some(column.into());
        self
    }

    pub fn viral_column(mut self, column: impl Into<String>) -> Self {
        self.viral_column = Some(column.into());
        self
    }

    /// Set the popularity value at or above which a song is viral.
    pub fn viral_threshold(mut self, threshold: f64) -> Self {
        self.viral_threshold = Some(threshold);
        self
    }

    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Set how many genres the viral ranking keeps.
    pub fn top_genres(mut self, n: usize) -> Self {
        self.top_genres = Some(n);
        self
    }

    /// Set the number of grid points for density curves.
    pub fn kde_points(mut self, n: usize) -> Self {
        self.kde_points = Some(n);
        self
    }

    /// Set the output directory for the cleaned file and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set a custom output file name (without extension).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            required_columns: self.required_columns.unwrap_or(defaults.required_columns),
            feature_columns: self.feature_columns.unwrap_or(defaults.feature_columns),
            popularity_column: self.popularity_column.unwrap_or(defaults.popularity_column),
            explicit_column: self.explicit_column.unwrap_or(defaults.explicit_column),
            genre_column: self.genre_column.unwrap_or(defaults.genre_column),
            viral_column: self.viral_column.unwrap_or(defaults.viral_column),
            viral_threshold: self.viral_threshold.unwrap_or(defaults.viral_threshold),
            remove_duplicates: self.remove_duplicates.unwrap_or(defaults.remove_duplicates),
            top_genres: self.top_genres.unwrap_or(defaults.top_genres),
            kde_points: self.kde_points.unwrap_or(defaults.kde_points),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_name: self.output_name.unwrap_or(defaults.output_name),
        };

        config.validate()?;
        Ok(config)
    }
}
