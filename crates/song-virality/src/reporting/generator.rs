use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt, ViralityError};
use crate::reporting::genres::{GenreCount, rank_viral_genres};
use crate::reporting::statistics::{DistributionSummary, pearson};
use crate::types::{CleaningReport, PipelineResult};
use crate::utils::{float_values, has_column, string_values, strict_float_values};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

// ============================================================================
// Report Types
// ============================================================================

/// Full analysis report for CLI and library output.
///
/// Used both for JSON on stdout (`--json`) and the report file
/// (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the cleaned dataset (if written)
    pub output_file: Option<String>,
    /// Pipeline wall-clock time in milliseconds
    pub duration_ms: u64,
    /// Label threshold the dataset was cleaned with
    pub viral_threshold: f64,
    pub cleaning: CleaningReport,
    pub statistics: DescriptiveStatistics,
}

/// Descriptive statistics of a cleaned, labeled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStatistics {
    pub rows: usize,
    pub viral_rows: usize,
    pub non_viral_rows: usize,
    /// One entry per audio feature, in configured order
    pub distributions: Vec<FeatureDistribution>,
    pub correlation: CorrelationMatrix,
    /// `None` when the dataset has no genre column
    pub top_viral_genres: Option<Vec<GenreCount>>,
}

/// A feature's distribution split by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDistribution {
    pub feature: String,
    pub viral: DistributionSummary,
    pub non_viral: DistributionSummary,
}

/// Pairwise Pearson correlations.
///
/// `values[i][j]` is the correlation of `columns[i]` with `columns[j]`;
/// `None` where a column has no variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Compute the matrix for `columns` (each a vector of the same length).
    pub fn compute(columns: Vec<String>, data: &[Vec<Option<f64>>]) -> Self {
        let n = data.len();
        let mut values = vec![vec![None; n]; n];

        for i in 0..n {
            for j in i..n {
                let r = if i == j {
                    // Self-correlation is exactly 1 unless the column is constant.
                    pearson(&data[i], &data[i]).map(|_| 1.0)
                } else {
                    pearson(&data[i], &data[j])
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self { columns, values }
    }

    /// Look up the correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Compute descriptive statistics for a labeled dataset.
///
/// Requires the label column and every configured feature column. A missing
/// genre column is not an error; it yields `top_viral_genres: None`.
pub fn describe_dataset(df: &DataFrame, config: &PipelineConfig) -> Result<DescriptiveStatistics> {
    let mut wanted = config.feature_columns.clone();
    wanted.push(config.viral_column.clone());
    let missing = crate::utils::missing_columns(df, &wanted);
    if !missing.is_empty() {
        return Err(ViralityError::Schema { missing });
    }

    let labels = float_values(df, &config.viral_column).context("Reading label column")?;
    let is_viral: Vec<bool> = labels.iter().map(|l| *l == Some(1.0)).collect();
    let viral_rows = is_viral.iter().filter(|&&v| v).count();

    let mut distributions = Vec::with_capacity(config.feature_columns.len());
    let mut correlation_data = Vec::with_capacity(config.feature_columns.len() + 1);

    for feature in &config.feature_columns {
        let values =
            strict_float_values(df, feature).map_err(|_| ViralityError::TypeMismatch {
                column: feature.clone(),
                expected: "numeric values".to_string(),
            })?;

        let (mut viral, mut non_viral) = (Vec::new(), Vec::new());
        for (value, &flag) in values.iter().zip(&is_viral) {
            let Some(v) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            if flag {
                viral.push(v);
            } else {
                non_viral.push(v);
            }
        }

        debug!(
            "{}: {} viral / {} non-viral values",
            feature,
            viral.len(),
            non_viral.len()
        );
        distributions.push(FeatureDistribution {
            feature: feature.clone(),
            viral: DistributionSummary::from_values(&viral, config.kde_points),
            non_viral: DistributionSummary::from_values(&non_viral, config.kde_points),
        });
        correlation_data.push(values);
    }
    correlation_data.push(labels.clone());

    let mut columns = config.feature_columns.clone();
    columns.push(config.viral_column.clone());
    let correlation = CorrelationMatrix::compute(columns, &correlation_data);

    let top_viral_genres = if has_column(df, &config.genre_column) {
        let genres = string_values(df, &config.genre_column).context("Reading genre column")?;
        Some(rank_viral_genres(&genres, &labels, config.top_genres))
    } else {
        warn!(
            "'{}' column not found in the dataset. Skipping genre analysis.",
            config.genre_column
        );
        None
    };

    Ok(DescriptiveStatistics {
        rows: df.height(),
        viral_rows,
        non_viral_rows: df.height() - viral_rows,
        distributions,
        correlation,
        top_viral_genres,
    })
}

// ============================================================================
// Report Generator
// ============================================================================

/// Builds analysis reports and writes them next to the cleaned dataset.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Build an [`AnalysisReport`] from a pipeline result.
    pub fn build_analysis_report(
        input_file: &str,
        output_file: Option<&str>,
        result: &PipelineResult,
        config: &PipelineConfig,
    ) -> Result<AnalysisReport> {
        let statistics = describe_dataset(&result.data, config)?;

        Ok(AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(String::from),
            duration_ms: result.duration_ms,
            viral_threshold: config.viral_threshold,
            cleaning: result.report.clone(),
            statistics,
        })
    }

    /// Write `report` as pretty JSON to `<output_dir>/<base_name>_report.json`.
    pub fn write_report_to_file(&self, report: &AnalysisReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
