use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// What happened to the explicit-content flag column during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplicitNormalization {
    /// Textual or boolean values were mapped to 0/1.
    Converted,
    /// The column was already numeric and left untouched.
    AlreadyNumeric,
    /// The dataset has no such column.
    NotPresent,
}

impl ExplicitNormalization {
    /// Human-readable description, phrased for the cleaning summary.
    pub fn describe(&self, column: &str) -> String {
        match self {
            Self::Converted => format!(
                "Converted '{}' column to binary (1 for explicit, 0 for non-explicit).",
                column
            ),
            Self::AlreadyNumeric => format!("'{}' column is already numeric.", column),
            Self::NotPresent => format!("'{}' column not found.", column),
        }
    }
}

/// Counts of rows removed at each cleaning stage.
///
/// Deterministic for a given input, so two runs over the same data compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Rows in the input dataset.
    pub rows_before: usize,
    /// Exact duplicate rows removed (first occurrence kept).
    pub removed_duplicates: usize,
    /// Rows dropped for a missing required feature, counted after deduplication.
    pub removed_missing: usize,
    /// Rows in the cleaned dataset.
    pub rows_after: usize,
    /// Outcome of the explicit-flag normalization step.
    pub explicit: ExplicitNormalization,
    /// Number of surviving rows labeled viral.
    pub viral_count: usize,
    /// Human-readable lines describing each step, in execution order.
    pub actions: Vec<String>,
}

impl CleaningReport {
    pub fn new(rows_before: usize) -> Self {
        Self {
            rows_before,
            removed_duplicates: 0,
            removed_missing: 0,
            rows_after: rows_before,
            explicit: ExplicitNormalization::NotPresent,
            viral_count: 0,
            actions: Vec::new(),
        }
    }

    /// Total rows removed by all stages.
    pub fn rows_removed(&self) -> usize {
        self.removed_duplicates + self.removed_missing
    }

    /// Percentage of input rows removed (0.0 - 100.0).
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed() as f64 / self.rows_before as f64) * 100.0
        }
    }

    /// Number of surviving rows labeled non-viral.
    pub fn non_viral_count(&self) -> usize {
        self.rows_after.saturating_sub(self.viral_count)
    }
}

/// Output of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The cleaned dataset with the `Viral` column attached.
    pub data: DataFrame,
    /// What the cleaning steps removed or changed.
    pub report: CleaningReport,
    /// Wall-clock time of the run in milliseconds.
    pub duration_ms: u64,
}
