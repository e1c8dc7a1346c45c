//! Cleaning executor module.
//!
//! Contains the ordered cleaning and labeling steps. The order is fixed:
//! later steps only see the survivors of earlier ones.

use crate::cleaner::{DataCleaner, normalize_explicit};
use crate::config::PipelineConfig;
use crate::error::{Result, ViralityError};
use crate::labeling::derive_viral;
use crate::pipeline::progress::{PipelineStage, ProgressUpdate};
use crate::types::CleaningReport;
use crate::utils::missing_columns;
use polars::prelude::*;
use tracing::{debug, info};

/// Clean and label a dataset.
///
/// This is the pure entry point: no I/O, no state kept between calls.
/// Running it again on its own output yields the same frame.
///
/// # Errors
///
/// Returns [`ViralityError::Schema`] when a required column is absent,
/// [`ViralityError::TypeMismatch`] when popularity is not numeric and
/// [`ViralityError::InvalidConfig`] for a configuration that fails validation.
pub fn clean(df: DataFrame, config: &PipelineConfig) -> Result<(DataFrame, CleaningReport)> {
    config
        .validate()
        .map_err(|e| ViralityError::InvalidConfig(e.to_string()))?;
    CleaningExecutor.execute(df, config, &mut |_| {})
}

/// Runs the cleaning steps in order, emitting a progress update when each
/// step starts and when it finishes.
pub struct CleaningExecutor;

impl CleaningExecutor {
    pub fn execute(
        &self,
        df: DataFrame,
        config: &PipelineConfig,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<(DataFrame, CleaningReport)> {
        let mut report = CleaningReport::new(df.height());

        // Step 0: the schema has to be complete before anything is removed,
        // so a failing run never yields a partially cleaned frame.
        progress(ProgressUpdate::new(
            PipelineStage::Validating,
            0.0,
            "Checking required columns...",
        ));
        self.validate_schema(&df, config)?;
        progress(ProgressUpdate::new(
            PipelineStage::Validating,
            1.0,
            "All required columns present",
        ));

        // Step 1: exact duplicates
        let df = if config.remove_duplicates {
            progress(ProgressUpdate::new(
                PipelineStage::Deduplicating,
                0.0,
                "Removing duplicate rows...",
            ));
            info!("Step 1: Removing duplicate rows...");
            let (df, removed) = DataCleaner.remove_duplicates(df, &mut report.actions)?;
            report.removed_duplicates = removed;
            progress(ProgressUpdate::new(
                PipelineStage::Deduplicating,
                1.0,
                format!("Removed {} duplicate rows", removed),
            ));
            df
        } else {
            info!("Step 1: Skipping duplicate removal (disabled)");
            df
        };

        // Step 2: incomplete rows, counted against the deduplicated frame
        progress(ProgressUpdate::new(
            PipelineStage::DroppingIncomplete,
            0.0,
            "Dropping rows with missing required values...",
        ));
        info!("Step 2: Dropping rows with missing required values...");
        let (mut df, removed) =
            DataCleaner.drop_incomplete_rows(df, &config.required_columns, &mut report.actions)?;
        report.removed_missing = removed;
        progress(ProgressUpdate::new(
            PipelineStage::DroppingIncomplete,
            1.0,
            format!("Removed {} incomplete rows", removed),
        ));

        // Step 3: explicit flag
        progress(ProgressUpdate::new(
            PipelineStage::NormalizingExplicit,
            0.0,
            "Normalizing explicit flag...",
        ));
        info!("Step 3: Normalizing '{}' column...", config.explicit_column);
        report.explicit = normalize_explicit(&mut df, &config.explicit_column)?;
        report
            .actions
            .push(report.explicit.describe(&config.explicit_column));
        progress(ProgressUpdate::new(
            PipelineStage::NormalizingExplicit,
            1.0,
            "Explicit flag normalized",
        ));

        // Step 4: viral label
        progress(ProgressUpdate::new(
            PipelineStage::Labeling,
            0.0,
            "Deriving viral label...",
        ));
        info!(
            "Step 4: Creating '{}' label ({} >= {})...",
            config.viral_column, config.popularity_column, config.viral_threshold
        );
        report.viral_count = derive_viral(
            &mut df,
            &config.popularity_column,
            &config.viral_column,
            config.viral_threshold,
        )?;
        report.actions.push(format!(
            "Created '{}' label based on {} (>= {}).",
            config.viral_column, config.popularity_column, config.viral_threshold
        ));
        progress(ProgressUpdate::new(
            PipelineStage::Labeling,
            1.0,
            format!("{} viral songs", report.viral_count),
        ));

        report.rows_after = df.height();
        debug!(
            "Cleaning finished: {} -> {} rows, {} viral",
            report.rows_before, report.rows_after, report.viral_count
        );

        Ok((df, report))
    }

    fn validate_schema(&self, df: &DataFrame, config: &PipelineConfig) -> Result<()> {
        let missing = missing_columns(df, &config.required_columns);
        if missing.is_empty() {
            return Ok(());
        }
        Err(ViralityError::Schema { missing })
    }
}
