//! Main cleaning pipeline module.
//!
//! This module provides the `Pipeline` struct and builder that wrap the
//! cleaning executor with configuration, progress reporting and timing.

use crate::config::PipelineConfig;
use crate::error::{Result, ViralityError};
use crate::pipeline::executor::CleaningExecutor;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::types::PipelineResult;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The song cleaning and labeling pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use song_virality::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().viral_threshold(75.0).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataframe)?;
///
/// println!("{} viral songs", result.report.viral_count);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    executor: CleaningExecutor,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean and label a DataFrame.
    ///
    /// Consumes the input and returns the cleaned frame with its report.
    /// On error nothing is returned; no partially cleaned frame escapes.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Data cleaning complete!"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();

        info!("Starting cleaning pipeline on {:?}...", df.shape());
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Initializing,
            0.0,
            "Starting cleaning pipeline...",
        ));

        let (data, report) =
            self.executor
                .execute(df, &self.config, &mut |update| self.report_progress(update))?;

        if report.rows_removed_percentage() > 30.0 {
            warn!(
                "High data loss: {:.1}% of rows were removed",
                report.rows_removed_percentage()
            );
        }
        if report.rows_after > 0 && report.viral_count == 0 {
            warn!(
                "No rows reached the viral threshold of {}",
                self.config.viral_threshold
            );
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Cleaning complete in {}ms: {} rows kept, {} viral",
            duration_ms, report.rows_after, report.viral_count
        );

        Ok(PipelineResult {
            data,
            report,
            duration_ms,
        })
    }
}

/// Builder for creating a [`Pipeline`] instance.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a closure to receive progress updates.
    ///
    /// Convenience wrapper around [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter(Arc::new(ClosureProgressReporter::new(callback)))
    }

    /// Build the pipeline.
    ///
    /// Uses [`PipelineConfig::default()`] when no configuration was set.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| ViralityError::InvalidConfig(e.to_string()))?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            executor: CleaningExecutor,
        })
    }
}
