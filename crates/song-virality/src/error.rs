//! Custom error types for the cleaning and labeling pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. The two
//! user-facing failure kinds are [`ViralityError::Parse`] (the input could
//! not be read as a table) and [`ViralityError::Schema`] (a required column
//! is absent). Neither is retried; both require a corrected file.
//!
//! Errors are serializable so a presentation layer can display them as
//! `{ code, message }` pairs.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum ViralityError {
    /// Input could not be parsed into tabular rows.
    #[error("Failed to parse input as tabular data: {0}")]
    Parse(String),

    /// One or more required columns are absent from the dataset.
    #[error("Missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A column exists but its values cannot be read as the expected type.
    #[error("Column '{column}' cannot be read as {expected}")]
    TypeMismatch { column: String, expected: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ViralityError>,
    },
}

impl ViralityError {
    /// Build a schema error for a single missing column.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::Schema {
            missing: vec![column.into()],
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ViralityError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Columns reported missing, if this is (or wraps) a schema error.
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            Self::Schema { missing } => Some(missing),
            Self::WithContext { source, .. } => source.missing_columns(),
            _ => None,
        }
    }

    /// Check if this error was caused by the user's input file.
    ///
    /// These errors are surfaced verbatim and need a corrected file rather
    /// than a retry.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Parse(_) | Self::Schema { .. } | Self::TypeMismatch { .. } => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

impl Serialize for ViralityError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ViralityError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ViralityError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ViralityError::Polars(e).with_context(context))
    }
}
