//! Shared utilities for the cleaning pipeline and the descriptive report.
//!
//! This module contains the small polars helpers used across modules so that
//! column lookups and value extraction behave the same everywhere.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type (the only kind that can hold NaN).
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Column Utilities
// =============================================================================

/// Check whether a DataFrame has a column with exactly this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Names from `wanted` that are not columns of `df`, in `wanted` order.
pub fn missing_columns(df: &DataFrame, wanted: &[String]) -> Vec<String> {
    wanted
        .iter()
        .filter(|name| !has_column(df, name))
        .cloned()
        .collect()
}

// =============================================================================
// Value Extraction Utilities
// =============================================================================

/// Read a column as optional `f64` values (non-strict: unparsable values become `None`).
pub fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let series = df.column(name)?.as_materialized_series();
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Read a column as optional `f64` values, failing if any non-null value does not convert.
pub fn strict_float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let series = df.column(name)?.as_materialized_series();
    let floats = series.strict_cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Read a column as optional owned strings.
pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let series = df.column(name)?.as_materialized_series();
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int64), DtypeCategory::Numeric);
        assert_eq!(
            get_dtype_category(&DataType::Boolean),
            DtypeCategory::Boolean
        );
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::String);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Other);
    }

    #[test]
    fn test_missing_columns_keeps_requested_order() {
        let df = df!["Energy" => [0.5], "Tempo" => [120.0]].unwrap();
        let wanted = vec![
            "Popularity".to_string(),
            "Energy".to_string(),
            "Loudness (db)".to_string(),
        ];
        assert_eq!(
            missing_columns(&df, &wanted),
            vec!["Popularity".to_string(), "Loudness (db)".to_string()]
        );
    }

    #[test]
    fn test_float_values_from_integers() {
        let df = df!["Popularity" => [Some(85i64), None, Some(12)]].unwrap();
        let values = float_values(&df, "Popularity").unwrap();
        assert_eq!(values, vec![Some(85.0), None, Some(12.0)]);
    }

    #[test]
    fn test_strict_float_values_rejects_text() {
        let df = df!["Popularity" => ["85", "high"]].unwrap();
        assert!(strict_float_values(&df, "Popularity").is_err());
    }
}
