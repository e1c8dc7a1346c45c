//! Derivation of the binary `Viral` label from popularity.

use crate::error::{Result, ViralityError};
use crate::utils::{has_column, strict_float_values};
use polars::prelude::*;
use tracing::debug;

/// Label one popularity value. Missing or NaN popularity is never viral.
#[inline]
pub fn viral_flag(popularity: Option<f64>, threshold: f64) -> i64 {
    i64::from(popularity.is_some_and(|p| p >= threshold))
}

/// Attach (or replace) the label column and return how many rows are viral.
///
/// The label is an Int64 column holding 1 when `popularity >= threshold` and
/// 0 otherwise. A fresh label is appended as the last column; an existing
/// column with the same name is overwritten in place, so relabeling an
/// already labeled frame leaves it unchanged.
pub fn derive_viral(
    df: &mut DataFrame,
    popularity_column: &str,
    viral_column: &str,
    threshold: f64,
) -> Result<usize> {
    if !has_column(df, popularity_column) {
        return Err(ViralityError::missing_column(popularity_column));
    }

    let popularity = strict_float_values(df, popularity_column).map_err(|_| {
        ViralityError::TypeMismatch {
            column: popularity_column.to_string(),
            expected: "numeric values".to_string(),
        }
    })?;

    let labels: Vec<i64> = popularity
        .into_iter()
        .map(|p| viral_flag(p, threshold))
        .collect();
    let viral_count = labels.iter().filter(|&&v| v == 1).count();

    df.with_column(Series::new(viral_column.into(), labels))?;
    debug!(
        "Labeled {} of {} rows as viral (threshold {})",
        viral_count,
        df.height(),
        threshold
    );

    Ok(viral_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(df: &DataFrame) -> Vec<Option<i64>> {
        df.column("Viral").unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_viral_flag_boundary() {
        assert_eq!(viral_flag(Some(80.0), 80.0), 1);
        assert_eq!(viral_flag(Some(79.999), 80.0), 0);
        assert_eq!(viral_flag(Some(100.0), 80.0), 1);
        assert_eq!(viral_flag(None, 80.0), 0);
        assert_eq!(viral_flag(Some(f64::NAN), 80.0), 0);
    }

    #[test]
    fn test_derive_viral_appends_column() {
        let mut df = df!["Popularity" => [85i64, 80, 79, 12]].unwrap();

        let count = derive_viral(&mut df, "Popularity", "Viral", 80.0).unwrap();

        assert_eq!(count, 2);
        assert_eq!(labels(&df), vec![Some(1), Some(1), Some(0), Some(0)]);
        assert_eq!(df.get_column_names().last().unwrap().as_str(), "Viral");
    }

    #[test]
    fn test_derive_viral_is_idempotent() {
        let mut df = df![
            "Popularity" => [90.0, 10.0],
            "Energy" => [0.5, 0.7],
        ]
        .unwrap();

        derive_viral(&mut df, "Popularity", "Viral", 80.0).unwrap();
        let once = df.clone();
        derive_viral(&mut df, "Popularity", "Viral", 80.0).unwrap();

        assert_eq!(df.width(), 3);
        assert!(df.equals(&once));
    }

    #[test]
    fn test_derive_viral_parses_numeric_text() {
        let mut df = df!["Popularity" => ["95", "3"]].unwrap();

        derive_viral(&mut df, "Popularity", "Viral", 80.0).unwrap();

        assert_eq!(labels(&df), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_derive_viral_rejects_non_numeric_text() {
        let mut df = df!["Popularity" => ["95", "very"]].unwrap();

        let err = derive_viral(&mut df, "Popularity", "Viral", 80.0).unwrap_err();

        assert_eq!(err.error_code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_derive_viral_missing_popularity() {
        let mut df = df!["Energy" => [0.4]].unwrap();

        let err = derive_viral(&mut df, "Popularity", "Viral", 80.0).unwrap_err();

        assert_eq!(err.missing_columns(), Some(&["Popularity".to_string()][..]));
    }
}
