//! Data cleaning module for song datasets.
//!
//! This module provides the row-level cleaning steps:
//! - Removing exact duplicate rows
//! - Dropping rows missing any required feature
//! - Normalizing the explicit-content flag to 0/1

mod converters;

pub use converters::{EXPLICIT_MAPPING, explicit_flag, normalize_explicit};

use crate::error::Result;
use crate::utils::is_float_dtype;
use polars::prelude::*;
use tracing::debug;

/// Data cleaner for the fixed row-level cleaning steps.
pub struct DataCleaner;

impl DataCleaner {
    /// Remove rows that exactly duplicate an earlier row.
    ///
    /// All columns take part in the comparison, missing values compare equal
    /// to each other (as do `0.0` and `-0.0`), and the first occurrence is
    /// kept in its original position. Returns the deduplicated frame and the
    /// number of rows removed.
    pub fn remove_duplicates(
        &self,
        df: DataFrame,
        cleaning_actions: &mut Vec<String>,
    ) -> Result<(DataFrame, usize)> {
        let before = df.height();
        let df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let removed = before - df.height();

        cleaning_actions.push(format!("Dropped {} duplicate rows.", removed));
        debug!("Removed {} duplicate rows", removed);

        Ok((df, removed))
    }

    /// Remove rows missing a value in any of the `required` columns.
    ///
    /// NaN in a float column counts as missing. Every name in `required`
    /// must exist in the frame; callers validate the schema first.
    pub fn drop_incomplete_rows(
        &self,
        df: DataFrame,
        required: &[String],
        cleaning_actions: &mut Vec<String>,
    ) -> Result<(DataFrame, usize)> {
        let before = df.height();

        let df = if required.is_empty() {
            df
        } else {
            let predicates = required
                .iter()
                .map(|name| present_expr(&df, name))
                .collect::<PolarsResult<Vec<_>>>()?;
            df.lazy().filter(all_horizontal(predicates)?).collect()?
        };
        let removed = before - df.height();

        cleaning_actions.push(format!(
            "Dropped {} rows with missing values in important columns.",
            removed
        ));
        debug!("Removed {} rows with missing required values", removed);

        Ok((df, removed))
    }
}

/// `true` where `name` holds a value: not null and, for float columns, not NaN.
fn present_expr(df: &DataFrame, name: &str) -> PolarsResult<Expr> {
    let present = col(name).is_not_null();
    if is_float_dtype(df.column(name)?.dtype()) {
        Ok(present.and(col(name).is_not_nan()))
    } else {
        Ok(present)
    }
}
