//! Conversion of the explicit-content flag to a 0/1 integer column.

use crate::error::Result;
use crate::types::ExplicitNormalization;
use crate::utils::{DtypeCategory, get_dtype_category, has_column, string_values};
use polars::prelude::*;
use tracing::debug;

/// Textual flag values that map to a known integer. Matching is case-sensitive.
pub const EXPLICIT_MAPPING: [(&str, i64); 4] =
    [("Yes", 1), ("No", 0), ("True", 1), ("False", 0)];

/// Map one textual flag value. Unknown and missing values map to 0.
pub fn explicit_flag(value: Option<&str>) -> i64 {
    value
        .and_then(|v| {
            EXPLICIT_MAPPING
                .iter()
                .find(|(text, _)| *text == v)
                .map(|(_, flag)| *flag)
        })
        .unwrap_or(0)
}

/// Normalize the explicit-content column in place.
///
/// Numeric columns are left untouched and an absent column is skipped.
/// Text goes through [`EXPLICIT_MAPPING`]. A Boolean column can only come
/// from a frame built in memory, since [`crate::io`] reads this column as
/// text; it maps `true` to 1 and anything else to 0.
pub fn normalize_explicit(df: &mut DataFrame, column: &str) -> Result<ExplicitNormalization> {
    if !has_column(df, column) {
        debug!("No '{}' column to normalize", column);
        return Ok(ExplicitNormalization::NotPresent);
    }

    let series = df.column(column)?.as_materialized_series();
    let flags: Vec<i64> = match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => {
            debug!("'{}' is already numeric ({})", column, series.dtype());
            return Ok(ExplicitNormalization::AlreadyNumeric);
        }
        DtypeCategory::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| i64::from(v.unwrap_or(false)))
            .collect(),
        DtypeCategory::String | DtypeCategory::Other => string_values(df, column)?
            .iter()
            .map(|v| explicit_flag(v.as_deref()))
            .collect(),
    };

    df.replace(column, Series::new(column.into(), flags))?;
    debug!("Converted '{}' to binary flags", column);

    Ok(ExplicitNormalization::Converted)
}
