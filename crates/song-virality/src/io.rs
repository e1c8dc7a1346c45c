//! Dataset loading and export.
//!
//! These are the boundary collaborators around the pipeline: reading a
//! delimited file into a [`DataFrame`] and writing the cleaned frame back out
//! in the same format.

use crate::config::PipelineConfig;
use crate::error::{Result, ViralityError};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_SEPARATOR: u8 = b',';

/// How a delimited file is read.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFormat {
    pub separator: u8,
    /// Columns kept as raw text instead of letting type inference turn
    /// `true`/`FALSE` into booleans. A column whose values are all numbers
    /// still comes back numeric.
    pub text_columns: Vec<String>,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self::for_config(&PipelineConfig::default(), DEFAULT_SEPARATOR)
    }
}

impl CsvFormat {
    pub fn with_separator(separator: u8) -> Self {
        Self {
            separator,
            ..Self::default()
        }
    }

    /// Format that keeps the configured `Explicit` column as text.
    pub fn for_config(config: &PipelineConfig, separator: u8) -> Self {
        Self {
            separator,
            text_columns: vec![config.explicit_column.clone()],
        }
    }

    fn read_options(&self, header: &[String]) -> CsvReadOptions {
        // Infer column types from every row, not just a prefix.
        let options = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(self.separator)
                    .with_quote_char(Some(b'"')),
            );

        // Overriding a column the file lacks would rename another column.
        let overrides: Schema = self
            .text_columns
            .iter()
            .filter(|name| header.contains(name))
            .map(|name| (PlSmallStr::from(name.as_str()), DataType::String))
            .collect();

        if overrides.is_empty() {
            options
        } else {
            options.with_schema_overwrite(Some(Arc::new(overrides)))
        }
    }

    fn header_fields(&self, line: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(line)
            .trim_start_matches('\u{feff}')
            .trim_end_matches(['\r', '\n'])
            .split(self.separator as char)
            .map(|field| field.trim_matches('"').to_string())
            .collect()
    }

    /// Text columns holding only numbers go back to Int64 or Float64.
    fn restore_numeric_columns(&self, df: &mut DataFrame) -> Result<()> {
        for name in &self.text_columns {
            let Ok(column) = df.column(name) else {
                continue;
            };
            if column.dtype() != &DataType::String || column.null_count() == column.len() {
                continue;
            }

            let series = column.as_materialized_series();
            let numeric = series
                .strict_cast(&DataType::Int64)
                .or_else(|_| series.strict_cast(&DataType::Float64));
            if let Ok(numeric) = numeric {
                debug!("Column '{}' is numeric, keeping {}", name, numeric.dtype());
                df.replace(name, numeric)?;
            }
        }
        Ok(())
    }
}

/// Load a comma-separated file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    load_csv_with_format(path, &CsvFormat::default())
}

/// Load a delimited file with a header row.
pub fn load_csv_with_separator(path: impl AsRef<Path>, separator: u8) -> Result<DataFrame> {
    load_csv_with_format(path, &CsvFormat::with_separator(separator))
}

/// Load a delimited file with a header row.
///
/// A missing file is an [`ViralityError::Io`] error; content that cannot be
/// read as a table is a [`ViralityError::Parse`] error.
pub fn load_csv_with_format(path: impl AsRef<Path>, format: &CsvFormat) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ViralityError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    let mut first_line = Vec::new();
    BufReader::new(File::open(path)?).read_until(b'\n', &mut first_line)?;
    let header = format.header_fields(&first_line);

    debug!(
        "Reading {} (separator {:?})",
        path.display(),
        format.separator as char
    );
    let mut df = format
        .read_options(&header)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .and_then(|reader| reader.finish())
        .map_err(|e| ViralityError::Parse(e.to_string()))?;
    format.restore_numeric_columns(&mut df)?;

    info!("Loaded {} rows x {} columns from {}", df.height(), df.width(), path.display());
    Ok(df)
}

/// Parse delimited text held in memory (e.g. an uploaded file).
pub fn read_csv_bytes(bytes: &[u8], separator: u8) -> Result<DataFrame> {
    read_csv_bytes_with_format(bytes, &CsvFormat::with_separator(separator))
}

pub fn read_csv_bytes_with_format(bytes: &[u8], format: &CsvFormat) -> Result<DataFrame> {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let header = format.header_fields(first_line);

    let mut df = format
        .read_options(&header)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| ViralityError::Parse(e.to_string()))?;
    format.restore_numeric_columns(&mut df)?;
    Ok(df)
}

/// Write a frame as delimited text with a header row.
pub fn write_csv_to<W: Write>(df: &mut DataFrame, writer: W, separator: u8) -> Result<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(separator)
        .with_quote_char(b'"')
        .finish(df)?;
    Ok(())
}

/// Write a frame to `path`, creating parent directories as needed.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>, separator: u8) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    write_csv_to(df, file, separator)?;

    info!("Dataset saved: {}", path.display());
    Ok(path.to_path_buf())
}
