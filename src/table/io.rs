//! Reading and writing the delimited tables that get enriched.

use crate::table::error::TableError;
use crate::utils::parse_date;
use chrono::NaiveDate;
use log::{info, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column holding the reference date of each row.
pub const DATE_COLUMN: &str = "Date";
pub const DEFAULT_SEPARATOR: u8 = b'\t';
pub const ENRICHED_SUFFIX: &str = "_enriched";

/// Reads a delimited table with a header row.
///
/// Every column is read as text so values are written back exactly as they came in.
pub fn read_table(path: &Path, separator: u8) -> Result<DataFrame, TableError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| options.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| TableError::Read(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| TableError::Read(path.to_path_buf(), e))?;
    info!(
        "Read table {:?} with {} rows and {} columns",
        path,
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Writes `df` with a header row, keeping row order.
pub fn write_table(df: &mut DataFrame, path: &Path, separator: u8) -> Result<(), TableError> {
    let mut file = File::create(path).map_err(|e| TableError::Create(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(df)
        .map_err(|e| TableError::Write(path.to_path_buf(), e))?;
    info!(
        "Wrote table {:?} with {} rows and {} columns",
        path,
        df.height(),
        df.width()
    );
    Ok(())
}

/// The reference date of every row, read from the [`DATE_COLUMN`].
///
/// # Errors
///
/// [`TableError::SchemaMismatch`] if the column is missing or any value is not a date.
pub fn reference_dates(df: &DataFrame) -> Result<Vec<NaiveDate>, TableError> {
    let column = df.column(DATE_COLUMN).map_err(|_| {
        warn!("Table has no '{}' column", DATE_COLUMN);
        TableError::SchemaMismatch(format!("missing '{}' column", DATE_COLUMN))
    })?;
    let as_text = column.cast(&DataType::String)?;
    let values = as_text.str()?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.and_then(parse_date).ok_or_else(|| {
                TableError::SchemaMismatch(format!(
                    "row {} has unparseable {} '{}'",
                    row,
                    DATE_COLUMN,
                    value.unwrap_or("null")
                ))
            })
        })
        .collect()
}

/// Output path for an enriched table: `<stem>_enriched.<ext>` next to the input.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use weather_enrich::enriched_path;
///
/// assert_eq!(
///     enriched_path(Path::new("data/sales.csv")),
///     Path::new("data/sales_enriched.csv")
/// );
/// ```
pub fn enriched_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, ENRICHED_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, ENRICHED_SUFFIX),
    };
    input.with_file_name(file_name)
}
