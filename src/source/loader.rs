//! Reads a long-format measurement file into typed observations.
//!
//! Expected columns: `param`, `lat`, `lon`, `validity`, `value` and, optionally,
//! `base_date`. Rows with a `base_date` are forecasts issued on that date; rows
//! without one are observations. Rows with an empty `value` are missing data and skipped.
//!
//! Delimited files are read as text and numbers are parsed per cell, so a column
//! that starts out with whole numbers may still hold decimals further down.

use crate::source::error::MeasurementSourceError;
use crate::utils::{parse_date, parse_datetime};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub(crate) const REQUIRED_COLUMNS: [&str; 5] = ["param", "lat", "lon", "validity", "value"];

/// One raw measurement at one grid point.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Observation {
    pub param: String,
    pub latitude: f64,
    pub longitude: f64,
    pub validity: NaiveDateTime,
    pub base_date: Option<NaiveDate>,
    pub value: f64,
}

/// Reads the measurement file into a DataFrame. Parquet is chosen by extension,
/// everything else is read as delimited text (tab for `.tsv`/`.tab`, comma otherwise).
pub(crate) fn read_measurement_frame(path: &Path) -> Result<DataFrame, MeasurementSourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("parquet") => {
            let file = File::open(path)
                .map_err(|e| MeasurementSourceError::FileOpen(path.to_path_buf(), e))?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| MeasurementSourceError::FileRead(path.to_path_buf(), e))
        }
        Some("tsv") | Some("tab") => read_delimited(path, b'\t'),
        _ => read_delimited(path, b','),
    }
}

fn read_delimited(path: &Path, separator: u8) -> Result<DataFrame, MeasurementSourceError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| options.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| MeasurementSourceError::FileRead(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| MeasurementSourceError::FileRead(path.to_path_buf(), e))
}

fn required_column<'a>(
    df: &'a DataFrame,
    path: &Path,
    name: &str,
) -> Result<&'a Column, MeasurementSourceError> {
    df.column(name)
        .map_err(|_| MeasurementSourceError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn invalid_cell(column: &str, row: usize, value: Option<&str>) -> MeasurementSourceError {
    MeasurementSourceError::InvalidCell {
        column: column.to_string(),
        row,
        value: value.unwrap_or("null").to_string(),
    }
}

/// Parses a numeric cell. Empty and null cells are `None`, anything else must be a number.
fn parse_number(
    column: &str,
    row: usize,
    raw: Option<&str>,
) -> Result<Option<f64>, MeasurementSourceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid_cell(column, row, Some(text))),
    }
}

fn text_column(
    df: &DataFrame,
    path: &Path,
    name: &str,
) -> Result<StringChunked, MeasurementSourceError> {
    let column = required_column(df, path, name)?.cast(&DataType::String)?;
    Ok(column.str()?.clone())
}

/// Converts the loaded frame into observations, validating every row.
pub(crate) fn extract_observations(
    df: &DataFrame,
    path: &Path,
) -> Result<Vec<Observation>, MeasurementSourceError> {
    for name in REQUIRED_COLUMNS {
        required_column(df, path, name)?;
    }

    let params = text_column(df, path, "param")?;
    let latitudes = text_column(df, path, "lat")?;
    let longitudes = text_column(df, path, "lon")?;
    let validities = text_column(df, path, "validity")?;
    let values = text_column(df, path, "value")?;

    let base_dates = match df.column("base_date") {
        Ok(column) => Some(column.cast(&DataType::String)?),
        Err(_) => None,
    };
    let base_dates = match &base_dates {
        Some(column) => Some(column.str()?),
        None => None,
    };

    let mut observations = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for row in 0..df.height() {
        let Some(value) = parse_number("value", row, values.get(row))? else {
            skipped += 1;
            continue;
        };
        let param = params
            .get(row)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid_cell("param", row, None))?;
        let latitude = parse_number("lat", row, latitudes.get(row))?
            .ok_or_else(|| invalid_cell("lat", row, None))?;
        let longitude = parse_number("lon", row, longitudes.get(row))?
            .ok_or_else(|| invalid_cell("lon", row, None))?;
        let raw_validity = validities.get(row);
        let validity = raw_validity
            .and_then(parse_datetime)
            .ok_or_else(|| invalid_cell("validity", row, raw_validity))?;
        let base_date = match base_dates.and_then(|column| column.get(row)) {
            Some(raw) if !raw.trim().is_empty() => {
                Some(parse_date(raw).ok_or_else(|| invalid_cell("base_date", row, Some(raw)))?)
            }
            _ => None,
        };

        observations.push(Observation {
            param: param.to_string(),
            latitude,
            longitude,
            validity,
            base_date,
            value,
        });
    }

    if skipped > 0 {
        warn!(
            "Skipped {} rows without a value in measurement file {:?}",
            skipped, path
        );
    }
    info!(
        "Read {} observations from measurement file {:?}",
        observations.len(),
        path
    );
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_actual_and_forecast_rows() {
        let file = write_file(
            ".tsv",
            "param\tlat\tlon\tvalidity\tvalue\tbase_date\n\
             2t\t46.0\t14.5\t2015-01-22 00:00:00\t5.0\t\n\
             2t\t46.0\t14.5\t2015-01-24 00:00:00\t7.0\t2015-01-22\n\
             tp\t46.0\t14.5\t2015-01-22 06:00:00\t\t\n",
        );
        let df = read_measurement_frame(file.path()).unwrap();
        let observations = extract_observations(&df, file.path()).unwrap();

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].param, "2t");
        assert_eq!(observations[0].base_date, None);
        assert_eq!(observations[1].value, 7.0);
        assert_eq!(observations[1].base_date, NaiveDate::from_ymd_opt(2015, 1, 22));
    }

    #[test]
    fn reports_missing_columns() {
        let file = write_file(".csv", "param,lat,validity,value\n2t,46.0,2015-01-22,1.0\n");
        let df = read_measurement_frame(file.path()).unwrap();
        let err = extract_observations(&df, file.path()).unwrap_err();
        assert!(matches!(
            err,
            MeasurementSourceError::MissingColumn { ref column, .. } if column == "lon"
        ));
    }

    #[test]
    fn whole_numbers_followed_by_decimals() {
        let mut contents = String::from("param\tlat\tlon\tvalidity\tvalue\n");
        for hour in 0..150 {
            contents.push_str(&format!(
                "tp\t46\t14\t2015-01-{:02} {:02}:00:00\t0\n",
                1 + hour / 24,
                hour % 24
            ));
        }
        contents.push_str("tp\t45.5\t14\t2015-01-08 00:00:00\t0.25\n");
        let file = write_file(".tsv", &contents);

        let df = read_measurement_frame(file.path()).unwrap();
        let observations = extract_observations(&df, file.path()).unwrap();

        assert_eq!(observations.len(), 151);
        assert_eq!(observations[0].latitude, 46.0);
        assert_eq!(observations[150].latitude, 45.5);
        assert_eq!(observations[150].value, 0.25);
    }

    #[test]
    fn non_numeric_value_is_an_invalid_cell() {
        let file = write_file(
            ".csv",
            "param,lat,lon,validity,value\n2t,46.0,14.5,2015-01-22,1.0\n2t,46.0,14.5,2015-01-23,n/a\n",
        );
        let df = read_measurement_frame(file.path()).unwrap();
        let err = extract_observations(&df, file.path()).unwrap_err();
        assert!(matches!(
            err,
            MeasurementSourceError::InvalidCell { ref column, row: 1, ref value }
                if column == "value" && value == "n/a"
        ));
    }

    #[test]
    fn reports_unparseable_validity() {
        let file = write_file(
            ".csv",
            "param,lat,lon,validity,value\n2t,46.0,14.5,yesterday,1.0\n",
        );
        let df = read_measurement_frame(file.path()).unwrap();
        let err = extract_observations(&df, file.path()).unwrap_err();
        assert!(matches!(
            err,
            MeasurementSourceError::InvalidCell { ref column, row: 0, .. } if column == "validity"
        ));
    }
}
