use chrono::NaiveDate;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeasurementSourceError {
    #[error("Failed to open measurement file '{0}'")]
    FileOpen(PathBuf, #[source] std::io::Error),

    #[error("Failed to read measurement file '{0}'")]
    FileRead(PathBuf, #[source] PolarsError),

    #[error("Required column '{column}' not found in measurement file '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidCell {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Failed processing measurement data: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Query range starts after it ends: {from} > {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Query range {from}..={to} lies outside the loaded data ({first}..={last})")]
    OutOfCoverage {
        from: NaiveDate,
        to: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },

    #[error("Per-location aggregation requested with an empty point list")]
    EmptyPointList,

    #[error("No grid point within {max_distance_km} km of point {index} ({latitude}, {longitude})")]
    NoGridPointNearby {
        index: usize,
        latitude: f64,
        longitude: f64,
        max_distance_km: f64,
    },

    #[error("Measurement for '{param}' at {validity} carries no values")]
    EmptyRecord { param: String, validity: String },

    #[error("Invalid hour range {start}-{end}, expected 0 <= start <= end <= 23")]
    InvalidHourRange { start: u32, end: u32 },

    #[error("Invalid {setting} '{value}'")]
    InvalidSetting { setting: &'static str, value: String },

    #[error("Measurement query failed: {0}")]
    Query(String),
}
