use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read table '{0}'")]
    Read(PathBuf, #[source] PolarsError),

    #[error("Failed to create output file '{0}'")]
    Create(PathBuf, #[source] std::io::Error),

    #[error("Failed to write table '{0}'")]
    Write(PathBuf, #[source] PolarsError),

    #[error("Table does not match the expected schema: {0}")]
    SchemaMismatch(String),

    #[error("Feature column '{0}' already exists in the table")]
    DuplicateColumn(String),

    #[error("Got features for {features} rows but the table has {rows}")]
    HeightMismatch { rows: usize, features: usize },

    #[error("None of the {features} feature columns matches the selection")]
    NoMatchingFeatures { features: usize },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
