use crate::enrich::window::WindowSpan;
use crate::feature_key::error::FeatureKeyError;
use crate::source::error::MeasurementSourceError;
use crate::table::error::TableError;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    FeatureKey(#[from] FeatureKeyError),

    #[error(transparent)]
    MeasurementSource(#[from] MeasurementSourceError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Invalid enrichment configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read enrichment configuration '{0}'")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse enrichment configuration '{0}'")]
    ConfigParse(PathBuf, #[source] serde_json::Error),

    #[error("Window {span:?} for {date} falls outside the supported calendar")]
    WindowOutOfCalendar { date: NaiveDate, span: WindowSpan },

    #[error("Enrichment failed for row {row} ({date})")]
    Row {
        row: usize,
        date: NaiveDate,
        #[source]
        source: Box<EnrichError>,
    },
}
