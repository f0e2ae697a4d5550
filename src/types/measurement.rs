//! Records returned by a [`crate::MeasurementSource`].

use chrono::NaiveDateTime;

/// 2 metre temperature.
pub const TEMPERATURE: &str = "2t";
/// Total cloud cover.
pub const CLOUD_COVER: &str = "tcc";
/// Total precipitation.
pub const PRECIPITATION: &str = "tp";

/// Parameters enriched by default.
pub const TRACKED_PARAMETERS: [&str; 3] = [TEMPERATURE, CLOUD_COVER, PRECIPITATION];

/// Parameters that accumulate over time. Aggregating them over a bucket sums instead of averaging.
pub const CUMULATIVE_PARAMETERS: [&str; 4] = ["tp", "sund", "ssr", "sf"];

/// One aggregated measurement for a parameter, valid at `validity`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    /// Start of the aggregation bucket the values belong to.
    pub validity: NaiveDateTime,
    /// Parameter short name, e.g. `2t`.
    pub param: String,
    /// The series for this record. The first element is the representative value.
    pub values: Vec<f64>,
    /// Index into the requested point list, for per-location queries.
    pub location: Option<usize>,
}

impl MeasurementRecord {
    pub fn new(validity: NaiveDateTime, param: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            validity,
            param: param.into(),
            values,
            location: None,
        }
    }

    pub fn at_location(mut self, location: usize) -> Self {
        self.location = Some(location);
        self
    }

    pub fn representative_value(&self) -> Option<f64> {
        self.values.first().copied()
    }
}

pub(crate) fn is_cumulative(param: &str) -> bool {
    CUMULATIVE_PARAMETERS.contains(&param)
}
