//! How measurements inside one time bucket become a single value.

use crate::source::error::MeasurementSourceError;
use crate::types::measurement::is_cumulative;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reduction applied to the values of one parameter within a time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketAggregator {
    /// [`BucketAggregator::Total`] for cumulative parameters, [`BucketAggregator::Mean`] otherwise.
    #[default]
    ByParameter,
    Mean,
    Min,
    Max,
    /// Largest minus smallest value.
    Diff,
    /// Sum of all values.
    Total,
}

impl BucketAggregator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketAggregator::ByParameter => "by_parameter",
            BucketAggregator::Mean => "mean",
            BucketAggregator::Min => "min",
            BucketAggregator::Max => "max",
            BucketAggregator::Diff => "diff",
            BucketAggregator::Total => "total",
        }
    }

    /// Reduces `series`, or `None` if it is empty.
    pub fn reduce(&self, param: &str, series: &[f64]) -> Option<f64> {
        if series.is_empty() {
            return None;
        }
        let total = || series.iter().sum::<f64>();
        let min = || series.iter().copied().fold(f64::INFINITY, f64::min);
        let max = || series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let value = match self {
            BucketAggregator::ByParameter if is_cumulative(param) => total(),
            BucketAggregator::ByParameter | BucketAggregator::Mean => {
                total() / series.len() as f64
            }
            BucketAggregator::Min => min(),
            BucketAggregator::Max => max(),
            BucketAggregator::Diff => max() - min(),
            BucketAggregator::Total => total(),
        };
        Some(value)
    }
}

impl fmt::Display for BucketAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketAggregator {
    type Err = MeasurementSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "by_parameter" => Ok(BucketAggregator::ByParameter),
            "mean" => Ok(BucketAggregator::Mean),
            "min" => Ok(BucketAggregator::Min),
            "max" => Ok(BucketAggregator::Max),
            "diff" => Ok(BucketAggregator::Diff),
            "total" | "sum" => Ok(BucketAggregator::Total),
            _ => Err(MeasurementSourceError::InvalidSetting {
                setting: "aggregator",
                value: s.to_string(),
            }),
        }
    }
}

/// Inclusive range of hours of the day a measurement's validity must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourRange {
    start: u32,
    end: u32,
}

impl HourRange {
    pub const ALL_DAY: HourRange = HourRange { start: 0, end: 23 };

    /// # Errors
    ///
    /// [`MeasurementSourceError::InvalidHourRange`] unless `start <= end <= 23`.
    pub fn new(start: u32, end: u32) -> Result<Self, MeasurementSourceError> {
        if start > end || end > 23 {
            return Err(MeasurementSourceError::InvalidHourRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour <= self.end
    }
}

impl Default for HourRange {
    fn default() -> Self {
        Self::ALL_DAY
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}h", self.start, self.end)
    }
}

/// Parses `"6-18"` style ranges.
impl FromStr for HourRange {
    type Err = MeasurementSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MeasurementSourceError::InvalidSetting {
            setting: "hour range",
            value: s.to_string(),
        };
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse::<u32>().map_err(|_| invalid())?;
        let end = end.trim().parse::<u32>().map_err(|_| invalid())?;
        HourRange::new(start, end)
    }
}
