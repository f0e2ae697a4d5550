use crate::feature_key::error::FeatureKeyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a measurement is an observation or a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Actual,
    Forecast,
}

impl MeasurementKind {
    /// Two-letter marker used inside feature keys.
    pub fn code(&self) -> &'static str {
        match self {
            MeasurementKind::Actual => "AC",
            MeasurementKind::Forecast => "FC",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementKind::Actual => write!(f, "actual"),
            MeasurementKind::Forecast => write!(f, "forecast"),
        }
    }
}

/// Accepts the two-letter markers (`ac`, `fc`, any case) as well as the long names.
impl FromStr for MeasurementKind {
    type Err = FeatureKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ac" | "actual" => Ok(MeasurementKind::Actual),
            "fc" | "forecast" => Ok(MeasurementKind::Forecast),
            _ => Err(FeatureKeyError::InvalidArgument {
                argument: "kind_marker",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_markers() {
        assert_eq!("AC".parse::<MeasurementKind>().unwrap(), MeasurementKind::Actual);
        assert_eq!("fc".parse::<MeasurementKind>().unwrap(), MeasurementKind::Forecast);
        assert!("xx".parse::<MeasurementKind>().is_err());
    }
}
