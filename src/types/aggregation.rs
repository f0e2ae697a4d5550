//! Time and spatial granularity of measurement queries and feature keys.

use crate::feature_key::error::FeatureKeyError;
use crate::types::lat_lon::LatLon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The time granularity a measurement is aggregated to.
///
/// Also decides the unit of the offset encoded into a [`crate::FeatureKey`]:
/// hours, calendar days or ISO weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationLevel {
    Hour,
    Day,
    Week,
}

impl AggregationLevel {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            AggregationLevel::Hour => "hour",
            AggregationLevel::Day => "day",
            AggregationLevel::Week => "week",
        }
    }

    /// Upper-case tag used inside feature keys (`HOUR`, `DAY`, `WEEK`).
    pub(crate) fn key_tag(&self) -> &'static str {
        match self {
            AggregationLevel::Hour => "HOUR",
            AggregationLevel::Day => "DAY",
            AggregationLevel::Week => "WEEK",
        }
    }
}

/// Formats the level the same way it is accepted by [`FromStr`].
///
/// # Examples
///
/// ```
/// use weather_enrich::AggregationLevel;
///
/// assert_eq!(AggregationLevel::Week.to_string(), "week");
/// assert_eq!("DAY".parse::<AggregationLevel>().unwrap(), AggregationLevel::Day);
/// ```
impl fmt::Display for AggregationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregationLevel {
    type Err = FeatureKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hour" => Ok(AggregationLevel::Hour),
            "day" => Ok(AggregationLevel::Day),
            "week" => Ok(AggregationLevel::Week),
            _ => Err(FeatureKeyError::InvalidArgument {
                argument: "aggregation_level",
                value: s.to_string(),
            }),
        }
    }
}

/// The spatial granularity of a measurement query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "points", rename_all = "lowercase")]
pub enum AggregationLocation {
    /// One value per parameter and time bucket, averaged over the whole grid.
    Country,
    /// One series per listed point. Returned records carry the point's index in this list.
    Points(Vec<LatLon>),
}

impl fmt::Display for AggregationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationLocation::Country => write!(f, "country"),
            AggregationLocation::Points(points) => write!(f, "{} points", points.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!("hour".parse::<AggregationLevel>().unwrap(), AggregationLevel::Hour);
        assert_eq!("Week".parse::<AggregationLevel>().unwrap(), AggregationLevel::Week);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = "month".parse::<AggregationLevel>().unwrap_err();
        assert!(matches!(
            err,
            FeatureKeyError::InvalidArgument { argument: "aggregation_level", .. }
        ));
    }

    #[test]
    fn location_round_trips_through_json() {
        let location = AggregationLocation::Points(vec![LatLon(46.05, 14.51)]);
        let json = serde_json::to_string(&location).unwrap();
        let back: AggregationLocation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, location);

        let country: AggregationLocation = serde_json::from_str(r#"{"type":"country"}"#).unwrap();
        assert_eq!(country, AggregationLocation::Country);
    }
}
