//! Which windows are queried per row and how their measurements are named.

use crate::enrich::window::{WindowSpan, WindowSpec};
use crate::error::EnrichError;
use crate::feature_key::encoder::MAX_FIELD_VALUE;
use crate::table::select::FeatureSelector;
use crate::types::aggregation::{AggregationLevel, AggregationLocation};
use crate::types::lat_lon::LatLon;
use crate::types::measurement::TRACKED_PARAMETERS;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the kind/location part of a feature key is filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// Keys carry `AC`/`FC`, queries are country-wide.
    #[default]
    KindMarked,
    /// Keys carry the two-digit index of the requested point, queries are per point.
    LocationIndexed,
}

/// What happens to the batch when one row cannot be enriched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop and return the row's error.
    #[default]
    Abort,
    /// Log the error and keep the row without any weather features.
    EmptyRow,
}

fn default_location() -> AggregationLocation {
    AggregationLocation::Country
}

fn default_parameters() -> Vec<String> {
    TRACKED_PARAMETERS.iter().map(|p| p.to_string()).collect()
}

/// Enrichment settings.
///
/// Start from one of the presets, [`EnrichmentConfig::country`] or
/// [`EnrichmentConfig::per_location`], or assemble one with the builder:
///
/// ```
/// use weather_enrich::{AggregationLevel, EnrichmentConfig, WindowSpan, WindowSpec};
///
/// let config = EnrichmentConfig::builder()
///     .windows(vec![
///         WindowSpec::actual(WindowSpan::SameDay, AggregationLevel::Hour),
///         WindowSpec::forecast(WindowSpan::DaysAhead { days: 3 }, AggregationLevel::Day),
///     ])
///     .parameters(vec!["2t".to_string()])
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct EnrichmentConfig {
    pub windows: Vec<WindowSpec>,
    #[builder(default)]
    #[serde(default)]
    pub scheme: KeyScheme,
    #[builder(default = default_location())]
    #[serde(default = "default_location")]
    pub location: AggregationLocation,
    #[builder(default = default_parameters())]
    #[serde(default = "default_parameters")]
    pub parameters: Vec<String>,
    #[builder(default)]
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Keeps only the matching feature columns of the enriched table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<FeatureSelector>,
}

impl EnrichmentConfig {
    /// Country-wide features: actual weather on the day, the two days before and
    /// the previous ISO week, plus the forecast for the next two days.
    pub fn country() -> Self {
        Self {
            windows: vec![
                WindowSpec::actual(WindowSpan::SameDay, AggregationLevel::Day),
                WindowSpec::actual(WindowSpan::DaysPrior { days: 2 }, AggregationLevel::Day),
                WindowSpec::actual(WindowSpan::PriorIsoWeek, AggregationLevel::Week),
                WindowSpec::forecast(WindowSpan::DaysAhead { days: 2 }, AggregationLevel::Day),
            ],
            scheme: KeyScheme::KindMarked,
            location: AggregationLocation::Country,
            parameters: default_parameters(),
            failure_policy: FailurePolicy::Abort,
            selection: None,
        }
    }

    /// Per-point features: actual weather on the day and the two days before, plus
    /// the forecast for the next two days, each keyed by the point's index.
    pub fn per_location(points: Vec<LatLon>) -> Self {
        Self {
            windows: vec![
                WindowSpec::actual(WindowSpan::SameDay, AggregationLevel::Day),
                WindowSpec::actual(WindowSpan::DaysPrior { days: 2 }, AggregationLevel::Day),
                WindowSpec::forecast(WindowSpan::DaysAhead { days: 2 }, AggregationLevel::Day),
            ],
            scheme: KeyScheme::LocationIndexed,
            location: AggregationLocation::Points(points),
            parameters: default_parameters(),
            failure_policy: FailurePolicy::Abort,
            selection: None,
        }
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, EnrichError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EnrichError::ConfigRead(path.to_path_buf(), e))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| EnrichError::ConfigParse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn tracks(&self, param: &str) -> bool {
        self.parameters.iter().any(|p| p == param)
    }

    /// Checks that windows, parameters, scheme and location fit together.
    pub fn validate(&self) -> Result<(), EnrichError> {
        if self.windows.is_empty() {
            return Err(EnrichError::InvalidConfig("no windows configured".into()));
        }
        if let Some(window) = self.windows.iter().find(|w| !w.span.is_well_formed()) {
            return Err(EnrichError::InvalidConfig(format!(
                "window {:?} is empty",
                window.span
            )));
        }
        if let Some(window) = self
            .windows
            .iter()
            .find(|w| w.max_key_offset() > MAX_FIELD_VALUE)
        {
            return Err(EnrichError::InvalidConfig(format!(
                "window {:?} at {} level reaches offset {}, keys hold at most {}",
                window.span,
                window.aggregation,
                window.max_key_offset(),
                MAX_FIELD_VALUE
            )));
        }
        if self.parameters.is_empty() || self.parameters.iter().any(|p| p.is_empty()) {
            return Err(EnrichError::InvalidConfig(
                "parameter list must contain non-empty parameter codes".into(),
            ));
        }
        if let Some(FeatureSelector {
            min_offset: Some(min),
            max_offset: Some(max),
            ..
        }) = &self.selection
        {
            if min > max {
                return Err(EnrichError::InvalidConfig(format!(
                    "selection offset range {}..={} is empty",
                    min, max
                )));
            }
        }
        match (&self.scheme, &self.location) {
            (KeyScheme::KindMarked, AggregationLocation::Country) => Ok(()),
            (KeyScheme::KindMarked, AggregationLocation::Points(_)) => Err(
                EnrichError::InvalidConfig("kind-marked keys require country aggregation".into()),
            ),
            (KeyScheme::LocationIndexed, AggregationLocation::Country) => Err(
                EnrichError::InvalidConfig("location-indexed keys require a point list".into()),
            ),
            (KeyScheme::LocationIndexed, AggregationLocation::Points(points)) => {
                if points.is_empty() {
                    Err(EnrichError::InvalidConfig("point list is empty".into()))
                } else if points.len() as i64 > MAX_FIELD_VALUE + 1 {
                    Err(EnrichError::InvalidConfig(format!(
                        "{} points do not fit two-digit location indices",
                        points.len()
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self::country()
    }
}
