//! Narrowing an enriched table down to the weather features a model needs.

use crate::feature_key::encoder::KeyQualifier;
use crate::feature_key::key::{DecodedKey, FeatureKey};
use crate::table::error::TableError;
use crate::types::aggregation::AggregationLevel;
use crate::types::kind::MeasurementKind;
use bon::Builder;
use log::{debug, info};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Criteria a feature column must meet to be kept.
///
/// Every criterion that is set must match; empty lists and unset bounds accept anything.
/// Columns whose name is not a feature key are never touched.
///
/// ```
/// use weather_enrich::{AggregationLevel, FeatureSelector};
///
/// let selector = FeatureSelector::builder()
///     .levels(vec![AggregationLevel::Day])
///     .min_offset(-2)
///     .max_offset(0)
///     .parameters(vec!["2t".to_string()])
///     .build();
/// assert!(selector.matches("WEATHERACDAY-012t"));
/// assert!(!selector.matches("WEATHERFCDAY+012t"));
/// assert!(!selector.matches("WEATHERACWEEK-012t"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct FeatureSelector {
    #[builder(default)]
    pub levels: Vec<AggregationLevel>,
    pub min_offset: Option<i64>,
    pub max_offset: Option<i64>,
    #[builder(default)]
    pub parameters: Vec<String>,
    #[builder(default)]
    pub kinds: Vec<MeasurementKind>,
    #[builder(default)]
    pub locations: Vec<usize>,
    /// Substrings of which the column name must contain at least one.
    #[builder(default)]
    pub name_contains: Vec<String>,
}

impl FeatureSelector {
    /// Whether `name` is a feature key meeting every criterion.
    pub fn matches(&self, name: &str) -> bool {
        FeatureKey::decode(name).is_ok_and(|key| self.matches_decoded(name, &key))
    }

    fn matches_decoded(&self, name: &str, key: &DecodedKey) -> bool {
        let qualifier_ok = match key.qualifier {
            KeyQualifier::Kind(kind) => {
                self.locations.is_empty() && (self.kinds.is_empty() || self.kinds.contains(&kind))
            }
            KeyQualifier::Location(index) => {
                self.kinds.is_empty()
                    && (self.locations.is_empty() || self.locations.contains(&index))
            }
        };

        qualifier_ok
            && (self.levels.is_empty() || self.levels.contains(&key.level))
            && self.min_offset.map_or(true, |min| key.offset >= min)
            && self.max_offset.map_or(true, |max| key.offset <= max)
            && (self.parameters.is_empty() || self.parameters.iter().any(|p| *p == key.param))
            && (self.name_contains.is_empty()
                || self.name_contains.iter().any(|part| name.contains(part.as_str())))
    }

    /// Drops the feature columns of `table` that do not match.
    ///
    /// # Errors
    ///
    /// [`TableError::NoMatchingFeatures`] if the table has feature columns but none of them match.
    pub fn select(&self, table: DataFrame) -> Result<DataFrame, TableError> {
        let mut kept = Vec::with_capacity(table.width());
        let mut features = 0usize;
        let mut selected = 0usize;

        for name in table.get_column_names() {
            match FeatureKey::decode(name.as_str()) {
                Ok(key) => {
                    features += 1;
                    if self.matches_decoded(name.as_str(), &key) {
                        selected += 1;
                        kept.push(name.clone());
                    } else {
                        debug!("Dropping feature column '{}'", name);
                    }
                }
                Err(_) => kept.push(name.clone()),
            }
        }

        if features > 0 && selected == 0 {
            return Err(TableError::NoMatchingFeatures { features });
        }
        info!("Selected {} of {} feature columns", selected, features);
        Ok(table.select(kept)?)
    }
}
