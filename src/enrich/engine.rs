//! Turns reference dates into weather feature rows and appends them to a table.

use crate::enrich::config::{EnrichmentConfig, FailurePolicy, KeyScheme};
use crate::enrich::mapping::FeatureMapping;
use crate::enrich::window::WindowSpec;
use crate::error::EnrichError;
use crate::feature_key::encoder::{encode, KeyQualifier};
use crate::feature_key::error::FeatureKeyError;
use crate::source::error::MeasurementSourceError;
use crate::source::measurement_source::MeasurementSource;
use crate::table::io::reference_dates;
use crate::table::merge::merge_features;
use crate::types::kind::MeasurementKind;
use crate::types::measurement::MeasurementRecord;
use crate::utils::midnight;
use bon::bon;
use chrono::NaiveDate;
use log::{debug, info, warn};
use polars::prelude::DataFrame;

/// Enriches dated rows with weather features from a [`MeasurementSource`].
///
/// Every row is handled on its own: the configured windows are resolved against
/// the row's date, queried, and each tracked measurement becomes one feature
/// keyed relative to that date. The source is only read, never modified.
///
/// # Examples
///
/// ```no_run
/// # use weather_enrich::{EnrichError, GriddedSource, WeatherEnricher, read_table, write_table, enriched_path, DEFAULT_SEPARATOR};
/// # use std::path::Path;
/// # fn main() -> Result<(), EnrichError> {
/// let source = GriddedSource::from_path(Path::new("jan2015-feb2015.tsv")).load()?;
/// let enricher = WeatherEnricher::builder().source(source).build()?;
///
/// let input = Path::new("sales.csv");
/// let table = read_table(input, DEFAULT_SEPARATOR)?;
/// let mut enriched = enricher.enrich(table)?;
/// write_table(&mut enriched, &enriched_path(input), DEFAULT_SEPARATOR)?;
/// # Ok(())
/// # }
/// ```
pub struct WeatherEnricher<S> {
    source: S,
    config: EnrichmentConfig,
}

#[bon]
impl<S: MeasurementSource> WeatherEnricher<S> {
    /// Creates an enricher. Without a `config`, [`EnrichmentConfig::country`] is used.
    ///
    /// # Errors
    ///
    /// [`EnrichError::InvalidConfig`] if the configuration does not validate.
    #[builder]
    pub fn new(
        source: S,
        #[builder(default = EnrichmentConfig::country())] config: EnrichmentConfig,
    ) -> Result<Self, EnrichError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn query_window(
        &self,
        date: NaiveDate,
        spec: &WindowSpec,
    ) -> Result<Vec<MeasurementRecord>, EnrichError> {
        let range = spec
            .span
            .resolve(date)
            .ok_or(EnrichError::WindowOutOfCalendar {
                date,
                span: spec.span,
            })?;
        debug!(
            "Querying {} {} at {} level for {}",
            spec.kind, range, spec.aggregation, date
        );
        let records = match spec.kind {
            MeasurementKind::Actual => self.source.query_actual(
                range.start,
                range.end,
                spec.aggregation,
                &self.config.location,
            )?,
            MeasurementKind::Forecast => self.source.query_forecast(
                date,
                range.start,
                range.end,
                spec.aggregation,
                &self.config.location,
            )?,
        };
        Ok(records)
    }

    fn qualifier(
        &self,
        spec: &WindowSpec,
        record: &MeasurementRecord,
    ) -> Result<KeyQualifier, FeatureKeyError> {
        match self.config.scheme {
            KeyScheme::KindMarked => Ok(KeyQualifier::Kind(spec.kind)),
            KeyScheme::LocationIndexed => record
                .location
                .map(KeyQualifier::Location)
                .ok_or_else(|| FeatureKeyError::InvalidArgument {
                    argument: "location_index",
                    value: format!("missing on '{}' at {}", record.param, record.validity),
                }),
        }
    }

    /// All weather features of one reference date.
    ///
    /// Fails as a whole if any window query or key encoding fails; a partially
    /// filled mapping is never returned.
    pub fn features_for_date(&self, date: NaiveDate) -> Result<FeatureMapping, EnrichError> {
        let reference = midnight(date);
        let mut features = FeatureMapping::new();

        for spec in &self.config.windows {
            for record in self.query_window(date, spec)? {
                if !self.config.tracks(&record.param) {
                    debug!("Skipping untracked parameter '{}'", record.param);
                    continue;
                }
                let value = record.representative_value().ok_or_else(|| {
                    MeasurementSourceError::EmptyRecord {
                        param: record.param.clone(),
                        validity: record.validity.to_string(),
                    }
                })?;
                let key = encode(
                    reference,
                    record.validity,
                    self.qualifier(spec, &record)?,
                    spec.aggregation,
                    &record.param,
                )?;
                if let Some(previous) = features.insert(key, value) {
                    debug!("Feature for {} overwritten ({} replaced)", date, previous);
                }
            }
        }
        Ok(features)
    }

    /// Features for each date, in order. Row failures follow the configured [`FailurePolicy`].
    pub fn enrich_dates(&self, dates: &[NaiveDate]) -> Result<Vec<FeatureMapping>, EnrichError> {
        let mut rows = Vec::with_capacity(dates.len());
        let mut failed = 0usize;

        for (row, &date) in dates.iter().enumerate() {
            match self.features_for_date(date) {
                Ok(features) => {
                    debug!("Row {} ({}): {} features", row, date, features.len());
                    rows.push(features);
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(EnrichError::Row {
                            row,
                            date,
                            source: Box::new(e),
                        })
                    }
                    FailurePolicy::EmptyRow => {
                        warn!("Row {} ({}) left without weather features: {}", row, date, e);
                        failed += 1;
                        rows.push(FeatureMapping::new());
                    }
                },
            }
        }

        info!(
            "Enriched {} of {} rows",
            dates.len() - failed,
            dates.len()
        );
        Ok(rows)
    }

    /// Appends weather feature columns to `table`, narrowed by the configured selection.
    ///
    /// The `Date` column is validated before any row is processed.
    pub fn enrich(&self, table: DataFrame) -> Result<DataFrame, EnrichError> {
        let dates = reference_dates(&table)?;
        let features = self.enrich_dates(&dates)?;
        let merged = merge_features(table, &features)?;
        match &self.config.selection {
            Some(selector) => Ok(selector.select(merged)?),
            None => Ok(merged),
        }
    }
}
