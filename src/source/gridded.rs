//! A [`MeasurementSource`] backed by a gridded measurement file loaded into memory.

use crate::source::error::MeasurementSourceError;
use crate::source::grid_locator::{GridLocator, GridPoint};
use crate::source::loader::{extract_observations, read_measurement_frame, Observation};
use crate::source::measurement_source::MeasurementSource;
use crate::source::reduction::{BucketAggregator, HourRange};
use crate::types::aggregation::{AggregationLevel, AggregationLocation};
use crate::types::date_window::DateWindow;
use crate::types::measurement::MeasurementRecord;
use crate::utils::midnight;
use bon::bon;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, info};
use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Default search radius when mapping a requested point onto the grid.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

#[derive(Debug, Clone)]
struct GridObservation {
    grid_id: usize,
    param: String,
    validity: NaiveDateTime,
    base_date: Option<NaiveDate>,
    value: f64,
}

/// Weather observations and forecasts on a lat/lon grid, answering aggregated window queries.
///
/// The dataset is loaded once and never mutated afterwards, so a `GriddedSource`
/// can be shared freely between enrichment runs.
///
/// # Examples
///
/// ```no_run
/// # use weather_enrich::{BucketAggregator, GriddedSource, HourRange, MeasurementSourceError};
/// # use std::path::Path;
/// # fn main() -> Result<(), MeasurementSourceError> {
/// let source = GriddedSource::from_path(Path::new("data/jan2015-feb2015.tsv"))
///     .max_distance_km(25.0)
///     .aggregator(BucketAggregator::Max)
///     .hours(HourRange::new(6, 18)?)
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GriddedSource {
    observations: Vec<GridObservation>,
    grid: GridLocator,
    coverage: Option<DateWindow>,
    max_distance_km: f64,
    aggregator: BucketAggregator,
    hours: HourRange,
}

#[bon]
impl GriddedSource {
    /// Loads the measurement file at `path`.
    ///
    /// Only measurements whose validity hour lies in `hours` are used, and each time
    /// bucket is reduced with `aggregator`. By default every hour is used and
    /// cumulative parameters are summed while instant ones are averaged.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementSourceError::FileOpen`] or [`MeasurementSourceError::FileRead`]
    /// if the file cannot be read, [`MeasurementSourceError::MissingColumn`] if one of the
    /// required columns is absent and [`MeasurementSourceError::InvalidCell`] for unparseable values.
    #[builder(start_fn = from_path, finish_fn = load)]
    #[doc(hidden)]
    pub fn build_from_path(
        #[builder(start_fn)] path: &Path,
        #[builder(default = DEFAULT_MAX_DISTANCE_KM)] max_distance_km: f64,
        #[builder(default)] aggregator: BucketAggregator,
        #[builder(default)] hours: HourRange,
    ) -> Result<Self, MeasurementSourceError> {
        info!("Loading measurement data from {:?}", path);
        let frame = read_measurement_frame(path)?;
        let observations = extract_observations(&frame, path)?;
        let source = Self::from_observations(observations, max_distance_km)
            .with_reduction(aggregator, hours);
        info!(
            "Loaded {} measurements on {} grid points, covering {}",
            source.observations.len(),
            source.grid.len(),
            source
                .coverage
                .map(|c| c.to_string())
                .unwrap_or_else(|| "no dates".to_string())
        );
        Ok(source)
    }

    pub(crate) fn from_observations(observations: Vec<Observation>, max_distance_km: f64) -> Self {
        let mut grid_ids: HashMap<(OrderedFloat<f64>, OrderedFloat<f64>), usize> = HashMap::new();
        let mut points = Vec::new();
        let mut coverage: Option<DateWindow> = None;

        let observations = observations
            .into_iter()
            .map(|o| {
                let key = (OrderedFloat(o.latitude), OrderedFloat(o.longitude));
                let grid_id = *grid_ids.entry(key).or_insert_with(|| {
                    points.push(GridPoint {
                        id: points.len(),
                        latitude: o.latitude,
                        longitude: o.longitude,
                    });
                    points.len() - 1
                });

                let date = o.validity.date();
                coverage = Some(match coverage {
                    Some(c) => DateWindow::new(c.start.min(date), c.end.max(date)),
                    None => DateWindow::new(date, date),
                });

                GridObservation {
                    grid_id,
                    param: o.param,
                    validity: o.validity,
                    base_date: o.base_date,
                    value: o.value,
                }
            })
            .collect();

        Self {
            observations,
            grid: GridLocator::new(points),
            coverage,
            max_distance_km,
            aggregator: BucketAggregator::default(),
            hours: HourRange::ALL_DAY,
        }
    }

    pub(crate) fn with_reduction(
        mut self,
        aggregator: BucketAggregator,
        hours: HourRange,
    ) -> Self {
        self.aggregator = aggregator;
        self.hours = hours;
        self
    }

    /// The first and last validity dates present in the dataset.
    pub fn coverage(&self) -> Option<DateWindow> {
        self.coverage
    }

    fn query(
        &self,
        base: Option<NaiveDate>,
        from: NaiveDate,
        to: NaiveDate,
        aggregation_time: AggregationLevel,
        aggregation_location: &AggregationLocation,
    ) -> Result<Vec<MeasurementRecord>, MeasurementSourceError> {
        if from > to {
            return Err(MeasurementSourceError::InvalidRange { from, to });
        }
        let window = DateWindow::new(from, to);
        if let Some(coverage) = self.coverage {
            if window.end < coverage.start || window.start > coverage.end {
                return Err(MeasurementSourceError::OutOfCoverage {
                    from,
                    to,
                    first: coverage.start,
                    last: coverage.end,
                });
            }
        }

        let selected = || {
            self.observations
                .iter()
                .filter(move |o| {
                    o.base_date == base
                        && window.contains(o.validity.date())
                        && self.hours.contains(o.validity.hour())
                })
        };

        let records = match aggregation_location {
            AggregationLocation::Country => {
                aggregate(selected(), aggregation_time, self.aggregator, None)
            }
            AggregationLocation::Points(points) => {
                if points.is_empty() {
                    return Err(MeasurementSourceError::EmptyPointList);
                }
                let mut records = Vec::new();
                for (index, point) in points.iter().enumerate() {
                    let (grid_point, dist_km) = self
                        .grid
                        .nearest(*point, self.max_distance_km)
                        .ok_or(MeasurementSourceError::NoGridPointNearby {
                            index,
                            latitude: point.0,
                            longitude: point.1,
                            max_distance_km: self.max_distance_km,
                        })?;
                    debug!(
                        "Point {} ({}, {}) mapped to grid point {} at {:.1} km",
                        index, point.0, point.1, grid_point.id, dist_km
                    );
                    let at_point = selected().filter(|o| o.grid_id == grid_point.id);
                    records.extend(aggregate(
                        at_point,
                        aggregation_time,
                        self.aggregator,
                        Some(index),
                    ));
                }
                records
            }
        };

        debug!(
            "Query {} {} ({}, {}) returned {} records",
            base.map(|b| format!("forecast from {}", b))
                .unwrap_or_else(|| "actual".to_string()),
            window,
            aggregation_time,
            aggregation_location,
            records.len()
        );
        Ok(records)
    }
}

impl MeasurementSource for GriddedSource {
    fn query_actual(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        aggregation_time: AggregationLevel,
        aggregation_location: &AggregationLocation,
    ) -> Result<Vec<MeasurementRecord>, MeasurementSourceError> {
        self.query(None, from, to, aggregation_time, aggregation_location)
    }

    fn query_forecast(
        &self,
        base: NaiveDate,
        from: NaiveDate,
        to: NaiveDate,
        aggregation_time: AggregationLevel,
        aggregation_location: &AggregationLocation,
    ) -> Result<Vec<MeasurementRecord>, MeasurementSourceError> {
        self.query(Some(base), from, to, aggregation_time, aggregation_location)
    }
}

/// Start of the bucket `validity` falls into: the full hour, midnight, or Monday midnight.
fn bucket_start(validity: NaiveDateTime, level: AggregationLevel) -> NaiveDateTime {
    match level {
        AggregationLevel::Hour => NaiveTime::from_hms_opt(validity.hour(), 0, 0)
            .map(|time| validity.date().and_time(time))
            .unwrap_or(validity),
        AggregationLevel::Day => midnight(validity.date()),
        AggregationLevel::Week => {
            let days_since_monday = i64::from(validity.weekday().num_days_from_monday());
            midnight(validity.date() - Duration::days(days_since_monday))
        }
    }
}

/// Averages over grid points per timestamp, then reduces each time bucket with `aggregator`.
fn aggregate<'a>(
    observations: impl Iterator<Item = &'a GridObservation>,
    level: AggregationLevel,
    aggregator: BucketAggregator,
    location: Option<usize>,
) -> Vec<MeasurementRecord> {
    let mut spatial: BTreeMap<(&'a str, NaiveDateTime), (f64, usize)> = BTreeMap::new();
    for o in observations {
        let entry = spatial.entry((o.param.as_str(), o.validity)).or_insert((0.0, 0));
        entry.0 += o.value;
        entry.1 += 1;
    }

    let mut buckets: BTreeMap<(&'a str, NaiveDateTime), Vec<f64>> = BTreeMap::new();
    for ((param, validity), (sum, count)) in spatial {
        buckets
            .entry((param, bucket_start(validity, level)))
            .or_default()
            .push(sum / count as f64);
    }

    buckets
        .into_iter()
        .filter_map(|((param, bucket), series)| {
            let value = aggregator.reduce(param, &series)?;
            let record = MeasurementRecord::new(bucket, param, vec![value]);
            Some(match location {
                Some(index) => record.at_location(index),
                None => record,
            })
        })
        .collect()
}
