//! The interface the enrichment engine needs from a store of weather measurements.

use crate::source::error::MeasurementSourceError;
use crate::types::aggregation::{AggregationLevel, AggregationLocation};
use crate::types::measurement::MeasurementRecord;
use chrono::NaiveDate;

/// A read-only, time-indexed store of weather observations and forecasts.
///
/// Implementations must not mutate shared state while answering queries, so one
/// loaded source can serve many enrichment runs, including from several threads.
pub trait MeasurementSource: Send + Sync {
    /// Observed weather with validity dates in `from..=to`, aggregated to
    /// `aggregation_time` buckets and `aggregation_location` scope.
    fn query_actual(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        aggregation_time: AggregationLevel,
        aggregation_location: &AggregationLocation,
    ) -> Result<Vec<MeasurementRecord>, MeasurementSourceError>;

    /// Forecasts issued on `base` with validity dates in `from..=to`.
    fn query_forecast(
        &self,
        base: NaiveDate,
        from: NaiveDate,
        to: NaiveDate,
        aggregation_time: AggregationLevel,
        aggregation_location: &AggregationLocation,
    ) -> Result<Vec<MeasurementRecord>, MeasurementSourceError>;
}

impl<T: MeasurementSource + ?Sized> MeasurementSource for &T {
    fn query_actual(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        aggregation_time: AggregationLevel,
        aggregation_location: &AggregationLocation,
    ) -> Result<Vec<MeasurementRecord>, MeasurementSourceError> {
        (**self).query_actual(from, to, aggregation_time, aggregation_location)
    }

    fn query_forecast(
        &self,
        base: NaiveDate,
        from: NaiveDate,
        to: NaiveDate,
        aggregation_time: AggregationLevel,
        aggregation_location: &AggregationLocation,
    ) -> Result<Vec<MeasurementRecord>, MeasurementSourceError> {
        (**self).query_forecast(base, from, to, aggregation_time, aggregation_location)
    }
}
