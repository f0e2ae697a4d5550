//! Encodes a measurement's temporal relation to a reference instant into a feature key.
//!
//! Keys follow the layout `WEATHER[AC|FC]LEVEL±NNparam[LL]`:
//!
//! * `WEATHER` distinguishes weather features from other feature families.
//! * `AC`/`FC` marks actual or forecast weather (kind-marked scheme only).
//! * `LEVEL` is the aggregation level, `HOUR`, `DAY` or `WEEK`.
//! * `±NN` is the signed offset in units of the level, zero rendered as `+00`.
//! * `param` is the parameter short name, e.g. `2t`, `tcc`, `tp`.
//! * `LL` is the two-digit location index (location-indexed scheme only).
//!
//! With a reference instant of 2017-07-10 00:00:
//!
//! * `WEATHERACDAY+002t` actual daily temperature on 2017-07-10
//! * `WEATHERFCDAY+042t` forecast daily temperature for 2017-07-14
//! * `WEATHERACWEEK-012t` actual temperature of the week 2017-07-03..09
//! * `WEATHERDAY-01tp03` precipitation on 2017-07-09 at the fourth location

use crate::feature_key::error::FeatureKeyError;
use crate::feature_key::key::FeatureKey;
use crate::types::aggregation::AggregationLevel;
use crate::types::kind::MeasurementKind;
use chrono::{Datelike, NaiveDateTime};
use std::fmt::Write;

pub const KEY_PREFIX: &str = "WEATHER";

/// Largest magnitude that fits a two-digit key field.
pub const MAX_FIELD_VALUE: i64 = 99;

/// The scheme-specific part of a key: a kind marker or a location index, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyQualifier {
    Kind(MeasurementKind),
    Location(usize),
}

/// Signed distance from `reference` to `measured` in units of `level`.
///
/// Hours are truncated toward zero, so a 90 minute difference is one hour.
/// Days compare calendar dates only. Weeks subtract ISO week numbers without
/// accounting for the ISO year, so late December against early January wraps.
pub fn offset_between(
    reference: NaiveDateTime,
    measured: NaiveDateTime,
    level: AggregationLevel,
) -> i64 {
    match level {
        AggregationLevel::Hour => (measured - reference).num_seconds() / 3600,
        AggregationLevel::Day => (measured.date() - reference.date()).num_days(),
        AggregationLevel::Week => {
            i64::from(measured.iso_week().week()) - i64::from(reference.iso_week().week())
        }
    }
}

fn push_signed(out: &mut String, offset: i64) -> Result<(), FeatureKeyError> {
    if offset.abs() > MAX_FIELD_VALUE {
        return Err(FeatureKeyError::ValueOutOfRange {
            field: "offset",
            value: offset,
        });
    }
    let sign = if offset >= 0 { '+' } else { '-' };
    // Writing to a String cannot fail.
    let _ = write!(out, "{}{:02}", sign, offset.abs());
    Ok(())
}

/// Builds the feature key for one measurement.
///
/// # Errors
///
/// * [`FeatureKeyError::InvalidArgument`] if `param` is empty.
/// * [`FeatureKeyError::ValueOutOfRange`] if the offset or the location index
///   does not fit two digits.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use weather_enrich::{encode, AggregationLevel, KeyQualifier, MeasurementKind};
///
/// let reference = NaiveDate::from_ymd_opt(2015, 1, 22).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let measured = NaiveDate::from_ymd_opt(2015, 1, 20).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let key = encode(
///     reference,
///     measured,
///     KeyQualifier::Kind(MeasurementKind::Actual),
///     AggregationLevel::Day,
///     "2t",
/// )
/// .unwrap();
/// assert_eq!(key.as_str(), "WEATHERACDAY-022t");
/// ```
pub fn encode(
    reference: NaiveDateTime,
    measured: NaiveDateTime,
    qualifier: KeyQualifier,
    level: AggregationLevel,
    param: &str,
) -> Result<FeatureKey, FeatureKeyError> {
    if param.is_empty() {
        return Err(FeatureKeyError::InvalidArgument {
            argument: "parameter_code",
            value: String::new(),
        });
    }

    let mut key = String::with_capacity(KEY_PREFIX.len() + 12 + param.len());
    key.push_str(KEY_PREFIX);
    if let KeyQualifier::Kind(kind) = qualifier {
        key.push_str(kind.code());
    }
    key.push_str(level.key_tag());
    push_signed(&mut key, offset_between(reference, measured, level))?;
    key.push_str(param);
    if let KeyQualifier::Location(index) = qualifier {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        if index > MAX_FIELD_VALUE {
            return Err(FeatureKeyError::ValueOutOfRange {
                field: "location index",
                value: index,
            });
        }
        let _ = write!(key, "{:02}", index);
    }
    Ok(FeatureKey::from_encoded(key))
}

/// Same as [`encode`] for the kind-marked scheme, with textual kind and level
/// (`"ac"`/`"fc"`, `"hour"`/`"day"`/`"week"`, any case).
///
/// # Errors
///
/// [`FeatureKeyError::InvalidArgument`] for an unknown kind or level, plus the errors of [`encode`].
pub fn encode_str(
    reference: NaiveDateTime,
    measured: NaiveDateTime,
    kind: &str,
    level: &str,
    param: &str,
) -> Result<FeatureKey, FeatureKeyError> {
    let kind: MeasurementKind = kind.parse()?;
    let level: AggregationLevel = level.parse()?;
    encode(reference, measured, KeyQualifier::Kind(kind), level, param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn actual() -> KeyQualifier {
        KeyQualifier::Kind(MeasurementKind::Actual)
    }

    #[test]
    fn hourly_keys_relative_to_noon() {
        let reference = at(2017, 7, 10, 12, 0);
        let cases = [
            (at(2017, 7, 10, 12, 0), "WEATHERACHOUR+002t"),
            (at(2017, 7, 10, 6, 0), "WEATHERACHOUR-062t"),
            (at(2017, 7, 10, 18, 0), "WEATHERACHOUR+062t"),
            (at(2017, 7, 11, 18, 0), "WEATHERACHOUR+302t"),
        ];
        for (measured, expected) in cases {
            let key = encode(reference, measured, actual(), AggregationLevel::Hour, "2t").unwrap();
            assert_eq!(key.as_str(), expected);
        }
    }

    #[test]
    fn forecast_and_daily_keys() {
        let reference = at(2017, 7, 10, 0, 0);
        let key = encode(
            reference,
            at(2017, 7, 14, 0, 0),
            KeyQualifier::Kind(MeasurementKind::Forecast),
            AggregationLevel::Day,
            "2t",
        )
        .unwrap();
        assert_eq!(key.as_str(), "WEATHERFCDAY+042t");
    }

    #[test]
    fn hours_truncate_toward_zero() {
        let reference = at(2015, 1, 22, 0, 0);
        let later = reference + Duration::minutes(90);
        let earlier = reference - Duration::minutes(90);
        let almost = reference + Duration::minutes(59);

        let key = |m| encode(reference, m, actual(), AggregationLevel::Hour, "tp").unwrap();
        assert_eq!(key(later).as_str(), "WEATHERACHOUR+01tp");
        assert_eq!(key(earlier).as_str(), "WEATHERACHOUR-01tp");
        assert_eq!(key(almost).as_str(), "WEATHERACHOUR+00tp");
    }

    #[test]
    fn days_ignore_time_of_day() {
        let reference = at(2015, 1, 22, 23, 0);
        let measured = at(2015, 1, 23, 1, 0);
        assert_eq!(offset_between(reference, measured, AggregationLevel::Day), 1);
    }

    #[test]
    fn weeks_count_iso_week_numbers_not_seven_day_buckets() {
        // Monday of ISO week 4 and Thursday of ISO week 5, ten days apart.
        let reference = at(2015, 1, 19, 0, 0);
        let measured = at(2015, 1, 29, 0, 0);
        assert_eq!((measured - reference).num_days(), 10);
        assert_eq!(offset_between(reference, measured, AggregationLevel::Week), 1);

        let key = encode(reference, measured, actual(), AggregationLevel::Week, "tcc").unwrap();
        assert_eq!(key.as_str(), "WEATHERACWEEK+01tcc");
    }

    #[test]
    fn previous_week_of_a_monday() {
        let reference = at(2017, 7, 10, 0, 0);
        let key = encode(reference, at(2017, 7, 3, 0, 0), actual(), AggregationLevel::Week, "2t")
            .unwrap();
        assert_eq!(key.as_str(), "WEATHERACWEEK-012t");
    }

    #[test]
    fn week_numbers_wrap_at_year_boundary() {
        // 2015-12-28 is in ISO week 53, 2016-01-04 in ISO week 1.
        let reference = at(2016, 1, 4, 0, 0);
        let measured = at(2015, 12, 28, 0, 0);
        assert_eq!(offset_between(reference, measured, AggregationLevel::Week), 52);
    }

    #[test]
    fn location_index_is_appended() {
        let reference = at(2015, 1, 22, 0, 0);
        let key = encode(
            reference,
            at(2015, 1, 21, 0, 0),
            KeyQualifier::Location(3),
            AggregationLevel::Day,
            "tp",
        )
        .unwrap();
        assert_eq!(key.as_str(), "WEATHERDAY-01tp03");
    }

    #[test]
    fn offsets_beyond_two_digits_are_rejected() {
        let reference = at(2015, 1, 1, 0, 0);
        let err = encode(
            reference,
            reference + Duration::days(100),
            actual(),
            AggregationLevel::Day,
            "2t",
        )
        .unwrap_err();
        assert_eq!(
            err,
            FeatureKeyError::ValueOutOfRange {
                field: "offset",
                value: 100
            }
        );

        let edge = encode(
            reference,
            reference - Duration::days(99),
            actual(),
            AggregationLevel::Day,
            "2t",
        )
        .unwrap();
        assert_eq!(edge.as_str(), "WEATHERACDAY-992t");
    }

    #[test]
    fn location_index_beyond_two_digits_is_rejected() {
        let reference = at(2015, 1, 1, 0, 0);
        let err = encode(
            reference,
            reference,
            KeyQualifier::Location(100),
            AggregationLevel::Day,
            "2t",
        )
        .unwrap_err();
        assert!(matches!(err, FeatureKeyError::ValueOutOfRange { field: "location index", .. }));
    }

    #[test]
    fn textual_arguments_are_validated() {
        let reference = at(2015, 1, 1, 0, 0);
        assert_eq!(
            encode_str(reference, reference, "fc", "DAY", "tp").unwrap().as_str(),
            "WEATHERFCDAY+00tp"
        );
        assert!(matches!(
            encode_str(reference, reference, "fc", "month", "tp"),
            Err(FeatureKeyError::InvalidArgument { argument: "aggregation_level", .. })
        ));
        assert!(matches!(
            encode_str(reference, reference, "obs", "day", "tp"),
            Err(FeatureKeyError::InvalidArgument { argument: "kind_marker", .. })
        ));
        assert!(matches!(
            encode_str(reference, reference, "ac", "day", ""),
            Err(FeatureKeyError::InvalidArgument { argument: "parameter_code", .. })
        ));
    }

    #[test]
    fn encoding_is_deterministic() {
        let reference = at(2015, 1, 22, 0, 0);
        let measured = at(2015, 1, 24, 0, 0);
        let first = encode(reference, measured, actual(), AggregationLevel::Day, "tcc").unwrap();
        let second = encode(reference, measured, actual(), AggregationLevel::Day, "tcc").unwrap();
        assert_eq!(first, second);
    }
}
