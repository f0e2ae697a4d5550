use crate::feature_key::encoder::{KeyQualifier, KEY_PREFIX};
use crate::feature_key::error::FeatureKeyError;
use crate::types::aggregation::AggregationLevel;
use crate::types::kind::MeasurementKind;
use std::borrow::Borrow;
use std::fmt;

/// The encoded name of one weather feature column.
///
/// Only produced by [`crate::encode`]; use [`FeatureKey::decode`] to read the parts back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureKey(String);

/// The parts of a feature key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey {
    pub qualifier: KeyQualifier,
    pub level: AggregationLevel,
    pub offset: i64,
    pub param: String,
}

impl FeatureKey {
    pub(crate) fn from_encoded(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a key string into its parts.
    ///
    /// Keys without a kind marker are read as location-indexed, so their last two
    /// characters must be the location digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use weather_enrich::{AggregationLevel, FeatureKey, KeyQualifier, MeasurementKind};
    ///
    /// let decoded = FeatureKey::decode("WEATHERFCDAY+01tcc").unwrap();
    /// assert_eq!(decoded.qualifier, KeyQualifier::Kind(MeasurementKind::Forecast));
    /// assert_eq!(decoded.level, AggregationLevel::Day);
    /// assert_eq!(decoded.offset, 1);
    /// assert_eq!(decoded.param, "tcc");
    /// ```
    pub fn decode(key: &str) -> Result<DecodedKey, FeatureKeyError> {
        let malformed = |reason| FeatureKeyError::Malformed {
            key: key.to_string(),
            reason,
        };

        let rest = key
            .strip_prefix(KEY_PREFIX)
            .ok_or_else(|| malformed("missing WEATHER prefix"))?;

        let (kind, rest) = match rest.get(..2) {
            Some("AC") => (Some(MeasurementKind::Actual), &rest[2..]),
            Some("FC") => (Some(MeasurementKind::Forecast), &rest[2..]),
            _ => (None, rest),
        };

        let (level, rest) = [
            AggregationLevel::Hour,
            AggregationLevel::Day,
            AggregationLevel::Week,
        ]
        .into_iter()
        .find_map(|level| rest.strip_prefix(level.key_tag()).map(|r| (level, r)))
        .ok_or_else(|| malformed("unknown aggregation level"))?;

        let sign = match rest.as_bytes().first() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Err(malformed("missing offset sign")),
        };
        let digits = rest
            .get(1..3)
            .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| malformed("offset must have two digits"))?;
        let offset = sign * digits.parse::<i64>().map_err(|_| malformed("bad offset"))?;
        let rest = &rest[3..];

        let (qualifier, param) = match kind {
            Some(kind) => (KeyQualifier::Kind(kind), rest),
            None => {
                let split = rest
                    .len()
                    .checked_sub(2)
                    .filter(|&at| rest.is_char_boundary(at))
                    .ok_or_else(|| malformed("missing location index"))?;
                let (param, location) = rest.split_at(split);
                if !location.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed("location index must have two digits"));
                }
                let location = location
                    .parse::<usize>()
                    .map_err(|_| malformed("bad location index"))?;
                (KeyQualifier::Location(location), param)
            }
        };

        if param.is_empty() {
            return Err(malformed("missing parameter code"));
        }

        Ok(DecodedKey {
            qualifier,
            level,
            offset,
            param: param.to_string(),
        })
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FeatureKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lets maps keyed by `FeatureKey` be queried with plain strings.
impl Borrow<str> for FeatureKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_key::encoder::encode;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn offset_survives_encode_and_decode() {
        let reference = NaiveDate::from_ymd_opt(2015, 6, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let qualifiers = [
            KeyQualifier::Kind(MeasurementKind::Actual),
            KeyQualifier::Kind(MeasurementKind::Forecast),
            KeyQualifier::Location(7),
        ];
        for qualifier in qualifiers {
            for offset in [-99i64, -42, -1, 0, 1, 17, 99] {
                let hourly = encode(
                    reference,
                    reference + Duration::hours(offset),
                    qualifier,
                    AggregationLevel::Hour,
                    "2t",
                )
                .unwrap();
                let daily = encode(
                    reference,
                    reference + Duration::days(offset),
                    qualifier,
                    AggregationLevel::Day,
                    "tcc",
                )
                .unwrap();
                for (key, level) in [(hourly, AggregationLevel::Hour), (daily, AggregationLevel::Day)] {
                    let decoded = FeatureKey::decode(key.as_str()).unwrap();
                    assert_eq!(decoded.offset, offset, "key {}", key);
                    assert_eq!(decoded.level, level);
                    assert_eq!(decoded.qualifier, qualifier);
                }
            }
        }
    }

    #[test]
    fn week_offset_survives_encode_and_decode() {
        let at = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
        // Weeks 53 and 1 around the 2015/2016 turn give the widest ISO week gap.
        let cases = [
            (at(2015, 6, 15), at(2015, 6, 8), -1),
            (at(2015, 6, 15), at(2015, 6, 15), 0),
            (at(2015, 6, 15), at(2015, 6, 28), 1),
            (at(2015, 6, 15), at(2015, 12, 28), 28),
            (at(2016, 1, 4), at(2015, 12, 28), 52),
            (at(2015, 12, 28), at(2016, 1, 4), -52),
        ];
        for qualifier in [
            KeyQualifier::Kind(MeasurementKind::Actual),
            KeyQualifier::Location(3),
        ] {
            for (reference, measured, offset) in cases {
                let key = encode(reference, measured, qualifier, AggregationLevel::Week, "tp")
                    .unwrap();
                let decoded = FeatureKey::decode(key.as_str()).unwrap();
                assert_eq!(decoded.offset, offset, "key {}", key);
                assert_eq!(decoded.level, AggregationLevel::Week);
                assert_eq!(decoded.qualifier, qualifier);
                assert_eq!(decoded.param, "tp");
            }
        }
    }

    #[test]
    fn decodes_location_keys() {
        let decoded = FeatureKey::decode("WEATHERWEEK-01tp12").unwrap();
        assert_eq!(decoded.qualifier, KeyQualifier::Location(12));
        assert_eq!(decoded.level, AggregationLevel::Week);
        assert_eq!(decoded.offset, -1);
        assert_eq!(decoded.param, "tp");
    }

    #[test]
    fn rejects_malformed_keys() {
        for key in [
            "NEWSACDAY+002t",
            "WEATHERACMONTH+002t",
            "WEATHERACDAY002t",
            "WEATHERACDAY+0x2t",
            "WEATHERACDAY+00",
            "WEATHERDAY+002t",
        ] {
            assert!(
                matches!(FeatureKey::decode(key), Err(FeatureKeyError::Malformed { .. })),
                "{} should be rejected",
                key
            );
        }
    }
}
