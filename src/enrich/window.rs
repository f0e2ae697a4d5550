//! Lookback and lookahead windows around a reference date.

use crate::types::aggregation::AggregationLevel;
use crate::types::date_window::DateWindow;
use crate::types::kind::MeasurementKind;
use chrono::{Datelike, Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Where a window lies relative to the reference date `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "span", rename_all = "snake_case")]
pub enum WindowSpan {
    /// `[D, D]`
    SameDay,
    /// `[D - days, D - 1]`
    DaysPrior { days: u32 },
    /// Monday to Sunday of the ISO week before the one containing `D`.
    PriorIsoWeek,
    /// `[D + 1, D + days]`
    DaysAhead { days: u32 },
    /// `[D + from, D + to]`
    Offsets { from: i64, to: i64 },
}

impl WindowSpan {
    /// The dates covered for reference date `date`, or `None` if they leave chrono's calendar.
    pub fn resolve(&self, date: NaiveDate) -> Option<DateWindow> {
        let (start, end) = match *self {
            WindowSpan::SameDay => (date, date),
            WindowSpan::DaysPrior { days } => (
                date.checked_sub_days(Days::new(u64::from(days)))?,
                date.checked_sub_days(Days::new(1))?,
            ),
            WindowSpan::PriorIsoWeek => {
                let dow = u64::from(date.weekday().number_from_monday());
                (
                    date.checked_sub_days(Days::new(dow + 6))?,
                    date.checked_sub_days(Days::new(dow))?,
                )
            }
            WindowSpan::DaysAhead { days } => (
                date.checked_add_days(Days::new(1))?,
                date.checked_add_days(Days::new(u64::from(days)))?,
            ),
            WindowSpan::Offsets { from, to } => (
                date.checked_add_signed(Duration::try_days(from)?)?,
                date.checked_add_signed(Duration::try_days(to)?)?,
            ),
        };
        Some(DateWindow::new(start, end))
    }

    /// Day offsets of the first and last date the window can cover, relative to `D`.
    pub(crate) fn day_offsets(&self) -> (i64, i64) {
        match *self {
            WindowSpan::SameDay => (0, 0),
            WindowSpan::DaysPrior { days } => (-i64::from(days), -1),
            // A Sunday reaches back to the Monday 13 days earlier.
            WindowSpan::PriorIsoWeek => (-13, -1),
            WindowSpan::DaysAhead { days } => (1, i64::from(days)),
            WindowSpan::Offsets { from, to } => (from, to),
        }
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        match *self {
            WindowSpan::DaysPrior { days } | WindowSpan::DaysAhead { days } => days >= 1,
            WindowSpan::Offsets { from, to } => from <= to,
            WindowSpan::SameDay | WindowSpan::PriorIsoWeek => true,
        }
    }
}

/// One query issued per reference date: what kind of data, which dates, which granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowSpec {
    pub kind: MeasurementKind,
    #[serde(flatten)]
    pub span: WindowSpan,
    pub aggregation: AggregationLevel,
}

impl WindowSpec {
    pub fn actual(span: WindowSpan, aggregation: AggregationLevel) -> Self {
        Self {
            kind: MeasurementKind::Actual,
            span,
            aggregation,
        }
    }

    pub fn forecast(span: WindowSpan, aggregation: AggregationLevel) -> Self {
        Self {
            kind: MeasurementKind::Forecast,
            span,
            aggregation,
        }
    }

    /// Largest offset magnitude a key from this window can carry, for a reference at midnight.
    pub(crate) fn max_key_offset(&self) -> i64 {
        let (first, last) = self.span.day_offsets();
        match self.aggregation {
            AggregationLevel::Hour => first
                .saturating_mul(24)
                .saturating_abs()
                .max(last.saturating_mul(24).saturating_add(23).saturating_abs()),
            AggregationLevel::Day => first.saturating_abs().max(last.saturating_abs()),
            // ISO week numbers differ by at most 52.
            AggregationLevel::Week => 52,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fixed_windows_for_a_thursday() {
        let thursday = date(2015, 1, 22);
        assert_eq!(
            WindowSpan::SameDay.resolve(thursday),
            Some(DateWindow::new(thursday, thursday))
        );
        assert_eq!(
            WindowSpan::DaysPrior { days: 2 }.resolve(thursday),
            Some(DateWindow::new(date(2015, 1, 20), date(2015, 1, 21)))
        );
        assert_eq!(
            WindowSpan::PriorIsoWeek.resolve(thursday),
            Some(DateWindow::new(date(2015, 1, 12), date(2015, 1, 18)))
        );
        assert_eq!(
            WindowSpan::DaysAhead { days: 2 }.resolve(thursday),
            Some(DateWindow::new(date(2015, 1, 23), date(2015, 1, 24)))
        );
        assert_eq!(
            WindowSpan::Offsets { from: -3, to: 1 }.resolve(thursday),
            Some(DateWindow::new(date(2015, 1, 19), date(2015, 1, 23)))
        );
    }

    #[test]
    fn prior_week_of_a_monday_ends_the_day_before() {
        let monday = date(2017, 7, 10);
        let window = WindowSpan::PriorIsoWeek.resolve(monday).unwrap();
        assert_eq!(window.start, date(2017, 7, 3));
        assert_eq!(window.end, date(2017, 7, 9));
        assert_eq!(window.len_days(), 7);
        assert_eq!(window.start.weekday(), chrono::Weekday::Mon);
    }

    #[test]
    fn prior_week_of_a_sunday_is_the_week_before_its_own() {
        let sunday = date(2015, 1, 25);
        let window = WindowSpan::PriorIsoWeek.resolve(sunday).unwrap();
        assert_eq!(window, DateWindow::new(date(2015, 1, 12), date(2015, 1, 18)));
    }

    #[test]
    fn windows_outside_the_calendar_resolve_to_none() {
        assert_eq!(WindowSpan::DaysAhead { days: 2 }.resolve(NaiveDate::MAX), None);
        assert_eq!(WindowSpan::PriorIsoWeek.resolve(NaiveDate::MIN), None);
    }

    #[test]
    fn well_formedness() {
        assert!(!WindowSpan::DaysPrior { days: 0 }.is_well_formed());
        assert!(!WindowSpan::Offsets { from: 2, to: 1 }.is_well_formed());
        assert!(WindowSpan::PriorIsoWeek.is_well_formed());
    }

    #[test]
    fn largest_key_offset_per_level() {
        let hourly = |span| WindowSpec::actual(span, AggregationLevel::Hour).max_key_offset();
        let daily = |span| WindowSpec::actual(span, AggregationLevel::Day).max_key_offset();

        assert_eq!(hourly(WindowSpan::SameDay), 23);
        assert_eq!(hourly(WindowSpan::DaysPrior { days: 4 }), 96);
        assert_eq!(hourly(WindowSpan::DaysPrior { days: 5 }), 120);
        assert_eq!(hourly(WindowSpan::DaysAhead { days: 3 }), 95);
        assert_eq!(hourly(WindowSpan::PriorIsoWeek), 312);
        assert_eq!(daily(WindowSpan::PriorIsoWeek), 13);
        assert_eq!(daily(WindowSpan::Offsets { from: -120, to: -100 }), 120);
        assert_eq!(daily(WindowSpan::Offsets { from: i64::MIN, to: 0 }), i64::MAX);
        assert_eq!(
            WindowSpec::actual(WindowSpan::Offsets { from: -400, to: 0 }, AggregationLevel::Week)
                .max_key_offset(),
            52
        );
    }

    #[test]
    fn window_spec_serializes_flat() {
        let spec = WindowSpec::forecast(WindowSpan::DaysAhead { days: 2 }, AggregationLevel::Day);
        let json = serde_json::to_value(spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "forecast",
                "span": "days_ahead",
                "days": 2,
                "aggregation": "day"
            })
        );
        let back: WindowSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }
}
