// ── Date-range filter ──
//
// The value broadcast on the filter bus and the control that produces it.
// Every chart derives both its query string and its caption from the
// same `DateRangeFilter`, so the two can never disagree.

use std::fmt;
use std::num::NonZeroU32;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use visitgate_api::AnalyticsQuery;

use crate::error::CoreError;

/// Caption used when no range is applied.
pub const ALL_TIME: &str = "All Time";

/// A date-range selection.
///
/// `Range` bounds are inclusive. `LastDays(n)` means the `n` most recent
/// calendar days including today, resolved by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeFilter {
    #[default]
    AllTime,
    LastDays(NonZeroU32),
    Range { start: NaiveDate, end: NaiveDate },
}

impl DateRangeFilter {
    pub fn all() -> Self {
        Self::AllTime
    }

    /// Relative range of `n` days. `n` must be positive.
    pub fn days(n: u32) -> Result<Self, CoreError> {
        NonZeroU32::new(n)
            .map(Self::LastDays)
            .ok_or_else(|| CoreError::validation("day count must be at least 1"))
    }

    /// Explicit inclusive range. Rejects `start > end`.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self::Range { start, end })
    }

    /// The explicit range covering the last `n` days including `today`.
    ///
    /// `last_days(7, 2024-03-10)` is `2024-03-04 ..= 2024-03-10`.
    pub fn last_days(n: NonZeroU32, today: NaiveDate) -> Self {
        let back = Days::new(u64::from(n.get() - 1));
        let start = today.checked_sub_days(back).unwrap_or(NaiveDate::MIN);
        Self::Range { start, end: today }
    }

    /// Human-readable caption shown next to every chart.
    pub fn description(&self) -> String {
        match self {
            Self::AllTime => ALL_TIME.to_owned(),
            Self::LastDays(n) => format!("Last {n} Days"),
            Self::Range { start, end } => {
                format!("{} - {}", format_date(*start), format_date(*end))
            }
        }
    }

    /// Query parameters sent to every analytics endpoint.
    pub fn to_query(&self) -> AnalyticsQuery {
        match self {
            Self::AllTime => AnalyticsQuery::default(),
            Self::LastDays(n) => AnalyticsQuery {
                days: Some(n.get()),
                ..AnalyticsQuery::default()
            },
            Self::Range { start, end } => AnalyticsQuery {
                days: None,
                start_date: Some(*start),
                end_date: Some(*end),
            },
        }
    }
}

impl fmt::Display for DateRangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// `Mon D, YYYY`, e.g. `Jan 1, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

// ── Filter control ───────────────────────────────────────────────────

/// State of the date-filter widget: the two date inputs and which
/// quick-range button is highlighted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterControl {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    active_quick_range: Option<NonZeroU32>,
}

impl FilterControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press a quick-range button: fill both inputs with the last `days`
    /// days including `today` and mark the button active.
    pub fn select_quick_range(&mut self, days: NonZeroU32, today: NaiveDate) -> DateRangeFilter {
        let filter = DateRangeFilter::last_days(days, today);
        if let DateRangeFilter::Range { start, end } = filter {
            self.start = Some(start);
            self.end = Some(end);
        }
        self.active_quick_range = Some(days);
        filter
    }

    /// Press "apply" with the given inputs.
    ///
    /// Both dates present yields an explicit range; anything less means
    /// all time. The quick-range highlight is cleared either way.
    pub fn apply(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DateRangeFilter, CoreError> {
        let filter = match (start, end) {
            (Some(s), Some(e)) => DateRangeFilter::range(s, e)?,
            _ => DateRangeFilter::AllTime,
        };
        self.start = start;
        self.end = end;
        self.active_quick_range = None;
        Ok(filter)
    }

    pub fn inputs(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.start, self.end)
    }

    pub fn active_quick_range(&self) -> Option<u32> {
        self.active_quick_range.map(NonZeroU32::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("non-zero")
    }

    #[test]
    fn descriptions() {
        assert_eq!(DateRangeFilter::days(7).expect("7").description(), "Last 7 Days");
        assert_eq!(
            DateRangeFilter::days(30).expect("30").description(),
            "Last 30 Days"
        );
        assert_eq!(
            DateRangeFilter::range(date(2024, 1, 1), date(2024, 1, 31))
                .expect("ordered")
                .description(),
            "Jan 1, 2024 - Jan 31, 2024"
        );
        assert_eq!(DateRangeFilter::all().description(), "All Time");
    }

    #[test]
    fn last_seven_days_includes_today() {
        let filter = DateRangeFilter::last_days(nz(7), date(2024, 3, 10));
        assert_eq!(
            filter,
            DateRangeFilter::Range {
                start: date(2024, 3, 4),
                end: date(2024, 3, 10),
            }
        );
    }

    #[test]
    fn last_days_crosses_month_boundary() {
        let filter = DateRangeFilter::last_days(nz(3), date(2024, 3, 1));
        assert_eq!(
            filter.to_query().start_date,
            Some(date(2024, 2, 28)),
            "2024 is a leap year, so three days back lands on Feb 28"
        );
    }

    #[test]
    fn zero_days_rejected() {
        assert!(matches!(
            DateRangeFilter::days(0),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(DateRangeFilter::range(date(2024, 2, 1), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn query_shapes_are_exclusive() {
        let q = DateRangeFilter::days(30).expect("30").to_query();
        assert_eq!(q.days, Some(30));
        assert!(q.start_date.is_none() && q.end_date.is_none());

        let q = DateRangeFilter::range(date(2024, 1, 1), date(2024, 1, 2))
            .expect("ordered")
            .to_query();
        assert!(q.days.is_none());
        assert_eq!(q.end_date, Some(date(2024, 1, 2)));

        assert!(DateRangeFilter::all().to_query().is_empty());
    }

    #[test]
    fn quick_range_fills_inputs_and_marks_active() {
        let mut control = FilterControl::new();
        let filter = control.select_quick_range(nz(30), date(2024, 3, 10));

        assert_eq!(control.active_quick_range(), Some(30));
        assert_eq!(
            control.inputs(),
            (Some(date(2024, 2, 10)), Some(date(2024, 3, 10)))
        );
        assert_eq!(filter.description(), "Feb 10, 2024 - Mar 10, 2024");
    }

    #[test]
    fn apply_clears_quick_range() {
        let mut control = FilterControl::new();
        control.select_quick_range(nz(7), date(2024, 3, 10));

        let filter = control
            .apply(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)))
            .expect("ordered");

        assert_eq!(control.active_quick_range(), None);
        assert_eq!(filter.description(), "Jan 1, 2024 - Jan 31, 2024");
    }

    #[test]
    fn apply_with_missing_input_means_all_time() {
        let mut control = FilterControl::new();
        let filter = control.apply(Some(date(2024, 1, 1)), None).expect("lenient");
        assert_eq!(filter, DateRangeFilter::AllTime);
    }

    #[test]
    fn rejected_apply_keeps_previous_state() {
        let mut control = FilterControl::new();
        control.select_quick_range(nz(7), date(2024, 3, 10));

        assert!(
            control
                .apply(Some(date(2024, 3, 10)), Some(date(2024, 3, 1)))
                .is_err()
        );
        assert_eq!(control.active_quick_range(), Some(7));
    }
}
