//! Historical window generation for reorder forecasts.
//!
//! A forecast for `days` days starting at a reference date samples the same
//! calendar stretch in each of the previous `years_back` years. Windows are
//! derived purely from the inputs and are never stored.

use crate::{
    core::dates::{format_sale_date, shift_years_back},
    errors::{Error, Result},
};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// One sampled stretch of a prior year, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoricalWindow {
    /// First day of the window
    pub start: NaiveDate,
    /// Last day of the window
    pub end: NaiveDate,
    /// Calendar year the window is labelled with (the year of `start`)
    pub year: i32,
}

impl HistoricalWindow {
    /// Number of calendar days covered.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether `date` lies inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for HistoricalWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} – {}",
            self.year,
            format_sale_date(self.start),
            format_sale_date(self.end)
        )
    }
}

/// Last day of a `days`-long stretch starting at `start`.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] if `days` is not positive or the end
/// falls outside the supported calendar.
pub fn window_end(start: NaiveDate, days: i64) -> Result<NaiveDate> {
    let offset = u64::try_from(days - 1)
        .map_err(|_| Error::invalid_parameter("days", "must be at least 1"))?;
    start
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| Error::invalid_parameter("days", "horizon runs past the supported calendar"))
}

/// Generates one window per prior year, most recent first.
///
/// Window `k` (for `k = 1..=years_back`) starts `k` calendar years before
/// `reference` and spans `days` days. A 29 February reference maps to
/// 28 February in non-leap years.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] if `days` or `years_back` is not
/// positive, or the windows fall outside the supported calendar.
pub fn historical_windows(
    reference: NaiveDate,
    days: i64,
    years_back: i64,
) -> Result<Vec<HistoricalWindow>> {
    if days <= 0 {
        return Err(Error::invalid_parameter("days", "must be at least 1"));
    }
    let years_back = u32::try_from(years_back)
        .ok()
        .filter(|years| *years > 0)
        .ok_or_else(|| Error::invalid_parameter("years_back", "must be at least 1"))?;

    (1..=years_back)
        .map(|offset| {
            let start = shift_years_back(reference, offset).ok_or_else(|| {
                Error::invalid_parameter("years_back", "lookback runs past the supported calendar")
            })?;
            let end = window_end(start, days)?;
            Ok(HistoricalWindow {
                start,
                end,
                year: start.year(),
            })
        })
        .collect()
}
