//! Calendar date handling at the data boundary.
//!
//! Sale dates arrive as `DD.MM.YYYY` strings. They are parsed exactly once, when
//! they enter the system (import or command arguments), and are compared as
//! [`NaiveDate`] values from then on.

use crate::{
    entities::sale,
    errors::{Error, Result},
};
use chrono::{Months, NaiveDate};
use sea_orm::{ColumnTrait, Condition};

/// Format used for every user-facing date.
pub const SALE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Parses a `DD.MM.YYYY` date, ignoring surrounding whitespace.
///
/// # Errors
/// Returns [`Error::InvalidDate`] for any other shape or an impossible date
/// such as `31.02.2024`.
pub fn parse_sale_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let mut parts = trimmed.split('.');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid_date(input));
    };

    // Strict widths and digits only; chrono alone accepts `1.1.24`, `+202` and ` 1`
    let all_digits = |field: &str| field.bytes().all(|b| b.is_ascii_digit());
    if day.len() != 2 || month.len() != 2 || year.len() != 4 {
        return Err(invalid_date(input));
    }
    if !(all_digits(day) && all_digits(month) && all_digits(year)) {
        return Err(invalid_date(input));
    }

    NaiveDate::parse_from_str(trimmed, SALE_DATE_FORMAT).map_err(|_| invalid_date(input))
}

/// Formats a date as `DD.MM.YYYY`.
#[must_use]
pub fn format_sale_date(date: NaiveDate) -> String {
    date.format(SALE_DATE_FORMAT).to_string()
}

/// Moves `date` back by whole calendar years, keeping month and day.
///
/// 29 February maps to 28 February when the target year is not a leap year.
/// Returns `None` only when the result falls outside chrono's date range.
#[must_use]
pub fn shift_years_back(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    // Month arithmetic clamps to the last day of the target month
    date.checked_sub_months(Months::new(years.checked_mul(12)?))
}

fn invalid_date(input: &str) -> Error {
    Error::InvalidDate {
        input: input.to_string(),
    }
}

/// An optionally open-ended inclusive date range used to filter sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First included day, or unbounded
    pub start: Option<NaiveDate>,
    /// Last included day, or unbounded
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// A range covering the whole table.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// A closed range `[start, end]`.
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Builds a range from optional `DD.MM.YYYY` arguments.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDate`] if either bound fails to parse and
    /// [`Error::InvalidParameter`] if the start lies after the end.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let range = Self {
            start: start.map(parse_sale_date).transpose()?,
            end: end.map(parse_sale_date).transpose()?,
        };

        if let (Some(start), Some(end)) = (range.start, range.end) {
            if start > end {
                return Err(Error::invalid_parameter(
                    "start",
                    format!(
                        "{} is after {}",
                        format_sale_date(start),
                        format_sale_date(end)
                    ),
                ));
            }
        }

        Ok(range)
    }

    /// Whether `date` lies inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// The filter on `sales.sale_date` selecting this range.
    #[must_use]
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(start) = self.start {
            condition = condition.add(sale::Column::SaleDate.gte(start));
        }
        if let Some(end) = self.end {
            condition = condition.add(sale::Column::SaleDate.lte(end));
        }
        condition
    }

    /// Human-readable description, e.g. `01.01.2024 – 31.12.2024`.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.start, self.end) {
            (None, None) => "all time".to_string(),
            (Some(start), None) => format!("since {}", format_sale_date(start)),
            (None, Some(end)) => format!("until {}", format_sale_date(end)),
            (Some(start), Some(end)) => {
                format!("{} – {}", format_sale_date(start), format_sale_date(end))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_sale_date() {
        assert_eq!(parse_sale_date("29.10.2025").unwrap(), date(2025, 10, 29));
        assert_eq!(parse_sale_date(" 01.02.2021 ").unwrap(), date(2021, 2, 1));
    }

    #[test]
    fn test_parse_sale_date_rejects_other_shapes() {
        for input in [
            "2025-10-29",
            "1.1.2024",
            "29.10.25",
            "29.10.2025.1",
            "",
            "aa.bb.cccc",
            "29.10.+202",
            "29. 1.2025",
            "+1.10.2025",
            "29.10.-025",
        ] {
            assert!(
                matches!(parse_sale_date(input), Err(Error::InvalidDate { .. })),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_sale_date_rejects_impossible_dates() {
        assert!(parse_sale_date("31.02.2024").is_err());
        assert!(parse_sale_date("29.02.2023").is_err());
        assert!(parse_sale_date("29.02.2024").is_ok());
    }

    #[test]
    fn test_format_sale_date() {
        assert_eq!(format_sale_date(date(2024, 11, 7)), "07.11.2024");
    }

    #[test]
    fn test_shift_years_back_keeps_month_and_day() {
        assert_eq!(shift_years_back(date(2025, 10, 29), 1), Some(date(2024, 10, 29)));
        assert_eq!(shift_years_back(date(2025, 10, 29), 4), Some(date(2021, 10, 29)));
    }

    #[test]
    fn test_shift_years_back_clamps_leap_day() {
        assert_eq!(shift_years_back(date(2024, 2, 29), 1), Some(date(2023, 2, 28)));
        assert_eq!(shift_years_back(date(2024, 2, 29), 4), Some(date(2020, 2, 29)));
    }

    #[test]
    fn test_date_range_parse_and_contains() {
        let range = DateRange::parse(Some("01.01.2024"), Some("31.01.2024")).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));

        let open = DateRange::parse(None, Some("31.01.2024")).unwrap();
        assert!(open.contains(date(1999, 1, 1)));
        assert!(DateRange::all().contains(date(2100, 1, 1)));
    }

    #[test]
    fn test_date_range_rejects_reversed_bounds() {
        let result = DateRange::parse(Some("02.01.2024"), Some("01.01.2024"));
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn test_date_range_describe() {
        assert_eq!(DateRange::all().describe(), "all time");
        assert_eq!(
            DateRange::between(date(2024, 1, 1), date(2024, 12, 31)).describe(),
            "01.01.2024 – 31.12.2024"
        );
    }
}
