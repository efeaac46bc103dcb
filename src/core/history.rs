//! Same-day history - how one calendar day sold in previous years.
//!
//! Reuses the forecast window generator with one-day windows, so leap days
//! follow the same rule: 29 February looks at 28 February in non-leap years.

use crate::{
    core::{
        aggregate::daily_totals,
        window::{HistoricalWindow, historical_windows},
    },
    entities::sale,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Totals of the reference day in one previous year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayInYear {
    /// Calendar year
    pub year: i32,
    /// The day that was looked up
    pub date: NaiveDate,
    /// Revenue of the day
    pub total_revenue: f64,
    /// Quantity of the day
    pub total_quantity: f64,
    /// Sale rows of the day
    pub sale_count: i64,
    /// Revenue per sale row; 0 without sales
    pub avg_per_sale: f64,
}

/// The result of [`day_history`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayHistory {
    /// The day being compared
    pub reference_date: NaiveDate,
    /// One entry per previous year, most recent first, including years without sales
    pub years: Vec<DayInYear>,
    /// Revenue summed over all years
    pub total_revenue: f64,
    /// Quantity summed over all years
    pub total_quantity: f64,
    /// Sale rows summed over all years
    pub total_sales: i64,
    /// Total revenue divided by the number of years looked at
    pub avg_revenue_per_year: f64,
}

impl DayInYear {
    fn empty(window: &HistoricalWindow) -> Self {
        Self {
            year: window.year,
            date: window.start,
            total_revenue: 0.0,
            total_quantity: 0.0,
            sale_count: 0,
            avg_per_sale: 0.0,
        }
    }
}

/// Compares `reference`'s calendar day across the `years_back` previous years.
///
/// # Arguments
/// * `db` - Any connection or transaction
/// * `reference` - The day whose day and month are looked up
/// * `years_back` - Number of previous years, at least 1
///
/// # Returns
/// One [`DayInYear`] per previous year (zeros where nothing sold) plus
/// totals over all of them.
///
/// # Errors
/// Returns [`crate::errors::Error::InvalidParameter`] for a non-positive
/// `years_back`, or a database error if the query fails.
#[instrument(skip(db))]
pub async fn day_history<C>(db: &C, reference: NaiveDate, years_back: i64) -> Result<DayHistory>
where
    C: ConnectionTrait,
{
    let windows = historical_windows(reference, 1, years_back)?;

    let condition = windows.iter().fold(Condition::any(), |condition, window| {
        condition.add(sale::Column::SaleDate.eq(window.start))
    });
    let by_date: HashMap<NaiveDate, _> = daily_totals(db, condition)
        .await?
        .into_iter()
        .map(|day| (day.sale_date, day))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let years: Vec<DayInYear> = windows
        .iter()
        .map(|window| {
            by_date
                .get(&window.start)
                .map_or_else(
                    || DayInYear::empty(window),
                    |day| DayInYear {
                        year: window.year,
                        date: window.start,
                        total_revenue: day.total_revenue,
                        total_quantity: day.total_quantity,
                        sale_count: day.sale_count,
                        avg_per_sale: if day.sale_count > 0 {
                            day.total_revenue / day.sale_count as f64
                        } else {
                            0.0
                        },
                    },
                )
        })
        .collect();

    let total_revenue: f64 = years.iter().map(|year| year.total_revenue).sum();
    let total_quantity: f64 = years.iter().map(|year| year.total_quantity).sum();
    let total_sales: i64 = years.iter().map(|year| year.sale_count).sum();
    #[allow(clippy::cast_precision_loss)]
    let avg_revenue_per_year = if years.is_empty() {
        0.0
    } else {
        total_revenue / years.len() as f64
    };

    debug!(
        years = years.len(),
        with_sales = by_date.len(),
        "Loaded same-day history"
    );

    Ok(DayHistory {
        reference_date: reference,
        years,
        total_revenue,
        total_quantity,
        total_sales,
        avg_revenue_per_year,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_day_history_with_gaps() -> Result<()> {
        let db = setup_test_db().await?;
        insert_test_sale(&db, "A1", "Apple", 4.0, 2.5, "29.10.2024").await?;
        insert_test_sale(&db, "B2", "Bread", 2.0, 5.0, "29.10.2024").await?;
        insert_test_sale(&db, "A1", "Apple", 3.0, 2.0, "29.10.2022").await?;
        // Neighbouring days are not counted
        insert_test_sale(&db, "A1", "Apple", 100.0, 1.0, "30.10.2024").await?;
        insert_test_sale(&db, "A1", "Apple", 100.0, 1.0, "28.10.2023").await?;
        // The reference day itself is not a previous year
        insert_test_sale(&db, "A1", "Apple", 100.0, 1.0, "29.10.2025").await?;

        let history = day_history(&db, date(2025, 10, 29), 3).await?;

        let years: Vec<i32> = history.years.iter().map(|year| year.year).collect();
        assert_eq!(years, vec![2024, 2023, 2022]);

        let y2024 = &history.years[0];
        assert_eq!(y2024.date, date(2024, 10, 29));
        assert_eq!(y2024.total_revenue, 20.0);
        assert_eq!(y2024.total_quantity, 6.0);
        assert_eq!(y2024.sale_count, 2);
        assert_eq!(y2024.avg_per_sale, 10.0);

        let y2023 = &history.years[1];
        assert_eq!(y2023.sale_count, 0);
        assert_eq!(y2023.total_revenue, 0.0);
        assert_eq!(y2023.avg_per_sale, 0.0);

        assert_eq!(history.years[2].total_revenue, 6.0);

        assert_eq!(history.total_revenue, 26.0);
        assert_eq!(history.total_quantity, 9.0);
        assert_eq!(history.total_sales, 3);
        // Years without sales still count toward the average
        assert!((history.avg_revenue_per_year - 26.0 / 3.0).abs() < 1e-9);
        Ok(())
    }

    #[tokio::test]
    async fn test_day_history_leap_day_uses_feb_28() -> Result<()> {
        let db = setup_test_db().await?;
        insert_test_sale(&db, "A1", "Apple", 1.0, 3.0, "28.02.2023").await?;

        let history = day_history(&db, date(2024, 2, 29), 1).await?;
        assert_eq!(history.years[0].date, date(2023, 2, 28));
        assert_eq!(history.years[0].total_revenue, 3.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_day_history_empty_table() -> Result<()> {
        let db = setup_test_db().await?;
        let history = day_history(&db, date(2025, 1, 1), 4).await?;

        assert_eq!(history.years.len(), 4);
        assert!(history.years.iter().all(|year| year.sale_count == 0));
        assert_eq!(history.avg_revenue_per_year, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_day_history_rejects_bad_years() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(matches!(
            day_history(&db, date(2025, 1, 1), 0).await,
            Err(Error::InvalidParameter { .. })
        ));
        Ok(())
    }
}
