//! Sales trend reports.
//!
//! Trends are built from per-day totals: days are bucketed by period in Rust, so
//! the same code works on every storage backend. Monthly and yearly reports add
//! year-over-year comparisons; daily reports add 7- and 30-day moving averages.

use crate::{
    core::{
        aggregate::{DailyTotals, daily_totals},
        dates::{DateRange, format_sale_date},
    },
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::BTreeMap;

/// Granularity of a trend report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    /// One bucket per day, labelled `DD.MM.YYYY`
    Daily,
    /// One bucket per Monday-based week, labelled `YYYY-Www`
    Weekly,
    /// One bucket per month, labelled `YYYY-MM`
    Monthly,
    /// One bucket per year, labelled `YYYY`
    Yearly,
}

impl TrendPeriod {
    /// Parses `daily`, `weekly`, `monthly` or `yearly`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] for anything else.
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::invalid_parameter(
                "period",
                format!("'{other}' is not one of daily, weekly, monthly, yearly"),
            )),
        }
    }

    /// Returns `(sort key, label)` of the bucket holding `date`.
    fn bucket(self, date: NaiveDate) -> (String, String) {
        match self {
            Self::Daily => (date.format("%Y-%m-%d").to_string(), format_sale_date(date)),
            Self::Weekly => {
                let label = date.format("%Y-W%W").to_string();
                (label.clone(), label)
            }
            Self::Monthly => {
                let label = date.format("%Y-%m").to_string();
                (label.clone(), label)
            }
            Self::Yearly => {
                let label = date.year().to_string();
                (label.clone(), label)
            }
        }
    }
}

impl std::fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        })
    }
}

/// Totals of one period bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBucket {
    /// Bucket label
    pub period: String,
    /// Revenue in the bucket
    pub total_revenue: f64,
    /// Quantity in the bucket
    pub total_quantity: f64,
    /// Sale rows in the bucket
    pub sale_count: i64,
    /// Mean unit price over the bucket's rows
    pub avg_price: f64,
}

/// Revenue change between two consecutive years of the same period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearOverYear {
    /// `YYYY-MM` for monthly reports, `YYYY` for yearly ones
    pub period: String,
    /// The later year
    pub current_year: i32,
    /// The earlier year
    pub previous_year: i32,
    /// Growth in percent; 0 when the previous revenue is not positive
    pub growth_percent: f64,
    /// Revenue of the later year
    pub current_revenue: f64,
    /// Revenue of the earlier year
    pub previous_revenue: f64,
}

/// Trailing moving averages of daily revenue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAveragePoint {
    /// The day
    pub date: NaiveDate,
    /// Revenue of the day
    pub daily_revenue: f64,
    /// Mean over this and up to 6 previous selling days
    pub ma_7day: f64,
    /// Mean over this and up to 29 previous selling days
    pub ma_30day: f64,
}

/// Report-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    /// Revenue over all buckets
    pub total_revenue: f64,
    /// Quantity over all buckets
    pub total_quantity: f64,
    /// Mean revenue per bucket
    pub avg_revenue_per_period: f64,
    /// Number of buckets
    pub periods_count: usize,
}

/// The result of [`sales_trends`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    /// Bucket granularity
    pub period: TrendPeriod,
    /// Buckets, oldest first
    pub buckets: Vec<TrendBucket>,
    /// Year-over-year changes (monthly and yearly reports only)
    pub year_over_year: Vec<YearOverYear>,
    /// Moving averages (daily reports only)
    pub moving_averages: Vec<MovingAveragePoint>,
    /// Report-wide totals
    pub summary: TrendSummary,
}

/// Percentage change from `previous` to `current`; 0 when `previous` is not
/// positive.
#[must_use]
pub fn growth_percent(previous: f64, current: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

#[derive(Default)]
struct BucketAccumulator {
    label: String,
    revenue: f64,
    quantity: f64,
    sale_count: i64,
    price_sum: f64,
}

#[allow(clippy::cast_precision_loss)]
fn bucket_days(period: TrendPeriod, days: &[DailyTotals]) -> Vec<TrendBucket> {
    let mut buckets: BTreeMap<String, BucketAccumulator> = BTreeMap::new();
    for day in days {
        let (key, label) = period.bucket(day.sale_date);
        let acc = buckets.entry(key).or_insert_with(|| BucketAccumulator {
            label,
            ..Default::default()
        });
        acc.revenue += day.total_revenue;
        acc.quantity += day.total_quantity;
        acc.sale_count += day.sale_count;
        acc.price_sum += day.price_sum;
    }

    buckets
        .into_values()
        .map(|acc| TrendBucket {
            period: acc.label,
            total_revenue: acc.revenue,
            total_quantity: acc.quantity,
            sale_count: acc.sale_count,
            avg_price: if acc.sale_count > 0 {
                acc.price_sum / acc.sale_count as f64
            } else {
                0.0
            },
        })
        .collect()
}

fn year_over_year(period: TrendPeriod, days: &[DailyTotals]) -> Vec<YearOverYear> {
    // period key -> year -> revenue
    let mut revenue: BTreeMap<u32, BTreeMap<i32, f64>> = BTreeMap::new();
    for day in days {
        let key = match period {
            TrendPeriod::Monthly => day.sale_date.month(),
            TrendPeriod::Yearly => 0,
            TrendPeriod::Daily | TrendPeriod::Weekly => return Vec::new(),
        };
        *revenue
            .entry(key)
            .or_default()
            .entry(day.sale_date.year())
            .or_default() += day.total_revenue;
    }

    let mut comparisons = Vec::new();
    for (month, years) in revenue {
        let years: Vec<(i32, f64)> = years.into_iter().collect();
        for pair in years.windows(2) {
            let (previous_year, previous_revenue) = pair[0];
            let (current_year, current_revenue) = pair[1];
            comparisons.push(YearOverYear {
                period: match period {
                    TrendPeriod::Monthly => format!("{current_year}-{month:02}"),
                    _ => current_year.to_string(),
                },
                current_year,
                previous_year,
                growth_percent: growth_percent(previous_revenue, current_revenue),
                current_revenue,
                previous_revenue,
            });
        }
    }
    comparisons
}

/// Trailing means of daily revenue over the last 7 and 30 selling days.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_averages(days: &[DailyTotals]) -> Vec<MovingAveragePoint> {
    let trailing_mean = |index: usize, span: usize| {
        let window = &days[index.saturating_sub(span - 1)..=index];
        window.iter().map(|d| d.total_revenue).sum::<f64>() / window.len() as f64
    };

    days.iter()
        .enumerate()
        .map(|(index, day)| MovingAveragePoint {
            date: day.sale_date,
            daily_revenue: day.total_revenue,
            ma_7day: trailing_mean(index, 7),
            ma_30day: trailing_mean(index, 30),
        })
        .collect()
}

/// Builds a trend report from per-day totals ordered by date.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_trend_report(period: TrendPeriod, days: &[DailyTotals]) -> TrendReport {
    let buckets = bucket_days(period, days);

    let year_over_year = match period {
        TrendPeriod::Monthly | TrendPeriod::Yearly => year_over_year(period, days),
        TrendPeriod::Daily | TrendPeriod::Weekly => Vec::new(),
    };
    let moving_averages = if period == TrendPeriod::Daily {
        moving_averages(days)
    } else {
        Vec::new()
    };

    let total_revenue: f64 = buckets.iter().map(|b| b.total_revenue).sum();
    let total_quantity: f64 = buckets.iter().map(|b| b.total_quantity).sum();
    let avg_revenue_per_period = if buckets.is_empty() {
        0.0
    } else {
        total_revenue / buckets.len() as f64
    };

    TrendReport {
        period,
        summary: TrendSummary {
            total_revenue,
            total_quantity,
            avg_revenue_per_period,
            periods_count: buckets.len(),
        },
        buckets,
        year_over_year,
        moving_averages,
    }
}

/// Builds the sales trend report for `range` at the given granularity.
pub async fn sales_trends<C>(db: &C, period: TrendPeriod, range: &DateRange) -> Result<TrendReport>
where
    C: ConnectionTrait,
{
    let days = daily_totals(db, range.condition()).await?;
    Ok(build_trend_report(period, &days))
}
