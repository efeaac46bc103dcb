//! Product analytics - best sellers, slow movers, seasonality and overview.
//!
//! All analyses run over an optional date range and are derived from the
//! grouped queries in [`crate::core::aggregate`].

use crate::{
    core::{
        aggregate::{DailyTotals, ProductTotals, daily_totals, product_totals},
        dates::DateRange,
        trends::growth_percent,
    },
    entities::sale,
    errors::{Error, Result},
};
use chrono::{Datelike, Month, NaiveDate};
use sea_orm::{ColumnTrait, ConnectionTrait};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Share of total revenue that defines the Pareto cutoff.
const PARETO_REVENUE_SHARE: f64 = 0.8;

/// Products need this many sales to be listed as slow movers.
const SLOW_MOVER_MIN_SALES: i64 = 3;

/// Ranking key for best sellers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Rank by quantity sold
    #[default]
    Quantity,
    /// Rank by revenue
    Revenue,
}

/// Options for [`best_sellers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestSellerQuery {
    /// Ranking key
    pub sort_by: SortBy,
    /// Products with fewer sale rows are skipped
    pub min_sales: i64,
    /// Maximum number of products returned
    pub limit: usize,
}

impl Default for BestSellerQuery {
    fn default() -> Self {
        Self {
            sort_by: SortBy::Quantity,
            min_sales: 10,
            limit: 50,
        }
    }
}

/// Performance figures of one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPerformance {
    /// Totals the figures are derived from
    #[serde(flatten)]
    pub totals: ProductTotals,
    /// Days between first and last sale, inclusive
    pub days_on_market: i64,
    /// Quantity per 30 days on market
    pub avg_monthly_quantity: f64,
    /// Revenue per sale row
    pub velocity_score: f64,
}

impl ProductPerformance {
    #[allow(clippy::cast_precision_loss)]
    fn from_totals(totals: ProductTotals) -> Self {
        let days_on_market = (totals.last_sale - totals.first_sale).num_days() + 1;
        let avg_monthly_quantity = totals.total_quantity / (days_on_market as f64 / 30.0);
        let velocity_score = if totals.sale_count > 0 {
            totals.total_revenue / totals.sale_count as f64
        } else {
            0.0
        };

        Self {
            totals,
            days_on_market,
            avg_monthly_quantity,
            velocity_score,
        }
    }
}

/// What to do about a product that stopped selling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    /// No sale for more than 180 days
    Discontinue,
    /// No sale for more than 90 days
    Discount,
    /// Still selling recently enough
    Monitor,
}

impl Recommendation {
    /// Recommendation for a product last sold `days_since_last_sale` days ago.
    #[must_use]
    pub const fn from_days_since_last_sale(days_since_last_sale: i64) -> Self {
        if days_since_last_sale > 180 {
            Self::Discontinue
        } else if days_since_last_sale > 90 {
            Self::Discount
        } else {
            Self::Monitor
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Discontinue => "discontinue",
            Self::Discount => "discount",
            Self::Monitor => "monitor",
        })
    }
}

/// A product ranked by how long it has not sold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowMover {
    /// Performance figures of the product
    #[serde(flatten)]
    pub performance: ProductPerformance,
    /// Days between the last sale and the evaluation day
    pub days_since_last_sale: i64,
    /// Suggested action
    pub recommendation: Recommendation,
}

/// Sales of one month of the year, summed over all years in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalPattern {
    /// Month number, 1–12
    pub month: u32,
    /// English month name
    pub month_name: String,
    /// Revenue in the month
    pub total_revenue: f64,
    /// Quantity in the month
    pub total_quantity: f64,
    /// Sale rows in the month
    pub sale_count: i64,
    /// Revenue per selling day
    pub avg_daily_revenue: f64,
    /// Growth between the two most recent years with this month; 0 with fewer
    pub year_over_year_growth: f64,
}

/// One month in a product's seasonal profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyShare {
    /// Month number, 1–12
    pub month: u32,
    /// English month name
    pub month_name: String,
    /// Quantity sold in the month
    pub quantity: f64,
    /// Revenue in the month
    pub revenue: f64,
    /// Share of the product's total quantity, in percent
    pub percentage_of_annual: f64,
}

/// Seasonal profile of a single product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSeasonality {
    /// Product code
    pub product_code: String,
    /// Product name
    pub product_name: String,
    /// Months that had sales, January first
    pub monthly_patterns: Vec<MonthlyShare>,
    /// Up to three best months by quantity, best first
    pub peak_months: Vec<String>,
    /// Up to three weakest months by quantity, weakest last
    pub low_months: Vec<String>,
}

/// Whole-range headline figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    /// Distinct product codes sold
    pub total_products: usize,
    /// Revenue over the range
    pub total_revenue: f64,
    /// Quantity over the range
    pub total_quantity: f64,
    /// Sale rows over the range
    pub total_transactions: i64,
    /// Fewest top products whose revenue reaches 80% of the total
    pub pareto_products_count: usize,
    /// That count as a percentage of all products
    pub pareto_percentage: f64,
}

/// English name of a month number, or an empty string out of range.
#[must_use]
pub fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

/// Products ranked by quantity or revenue, skipping those with fewer than
/// `query.min_sales` sale rows.
pub async fn best_sellers<C>(
    db: &C,
    range: &DateRange,
    query: &BestSellerQuery,
) -> Result<Vec<ProductPerformance>>
where
    C: ConnectionTrait,
{
    let mut products: Vec<ProductPerformance> = product_totals(db, range.condition())
        .await?
        .into_iter()
        .filter(|totals| totals.sale_count >= query.min_sales)
        .map(ProductPerformance::from_totals)
        .collect();

    match query.sort_by {
        SortBy::Quantity => products.sort_by(|a, b| {
            b.totals
                .total_quantity
                .total_cmp(&a.totals.total_quantity)
        }),
        SortBy::Revenue => {
            products.sort_by(|a, b| b.totals.total_revenue.total_cmp(&a.totals.total_revenue));
        }
    }
    products.truncate(query.limit);
    Ok(products)
}

/// Products with at least three sales, stalest first, then slowest.
///
/// `today` is the day staleness is measured against.
pub async fn slow_movers<C>(
    db: &C,
    range: &DateRange,
    today: NaiveDate,
    limit: usize,
) -> Result<Vec<SlowMover>>
where
    C: ConnectionTrait,
{
    let mut movers: Vec<SlowMover> = product_totals(db, range.condition())
        .await?
        .into_iter()
        .filter(|totals| totals.sale_count >= SLOW_MOVER_MIN_SALES)
        .map(|totals| {
            let days_since_last_sale = (today - totals.last_sale).num_days();
            SlowMover {
                performance: ProductPerformance::from_totals(totals),
                days_since_last_sale,
                recommendation: Recommendation::from_days_since_last_sale(days_since_last_sale),
            }
        })
        .collect();

    movers.sort_by(|a, b| {
        b.days_since_last_sale
            .cmp(&a.days_since_last_sale)
            .then(
                a.performance
                    .avg_monthly_quantity
                    .total_cmp(&b.performance.avg_monthly_quantity),
            )
    });
    movers.truncate(limit);
    Ok(movers)
}

/// Builds per-month patterns from per-day totals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_seasonal_patterns(days: &[DailyTotals]) -> Vec<SeasonalPattern> {
    #[derive(Default)]
    struct MonthAccumulator {
        revenue: f64,
        quantity: f64,
        sale_count: i64,
        selling_days: BTreeSet<NaiveDate>,
        revenue_by_year: BTreeMap<i32, f64>,
    }

    let mut months: BTreeMap<u32, MonthAccumulator> = BTreeMap::new();
    for day in days {
        let acc = months.entry(day.sale_date.month()).or_default();
        acc.revenue += day.total_revenue;
        acc.quantity += day.total_quantity;
        acc.sale_count += day.sale_count;
        acc.selling_days.insert(day.sale_date);
        *acc.revenue_by_year.entry(day.sale_date.year()).or_default() += day.total_revenue;
    }

    months
        .into_iter()
        .map(|(month, acc)| {
            let mut recent_years = acc.revenue_by_year.values().rev();
            let year_over_year_growth = match (recent_years.next(), recent_years.next()) {
                (Some(recent), Some(previous)) => growth_percent(*previous, *recent),
                _ => 0.0,
            };

            SeasonalPattern {
                month,
                month_name: month_name(month),
                total_revenue: acc.revenue,
                total_quantity: acc.quantity,
                sale_count: acc.sale_count,
                avg_daily_revenue: acc.revenue / acc.selling_days.len() as f64,
                year_over_year_growth,
            }
        })
        .collect()
}

/// Revenue and quantity per month of the year over `range`.
pub async fn seasonal_patterns<C>(db: &C, range: &DateRange) -> Result<Vec<SeasonalPattern>>
where
    C: ConnectionTrait,
{
    let days = daily_totals(db, range.condition()).await?;
    Ok(build_seasonal_patterns(&days))
}

/// Seasonal profile of one product over `range`.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] when the product has no sales in range.
pub async fn product_seasonality<C>(
    db: &C,
    range: &DateRange,
    product_code: &str,
) -> Result<ProductSeasonality>
where
    C: ConnectionTrait,
{
    let condition = range
        .condition()
        .add(sale::Column::ProductCode.eq(product_code));

    let Some(totals) = product_totals(db, condition.clone()).await?.into_iter().next() else {
        return Err(Error::ProductNotFound {
            code: product_code.to_string(),
        });
    };
    let days = daily_totals(db, condition).await?;

    let mut by_month: BTreeMap<u32, (f64, f64)> = BTreeMap::new();
    for day in &days {
        let entry = by_month.entry(day.sale_date.month()).or_default();
        entry.0 += day.total_quantity;
        entry.1 += day.total_revenue;
    }

    let monthly_patterns: Vec<MonthlyShare> = by_month
        .into_iter()
        .map(|(month, (quantity, revenue))| MonthlyShare {
            month,
            month_name: month_name(month),
            quantity,
            revenue,
            percentage_of_annual: if totals.total_quantity == 0.0 {
                0.0
            } else {
                quantity / totals.total_quantity * 100.0
            },
        })
        .collect();

    let mut ranked: Vec<&MonthlyShare> = monthly_patterns.iter().collect();
    ranked.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
    let peak_months = ranked.iter().take(3).map(|m| m.month_name.clone()).collect();
    let low_months = ranked[ranked.len().saturating_sub(3)..]
        .iter()
        .map(|m| m.month_name.clone())
        .collect();

    Ok(ProductSeasonality {
        product_code: totals.product_code,
        product_name: totals.product_name,
        monthly_patterns,
        peak_months,
        low_months,
    })
}

/// Smallest number of products, taken by descending revenue, whose revenue
/// reaches `share` of the total. Expects `revenues` sorted descending.
#[must_use]
pub fn pareto_cutoff(revenues: &[f64], share: f64) -> usize {
    let total: f64 = revenues.iter().sum();
    let target = total * share;
    let mut cumulative = 0.0;

    for (index, revenue) in revenues.iter().enumerate() {
        cumulative += revenue;
        if cumulative >= target {
            return index + 1;
        }
    }
    revenues.len()
}

/// Headline figures and the 80/20 cutoff over `range`.
#[allow(clippy::cast_precision_loss)]
pub async fn overview<C>(db: &C, range: &DateRange) -> Result<Overview>
where
    C: ConnectionTrait,
{
    let products = product_totals(db, range.condition()).await?;

    let mut revenues: Vec<f64> = products.iter().map(|p| p.total_revenue).collect();
    revenues.sort_by(|a, b| b.total_cmp(a));

    let pareto_products_count = if products.is_empty() {
        0
    } else {
        pareto_cutoff(&revenues, PARETO_REVENUE_SHARE)
    };
    let pareto_percentage = if products.is_empty() {
        0.0
    } else {
        pareto_products_count as f64 / products.len() as f64 * 100.0
    };

    Ok(Overview {
        total_products: products.len(),
        total_revenue: revenues.iter().sum(),
        total_quantity: products.iter().map(|p| p.total_quantity).sum(),
        total_transactions: products.iter().map(|p| p.sale_count).sum(),
        pareto_products_count,
        pareto_percentage,
    })
}
