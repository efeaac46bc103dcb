//! Historical reorder forecasting.
//!
//! A forecast for the `days` days starting at a reference date looks at the same
//! calendar stretch in each of the previous `years_back` years, aggregates what
//! every product sold there, and suggests ordering the average per-year quantity.
//! A product's daily rate is estimated only from the years it actually sold in,
//! so a product seen once in four years is not diluted by the empty years; the
//! confidence label tells the reader how many years backed the estimate.

use crate::{
    core::{
        aggregate::{YearlyAggregate, aggregate_window},
        window::{HistoricalWindow, historical_windows, window_end},
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// How many years of history back a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Three or more years with sales
    High,
    /// Exactly two years with sales
    Medium,
    /// One year with sales
    Low,
}

impl Confidence {
    /// Maps the number of years a product sold in to a confidence level.
    #[must_use]
    pub const fn from_years_found(years_found: usize) -> Self {
        match years_found {
            0 | 1 => Self::Low,
            2 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Lowercase label: `high`, `medium` or `low`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantity and revenue of one product in one sampled year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBreakdown {
    /// Year label of the window
    pub year: i32,
    /// Quantity sold in the window
    pub quantity: f64,
    /// Revenue in the window
    pub revenue: f64,
}

/// Suggested order for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductForecast {
    /// Product code
    pub product_code: String,
    /// Product name (first seen)
    pub product_name: String,
    /// Estimated units per day over the years the product sold in
    pub avg_daily_quantity: f64,
    /// Quantity summed over all sampled windows
    pub total_historical_quantity: f64,
    /// Units to order for the horizon
    pub suggested_order_quantity: u64,
    /// Number of windows the product sold in
    pub years_analyzed: usize,
    /// Revenue summed over all sampled windows
    pub historical_revenue: f64,
    /// Mean of the per-window average prices
    pub avg_price: f64,
    /// Confidence derived from `years_analyzed`
    pub confidence: Confidence,
    /// Per-year figures, most recent year first
    pub yearly_breakdown: Vec<YearBreakdown>,
}

/// Parameters of a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    /// First day of the forecast horizon; today when `None`
    pub reference_date: Option<NaiveDate>,
    /// Horizon length in days
    pub days: i64,
    /// Number of prior years to sample
    pub years_back: i64,
}

/// A sampled window and whether any sale fell inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampledWindow {
    /// The window
    #[serde(flatten)]
    pub window: HistoricalWindow,
    /// Whether at least one sale fell inside it
    pub has_data: bool,
}

/// The result of [`forecast_reorders`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    /// Suggestions ranked by suggested quantity, largest first
    pub forecasts: Vec<ProductForecast>,
    /// Every window that was sampled, most recent first
    pub windows_sampled: Vec<SampledWindow>,
    /// Number of windows holding at least one sale
    pub years_with_data: usize,
    /// First day of the forecast horizon
    pub prediction_start: NaiveDate,
    /// Last day of the forecast horizon
    pub prediction_end: NaiveDate,
    /// Horizon length in days
    pub days: i64,
    /// Number of prior years sampled
    pub years_back: i64,
}

#[derive(Debug, Default)]
struct ProductHistory {
    product_name: String,
    total_quantity: f64,
    total_revenue: f64,
    years_found: usize,
    prices: Vec<f64>,
    yearly: BTreeMap<i32, YearBreakdown>,
}

/// Merges per-window aggregates into ranked product forecasts.
///
/// `window_results` holds one aggregate set per sampled window. Products that
/// never appear are not reported. The result is ordered by suggested quantity,
/// largest first, with ties in product code order.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn merge_forecasts(window_results: &[Vec<YearlyAggregate>], days: i64) -> Vec<ProductForecast> {
    let mut products: BTreeMap<&str, ProductHistory> = BTreeMap::new();

    for aggregates in window_results {
        for item in aggregates {
            let history = products
                .entry(item.product_code.as_str())
                .or_insert_with(|| ProductHistory {
                    product_name: item.product_name.clone(),
                    ..Default::default()
                });

            history.total_quantity += item.total_quantity;
            history.total_revenue += item.total_revenue;
            history.years_found += 1;
            history.prices.push(item.avg_price);
            history.yearly.insert(
                item.year,
                YearBreakdown {
                    year: item.year,
                    quantity: item.total_quantity,
                    revenue: item.total_revenue,
                },
            );
        }
    }

    let days = days as f64;
    let mut forecasts: Vec<ProductForecast> = products
        .into_iter()
        .map(|(code, history)| {
            let years_found = history.years_found as f64;
            let avg_daily_quantity = history.total_quantity / (days * years_found);
            // Same as ceil(avg_daily_quantity * days) without the float round trip
            let suggested_order_quantity =
                (history.total_quantity / years_found).ceil().max(0.0) as u64;
            let avg_price = history.prices.iter().sum::<f64>() / history.prices.len() as f64;

            ProductForecast {
                product_code: code.to_string(),
                product_name: history.product_name,
                avg_daily_quantity,
                total_historical_quantity: history.total_quantity,
                suggested_order_quantity,
                years_analyzed: history.years_found,
                historical_revenue: history.total_revenue,
                avg_price,
                confidence: Confidence::from_years_found(history.years_found),
                yearly_breakdown: history.yearly.into_values().rev().collect(),
            }
        })
        .collect();

    forecasts.sort_by(|a, b| b.suggested_order_quantity.cmp(&a.suggested_order_quantity));
    forecasts
}

/// Computes reorder suggestions for the horizon described by `request`.
///
/// Parameters are validated before any query runs. Each window is queried in
/// turn; any storage failure aborts the whole forecast. A table with no sales
/// in any window yields an empty report rather than an error.
///
/// # Arguments
/// * `db` - Any connection or transaction holding the sales table
/// * `request` - Reference date (today when `None`), horizon in days and lookback in years
///
/// # Returns
/// A [`ForecastReport`] with suggestions ranked by suggested quantity, every
/// sampled window flagged by whether it held sales, and the prediction horizon.
///
/// # Errors
/// Returns [`crate::errors::Error::InvalidParameter`] for a non-positive
/// `days` or `years_back`, or a database error if a query fails.
#[instrument(skip(db))]
pub async fn forecast_reorders<C>(db: &C, request: &ForecastRequest) -> Result<ForecastReport>
where
    C: ConnectionTrait,
{
    let prediction_start = request
        .reference_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let windows = historical_windows(prediction_start, request.days, request.years_back)?;
    let prediction_end = window_end(prediction_start, request.days)?;

    let mut window_results = Vec::with_capacity(windows.len());
    for window in &windows {
        window_results.push(aggregate_window(db, window).await?);
    }

    let windows_sampled: Vec<SampledWindow> = windows
        .iter()
        .zip(&window_results)
        .map(|(window, aggregates)| SampledWindow {
            window: *window,
            has_data: !aggregates.is_empty(),
        })
        .collect();
    let years_with_data = windows_sampled.iter().filter(|w| w.has_data).count();

    let forecasts = merge_forecasts(&window_results, request.days);

    info!(
        products = forecasts.len(),
        years_with_data, "Generated reorder forecast"
    );

    Ok(ForecastReport {
        forecasts,
        windows_sampled,
        years_with_data,
        prediction_start,
        prediction_end,
        days: request.days,
        years_back: request.years_back,
    })
}
