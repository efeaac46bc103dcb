//! Grouped aggregate queries over the sales fact table.
//!
//! Every report is built from one of two grouped queries: totals per product
//! ([`product_totals`]) or totals per calendar day ([`daily_totals`]). Both take
//! any [`ConnectionTrait`], so they run the same way on a plain connection, a
//! transaction, `SQLite` or Postgres.

use crate::{
    core::window::HistoricalWindow,
    entities::{Sale, sale},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::Serialize;
use tracing::debug;

/// Sales totals of one product over a filtered set of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotals {
    /// Product code
    pub product_code: String,
    /// First product name seen for the code (ordered by name)
    pub product_name: String,
    /// Sum of quantities
    pub total_quantity: f64,
    /// Sum of recorded revenue
    pub total_revenue: f64,
    /// Number of sale rows
    pub sale_count: i64,
    /// Mean unit price over all rows
    pub avg_price: f64,
    /// Earliest sale date
    pub first_sale: NaiveDate,
    /// Latest sale date
    pub last_sale: NaiveDate,
}

/// Sales totals of one product inside one historical window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyAggregate {
    /// Year label of the window
    pub year: i32,
    /// Product code
    pub product_code: String,
    /// First product name seen for the code in the window
    pub product_name: String,
    /// Sum of quantities in the window
    pub total_quantity: f64,
    /// Sum of recorded revenue in the window
    pub total_revenue: f64,
    /// Number of sale rows in the window
    pub sale_count: i64,
    /// Mean unit price in the window
    pub avg_price: f64,
}

/// Sales totals of one calendar day.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct DailyTotals {
    /// The day
    pub sale_date: NaiveDate,
    /// Sum of recorded revenue
    pub total_revenue: f64,
    /// Sum of quantities
    pub total_quantity: f64,
    /// Number of sale rows
    pub sale_count: i64,
    /// Sum of unit prices, kept so averages can be recombined across days
    pub price_sum: f64,
}

#[derive(Debug, FromQueryResult)]
struct GroupedProductRow {
    product_code: String,
    product_name: String,
    total_quantity: f64,
    total_revenue: f64,
    sale_count: i64,
    price_sum: f64,
    first_sale: NaiveDate,
    last_sale: NaiveDate,
}

/// Running totals while folding `(code, name)` groups into one per code.
#[derive(Debug)]
struct ProductAccumulator {
    row: GroupedProductRow,
}

impl ProductAccumulator {
    fn absorb(&mut self, other: GroupedProductRow) {
        self.row.total_quantity += other.total_quantity;
        self.row.total_revenue += other.total_revenue;
        self.row.sale_count += other.sale_count;
        self.row.price_sum += other.price_sum;
        self.row.first_sale = self.row.first_sale.min(other.first_sale);
        self.row.last_sale = self.row.last_sale.max(other.last_sale);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> ProductTotals {
        let row = self.row;
        let avg_price = if row.sale_count > 0 {
            row.price_sum / row.sale_count as f64
        } else {
            0.0
        };

        ProductTotals {
            product_code: row.product_code,
            product_name: row.product_name,
            total_quantity: row.total_quantity,
            total_revenue: row.total_revenue,
            sale_count: row.sale_count,
            avg_price,
            first_sale: row.first_sale,
            last_sale: row.last_sale,
        }
    }
}

/// Folds rows grouped by `(code, name)` and ordered by code then name into one
/// entry per code, keeping the first name seen.
fn fold_by_code(rows: Vec<GroupedProductRow>) -> Vec<ProductTotals> {
    let mut totals = Vec::new();
    let mut current: Option<ProductAccumulator> = None;

    for row in rows {
        match current.as_mut() {
            Some(acc) if acc.row.product_code == row.product_code => acc.absorb(row),
            _ => {
                if let Some(done) = current.replace(ProductAccumulator { row }) {
                    totals.push(done.finish());
                }
            }
        }
    }
    if let Some(done) = current {
        totals.push(done.finish());
    }

    totals
}

/// Returns per-product totals of all sales matching `condition`, ordered by
/// product code.
///
/// Rows are grouped by `(product_code, product_name)` in SQL; name variants of
/// one code are then merged so each code appears once.
///
/// # Arguments
/// * `db` - Any connection or transaction
/// * `condition` - Row filter, usually a date range from [`crate::core::dates::DateRange::condition`]
///
/// # Returns
/// One [`ProductTotals`] per product code; empty when no row matches.
pub async fn product_totals<C>(db: &C, condition: Condition) -> Result<Vec<ProductTotals>>
where
    C: ConnectionTrait,
{
    let rows = Sale::find()
        .select_only()
        .column(sale::Column::ProductCode)
        .column(sale::Column::ProductName)
        .column_as(sale::Column::Quantity.sum(), "total_quantity")
        .column_as(sale::Column::Revenue.sum(), "total_revenue")
        .column_as(sale::Column::Id.count(), "sale_count")
        .column_as(sale::Column::UnitPrice.sum(), "price_sum")
        .column_as(sale::Column::SaleDate.min(), "first_sale")
        .column_as(sale::Column::SaleDate.max(), "last_sale")
        .filter(condition)
        .group_by(sale::Column::ProductCode)
        .group_by(sale::Column::ProductName)
        .order_by_asc(sale::Column::ProductCode)
        .order_by_asc(sale::Column::ProductName)
        .into_model::<GroupedProductRow>()
        .all(db)
        .await?;

    Ok(fold_by_code(rows))
}

/// Returns per-day totals of all sales matching `condition`, oldest day first.
/// Days without sales are absent.
pub async fn daily_totals<C>(db: &C, condition: Condition) -> Result<Vec<DailyTotals>>
where
    C: ConnectionTrait,
{
    Sale::find()
        .select_only()
        .column(sale::Column::SaleDate)
        .column_as(sale::Column::Revenue.sum(), "total_revenue")
        .column_as(sale::Column::Quantity.sum(), "total_quantity")
        .column_as(sale::Column::Id.count(), "sale_count")
        .column_as(sale::Column::UnitPrice.sum(), "price_sum")
        .filter(condition)
        .group_by(sale::Column::SaleDate)
        .order_by_asc(sale::Column::SaleDate)
        .into_model::<DailyTotals>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Aggregates the sales inside one historical window, one entry per product
/// code. A window without sales yields an empty vector.
///
/// # Arguments
/// * `db` - Any connection or transaction
/// * `window` - Inclusive date range; its `year` labels every result
///
/// # Returns
/// A vector of [`YearlyAggregate`] ordered by product code.
pub async fn aggregate_window<C>(db: &C, window: &HistoricalWindow) -> Result<Vec<YearlyAggregate>>
where
    C: ConnectionTrait,
{
    let condition = Condition::all()
        .add(sale::Column::SaleDate.gte(window.start))
        .add(sale::Column::SaleDate.lte(window.end));

    let aggregates: Vec<YearlyAggregate> = product_totals(db, condition)
        .await?
        .into_iter()
        .map(|totals| YearlyAggregate {
            year: window.year,
            product_code: totals.product_code,
            product_name: totals.product_name,
            total_quantity: totals.total_quantity,
            total_revenue: totals.total_revenue,
            sale_count: totals.sale_count,
            avg_price: totals.avg_price,
        })
        .collect();

    debug!(
        year = window.year,
        products = aggregates.len(),
        "Aggregated historical window"
    );
    Ok(aggregates)
}
