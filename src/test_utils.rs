//! Shared test utilities for `SalesBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and writing sales with sensible defaults.

use crate::{
    core::{
        dates::parse_sale_date,
        sales::{self, NewSale},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a calendar date, panicking on impossible input.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Writes one sale with revenue = quantity × unit price.
///
/// # Arguments
/// * `db` - Database connection
/// * `code` - Product code
/// * `name` - Product name
/// * `quantity` - Quantity sold
/// * `unit_price` - Unit price
/// * `sale_date` - Date as `DD.MM.YYYY`
pub async fn insert_test_sale(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    quantity: f64,
    unit_price: f64,
    sale_date: &str,
) -> Result<entities::sale::Model> {
    sales::insert_sale(
        db,
        NewSale {
            product_code: code.to_string(),
            product_name: name.to_string(),
            quantity,
            unit_price,
            sale_date: parse_sale_date(sale_date)?,
            revenue: None,
        },
    )
    .await
}

/// Writes one sale with an explicitly recorded revenue.
pub async fn insert_sale_with_revenue(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    quantity: f64,
    revenue: f64,
    sale_date: &str,
) -> Result<entities::sale::Model> {
    let unit_price = if quantity == 0.0 { 0.0 } else { revenue / quantity };
    sales::insert_sale(
        db,
        NewSale {
            product_code: code.to_string(),
            product_name: name.to_string(),
            quantity,
            unit_price,
            sale_date: parse_sale_date(sale_date)?,
            revenue: Some(revenue),
        },
    )
    .await
}

/// Sets up a database holding the two-year forecast scenario: product `A1`
/// sold 20 units (revenue 200) in the 2024 window and 10 units (revenue 100)
/// in the 2023 window around 29 October.
pub async fn setup_forecast_scenario() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    insert_sale_with_revenue(&db, "A1", "Article One", 12.0, 120.0, "29.10.2024").await?;
    insert_sale_with_revenue(&db, "A1", "Article One", 8.0, 80.0, "07.11.2024").await?;
    insert_sale_with_revenue(&db, "A1", "Article One", 10.0, 100.0, "01.11.2023").await?;
    Ok(db)
}
