//! Sale entity - One row per sold line item in the sales fact table.
//!
//! Rows are written once by an import and never updated. The sale date is stored
//! as a calendar date so range filters compare dates, not `DD.MM.YYYY` strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier of the import batch that wrote this row
    pub import_id: String,
    /// When the import batch was written
    pub imported_at: DateTime,
    /// Product code (article number)
    #[sea_orm(indexed)]
    pub product_code: String,
    /// Product name as recorded on the sale; may vary between rows of one code
    pub product_name: String,
    /// Quantity sold
    pub quantity: f64,
    /// Unit price at the time of sale
    pub unit_price: f64,
    /// Calendar date of the sale
    #[sea_orm(indexed)]
    pub sale_date: Date,
    /// Revenue recorded at write time (quantity × unit price)
    pub revenue: f64,
}

/// Sales have no relations; the table is a flat fact table.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
