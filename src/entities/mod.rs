//! Entity module - Contains the SeaORM entity definitions for the database.
//! The sales fact table is the only table; every report is derived from it.

pub mod sale;

pub use sale::{Column as SaleColumn, Entity as Sale, Model as SaleModel};
