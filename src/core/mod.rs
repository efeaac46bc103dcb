//! Core business logic - framework-agnostic forecasting and sales analytics.
//!
//! Every operation takes an injected storage connection and returns structured
//! data; nothing here knows about Discord.

/// Grouped aggregate queries over the sales table
pub mod aggregate;
/// Best sellers, slow movers, seasonality and the revenue overview
pub mod analytics;
/// `DD.MM.YYYY` parsing and date ranges
pub mod dates;
/// Historical reorder forecasting
pub mod forecast;
/// One calendar day compared across previous years
pub mod history;
/// Text formatting of results
pub mod report;
/// Sales imports, listings and lookups
pub mod sales;
/// Sales trends by period
pub mod trends;
/// Historical window generation
pub mod window;
