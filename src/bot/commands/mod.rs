//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Product analytics and trend commands
pub mod analytics;

/// Reorder forecast command
pub mod forecast;

/// General utility commands
pub mod general;

/// Same-day comparison across previous years
pub mod history;

/// Sales listing and import commands
pub mod sales;

// Export commands
pub use analytics::*;
pub use forecast::*;
pub use general::*;
pub use history::*;
pub use sales::*;
