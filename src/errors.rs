//! Unified error types for `SalesBuddy`.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors fall into two
//! classes: client errors (bad parameters, unknown products) which are reported
//! back to the caller verbatim, and server errors (storage, configuration,
//! framework) which are logged and reported generically.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid date '{input}': expected DD.MM.YYYY")]
    InvalidDate { input: String },

    #[error("No sales found for product '{code}'")]
    ProductNotFound { code: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Import failed at row {row}: {message}")]
    Import { row: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidParameter`].
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true when the error was caused by the caller's input rather than
    /// by the service. Client errors are never retried.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::InvalidDate { .. }
                | Self::ProductNotFound { .. }
                | Self::Import { .. }
                | Self::Csv(_)
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
