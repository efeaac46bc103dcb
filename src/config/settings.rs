//! Application settings loading from config.toml
//!
//! Settings hold the defaults and limits for the forecast and report commands.
//! Every section and field is optional in the file; anything missing takes its
//! default value, and a missing file yields the defaults entirely.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable overriding the location of config.toml
pub const CONFIG_PATH_ENV: &str = "SALES_BUDDY_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Defaults and limits for `/suggest`
    pub forecast: ForecastSettings,
    /// Defaults for the listing and analytics commands
    pub reports: ReportSettings,
}

/// Forecast defaults and limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Horizon in days when the caller does not give one
    pub default_days: i64,
    /// Number of prior years sampled when the caller does not give one
    pub default_years_back: i64,
    /// Largest accepted horizon
    pub max_days: i64,
    /// Largest accepted lookback
    pub max_years_back: i64,
    /// Number of forecasts shown in one reply
    pub display_limit: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            default_days: 10,
            default_years_back: 4,
            max_days: 366,
            max_years_back: 20,
            display_limit: 15,
        }
    }
}

/// Report defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Row limit for listings when the caller does not give one
    pub default_limit: u64,
    /// Minimum number of sales for a product to rank as a best seller
    pub best_seller_min_sales: i64,
    /// Currency label appended to amounts
    pub currency: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            best_seller_min_sales: 10,
            currency: "KM".to_string(),
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or a field has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Attempting to load settings from: {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `$SALES_BUDDY_CONFIG` or `./config.toml`.
///
/// A missing file is not an error: the defaults are used instead.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());

    if Path::new(&path).exists() {
        let settings = load_settings(&path)?;
        info!("Loaded settings from {}", path);
        Ok(settings)
    } else {
        info!("No config file at {}, using default settings", path);
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [forecast]
            default_days = 14
            default_years_back = 3
            max_days = 90
            max_years_back = 10
            display_limit = 5

            [reports]
            default_limit = 30
            best_seller_min_sales = 4
            currency = "EUR"
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.forecast.default_days, 14);
        assert_eq!(settings.forecast.default_years_back, 3);
        assert_eq!(settings.forecast.max_days, 90);
        assert_eq!(settings.forecast.max_years_back, 10);
        assert_eq!(settings.forecast.display_limit, 5);
        assert_eq!(settings.reports.default_limit, 30);
        assert_eq!(settings.reports.best_seller_min_sales, 4);
        assert_eq!(settings.reports.currency, "EUR");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = parse_settings("[forecast]\ndefault_days = 7\n").unwrap();
        assert_eq!(settings.forecast.default_days, 7);
        assert_eq!(settings.forecast.default_years_back, 4);
        assert_eq!(settings.reports.default_limit, 20);
        assert_eq!(settings.reports.currency, "KM");
    }

    #[test]
    fn test_empty_file_is_default() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.forecast.default_days, 10);
        assert_eq!(settings.forecast.default_years_back, 4);
    }

    #[test]
    fn test_wrong_type_is_config_error() {
        let result = parse_settings("[forecast]\ndefault_days = \"ten\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = load_settings("does/not/exist/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
