//! Reorder forecast command - `/suggest`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        config::settings::ForecastSettings,
        core::{
            dates::{format_sale_date, parse_sale_date},
            forecast::{self, ForecastRequest},
            report,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Discord allows at most 25 fields per embed; one is kept for the windows.
    const MAX_FORECAST_FIELDS: usize = 24;

    /// Fills in defaults and checks the horizon and lookback against the configured limits.
    pub(crate) fn build_request(
        settings: &ForecastSettings,
        date: Option<&str>,
        days: Option<i64>,
        years: Option<i64>,
    ) -> Result<ForecastRequest> {
        let reference_date = date.map(parse_sale_date).transpose()?;
        let days = days.unwrap_or(settings.default_days);
        let years_back = years.unwrap_or(settings.default_years_back);

        if !(1..=settings.max_days).contains(&days) {
            return Err(Error::invalid_parameter(
                "days",
                format!("must be between 1 and {}", settings.max_days),
            ));
        }
        if !(1..=settings.max_years_back).contains(&years_back) {
            return Err(Error::invalid_parameter(
                "years",
                format!("must be between 1 and {}", settings.max_years_back),
            ));
        }

        Ok(ForecastRequest {
            reference_date,
            days,
            years_back,
        })
    }

    /// Suggests order quantities from sales in the same period of previous years.
    #[poise::command(slash_command)]
    pub async fn suggest(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day to order for (DD.MM.YYYY). Defaults to today."] date: Option<
            String,
        >,
        #[description = "Number of days to cover. Defaults to 10."] days: Option<i64>,
        #[description = "Number of previous years to look at. Defaults to 4."] years: Option<i64>,
    ) -> Result<()> {
        let settings = &ctx.data().settings;
        let request = build_request(&settings.forecast, date.as_deref(), days, years)?;

        ctx.defer().await?;
        let db = &ctx.data().database;
        let result = forecast::forecast_reorders(db, &request).await?;

        let currency = &settings.reports.currency;
        let shown = settings.forecast.display_limit.min(MAX_FORECAST_FIELDS);

        let description = if result.forecasts.is_empty() {
            "No sales found in any of the sampled periods.".to_string()
        } else {
            format!(
                "{} products sold in {} of {} sampled years. Showing the top {}.",
                result.forecasts.len(),
                result.years_with_data,
                result.years_back,
                shown.min(result.forecasts.len())
            )
        };

        let mut fields: Vec<(String, String, bool)> = result
            .forecasts
            .iter()
            .take(shown)
            .map(|forecast| {
                let (name, value) = report::format_forecast_field(forecast, currency);
                (
                    report::truncate_text(&name, 256),
                    report::truncate_text(&value, 1024),
                    false,
                )
            })
            .collect();
        fields.push((
            "Sampled periods".to_string(),
            report::truncate_text(&report::format_window_lines(&result.windows_sampled), 1024),
            false,
        ));

        let embed = serenity::CreateEmbed::default()
            .title(format!(
                "📦 Order suggestions {} – {}",
                format_sale_date(result.prediction_start),
                format_sale_date(result.prediction_end)
            ))
            .description(description)
            .fields(fields)
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::inner::build_request;
    use crate::{config::settings::ForecastSettings, errors::Error, test_utils::date};

    #[test]
    fn test_build_request_defaults() {
        let settings = ForecastSettings::default();
        let request = build_request(&settings, None, None, None).unwrap();
        assert_eq!(request.reference_date, None);
        assert_eq!(request.days, 10);
        assert_eq!(request.years_back, 4);
    }

    #[test]
    fn test_build_request_parses_date() {
        let settings = ForecastSettings::default();
        let request = build_request(&settings, Some("29.10.2025"), Some(10), Some(2)).unwrap();
        assert_eq!(request.reference_date, Some(date(2025, 10, 29)));
        assert_eq!(request.years_back, 2);
    }

    #[test]
    fn test_build_request_rejects_out_of_range() {
        let settings = ForecastSettings::default();
        assert!(matches!(
            build_request(&settings, None, Some(0), None),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            build_request(&settings, None, Some(367), None),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            build_request(&settings, None, None, Some(21)),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            build_request(&settings, Some("2025-10-29"), None, None),
            Err(Error::InvalidDate { .. })
        ));
    }
}
