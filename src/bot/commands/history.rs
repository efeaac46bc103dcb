//! Same-day history command - `/today_history`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        config::settings::ForecastSettings,
        core::{
            dates::{format_sale_date, parse_sale_date},
            history,
            report::{format_day_in_year_line, format_money, format_quantity, truncate_text},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Number of previous years to compare, checked against the forecast lookback limit.
    pub(crate) fn resolve_years(settings: &ForecastSettings, years: Option<i64>) -> Result<i64> {
        let years = years.unwrap_or(settings.default_years_back);
        if (1..=settings.max_years_back).contains(&years) {
            Ok(years)
        } else {
            Err(Error::invalid_parameter(
                "years",
                format!("must be between 1 and {}", settings.max_years_back),
            ))
        }
    }

    /// Compares one calendar day across previous years.
    #[poise::command(slash_command)]
    pub async fn today_history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day to compare (DD.MM.YYYY). Defaults to today."] date: Option<String>,
        #[description = "Number of previous years. Defaults to 4."] years: Option<i64>,
    ) -> Result<()> {
        let settings = &ctx.data().settings;
        let reference = match date.as_deref() {
            Some(input) => parse_sale_date(input)?,
            None => chrono::Local::now().date_naive(),
        };
        let years = resolve_years(&settings.forecast, years)?;

        ctx.defer().await?;
        let db = &ctx.data().database;
        let result = history::day_history(db, reference, years).await?;

        let currency = &settings.reports.currency;
        let max_revenue = result
            .years
            .iter()
            .map(|day| day.total_revenue)
            .fold(0.0, f64::max);
        let lines = result
            .years
            .iter()
            .map(|day| format_day_in_year_line(day, max_revenue, currency))
            .collect::<Vec<_>>()
            .join("\n");

        let embed = serenity::CreateEmbed::default()
            .title(format!(
                "📅 {} in previous years",
                reference.format("%d.%m.")
            ))
            .description(truncate_text(&lines, 4096))
            .fields(vec![
                (
                    "Total revenue",
                    format_money(result.total_revenue, currency),
                    true,
                ),
                ("Total quantity", format_quantity(result.total_quantity), true),
                ("Sales", result.total_sales.to_string(), true),
                (
                    "Average per year",
                    format_money(result.avg_revenue_per_year, currency),
                    true,
                ),
            ])
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Reference day: {}",
                format_sale_date(reference)
            )))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
