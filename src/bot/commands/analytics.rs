//! Analytics Discord commands - trends, best sellers, slow movers, seasonality
//! and the overview.
//!
//! All commands accept an optional `start`/`end` range in `DD.MM.YYYY`; an
//! omitted bound leaves that side open.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            analytics::{self, BestSellerQuery, SortBy},
            dates::DateRange,
            report::{
                format_bar, format_growth, format_money, format_performance_line,
                format_quantity, format_slow_mover_line, format_trend_lines, trend_report_fields,
                truncate_text,
            },
            trends::{self, TrendPeriod},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Buckets shown in one trend reply; the most recent are kept.
    const MAX_TREND_LINES: usize = 30;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum PeriodChoice {
        #[name = "daily"]
        Daily,
        #[name = "weekly"]
        Weekly,
        #[name = "monthly"]
        Monthly,
        #[name = "yearly"]
        Yearly,
    }

    impl From<PeriodChoice> for TrendPeriod {
        fn from(choice: PeriodChoice) -> Self {
            match choice {
                PeriodChoice::Daily => Self::Daily,
                PeriodChoice::Weekly => Self::Weekly,
                PeriodChoice::Monthly => Self::Monthly,
                PeriodChoice::Yearly => Self::Yearly,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum SortChoice {
        #[name = "quantity"]
        Quantity,
        #[name = "revenue"]
        Revenue,
    }

    impl From<SortChoice> for SortBy {
        fn from(choice: SortChoice) -> Self {
            match choice {
                SortChoice::Quantity => Self::Quantity,
                SortChoice::Revenue => Self::Revenue,
            }
        }
    }

    fn resolve_count(limit: Option<u64>, default: u64) -> Result<usize> {
        let limit = limit.unwrap_or(default);
        if (1..=25).contains(&limit) {
            usize::try_from(limit).map_err(|_| Error::invalid_parameter("limit", "too large"))
        } else {
            Err(Error::invalid_parameter("limit", "must be between 1 and 25"))
        }
    }

    fn range_footer(range: &DateRange) -> serenity::CreateEmbedFooter {
        serenity::CreateEmbedFooter::new(format!("Period: {}", range.describe()))
    }

    /// Shows revenue by day, week, month or year.
    #[poise::command(slash_command)]
    pub async fn trends(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Bucket size"] period: PeriodChoice,
        #[description = "First day (DD.MM.YYYY)"] start: Option<String>,
        #[description = "Last day (DD.MM.YYYY)"] end: Option<String>,
    ) -> Result<()> {
        let range = DateRange::parse(start.as_deref(), end.as_deref())?;
        ctx.defer().await?;

        let db = &ctx.data().database;
        let currency = &ctx.data().settings.reports.currency;
        let report = trends::sales_trends(db, period.into(), &range).await?;

        if report.buckets.is_empty() {
            ctx.say(format!("No sales in {}.", range.describe())).await?;
            return Ok(());
        }

        let description = format_trend_lines(&report.buckets, currency, MAX_TREND_LINES);

        let embed = serenity::CreateEmbed::default()
            .title(format!("📈 Sales trends ({})", report.period))
            .description(truncate_text(&description, 4096))
            .fields(trend_report_fields(&report, currency))
            .footer(range_footer(&range))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the best-selling products.
    #[poise::command(slash_command)]
    pub async fn best_sellers(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day (DD.MM.YYYY)"] start: Option<String>,
        #[description = "Last day (DD.MM.YYYY)"] end: Option<String>,
        #[description = "Rank by quantity or revenue"] sort_by: Option<SortChoice>,
        #[description = "Minimum number of sales"] min_sales: Option<i64>,
        #[description = "Number of products to show (1-25)"] limit: Option<u64>,
    ) -> Result<()> {
        let range = DateRange::parse(start.as_deref(), end.as_deref())?;
        let settings = &ctx.data().settings.reports;
        let min_sales = min_sales.unwrap_or(settings.best_seller_min_sales);
        if min_sales < 0 {
            return Err(Error::invalid_parameter("min_sales", "cannot be negative"));
        }
        let query = BestSellerQuery {
            sort_by: sort_by.map(SortBy::from).unwrap_or_default(),
            min_sales,
            limit: resolve_count(limit, settings.default_limit.min(25))?,
        };

        ctx.defer().await?;
        let db = &ctx.data().database;
        let products = analytics::best_sellers(db, &range, &query).await?;

        let description = if products.is_empty() {
            format!("No product has at least {min_sales} sales in this period.")
        } else {
            products
                .iter()
                .enumerate()
                .map(|(i, product)| format_performance_line(i + 1, product, &settings.currency))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let embed = serenity::CreateEmbed::default()
            .title("🥇 Best sellers")
            .description(truncate_text(&description, 4096))
            .footer(range_footer(&range))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows products that have stopped selling, with a recommendation.
    #[poise::command(slash_command)]
    pub async fn slow_movers(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day (DD.MM.YYYY)"] start: Option<String>,
        #[description = "Last day (DD.MM.YYYY)"] end: Option<String>,
        #[description = "Number of products to show (1-25)"] limit: Option<u64>,
    ) -> Result<()> {
        let range = DateRange::parse(start.as_deref(), end.as_deref())?;
        let settings = &ctx.data().settings.reports;
        let limit = resolve_count(limit, settings.default_limit.min(25))?;

        ctx.defer().await?;
        let db = &ctx.data().database;
        let today = chrono::Local::now().date_naive();
        let movers = analytics::slow_movers(db, &range, today, limit).await?;

        let description = if movers.is_empty() {
            "No products with at least three sales in this period.".to_string()
        } else {
            movers
                .iter()
                .map(format_slow_mover_line)
                .collect::<Vec<_>>()
                .join("\n")
        };

        let embed = serenity::CreateEmbed::default()
            .title("🐢 Slow movers")
            .description(truncate_text(&description, 4096))
            .footer(range_footer(&range))
            .color(0x00FE_E75C);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows sales by month of the year.
    #[poise::command(slash_command)]
    pub async fn seasonal(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day (DD.MM.YYYY)"] start: Option<String>,
        #[description = "Last day (DD.MM.YYYY)"] end: Option<String>,
    ) -> Result<()> {
        let range = DateRange::parse(start.as_deref(), end.as_deref())?;
        ctx.defer().await?;

        let db = &ctx.data().database;
        let currency = &ctx.data().settings.reports.currency;
        let patterns = analytics::seasonal_patterns(db, &range).await?;

        if patterns.is_empty() {
            ctx.say(format!("No sales in {}.", range.describe())).await?;
            return Ok(());
        }

        let max_revenue = patterns
            .iter()
            .map(|pattern| pattern.total_revenue)
            .fold(0.0, f64::max);
        let lines = patterns
            .iter()
            .map(|pattern| {
                format!(
                    "`{:<9}` {} {} · {}/day · {}",
                    pattern.month_name,
                    format_bar(pattern.total_revenue, max_revenue, Some(12)),
                    format_money(pattern.total_revenue, currency),
                    format_money(pattern.avg_daily_revenue, currency),
                    format_growth(pattern.year_over_year_growth)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let embed = serenity::CreateEmbed::default()
            .title("🗓️ Seasonal patterns")
            .description(truncate_text(&lines, 4096))
            .footer(range_footer(&range))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the peak and low months of one product.
    #[poise::command(slash_command)]
    pub async fn product_seasonality(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product code"]
        #[autocomplete = "autocomplete::autocomplete_product_code"]
        product: String,
        #[description = "First day (DD.MM.YYYY)"] start: Option<String>,
        #[description = "Last day (DD.MM.YYYY)"] end: Option<String>,
    ) -> Result<()> {
        let range = DateRange::parse(start.as_deref(), end.as_deref())?;
        let code = autocomplete::code_from_choice(&product);
        ctx.defer().await?;

        let db = &ctx.data().database;
        let seasonality = analytics::product_seasonality(db, &range, code).await?;

        let lines = seasonality
            .monthly_patterns
            .iter()
            .map(|month| {
                format!(
                    "`{:<9}` {} {} pcs ({:.1}%)",
                    month.month_name,
                    format_bar(month.percentage_of_annual, 100.0, Some(10)),
                    format_quantity(month.quantity),
                    month.percentage_of_annual
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let embed = serenity::CreateEmbed::default()
            .title(format!(
                "🗓️ {} · {}",
                seasonality.product_code,
                truncate_text(&seasonality.product_name, 200)
            ))
            .description(truncate_text(&lines, 4096))
            .fields(vec![
                ("Peak months", seasonality.peak_months.join(", "), true),
                ("Low months", seasonality.low_months.join(", "), true),
            ])
            .footer(range_footer(&range))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows totals and how many products earn 80% of revenue.
    #[poise::command(slash_command)]
    pub async fn overview(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First day (DD.MM.YYYY)"] start: Option<String>,
        #[description = "Last day (DD.MM.YYYY)"] end: Option<String>,
    ) -> Result<()> {
        let range = DateRange::parse(start.as_deref(), end.as_deref())?;
        ctx.defer().await?;

        let db = &ctx.data().database;
        let currency = &ctx.data().settings.reports.currency;
        let overview = analytics::overview(db, &range).await?;

        let embed = serenity::CreateEmbed::default()
            .title("📊 Overview")
            .fields(vec![
                ("Products", overview.total_products.to_string(), true),
                (
                    "Revenue",
                    format_money(overview.total_revenue, currency),
                    true,
                ),
                ("Quantity", format_quantity(overview.total_quantity), true),
                ("Sales", overview.total_transactions.to_string(), true),
                (
                    "80% of revenue from",
                    format!(
                        "{} products ({:.1}%)",
                        overview.pareto_products_count, overview.pareto_percentage
                    ),
                    true,
                ),
            ])
            .footer(range_footer(&range))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
