//! Sales Discord commands - `/sales`, `/top_items` and `/import_sales`.
//!
//! Listings read straight from the sales table; imports take a CSV attachment
//! exported by the point-of-sale system.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{
            dates::{format_sale_date, parse_sale_date},
            report::{format_money, format_quantity, truncate_text},
            sales as sale_ops,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// Largest attachment accepted by `/import_sales`, in bytes.
    const MAX_IMPORT_BYTES: u32 = 20 * 1024 * 1024;

    /// Largest number of rows shown in one listing.
    const MAX_LISTING_ROWS: u64 = 50;

    /// Checks a caller-supplied row limit, falling back to `default`.
    pub(crate) fn resolve_limit(limit: Option<u64>, default: u64) -> Result<u64> {
        let limit = limit.unwrap_or(default);
        if (1..=MAX_LISTING_ROWS).contains(&limit) {
            Ok(limit)
        } else {
            Err(Error::invalid_parameter(
                "limit",
                format!("must be between 1 and {MAX_LISTING_ROWS}"),
            ))
        }
    }

    /// Shows the most recent sales.
    #[poise::command(slash_command)]
    pub async fn sales(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Number of sales to show (1-50)"] limit: Option<u64>,
    ) -> Result<()> {
        let settings = &ctx.data().settings.reports;
        let limit = resolve_limit(limit, settings.default_limit)?;
        let db = &ctx.data().database;

        let rows = sale_ops::recent_sales(db, limit).await?;
        if rows.is_empty() {
            ctx.say("No sales recorded yet. Use `/import_sales` to load a CSV export.")
                .await?;
            return Ok(());
        }

        let lines = rows
            .iter()
            .map(|sale| {
                format!(
                    "`{}` {} `{}` {} × {} = {}",
                    format_sale_date(sale.sale_date),
                    sale.product_code,
                    truncate_text(&sale.product_name, 30),
                    format_quantity(sale.quantity),
                    format_money(sale.unit_price, &settings.currency),
                    format_money(sale.revenue, &settings.currency)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let embed = serenity::CreateEmbed::default()
            .title(format!("🧾 Last {} sales", rows.len()))
            .description(truncate_text(&lines, 4096))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the best-selling products of one day.
    #[poise::command(slash_command)]
    pub async fn top_items(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day to look at (DD.MM.YYYY)"] date: String,
        #[description = "Number of products to show (1-50)"] limit: Option<u64>,
    ) -> Result<()> {
        let date = parse_sale_date(&date)?;
        let settings = &ctx.data().settings.reports;
        let limit = resolve_limit(limit, settings.default_limit)?;
        let db = &ctx.data().database;

        let items = sale_ops::top_items_for_date(db, date, usize::try_from(limit).unwrap_or(usize::MAX))
            .await?;
        if items.is_empty() {
            ctx.say(format!("No sales on {}.", format_sale_date(date)))
                .await?;
            return Ok(());
        }

        let lines = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                format!(
                    "**{}.** `{}` {} - {} pcs · {}",
                    i + 1,
                    item.product_code,
                    truncate_text(&item.product_name, 40),
                    format_quantity(item.total_quantity),
                    format_money(item.total_revenue, &settings.currency)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let embed = serenity::CreateEmbed::default()
            .title(format!("🏆 Top items on {}", format_sale_date(date)))
            .description(truncate_text(&lines, 4096))
            .color(0x0058_65F2);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Imports sales from a CSV export.
    ///
    /// Expected header: `product_code,product_name,quantity,unit_price,date[,revenue]`.
    /// A bad row aborts the whole import.
    #[poise::command(slash_command)]
    pub async fn import_sales(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "CSV file exported by the till"] file: serenity::Attachment,
    ) -> Result<()> {
        if !file.filename.to_lowercase().ends_with(".csv") {
            return Err(Error::invalid_parameter("file", "must be a .csv file"));
        }
        if file.size > MAX_IMPORT_BYTES {
            return Err(Error::invalid_parameter(
                "file",
                format!("must be smaller than {} MB", MAX_IMPORT_BYTES / 1024 / 1024),
            ));
        }

        ctx.defer().await?;
        let bytes = file.download().await?;
        info!(
            user = %ctx.author().name,
            filename = %file.filename,
            bytes = bytes.len(),
            "Importing sales file"
        );

        let db = &ctx.data().database;
        let summary = sale_ops::import_sales_csv(db, bytes.as_slice()).await?;

        let period = match (summary.first_date, summary.last_date) {
            (Some(first), Some(last)) => {
                format!("{} – {}", format_sale_date(first), format_sale_date(last))
            }
            _ => "no rows".to_string(),
        };

        let embed = serenity::CreateEmbed::default()
            .title("📥 Import complete")
            .fields(vec![
                ("Rows", summary.rows_imported.to_string(), true),
                ("Products", summary.products.to_string(), true),
                ("Period", period, true),
                ("Import id", format!("`{}`", summary.import_id), false),
            ])
            .color(0x0057_F287);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
