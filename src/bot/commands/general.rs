//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**SalesBuddy Help**\n\
        Dates are always written as `DD.MM.YYYY`.\n\n\
        **Ordering**\n\
        • `/suggest [date] [days] [years]` - Suggests order quantities from the same period in previous years.\n\
        • `/today_history [date] [years]` - Compares one day with the same day in previous years.\n\n\
        **Sales**\n\
        • `/sales [limit]` - Shows the most recent sales.\n\
        • `/top_items <date> [limit]` - Best-selling products of one day.\n\
        • `/import_sales <file>` - Imports a CSV export (`product_code,product_name,quantity,unit_price,date[,revenue]`).\n\n\
        **Analytics**\n\
        • `/trends <period> [start] [end]` - Revenue by day, week, month or year.\n\
        • `/best_sellers [start] [end] [sort_by] [min_sales] [limit]` - Top products.\n\
        • `/slow_movers [start] [end] [limit]` - Products that stopped selling.\n\
        • `/seasonal [start] [end]` - Sales by month of the year.\n\
        • `/product_seasonality <product> [start] [end]` - Peak and low months of one product.\n\
        • `/overview [start] [end]` - Totals and the 80/20 split.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
