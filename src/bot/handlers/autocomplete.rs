//! Autocomplete handlers for Discord slash command parameters.
//!
//! Product suggestions are shown as `CODE · Name`; commands receiving such a
//! choice strip it back to the code with [`code_from_choice`].

use crate::{bot::BotData, core::sales, errors::Error};
use tracing::warn;

/// Discord shows at most 25 autocomplete choices.
const MAX_CHOICES: usize = 25;

const CHOICE_SEPARATOR: &str = " · ";

/// Provides autocomplete suggestions for product codes.
///
/// Matches the partial input against both code and name and returns up to 25
/// `CODE · Name` entries ordered by code. Lookup failures yield no suggestions.
pub async fn autocomplete_product_code(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    match sales::search_product_codes(db, partial, MAX_CHOICES).await {
        Ok(products) => products
            .into_iter()
            .map(|(code, name)| format_choice(&code, &name))
            .collect(),
        Err(e) => {
            warn!("Product autocomplete failed: {}", e);
            Vec::new()
        }
    }
}

fn format_choice(code: &str, name: &str) -> String {
    let choice = format!("{code}{CHOICE_SEPARATOR}{name}");
    // Discord caps choice names at 100 characters
    if choice.chars().count() > 100 {
        choice.chars().take(100).collect()
    } else {
        choice
    }
}

/// Extracts the product code from an autocomplete choice or a typed code.
#[must_use]
pub fn code_from_choice(input: &str) -> &str {
    input
        .split_once(CHOICE_SEPARATOR)
        .map_or(input, |(code, _)| code)
        .trim()
}
