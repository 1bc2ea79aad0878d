//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests resident nicknames as the user types, so commands that take a resident
//! don't depend on remembering exact spelling.

use crate::{bot::BotData, core::resident, errors::Error};

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Nicknames containing `partial` (case-insensitive), alphabetical, at most 25.
#[must_use]
pub fn matching_nicknames<'a, I>(nicknames: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let partial_lower = partial.trim().to_lowercase();
    let mut matching: Vec<String> = nicknames
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .map(str::to_string)
        .collect();
    matching.sort();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Provides autocomplete suggestions for resident nicknames.
///
/// # Arguments
/// * `ctx` - The poise context containing the database connection
/// * `partial` - The partial string the user has typed so far
pub async fn autocomplete_resident(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(residents) = resident::get_all_residents(db).await else {
        return Vec::new();
    };

    matching_nicknames(residents.iter().map(|r| r.nickname.as_str()), partial)
}
