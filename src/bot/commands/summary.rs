//! Summary Discord command - prints who owes whom.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{resident, summary::format_summary},
        errors::{Error, Result},
    };

    /// Shows every outstanding balance between residents.
    ///
    /// Balances come from the ledger watcher, which recomputes them whenever a record
    /// changes, so this command only looks up nicknames.
    #[poise::command(slash_command, prefix_command)]
    pub async fn summary(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let balances = data.balances.borrow().clone();
        let residents = resident::get_all_residents(&data.database).await?;

        let text = format_summary(&residents, &balances, data.currency_symbol());
        ctx.say(format!("📒 **Summary**\n{text}")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
