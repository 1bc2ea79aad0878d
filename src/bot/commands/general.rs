//! General Discord commands - ping and help.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**House Ledger Help**\n\
        Keeps track of shared expenses and who owes whom.\n\n\
        **Balances**\n\
        • `/summary` - Shows every outstanding debt between residents.\n\n\
        **Expenses**\n\
        • `/expense add <item> <price> <care_of> [contributors] [notes]` - Logs an expense. \
        Contributors are comma-separated nicknames and default to everyone.\n\
        • `/expense list` - Shows the latest expenses.\n\
        • `/expense contributors <id> [add] [remove]` - Shows or edits who shares an expense.\n\
        • `/expense delete <id>` - Removes an expense.\n\n\
        **Payments**\n\
        • `/payment add <received_by> <amount> [paid_by] [for_expenses] [notes]` - Records a \
        reimbursement. `paid_by` defaults to you.\n\
        • `/payment list` - Shows the latest payments.\n\
        • `/payment delete <id>` - Removes a payment.\n\n\
        **Residents**\n\
        • `/resident add <nickname>`, `/resident list`, `/resident delete <nickname>`\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
