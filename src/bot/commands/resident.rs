//! Resident Discord commands - adding, listing and removing the people in the household.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            resident,
            snapshot::{Change, ChangeEvent},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Parent command for managing residents.
    #[poise::command(
        slash_command,
        subcommands("resident_add", "resident_list", "resident_delete")
    )]
    pub async fn resident(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Resident management command. Available subcommands:\n\
            `/resident add` - Add a resident\n\
            `/resident list` - List all residents\n\
            `/resident delete` - Remove a resident with no records";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a resident to the household.
    #[poise::command(slash_command, rename = "add")]
    pub async fn resident_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nickname shown in summaries (must be unique)"] nickname: String,
    ) -> Result<()> {
        let data = ctx.data();

        match resident::create_resident(&data.database, &nickname).await {
            Ok(created) => {
                let reply = format!("✅ Added resident **{}**", created.nickname);
                data.publish([ChangeEvent::Resident(Change::Inserted(created))]);
                ctx.say(reply).await?;
            }
            Err(e) if e.is_user_error() => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Lists every resident.
    #[poise::command(slash_command, rename = "list")]
    pub async fn resident_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let residents = resident::get_all_residents(&ctx.data().database).await?;

        if residents.is_empty() {
            ctx.say("👥 No residents yet. Add one with `/resident add`.")
                .await?;
            return Ok(());
        }

        let mut response = format!("👥 **Residents** ({})\n", residents.len());
        for r in &residents {
            writeln!(
                response,
                "• **{}** (ID {}, since {})",
                r.nickname,
                r.id,
                r.created_at.format("%Y-%m-%d")
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Removes a resident that no expense or payment refers to.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn resident_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Nickname of the resident to remove"]
        #[autocomplete = "autocomplete::autocomplete_resident"]
        nickname: String,
    ) -> Result<()> {
        let data = ctx.data();

        let Some(target) = resident::get_resident_by_nickname(&data.database, &nickname).await?
        else {
            ctx.say(format!("❌ Resident '{nickname}' not found.")).await?;
            return Ok(());
        };

        match resident::delete_resident(&data.database, target.id).await {
            Ok(removed) => {
                let reply = format!("✅ Removed resident **{}**", removed.nickname);
                data.publish([ChangeEvent::Resident(Change::Deleted(removed))]);
                ctx.say(reply).await?;
            }
            Err(e) if e.is_user_error() => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
