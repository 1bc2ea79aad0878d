//! Expense Discord commands - logging, listing and removing shared expenses.
//!
//! Contributors are entered as a comma-separated list of nicknames. Every write publishes
//! the rows it touched on the change feed so the live balances follow along.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{LIST_LIMIT, resolve_resident},
            handlers::autocomplete,
        },
        core::{
            expense::{self, NewExpense},
            resident,
            snapshot::{Change, ChangeEvent},
            summary::{format_currency, nickname_of},
        },
        entities::resident as resident_entity,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    fn nickname_list(
        residents: &[resident_entity::Model],
        ids: impl IntoIterator<Item = i64>,
    ) -> String {
        ids.into_iter()
            .map(|id| nickname_of(residents, id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parent command for shared expenses.
    #[poise::command(
        slash_command,
        subcommands("expense_add", "expense_list", "expense_delete", "expense_contributors")
    )]
    pub async fn expense(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Expense command. Available subcommands:\n\
            `/expense add` - Log a shared expense\n\
            `/expense list` - List the latest expenses\n\
            `/expense contributors` - Show or change who shares an expense\n\
            `/expense delete` - Remove an expense";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Logs a shared expense paid for by one resident.
    ///
    /// Without a contributor list the cost is split between every resident.
    #[poise::command(slash_command, rename = "add")]
    pub async fn expense_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "What was bought (e.g., 'Groceries')"] item: String,
        #[description = "Total price"] price: f64,
        #[description = "Resident who paid"]
        #[autocomplete = "autocomplete::autocomplete_resident"]
        care_of: String,
        #[description = "Comma-separated nicknames sharing the cost (defaults to everyone)"]
        contributors: Option<String>,
        #[description = "Optional notes"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let residents = resident::get_all_residents(db).await?;

        let built = build_new_expense(
            &residents,
            item,
            price,
            &care_of,
            contributors.as_deref(),
            notes,
        );
        let new_expense = match built {
            Ok(new_expense) => new_expense,
            Err(e) if e.is_user_error() => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let created = match expense::create_expense(db, new_expense).await {
            Ok(created) => created,
            Err(e) if e.is_user_error() => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        data.publish(created.changes());

        let symbol = data.currency_symbol();
        let expense = &created.expense;
        #[allow(clippy::cast_precision_loss)] // Household sizes are tiny
        let share = expense.price / created.contributions.len().max(1) as f64;
        let response = format!(
            "✅ Logged **{}** for {} (ID {}), care of **{}**\nSplit {} each between: {}",
            expense.item,
            format_currency(symbol, expense.price),
            expense.id,
            nickname_of(&residents, expense.care_of),
            format_currency(symbol, share),
            nickname_list(&residents, created.contributions.iter().map(|c| c.resident_id)),
        );
        ctx.say(response).await?;
        Ok(())
    }

    fn build_new_expense(
        residents: &[resident_entity::Model],
        item: String,
        price: f64,
        care_of: &str,
        contributors: Option<&str>,
        notes: Option<String>,
    ) -> Result<NewExpense> {
        let care_of = resolve_resident(residents, care_of)?;
        let contributors = match contributors {
            Some(list) => resident::resolve_nicknames(residents, list)?,
            None => residents.iter().map(|r| r.id).collect(),
        };

        Ok(NewExpense {
            item,
            price,
            care_of,
            contributors,
            notes,
        })
    }

    /// Lists the most recent expenses.
    #[poise::command(slash_command, rename = "list")]
    pub async fn expense_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let expenses = expense::get_all_expenses(db).await?;
        if expenses.is_empty() {
            ctx.say("🧾 No expenses logged yet. Add one with `/expense add`.")
                .await?;
            return Ok(());
        }

        let residents = resident::get_all_residents(db).await?;
        let contributions = expense::get_all_contributions(db).await?;
        let symbol = data.currency_symbol();

        let mut response = format!(
            "🧾 **Expenses** (latest {} of {})\n",
            expenses.len().min(LIST_LIMIT),
            expenses.len()
        );
        for e in expenses.iter().rev().take(LIST_LIMIT) {
            let sharing = contributions.iter().filter(|c| c.expense_id == e.id).count();
            write!(
                response,
                "`#{}` **{}** {} care of **{}**, split {} way(s) ({})",
                e.id,
                e.item,
                format_currency(symbol, e.price),
                nickname_of(&residents, e.care_of),
                sharing,
                e.created_at.format("%Y-%m-%d")
            )?;
            if let Some(notes) = &e.notes {
                write!(response, " - {notes}")?;
            }
            response.push('\n');
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Removes an expense along with its contributions.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn expense_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ID of the expense to remove"] id: i64,
    ) -> Result<()> {
        let data = ctx.data();

        match expense::delete_expense(&data.database, id).await {
            Ok(removed) => {
                data.publish(removed.changes());
                ctx.say(format!(
                    "✅ Removed expense **{}** (ID {}) and {} contribution(s)",
                    removed.expense.item,
                    removed.expense.id,
                    removed.contributions.len()
                ))
                .await?;
            }
            Err(e) if e.is_user_error() => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Shows who shares an expense, optionally adding or removing one resident first.
    #[poise::command(slash_command, rename = "contributors")]
    pub async fn expense_contributors(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ID of the expense"] id: i64,
        #[description = "Resident to add to the split"]
        #[autocomplete = "autocomplete::autocomplete_resident"]
        add: Option<String>,
        #[description = "Resident to remove from the split"]
        #[autocomplete = "autocomplete::autocomplete_resident"]
        remove: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let Some(target) = expense::get_expense_by_id(db, id).await? else {
            ctx.say(format!("❌ Expense not found: {id}")).await?;
            return Ok(());
        };
        let residents = resident::get_all_residents(db).await?;

        let mut events = Vec::new();
        let edited = async {
            if let Some(nickname) = add.as_deref() {
                let resident_id = resolve_resident(&residents, nickname)?;
                let row = expense::add_contributor(db, id, resident_id).await?;
                events.push(ChangeEvent::Contribution(Change::Inserted(row)));
            }
            if let Some(nickname) = remove.as_deref() {
                let resident_id = resolve_resident(&residents, nickname)?;
                let row = expense::remove_contributor(db, id, resident_id).await?;
                events.push(ChangeEvent::Contribution(Change::Deleted(row)));
            }
            Ok::<(), Error>(())
        }
        .await;
        data.publish(events);

        match edited {
            Ok(()) => {}
            Err(e) if e.is_user_error() => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let contributions = expense::get_contributions_for_expense(db, id).await?;
        let symbol = data.currency_symbol();
        let response = if contributions.is_empty() {
            format!(
                "👥 **{}** (ID {}) has no contributors, so it affects no balances.",
                target.item, target.id
            )
        } else {
            #[allow(clippy::cast_precision_loss)] // Household sizes are tiny
            let share = target.price / contributions.len() as f64;
            format!(
                "👥 **{}** (ID {}) is split {} each between: {}",
                target.item,
                target.id,
                format_currency(symbol, share),
                nickname_list(&residents, contributions.iter().map(|c| c.resident_id)),
            )
        };

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
