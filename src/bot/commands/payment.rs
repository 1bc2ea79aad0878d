//! Payment Discord commands - recording reimbursements between residents.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{LIST_LIMIT, parse_id_list, resolve_resident},
            handlers::autocomplete,
        },
        core::{
            payment::{self, NewPayment},
            resident,
            summary::{format_currency, nickname_of},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Parent command for payments between residents.
    #[poise::command(
        slash_command,
        subcommands("payment_add", "payment_list", "payment_delete")
    )]
    pub async fn payment(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Payment command. Available subcommands:\n\
            `/payment add` - Record money handed from one resident to another\n\
            `/payment list` - List the latest payments\n\
            `/payment delete` - Remove a payment";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records a payment from one resident to another.
    ///
    /// If `paid_by` is omitted, the resident linked to your Discord account in the
    /// configuration file is used.
    #[poise::command(slash_command, rename = "add")]
    pub async fn payment_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Resident receiving the money"]
        #[autocomplete = "autocomplete::autocomplete_resident"]
        received_by: String,
        #[description = "Amount paid"] amount: f64,
        #[description = "Resident handing over the money (defaults to you)"]
        #[autocomplete = "autocomplete::autocomplete_resident"]
        paid_by: Option<String>,
        #[description = "Comma-separated expense IDs this payment settles"] for_expenses: Option<
            String,
        >,
        #[description = "Optional notes"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let author_id = ctx.author().id.to_string();
        let Some(payer) = paid_by
            .as_deref()
            .or_else(|| data.config.nickname_for_user(&author_id))
        else {
            ctx.say(
                "❌ Couldn't tell who paid. Pass `paid_by` or link your Discord account in the config.",
            )
            .await?;
            return Ok(());
        };

        let residents = resident::get_all_residents(db).await?;
        let recorded = async {
            let new_payment = NewPayment {
                paid_by: resolve_resident(&residents, payer)?,
                received_by: resolve_resident(&residents, &received_by)?,
                amount,
                notes,
                for_expenses: parse_id_list(for_expenses.as_deref())?,
            };
            payment::create_payment(db, new_payment).await
        }
        .await;

        let created = match recorded {
            Ok(created) => created,
            Err(e) if e.is_user_error() => {
                ctx.say(format!("❌ {e}")).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        data.publish(created.changes());

        let p = &created.payment;
        let mut response = format!(
            "✅ Recorded payment (ID {}): **{}** paid **{}** {}",
            p.id,
            nickname_of(&residents, p.paid_by),
            nickname_of(&residents, p.received_by),
            format_currency(data.currency_symbol(), p.amount)
        );
        if !created.links.is_empty() {
            let ids: Vec<String> = created
                .links
                .iter()
                .map(|l| format!("#{}", l.expense_id))
                .collect();
            write!(response, " for expense(s) {}", ids.join(", "))?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists the most recent payments.
    #[poise::command(slash_command, rename = "list")]
    pub async fn payment_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let payments = payment::get_all_payments(db).await?;
        if payments.is_empty() {
            ctx.say("💸 No payments recorded yet.").await?;
            return Ok(());
        }

        let residents = resident::get_all_residents(db).await?;
        let links = payment::get_all_payment_links(db).await?;
        let symbol = data.currency_symbol();

        let mut response = format!(
            "💸 **Payments** (latest {} of {})\n",
            payments.len().min(LIST_LIMIT),
            payments.len()
        );
        for p in payments.iter().rev().take(LIST_LIMIT) {
            write!(
                response,
                "`#{}` **{}** → **{}** {} ({})",
                p.id,
                nickname_of(&residents, p.paid_by),
                nickname_of(&residents, p.received_by),
                format_currency(symbol, p.amount),
                p.created_at.format("%Y-%m-%d")
            )?;
            let settled: Vec<String> = links
                .iter()
                .filter(|l| l.payment_id == p.id)
                .map(|l| format!("#{}", l.expense_id))
                .collect();
            if !settled.is_empty() {
                write!(response, " for {}", settled.join(", "))?;
            }
            if let Some(notes) = &p.notes {
                write!(response, " - {notes}")?;
            }
            response.push('\n');
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Removes a payment.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn payment_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ID of the payment to remove"] id: i64,
    ) -> Result<()> {
        let data = ctx.data();

        match payment::delete_payment(&data.database, id).await {
            Ok(removed) => {
                data.publish(removed.changes());
                ctx.say(format!(
                    "✅ Removed payment {} of {}",
                    removed.payment.id,
                    format_currency(data.currency_symbol(), removed.payment.amount)
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
}

// Re-export all commands
pub use inner::*;
