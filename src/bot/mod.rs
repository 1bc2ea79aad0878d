//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the household ledger,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (residents, expenses, payments, summary, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::AppConfig,
    core::{feed::ChangeFeed, ledger::BalanceMatrix, snapshot::ChangeEvent},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the change feed that writes are
/// published on, and the live balance matrix kept by the ledger watcher.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Feed every successful write is published on
    pub feed: ChangeFeed,
    /// Latest balances computed by the ledger watcher
    pub balances: watch::Receiver<BalanceMatrix>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(
        database: DatabaseConnection,
        config: Arc<AppConfig>,
        feed: ChangeFeed,
        balances: watch::Receiver<BalanceMatrix>,
    ) -> Self {
        Self {
            database,
            config,
            feed,
            balances,
        }
    }

    /// Publishes the changes caused by a write.
    pub fn publish<I>(&self, events: I)
    where
        I: IntoIterator<Item = ChangeEvent>,
    {
        self.feed.publish_all(events);
    }

    /// Symbol used when printing amounts.
    #[must_use]
    pub fn currency_symbol(&self) -> &str {
        &self.config.currency.symbol
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Registers the slash commands globally and runs the Discord client until it stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::summary(),
                commands::resident(),
                commands::expense(),
                commands::payment(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        feed::LedgerWatcher,
        snapshot::{Snapshot, load_snapshot},
    };
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_published_write_reaches_live_balances() -> Result<()> {
        let (db, [alice, bob, _]) = setup_household().await?;
        let feed = ChangeFeed::default();
        let mut watcher = LedgerWatcher::new(load_snapshot(&db).await?, feed.subscribe());
        let data = BotData::new(
            setup_test_db().await?,
            Arc::new(AppConfig::default()),
            feed,
            watcher.balances_receiver(),
        );

        let created = create_test_payment(&db, bob.id, alice.id, 12.5).await?;
        data.publish(created.changes());
        assert!(watcher.next(&db).await?);

        assert_eq!(data.balances.borrow().get(alice.id, bob.id), Some(12.5));
        assert_eq!(data.currency_symbol(), "₱");
        assert_ne!(watcher.snapshot(), &Snapshot::default());

        Ok(())
    }
}
