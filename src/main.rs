use house_ledger::{
    bot::{self, BotData},
    config::{self, database},
    core::{
        feed::{ChangeFeed, LedgerWatcher},
        resident,
        snapshot::load_snapshot,
    },
    errors::{Error, Result},
};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenvy::dotenv().ok();

    // 3. Load the household configuration
    let app_config = Arc::new(
        config::load_default_config()
            .inspect_err(|e| error!("Failed to load configuration: {}", e))?,
    );

    // 4. Connect and make sure the tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready"))?;

    // 5. Seed residents listed in the config
    let seeded = resident::seed_residents(&db, &app_config.residents).await?;
    if !seeded.is_empty() {
        info!("Seeded {} resident(s) from config", seeded.len());
    }

    // 6. Start the ledger watcher; subscribe before loading so no write is missed
    let feed = ChangeFeed::default();
    let receiver = feed.subscribe();
    let watcher = LedgerWatcher::new(load_snapshot(&db).await?, receiver);
    let balances = watcher.balances_receiver();
    let watcher_db = database::create_connection().await?;
    tokio::spawn(async move {
        if let Err(e) = watcher.run(watcher_db).await {
            error!("Ledger watcher stopped: {}", e);
        }
    });

    // 7. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    let data = BotData::new(db, app_config, feed, balances);
    bot::run_bot(token, data).await
}
