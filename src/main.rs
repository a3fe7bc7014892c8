#![allow(clippy::result_large_err)]

use tablefellow::bot::{run_bot, BotData};
use tablefellow::config::{database, AppConfig};
use tablefellow::core::bank;
use tablefellow::errors::{Error, Result};

use dotenvy::dotenv;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing first, so everything after is observable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // .env is optional; env vars can be set externally
    dotenv().ok();

    let config = AppConfig::from_env()?;
    info!("Configuration loaded");

    let db = database::connect(&config.database_url).await?;
    database::create_tables(&db).await?;
    info!("Database initialized");

    // Bank list refresh: once now, then daily
    bank::spawn_refresher(config.clone());

    // The token is read directly before use, never stored in shared state
    let token = env::var("DISCORD_BOT_TOKEN").map_err(Error::EnvVar)?;

    let data = BotData {
        database: db,
        uploads: tablefellow::uploads::UploadStore::new(config.upload_dir.clone()),
        http: reqwest::Client::new(),
        config,
    };
    run_bot(token, data).await.map_err(Error::from)?;

    Ok(())
}
