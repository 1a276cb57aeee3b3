//! services/bot/src/bin/bot.rs

use bot_lib::{client::ApiClient, config::Config, error::BotError, handlers};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), BotError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting bot...");

    // --- 2. Build the API Client ---
    let client = Arc::new(ApiClient::from_config(&config)?);
    info!("Using quiz API at {}", config.api_base);

    // --- 3. Run the Dispatcher ---
    let bot = Bot::new(config.bot_token.clone());
    Dispatcher::builder(bot, handlers::schema())
        .dependencies(dptree::deps![client])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped.");
    Ok(())
}
