//! services/bot/src/error.rs

use crate::config::ConfigError;

/// The primary error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The quiz API could not be reached or returned an unreadable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The quiz API answered with an error status.
    #[error("Backend returned {status} ({code}): {message}")]
    Backend {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

impl BotError {
    /// The API's machine-readable error code, if the API produced this error.
    pub fn backend_code(&self) -> Option<&str> {
        match self {
            BotError::Backend { code, .. } => Some(code),
            _ => None,
        }
    }
}
