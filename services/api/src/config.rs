//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono::Utc;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

use crate::housekeeping::expiry_cutoff;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub questions_path: PathBuf,
    pub audio_dir: PathBuf,
    /// Shared secret expected as a bearer token on every request, if set.
    pub api_token: Option<String>,
    /// Idle sessions older than this are purged. `None` keeps them forever.
    pub session_ttl: Option<Duration>,
    pub quiz_length: Option<usize>,
    pub shuffle_seed: Option<u64>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Data Locations ---
        let questions_path = lookup("QUESTIONS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/questions.json"));
        let audio_dir = lookup("AUDIO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/audio"));

        let api_token = lookup("API_TOKEN").filter(|t| !t.trim().is_empty());

        // --- Quiz Settings ---
        let ttl_secs: u64 = parse_var(&lookup, "SESSION_TTL_SECS")?.unwrap_or(86_400);
        let session_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));
        if let Some(ttl) = session_ttl {
            if expiry_cutoff(Utc::now(), ttl).is_none() {
                return Err(ConfigError::InvalidValue(
                    "SESSION_TTL_SECS".to_string(),
                    format!("{} seconds is out of range", ttl_secs),
                ));
            }
        }

        let quiz_length: Option<usize> = parse_var(&lookup, "QUIZ_LENGTH")?;
        if quiz_length == Some(0) {
            return Err(ConfigError::InvalidValue(
                "QUIZ_LENGTH".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let shuffle_seed = parse_var(&lookup, "QUIZ_SEED")?;

        Ok(Self {
            bind_address,
            log_level,
            questions_path,
            audio_dir,
            api_token,
            session_ttl,
            quiz_length,
            shuffle_seed,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
    }
}
