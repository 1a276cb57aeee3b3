//! services/bot/src/config.rs
//!
//! Configuration for the Telegram bot, loaded from the environment at startup.

use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// Base URL of the quiz API, without a trailing slash.
    pub api_base: String,
    pub api_token: Option<String>,
    /// Questions per quiz; `None` leaves the choice to the API.
    pub n_questions: Option<usize>,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("BOT_TOKEN".to_string()))?;

        let api_base = lookup("API_BASE")
            .unwrap_or_else(|| "http://127.0.0.1:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "API_BASE".to_string(),
                format!("'{}' is not an http(s) URL", api_base),
            ));
        }

        let api_token = lookup("API_TOKEN").filter(|t| !t.trim().is_empty());

        let n_questions = match lookup("N_QUESTIONS").filter(|v| !v.trim().is_empty()) {
            None => None,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "N_QUESTIONS".to_string(),
                        format!("'{}' is not a positive number", raw),
                    ))
                }
            },
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bot_token,
            api_base,
            api_token,
            n_questions,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_required() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref k) if k == "BOT_TOKEN"));
    }

    #[test]
    fn trims_trailing_slash_from_api_base() {
        let config = Config::from_lookup(|key| match key {
            "BOT_TOKEN" => Some("123:abc".to_string()),
            "API_BASE" => Some("http://quiz.local:8000/".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_base, "http://quiz.local:8000");
        assert!(config.api_token.is_none());
    }

    fn with_question_count(n: &str) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| match key {
            "BOT_TOKEN" => Some("123:abc".to_string()),
            "N_QUESTIONS" => Some(n.to_string()),
            _ => None,
        })
    }

    #[test]
    fn reads_question_count() {
        assert_eq!(with_question_count("5").unwrap().n_questions, Some(5));
        assert_eq!(with_question_count("").unwrap().n_questions, None);
        for bad in ["0", "-3", "ten"] {
            let err = with_question_count(bad).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "N_QUESTIONS"));
        }
    }

    #[test]
    fn rejects_non_http_base() {
        let err = Config::from_lookup(|key| match key {
            "BOT_TOKEN" => Some("123:abc".to_string()),
            "API_BASE" => Some("quiz.local".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "API_BASE"));
    }
}
