//! services/api/src/error.rs
//!
//! Defines the process-level error type for the API service. Request-level
//! failures live in `web::error`.

use crate::adapters::question_file::LoadError;
use crate::config::ConfigError;

/// The primary error type for the `api` binary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The question catalog could not be loaded.
    #[error("Question data error: {0}")]
    Load(#[from] LoadError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
