//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every request handler.

use crate::config::Config;
use quiz_core::ports::QuestionBank;
use quiz_core::QuizEngine;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: QuizEngine,
    pub questions: Arc<dyn QuestionBank>,
    pub config: Arc<Config>,
}
