//! crates/quiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) the quiz engine depends on.
//! These traits form the boundary of the hexagonal architecture: storage and
//! randomness live in adapters, so a different backend can be plugged in
//! without touching the engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::{Question, QuestionId, Session};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The stored item changed since it was read.
    #[error("Concurrent modification: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read-only catalog of questions.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Looks up a single question.
    async fn get(&self, id: QuestionId) -> PortResult<Arc<Question>>;

    /// All question ids, in a stable order.
    async fn all_ids(&self) -> PortResult<Vec<QuestionId>>;
}

/// Per-user quiz progress.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Starts a fresh session for `user_id`, replacing any previous one.
    async fn create(&self, user_id: &str, question_ids: Vec<QuestionId>) -> PortResult<Session>;

    async fn get(&self, user_id: &str) -> PortResult<Session>;

    /// Persists a mutated session.
    ///
    /// This is a compare-and-swap on `session.version`: it fails with
    /// `PortError::Conflict` when the stored copy has moved on, and with
    /// `PortError::NotFound` when the session was deleted in the meantime.
    /// Returns the stored session with its new version.
    async fn save(&self, session: Session) -> PortResult<Session>;

    async fn delete(&self, user_id: &str) -> PortResult<()>;

    /// Drops sessions untouched since `cutoff`, returning how many were removed.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> PortResult<usize>;
}

/// Source of randomness for question order.
///
/// Implementations must produce every permutation with equal probability.
pub trait Shuffler: Send + Sync {
    fn shuffle(&self, ids: &mut [QuestionId]);
}
