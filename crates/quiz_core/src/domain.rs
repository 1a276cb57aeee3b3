//! crates/quiz_core/src/domain.rs
//!
//! Defines the pure, core data structures for the quiz.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type QuestionId = u32;
pub type ChoiceId = u32;

/// One answer option offered for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
    /// Reference to a pronunciation clip, passed through to the adapters untouched.
    pub audio: Option<String>,
}

/// A quiz question. Immutable once loaded and owned by the question bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub choices: Vec<Choice>,
    pub correct_choice: ChoiceId,
    pub audio: Option<String>,
}

impl Question {
    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }

    pub fn offers(&self, id: ChoiceId) -> bool {
        self.choice(id).is_some()
    }

    pub fn is_correct(&self, id: ChoiceId) -> bool {
        self.correct_choice == id
    }
}

/// The outcome of one submitted answer, kept for the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub chosen: ChoiceId,
    pub correct: bool,
}

/// One user's quiz attempt.
///
/// `position` always lies in `0..=question_ids.len()`, and reaching the end
/// sets `finished`. The session only references questions by id.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub attempt_id: Uuid,
    pub question_ids: Vec<QuestionId>,
    pub position: usize,
    pub score: u32,
    pub finished: bool,
    pub answers: Vec<AnswerRecord>,
    /// Bumped by the store on every successful save.
    pub version: u64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A fresh attempt at position 0 with no score.
    pub fn new(user_id: impl Into<String>, question_ids: Vec<QuestionId>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            attempt_id: Uuid::new_v4(),
            finished: question_ids.is_empty(),
            question_ids,
            position: 0,
            score: 0,
            answers: Vec::new(),
            version: 0,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn total(&self) -> usize {
        self.question_ids.len()
    }

    /// The id at the current position, or `None` once the attempt is over.
    pub fn current_question_id(&self) -> Option<QuestionId> {
        if self.finished {
            return None;
        }
        self.question_ids.get(self.position).copied()
    }

    /// Records an answer and moves to the next position.
    pub(crate) fn record(&mut self, question_id: QuestionId, chosen: ChoiceId, correct: bool) {
        if correct {
            self.score += 1;
        }
        self.answers.push(AnswerRecord {
            question_id,
            chosen,
            correct,
        });
        self.position += 1;
        if self.position >= self.question_ids.len() {
            self.finished = true;
        }
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> Summary {
        Summary {
            score: self.score,
            total: self.total(),
            details: self.answers.clone(),
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            attempt_id: self.attempt_id,
            position: self.position,
            total: self.total(),
            score: self.score,
            finished: self.finished,
        }
    }
}

/// The final (or running) result of an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub score: u32,
    pub total: usize,
    pub details: Vec<AnswerRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub attempt_id: Uuid,
    pub position: usize,
    pub total: usize,
    pub score: u32,
    pub finished: bool,
}
