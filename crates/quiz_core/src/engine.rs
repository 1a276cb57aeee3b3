//! crates/quiz_core/src/engine.rs
//!
//! The quiz state machine. A user is NotStarted (no session), InProgress
//! (session not finished) or Completed (session finished). The engine reads the
//! question bank, mutates sessions through the store and never keeps state of
//! its own, so one engine can serve any number of concurrent users.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Choice, ChoiceId, Progress, Question, QuestionId, Session, Summary};
use crate::ports::{PortError, QuestionBank, SessionStore, Shuffler};

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("No active quiz for user {0}")]
    NoActiveSession(String),
    #[error("Choice {choice} is not offered for question {question_id}")]
    InvalidChoice {
        question_id: QuestionId,
        choice: ChoiceId,
    },
    #[error("Question {got} is not the current question (expected {expected})")]
    QuestionMismatch {
        expected: QuestionId,
        got: QuestionId,
    },
    #[error("Question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("Session for user {0} was modified concurrently")]
    Conflict(String),
    #[error("The question bank is empty")]
    EmptyBank,
    #[error("A quiz needs at least one question, {0} requested")]
    InvalidQuizLength(usize),
    #[error("Service Port Error: {0}")]
    Port(PortError),
}

pub type QuizResult<T> = Result<T, QuizError>;

//=========================================================================================
// Engine Outputs
//=========================================================================================

/// A question together with where it sits in the attempt.
#[derive(Debug, Clone)]
pub struct CurrentQuestion {
    pub index: usize,
    pub total: usize,
    pub question: Arc<Question>,
}

#[derive(Debug, Clone)]
pub struct StartedQuiz {
    pub attempt_id: Uuid,
    pub first: CurrentQuestion,
}

#[derive(Debug, Clone)]
pub enum NextStep {
    Question(CurrentQuestion),
    Finished(Summary),
}

#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub score: u32,
    pub correct_choice: Choice,
    pub next: NextStep,
}

impl AnswerOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self.next, NextStep::Finished(_))
    }
}

//=========================================================================================
// The Engine
//=========================================================================================

#[derive(Clone)]
pub struct QuizEngine {
    questions: Arc<dyn QuestionBank>,
    sessions: Arc<dyn SessionStore>,
    shuffler: Arc<dyn Shuffler>,
    quiz_length: Option<usize>,
}

impl QuizEngine {
    pub fn new(
        questions: Arc<dyn QuestionBank>,
        sessions: Arc<dyn SessionStore>,
        shuffler: Arc<dyn Shuffler>,
    ) -> Self {
        Self {
            questions,
            sessions,
            shuffler,
            quiz_length: None,
        }
    }

    /// Limits every attempt to the first `length` questions of the shuffle.
    /// A length of zero keeps the whole catalog.
    pub fn with_quiz_length(mut self, length: usize) -> Self {
        self.quiz_length = (length > 0).then_some(length);
        self
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Starts a new attempt for the user, silently replacing any previous one.
    pub async fn start(&self, user_id: &str) -> QuizResult<StartedQuiz> {
        self.start_with_length(user_id, None).await
    }

    /// Like `start`, asking for `length` questions instead of the engine
    /// default. Lengths above the catalog size are clamped to it.
    pub async fn start_with_length(
        &self,
        user_id: &str,
        length: Option<usize>,
    ) -> QuizResult<StartedQuiz> {
        if length == Some(0) {
            return Err(QuizError::InvalidQuizLength(0));
        }
        let mut ids = self.questions.all_ids().await.map_err(QuizError::Port)?;
        if ids.is_empty() {
            return Err(QuizError::EmptyBank);
        }
        self.shuffler.shuffle(&mut ids);
        if let Some(length) = length.or(self.quiz_length) {
            ids.truncate(length);
        }

        let session = self
            .sessions
            .create(user_id, ids)
            .await
            .map_err(QuizError::Port)?;
        info!(
            "Started quiz {} for user {} with {} questions",
            session.attempt_id,
            user_id,
            session.total()
        );

        let first = self.question_at(&session).await?;
        Ok(StartedQuiz {
            attempt_id: session.attempt_id,
            first,
        })
    }

    /// Returns the question the user is expected to answer next.
    pub async fn current_question(&self, user_id: &str) -> QuizResult<CurrentQuestion> {
        let session = self.active_session(user_id).await?;
        self.question_at(&session).await
    }

    /// Answers the current question, whatever it is.
    pub async fn answer(&self, user_id: &str, choice: ChoiceId) -> QuizResult<AnswerOutcome> {
        self.submit(user_id, None, choice).await
    }

    /// Answers `question_id`, rejecting the submission if the user has
    /// already moved past it.
    pub async fn answer_question(
        &self,
        user_id: &str,
        question_id: QuestionId,
        choice: ChoiceId,
    ) -> QuizResult<AnswerOutcome> {
        self.submit(user_id, Some(question_id), choice).await
    }

    /// Abandons the user's attempt, whatever its state.
    pub async fn reset(&self, user_id: &str) -> QuizResult<()> {
        self.sessions
            .delete(user_id)
            .await
            .map_err(QuizError::Port)?;
        info!("Reset quiz for user {}", user_id);
        Ok(())
    }

    /// Score so far, available both during and after an attempt.
    pub async fn summary(&self, user_id: &str) -> QuizResult<Summary> {
        let session = self.load_session(user_id).await?;
        Ok(session.summary())
    }

    pub async fn progress(&self, user_id: &str) -> QuizResult<Progress> {
        let session = self.load_session(user_id).await?;
        Ok(session.progress())
    }

    //=====================================================================================
    // Internals
    //=====================================================================================

    async fn submit(
        &self,
        user_id: &str,
        expected: Option<QuestionId>,
        choice: ChoiceId,
    ) -> QuizResult<AnswerOutcome> {
        let mut session = self.active_session(user_id).await?;
        let current_id = session
            .current_question_id()
            .ok_or_else(|| QuizError::NoActiveSession(user_id.to_string()))?;

        if let Some(got) = expected {
            if got != current_id {
                warn!(
                    "User {} answered question {} but {} is current",
                    user_id, got, current_id
                );
                return Err(QuizError::QuestionMismatch {
                    expected: current_id,
                    got,
                });
            }
        }

        let question = self.lookup(current_id).await?;
        if !question.offers(choice) {
            warn!(
                "User {} picked choice {} which question {} does not offer",
                user_id, choice, current_id
            );
            return Err(QuizError::InvalidChoice {
                question_id: current_id,
                choice,
            });
        }
        let correct_choice = question
            .choice(question.correct_choice)
            .cloned()
            .ok_or_else(|| {
                QuizError::Port(PortError::Unexpected(format!(
                    "question {} has no choice {}",
                    question.id, question.correct_choice
                )))
            })?;

        let correct = question.is_correct(choice);
        session.record(current_id, choice, correct);
        let session = self
            .sessions
            .save(session)
            .await
            .map_err(|e| session_error(user_id, e))?;
        debug!(
            "User {} answered question {} with {} (correct: {}), score {}",
            user_id, current_id, choice, correct, session.score
        );

        let next = if session.finished {
            info!(
                "User {} finished quiz {} with {}/{}",
                user_id,
                session.attempt_id,
                session.score,
                session.total()
            );
            NextStep::Finished(session.summary())
        } else {
            NextStep::Question(self.question_at(&session).await?)
        };

        Ok(AnswerOutcome {
            correct,
            score: session.score,
            correct_choice,
            next,
        })
    }

    async fn load_session(&self, user_id: &str) -> QuizResult<Session> {
        self.sessions
            .get(user_id)
            .await
            .map_err(|e| session_error(user_id, e))
    }

    /// Loads a session that still accepts answers.
    async fn active_session(&self, user_id: &str) -> QuizResult<Session> {
        let session = self.load_session(user_id).await?;
        if session.finished {
            return Err(QuizError::NoActiveSession(user_id.to_string()));
        }
        Ok(session)
    }

    async fn question_at(&self, session: &Session) -> QuizResult<CurrentQuestion> {
        let id = session
            .current_question_id()
            .ok_or_else(|| QuizError::NoActiveSession(session.user_id.clone()))?;
        Ok(CurrentQuestion {
            index: session.position,
            total: session.total(),
            question: self.lookup(id).await?,
        })
    }

    async fn lookup(&self, id: QuestionId) -> QuizResult<Arc<Question>> {
        self.questions.get(id).await.map_err(|e| match e {
            PortError::NotFound(_) => QuizError::QuestionNotFound(id),
            other => QuizError::Port(other),
        })
    }
}

fn session_error(user_id: &str, e: PortError) -> QuizError {
    match e {
        PortError::NotFound(_) => QuizError::NoActiveSession(user_id.to_string()),
        PortError::Conflict(_) => QuizError::Conflict(user_id.to_string()),
        other => QuizError::Port(other),
    }
}
