//! services/bot/src/protocol.rs
//!
//! The JSON payloads exchanged with the quiz API, as seen from the bot.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Requests Sent FROM the Bot TO the API
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct StartQuizRequest<'a> {
    pub user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_questions: Option<usize>,
}

#[derive(Serialize, Debug)]
pub struct AnswerRequest {
    pub question_id: u32,
    pub choice_id: u32,
}

//=========================================================================================
// Responses Sent FROM the API TO the Bot
//=========================================================================================

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChoiceView {
    pub id: u32,
    pub text: String,
    pub audio_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub question_id: u32,
    pub prompt: String,
    pub audio_url: Option<String>,
    pub choices: Vec<ChoiceView>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub index: usize,
    pub total: usize,
    pub question: QuestionView,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StartQuizResponse {
    pub attempt_id: Uuid,
    pub total: usize,
    pub first: QuizQuestion,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub score: u32,
    pub total: usize,
    pub finished: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AnswerResponse {
    pub correct: bool,
    pub score: u32,
    pub finished: bool,
    pub correct_choice: ChoiceView,
    pub next: Option<QuizQuestion>,
    pub summary: Option<Summary>,
}

/// Body of every non-2xx API response.
#[derive(Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
