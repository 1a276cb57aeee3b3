//! services/bot/src/render.rs
//!
//! Turns API payloads into Telegram text and keyboards, and parses the
//! callback data our buttons carry. Nothing here talks to the network.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::error::BotError;
use crate::protocol::{AnswerResponse, QuizQuestion, Summary};

const BUTTONS_PER_ROW: usize = 2;

/// What a pressed inline button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// `pick:<question_id>:<choice_id>`
    Pick { question_id: u32, choice_id: u32 },
    Next,
    Restart,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "next" => return Some(Self::Next),
            "restart" => return Some(Self::Restart),
            _ => {}
        }
        let rest = data.strip_prefix("pick:")?;
        let (question, choice) = rest.split_once(':')?;
        Some(Self::Pick {
            question_id: question.parse().ok()?,
            choice_id: choice.parse().ok()?,
        })
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Pick {
                question_id,
                choice_id,
            } => format!("pick:{}:{}", question_id, choice_id),
            Self::Next => "next".to_string(),
            Self::Restart => "restart".to_string(),
        }
    }
}

pub fn question_caption(current: &QuizQuestion) -> String {
    format!(
        "Question {}/{}\n{}",
        current.index + 1,
        current.total,
        current.question.prompt
    )
}

pub fn option_caption(choice_id: u32) -> String {
    format!("Option {}", choice_id)
}

/// One button per choice, laid out two to a row.
pub fn choices_keyboard(current: &QuizQuestion) -> InlineKeyboardMarkup {
    let question_id = current.question.question_id;
    let buttons: Vec<InlineKeyboardButton> = current
        .question
        .choices
        .iter()
        .map(|choice| {
            let action = CallbackAction::Pick {
                question_id,
                choice_id: choice.id,
            };
            InlineKeyboardButton::callback(
                format!("{}. {}", choice.id, choice.text),
                action.encode(),
            )
        })
        .collect();
    InlineKeyboardMarkup::new(buttons.chunks(BUTTONS_PER_ROW).map(|row| row.to_vec()))
}

pub fn next_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::callback(
        "Next question",
        CallbackAction::Next.encode(),
    )]])
}

pub fn restart_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::callback(
        "Play again",
        CallbackAction::Restart.encode(),
    )]])
}

pub fn feedback_text(answer: &AnswerResponse) -> String {
    if answer.correct {
        "Correct!".to_string()
    } else {
        format!(
            "Wrong. The correct answer is: {}",
            answer.correct_choice.text
        )
    }
}

pub fn summary_text(summary: &Summary) -> String {
    format!(
        "Quiz finished!\nCorrect answers: {} of {}",
        summary.score, summary.total
    )
}

/// The message shown to the user when a quiz action fails.
pub fn error_text(err: &BotError) -> &'static str {
    match err.backend_code() {
        Some("no_active_session") => "No quiz in progress. Send /start to begin.",
        Some("invalid_choice") => "That option is not available. Please use the buttons.",
        Some("question_mismatch") => {
            "That question was already answered. Tap \"Next question\" to continue."
        }
        Some("conflict") => "Your previous answer is still being processed. Please try again.",
        Some(_) => "The quiz server could not handle that. Send /start to begin a new quiz.",
        None => match err {
            BotError::Http(_) => "Could not reach the quiz server. Please try again later.",
            _ => "Something went wrong. Please try again later.",
        },
    }
}
