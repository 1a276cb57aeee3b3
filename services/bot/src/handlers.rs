//! services/bot/src/handlers.rs
//!
//! Telegram update handlers. Each user action maps to one quiz API call; the
//! result is rendered back as text, audio and inline keyboards.

use std::sync::Arc;
use teloxide::{
    prelude::*,
    types::{InputFile, UserId},
    utils::command::BotCommands,
};
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::BotError;
use crate::protocol::{AnswerResponse, QuizQuestion};
use crate::render::{self, CallbackAction};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "start a new quiz.")]
    Start,
    #[command(description = "abandon the current quiz.")]
    Reset,
    #[command(description = "show this text.")]
    Help,
}

/// Builds the dispatcher tree: commands from messages, actions from button presses.
pub fn schema() -> teloxide::dispatching::UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

fn user_key(id: UserId) -> String {
    id.0.to_string()
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    client: Arc<ApiClient>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let user_id = match msg.from() {
        Some(user) => user_key(user.id),
        None => chat_id.0.to_string(),
    };

    match cmd {
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => start_quiz(&bot, chat_id, &client, &user_id).await?,
        Command::Reset => {
            let reply = match client.reset(&user_id).await {
                Ok(()) => {
                    info!("User {} reset their quiz", user_id);
                    "Quiz discarded. Send /start to play again."
                }
                Err(e) => {
                    warn!("Reset failed for user {}: {}", user_id, e);
                    render::error_text(&e)
                }
            };
            bot.send_message(chat_id, reply).await?;
        }
    }
    Ok(())
}

pub async fn callback_handler(bot: Bot, q: CallbackQuery, client: Arc<ApiClient>) -> HandlerResult {
    // Stop the button's loading spinner straight away.
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat.id) else {
        return Ok(());
    };
    let user_id = user_key(q.from.id);
    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        warn!("Ignoring unknown callback data {:?}", q.data);
        return Ok(());
    };

    match action {
        CallbackAction::Restart => start_quiz(&bot, chat_id, &client, &user_id).await?,
        CallbackAction::Next => match client.current_question(&user_id).await {
            Ok(current) => show_question(&bot, chat_id, &client, &current).await?,
            Err(e) => report(&bot, chat_id, &user_id, e).await?,
        },
        CallbackAction::Pick {
            question_id,
            choice_id,
        } => match client.answer(&user_id, question_id, choice_id).await {
            Ok(answer) => show_feedback(&bot, chat_id, &client, &answer).await?,
            Err(e) => report(&bot, chat_id, &user_id, e).await?,
        },
    }
    Ok(())
}

async fn start_quiz(
    bot: &Bot,
    chat_id: ChatId,
    client: &ApiClient,
    user_id: &str,
) -> Result<(), BotError> {
    match client.start(user_id).await {
        Ok(started) => {
            info!("User {} started quiz {}", user_id, started.attempt_id);
            bot.send_message(chat_id, "Let's start the quiz!").await?;
            show_question(bot, chat_id, client, &started.first).await
        }
        Err(e) => report(bot, chat_id, user_id, e).await,
    }
}

/// Sends the prompt (with its audio when available), each option's audio,
/// and the answer keyboard.
async fn show_question(
    bot: &Bot,
    chat_id: ChatId,
    client: &ApiClient,
    current: &QuizQuestion,
) -> Result<(), BotError> {
    let caption = render::question_caption(current);
    let prompt_audio = match current.question.audio_url.as_deref() {
        Some(url) => fetch_or_warn(client, url).await,
        None => None,
    };
    match prompt_audio {
        Some(bytes) => {
            bot.send_audio(chat_id, InputFile::memory(bytes).file_name("question.mp3"))
                .caption(caption)
                .await?;
        }
        None => {
            bot.send_message(chat_id, caption).await?;
        }
    }

    for choice in &current.question.choices {
        let Some(url) = choice.audio_url.as_deref() else {
            continue;
        };
        if let Some(bytes) = fetch_or_warn(client, url).await {
            bot.send_audio(
                chat_id,
                InputFile::memory(bytes).file_name(format!("option_{}.mp3", choice.id)),
            )
            .caption(render::option_caption(choice.id))
            .await?;
        }
    }

    bot.send_message(chat_id, "Choose your answer:")
        .reply_markup(render::choices_keyboard(current))
        .await?;
    Ok(())
}

async fn show_feedback(
    bot: &Bot,
    chat_id: ChatId,
    client: &ApiClient,
    answer: &AnswerResponse,
) -> Result<(), BotError> {
    bot.send_message(chat_id, render::feedback_text(answer)).await?;

    if answer.correct {
        if let Some(url) = answer.correct_choice.audio_url.as_deref() {
            if let Some(bytes) = fetch_or_warn(client, url).await {
                bot.send_audio(chat_id, InputFile::memory(bytes).file_name("answer.mp3"))
                    .caption(answer.correct_choice.text.clone())
                    .await?;
            }
        }
    }

    match &answer.summary {
        Some(summary) if answer.finished => {
            bot.send_message(chat_id, render::summary_text(summary))
                .reply_markup(render::restart_keyboard())
                .await?;
        }
        _ => {
            bot.send_message(chat_id, "Tap to go on to the next question:")
                .reply_markup(render::next_keyboard())
                .await?;
        }
    }
    Ok(())
}

/// Tells the user what went wrong. Telegram failures are propagated, quiz
/// failures are rendered.
async fn report(bot: &Bot, chat_id: ChatId, user_id: &str, err: BotError) -> Result<(), BotError> {
    if let BotError::Telegram(e) = err {
        return Err(BotError::Telegram(e));
    }
    warn!("Quiz action failed for user {}: {}", user_id, err);
    bot.send_message(chat_id, render::error_text(&err)).await?;
    Ok(())
}

async fn fetch_or_warn(client: &ApiClient, url: &str) -> Option<Vec<u8>> {
    match client.fetch_audio(url).await {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => None,
        Err(e) => {
            warn!("Audio {} unavailable: {}", url, e);
            None
        }
    }
}
