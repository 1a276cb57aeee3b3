//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    error::{ErrorBody, HttpError},
    extract::JsonBody,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use quiz_core::{
    AnswerOutcome, AnswerRecord, Choice, ChoiceId, CurrentQuestion, NextStep, Question,
    QuestionId, Summary,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        list_questions_handler,
        get_question_handler,
        start_quiz_handler,
        current_question_handler,
        answer_handler,
        summary_handler,
        reset_quiz_handler,
    ),
    components(
        schemas(
            ChoiceView,
            QuestionView,
            QuizQuestionResponse,
            StartQuizRequest,
            StartQuizResponse,
            AnswerRequest,
            AnswerResponse,
            AnswerDetail,
            SummaryResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "WordQuiz API", description = "Question catalog and per-user quiz sessions.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChoiceView {
    pub id: ChoiceId,
    pub text: String,
    pub audio_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuestionView {
    pub question_id: QuestionId,
    pub prompt: String,
    pub audio_url: Option<String>,
    pub choices: Vec<ChoiceView>,
}

/// A question as part of a running quiz.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuizQuestionResponse {
    /// Zero-based position within the attempt.
    pub index: usize,
    pub total: usize,
    pub question: QuestionView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartQuizRequest {
    pub user_id: String,
    /// How many questions to ask. Defaults to the server setting and is
    /// capped at the catalog size.
    #[serde(default)]
    pub n_questions: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartQuizResponse {
    pub attempt_id: Uuid,
    pub total: usize,
    pub first: QuizQuestionResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnswerRequest {
    pub choice_id: ChoiceId,
    /// When present, the answer is rejected unless this is still the current question.
    #[serde(default)]
    pub question_id: Option<QuestionId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnswerDetail {
    pub question_id: QuestionId,
    pub chosen: ChoiceId,
    pub correct: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub score: u32,
    pub total: usize,
    pub finished: bool,
    pub details: Vec<AnswerDetail>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnswerResponse {
    pub correct: bool,
    pub score: u32,
    pub finished: bool,
    pub correct_choice: ChoiceView,
    /// The next question, absent once the quiz is finished.
    pub next: Option<QuizQuestionResponse>,
    /// The final result, present once the quiz is finished.
    pub summary: Option<SummaryResponse>,
}

//=========================================================================================
// Domain -> View Conversions
//=========================================================================================

/// Turns an asset reference into a URL under `/static`. References of the
/// form `audio/<file>` live in the audio directory; anything else is passed
/// through untouched.
pub fn audio_url(reference: Option<&str>) -> Option<String> {
    let reference = reference?;
    match reference.strip_prefix("audio/") {
        Some(file) => Some(format!("/static/{}", file)),
        None => Some(reference.to_string()),
    }
}

impl From<&Choice> for ChoiceView {
    fn from(choice: &Choice) -> Self {
        Self {
            id: choice.id,
            text: choice.text.clone(),
            audio_url: audio_url(choice.audio.as_deref()),
        }
    }
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.id,
            prompt: question.prompt.clone(),
            audio_url: audio_url(question.audio.as_deref()),
            choices: question.choices.iter().map(ChoiceView::from).collect(),
        }
    }
}

impl From<CurrentQuestion> for QuizQuestionResponse {
    fn from(current: CurrentQuestion) -> Self {
        Self {
            index: current.index,
            total: current.total,
            question: QuestionView::from(current.question.as_ref()),
        }
    }
}

impl From<&AnswerRecord> for AnswerDetail {
    fn from(record: &AnswerRecord) -> Self {
        Self {
            question_id: record.question_id,
            chosen: record.chosen,
            correct: record.correct,
        }
    }
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            score: summary.score,
            total: summary.total,
            finished: summary.details.len() == summary.total,
            details: summary.details.iter().map(AnswerDetail::from).collect(),
        }
    }
}

impl From<AnswerOutcome> for AnswerResponse {
    fn from(outcome: AnswerOutcome) -> Self {
        let (next, summary) = match outcome.next {
            NextStep::Question(current) => (Some(current.into()), None),
            NextStep::Finished(summary) => (None, Some(summary.into())),
        };
        Self {
            correct: outcome.correct,
            score: outcome.score,
            finished: summary.is_some(),
            correct_choice: ChoiceView::from(&outcome.correct_choice),
            next,
            summary,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// `start` is a path segment of its own (`POST /quiz/start`), so a user by
/// that name could never reach `DELETE /quiz/{user_id}`.
const RESERVED_USER_IDS: [&str; 1] = ["start"];

/// User ids are used verbatim as path segments by every other quiz route, so
/// they are rejected rather than normalised.
fn validate_user_id(user_id: &str) -> Result<&str, HttpError> {
    if user_id.trim().is_empty() {
        return Err(HttpError::BadRequest("user_id must not be empty".to_string()));
    }
    if user_id.trim() != user_id {
        return Err(HttpError::BadRequest(
            "user_id must not start or end with whitespace".to_string(),
        ));
    }
    if RESERVED_USER_IDS.contains(&user_id) {
        return Err(HttpError::BadRequest(format!(
            "'{}' is reserved and cannot be used as a user_id",
            user_id
        )));
    }
    Ok(user_id)
}

/// Liveness probe. Never requires a token.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// List the whole question catalog in its stable order.
#[utoipa::path(
    get,
    path = "/questions",
    responses(
        (status = 200, description = "All questions", body = [QuestionView]),
        (status = 401, description = "Missing or wrong API token", body = ErrorBody)
    )
)]
pub async fn list_questions_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<QuestionView>>, HttpError> {
    let ids = app_state.questions.all_ids().await?;
    let mut views = Vec::with_capacity(ids.len());
    for id in ids {
        let question = app_state.questions.get(id).await?;
        views.push(QuestionView::from(question.as_ref()));
    }
    Ok(Json(views))
}

/// Fetch a single question by id.
#[utoipa::path(
    get,
    path = "/questions/{id}",
    params(("id" = u32, Path, description = "Question id")),
    responses(
        (status = 200, description = "The question", body = QuestionView),
        (status = 404, description = "Unknown question", body = ErrorBody)
    )
)]
pub async fn get_question_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<QuestionId>,
) -> Result<Json<QuestionView>, HttpError> {
    let question = app_state.questions.get(id).await?;
    Ok(Json(QuestionView::from(question.as_ref())))
}

/// Start a new quiz for a user, replacing any attempt already in progress.
#[utoipa::path(
    post,
    path = "/quiz/start",
    request_body = StartQuizRequest,
    responses(
        (status = 201, description = "Quiz started", body = StartQuizResponse),
        (status = 400, description = "Malformed body, unusable user id or zero questions requested", body = ErrorBody)
    )
)]
pub async fn start_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<StartQuizRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = validate_user_id(&req.user_id)?;
    let started = app_state
        .engine
        .start_with_length(user_id, req.n_questions)
        .await?;
    let response = StartQuizResponse {
        attempt_id: started.attempt_id,
        total: started.first.total,
        first: started.first.into(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// The question the user should answer next.
#[utoipa::path(
    get,
    path = "/quiz/{user_id}/question",
    params(("user_id" = String, Path, description = "The user taking the quiz")),
    responses(
        (status = 200, description = "Current question", body = QuizQuestionResponse),
        (status = 404, description = "No quiz in progress", body = ErrorBody)
    )
)]
pub async fn current_question_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<QuizQuestionResponse>, HttpError> {
    let current = app_state.engine.current_question(&user_id).await?;
    Ok(Json(current.into()))
}

/// Submit an answer to the current question.
#[utoipa::path(
    post,
    path = "/quiz/{user_id}/answer",
    params(("user_id" = String, Path, description = "The user taking the quiz")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = AnswerResponse),
        (status = 400, description = "Choice not offered, malformed answer or question already answered", body = ErrorBody),
        (status = 404, description = "No quiz in progress", body = ErrorBody),
        (status = 409, description = "Session changed concurrently, retry", body = ErrorBody)
    )
)]
pub async fn answer_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, HttpError> {
    let Json(req) = payload.map_err(HttpError::malformed_answer)?;
    let outcome = match req.question_id {
        Some(question_id) => {
            app_state
                .engine
                .answer_question(&user_id, question_id, req.choice_id)
                .await?
        }
        None => app_state.engine.answer(&user_id, req.choice_id).await?,
    };
    Ok(Json(outcome.into()))
}

/// Score and per-question results of the user's latest attempt.
#[utoipa::path(
    get,
    path = "/quiz/{user_id}/summary",
    params(("user_id" = String, Path, description = "The user taking the quiz")),
    responses(
        (status = 200, description = "Summary", body = SummaryResponse),
        (status = 404, description = "No quiz for this user", body = ErrorBody)
    )
)]
pub async fn summary_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<SummaryResponse>, HttpError> {
    let summary = app_state.engine.summary(&user_id).await?;
    Ok(Json(summary.into()))
}

/// Abandon the user's quiz.
#[utoipa::path(
    delete,
    path = "/quiz/{user_id}",
    params(("user_id" = String, Path, description = "The user taking the quiz")),
    responses((status = 204, description = "Quiz discarded"))
)]
pub async fn reset_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, HttpError> {
    app_state.engine.reset(&user_id).await?;
    info!("Quiz for user {} discarded over HTTP", user_id);
    Ok(StatusCode::NO_CONTENT)
}
