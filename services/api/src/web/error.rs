//! services/api/src/web/error.rs
//!
//! Maps engine and port failures onto HTTP responses. Clients always get a
//! `{ "error": <code>, "message": <text> }` body; internal details are logged
//! and replaced by a generic message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use quiz_core::{PortError, QuizError};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Port(#[from] PortError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// An answer body that does not name a valid choice.
    #[error("Invalid answer: {0}")]
    MalformedAnswer(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// The JSON body sent with every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl HttpError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            HttpError::Quiz(QuizError::NoActiveSession(_)) => {
                (StatusCode::NOT_FOUND, "no_active_session")
            }
            HttpError::Quiz(QuizError::InvalidChoice { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_choice")
            }
            HttpError::MalformedAnswer(_) => (StatusCode::BAD_REQUEST, "invalid_choice"),
            HttpError::Quiz(QuizError::InvalidQuizLength(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_quiz_length")
            }
            HttpError::Quiz(QuizError::QuestionMismatch { .. }) => {
                (StatusCode::BAD_REQUEST, "question_mismatch")
            }
            HttpError::Quiz(QuizError::QuestionNotFound(_))
            | HttpError::Port(PortError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            HttpError::Quiz(QuizError::Conflict(_)) | HttpError::Port(PortError::Conflict(_)) => {
                (StatusCode::CONFLICT, "conflict")
            }
            HttpError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            HttpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            HttpError::Quiz(QuizError::EmptyBank)
            | HttpError::Quiz(QuizError::Port(_))
            | HttpError::Port(PortError::Unexpected(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        }
    }
}

impl HttpError {
    pub fn malformed_answer(rejection: JsonRejection) -> Self {
        HttpError::MalformedAnswer(format!(
            "{}; expected {{\"choice_id\": <offered choice id>}}",
            rejection_summary(&rejection)
        ))
    }
}

/// Request bodies that fail to parse are plain bad requests.
impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::BadRequest(rejection_summary(&rejection).to_string())
    }
}

/// A short description of why a JSON body was refused. The serde detail is
/// kept out of client responses.
fn rejection_summary(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => "request body has missing or mistyped fields",
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => {
            "request body must be sent as application/json"
        }
        _ => "request body could not be read",
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {:?}", self);
            "An unexpected internal error occurred".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_errors_map_to_status_codes() {
        let cases = [
            (
                HttpError::from(QuizError::NoActiveSession("u".into())),
                StatusCode::NOT_FOUND,
                "no_active_session",
            ),
            (
                HttpError::from(QuizError::InvalidChoice {
                    question_id: 1,
                    choice: 9,
                }),
                StatusCode::BAD_REQUEST,
                "invalid_choice",
            ),
            (
                HttpError::from(QuizError::QuestionMismatch {
                    expected: 2,
                    got: 1,
                }),
                StatusCode::BAD_REQUEST,
                "question_mismatch",
            ),
            (
                HttpError::from(QuizError::Conflict("u".into())),
                StatusCode::CONFLICT,
                "conflict",
            ),
            (
                HttpError::from(PortError::NotFound("question 4".into())),
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                HttpError::from(QuizError::InvalidQuizLength(0)),
                StatusCode::BAD_REQUEST,
                "invalid_quiz_length",
            ),
            (
                HttpError::MalformedAnswer("choice_id missing".into()),
                StatusCode::BAD_REQUEST,
                "invalid_choice",
            ),
            (HttpError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
            (
                HttpError::from(PortError::Unexpected("disk on fire".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.parts(), (status, code));
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = HttpError::from(PortError::Unexpected("disk on fire".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
