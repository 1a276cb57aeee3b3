pub mod error;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_api_token;
pub use rest::{
    answer_handler, current_question_handler, get_question_handler, health_handler,
    list_questions_handler, reset_quiz_handler, start_quiz_handler, summary_handler,
};

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::web::state::AppState;

/// Builds the complete HTTP router. Everything except `/health` sits behind
/// the optional API token check.
pub fn router(app_state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/questions", get(list_questions_handler))
        .route("/questions/{id}", get(get_question_handler))
        .route("/quiz/start", post(start_quiz_handler))
        .route("/quiz/{user_id}", delete(reset_quiz_handler))
        .route("/quiz/{user_id}/question", get(current_question_handler))
        .route("/quiz/{user_id}/answer", post(answer_handler))
        .route("/quiz/{user_id}/summary", get(summary_handler))
        .nest_service("/static", ServeDir::new(&app_state.config.audio_dir))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_api_token,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
