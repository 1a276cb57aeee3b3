//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{InMemorySessionStore, JsonQuestionBank, SeededShuffler, ThreadRngShuffler},
    config::Config,
    error::ApiError,
    housekeeping::spawn_session_purger,
    web::{self, rest::ApiDoc, state::AppState},
};
use axum::Router;
use quiz_core::{ports::Shuffler, QuizEngine};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Question Catalog ---
    info!("Loading questions from {}", config.questions_path.display());
    let questions = Arc::new(JsonQuestionBank::load(&config.questions_path)?);
    info!("Loaded {} questions.", questions.len());

    // --- 3. Initialize the Session Store & Engine ---
    let sessions = Arc::new(InMemorySessionStore::new());
    let shuffler: Arc<dyn Shuffler> = match config.shuffle_seed {
        Some(seed) => {
            warn!("QUIZ_SEED is set, question order is reproducible");
            Arc::new(SeededShuffler::new(seed))
        }
        None => Arc::new(ThreadRngShuffler),
    };
    let mut engine = QuizEngine::new(questions.clone(), sessions.clone(), shuffler);
    if let Some(length) = config.quiz_length {
        engine = engine.with_quiz_length(length);
    }
    if config.api_token.is_none() {
        warn!("API_TOKEN is not set, the API accepts unauthenticated requests");
    }

    // --- 4. Start Background Housekeeping ---
    let shutdown = CancellationToken::new();
    if let Some(ttl) = config.session_ttl {
        spawn_session_purger(sessions, ttl, shutdown.clone());
    }

    // --- 5. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState {
        engine,
        questions,
        config: config.clone(),
    });
    let app = Router::new()
        .merge(web::router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested.");
    token.cancel();
}
