use std::path::Path;
use std::sync::Arc;

use api_lib::{
    adapters::{InMemorySessionStore, JsonQuestionBank},
    config::Config,
    web::{self, state::AppState},
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use quiz_core::{ports::Shuffler, QuestionId, QuizEngine};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

const CATALOG: &str = r#"{ "questions": [
    { "id": 1, "prompt": "France", "audio": "audio/q1.mp3", "correct": 1,
      "choices": [ { "id": 1, "text": "French", "audio": "audio/q1_answer.mp3" },
                   { "id": 2, "text": "German" }, { "id": 3, "text": "Spanish" }, { "id": 4, "text": "Dutch" } ] },
    { "id": 2, "prompt": "Germany", "correct": 2,
      "choices": [ { "id": 1, "text": "French" }, { "id": 2, "text": "German" },
                   { "id": 3, "text": "Spanish" }, { "id": 4, "text": "Dutch" } ] },
    { "id": 3, "prompt": "Spain", "correct": 3,
      "choices": [ { "id": 1, "text": "French" }, { "id": 2, "text": "German" },
                   { "id": 3, "text": "Spanish" }, { "id": 4, "text": "Dutch" } ] }
] }"#;

/// Keeps catalog order so the walkthrough is predictable.
struct KeepOrder;

impl Shuffler for KeepOrder {
    fn shuffle(&self, _ids: &mut [QuestionId]) {}
}

fn build_app(api_token: Option<&str>, audio_dir: Option<&Path>) -> Router {
    let token = api_token.map(str::to_string);
    let audio = audio_dir.map(|p| p.display().to_string());
    let config = Config::from_lookup(|key| match key {
        "API_TOKEN" => token.clone(),
        "AUDIO_DIR" => audio.clone(),
        _ => None,
    })
    .expect("config");

    let questions = Arc::new(JsonQuestionBank::from_json(CATALOG).expect("catalog"));
    let sessions = Arc::new(InMemorySessionStore::new());
    let engine = QuizEngine::new(questions.clone(), sessions, Arc::new(KeepOrder));
    web::router(Arc::new(AppState {
        engine,
        questions,
        config: Arc::new(config),
    }))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, payload: JsonValue) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn full_quiz_walkthrough() {
    let app = build_app(None, None);

    let (status, started) = send(&app, post("/quiz/start", json!({ "user_id": "42" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["total"], 3);
    assert_eq!(started["first"]["index"], 0);
    assert_eq!(started["first"]["question"]["question_id"], 1);
    assert_eq!(started["first"]["question"]["audio_url"], "/static/q1.mp3");
    assert_eq!(started["first"]["question"]["choices"].as_array().unwrap().len(), 4);

    // Asking twice does not move the quiz forward.
    let (_, once) = send(&app, get("/quiz/42/question")).await;
    let (status, twice) = send(&app, get("/quiz/42/question")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(once, twice);
    assert_eq!(twice["question"]["question_id"], 1);

    let (status, first) = send(&app, post("/quiz/42/answer", json!({ "choice_id": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["correct"], true);
    assert_eq!(first["score"], 1);
    assert_eq!(first["finished"], false);
    assert_eq!(first["correct_choice"]["audio_url"], "/static/q1_answer.mp3");
    assert_eq!(first["next"]["question"]["question_id"], 2);

    let (_, second) = send(&app, post("/quiz/42/answer", json!({ "choice_id": 4 }))).await;
    assert_eq!(second["correct"], false);
    assert_eq!(second["score"], 1);
    assert_eq!(second["correct_choice"]["text"], "German");

    let (_, third) = send(
        &app,
        post("/quiz/42/answer", json!({ "choice_id": 3, "question_id": 3 })),
    )
    .await;
    assert_eq!(third["correct"], true);
    assert_eq!(third["score"], 2);
    assert_eq!(third["finished"], true);
    assert!(third["next"].is_null());
    assert_eq!(third["summary"]["score"], 2);
    assert_eq!(third["summary"]["total"], 3);

    // A finished quiz takes no more answers but still reports its summary.
    let (status, body) = send(&app, get("/quiz/42/question")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no_active_session");

    let (status, summary) = send(&app, get("/quiz/42/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["score"], 2);
    assert_eq!(summary["finished"], true);
    let results: Vec<bool> = summary["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["correct"].as_bool().unwrap())
        .collect();
    assert_eq!(results, vec![true, false, true]);
}

#[tokio::test]
async fn answering_without_a_quiz_is_not_found() {
    let app = build_app(None, None);
    let (status, body) = send(&app, post("/quiz/ghost/answer", json!({ "choice_id": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no_active_session");
}

#[tokio::test]
async fn invalid_choice_is_rejected_without_advancing() {
    let app = build_app(None, None);
    send(&app, post("/quiz/start", json!({ "user_id": "7" }))).await;

    let (status, body) = send(&app, post("/quiz/7/answer", json!({ "choice_id": 99 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_choice");

    let (_, current) = send(&app, get("/quiz/7/question")).await;
    assert_eq!(current["index"], 0);
}

#[tokio::test]
async fn stale_button_press_is_rejected() {
    let app = build_app(None, None);
    send(&app, post("/quiz/start", json!({ "user_id": "7" }))).await;
    send(&app, post("/quiz/7/answer", json!({ "choice_id": 1, "question_id": 1 }))).await;

    let (status, body) = send(
        &app,
        post("/quiz/7/answer", json!({ "choice_id": 1, "question_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "question_mismatch");

    let (_, current) = send(&app, get("/quiz/7/question")).await;
    assert_eq!(current["index"], 1);
}

#[tokio::test]
async fn starting_again_replaces_the_attempt() {
    let app = build_app(None, None);
    let (_, first) = send(&app, post("/quiz/start", json!({ "user_id": "9" }))).await;
    send(&app, post("/quiz/9/answer", json!({ "choice_id": 1 }))).await;

    let (_, second) = send(&app, post("/quiz/start", json!({ "user_id": "9" }))).await;
    assert_ne!(first["attempt_id"], second["attempt_id"]);
    Uuid::parse_str(second["attempt_id"].as_str().unwrap()).expect("uuid attempt id");

    let (_, current) = send(&app, get("/quiz/9/question")).await;
    assert_eq!(current["index"], 0);
    let (_, summary) = send(&app, get("/quiz/9/summary")).await;
    assert_eq!(summary["score"], 0);
    assert!(summary["details"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reset_discards_the_quiz() {
    let app = build_app(None, None);
    send(&app, post("/quiz/start", json!({ "user_id": "5" }))).await;

    let (status, _) = send(&app, delete("/quiz/5")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get("/quiz/5/question")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_user_id_is_a_bad_request() {
    let app = build_app(None, None);
    let (status, body) = send(&app, post("/quiz/start", json!({ "user_id": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn malformed_answers_are_invalid_choices() {
    let app = build_app(None, None);
    send(&app, post("/quiz/start", json!({ "user_id": "m" }))).await;

    for payload in [
        json!({ "choice_id": "A" }),
        json!({ "choice_id": -1 }),
        json!({}),
    ] {
        let (status, body) = send(&app, post("/quiz/m/answer", payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["error"], "invalid_choice", "payload {}", payload);
        assert!(!body["message"].as_str().unwrap().contains("u32"));
    }

    let (_, current) = send(&app, get("/quiz/m/question")).await;
    assert_eq!(current["index"], 0);
}

#[tokio::test]
async fn unreadable_bodies_get_a_json_error() {
    let app = build_app(None, None);

    let not_json = Request::builder()
        .method(Method::POST)
        .uri("/quiz/start")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("user_id=1"))
        .unwrap();
    let (status, body) = send(&app, not_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = send(&app, post("/quiz/start", json!({ "user": "1" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn start_can_ask_for_fewer_questions() {
    let app = build_app(None, None);

    let (status, started) = send(
        &app,
        post("/quiz/start", json!({ "user_id": "n", "n_questions": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["total"], 2);

    send(&app, post("/quiz/n/answer", json!({ "choice_id": 1 }))).await;
    let (_, last) = send(&app, post("/quiz/n/answer", json!({ "choice_id": 2 }))).await;
    assert_eq!(last["finished"], true);
    assert_eq!(last["summary"]["total"], 2);

    let (_, capped) = send(
        &app,
        post("/quiz/start", json!({ "user_id": "n", "n_questions": 40 })),
    )
    .await;
    assert_eq!(capped["total"], 3);

    let (status, body) = send(
        &app,
        post("/quiz/start", json!({ "user_id": "z", "n_questions": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_quiz_length");
}

#[tokio::test]
async fn user_ids_must_be_usable_in_paths() {
    let app = build_app(None, None);

    for user_id in [" u1", "u1 ", "start"] {
        let (status, body) = send(&app, post("/quiz/start", json!({ "user_id": user_id }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "user id {:?}", user_id);
        assert_eq!(body["error"], "bad_request");
    }
}

#[tokio::test]
async fn catalog_endpoints() {
    let app = build_app(None, None);

    let (status, list) = send(&app, get("/questions")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["question_id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let (status, one) = send(&app, get("/questions/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["prompt"], "Germany");

    let (status, body) = send(&app, get("/questions/77")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn shared_secret_guards_everything_but_health() {
    let app = build_app(Some("s3cret"), None);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = send(&app, post("/quiz/start", json!({ "user_id": "1" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let mut wrong = post("/quiz/start", json!({ "user_id": "1" }));
    wrong
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut right = post("/quiz/start", json!({ "user_id": "1" }));
    right
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer s3cret".parse().unwrap());
    let (status, _) = send(&app, right).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn audio_files_are_served_from_the_audio_dir() {
    let dir = std::env::temp_dir().join(format!("quiz-audio-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("q1.mp3"), b"ID3fake").unwrap();

    let app = build_app(None, Some(&dir));
    let resp = app.clone().oneshot(get("/static/q1.mp3")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ID3fake");

    let resp = app.oneshot(get("/static/missing.mp3")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(&dir).ok();
}
