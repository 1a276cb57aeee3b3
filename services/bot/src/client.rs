//! services/bot/src/client.rs
//!
//! A thin reqwest client for the quiz API. Every call is keyed by the Telegram
//! user id; the bot itself keeps no quiz state.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::BotError;
use crate::protocol::{
    AnswerRequest, AnswerResponse, ErrorBody, QuizQuestion, StartQuizRequest, StartQuizResponse,
};

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
    n_questions: Option<usize>,
}

impl ApiClient {
    pub fn new(base: impl Into<String>, token: Option<String>) -> Result<Self, BotError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            http,
            base: base.into().trim_end_matches('/').to_string(),
            token,
            n_questions: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BotError> {
        Ok(Self::new(config.api_base.clone(), config.api_token.clone())?
            .with_question_count(config.n_questions))
    }

    /// Asks the API for `n` questions per quiz instead of its default.
    pub fn with_question_count(mut self, n: Option<usize>) -> Self {
        self.n_questions = n;
        self
    }

    /// Resolves a path or absolute URL returned by the API.
    pub fn url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}/{}", self.base, path_or_url.trim_start_matches('/'))
        }
    }

    pub async fn start(&self, user_id: &str) -> Result<StartQuizResponse, BotError> {
        let req = self
            .http
            .post(self.url("/quiz/start"))
            .json(&StartQuizRequest {
                user_id,
                n_questions: self.n_questions,
            });
        self.send_json(req).await
    }

    pub async fn current_question(&self, user_id: &str) -> Result<QuizQuestion, BotError> {
        let req = self
            .http
            .get(self.url(&format!("/quiz/{}/question", user_id)));
        self.send_json(req).await
    }

    pub async fn answer(
        &self,
        user_id: &str,
        question_id: u32,
        choice_id: u32,
    ) -> Result<AnswerResponse, BotError> {
        let req = self
            .http
            .post(self.url(&format!("/quiz/{}/answer", user_id)))
            .json(&AnswerRequest {
                question_id,
                choice_id,
            });
        self.send_json(req).await
    }

    pub async fn reset(&self, user_id: &str) -> Result<(), BotError> {
        let req = self.http.delete(self.url(&format!("/quiz/{}", user_id)));
        self.send(req).await?;
        Ok(())
    }

    /// Downloads an audio asset so it can be uploaded to Telegram.
    pub async fn fetch_audio(&self, path_or_url: &str) -> Result<Vec<u8>, BotError> {
        let req = self.http.get(self.url(path_or_url));
        let resp = self.send(req).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BotError> {
        let resp = self.send(req).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, BotError> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let resp = req.send().await?;
        let status = resp.status();
        debug!("Quiz API answered {} for {}", status, resp.url());
        if status.is_success() {
            return Ok(resp);
        }

        // Error bodies are JSON when they come from the API itself; anything
        // else (a proxy page, an empty body) is reported by status alone.
        let body = resp.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => (err.error, err.message),
            Err(_) => ("http_status".to_string(), body),
        };
        Err(BotError::Backend {
            status: status.as_u16(),
            code,
            message,
        })
    }
}
