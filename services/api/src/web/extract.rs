//! services/api/src/web/extract.rs
//!
//! `JsonBody` is `axum::Json` with our error contract: a body that fails to
//! parse becomes an `HttpError` with a JSON error body instead of axum's
//! plain-text rejection.

use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;

use crate::web::error::HttpError;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
