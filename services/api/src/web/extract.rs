//! services/api/src/web/extract.rs
//!
//! JSON body extractors that answer with the same `{ "error": ... }` body as
//! every other failure, instead of axum's plain-text rejections.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use summary_core::{CallerContext, ServiceError};

use crate::web::rest::HttpError;

/// A `Json<T>` wrapper whose rejections become `400 {error}`.
///
/// An anonymous caller is refused with 401 before the body is read.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        require_caller(&req)?;
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(invalid_body)?;
        Ok(AppJson(value))
    }
}

/// Like [`AppJson`], but a missing or blank body yields `T::default()`.
pub struct AppJsonOrDefault<T>(pub T);

impl<S, T> FromRequest<S> for AppJsonOrDefault<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        require_caller(&req)?;
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            HttpError::new("reading request body", ServiceError::InvalidInput(e.body_text()))
        })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(AppJsonOrDefault(T::default()));
        }
        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(invalid_body)?;
        Ok(AppJsonOrDefault(value))
    }
}

fn require_caller(req: &Request) -> Result<(), HttpError> {
    if req.extensions().get::<CallerContext>().is_none() {
        return Err(HttpError::new(
            "reading request body",
            ServiceError::Unauthorized,
        ));
    }
    Ok(())
}

fn invalid_body(rejection: JsonRejection) -> HttpError {
    HttpError::new(
        "reading request body",
        ServiceError::InvalidInput(rejection.body_text()),
    )
}
