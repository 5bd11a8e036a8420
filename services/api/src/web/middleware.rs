//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for the API routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

/// Name of the cookie the identity provider stores its session token in.
pub const SESSION_COOKIE: &str = "__session";

/// Middleware that verifies the caller's session token.
///
/// Reads `Authorization: Bearer <token>`, falling back to the session cookie.
/// A valid token inserts the caller's `CallerContext` into request extensions;
/// a missing or invalid one leaves the request anonymous and handlers answer 401.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req).or_else(|| session_cookie(&req)) {
        match state.verifier.verify(&token) {
            Ok(caller) => {
                req.extensions_mut().insert(caller);
            }
            Err(e) => warn!("Rejected session token: {}", e),
        }
    }
    next.run(req).await
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn session_cookie(req: &Request) -> Option<String> {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
        .filter(|t| !t.is_empty())
}
