pub mod auth;
pub mod documents;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod summaries;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use crate::web::documents::{delete_document_handler, get_document_handler};
use crate::web::middleware::authenticate;
use crate::web::rest::ErrorBody;
use crate::web::state::AppState;
use crate::web::summaries::{
    get_summaries_handler, library_handler, list_documents_handler, regenerate_handler,
    save_document_handler, summary_view_handler,
};

/// Builds the API router. CORS and the Swagger UI are layered on by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    // Every API route sees the caller resolved by `authenticate`.
    let api_routes = Router::new()
        .route(
            "/api/documents/{document_id}",
            get(get_document_handler).delete(delete_document_handler),
        )
        .route(
            "/api/summaries",
            get(list_documents_handler).post(save_document_handler),
        )
        .route("/api/summaries/{document_id}", get(get_summaries_handler))
        .route("/api/summaries/{document_id}/view", get(summary_view_handler))
        .route(
            "/api/summaries/{document_id}/regenerate",
            post(regenerate_handler),
        )
        .route("/api/library", get(library_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            authenticate,
        ));

    Router::new()
        .merge(api_routes)
        .route("/health", get(|| async { "ok" }))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Handler panicked while serving a request");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}
