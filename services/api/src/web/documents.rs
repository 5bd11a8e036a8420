//! services/api/src/web/documents.rs
//!
//! Handlers for the single-document resource.

use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;

use crate::web::auth::Caller;
use crate::web::rest::{DocumentBody, ErrorBody, HttpError, SuccessBody};
use crate::web::state::AppState;

/// Fetch one of the caller's documents.
#[utoipa::path(
    get,
    path = "/api/documents/{documentId}",
    responses(
        (status = 200, description = "The document", body = DocumentBody),
        (status = 400, description = "Identifier is not an integer", body = ErrorBody),
        (status = 401, description = "No authenticated caller", body = ErrorBody),
        (status = 403, description = "Document belongs to another user", body = ErrorBody),
        (status = 404, description = "User or document not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    params(
        ("documentId" = String, Path, description = "Numeric document identifier.")
    )
)]
pub async fn get_document_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentBody>, HttpError> {
    let document = state
        .service
        .get_document(caller.context(), &document_id)
        .await
        .map_err(|e| HttpError::new("fetching document", e))?;
    Ok(Json(document.into()))
}

/// Delete one of the caller's documents along with its folder associations.
#[utoipa::path(
    delete,
    path = "/api/documents/{documentId}",
    responses(
        (status = 200, description = "Document deleted", body = SuccessBody),
        (status = 400, description = "Identifier is not an integer", body = ErrorBody),
        (status = 401, description = "No authenticated caller", body = ErrorBody),
        (status = 403, description = "Document belongs to another user", body = ErrorBody),
        (status = 404, description = "User or document not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    params(
        ("documentId" = String, Path, description = "Numeric document identifier.")
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(document_id): Path<String>,
) -> Result<Json<SuccessBody>, HttpError> {
    state
        .service
        .delete_document(caller.context(), &document_id)
        .await
        .map_err(|e| HttpError::new("deleting document", e))?;
    Ok(Json(SuccessBody::ok()))
}
