//! services/api/src/web/summaries.rs
//!
//! Handlers behind the document listing, upload, and summary viewer.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use summary_core::view;

use crate::web::auth::Caller;
use crate::web::extract::{AppJson, AppJsonOrDefault};
use crate::web::rest::{
    DocumentBody, DocumentSummariesBody, ErrorBody, HttpError, LibraryBody, RegenerateRequest,
    SaveDocumentRequest, SaveDocumentResponse, SuccessBody, SummaryBody, SummaryViewBody,
};
use crate::web::state::AppState;

/// List the caller's documents, newest first.
#[utoipa::path(
    get,
    path = "/api/summaries",
    responses(
        (status = 200, description = "The caller's documents", body = Vec<DocumentBody>),
        (status = 401, description = "No authenticated caller", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<DocumentBody>>, HttpError> {
    let documents = state
        .service
        .list_documents(caller.context())
        .await
        .map_err(|e| HttpError::new("fetching documents", e))?;
    Ok(Json(documents.into_iter().map(DocumentBody::from).collect()))
}

/// Save the metadata of a file the storage uploader has finished, and queue
/// its first summary generation.
#[utoipa::path(
    post,
    path = "/api/summaries",
    request_body = SaveDocumentRequest,
    responses(
        (status = 201, description = "Document saved", body = SaveDocumentResponse),
        (status = 400, description = "Missing or invalid upload fields", body = ErrorBody),
        (status = 401, description = "No authenticated caller", body = ErrorBody),
        (status = 500, description = "Failed to save document", body = ErrorBody)
    )
)]
pub async fn save_document_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    AppJson(req): AppJson<SaveDocumentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let document = state
        .service
        .save_document(caller.context(), req.into())
        .await
        .map_err(|e| {
            HttpError::new("saving document", e).with_internal_message("Failed to save document")
        })?;

    let response = SaveDocumentResponse {
        success: true,
        document_id: document.id,
        redirect_to: view::viewer_path(document.id),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Fetch a document together with its stored summaries.
#[utoipa::path(
    get,
    path = "/api/summaries/{documentId}",
    responses(
        (status = 200, description = "Document and summaries", body = DocumentSummariesBody),
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
pub async fn get_summaries_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentSummariesBody>, HttpError> {
    let found = state
        .service
        .get_summaries(caller.context(), &document_id)
        .await
        .map_err(|e| HttpError::new("fetching summaries", e))?;
    Ok(Json(DocumentSummariesBody {
        document: found.document.into(),
        summaries: found.summaries.into_iter().map(SummaryBody::from).collect(),
    }))
}

/// Fetch a document with its summaries split into display segments.
#[utoipa::path(
    get,
    path = "/api/summaries/{documentId}/view",
    responses(
        (status = 200, description = "Rendered summary panel", body = SummaryViewBody),
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
pub async fn summary_view_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(document_id): Path<String>,
) -> Result<Json<SummaryViewBody>, HttpError> {
    let (document, panel) = state
        .service
        .summary_view(caller.context(), &document_id)
        .await
        .map_err(|e| HttpError::new("rendering summaries", e))?;
    Ok(Json(SummaryViewBody {
        document: document.into(),
        panel,
    }))
}

/// Queue a regeneration run with the caller's focus and instructions.
///
/// An empty body queues a run with no focus. Completion is not reported;
/// `Retry-After` tells the client when to reload.
#[utoipa::path(
    post,
    path = "/api/summaries/{documentId}/regenerate",
    request_body = RegenerateRequest,
    responses(
        (status = 200, description = "Regeneration queued", body = SuccessBody,
            headers(("Retry-After" = u64, description = "Seconds to wait before reloading"))),
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
pub async fn regenerate_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(document_id): Path<String>,
    AppJsonOrDefault(req): AppJsonOrDefault<RegenerateRequest>,
) -> Result<impl IntoResponse, HttpError> {
    state
        .service
        .request_regeneration(caller.context(), &document_id, req.into())
        .await
        .map_err(|e| HttpError::new("regenerating summaries", e))?;

    Ok((
        [(header::RETRY_AFTER, state.reload.retry_after_secs().to_string())],
        Json(SuccessBody::ok()),
    ))
}

/// The caller's documents rendered as listing cards.
#[utoipa::path(
    get,
    path = "/api/library",
    responses(
        (status = 200, description = "Listing cards", body = LibraryBody),
        (status = 401, description = "No authenticated caller", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn library_handler(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<LibraryBody>, HttpError> {
    let documents = state
        .service
        .list_documents(caller.context())
        .await
        .map_err(|e| HttpError::new("fetching documents", e))?;
    Ok(Json(view::build_listing(&documents).into()))
}
