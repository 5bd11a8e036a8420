//! services/api/src/web/rest.rs
//!
//! Contains the REST payload types, the mapping from service errors to HTTP
//! responses, and the master definition for the OpenAPI specification.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use summary_core::domain::{Document, RegenerationOptions, Summary};
use summary_core::service::UploadedFile;
use summary_core::view::{DocumentCard, Listing, SummaryPanel};
use summary_core::ServiceError;
use tracing::error;
use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::web::middleware::SESSION_COOKIE;
use crate::web::{documents, summaries};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Document Summaries API",
        description = "Uploaded document metadata, generated summaries and regeneration requests."
    ),
    paths(
        documents::get_document_handler,
        documents::delete_document_handler,
        summaries::list_documents_handler,
        summaries::save_document_handler,
        summaries::get_summaries_handler,
        summaries::summary_view_handler,
        summaries::regenerate_handler,
        summaries::library_handler,
    ),
    components(
        schemas(
            DocumentBody,
            SummaryBody,
            DocumentSummariesBody,
            SaveDocumentRequest,
            SaveDocumentResponse,
            RegenerateRequest,
            SummaryViewBody,
            LibraryBody,
            SuccessBody,
            ErrorBody,
        )
    ),
    tags(
        (name = "Document Summaries API", description = "Document metadata, summaries and regeneration.")
    ),
    modifiers(&SecurityAddon),
    security(("jwt" = []), ("session" = []))
)]
pub struct ApiDoc;

/// Documents both ways a caller can present the identity-provider token.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "session",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A stored document, as returned to its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBody {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub file_name: String,
    pub file_url: String,
    pub file_key: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentBody {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            title: doc.title,
            file_name: doc.file_name,
            file_url: doc.file_url,
            file_key: doc.file_key,
            file_size: doc.file_size,
            created_at: doc.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryBody {
    /// One of `overview`, `key_points`, `chapter`.
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl From<Summary> for SummaryBody {
    fn from(summary: Summary) -> Self {
        Self {
            kind: summary.kind.as_str().to_string(),
            content: summary.content,
            title: summary.title,
            order: summary.order,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentSummariesBody {
    pub document: DocumentBody,
    pub summaries: Vec<SummaryBody>,
}

/// The storage uploader's result, plus the optional user-supplied title.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocumentRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub file_name: String,
    pub file_url: String,
    pub file_key: String,
    pub file_size: i64,
}

impl From<SaveDocumentRequest> for UploadedFile {
    fn from(req: SaveDocumentRequest) -> Self {
        Self {
            title: req.title,
            file_name: req.file_name,
            file_url: req.file_url,
            file_key: req.file_key,
            file_size: req.file_size,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocumentResponse {
    pub success: bool,
    pub document_id: i32,
    /// Viewer location for the new document.
    pub redirect_to: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegenerateRequest {
    pub focus_chapters: Vec<String>,
    pub focus_topics: Vec<String>,
    pub custom_instructions: String,
}

impl From<RegenerateRequest> for RegenerationOptions {
    fn from(req: RegenerateRequest) -> Self {
        Self {
            focus_chapters: req.focus_chapters,
            focus_topics: req.focus_topics,
            custom_instructions: req.custom_instructions,
        }
    }
}

/// A document with its summaries rendered into display segments.
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryViewBody {
    pub document: DocumentBody,
    #[schema(value_type = Object)]
    pub panel: SummaryPanel,
}

/// The caller's documents as listing cards.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryBody {
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<DocumentCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl From<Listing> for LibraryBody {
    fn from(listing: Listing) -> Self {
        Self {
            documents: listing.documents,
            empty_message: listing.empty_message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessBody {
    pub success: bool,
}

impl SuccessBody {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// A failed request. Internal details are logged here and never sent to the client.
#[derive(Debug)]
pub struct HttpError {
    action: &'static str,
    internal_message: &'static str,
    source: ServiceError,
}

impl HttpError {
    /// `action` names what was attempted, e.g. `"fetching document"`.
    pub fn new(action: &'static str, source: ServiceError) -> Self {
        Self {
            action,
            internal_message: "Internal server error",
            source,
        }
    }

    /// Replaces the generic message sent for internal failures.
    pub fn with_internal_message(mut self, message: &'static str) -> Self {
        self.internal_message = message;
        self
    }

    pub fn status(&self) -> StatusCode {
        match self.source {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.source {
            ServiceError::Internal(detail) => {
                error!("Error {}: {}", self.action, detail);
                self.internal_message.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
