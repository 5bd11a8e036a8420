//! crates/summary_core/src/service.rs
//!
//! The use-case layer. Every operation resolves the caller, checks ownership
//! through [`authorize`], and maps port failures into the [`ServiceError`]
//! taxonomy the transport layer turns into responses.

use crate::authz::{authorize, Access};
use crate::domain::{CallerContext, Document, NewDocument, RegenerationOptions, Summary, User};
use crate::ports::{DatabaseService, PortError, SummaryPipelineService};
use crate::view::{self, SummaryPanel};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Forbidden")]
    Forbidden,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        // A port reporting NotFound here means a lookup the service already
        // expected to succeed; treat it as internal.
        ServiceError::Internal(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Metadata handed over by the storage uploader once the file is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub title: Option<String>,
    pub file_name: String,
    pub file_url: String,
    pub file_key: String,
    pub file_size: i64,
}

#[derive(Debug, Clone)]
pub struct DocumentWithSummaries {
    pub document: Document,
    pub summaries: Vec<Summary>,
}

#[derive(Clone)]
pub struct DocumentService {
    db: Arc<dyn DatabaseService>,
    pipeline: Arc<dyn SummaryPipelineService>,
}

impl DocumentService {
    pub fn new(db: Arc<dyn DatabaseService>, pipeline: Arc<dyn SummaryPipelineService>) -> Self {
        Self { db, pipeline }
    }

    //=====================================================================================
    // Document resource
    //=====================================================================================

    pub async fn get_document(
        &self,
        caller: Option<&CallerContext>,
        raw_id: &str,
    ) -> ServiceResult<Document> {
        let (_, document) = self.owned_document(caller, raw_id).await?;
        Ok(document)
    }

    /// Deletes an owned document together with its folder associations.
    pub async fn delete_document(
        &self,
        caller: Option<&CallerContext>,
        raw_id: &str,
    ) -> ServiceResult<()> {
        let (user, document) = self.owned_document(caller, raw_id).await?;
        if !self.db.delete_document(document.id).await? {
            // Removed concurrently between the ownership check and the delete.
            return Err(ServiceError::NotFound("Document not found".to_string()));
        }
        info!(document_id = document.id, user_id = user.id, "Document deleted");
        Ok(())
    }

    //=====================================================================================
    // Summaries
    //=====================================================================================

    pub async fn list_documents(&self, caller: Option<&CallerContext>) -> ServiceResult<Vec<Document>> {
        let user = self.resolve_caller(caller).await?;
        Ok(self.db.list_documents_for_user(user.id).await?)
    }

    /// Persists an uploaded file's metadata and queues its first generation run.
    pub async fn save_document(
        &self,
        caller: Option<&CallerContext>,
        upload: UploadedFile,
    ) -> ServiceResult<Document> {
        let caller = caller.ok_or(ServiceError::Unauthorized)?;
        validate_upload(&upload)?;

        let user = self.db.get_or_create_user(&caller.subject).await?;
        let title = view::derive_title(upload.title.as_deref(), &upload.file_name);
        let document = self
            .db
            .create_document(NewDocument {
                user_id: user.id,
                title,
                file_name: upload.file_name,
                file_url: upload.file_url,
                file_key: upload.file_key,
                file_size: upload.file_size,
            })
            .await?;

        // Every stored document has a queued run; undo the insert otherwise.
        if let Err(err) = self
            .pipeline
            .request_generation(document.id, &RegenerationOptions::default())
            .await
        {
            if let Err(cleanup) = self.db.delete_document(document.id).await {
                error!(document_id = document.id, "Failed to remove unqueued document: {}", cleanup);
            }
            return Err(err.into());
        }
        info!(document_id = document.id, user_id = user.id, "Document saved");
        Ok(document)
    }

    pub async fn get_summaries(
        &self,
        caller: Option<&CallerContext>,
        raw_id: &str,
    ) -> ServiceResult<DocumentWithSummaries> {
        let (_, document) = self.owned_document(caller, raw_id).await?;
        let summaries = self.db.list_summaries(document.id).await?;
        Ok(DocumentWithSummaries {
            document,
            summaries,
        })
    }

    /// Document plus its rendered summary panel.
    pub async fn summary_view(
        &self,
        caller: Option<&CallerContext>,
        raw_id: &str,
    ) -> ServiceResult<(Document, SummaryPanel)> {
        let DocumentWithSummaries {
            document,
            summaries,
        } = self.get_summaries(caller, raw_id).await?;
        let pending = if summaries.is_empty() {
            self.pipeline.is_generation_pending(document.id).await?
        } else {
            false
        };
        Ok((document, view::build_panel(Some(&summaries), pending)))
    }

    pub async fn request_regeneration(
        &self,
        caller: Option<&CallerContext>,
        raw_id: &str,
        options: RegenerationOptions,
    ) -> ServiceResult<()> {
        let (_, document) = self.owned_document(caller, raw_id).await?;
        self.pipeline.request_generation(document.id, &options).await?;
        info!(
            document_id = document.id,
            focus_chapters = options.focus_chapters.len(),
            focus_topics = options.focus_topics.len(),
            "Regeneration requested"
        );
        Ok(())
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    async fn resolve_caller(&self, caller: Option<&CallerContext>) -> ServiceResult<User> {
        let caller = caller.ok_or(ServiceError::Unauthorized)?;
        self.db
            .find_user_by_external_id(&caller.subject)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Authenticates, parses the identifier, resolves the caller and checks
    /// ownership, in that order.
    async fn owned_document(
        &self,
        caller: Option<&CallerContext>,
        raw_id: &str,
    ) -> ServiceResult<(User, Document)> {
        if caller.is_none() {
            return Err(ServiceError::Unauthorized);
        }
        let document_id = parse_document_id(raw_id)?;
        let user = self.resolve_caller(caller).await?;
        let document = self
            .db
            .find_document(document_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Document not found".to_string()))?;

        match authorize(&user, &document) {
            Access::Allowed => Ok((user, document)),
            Access::Forbidden => {
                warn!(document_id, user_id = user.id, "Rejected access to foreign document");
                Err(ServiceError::Forbidden)
            }
        }
    }
}

/// Strict decimal parse of a path identifier.
pub fn parse_document_id(raw: &str) -> ServiceResult<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ServiceError::InvalidInput("Invalid document ID".to_string()))
}

fn validate_upload(upload: &UploadedFile) -> ServiceResult<()> {
    let missing = [
        ("fileName", &upload.file_name),
        ("fileUrl", &upload.file_url),
        ("fileKey", &upload.file_key),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty());
    if let Some((field, _)) = missing {
        return Err(ServiceError::InvalidInput(format!("{} is required", field)));
    }
    if upload.file_size < 0 {
        return Err(ServiceError::InvalidInput(
            "fileSize must not be negative".to_string(),
        ));
    }
    Ok(())
}
