//! crates/summary_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the relational store and of the summarization pipeline.

use crate::domain::{Document, NewDocument, RegenerationOptions, Summary, User};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Identity Resolution ---
    /// Maps an identity-provider subject to the internal user, if one exists.
    async fn find_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>>;

    async fn get_or_create_user(&self, external_id: &str) -> PortResult<User>;

    // --- Document Management ---
    async fn find_document(&self, document_id: i32) -> PortResult<Option<Document>>;

    /// Newest first.
    async fn list_documents_for_user(&self, user_id: i32) -> PortResult<Vec<Document>>;

    async fn create_document(&self, document: NewDocument) -> PortResult<Document>;

    /// Removes the document's folder associations and then the document row,
    /// atomically. Returns whether a document row was removed.
    async fn delete_document(&self, document_id: i32) -> PortResult<bool>;

    // --- Summaries (written by the pipeline, read here) ---
    /// Summaries in storage order.
    async fn list_summaries(&self, document_id: i32) -> PortResult<Vec<Summary>>;
}

#[async_trait]
pub trait SummaryPipelineService: Send + Sync {
    /// Asks the external pipeline to (re)generate the summaries of a document.
    /// Completion is not reported back.
    async fn request_generation(
        &self,
        document_id: i32,
        options: &RegenerationOptions,
    ) -> PortResult<()>;

    /// Whether a generation request for the document has not finished yet.
    async fn is_generation_pending(&self, document_id: i32) -> PortResult<bool>;
}
