//! crates/summary_core/src/memory.rs
//!
//! An in-process implementation of both ports. Backs the `memory://` database
//! mode for local development and doubles as the store in tests.

use crate::domain::{Document, NewDocument, RegenerationOptions, Summary, User};
use crate::ports::{DatabaseService, PortResult, SummaryPipelineService};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

struct GenerationRequest {
    document_id: i32,
    options: RegenerationOptions,
    finished: bool,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    documents: Vec<Document>,
    /// `(document_id, folder_id)`
    document_folders: Vec<(i32, i32)>,
    summaries: Vec<Summary>,
    requests: Vec<GenerationRequest>,
    next_user_id: i32,
    next_document_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `DatabaseService` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    fn touch(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn link_folder(&self, document_id: i32, folder_id: i32) {
        self.tables
            .write()
            .await
            .document_folders
            .push((document_id, folder_id));
    }

    pub async fn folders_of(&self, document_id: i32) -> Vec<i32> {
        self.tables
            .read()
            .await
            .document_folders
            .iter()
            .filter(|(doc, _)| *doc == document_id)
            .map(|(_, folder)| *folder)
            .collect()
    }

    /// Stores a summary the way the pipeline would.
    pub async fn insert_summary(&self, summary: Summary) {
        self.tables.write().await.summaries.push(summary);
    }

    /// Options of every generation request for the document, oldest first.
    pub async fn generation_requests(&self, document_id: i32) -> Vec<RegenerationOptions> {
        self.tables
            .read()
            .await
            .requests
            .iter()
            .filter(|r| r.document_id == document_id)
            .map(|r| r.options.clone())
            .collect()
    }

    /// Marks every request for the document as done.
    pub async fn finish_generation(&self, document_id: i32) {
        let mut tables = self.tables.write().await;
        for request in tables
            .requests
            .iter_mut()
            .filter(|r| r.document_id == document_id)
        {
            request.finished = true;
        }
    }
}

#[async_trait]
impl DatabaseService for MemoryStore {
    async fn find_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>> {
        self.touch();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn get_or_create_user(&self, external_id: &str) -> PortResult<User> {
        self.touch();
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter().find(|u| u.external_id == external_id) {
            return Ok(user.clone());
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            external_id: external_id.to_string(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_document(&self, document_id: i32) -> PortResult<Option<Document>> {
        self.touch();
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .cloned())
    }

    async fn list_documents_for_user(&self, user_id: i32) -> PortResult<Vec<Document>> {
        self.touch();
        let tables = self.tables.read().await;
        let mut documents: Vec<Document> = tables
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(documents)
    }

    async fn create_document(&self, document: NewDocument) -> PortResult<Document> {
        self.touch();
        let mut tables = self.tables.write().await;
        tables.next_document_id += 1;
        let created = Document {
            id: tables.next_document_id,
            user_id: document.user_id,
            title: document.title,
            file_name: document.file_name,
            file_url: document.file_url,
            file_key: document.file_key,
            file_size: document.file_size,
            created_at: Utc::now(),
        };
        tables.documents.push(created.clone());
        Ok(created)
    }

    async fn delete_document(&self, document_id: i32) -> PortResult<bool> {
        self.touch();
        // One write guard covers every table, so no reader sees a half-deleted document.
        let mut tables = self.tables.write().await;
        tables.document_folders.retain(|(doc, _)| *doc != document_id);
        tables.summaries.retain(|s| s.document_id != document_id);
        tables.requests.retain(|r| r.document_id != document_id);
        let before = tables.documents.len();
        tables.documents.retain(|d| d.id != document_id);
        Ok(tables.documents.len() != before)
    }

    async fn list_summaries(&self, document_id: i32) -> PortResult<Vec<Summary>> {
        self.touch();
        let tables = self.tables.read().await;
        Ok(tables
            .summaries
            .iter()
            .filter(|s| s.document_id == document_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SummaryPipelineService for MemoryStore {
    async fn request_generation(
        &self,
        document_id: i32,
        options: &RegenerationOptions,
    ) -> PortResult<()> {
        self.tables.write().await.requests.push(GenerationRequest {
            document_id,
            options: options.clone(),
            finished: false,
        });
        Ok(())
    }

    async fn is_generation_pending(&self, document_id: i32) -> PortResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .requests
            .iter()
            .any(|r| r.document_id == document_id && !r.finished))
    }
}
