//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use summary_core::domain::{Document, NewDocument, Summary, SummaryKind, User};
use summary_core::ports::{DatabaseService, PortError, PortResult};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i32,
    clerk_id: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            external_id: self.clerk_id,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: i32,
    user_id: i32,
    title: String,
    file_name: String,
    file_url: String,
    file_key: String,
    file_size: i64,
    created_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            file_name: self.file_name,
            file_url: self.file_url,
            file_key: self.file_key,
            file_size: self.file_size,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    document_id: i32,
    #[sqlx(rename = "type")]
    kind: String,
    content: String,
    title: Option<String>,
    #[sqlx(rename = "order")]
    display_order: Option<i32>,
}
impl SummaryRecord {
    /// Rows with a kind the renderer does not know are skipped.
    fn to_domain(self) -> Option<Summary> {
        let Some(kind) = SummaryKind::parse(&self.kind) else {
            warn!(document_id = self.document_id, kind = %self.kind, "Skipping summary of unknown type");
            return None;
        };
        Some(Summary {
            document_id: self.document_id,
            kind,
            content: self.content,
            title: self.title,
            order: self.display_order,
        })
    }
}

const DOCUMENT_COLUMNS: &str =
    "id, user_id, title, file_name, file_url, file_key, file_size, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn find_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, clerk_id FROM users WHERE clerk_id = $1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn get_or_create_user(&self, external_id: &str) -> PortResult<User> {
        sqlx::query("INSERT INTO users (clerk_id) VALUES ($1) ON CONFLICT (clerk_id) DO NOTHING")
            .bind(external_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, clerk_id FROM users WHERE clerk_id = $1",
        )
        .bind(external_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("User {} not found", external_id))
            }
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn find_document(&self, document_id: i32) -> PortResult<Option<Document>> {
        let record = sqlx::query_as::<_, DocumentRecord>(&format!(
            "SELECT {} FROM documents WHERE id = $1",
            DOCUMENT_COLUMNS
        ))
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(DocumentRecord::to_domain))
    }

    async fn list_documents_for_user(&self, user_id: i32) -> PortResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(&format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            DOCUMENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_document(&self, document: NewDocument) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(&format!(
            "INSERT INTO documents (user_id, title, file_name, file_url, file_key, file_size) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(document.user_id)
        .bind(&document.title)
        .bind(&document.file_name)
        .bind(&document.file_url)
        .bind(&document.file_key)
        .bind(document.file_size)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_document(&self, document_id: i32) -> PortResult<bool> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM document_folders WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        let deleted = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?
            .rows_affected();

        tx.commit().await.map_err(unexpected)?;
        Ok(deleted > 0)
    }

    async fn list_summaries(&self, document_id: i32) -> PortResult<Vec<Summary>> {
        let records = sqlx::query_as::<_, SummaryRecord>(
            r#"SELECT document_id, type, content, title, "order" FROM summaries WHERE document_id = $1 ORDER BY id ASC"#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().filter_map(|r| r.to_domain()).collect())
    }
}
