//! services/api/src/adapters/pipeline.rs
//!
//! Hands generation requests to the external summarization pipeline through
//! the `summary_jobs` table, which the pipeline workers poll.

use async_trait::async_trait;
use sqlx::PgPool;
use summary_core::domain::RegenerationOptions;
use summary_core::ports::{PortError, PortResult, SummaryPipelineService};
use tracing::debug;

#[derive(Clone)]
pub struct JobQueueAdapter {
    pool: PgPool,
}

impl JobQueueAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryPipelineService for JobQueueAdapter {
    async fn request_generation(
        &self,
        document_id: i32,
        options: &RegenerationOptions,
    ) -> PortResult<()> {
        let job_id: i64 = sqlx::query_scalar(
            "INSERT INTO summary_jobs (document_id, focus_chapters, focus_topics, custom_instructions) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(document_id)
        .bind(&options.focus_chapters)
        .bind(&options.focus_topics)
        .bind(&options.custom_instructions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(job_id, document_id, "Queued summary job");
        Ok(())
    }

    async fn is_generation_pending(&self, document_id: i32) -> PortResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM summary_jobs WHERE document_id = $1 AND status IN ('pending', 'running'))",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
