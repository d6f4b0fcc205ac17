// SQLite JobRepository Implementation

use crate::error::map_sqlx_error;
use crate::SqliteJobTransaction;
use async_trait::async_trait;
use jobdock_core::domain::{Job, JobId, JobMetadata, PayloadReference};
use jobdock_core::error::Result;
use jobdock_core::port::{JobRepository, JobRepositoryTransaction, TransactionalJobRepository};
use sqlx::SqlitePool;

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT * FROM jobs
            ORDER BY created_on ASC, job_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobRow::into_job).collect()
    }
}

#[async_trait]
impl TransactionalJobRepository for SqliteJobRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn JobRepositoryTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteJobTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    job_id: String,
    queue_id: i64,
    payload_reference: String,
    metadata: String, // JSON object
    created_on: i64,
}

impl JobRow {
    fn into_job(self) -> Result<Job> {
        let metadata: JobMetadata = serde_json::from_str(&self.metadata)?;

        Ok(Job::new(
            self.job_id,
            self.created_on,
            self.queue_id,
            PayloadReference::new(self.payload_reference),
            metadata,
        ))
    }
}
