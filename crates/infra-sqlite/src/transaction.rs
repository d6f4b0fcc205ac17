// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use jobdock_core::domain::Job;
use jobdock_core::error::{AppError, Result};
use jobdock_core::port::{JobRepositoryTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

pub struct SqliteJobTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteJobTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteJobTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl JobRepositoryTransaction for SqliteJobTransaction {
    async fn insert(&mut self, job: &Job) -> Result<()> {
        let metadata = serde_json::to_string(&job.metadata)?;

        // Conditional insert: the queue must still be active and unlocked at write time
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (job_id, queue_id, payload_reference, metadata, created_on)
            SELECT ?, q.queue_id, ?, ?, ?
            FROM queues q
            WHERE q.queue_id = ?
              AND q.is_deleted = 0
              AND NOT EXISTS (SELECT 1 FROM queue_locks l WHERE l.queue_id = q.queue_id)
            "#,
        )
        .bind(&job.job_id)
        .bind(job.payload_reference.as_str())
        .bind(&metadata)
        .bind(job.created_on)
        .bind(job.queue_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let locked: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM queue_locks WHERE queue_id = ?)")
                .bind(job.queue_id)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;

        if locked {
            Err(AppError::QueueLocked(format!("id={}", job.queue_id)))
        } else {
            Err(AppError::QueueDoesNotExist(format!("id={}", job.queue_id)))
        }
    }
}
