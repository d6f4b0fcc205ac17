// SQLite QueueRepository Implementation
//
// Every multi-statement operation issues its write first, so the
// transaction holds the write lock before it reads anything.

use crate::error::{is_unique_violation, map_sqlx_error};
use async_trait::async_trait;
use jobdock_core::domain::{Queue, QueueId, QueueLock};
use jobdock_core::error::{AppError, Result};
use jobdock_core::port::QueueRepository;
use sqlx::{Sqlite, SqlitePool};

const SELECT_QUEUE: &str = r#"
    SELECT q.queue_id, q.name, q.created_on, q.last_modified,
           EXISTS (SELECT 1 FROM queue_locks l WHERE l.queue_id = q.queue_id) AS is_locked
    FROM queues q
"#;

pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Fetch an active queue through any executor (pool or open transaction)
async fn fetch_active<'e, E>(executor: E, id: QueueId) -> Result<Option<Queue>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("{} WHERE q.queue_id = ? AND q.is_deleted = 0", SELECT_QUEUE);
    let row = sqlx::query_as::<_, QueueRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?;

    Ok(row.map(QueueRow::into_queue))
}

fn map_name_error(err: sqlx::Error, name: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::DuplicateName(name.to_string())
    } else {
        map_sqlx_error(err)
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn insert(&self, name: &str, now_millis: i64) -> Result<Queue> {
        let result = sqlx::query(
            "INSERT INTO queues (name, created_on, last_modified) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(now_millis)
        .bind(now_millis)
        .execute(&self.pool)
        .await
        .map_err(|e| map_name_error(e, name))?;

        Ok(Queue {
            queue_id: result.last_insert_rowid(),
            name: name.to_string(),
            created_on: now_millis,
            last_modified: now_millis,
            is_locked: false,
        })
    }

    async fn find_by_id(&self, id: QueueId) -> Result<Option<Queue>> {
        fetch_active(&self.pool, id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Queue>> {
        let sql = format!("{} WHERE q.name = ? AND q.is_deleted = 0", SELECT_QUEUE);
        let row = sqlx::query_as::<_, QueueRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(QueueRow::into_queue))
    }

    async fn find_all(&self) -> Result<Vec<Queue>> {
        let sql = format!("{} WHERE q.is_deleted = 0 ORDER BY q.queue_id ASC", SELECT_QUEUE);
        let rows = sqlx::query_as::<_, QueueRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(QueueRow::into_queue).collect())
    }

    async fn rename(
        &self,
        id: QueueId,
        new_name: &str,
        now_millis: i64,
    ) -> Result<Option<Queue>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE queues
            SET name = ?, last_modified = ?
            WHERE queue_id = ? AND is_deleted = 0
            "#,
        )
        .bind(new_name)
        .bind(now_millis)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_name_error(e, new_name))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let queue = fetch_active(&mut *tx, id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(queue)
    }

    async fn lock(&self, id: QueueId, now_millis: i64) -> Result<Option<QueueLock>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // No-op when the lock already exists or the queue is not active
        sqlx::query(
            r#"
            INSERT INTO queue_locks (queue_id, created_on)
            SELECT ?, ?
            WHERE EXISTS (SELECT 1 FROM queues WHERE queue_id = ? AND is_deleted = 0)
            ON CONFLICT (queue_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(now_millis)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let lock = sqlx::query_as::<_, QueueLockRow>(
            "SELECT queue_id, created_on FROM queue_locks WHERE queue_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(lock.map(QueueLockRow::into_lock))
    }

    async fn unlock(&self, id: QueueId) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM queue_locks WHERE queue_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM queues WHERE queue_id = ? AND is_deleted = 0)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(exists)
    }

    async fn soft_delete(&self, id: QueueId, now_millis: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE queues
            SET is_deleted = 1, last_modified = ?
            WHERE queue_id = ? AND is_deleted = 0
            "#,
        )
        .bind(now_millis)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM queue_locks WHERE queue_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(true)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct QueueRow {
    queue_id: i64,
    name: String,
    created_on: i64,
    last_modified: i64,
    is_locked: bool,
}

impl QueueRow {
    fn into_queue(self) -> Queue {
        Queue {
            queue_id: self.queue_id,
            name: self.name,
            created_on: self.created_on,
            last_modified: self.last_modified,
            is_locked: self.is_locked,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QueueLockRow {
    queue_id: i64,
    created_on: i64,
}

impl QueueLockRow {
    fn into_lock(self) -> QueueLock {
        QueueLock {
            queue_id: self.queue_id,
            created_on: self.created_on,
        }
    }
}
