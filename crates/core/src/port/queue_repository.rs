// Queue Repository Port (Interface)

use crate::domain::{Queue, QueueId, QueueLock};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Queue and QueueLock persistence.
///
/// Soft-deleted queues are invisible to every method. Name uniqueness
/// among active queues must be enforced by the store itself, not by a
/// lookup before the write.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Insert a new active queue
    ///
    /// Fails with `AppError::DuplicateName` when an active queue already has `name`.
    async fn insert(&self, name: &str, now_millis: i64) -> Result<Queue>;

    /// Find active queue by ID
    async fn find_by_id(&self, id: QueueId) -> Result<Option<Queue>>;

    /// Find active queue by exact (case-sensitive) name
    async fn find_by_name(&self, name: &str) -> Result<Option<Queue>>;

    /// All active queues ordered by ID
    async fn find_all(&self) -> Result<Vec<Queue>>;

    /// Rename an active queue
    ///
    /// Returns `None` when no active queue has `id`.
    /// Fails with `AppError::DuplicateName` on collision with another active queue.
    async fn rename(&self, id: QueueId, new_name: &str, now_millis: i64)
        -> Result<Option<Queue>>;

    /// Create the lock row if absent and return the current lock
    ///
    /// Returns `None` when no active queue has `id`.
    async fn lock(&self, id: QueueId, now_millis: i64) -> Result<Option<QueueLock>>;

    /// Remove the lock row if present
    ///
    /// Returns `false` when no active queue has `id`.
    async fn unlock(&self, id: QueueId) -> Result<bool>;

    /// Mark the queue deleted and drop its lock
    ///
    /// Returns `false` when no active queue has `id`.
    async fn soft_delete(&self, id: QueueId, now_millis: i64) -> Result<bool>;
}
