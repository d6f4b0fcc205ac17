// Queue Service - Queue lifecycle use cases

use crate::domain::{Queue, QueueId, QueueLock, QueueName};
use crate::error::{AppError, Result};
use crate::port::{QueueRepository, TimeProvider};
use std::sync::Arc;
use tracing::info;

/// Queue Service
///
/// Sole mutator of queues and queue locks. Soft-deleted queues behave as
/// absent for every operation here.
pub struct QueueService {
    queue_repo: Arc<dyn QueueRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl QueueService {
    pub fn new(queue_repo: Arc<dyn QueueRepository>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            queue_repo,
            time_provider,
        }
    }

    /// Register a new queue
    pub async fn register(&self, name: &str) -> Result<Queue> {
        let name = QueueName::parse(name)?;
        let now = self.time_provider.now_millis();

        let queue = self.queue_repo.insert(name.as_str(), now).await?;

        info!(queue_id = queue.queue_id, queue_name = %queue.name, "Queue registered");
        Ok(queue)
    }

    pub async fn get_by_id(&self, queue_id: QueueId) -> Result<Option<Queue>> {
        self.queue_repo.find_by_id(queue_id).await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Queue>> {
        self.queue_repo.find_by_name(name.trim()).await
    }

    /// All active queues ordered by ID
    pub async fn get_all(&self) -> Result<Vec<Queue>> {
        self.queue_repo.find_all().await
    }

    /// Rename an active queue
    pub async fn rename(&self, queue_id: QueueId, new_name: &str) -> Result<Queue> {
        let new_name = QueueName::parse(new_name)?;
        let now = self.time_provider.now_millis();

        let queue = self
            .queue_repo
            .rename(queue_id, new_name.as_str(), now)
            .await?
            .ok_or_else(|| queue_not_found(queue_id))?;

        info!(queue_id, queue_name = %queue.name, "Queue renamed");
        Ok(queue)
    }

    /// Lock a queue (idempotent: an existing lock is returned as is)
    pub async fn lock(&self, queue_id: QueueId) -> Result<QueueLock> {
        let now = self.time_provider.now_millis();

        let lock = self
            .queue_repo
            .lock(queue_id, now)
            .await?
            .ok_or_else(|| queue_not_found(queue_id))?;

        info!(queue_id, locked_since = lock.created_on, "Queue locked");
        Ok(lock)
    }

    /// Unlock a queue (idempotent: unlocking an unlocked queue is a no-op)
    pub async fn unlock(&self, queue_id: QueueId) -> Result<()> {
        if !self.queue_repo.unlock(queue_id).await? {
            return Err(queue_not_found(queue_id));
        }

        info!(queue_id, "Queue unlocked");
        Ok(())
    }

    /// Soft-delete a queue. Jobs that reference it stay valid.
    pub async fn delete(&self, queue_id: QueueId) -> Result<()> {
        let now = self.time_provider.now_millis();

        if !self.queue_repo.soft_delete(queue_id, now).await? {
            return Err(queue_not_found(queue_id));
        }

        info!(queue_id, "Queue deleted");
        Ok(())
    }

    pub async fn lock_by_name(&self, name: &str) -> Result<QueueLock> {
        let queue = self.require_by_name(name).await?;
        self.lock(queue.queue_id).await
    }

    /// Returns the ID of the queue that was unlocked
    pub async fn unlock_by_name(&self, name: &str) -> Result<QueueId> {
        let queue = self.require_by_name(name).await?;
        self.unlock(queue.queue_id).await?;
        Ok(queue.queue_id)
    }

    /// Returns the ID of the queue that was deleted
    pub async fn delete_by_name(&self, name: &str) -> Result<QueueId> {
        let queue = self.require_by_name(name).await?;
        self.delete(queue.queue_id).await?;
        Ok(queue.queue_id)
    }

    async fn require_by_name(&self, name: &str) -> Result<Queue> {
        self.get_by_name(name)
            .await?
            .ok_or_else(|| AppError::QueueDoesNotExist(format!("name={}", name.trim())))
    }
}

fn queue_not_found(queue_id: QueueId) -> AppError {
    AppError::QueueDoesNotExist(format!("id={}", queue_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::InMemoryStore;
    use crate::domain::DomainError;
    use crate::port::time_provider::ManualTimeProvider;

    fn service() -> (QueueService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::default());
        let clock = Arc::new(ManualTimeProvider::new(1_000, 1));
        (QueueService::new(store.clone(), clock), store)
    }

    #[tokio::test]
    async fn test_register_assigns_id_and_timestamps() {
        let (service, _) = service();

        let queue = service.register("tensorflow_cpu").await.unwrap();
        assert_eq!(queue.queue_id, 1);
        assert_eq!(queue.name, "tensorflow_cpu");
        assert_eq!(queue.created_on, queue.last_modified);
        assert!(!queue.is_locked);

        let second = service.register("pytorch_gpu").await.unwrap();
        assert_eq!(second.queue_id, 2);
    }

    #[tokio::test]
    async fn test_register_duplicate_name_fails() {
        let (service, _) = service();

        service.register("q1").await.unwrap();
        let err = service.register("q1").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(_)));

        // Case-sensitive match
        assert!(service.register("Q1").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_after_delete_succeeds() {
        let (service, _) = service();

        let first = service.register("q1").await.unwrap();
        service.delete(first.queue_id).await.unwrap();

        let second = service.register("q1").await.unwrap();
        assert_ne!(first.queue_id, second.queue_id);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_name() {
        let (service, _) = service();

        let err = service.register("  ").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidQueueName(_))
        ));
    }

    #[tokio::test]
    async fn test_get_by_id_round_trip() {
        let (service, _) = service();

        let created = service.register("tensorflow_cpu").await.unwrap();
        let found = service.get_by_id(created.queue_id).await.unwrap();
        assert_eq!(found, Some(created));

        assert_eq!(service.get_by_id(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_all_excludes_deleted_and_orders_by_id() {
        let (service, _) = service();

        let a = service.register("a").await.unwrap();
        let b = service.register("b").await.unwrap();
        let c = service.register("c").await.unwrap();
        service.delete(b.queue_id).await.unwrap();

        let ids: Vec<QueueId> = service
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.queue_id)
            .collect();
        assert_eq!(ids, vec![a.queue_id, c.queue_id]);
    }

    #[tokio::test]
    async fn test_rename_updates_last_modified() {
        let (service, _) = service();

        let created = service.register("old").await.unwrap();
        let renamed = service.rename(created.queue_id, "new").await.unwrap();

        assert_eq!(renamed.name, "new");
        assert_eq!(renamed.created_on, created.created_on);
        assert!(renamed.last_modified > created.last_modified);

        let found = service.get_by_id(created.queue_id).await.unwrap();
        assert_eq!(found, Some(renamed));
        assert!(service.get_by_name("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rename_collision_and_unknown_queue() {
        let (service, _) = service();

        let a = service.register("a").await.unwrap();
        service.register("b").await.unwrap();

        let err = service.rename(a.queue_id, "b").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(_)));

        let err = service.rename(42, "c").await.unwrap_err();
        assert!(matches!(err, AppError::QueueDoesNotExist(_)));

        // Renaming to its own name is allowed
        assert!(service.rename(a.queue_id, "a").await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_is_idempotent() {
        let (service, store) = service();

        let queue = service.register("q").await.unwrap();
        let first = service.lock(queue.queue_id).await.unwrap();
        let second = service.lock(queue.queue_id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.lock_count(), 1);

        let found = service.get_by_id(queue.queue_id).await.unwrap().unwrap();
        assert!(found.is_locked);
        // Locking leaves the queue record itself untouched
        assert_eq!(found.last_modified, queue.last_modified);
    }

    #[tokio::test]
    async fn test_unlock_never_locked_queue_is_noop() {
        let (service, _) = service();

        let queue = service.register("q").await.unwrap();
        service.unlock(queue.queue_id).await.unwrap();
        service.unlock(queue.queue_id).await.unwrap();

        let found = service.get_by_id(queue.queue_id).await.unwrap().unwrap();
        assert!(!found.is_locked);
    }

    #[tokio::test]
    async fn test_operations_on_unknown_queue_fail() {
        let (service, _) = service();

        assert!(matches!(
            service.lock(7).await.unwrap_err(),
            AppError::QueueDoesNotExist(_)
        ));
        assert!(matches!(
            service.unlock(7).await.unwrap_err(),
            AppError::QueueDoesNotExist(_)
        ));
        assert!(matches!(
            service.delete(7).await.unwrap_err(),
            AppError::QueueDoesNotExist(_)
        ));
    }

    #[tokio::test]
    async fn test_deleted_queue_is_invisible() {
        let (service, _) = service();

        let queue = service.register("q").await.unwrap();
        service.lock(queue.queue_id).await.unwrap();
        service.delete(queue.queue_id).await.unwrap();

        assert!(service.get_by_id(queue.queue_id).await.unwrap().is_none());
        assert!(service.get_by_name("q").await.unwrap().is_none());
        assert!(matches!(
            service.delete(queue.queue_id).await.unwrap_err(),
            AppError::QueueDoesNotExist(_)
        ));
    }

    #[tokio::test]
    async fn test_by_name_operations() {
        let (service, _) = service();

        let queue = service.register("tensorflow_cpu").await.unwrap();

        let lock = service.lock_by_name("tensorflow_cpu").await.unwrap();
        assert_eq!(lock.queue_id, queue.queue_id);

        let unlocked = service.unlock_by_name("tensorflow_cpu").await.unwrap();
        assert_eq!(unlocked, queue.queue_id);
        let found = service.get_by_name("tensorflow_cpu").await.unwrap().unwrap();
        assert!(!found.is_locked);

        let deleted = service.delete_by_name("tensorflow_cpu").await.unwrap();
        assert_eq!(deleted, queue.queue_id);
        assert!(matches!(
            service.lock_by_name("tensorflow_cpu").await.unwrap_err(),
            AppError::QueueDoesNotExist(_)
        ));
    }
}
