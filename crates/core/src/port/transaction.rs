// Transaction port for atomic operations

use crate::domain::Job;
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional JobRepository operations
#[async_trait]
pub trait TransactionalJobRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn JobRepositoryTransaction>>;
}

/// Submission steps run within a single transaction
#[async_trait]
pub trait JobRepositoryTransaction: Transaction {
    /// Insert job (within transaction)
    ///
    /// The insert itself re-checks the target queue: it fails with
    /// `AppError::QueueLocked` if a lock exists at write time and with
    /// `AppError::QueueDoesNotExist` if the queue was deleted meanwhile.
    async fn insert(&mut self, job: &Job) -> Result<()>;
}
