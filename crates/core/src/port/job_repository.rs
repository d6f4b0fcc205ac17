// Job Repository Port (Interface)

use crate::domain::{Job, JobId};
use crate::error::Result;
use async_trait::async_trait;

/// Read-side repository for Job records.
///
/// Jobs are only written through [`crate::port::JobRepositoryTransaction`].
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// All jobs, oldest first (ties broken by job ID)
    async fn find_all(&self) -> Result<Vec<Job>>;
}
