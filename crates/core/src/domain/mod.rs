// Domain Layer - Pure records and invariants

pub mod error;
pub mod job;
pub mod queue;

// Re-exports
pub use error::DomainError;
pub use job::{Job, JobId, JobMetadata, PayloadReference, ENTRY_POINT_KEY};
pub use queue::{Queue, QueueId, QueueLock, QueueName, MAX_QUEUE_NAME_LEN};
