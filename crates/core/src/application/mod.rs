// Application Layer - Use Cases and Business Logic

pub mod job;
pub mod queue;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use job::{JobService, JobSubmission, RawJobForm, UploadedFile};
pub use queue::QueueService;
