// Job Service - Core use cases for job submission and lookup

pub mod form;
pub mod submit;

pub use form::{JobSubmission, RawJobForm, UploadedFile};

use crate::application::queue::QueueService;
use crate::domain::{Job, JobId};
use crate::error::Result;
use crate::port::{
    FileStorage, IdProvider, JobRepository, TimeProvider, TransactionalJobRepository,
};
use std::sync::Arc;

/// Job Service
pub struct JobService {
    queue_service: Arc<QueueService>,
    job_repo: Arc<dyn JobRepository>,
    tx_job_repo: Arc<dyn TransactionalJobRepository>,
    file_storage: Arc<dyn FileStorage>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl JobService {
    pub fn new(
        queue_service: Arc<QueueService>,
        job_repo: Arc<dyn JobRepository>,
        tx_job_repo: Arc<dyn TransactionalJobRepository>,
        file_storage: Arc<dyn FileStorage>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            queue_service,
            job_repo,
            tx_job_repo,
            file_storage,
            id_provider,
            time_provider,
        }
    }

    /// Validate a raw submission form (no side effects)
    pub fn extract_submission(&self, form: RawJobForm) -> Result<JobSubmission> {
        form::extract(form)
    }

    /// Submit a validated job
    pub async fn submit(&self, submission: JobSubmission) -> Result<Job> {
        submit::execute(
            self.queue_service.as_ref(),
            self.tx_job_repo.as_ref(),
            self.file_storage.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            submission,
        )
        .await
    }

    pub async fn get_by_id(&self, job_id: &JobId) -> Result<Option<Job>> {
        self.job_repo.find_by_id(job_id).await
    }

    /// All jobs, oldest first
    pub async fn get_all(&self) -> Result<Vec<Job>> {
        self.job_repo.find_all().await
    }
}
