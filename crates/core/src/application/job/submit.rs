// Submit Use Case

use crate::application::job::form::JobSubmission;
use crate::application::queue::QueueService;
use crate::domain::{Job, PayloadReference};
use crate::error::{AppError, Result};
use crate::port::{
    FileStorage, IdProvider, JobRepositoryTransaction, TimeProvider, TransactionalJobRepository,
};
use tracing::{info, warn};

/// Execute submit use case
///
/// Either both the stored payload and the job row exist afterwards, or
/// neither does.
///
/// # Arguments
///
/// * `queue_service` - Resolves and checks the target queue
/// * `job_repo` - Transactional job repository
/// * `file_storage` - Payload storage
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `submission` - Validated submission
pub async fn execute(
    queue_service: &QueueService,
    job_repo: &dyn TransactionalJobRepository,
    file_storage: &dyn FileStorage,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    submission: JobSubmission,
) -> Result<Job> {
    let JobSubmission {
        queue_name,
        metadata,
        file,
    } = submission;

    // 1. Resolve queue
    let queue = queue_service
        .get_by_name(queue_name.as_str())
        .await?
        .ok_or_else(|| AppError::QueueDoesNotExist(format!("name={}", queue_name)))?;

    // 2. Lock policy
    if queue.is_locked {
        warn!(queue_id = queue.queue_id, queue_name = %queue.name, "Submission rejected: queue locked");
        return Err(AppError::QueueLocked(queue.name));
    }

    // 3. Persist payload
    let payload_reference = file_storage
        .save(&file.content, &file.filename)
        .await
        .map_err(into_storage_error)?;

    // 4. Insert job row; the insert re-checks the queue so a concurrent lock is caught here
    let job = Job::new(
        id_provider.generate_id(),
        time_provider.now_millis(),
        queue.queue_id,
        payload_reference,
        metadata,
    );

    let tx = match job_repo.begin_transaction().await {
        Ok(tx) => tx,
        Err(err) => {
            discard_payload(file_storage, &job.payload_reference).await;
            return Err(err);
        }
    };

    if let Err(err) = insert_and_commit(tx, &job).await {
        if matches!(err, AppError::QueueLocked(_)) {
            warn!(queue_id = queue.queue_id, job_id = %job.job_id, "Queue locked during submission");
        }
        discard_payload(file_storage, &job.payload_reference).await;
        return Err(match err {
            AppError::QueueLocked(_) => AppError::QueueLocked(queue.name),
            other => other,
        });
    }

    info!(
        job_id = %job.job_id,
        queue_id = job.queue_id,
        payload_reference = %job.payload_reference,
        "Job submitted"
    );
    Ok(job)
}

async fn insert_and_commit(mut tx: Box<dyn JobRepositoryTransaction>, job: &Job) -> Result<()> {
    if let Err(err) = tx.insert(job).await {
        if let Err(rollback_err) = tx.rollback().await {
            warn!(error = %rollback_err, "Rollback failed after rejected insert");
        }
        return Err(err);
    }

    tx.commit().await
}

async fn discard_payload(file_storage: &dyn FileStorage, reference: &PayloadReference) {
    if let Err(err) = file_storage.remove(reference).await {
        warn!(payload_reference = %reference, error = %err, "Failed to remove orphaned payload");
    }
}

fn into_storage_error(err: AppError) -> AppError {
    match err {
        AppError::Storage(_) => err,
        other => AppError::Storage(other.to_string()),
    }
}
