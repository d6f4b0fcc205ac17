//! RPC Request/Response Types
//!
//! Wire names are camelCase. Timestamps are RFC 3339 strings in UTC.

use jobdock_core::application::job::form::{
    DEPENDS_ON_FIELD, ENTRY_POINT_FIELD, ENTRY_POINT_KWARGS_FIELD, EXPERIMENT_NAME_FIELD,
    QUEUE_FIELD, TIMEOUT_FIELD,
};
use jobdock_core::application::RawJobForm;
use chrono::{DateTime, SecondsFormat};
use jobdock_core::domain::{Job, JobMetadata, Queue, QueueId, QueueLock};
use serde::{Deserialize, Serialize};

/// Render an epoch-ms timestamp as RFC 3339 with millisecond precision
pub fn rfc3339(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// job.submit.v1
///
/// Every field is optional on the wire so that form validation can report
/// all missing fields at once.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobRequest {
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub entry_point: Option<String>,
    #[serde(default)]
    pub experiment_name: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub entry_point_kwargs: Option<String>,
    #[serde(default)]
    pub depends_on: Option<String>,
    #[serde(default)]
    pub workflow: Option<WorkflowUpload>,
}

/// Workflow archive carried inline
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowUpload {
    pub filename: String,
    pub content_base64: String,
}

impl SubmitJobRequest {
    /// Text part of the form; the file part is decoded separately
    pub fn text_form(&self) -> RawJobForm {
        let text_fields = [
            (QUEUE_FIELD, &self.queue),
            (ENTRY_POINT_FIELD, &self.entry_point),
            (EXPERIMENT_NAME_FIELD, &self.experiment_name),
            (TIMEOUT_FIELD, &self.timeout),
            (ENTRY_POINT_KWARGS_FIELD, &self.entry_point_kwargs),
            (DEPENDS_ON_FIELD, &self.depends_on),
        ];

        text_fields
            .into_iter()
            .fold(RawJobForm::new(), |form, (name, value)| match value {
                Some(v) => form.field(name, v.as_str()),
                None => form,
            })
    }
}

/// job.get.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetJobRequest {
    pub job_id: String,
}

/// queue.get.v1, queue.lock.v1, queue.unlock.v1, queue.delete.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueIdRequest {
    pub queue_id: QueueId,
}

/// queue.register.v1, queue.getByName.v1 and the *ByName.v1 mutations
#[derive(Debug, Deserialize)]
pub struct QueueNameRequest {
    pub name: String,
}

/// queue.rename.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameQueueRequest {
    pub queue_id: QueueId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub job_id: String,
    pub queue_id: QueueId,
    pub payload_reference: String,
    pub metadata: JobMetadata,
    pub created_on: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            queue_id: job.queue_id,
            payload_reference: job.payload_reference.as_str().to_string(),
            metadata: job.metadata,
            created_on: rfc3339(job.created_on),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub queue_id: QueueId,
    pub name: String,
    pub is_locked: bool,
    pub created_on: String,
    pub last_modified: String,
}

impl From<Queue> for QueueResponse {
    fn from(queue: Queue) -> Self {
        Self {
            queue_id: queue.queue_id,
            name: queue.name,
            is_locked: queue.is_locked,
            created_on: rfc3339(queue.created_on),
            last_modified: rfc3339(queue.last_modified),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResponse {
    pub queue_id: QueueId,
    pub created_on: String,
}

impl From<QueueLock> for LockResponse {
    fn from(lock: QueueLock) -> Self {
        Self {
            queue_id: lock.queue_id,
            created_on: rfc3339(lock.created_on),
        }
    }
}

/// Acknowledgement for unlock and delete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueAck {
    pub queue_id: QueueId,
}
