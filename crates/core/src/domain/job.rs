// Job Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::queue::QueueId;

/// Job ID (UUID v4)
pub type JobId = String;

/// Metadata key under which the submission entry point is kept
pub const ENTRY_POINT_KEY: &str = "entry_point";

/// Opaque handle to a stored payload, assigned by the file storage adapter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadReference(String);

impl PayloadReference {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PayloadReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form submission metadata (JSON object), preserved verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobMetadata(serde_json::Map<String, serde_json::Value>);

impl JobMetadata {
    pub fn new(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.0.get(ENTRY_POINT_KEY).and_then(|v| v.as_str())
    }

    pub fn as_map(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }
}

/// Job Entity
///
/// Write-once: created by `JobService::submit`, never updated or deleted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub queue_id: QueueId,
    pub payload_reference: PayloadReference,
    pub metadata: JobMetadata,
    pub created_on: i64, // epoch ms
}

impl Job {
    /// Create a new Job
    ///
    /// # Arguments
    ///
    /// * `job_id` - Unique job ID (injected, not generated)
    /// * `created_on` - Creation timestamp in epoch ms (injected, not system time)
    /// * `queue_id` - Queue the job was accepted into
    /// * `payload_reference` - Handle returned by file storage
    /// * `metadata` - Submission metadata
    pub fn new(
        job_id: impl Into<String>,
        created_on: i64,
        queue_id: QueueId,
        payload_reference: PayloadReference,
        metadata: JobMetadata,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            queue_id,
            payload_reference,
            metadata,
            created_on,
        }
    }
}
