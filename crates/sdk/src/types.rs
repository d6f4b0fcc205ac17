//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate. Timestamps arrive as
//! RFC 3339 strings and are parsed into `DateTime<Utc>`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Workflow archive attached to a submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub filename: String,
    pub content_base64: String,
}

impl Workflow {
    pub fn from_bytes(filename: impl Into<String>, content: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content_base64: BASE64.encode(content),
        }
    }

    /// Read an archive from disk; the file name is sent as the upload name
    pub async fn from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_bytes(filename, &content))
    }
}

/// Request to submit a job
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobRequest {
    pub queue: String,
    pub entry_point: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point_kwargs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
}

impl SubmitJobRequest {
    pub fn new(queue: impl Into<String>, entry_point: impl Into<String>, workflow: Workflow) -> Self {
        Self {
            queue: queue.into(),
            entry_point: entry_point.into(),
            workflow: Some(workflow),
            ..Default::default()
        }
    }

    pub fn experiment_name(mut self, value: impl Into<String>) -> Self {
        self.experiment_name = Some(value.into());
        self
    }

    pub fn timeout(mut self, value: impl Into<String>) -> Self {
        self.timeout = Some(value.into());
        self
    }

    pub fn entry_point_kwargs(mut self, value: impl Into<String>) -> Self {
        self.entry_point_kwargs = Some(value.into());
        self
    }

    pub fn depends_on(mut self, value: impl Into<String>) -> Self {
        self.depends_on = Some(value.into());
        self
    }
}

/// Accepted job
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub queue_id: i64,
    pub payload_reference: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_on: DateTime<Utc>,
}

impl Job {
    pub fn entry_point(&self) -> Option<&str> {
        self.metadata.get("entry_point").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
    pub queue_id: i64,
    pub name: String,
    pub is_locked: bool,
    pub created_on: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueLock {
    pub queue_id: i64,
    pub created_on: DateTime<Utc>,
}

/// Acknowledgement for unlock and delete
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueAck {
    pub queue_id: i64,
}
