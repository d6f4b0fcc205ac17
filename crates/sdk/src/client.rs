//! Jobdock Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{Job, Queue, QueueAck, QueueLock, SubmitJobRequest};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Jobdock Client
///
/// Typed access to the queue and job methods of a running daemon.
///
/// # Example
///
/// ```no_run
/// use jobdock_sdk::JobdockClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = JobdockClient::connect("http://127.0.0.1:9630").await?;
/// let queue = client.register_queue("tensorflow_cpu").await?;
/// println!("Queue {} registered", queue.queue_id);
/// # Ok(())
/// # }
/// ```
pub struct JobdockClient {
    client: HttpClient,
}

impl JobdockClient {
    /// Connect to a Jobdock daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9630`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .max_request_size(64 * 1024 * 1024)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: ObjectParams) -> Result<T> {
        Ok(self.client.request(method, params).await?)
    }

    /// List every accepted job, oldest first
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        Ok(self.client.request("job.list.v1", rpc_params![]).await?)
    }

    /// Submit a job
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use jobdock_sdk::{JobdockClient, SubmitJobRequest, Workflow};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = JobdockClient::connect("http://127.0.0.1:9630").await?;
    /// let workflow = Workflow::from_path("workflows.tar.gz").await?;
    /// let job = client
    ///     .submit_job(SubmitJobRequest::new("tensorflow_cpu", "train", workflow).timeout("3h"))
    ///     .await?;
    /// println!("Job ID: {}", job.job_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_job(&self, request: SubmitJobRequest) -> Result<Job> {
        self.call("job.submit.v1", object_params(&request)?).await
    }

    pub async fn get_job(&self, job_id: impl Into<String>) -> Result<Job> {
        let params = object_params(&json!({ "jobId": job_id.into() }))?;
        self.call("job.get.v1", params).await
    }

    /// List active queues
    pub async fn list_queues(&self) -> Result<Vec<Queue>> {
        Ok(self.client.request("queue.list.v1", rpc_params![]).await?)
    }

    pub async fn register_queue(&self, name: impl Into<String>) -> Result<Queue> {
        self.call("queue.register.v1", name_params(name)?).await
    }

    pub async fn get_queue(&self, queue_id: i64) -> Result<Queue> {
        self.call("queue.get.v1", id_params(queue_id)?).await
    }

    pub async fn get_queue_by_name(&self, name: impl Into<String>) -> Result<Queue> {
        self.call("queue.getByName.v1", name_params(name)?).await
    }

    pub async fn rename_queue(&self, queue_id: i64, name: impl Into<String>) -> Result<Queue> {
        let params = object_params(&json!({ "queueId": queue_id, "name": name.into() }))?;
        self.call("queue.rename.v1", params).await
    }

    /// Lock a queue; locking an already locked queue returns the existing lock
    pub async fn lock_queue(&self, queue_id: i64) -> Result<QueueLock> {
        self.call("queue.lock.v1", id_params(queue_id)?).await
    }

    pub async fn unlock_queue(&self, queue_id: i64) -> Result<QueueAck> {
        self.call("queue.unlock.v1", id_params(queue_id)?).await
    }

    pub async fn delete_queue(&self, queue_id: i64) -> Result<QueueAck> {
        self.call("queue.delete.v1", id_params(queue_id)?).await
    }

    pub async fn lock_queue_by_name(&self, name: impl Into<String>) -> Result<QueueLock> {
        self.call("queue.lockByName.v1", name_params(name)?).await
    }

    pub async fn unlock_queue_by_name(&self, name: impl Into<String>) -> Result<QueueAck> {
        self.call("queue.unlockByName.v1", name_params(name)?).await
    }

    pub async fn delete_queue_by_name(&self, name: impl Into<String>) -> Result<QueueAck> {
        self.call("queue.deleteByName.v1", name_params(name)?).await
    }
}

/// Send a serializable struct as named parameters
fn object_params<T: Serialize>(value: &T) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                params.insert(&key, value)?;
            }
            Ok(params)
        }
        other => Err(SdkError::Other(format!(
            "Parameters must be an object, got {}",
            other
        ))),
    }
}

fn id_params(queue_id: i64) -> Result<ObjectParams> {
    object_params(&json!({ "queueId": queue_id }))
}

fn name_params(name: impl Into<String>) -> Result<ObjectParams> {
    object_params(&json!({ "name": name.into() }))
}
