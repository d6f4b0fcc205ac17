//! RPC Method Handlers
//!
//! Thin translation between wire types and the Queue/Job services.

use crate::error::to_rpc_error;
use crate::types::{
    GetJobRequest, JobResponse, LockResponse, QueueAck, QueueIdRequest, QueueNameRequest,
    QueueResponse, RenameQueueRequest, SubmitJobRequest,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jobdock_core::application::job::form::WORKFLOW_FIELD;
use jobdock_core::application::{JobService, QueueService, UploadedFile};
use jobdock_core::error::{AppError, FieldErrors};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected services
pub struct RpcHandler {
    queue_service: Arc<QueueService>,
    job_service: Arc<JobService>,
}

impl RpcHandler {
    pub fn new(queue_service: Arc<QueueService>, job_service: Arc<JobService>) -> Self {
        Self {
            queue_service,
            job_service,
        }
    }

    /// job.list.v1
    pub async fn list_jobs(&self) -> RpcResult<Vec<JobResponse>> {
        let jobs = self.job_service.get_all().await.map_err(to_rpc_error)?;
        Ok(jobs.into_iter().map(JobResponse::from).collect())
    }

    /// job.submit.v1
    pub async fn submit_job(&self, params: SubmitJobRequest) -> RpcResult<JobResponse> {
        let mut form = params.text_form();

        if let Some(upload) = params.workflow {
            let content = BASE64.decode(upload.content_base64.as_bytes()).map_err(|e| {
                to_rpc_error(AppError::FormValidation(FieldErrors::single(
                    WORKFLOW_FIELD,
                    format!("Invalid base64 content: {}", e),
                )))
            })?;
            form = form.file(UploadedFile::new(upload.filename, content));
        }

        let submission = self
            .job_service
            .extract_submission(form)
            .map_err(to_rpc_error)?;

        let job = self
            .job_service
            .submit(submission)
            .await
            .map_err(to_rpc_error)?;

        Ok(job.into())
    }

    /// job.get.v1
    pub async fn get_job(&self, params: GetJobRequest) -> RpcResult<JobResponse> {
        self.job_service
            .get_by_id(&params.job_id)
            .await
            .map_err(to_rpc_error)?
            .map(JobResponse::from)
            .ok_or_else(|| to_rpc_error(AppError::JobDoesNotExist(params.job_id)))
    }

    /// queue.list.v1
    pub async fn list_queues(&self) -> RpcResult<Vec<QueueResponse>> {
        let queues = self.queue_service.get_all().await.map_err(to_rpc_error)?;
        Ok(queues.into_iter().map(QueueResponse::from).collect())
    }

    /// queue.register.v1
    pub async fn register_queue(&self, params: QueueNameRequest) -> RpcResult<QueueResponse> {
        let queue = self
            .queue_service
            .register(&params.name)
            .await
            .map_err(to_rpc_error)?;
        Ok(queue.into())
    }

    /// queue.get.v1
    pub async fn get_queue(&self, params: QueueIdRequest) -> RpcResult<QueueResponse> {
        self.queue_service
            .get_by_id(params.queue_id)
            .await
            .map_err(to_rpc_error)?
            .map(QueueResponse::from)
            .ok_or_else(|| {
                to_rpc_error(AppError::QueueDoesNotExist(format!(
                    "id={}",
                    params.queue_id
                )))
            })
    }

    /// queue.getByName.v1
    pub async fn get_queue_by_name(&self, params: QueueNameRequest) -> RpcResult<QueueResponse> {
        self.queue_service
            .get_by_name(&params.name)
            .await
            .map_err(to_rpc_error)?
            .map(QueueResponse::from)
            .ok_or_else(|| {
                to_rpc_error(AppError::QueueDoesNotExist(format!(
                    "name={}",
                    params.name.trim()
                )))
            })
    }

    /// queue.rename.v1
    pub async fn rename_queue(&self, params: RenameQueueRequest) -> RpcResult<QueueResponse> {
        let queue = self
            .queue_service
            .rename(params.queue_id, &params.name)
            .await
            .map_err(to_rpc_error)?;
        Ok(queue.into())
    }

    /// queue.lock.v1
    pub async fn lock_queue(&self, params: QueueIdRequest) -> RpcResult<LockResponse> {
        let lock = self
            .queue_service
            .lock(params.queue_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(lock.into())
    }

    /// queue.unlock.v1
    pub async fn unlock_queue(&self, params: QueueIdRequest) -> RpcResult<QueueAck> {
        self.queue_service
            .unlock(params.queue_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(QueueAck {
            queue_id: params.queue_id,
        })
    }

    /// queue.delete.v1
    pub async fn delete_queue(&self, params: QueueIdRequest) -> RpcResult<QueueAck> {
        self.queue_service
            .delete(params.queue_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(QueueAck {
            queue_id: params.queue_id,
        })
    }

    /// queue.lockByName.v1
    pub async fn lock_queue_by_name(&self, params: QueueNameRequest) -> RpcResult<LockResponse> {
        let lock = self
            .queue_service
            .lock_by_name(&params.name)
            .await
            .map_err(to_rpc_error)?;
        Ok(lock.into())
    }

    /// queue.unlockByName.v1
    pub async fn unlock_queue_by_name(&self, params: QueueNameRequest) -> RpcResult<QueueAck> {
        let queue_id = self
            .queue_service
            .unlock_by_name(&params.name)
            .await
            .map_err(to_rpc_error)?;
        Ok(QueueAck { queue_id })
    }

    /// queue.deleteByName.v1
    pub async fn delete_queue_by_name(&self, params: QueueNameRequest) -> RpcResult<QueueAck> {
        let queue_id = self
            .queue_service
            .delete_by_name(&params.name)
            .await
            .map_err(to_rpc_error)?;
        Ok(QueueAck { queue_id })
    }
}
