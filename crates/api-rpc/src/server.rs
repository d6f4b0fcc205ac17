//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP. Binds to localhost by default.

use crate::handler::RpcHandler;
use crate::types::{
    GetJobRequest, QueueIdRequest, QueueNameRequest, RenameQueueRequest, SubmitJobRequest,
};
use jobdock_core::application::{JobService, QueueService};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9630;

// Workflow archives travel inline as base64
const MAX_REQUEST_BODY_BYTES: u32 = 64 * 1024 * 1024;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Register one async method. Each call runs inside an `rpc` span with a
/// fresh request_id.
macro_rules! register {
    ($module:expr, $handler:expr, $name:literal, $method:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($name, move |_, _, _| {
                let handler = handler.clone();
                let span = info_span!("rpc", method = $name, request_id = %uuid::Uuid::new_v4());
                async move {
                    info!("RPC request");
                    let result = handler.$method().await;
                    if let Err(e) = &result {
                        debug!(code = e.code(), error = %e.message(), "RPC request failed");
                    }
                    result
                }
                .instrument(span)
            })
            .map_err(|e| e.to_string())?;
    }};
    ($module:expr, $handler:expr, $name:literal, $method:ident, $req:ty) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($name, move |params, _, _| {
                let handler = handler.clone();
                let span = info_span!("rpc", method = $name, request_id = %uuid::Uuid::new_v4());
                async move {
                    info!("RPC request");
                    let req: $req = params.parse()?;
                    let result = handler.$method(req).await;
                    if let Err(e) = &result {
                        debug!(code = e.code(), error = %e.message(), "RPC request failed");
                    }
                    result
                }
                .instrument(span)
            })
            .map_err(|e| e.to_string())?;
    }};
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        queue_service: Arc<QueueService>,
        job_service: Arc<JobService>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(queue_service, job_service)),
        }
    }

    /// Build the method table
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());
        let handler = &self.handler;

        register!(module, handler, "job.list.v1", list_jobs);
        register!(module, handler, "job.submit.v1", submit_job, SubmitJobRequest);
        register!(module, handler, "job.get.v1", get_job, GetJobRequest);

        register!(module, handler, "queue.list.v1", list_queues);
        register!(module, handler, "queue.register.v1", register_queue, QueueNameRequest);
        register!(module, handler, "queue.get.v1", get_queue, QueueIdRequest);
        register!(module, handler, "queue.getByName.v1", get_queue_by_name, QueueNameRequest);
        register!(module, handler, "queue.rename.v1", rename_queue, RenameQueueRequest);
        register!(module, handler, "queue.lock.v1", lock_queue, QueueIdRequest);
        register!(module, handler, "queue.unlock.v1", unlock_queue, QueueIdRequest);
        register!(module, handler, "queue.delete.v1", delete_queue, QueueIdRequest);
        register!(module, handler, "queue.lockByName.v1", lock_queue_by_name, QueueNameRequest);
        register!(module, handler, "queue.unlockByName.v1", unlock_queue_by_name, QueueNameRequest);
        register!(module, handler, "queue.deleteByName.v1", delete_queue_by_name, QueueNameRequest);

        Ok(module)
    }

    /// Start the JSON-RPC server; returns the bound address and its handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .max_request_body_size(MAX_REQUEST_BODY_BYTES)
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started successfully");
        Ok((local_addr, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdock_core::port::id_provider::UuidProvider;
    use jobdock_core::port::time_provider::SystemTimeProvider;
    use jobdock_infra_fs::LocalFileStorage;
    use jobdock_infra_sqlite::{
        create_pool, run_migrations, SqliteJobRepository, SqliteQueueRepository,
    };
    use jsonrpsee::core::params::ObjectParams;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    async fn server(tmp: &tempfile::TempDir) -> RpcServer {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let queue_service = Arc::new(QueueService::new(
            Arc::new(SqliteQueueRepository::new(pool.clone())),
            Arc::new(SystemTimeProvider),
        ));
        let job_repo = Arc::new(SqliteJobRepository::new(pool));
        let job_service = Arc::new(JobService::new(
            queue_service.clone(),
            job_repo.clone(),
            job_repo,
            Arc::new(LocalFileStorage::new(tmp.path()).await.unwrap()),
            Arc::new(UuidProvider),
            Arc::new(SystemTimeProvider),
        ));

        RpcServer::new(
            RpcServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            queue_service,
            job_service,
        )
    }

    #[tokio::test]
    async fn test_module_exposes_every_method() {
        let tmp = tempfile::tempdir().unwrap();
        let module = server(&tmp).await.module().unwrap();

        let names: Vec<&str> = module.method_names().collect();
        for expected in [
            "job.list.v1",
            "job.submit.v1",
            "job.get.v1",
            "queue.list.v1",
            "queue.register.v1",
            "queue.get.v1",
            "queue.getByName.v1",
            "queue.rename.v1",
            "queue.lock.v1",
            "queue.unlock.v1",
            "queue.delete.v1",
            "queue.lockByName.v1",
            "queue.unlockByName.v1",
            "queue.deleteByName.v1",
        ] {
            assert!(names.contains(&expected), "missing method {}", expected);
        }
    }

    #[tokio::test]
    async fn test_register_through_module() {
        let tmp = tempfile::tempdir().unwrap();
        let module = server(&tmp).await.module().unwrap();

        let mut params = ObjectParams::new();
        params.insert("name", "tensorflow_cpu").unwrap();
        let queue: serde_json::Value = module.call("queue.register.v1", params).await.unwrap();
        assert_eq!(queue["name"], "tensorflow_cpu");
        assert_eq!(queue["isLocked"], false);

        let queues: Vec<serde_json::Value> = module
            .call("queue.list.v1", jsonrpsee::rpc_params![])
            .await
            .unwrap();
        assert_eq!(queues.len(), 1);
    }

    #[tokio::test]
    async fn test_request_line_logged_at_info() {
        let tmp = tempfile::tempdir().unwrap();
        let module = server(&tmp).await.module().unwrap();

        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let _: Vec<serde_json::Value> = module
            .call("queue.list.v1", jsonrpsee::rpc_params![])
            .await
            .unwrap();

        let output = log.contents();
        assert!(output.contains("RPC request"), "no request line in {:?}", output);
        assert!(output.contains("queue.list.v1"));
    }
}
