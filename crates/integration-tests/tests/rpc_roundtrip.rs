//! Daemon-shaped stack over HTTP, driven through the SDK

mod common;

use common::TestStack;
use jobdock_api_rpc::{RpcServer, RpcServerConfig};
use jobdock_sdk::{code, JobdockClient, SubmitJobRequest, Workflow};
use jsonrpsee::server::ServerHandle;

async fn start(stack: &TestStack) -> (JobdockClient, ServerHandle) {
    let server = RpcServer::new(
        RpcServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        stack.queue_service.clone(),
        stack.job_service.clone(),
    );
    let (addr, handle) = server.start().await.unwrap();
    let client = JobdockClient::connect(format!("http://{}", addr))
        .await
        .unwrap();
    (client, handle)
}

fn workflow() -> Workflow {
    Workflow::from_bytes("workflows.tar.gz", b"archive-bytes")
}

#[tokio::test]
async fn test_scenario_over_rpc() {
    let stack = TestStack::in_memory().await;
    let (client, _server) = start(&stack).await;

    let queue = client.register_queue("tensorflow_cpu").await.unwrap();
    assert_eq!(queue.queue_id, 1);
    assert!(!queue.is_locked);

    let stored = stack.queue_service.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(queue.created_on.timestamp_millis(), stored.created_on);
    assert_eq!(queue.last_modified.timestamp_millis(), stored.last_modified);

    let job = client
        .submit_job(
            SubmitJobRequest::new("tensorflow_cpu", "train", workflow()).timeout("3h"),
        )
        .await
        .unwrap();
    assert_eq!(job.queue_id, 1);
    assert_eq!(job.entry_point(), Some("train"));
    assert_eq!(job.metadata["timeout"], "3h");

    assert_eq!(client.get_job(job.job_id.clone()).await.unwrap(), job);
    assert_eq!(client.list_jobs().await.unwrap(), vec![job]);

    let lock = client.lock_queue(1).await.unwrap();
    assert_eq!(client.lock_queue(1).await.unwrap(), lock);

    let err = client
        .submit_job(SubmitJobRequest::new("tensorflow_cpu", "train", workflow()))
        .await
        .unwrap_err();
    assert!(err.is_queue_locked());

    client.unlock_queue_by_name("tensorflow_cpu").await.unwrap();
    client
        .submit_job(SubmitJobRequest::new("tensorflow_cpu", "train", workflow()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_errors_over_rpc() {
    let stack = TestStack::in_memory().await;
    let (client, _server) = start(&stack).await;

    client.register_queue("q").await.unwrap();
    let dup = client.register_queue("q").await.unwrap_err();
    assert_eq!(dup.rpc_code(), Some(code::DUPLICATE_NAME));

    assert!(client.get_queue(42).await.unwrap_err().is_not_found());
    assert!(client.get_job("missing").await.unwrap_err().is_not_found());

    let invalid = client
        .submit_job(SubmitJobRequest {
            queue: "q".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(invalid.rpc_code(), Some(code::VALIDATION_ERROR));
    let fields = invalid.invalid_fields();
    assert!(fields.contains(&"entry_point".to_string()));
    assert!(fields.contains(&"workflow".to_string()));
}

#[tokio::test]
async fn test_queue_management_over_rpc() {
    let stack = TestStack::in_memory().await;
    let (client, _server) = start(&stack).await;

    let queue = client.register_queue("a").await.unwrap();
    let renamed = client.rename_queue(queue.queue_id, "b").await.unwrap();
    assert_eq!(renamed.name, "b");
    assert_eq!(client.get_queue_by_name("b").await.unwrap(), renamed);

    client.lock_queue_by_name("b").await.unwrap();
    assert!(client.get_queue(queue.queue_id).await.unwrap().is_locked);

    let ack = client.delete_queue_by_name("b").await.unwrap();
    assert_eq!(ack.queue_id, queue.queue_id);
    assert!(client.list_queues().await.unwrap().is_empty());

    client.register_queue("b").await.unwrap();
}
