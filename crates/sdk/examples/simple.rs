//! Simple SDK Example
//!
//! Registers a queue, submits a job to it, then locks the queue and shows
//! that further submissions are refused.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package jobdock-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple
//!    ```

use jobdock_sdk::{JobdockClient, SubmitJobRequest, Workflow};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Jobdock SDK - Simple Example");
    println!("============================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = JobdockClient::connect("http://127.0.0.1:9630").await?;
    println!("   ✓ Connected\n");

    // 2. Register a queue (reuse it if it already exists)
    println!("2. Registering queue 'tensorflow_cpu'...");
    let queue = match client.register_queue("tensorflow_cpu").await {
        Ok(queue) => queue,
        Err(_) => client.get_queue_by_name("tensorflow_cpu").await?,
    };
    println!("   ✓ Queue ID: {}\n", queue.queue_id);

    // 3. Submit a job
    println!("3. Submitting a job...");
    let workflow = Workflow::from_bytes("workflows.tar.gz", b"example workflow archive");
    let job = client
        .submit_job(
            SubmitJobRequest::new("tensorflow_cpu", "train", workflow)
                .entry_point_kwargs("-P epochs=3")
                .timeout("3h"),
        )
        .await?;

    println!("   ✓ Job accepted:");
    println!("     - ID: {}", job.job_id);
    println!("     - Payload: {}\n", job.payload_reference);

    // 4. Lock the queue and try again
    println!("4. Locking queue and submitting again...");
    client.lock_queue(queue.queue_id).await?;

    let workflow = Workflow::from_bytes("workflows.tar.gz", b"example workflow archive");
    match client
        .submit_job(SubmitJobRequest::new("tensorflow_cpu", "train", workflow))
        .await
    {
        Err(e) if e.is_queue_locked() => println!("   ✓ Refused: {}\n", e),
        Err(e) => return Err(e.into()),
        Ok(job) => println!("   ⚠ Unexpectedly accepted job {}\n", job.job_id),
    }

    // 5. Unlock again
    client.unlock_queue(queue.queue_id).await?;
    println!("5. Queue unlocked");

    println!("\n✓ Example completed successfully!");

    Ok(())
}
