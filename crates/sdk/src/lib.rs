//! Jobdock SDK - Rust Client Library
//!
//! Provides a convenient client for the Jobdock daemon's JSON-RPC API.
//!
//! # Example
//!
//! ```no_run
//! use jobdock_sdk::{JobdockClient, SubmitJobRequest, Workflow};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JobdockClient::connect("http://127.0.0.1:9630").await?;
//!
//!     client.register_queue("tensorflow_cpu").await?;
//!
//!     let workflow = Workflow::from_bytes("workflows.tar.gz", b"...");
//!     let job = client
//!         .submit_job(SubmitJobRequest::new("tensorflow_cpu", "train", workflow))
//!         .await?;
//!
//!     println!("Job accepted: {}", job.job_id);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::JobdockClient;
pub use error::{code, Result, SdkError};
pub use types::{Job, Queue, QueueAck, QueueLock, SubmitJobRequest, Workflow};
