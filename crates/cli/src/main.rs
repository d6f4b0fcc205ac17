//! Jobdock CLI - Command-line interface for the Jobdock daemon

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "jobdock")]
#[command(about = "Jobdock CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "JOBDOCK_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage queues
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Submit and inspect jobs
    #[command(subcommand)]
    Job(JobCommand),

    /// Show daemon status
    Status,
}

#[derive(Subcommand)]
enum QueueCommand {
    /// List active queues
    List,

    /// Register a new queue
    Register {
        /// Queue name
        name: String,
    },

    /// Show one queue
    Get(QueueTarget),

    /// Rename a queue
    Rename {
        /// Queue ID
        queue_id: i64,

        /// New name
        name: String,
    },

    /// Lock a queue (refuse new submissions)
    Lock(QueueTarget),

    /// Unlock a queue
    Unlock(QueueTarget),

    /// Delete a queue (existing jobs are kept)
    Delete(QueueTarget),
}

#[derive(Args)]
struct QueueTarget {
    /// Queue ID, or name with --by-name
    queue: String,

    /// Treat QUEUE as a name even if it is numeric
    #[arg(long)]
    by_name: bool,
}

impl QueueTarget {
    /// Pick the by-ID or by-name variant of a method
    fn resolve(&self, by_id: &str, by_name: &str) -> (String, serde_json::Value) {
        match self.queue.parse::<i64>() {
            Ok(id) if !self.by_name => (by_id.to_string(), json!({ "queueId": id })),
            _ => (by_name.to_string(), json!({ "name": self.queue })),
        }
    }
}

#[derive(Subcommand)]
enum JobCommand {
    /// List all jobs, oldest first
    List,

    /// Show one job
    Get {
        /// Job ID
        job_id: String,
    },

    /// Submit a workflow archive to a queue
    Submit {
        /// Queue name
        #[arg(short, long)]
        queue: String,

        /// Entry point to run
        #[arg(short, long)]
        entry_point: String,

        /// Workflow archive (.tar, .tgz, .bz2, .gz, .xz)
        #[arg(short, long)]
        workflow: PathBuf,

        /// Experiment name
        #[arg(long)]
        experiment_name: Option<String>,

        /// Timeout, e.g. 30m, 3h, 1d
        #[arg(long)]
        timeout: Option<String>,

        /// Entry point keyword arguments
        #[arg(long)]
        entry_point_kwargs: Option<String>,

        /// Job dependencies
        #[arg(long)]
        depends_on: Option<String>,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    data: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueueDto {
    queue_id: i64,
    name: String,
    is_locked: bool,
    created_on: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobDto {
    job_id: String,
    queue_id: i64,
    payload_reference: String,
    metadata: serde_json::Map<String, serde_json::Value>,
    created_on: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockDto {
    queue_id: i64,
    created_on: DateTime<Utc>,
}

#[derive(Tabled)]
struct QueueRow {
    id: i64,
    name: String,
    locked: String,
    created: String,
    modified: String,
}

impl From<QueueDto> for QueueRow {
    fn from(q: QueueDto) -> Self {
        Self {
            id: q.queue_id,
            name: q.name,
            locked: if q.is_locked { "yes" } else { "no" }.to_string(),
            created: format_time(&q.created_on),
            modified: format_time(&q.last_modified),
        }
    }
}

#[derive(Tabled)]
struct JobRow {
    job_id: String,
    queue_id: i64,
    entry_point: String,
    created: String,
    payload: String,
}

impl From<JobDto> for JobRow {
    fn from(j: JobDto) -> Self {
        Self {
            job_id: j.job_id,
            queue_id: j.queue_id,
            entry_point: j
                .metadata
                .get("entry_point")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            created: format_time(&j.created_on),
            payload: j.payload_reference,
        }
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        match error.data {
            Some(data) => anyhow::bail!("RPC error ({}): {} {}", error.code, error.message, data),
            None => anyhow::bail!("RPC error ({}): {}", error.code, error.message),
        }
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

async fn fetch<T: serde::de::DeserializeOwned>(
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<T> {
    let result = call_rpc(url, method, params).await?;
    serde_json::from_value(result).context("Unexpected response shape")
}

fn print_queues(queues: Vec<QueueDto>) {
    let rows: Vec<QueueRow> = queues.into_iter().map(QueueRow::from).collect();
    println!("{}", Table::new(rows));
}

fn print_jobs(jobs: Vec<JobDto>) {
    let rows: Vec<JobRow> = jobs.into_iter().map(JobRow::from).collect();
    println!("{}", Table::new(rows));
}

async fn run_queue(url: &str, command: QueueCommand) -> Result<()> {
    match command {
        QueueCommand::List => {
            let queues: Vec<QueueDto> = fetch(url, "queue.list.v1", json!({})).await?;
            if queues.is_empty() {
                println!("{}", "No queues registered".yellow());
            } else {
                print_queues(queues);
            }
        }

        QueueCommand::Register { name } => {
            let queue: QueueDto = fetch(url, "queue.register.v1", json!({ "name": name })).await?;
            println!("{}", "✓ Queue registered".green().bold());
            println!();
            print_queues(vec![queue]);
        }

        QueueCommand::Get(target) => {
            let (method, params) = target.resolve("queue.get.v1", "queue.getByName.v1");
            let queue: QueueDto = fetch(url, &method, params).await?;
            print_queues(vec![queue]);
        }

        QueueCommand::Rename { queue_id, name } => {
            let queue: QueueDto = fetch(
                url,
                "queue.rename.v1",
                json!({ "queueId": queue_id, "name": name }),
            )
            .await?;
            println!("{}", "✓ Queue renamed".green().bold());
            println!();
            print_queues(vec![queue]);
        }

        QueueCommand::Lock(target) => {
            let (method, params) = target.resolve("queue.lock.v1", "queue.lockByName.v1");
            let lock: LockDto = fetch(url, &method, params).await?;
            println!(
                "{}",
                format!(
                    "✓ Queue {} locked since {}",
                    lock.queue_id,
                    format_time(&lock.created_on)
                )
                .green()
                .bold()
            );
        }

        QueueCommand::Unlock(target) => {
            let (method, params) = target.resolve("queue.unlock.v1", "queue.unlockByName.v1");
            let ack = call_rpc(url, &method, params).await?;
            println!("{}", format!("✓ Queue {} unlocked", ack["queueId"]).green().bold());
        }

        QueueCommand::Delete(target) => {
            let (method, params) = target.resolve("queue.delete.v1", "queue.deleteByName.v1");
            let ack = call_rpc(url, &method, params).await?;
            println!("{}", format!("✓ Queue {} deleted", ack["queueId"]).green().bold());
        }
    }

    Ok(())
}

async fn run_job(url: &str, command: JobCommand) -> Result<()> {
    match command {
        JobCommand::List => {
            let jobs: Vec<JobDto> = fetch(url, "job.list.v1", json!({})).await?;
            if jobs.is_empty() {
                println!("{}", "No jobs submitted".yellow());
            } else {
                print_jobs(jobs);
            }
        }

        JobCommand::Get { job_id } => {
            let job: JobDto = fetch(url, "job.get.v1", json!({ "jobId": job_id })).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&job.metadata).unwrap_or_default()
            );
            print_jobs(vec![job]);
        }

        JobCommand::Submit {
            queue,
            entry_point,
            workflow,
            experiment_name,
            timeout,
            entry_point_kwargs,
            depends_on,
        } => {
            let content = tokio::fs::read(&workflow)
                .await
                .with_context(|| format!("Failed to read {}", workflow.display()))?;
            let filename = workflow
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let params = json!({
                "queue": queue,
                "entryPoint": entry_point,
                "experimentName": experiment_name,
                "timeout": timeout,
                "entryPointKwargs": entry_point_kwargs,
                "dependsOn": depends_on,
                "workflow": {
                    "filename": filename,
                    "contentBase64": BASE64.encode(&content),
                },
            });

            let job: JobDto = fetch(url, "job.submit.v1", params).await?;
            println!("{}", "✓ Job submitted successfully".green().bold());
            println!();
            print_jobs(vec![job]);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Queue(command) => run_queue(&cli.rpc_url, command).await?,
        Commands::Job(command) => run_job(&cli.rpc_url, command).await?,

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            let queues = fetch::<Vec<QueueDto>>(&cli.rpc_url, "queue.list.v1", json!({})).await;
            let jobs = fetch::<Vec<JobDto>>(&cli.rpc_url, "job.list.v1", json!({})).await;

            match (queues, jobs) {
                (Ok(queues), Ok(jobs)) => {
                    let locked = queues.iter().filter(|q| q.is_locked).count();
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Queues:".bold(), queues.len());
                    println!("  {} {}", "Locked:".bold(), locked);
                    println!("  {} {}", "Jobs:".bold(), jobs.len());
                }
                (Err(e), _) | (_, Err(e)) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
