//! Shared wiring for integration tests: real SQLite, real local storage

#![allow(dead_code)]

use jobdock_core::application::{JobService, JobSubmission, QueueService, RawJobForm, UploadedFile};
use jobdock_core::port::id_provider::UuidProvider;
use jobdock_core::port::time_provider::SystemTimeProvider;
use jobdock_infra_fs::LocalFileStorage;
use jobdock_infra_sqlite::{create_pool, run_migrations, SqliteJobRepository, SqliteQueueRepository};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestStack {
    pub pool: SqlitePool,
    pub queue_service: Arc<QueueService>,
    pub job_service: Arc<JobService>,
    pub storage_root: PathBuf,
    _tmp: TempDir,
}

impl TestStack {
    /// In-memory database, single connection
    pub async fn in_memory() -> Self {
        Self::build(None).await
    }

    /// File-backed database in WAL mode, pooled connections
    pub async fn file_backed() -> Self {
        Self::build(Some("jobdock.db")).await
    }

    async fn build(db_file: Option<&str>) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let url = match db_file {
            Some(name) => format!("sqlite://{}", tmp.path().join(name).display()),
            None => "sqlite::memory:".to_string(),
        };

        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let storage = LocalFileStorage::new(tmp.path().join("artifacts"))
            .await
            .unwrap();
        let storage_root = storage.root().to_path_buf();

        let time_provider = Arc::new(SystemTimeProvider);
        let queue_service = Arc::new(QueueService::new(
            Arc::new(SqliteQueueRepository::new(pool.clone())),
            time_provider.clone(),
        ));
        let job_repo = Arc::new(SqliteJobRepository::new(pool.clone()));
        let job_service = Arc::new(JobService::new(
            queue_service.clone(),
            job_repo.clone(),
            job_repo,
            Arc::new(storage),
            Arc::new(UuidProvider),
            time_provider,
        ));

        Self {
            pool,
            queue_service,
            job_service,
            storage_root,
            _tmp: tmp,
        }
    }

    /// Number of payload directories left in the storage root
    pub fn stored_payloads(&self) -> usize {
        std::fs::read_dir(&self.storage_root)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn job_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn lock_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM queue_locks")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub fn form(queue: &str) -> RawJobForm {
    RawJobForm::new()
        .field("queue", queue)
        .field("entry_point", "train")
        .field("entry_point_kwargs", "-P epochs=3")
        .file(UploadedFile::new("workflows.tar.gz", b"archive-bytes".to_vec()))
}

pub fn submission(stack: &TestStack, queue: &str) -> JobSubmission {
    stack.job_service.extract_submission(form(queue)).unwrap()
}
