// Jobdock Infrastructure - SQLite Adapter
// Implements: QueueRepository, JobRepository, TransactionalJobRepository

mod connection;
mod error;
mod job_repository;
mod migration;
mod queue_repository;
mod transaction;

pub use connection::create_pool;
pub use job_repository::SqliteJobRepository;
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use transaction::SqliteJobTransaction;
