// In-memory store double for service tests

use crate::domain::{Job, JobId, Queue, QueueId, QueueLock};
use crate::error::{AppError, Result};
use crate::port::{
    JobRepository, JobRepositoryTransaction, QueueRepository, Transaction,
    TransactionalJobRepository,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct QueueRow {
    queue: Queue,
    is_deleted: bool,
}

#[derive(Default)]
struct State {
    next_queue_id: QueueId,
    queues: BTreeMap<QueueId, QueueRow>,
    locks: BTreeMap<QueueId, QueueLock>,
    jobs: Vec<Job>,
}

impl State {
    fn active(&self, id: QueueId) -> Option<Queue> {
        self.queues
            .get(&id)
            .filter(|row| !row.is_deleted)
            .map(|row| self.with_lock_flag(row.queue.clone()))
    }

    fn with_lock_flag(&self, mut queue: Queue) -> Queue {
        queue.is_locked = self.locks.contains_key(&queue.queue_id);
        queue
    }

    fn name_taken(&self, name: &str, except: Option<QueueId>) -> bool {
        self.queues
            .values()
            .any(|row| !row.is_deleted && row.queue.name == name && Some(row.queue.queue_id) != except)
    }
}

/// Arena-of-rows store. Each call takes the mutex briefly, so other calls can
/// interleave with an open transaction.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn lock_count(&self) -> usize {
        self.state.lock().unwrap().locks.len()
    }

    pub fn job_count(&self) -> usize {
        self.state.lock().unwrap().jobs.len()
    }

    /// Lock a queue synchronously (for racing a submission from a mock)
    pub fn lock_now(&self, id: QueueId) {
        let mut state = self.state.lock().unwrap();
        state.locks.entry(id).or_insert(QueueLock {
            queue_id: id,
            created_on: 0,
        });
    }
}

#[async_trait]
impl QueueRepository for InMemoryStore {
    async fn insert(&self, name: &str, now_millis: i64) -> Result<Queue> {
        let mut state = self.state.lock().unwrap();
        if state.name_taken(name, None) {
            return Err(AppError::DuplicateName(name.to_string()));
        }

        state.next_queue_id += 1;
        let queue = Queue {
            queue_id: state.next_queue_id,
            name: name.to_string(),
            created_on: now_millis,
            last_modified: now_millis,
            is_locked: false,
        };
        state.queues.insert(
            queue.queue_id,
            QueueRow {
                queue: queue.clone(),
                is_deleted: false,
            },
        );
        Ok(queue)
    }

    async fn find_by_id(&self, id: QueueId) -> Result<Option<Queue>> {
        Ok(self.state.lock().unwrap().active(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Queue>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .queues
            .values()
            .find(|row| !row.is_deleted && row.queue.name == name)
            .map(|row| state.with_lock_flag(row.queue.clone())))
    }

    async fn find_all(&self) -> Result<Vec<Queue>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .queues
            .values()
            .filter(|row| !row.is_deleted)
            .map(|row| state.with_lock_flag(row.queue.clone()))
            .collect())
    }

    async fn rename(
        &self,
        id: QueueId,
        new_name: &str,
        now_millis: i64,
    ) -> Result<Option<Queue>> {
        let mut state = self.state.lock().unwrap();
        if state.active(id).is_none() {
            return Ok(None);
        }
        if state.name_taken(new_name, Some(id)) {
            return Err(AppError::DuplicateName(new_name.to_string()));
        }

        if let Some(row) = state.queues.get_mut(&id) {
            row.queue.name = new_name.to_string();
            row.queue.last_modified = now_millis;
        }
        Ok(state.active(id))
    }

    async fn lock(&self, id: QueueId, now_millis: i64) -> Result<Option<QueueLock>> {
        let mut state = self.state.lock().unwrap();
        if state.active(id).is_none() {
            return Ok(None);
        }

        let lock = state.locks.entry(id).or_insert(QueueLock {
            queue_id: id,
            created_on: now_millis,
        });
        Ok(Some(lock.clone()))
    }

    async fn unlock(&self, id: QueueId) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.active(id).is_none() {
            return Ok(false);
        }
        state.locks.remove(&id);
        Ok(true)
    }

    async fn soft_delete(&self, id: QueueId, now_millis: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.active(id).is_none() {
            return Ok(false);
        }

        state.locks.remove(&id);
        if let Some(row) = state.queues.get_mut(&id) {
            row.is_deleted = true;
            row.queue.last_modified = now_millis;
        }
        Ok(true)
    }
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        let state = self.state.lock().unwrap();
        Ok(state.jobs.iter().find(|j| &j.job_id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Job>> {
        let mut jobs = self.state.lock().unwrap().jobs.clone();
        jobs.sort_by(|a, b| {
            a.created_on
                .cmp(&b.created_on)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        Ok(jobs)
    }
}

#[async_trait]
impl TransactionalJobRepository for InMemoryStore {
    async fn begin_transaction(&self) -> Result<Box<dyn JobRepositoryTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            store: self.clone(),
            staged: Vec::new(),
        }))
    }
}

struct InMemoryTransaction {
    store: InMemoryStore,
    staged: Vec<Job>,
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        let mut state = this.store.state.lock().unwrap();
        state.jobs.extend(this.staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl JobRepositoryTransaction for InMemoryTransaction {
    async fn insert(&mut self, job: &Job) -> Result<()> {
        let state = self.store.state.lock().unwrap();
        if state.active(job.queue_id).is_none() {
            return Err(AppError::QueueDoesNotExist(format!("id={}", job.queue_id)));
        }
        if state.locks.contains_key(&job.queue_id) {
            return Err(AppError::QueueLocked(format!("id={}", job.queue_id)));
        }
        drop(state);

        self.staged.push(job.clone());
        Ok(())
    }
}
