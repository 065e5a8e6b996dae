use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tideps::dag::{DagRun, TaskInstance, TaskInstanceKey};
use tideps::errors::{Result, TidepsError};
use tideps::store::{HistoryStore, InMemoryHistory};

/// A [`HistoryStore`] wrapper that:
/// - counts history reads and flag writes
/// - can be switched to fail every read, like a dropped connection.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: InMemoryHistory,
    reads: AtomicUsize,
    flag_writes: AtomicUsize,
    fail_reads: AtomicBool,
}

impl CountingStore {
    pub fn new(inner: InMemoryHistory) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &InMemoryHistory {
        &self.inner
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn flag_writes(&self) -> usize {
        self.flag_writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, val: bool) {
        self.fail_reads.store(val, Ordering::SeqCst);
    }

    fn read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TidepsError::store("connection refused"));
        }
        Ok(())
    }
}

impl HistoryStore for CountingStore {
    fn get_dagrun(&self, dag_id: &str, run_id: &str) -> Result<Option<DagRun>> {
        self.read()?;
        self.inner.get_dagrun(dag_id, run_id)
    }

    fn get_previous_dagrun(&self, dag_run: &DagRun, by_schedule_order: bool) -> Result<Option<DagRun>> {
        self.read()?;
        self.inner.get_previous_dagrun(dag_run, by_schedule_order)
    }

    fn get_task_instances(&self, dag_run: &DagRun, task_id: &str) -> Result<Vec<TaskInstance>> {
        self.read()?;
        self.inner.get_task_instances(dag_run, task_id)
    }

    fn count_prior_instances(&self, dag_id: &str, task_id: &str, before: DateTime<Utc>) -> Result<usize> {
        self.read()?;
        self.inner.count_prior_instances(dag_id, task_id, before)
    }

    fn are_downstream_dependents_done(&self, ti: &TaskInstance, downstream_task_ids: &[String]) -> Result<bool> {
        self.read()?;
        self.inner.are_downstream_dependents_done(ti, downstream_task_ids)
    }

    fn record_flag(&self, ti: &TaskInstanceKey, key: &str, value: bool) -> Result<()> {
        self.flag_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.record_flag(ti, key, value)
    }

    fn get_flag(&self, ti: &TaskInstanceKey, key: &str) -> Result<Option<bool>> {
        self.inner.get_flag(ti, key)
    }
}
