// src/store/memory.rs

//! In-memory [`HistoryStore`].
//!
//! Backs the CLI (built from a scenario file) and the test suite. State
//! lives behind a single `RwLock`; nothing is persisted.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::HistoryStore;
use crate::config::model::ConfigFile;
use crate::dag::{DagRun, TaskInstance, TaskInstanceKey};
use crate::errors::{Result, TidepsError};
use crate::types::{DagRunState, TaskInstanceState};

#[derive(Debug, Default)]
struct Inner {
    /// Runs in creation order (row ids strictly increasing).
    dag_runs: Vec<DagRun>,
    task_instances: BTreeMap<TaskInstanceKey, TaskInstance>,
    flags: HashMap<(TaskInstanceKey, String), bool>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryHistory {
    inner: RwLock<Inner>,
}

fn poison_err<T>(_: PoisonError<T>) -> TidepsError {
    TidepsError::store("lock poisoned")
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate a store from a validated scenario. Runs get row ids in the
    /// order they are listed.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let store = Self::new();
        let dag_id = cfg.dag.dag_id.as_str();

        for dr in &cfg.dag_run {
            store.create_dagrun(dag_id, &dr.run_id, dr.execution_date, dr.state)?;
        }

        for tic in &cfg.task_instance {
            let dr = cfg.dag_run(&tic.run_id).ok_or_else(|| {
                TidepsError::DagRunNotFound(format!("{dag_id}/{}", tic.run_id))
            })?;
            let ti = TaskInstance::new(dag_id, &tic.task_id, &tic.run_id, dr.execution_date, tic.state)
                .with_map_index(tic.map_index);
            store.upsert_task_instance(ti)?;
        }

        Ok(store)
    }

    /// Append a DAG run, assigning the next row id.
    pub fn create_dagrun(
        &self,
        dag_id: &str,
        run_id: &str,
        execution_date: DateTime<Utc>,
        state: DagRunState,
    ) -> Result<DagRun> {
        let mut inner = self.inner.write().map_err(poison_err)?;

        if inner
            .dag_runs
            .iter()
            .any(|dr| dr.dag_id == dag_id && dr.run_id == run_id)
        {
            return Err(TidepsError::store(format!(
                "dag run {dag_id}/{run_id} already exists"
            )));
        }

        if let Some(other) = inner
            .dag_runs
            .iter()
            .find(|dr| dr.dag_id == dag_id && dr.execution_date == execution_date)
        {
            return Err(TidepsError::store(format!(
                "dag run {dag_id}/{run_id} has the same execution_date as {} ({execution_date})",
                other.run_id
            )));
        }

        inner.next_id += 1;
        let dag_run = DagRun::new(inner.next_id, dag_id, run_id, execution_date, state);
        inner.dag_runs.push(dag_run.clone());
        debug!(dag_id, run_id, id = dag_run.id, "created dag run");
        Ok(dag_run)
    }

    /// Insert or replace a task instance. Its DAG run must exist.
    pub fn upsert_task_instance(&self, ti: TaskInstance) -> Result<()> {
        let mut inner = self.inner.write().map_err(poison_err)?;

        if !inner
            .dag_runs
            .iter()
            .any(|dr| dr.dag_id == ti.dag_id && dr.run_id == ti.run_id)
        {
            return Err(TidepsError::DagRunNotFound(format!(
                "{}/{}",
                ti.dag_id, ti.run_id
            )));
        }

        inner.task_instances.insert(ti.key(), ti);
        Ok(())
    }

    pub fn set_state(&self, key: &TaskInstanceKey, state: TaskInstanceState) -> Result<()> {
        let mut inner = self.inner.write().map_err(poison_err)?;
        let ti = inner
            .task_instances
            .get_mut(key)
            .ok_or_else(|| TidepsError::TaskNotFound(key.to_string()))?;
        ti.state = state;
        Ok(())
    }

    pub fn task_instance(&self, key: &TaskInstanceKey) -> Result<Option<TaskInstance>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner.task_instances.get(key).cloned())
    }

    pub fn dag_runs(&self) -> Result<Vec<DagRun>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner.dag_runs.clone())
    }
}

impl HistoryStore for InMemoryHistory {
    fn get_dagrun(&self, dag_id: &str, run_id: &str) -> Result<Option<DagRun>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner
            .dag_runs
            .iter()
            .find(|dr| dr.dag_id == dag_id && dr.run_id == run_id)
            .cloned())
    }

    fn get_previous_dagrun(
        &self,
        dag_run: &DagRun,
        by_schedule_order: bool,
    ) -> Result<Option<DagRun>> {
        let inner = self.inner.read().map_err(poison_err)?;
        let same_dag = inner.dag_runs.iter().filter(|dr| dr.dag_id == dag_run.dag_id);

        let previous = if by_schedule_order {
            same_dag
                .filter(|dr| dr.execution_date < dag_run.execution_date)
                .max_by_key(|dr| dr.execution_date)
        } else {
            same_dag
                .filter(|dr| dr.id < dag_run.id)
                .max_by_key(|dr| dr.id)
        };

        Ok(previous.cloned())
    }

    fn get_task_instances(&self, dag_run: &DagRun, task_id: &str) -> Result<Vec<TaskInstance>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner
            .task_instances
            .values()
            .filter(|ti| {
                ti.dag_id == dag_run.dag_id && ti.run_id == dag_run.run_id && ti.task_id == task_id
            })
            .cloned()
            .collect())
    }

    fn count_prior_instances(
        &self,
        dag_id: &str,
        task_id: &str,
        before: DateTime<Utc>,
    ) -> Result<usize> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner
            .task_instances
            .values()
            .filter(|ti| ti.dag_id == dag_id && ti.task_id == task_id && ti.execution_date < before)
            .count())
    }

    fn are_downstream_dependents_done(
        &self,
        ti: &TaskInstance,
        downstream_task_ids: &[String],
    ) -> Result<bool> {
        let inner = self.inner.read().map_err(poison_err)?;

        for downstream in downstream_task_ids {
            let mut instances = inner.task_instances.values().filter(|other| {
                other.dag_id == ti.dag_id
                    && other.run_id == ti.run_id
                    && &other.task_id == downstream
            });

            // Every mapped instance has to be done, and at least one must exist.
            let mut seen = false;
            let all_done = instances.all(|other| {
                seen = true;
                other.state.is_successful_for_past_deps()
            });
            if !seen || !all_done {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn record_flag(&self, ti: &TaskInstanceKey, key: &str, value: bool) -> Result<()> {
        let mut inner = self.inner.write().map_err(poison_err)?;
        inner.flags.insert((ti.clone(), key.to_string()), value);
        Ok(())
    }

    fn get_flag(&self, ti: &TaskInstanceKey, key: &str) -> Result<Option<bool>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner.flags.get(&(ti.clone(), key.to_string())).copied())
    }
}
