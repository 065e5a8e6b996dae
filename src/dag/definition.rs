// src/dag/definition.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::model::ConfigFile;
use crate::dag::graph::DagGraph;
use crate::dag::instance::TaskInstance;
use crate::dag::task::Task;
use crate::errors::{Result, TidepsError};

/// A DAG definition. Downstream edges are resolved into each [`Task`].
#[derive(Debug, Clone)]
pub struct Dag {
    pub dag_id: String,
    pub catchup: bool,
    pub start_date: Option<DateTime<Utc>>,
    tasks: BTreeMap<String, Task>,
}

impl Dag {
    /// Construct a DAG from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let graph = DagGraph::from_config(cfg);

        let tasks = cfg
            .task
            .iter()
            .map(|(task_id, tc)| {
                let task = Task::from_config(
                    &cfg.dag.dag_id,
                    task_id,
                    tc,
                    cfg.dag.catchup,
                    cfg.dag.start_date,
                    graph.downstream_of(task_id).to_vec(),
                );
                (task_id.clone(), task)
            })
            .collect();

        Self {
            dag_id: cfg.dag.dag_id.clone(),
            catchup: cfg.dag.catchup,
            start_date: cfg.dag.start_date,
            tasks,
        }
    }

    pub fn task(&self, task_id: &str) -> Result<&Task> {
        self.tasks
            .get(task_id)
            .ok_or_else(|| TidepsError::TaskNotFound(format!("{}.{}", self.dag_id, task_id)))
    }

    /// Pair a task instance with its task definition.
    pub fn ti_ref<'a>(&'a self, ti: &'a TaskInstance) -> Result<TiRef<'a>> {
        if ti.dag_id != self.dag_id {
            return Err(TidepsError::TaskNotFound(format!(
                "{} does not belong to DAG '{}'",
                ti, self.dag_id
            )));
        }
        Ok(TiRef::new(ti, self.task(&ti.task_id)?))
    }
}

/// A task instance together with the definition of its task.
///
/// This is what every dependency predicate evaluates.
#[derive(Debug, Clone, Copy)]
pub struct TiRef<'a> {
    pub ti: &'a TaskInstance,
    pub task: &'a Task,
}

impl<'a> TiRef<'a> {
    pub fn new(ti: &'a TaskInstance, task: &'a Task) -> Self {
        Self { ti, task }
    }
}
