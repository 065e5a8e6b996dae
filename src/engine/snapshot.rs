// src/engine/snapshot.rs

//! Point-in-time view of a DAG and its history, reloaded on every poll.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{load_and_validate, ConfigFile};
use crate::dag::{Dag, TaskInstance, TaskInstanceKey};
use crate::deps::DepContext;
use crate::errors::{Result, TidepsError};
use crate::store::InMemoryHistory;
use crate::types::TaskInstanceState;

/// Which task instance to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiRequest {
    pub task_id: String,
    pub run_id: String,
    pub map_index: i32,
}

/// Everything one admission attempt needs.
#[derive(Debug)]
pub struct Snapshot {
    pub dag: Dag,
    pub store: InMemoryHistory,
    pub ti: TaskInstance,
    pub ctx: DepContext,
}

impl Snapshot {
    /// Build a snapshot from a validated scenario.
    ///
    /// A task instance that is not listed in the history is treated as a
    /// fresh instance in state `none` of the requested run.
    pub fn from_config(cfg: &ConfigFile, request: &TiRequest, ctx: DepContext) -> Result<Self> {
        let dag = Dag::from_config(cfg);
        dag.task(&request.task_id)?;

        let store = InMemoryHistory::from_config(cfg)?;
        let key = TaskInstanceKey {
            dag_id: dag.dag_id.clone(),
            task_id: request.task_id.clone(),
            run_id: request.run_id.clone(),
            map_index: request.map_index,
        };

        let ti = match store.task_instance(&key)? {
            Some(ti) => ti,
            None => {
                let dag_run = cfg.dag_run(&request.run_id).ok_or_else(|| {
                    TidepsError::DagRunNotFound(format!("{}/{}", dag.dag_id, request.run_id))
                })?;
                debug!(ti = %key, "task instance not in history; evaluating a fresh one");
                TaskInstance::new(
                    &dag.dag_id,
                    &request.task_id,
                    &request.run_id,
                    dag_run.execution_date,
                    TaskInstanceState::None,
                )
                .with_map_index(request.map_index)
            }
        };

        Ok(Self {
            dag,
            store,
            ti,
            ctx: cfg.context.merged(ctx),
        })
    }
}

/// Where the runtime gets a fresh snapshot from on each poll.
pub trait SnapshotSource: Send + Debug {
    fn load(&mut self) -> Result<Snapshot>;
}

/// Reads a scenario file from disk on every load, so edits made between
/// polls are picked up.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
    request: TiRequest,
    ctx_overrides: DepContext,
}

impl FileSnapshotSource {
    pub fn new(path: impl AsRef<Path>, request: TiRequest, ctx_overrides: DepContext) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            request,
            ctx_overrides,
        }
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn load(&mut self) -> Result<Snapshot> {
        let cfg = load_and_validate(&self.path)?;
        Snapshot::from_config(&cfg, &self.request, self.ctx_overrides)
    }
}
