// src/config/model.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::deps::DepContext;
use crate::types::{DagRunState, DepSetKind, EvaluationMode, TaskInstanceState};

/// Top-level scenario as read from a TOML file, before semantic validation.
///
/// ```toml
/// [config]
/// mode = "explain"
///
/// [dag]
/// dag_id = "etl"
/// catchup = true
///
/// [task.extract]
/// depends_on_past = true
///
/// [task.load]
/// after = ["extract"]
///
/// [[dag_run]]
/// run_id = "scheduled__2024-01-01"
/// execution_date = "2024-01-01T00:00:00Z"
///
/// [[task_instance]]
/// task_id = "extract"
/// run_id = "scheduled__2024-01-01"
/// state = "success"
/// ```
///
/// Datetimes are RFC 3339 *strings* (quoted), not TOML datetime literals.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub context: DepContext,

    pub dag: DagSection,

    /// All tasks from `[task.<id>]`, keyed by task id.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// DAG runs in creation order.
    #[serde(default)]
    pub dag_run: Vec<DagRunConfig>,

    #[serde(default)]
    pub task_instance: Vec<TaskInstanceConfig>,
}

/// A scenario that passed validation (see `config::validate`).
///
/// Only constructible through `TryFrom<RawConfigFile>` or
/// [`ConfigFile::new_unchecked`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub context: DepContext,
    pub dag: DagSection,
    pub task: BTreeMap<String, TaskConfig>,
    pub dag_run: Vec<DagRunConfig>,
    pub task_instance: Vec<TaskInstanceConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            context: raw.context,
            dag: raw.dag,
            task: raw.task,
            dag_run: raw.dag_run,
            task_instance: raw.task_instance,
        }
    }

    pub fn dag_run(&self, run_id: &str) -> Option<&DagRunConfig> {
        self.dag_run.iter().find(|dr| dr.run_id == run_id)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// How the evaluator consumes predicate results.
    #[serde(default)]
    pub mode: EvaluationMode,

    /// Which predicate preset to evaluate.
    #[serde(default)]
    pub deps: DepSetKind,
}

/// `[dag]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DagSection {
    pub dag_id: String,

    /// Catch-up DAGs resolve the previous run by schedule order.
    #[serde(default = "default_catchup")]
    pub catchup: bool,

    /// Default start date for tasks that do not set their own.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

fn default_catchup() -> bool {
    true
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Upstream task ids.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub depends_on_past: bool,

    /// Implies `depends_on_past`.
    #[serde(default)]
    pub wait_for_downstream: bool,

    #[serde(default)]
    pub ignore_first_depends_on_past: bool,

    /// Falls back to `[dag].start_date` when unset.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

/// One `[[dag_run]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DagRunConfig {
    pub run_id: String,
    pub execution_date: DateTime<Utc>,
    #[serde(default)]
    pub state: DagRunState,
}

/// One `[[task_instance]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskInstanceConfig {
    pub task_id: String,
    pub run_id: String,
    #[serde(default = "default_map_index")]
    pub map_index: i32,
    #[serde(default = "default_ti_state")]
    pub state: TaskInstanceState,
}

fn default_map_index() -> i32 {
    -1
}

fn default_ti_state() -> TaskInstanceState {
    TaskInstanceState::None
}
