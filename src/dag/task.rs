// src/dag/task.rs

//! Static task definition (not an instance).

use chrono::{DateTime, Utc};

use crate::config::model::TaskConfig;

/// One node of a DAG definition, carrying the flags the dependency
/// predicates read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub task_id: String,
    pub dag_id: String,
    pub depends_on_past: bool,
    pub wait_for_downstream: bool,
    pub ignore_first_depends_on_past: bool,
    pub start_date: Option<DateTime<Utc>>,
    /// Copy of the owning DAG's `catchup` flag.
    pub catchup: bool,
    /// Immediate downstream task ids, sorted.
    pub downstream_task_ids: Vec<String>,
}

impl Task {
    pub fn from_config(
        dag_id: &str,
        task_id: &str,
        cfg: &TaskConfig,
        dag_catchup: bool,
        dag_start_date: Option<DateTime<Utc>>,
        downstream_task_ids: Vec<String>,
    ) -> Self {
        Self {
            task_id: task_id.to_string(),
            dag_id: dag_id.to_string(),
            depends_on_past: cfg.depends_on_past || cfg.wait_for_downstream,
            wait_for_downstream: cfg.wait_for_downstream,
            ignore_first_depends_on_past: cfg.ignore_first_depends_on_past,
            start_date: cfg.start_date.or(dag_start_date),
            catchup: dag_catchup,
            downstream_task_ids,
        }
    }
}
