// src/dag/instance.rs

use std::fmt;

use chrono::{DateTime, Utc};

use crate::types::TaskInstanceState;

/// Map index of an unmapped task instance.
pub const UNMAPPED: i32 = -1;

/// Identity of a task instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskInstanceKey {
    pub dag_id: String,
    pub task_id: String,
    pub run_id: String,
    pub map_index: i32,
}

impl fmt::Display for TaskInstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.dag_id, self.task_id, self.run_id)?;
        if self.map_index >= 0 {
            write!(f, " map_index={}", self.map_index)?;
        }
        Ok(())
    }
}

/// One execution attempt of a task within a DAG run.
///
/// The dependency engine only reads these; the scheduler and workers own
/// the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInstance {
    pub dag_id: String,
    pub task_id: String,
    pub run_id: String,
    pub map_index: i32,
    pub state: TaskInstanceState,
    /// Execution date of the owning DAG run.
    pub execution_date: DateTime<Utc>,
}

impl TaskInstance {
    pub fn new(
        dag_id: impl Into<String>,
        task_id: impl Into<String>,
        run_id: impl Into<String>,
        execution_date: DateTime<Utc>,
        state: TaskInstanceState,
    ) -> Self {
        Self {
            dag_id: dag_id.into(),
            task_id: task_id.into(),
            run_id: run_id.into(),
            map_index: UNMAPPED,
            state,
            execution_date,
        }
    }

    pub fn with_map_index(mut self, map_index: i32) -> Self {
        self.map_index = map_index;
        self
    }

    pub fn key(&self) -> TaskInstanceKey {
        TaskInstanceKey {
            dag_id: self.dag_id.clone(),
            task_id: self.task_id.clone(),
            run_id: self.run_id.clone(),
            map_index: self.map_index,
        }
    }
}

/// Stable rendering used verbatim in failure reasons:
/// `<TaskInstance: dag.task run_id [state]>`.
impl fmt::Display for TaskInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TaskInstance: {}.{} {}",
            self.dag_id, self.task_id, self.run_id
        )?;
        if self.map_index >= 0 {
            write!(f, " map_index={}", self.map_index)?;
        }
        write!(f, " [{}]>", self.state)
    }
}
