// src/dag/run.rs

use chrono::{DateTime, Utc};

use crate::types::DagRunState;

/// One logical execution of a DAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagRun {
    /// Row id; strictly increasing in creation order within a store.
    pub id: u64,
    pub dag_id: String,
    pub run_id: String,
    /// Logical schedule slot of this run.
    pub execution_date: DateTime<Utc>,
    pub state: DagRunState,
}

impl DagRun {
    pub fn new(
        id: u64,
        dag_id: impl Into<String>,
        run_id: impl Into<String>,
        execution_date: DateTime<Utc>,
        state: DagRunState,
    ) -> Self {
        Self {
            id,
            dag_id: dag_id.into(),
            run_id: run_id.into(),
            execution_date,
            state,
        }
    }
}
