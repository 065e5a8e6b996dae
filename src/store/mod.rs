// src/store/mod.rs

//! Execution history access for the dependency predicates.
//!
//! The engine does not own a database connection or transaction. Callers
//! hand a [`HistoryStore`] to every evaluation; whatever session scope the
//! implementation needs is the caller's business.
//!
//! - [`memory`] provides [`InMemoryHistory`], used by the binary and tests.

pub mod memory;

use chrono::{DateTime, Utc};

use crate::dag::{DagRun, TaskInstance, TaskInstanceKey};
use crate::errors::Result;

pub use memory::InMemoryHistory;

/// Flag recorded when the past-dependency check passed, so a later skip
/// decision in the same admission pipeline can consult it.
pub const PAST_DEPENDS_MET: &str = "past_depends_met";

/// Read access to past DAG runs and task instances, plus the single
/// side-channel write the predicates perform.
///
/// Infrastructure failures are returned as [`crate::errors::TidepsError::Store`]
/// and propagate to the caller untouched.
pub trait HistoryStore: Send + Sync {
    /// Resolve a DAG run by id.
    fn get_dagrun(&self, dag_id: &str, run_id: &str) -> Result<Option<DagRun>>;

    /// The run immediately before `dag_run`.
    ///
    /// With `by_schedule_order` this is the run with the greatest
    /// `execution_date` strictly before `dag_run.execution_date`; otherwise
    /// it is the run created immediately before `dag_run` (greatest row id
    /// below `dag_run.id`), regardless of schedule gaps.
    ///
    /// The schedule-order lookup is a simplification: there is no schedule
    /// interval here, so it does not look for the exact previous schedule
    /// slot. A missing slot falls through to the next earlier run instead of
    /// meaning "no previous run". Execution dates are unique per DAG, so the
    /// order is total.
    fn get_previous_dagrun(&self, dag_run: &DagRun, by_schedule_order: bool)
    -> Result<Option<DagRun>>;

    /// All instances of `task_id` in `dag_run` (every map index). Order is
    /// unspecified.
    fn get_task_instances(&self, dag_run: &DagRun, task_id: &str) -> Result<Vec<TaskInstance>>;

    /// Number of instances of `(dag_id, task_id)` whose execution date is
    /// strictly before `before`.
    fn count_prior_instances(
        &self,
        dag_id: &str,
        task_id: &str,
        before: DateTime<Utc>,
    ) -> Result<usize>;

    /// Whether every downstream task of `ti` has finished (success or
    /// skipped) within the same DAG run. No downstream tasks means done.
    fn are_downstream_dependents_done(
        &self,
        ti: &TaskInstance,
        downstream_task_ids: &[String],
    ) -> Result<bool>;

    /// Record a boolean flag against a task instance. Must be idempotent.
    fn record_flag(&self, ti: &TaskInstanceKey, key: &str, value: bool) -> Result<()>;

    /// Read back a flag written with [`HistoryStore::record_flag`].
    fn get_flag(&self, ti: &TaskInstanceKey, key: &str) -> Result<Option<bool>>;
}
