// src/deps/mod.rs

//! Task-instance dependency predicates and their evaluator.
//!
//! - [`base`] defines [`TiDep`], the common predicate interface.
//! - [`prev_dagrun`] checks `depends_on_past` / `wait_for_downstream`
//!   against the previous DAG run.
//! - [`valid_state`], [`task_not_running`] and [`dagrun_running`] are the
//!   simpler sibling checks.
//! - [`evaluator`] runs an ordered set of predicates and decides admission.

pub mod base;
pub mod context;
pub mod dagrun_running;
pub mod evaluator;
pub mod prev_dagrun;
pub mod status;
pub mod task_not_running;
pub mod valid_state;

pub use base::{DepStatuses, TiDep};
pub use context::DepContext;
pub use dagrun_running::DagrunRunningDep;
pub use evaluator::{
    evaluate_all, queueable_deps, runnable_deps, AdmissionDecision, Dep, DepEvaluator,
};
pub use prev_dagrun::PrevDagrunDep;
pub use status::DepStatus;
pub use task_not_running::TaskNotRunningDep;
pub use valid_state::ValidStateDep;
