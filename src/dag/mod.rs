// src/dag/mod.rs

//! DAG definitions and the run-history entities the predicates inspect.
//!
//! - [`graph`] holds upstream/downstream adjacency.
//! - [`task`] is the static task definition with its dependency flags.
//! - [`definition`] is the DAG itself plus [`TiRef`], the unit of evaluation.
//! - [`run`] and [`instance`] are the history rows: DAG runs and task
//!   instances.

pub mod definition;
pub mod graph;
pub mod instance;
pub mod run;
pub mod task;

pub use definition::{Dag, TiRef};
pub use graph::DagGraph;
pub use instance::{TaskInstance, TaskInstanceKey, UNMAPPED};
pub use run::DagRun;
pub use task::Task;
