#![allow(dead_code)]

pub use tideps_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
pub use tideps_test_utils::counting_store::CountingStore;
pub use tideps_test_utils::{day, init_tracing, snapshot, snapshot_with};

use tideps::deps::{DepStatus, PrevDagrunDep, TiDep};
use tideps::engine::Snapshot;
use tideps::errors::Result;
use tideps::store::HistoryStore;
use tideps::types::DagRunState;

/// `daily` DAG: `extract` (depends_on_past) -> `load`, with no runs yet.
pub fn daily_dag() -> ConfigFileBuilder {
    daily_dag_with(TaskConfigBuilder::new().depends_on_past(true))
}

pub fn daily_dag_with(extract: TaskConfigBuilder) -> ConfigFileBuilder {
    ConfigFileBuilder::new("daily")
        .with_task("extract", extract.build())
        .with_task("load", TaskConfigBuilder::new().after("extract").build())
}

/// Adds runs `run_0..run_{n-1}` on consecutive days, all running.
pub fn with_runs(mut builder: ConfigFileBuilder, n: i64) -> ConfigFileBuilder {
    for i in 0..n {
        builder = builder.with_dag_run(&format!("run_{i}"), day(i), DagRunState::Running);
    }
    builder
}

/// Statuses of the previous-run predicate for the snapshot's task instance.
pub fn prev_statuses(snap: &Snapshot) -> Vec<DepStatus> {
    prev_statuses_in(snap, &snap.store).expect("evaluation failed")
}

/// Same as [`prev_statuses`] but against another store.
pub fn prev_statuses_in(snap: &Snapshot, store: &dyn HistoryStore) -> Result<Vec<DepStatus>> {
    let target = snap.dag.ti_ref(&snap.ti)?;
    PrevDagrunDep
        .get_dep_statuses(target, store, &snap.ctx)
        .collect()
}
