// src/deps/dagrun_running.rs

use std::iter;

use tracing::debug;

use crate::dag::TiRef;
use crate::deps::base::{DepStatuses, TiDep};
use crate::deps::{DepContext, DepStatus};
use crate::errors::{Result, TidepsError};
use crate::store::HistoryStore;
use crate::types::DagRunState;

/// Task instances only start while their DAG run is running.
///
/// Yields nothing when satisfied.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagrunRunningDep;

impl TiDep for DagrunRunningDep {
    const NAME: &'static str = "Dagrun Running";
    const IGNORABLE: bool = true;

    fn dep_statuses<'a>(
        &'a self,
        target: TiRef<'a>,
        store: &'a dyn HistoryStore,
        _ctx: &'a DepContext,
    ) -> DepStatuses<'a> {
        Box::new(
            iter::once_with(move || -> Result<Option<DepStatus>> {
                let ti = target.ti;
                let dag_run = store.get_dagrun(&ti.dag_id, &ti.run_id)?.ok_or_else(|| {
                    TidepsError::DagRunNotFound(format!("{}/{}", ti.dag_id, ti.run_id))
                })?;

                if dag_run.state == DagRunState::Running {
                    debug!(ti = %ti, "dag run is running");
                    return Ok(None);
                }

                Ok(Some(Self::failing_status(format!(
                    "Task instance's dagrun was not in the 'running' state but in the state '{}'.",
                    dag_run.state
                ))))
            })
            .filter_map(|status| status.transpose()),
        )
    }
}
