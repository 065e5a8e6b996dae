// src/deps/task_not_running.rs

use std::iter;

use crate::dag::TiRef;
use crate::deps::base::{DepStatuses, TiDep};
use crate::deps::{DepContext, DepStatus};
use crate::errors::Result;
use crate::store::HistoryStore;
use crate::types::TaskInstanceState;

/// Guards against starting an instance that is already running.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskNotRunningDep;

impl TiDep for TaskNotRunningDep {
    const NAME: &'static str = "Task Instance Not Running";

    fn dep_statuses<'a>(
        &'a self,
        target: TiRef<'a>,
        _store: &'a dyn HistoryStore,
        _ctx: &'a DepContext,
    ) -> DepStatuses<'a> {
        Box::new(iter::once_with(move || -> Result<DepStatus> {
            if target.ti.state == TaskInstanceState::Running {
                Ok(Self::failing_status("Task is in the running state"))
            } else {
                Ok(Self::passing_status("Task is not in running state."))
            }
        }))
    }
}
