// src/deps/prev_dagrun.rs

//! Is the previous DAG run in a state that lets this task instance run?
//!
//! Covers `depends_on_past`, `ignore_first_depends_on_past` and
//! `wait_for_downstream`. The checks below run in a fixed order: each one
//! assumes the trivial cases before it have already been excluded.

use std::iter;

use tracing::{debug, warn};

use crate::dag::{TaskInstance, TiRef};
use crate::deps::base::{DepStatuses, TiDep};
use crate::deps::{DepContext, DepStatus};
use crate::errors::Result;
use crate::store::{HistoryStore, PAST_DEPENDS_MET};

const FIRST_TI_REASON: &str = "This task instance was the first task instance for its task.";

#[derive(Debug, Clone, Copy, Default)]
pub struct PrevDagrunDep;

impl TiDep for PrevDagrunDep {
    const NAME: &'static str = "Previous Dagrun State";
    const IGNORABLE: bool = true;
    const IS_TASK_DEP: bool = true;

    fn dep_statuses<'a>(
        &'a self,
        target: TiRef<'a>,
        store: &'a dyn HistoryStore,
        ctx: &'a DepContext,
    ) -> DepStatuses<'a> {
        Box::new(
            iter::once_with(move || self.evaluate(target, store, ctx))
                .filter_map(|status| status.transpose()),
        )
    }
}

impl PrevDagrunDep {
    /// At most one status comes out of this; `None` means every check passed.
    fn evaluate(
        &self,
        target: TiRef<'_>,
        store: &dyn HistoryStore,
        ctx: &DepContext,
    ) -> Result<Option<DepStatus>> {
        let TiRef { ti, task } = target;

        if ctx.ignore_depends_on_past {
            debug!(ti = %ti, "past dependencies ignored by context");
            Self::record_past_depends_met(ti, store, ctx)?;
            return Ok(Some(Self::passing_status(
                "The context specified that the state of past DAGs could be ignored.",
            )));
        }

        if !task.depends_on_past {
            Self::record_past_depends_met(ti, store, ctx)?;
            return Ok(Some(Self::passing_status(
                "The task did not have depends_on_past set.",
            )));
        }

        let Some(dag_run) = store.get_dagrun(&ti.dag_id, &ti.run_id)? else {
            warn!(ti = %ti, "task instance has no dag run; letting it through");
            Self::record_past_depends_met(ti, store, ctx)?;
            return Ok(Some(Self::passing_status(
                "This task instance does not belong to a DAG.",
            )));
        };

        let Some(last_dagrun) = store.get_previous_dagrun(&dag_run, task.catchup)? else {
            debug!(ti = %ti, catchup = task.catchup, "no previous dag run");
            Self::record_past_depends_met(ti, store, ctx)?;
            return Ok(Some(Self::passing_status(FIRST_TI_REASON)));
        };

        // There was a run before, but the task did not exist yet back then.
        if task.catchup
            && task
                .start_date
                .is_some_and(|start| last_dagrun.execution_date < start)
        {
            debug!(
                ti = %ti,
                previous_run = %last_dagrun.run_id,
                "previous dag run predates the task's start_date"
            );
            Self::record_past_depends_met(ti, store, ctx)?;
            return Ok(Some(Self::passing_status(FIRST_TI_REASON)));
        }

        let mut previous_tis = store.get_task_instances(&last_dagrun, &ti.task_id)?;
        previous_tis.sort_by_key(|prev| prev.map_index);

        if previous_tis.is_empty() {
            if task.ignore_first_depends_on_past {
                let prior = store.count_prior_instances(&ti.dag_id, &ti.task_id, ti.execution_date)?;
                if prior == 0 {
                    Self::record_past_depends_met(ti, store, ctx)?;
                    return Ok(Some(Self::passing_status(
                        "ignore_first_depends_on_past is true for this task and it is the first \
                         task instance for its task.",
                    )));
                }
                debug!(ti = %ti, prior, "earlier instances exist; not a first run");
            }

            return Ok(Some(Self::failing_status(format!(
                "depends_on_past is true for this task's DAG, but the previous task instance \
                 has not run yet (no instance of task '{}' in DAG run '{}').",
                ti.task_id, last_dagrun.run_id
            ))));
        }

        let unsuccessful: Vec<&TaskInstance> = previous_tis
            .iter()
            .filter(|prev| !prev.state.is_successful_for_past_deps())
            .collect();
        if !unsuccessful.is_empty() {
            return Ok(Some(Self::failing_status(format!(
                "depends_on_past is true for this task, but the previous task instance(s) {} \
                 are not in a successful state.",
                join_tis(&unsuccessful)
            ))));
        }

        if task.wait_for_downstream {
            let mut not_done = Vec::new();
            for prev in &previous_tis {
                if !store.are_downstream_dependents_done(prev, &task.downstream_task_ids)? {
                    not_done.push(prev);
                }
            }
            if !not_done.is_empty() {
                return Ok(Some(Self::failing_status(format!(
                    "The tasks downstream of the previous task instance(s) {} haven't completed \
                     (and wait_for_downstream is True).",
                    join_tis(&not_done)
                ))));
            }
        }

        Self::record_past_depends_met(ti, store, ctx)?;
        Ok(None)
    }

    fn record_past_depends_met(
        ti: &TaskInstance,
        store: &dyn HistoryStore,
        ctx: &DepContext,
    ) -> Result<()> {
        if ctx.wait_for_past_depends_before_skipping {
            store.record_flag(&ti.key(), PAST_DEPENDS_MET, true)?;
        }
        Ok(())
    }
}

fn join_tis(tis: &[&TaskInstance]) -> String {
    tis.iter()
        .map(|ti| ti.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
