// src/deps/valid_state.rs

use std::iter;

use crate::dag::TiRef;
use crate::deps::base::{DepStatuses, TiDep};
use crate::deps::{DepContext, DepStatus};
use crate::errors::{Result, TidepsError};
use crate::store::HistoryStore;
use crate::types::{TaskInstanceState, QUEUEABLE_STATES, RUNNABLE_STATES};

/// Passes when the task instance is in one of the given states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStateDep {
    valid_states: Vec<TaskInstanceState>,
}

impl ValidStateDep {
    pub fn new(valid_states: impl IntoIterator<Item = TaskInstanceState>) -> Result<Self> {
        let valid_states: Vec<_> = valid_states.into_iter().collect();
        if valid_states.is_empty() {
            return Err(TidepsError::ConfigError(
                "ValidStateDep must be constructed with at least one valid state".to_string(),
            ));
        }
        Ok(Self { valid_states })
    }

    pub fn runnable() -> Self {
        Self {
            valid_states: RUNNABLE_STATES.to_vec(),
        }
    }

    pub fn queueable() -> Self {
        Self {
            valid_states: QUEUEABLE_STATES.to_vec(),
        }
    }
}

impl TiDep for ValidStateDep {
    const NAME: &'static str = "Task Instance State";
    const IGNORABLE: bool = true;

    fn dep_statuses<'a>(
        &'a self,
        target: TiRef<'a>,
        _store: &'a dyn HistoryStore,
        ctx: &'a DepContext,
    ) -> DepStatuses<'a> {
        Box::new(iter::once_with(move || -> Result<DepStatus> {
            let state = target.ti.state;
            let status = if ctx.ignore_ti_state {
                Self::passing_status("Context specified that state should be ignored.")
            } else if self.valid_states.contains(&state) {
                Self::passing_status(format!("Task state {state} was valid."))
            } else {
                Self::failing_status(format!("Task is in the '{state}' state."))
            };
            Ok(status)
        }))
    }
}
