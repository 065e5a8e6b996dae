// src/deps/context.rs

use serde::Deserialize;

/// Flags that change how strict the predicates are for one admission
/// attempt.
///
/// Shared by every predicate; each one reads only the flags it cares about.
/// Built once per attempt and only read afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DepContext {
    /// Waive every ignorable predicate.
    pub ignore_all_deps: bool,
    /// Pass the previous-run check without looking at history.
    pub ignore_depends_on_past: bool,
    /// Waive predicates that concern the task's own dependencies.
    pub ignore_task_deps: bool,
    /// Accept the task instance whatever its current state.
    pub ignore_ti_state: bool,
    /// Record `past_depends_met` whenever the past-dependency check passes,
    /// so a later skip decision can consult it.
    pub wait_for_past_depends_before_skipping: bool,
}

impl DepContext {
    /// OR another set of flags into this one.
    pub fn merged(self, other: DepContext) -> Self {
        Self {
            ignore_all_deps: self.ignore_all_deps || other.ignore_all_deps,
            ignore_depends_on_past: self.ignore_depends_on_past || other.ignore_depends_on_past,
            ignore_task_deps: self.ignore_task_deps || other.ignore_task_deps,
            ignore_ti_state: self.ignore_ti_state || other.ignore_ti_state,
            wait_for_past_depends_before_skipping: self.wait_for_past_depends_before_skipping
                || other.wait_for_past_depends_before_skipping,
        }
    }
}
