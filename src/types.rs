// src/types.rs

//! Small enums shared across the model, the dependency engine and config.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Lifecycle state of a task instance.
///
/// `None` is a real state here: the instance exists but nothing has been
/// decided for it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskInstanceState {
    None,
    Scheduled,
    Queued,
    Running,
    Success,
    Failed,
    Skipped,
    UpstreamFailed,
    UpForRetry,
    UpForReschedule,
    Removed,
    Restarting,
    Deferred,
}

impl TaskInstanceState {
    pub const ALL: [TaskInstanceState; 13] = [
        TaskInstanceState::None,
        TaskInstanceState::Scheduled,
        TaskInstanceState::Queued,
        TaskInstanceState::Running,
        TaskInstanceState::Success,
        TaskInstanceState::Failed,
        TaskInstanceState::Skipped,
        TaskInstanceState::UpstreamFailed,
        TaskInstanceState::UpForRetry,
        TaskInstanceState::UpForReschedule,
        TaskInstanceState::Removed,
        TaskInstanceState::Restarting,
        TaskInstanceState::Deferred,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskInstanceState::None => "none",
            TaskInstanceState::Scheduled => "scheduled",
            TaskInstanceState::Queued => "queued",
            TaskInstanceState::Running => "running",
            TaskInstanceState::Success => "success",
            TaskInstanceState::Failed => "failed",
            TaskInstanceState::Skipped => "skipped",
            TaskInstanceState::UpstreamFailed => "upstream_failed",
            TaskInstanceState::UpForRetry => "up_for_retry",
            TaskInstanceState::UpForReschedule => "up_for_reschedule",
            TaskInstanceState::Removed => "removed",
            TaskInstanceState::Restarting => "restarting",
            TaskInstanceState::Deferred => "deferred",
        }
    }

    /// States a previous instance may be in without blocking `depends_on_past`.
    pub fn is_successful_for_past_deps(self) -> bool {
        matches!(self, TaskInstanceState::Success | TaskInstanceState::Skipped)
    }
}

impl fmt::Display for TaskInstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskInstanceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TaskInstanceState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == wanted)
            .ok_or_else(|| format!("invalid task instance state: {wanted}"))
    }
}

/// States from which a task instance may start running. `queued` is what a
/// worker sees right before it starts the task; `scheduled` is not here.
pub const RUNNABLE_STATES: &[TaskInstanceState] = &[
    TaskInstanceState::None,
    TaskInstanceState::UpForRetry,
    TaskInstanceState::UpForReschedule,
    TaskInstanceState::Queued,
];

/// States from which a task instance may be handed to an executor queue.
pub const QUEUEABLE_STATES: &[TaskInstanceState] = &[TaskInstanceState::Scheduled];

/// Lifecycle state of a DAG run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DagRunState {
    Queued,
    Running,
    Success,
    Failed,
}

impl fmt::Display for DagRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DagRunState::Queued => "queued",
            DagRunState::Running => "running",
            DagRunState::Success => "success",
            DagRunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl Default for DagRunState {
    fn default() -> Self {
        DagRunState::Running
    }
}

/// How the dependency evaluator consumes predicate results.
///
/// - `Admission`: stop at the first blocking failure (scheduler path).
/// - `Explain`: evaluate everything; any failure denies.
/// - `HardBlockersOnly`: evaluate everything; failures of ignorable
///   predicates are reported but do not deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    Admission,
    Explain,
    HardBlockersOnly,
}

impl Default for EvaluationMode {
    fn default() -> Self {
        EvaluationMode::Admission
    }
}

impl FromStr for EvaluationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "admission" => Ok(EvaluationMode::Admission),
            "explain" => Ok(EvaluationMode::Explain),
            "hard_blockers_only" => Ok(EvaluationMode::HardBlockersOnly),
            other => Err(format!(
                "invalid evaluation mode: {other} (expected \"admission\", \"explain\" or \"hard_blockers_only\")"
            )),
        }
    }
}

/// Named predicate set used by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepSetKind {
    Runnable,
    Queueable,
}

impl Default for DepSetKind {
    fn default() -> Self {
        DepSetKind::Runnable
    }
}
