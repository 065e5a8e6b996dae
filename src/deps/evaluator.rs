// src/deps/evaluator.rs

//! Runs an ordered set of predicates and turns their statuses into an
//! admission decision.

use tracing::{debug, info};

use crate::dag::TiRef;
use crate::deps::base::{DepStatuses, TiDep};
use crate::deps::{
    DagrunRunningDep, DepContext, DepStatus, PrevDagrunDep, TaskNotRunningDep, ValidStateDep,
};
use crate::errors::Result;
use crate::store::HistoryStore;
use crate::types::{DepSetKind, EvaluationMode};

/// The closed set of predicates the evaluator knows about.
#[derive(Debug, Clone)]
pub enum Dep {
    PrevDagrun(PrevDagrunDep),
    ValidState(ValidStateDep),
    TaskNotRunning(TaskNotRunningDep),
    DagrunRunning(DagrunRunningDep),
}

impl Dep {
    pub fn name(&self) -> &'static str {
        match self {
            Dep::PrevDagrun(_) => PrevDagrunDep::NAME,
            Dep::ValidState(_) => ValidStateDep::NAME,
            Dep::TaskNotRunning(_) => TaskNotRunningDep::NAME,
            Dep::DagrunRunning(_) => DagrunRunningDep::NAME,
        }
    }

    pub fn ignorable(&self) -> bool {
        match self {
            Dep::PrevDagrun(_) => PrevDagrunDep::IGNORABLE,
            Dep::ValidState(_) => ValidStateDep::IGNORABLE,
            Dep::TaskNotRunning(_) => TaskNotRunningDep::IGNORABLE,
            Dep::DagrunRunning(_) => DagrunRunningDep::IGNORABLE,
        }
    }

    pub fn get_dep_statuses<'a>(
        &'a self,
        target: TiRef<'a>,
        store: &'a dyn HistoryStore,
        ctx: &'a DepContext,
    ) -> DepStatuses<'a> {
        match self {
            Dep::PrevDagrun(dep) => dep.get_dep_statuses(target, store, ctx),
            Dep::ValidState(dep) => dep.get_dep_statuses(target, store, ctx),
            Dep::TaskNotRunning(dep) => dep.get_dep_statuses(target, store, ctx),
            Dep::DagrunRunning(dep) => dep.get_dep_statuses(target, store, ctx),
        }
    }
}

impl From<PrevDagrunDep> for Dep {
    fn from(dep: PrevDagrunDep) -> Self {
        Dep::PrevDagrun(dep)
    }
}

impl From<ValidStateDep> for Dep {
    fn from(dep: ValidStateDep) -> Self {
        Dep::ValidState(dep)
    }
}

impl From<TaskNotRunningDep> for Dep {
    fn from(dep: TaskNotRunningDep) -> Self {
        Dep::TaskNotRunning(dep)
    }
}

impl From<DagrunRunningDep> for Dep {
    fn from(dep: DagrunRunningDep) -> Self {
        Dep::DagrunRunning(dep)
    }
}

/// Predicates checked before a task instance may start.
pub fn runnable_deps() -> Vec<Dep> {
    vec![
        DagrunRunningDep.into(),
        ValidStateDep::runnable().into(),
        TaskNotRunningDep.into(),
        PrevDagrunDep.into(),
    ]
}

/// Predicates checked before a task instance is handed to an executor.
pub fn queueable_deps() -> Vec<Dep> {
    vec![
        ValidStateDep::queueable().into(),
        TaskNotRunningDep.into(),
        PrevDagrunDep.into(),
    ]
}

/// Result of one admission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub admitted: bool,
    pub mode: EvaluationMode,
    /// Every status consumed, in evaluation order. In `Admission` mode this
    /// ends at the first blocking failure.
    pub statuses: Vec<DepStatus>,
}

impl AdmissionDecision {
    pub fn failing(&self) -> impl Iterator<Item = &DepStatus> {
        self.statuses.iter().filter(|s| !s.passed())
    }

    /// Failures that deny admission under this decision's mode.
    pub fn blocking(&self) -> impl Iterator<Item = &DepStatus> {
        let mode = self.mode;
        self.statuses.iter().filter(move |s| blocks(mode, s))
    }

    pub fn failure_reasons(&self) -> Vec<String> {
        self.failing().map(|s| s.reason().to_string()).collect()
    }
}

fn blocks(mode: EvaluationMode, status: &DepStatus) -> bool {
    !status.passed() && (mode != EvaluationMode::HardBlockersOnly || !status.ignorable())
}

/// An ordered predicate set plus the way its results are consumed.
#[derive(Debug, Clone)]
pub struct DepEvaluator {
    deps: Vec<Dep>,
    mode: EvaluationMode,
}

impl DepEvaluator {
    pub fn new(deps: Vec<Dep>, mode: EvaluationMode) -> Self {
        Self { deps, mode }
    }

    pub fn for_kind(kind: DepSetKind, mode: EvaluationMode) -> Self {
        let deps = match kind {
            DepSetKind::Runnable => runnable_deps(),
            DepSetKind::Queueable => queueable_deps(),
        };
        Self::new(deps, mode)
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn deps(&self) -> &[Dep] {
        &self.deps
    }

    pub fn evaluate(
        &self,
        target: TiRef<'_>,
        store: &dyn HistoryStore,
        ctx: &DepContext,
    ) -> Result<AdmissionDecision> {
        evaluate_all(target, ctx, &self.deps, store, self.mode)
    }
}

/// Evaluate `deps` in order against one task instance.
///
/// In [`EvaluationMode::Admission`] consumption stops at the first blocking
/// failure and later predicates are never asked (so they issue no store
/// queries). Store errors abort evaluation and are returned as-is.
pub fn evaluate_all(
    target: TiRef<'_>,
    ctx: &DepContext,
    deps: &[Dep],
    store: &dyn HistoryStore,
    mode: EvaluationMode,
) -> Result<AdmissionDecision> {
    let mut statuses = Vec::new();
    let mut admitted = true;

    'deps: for dep in deps {
        for status in dep.get_dep_statuses(target, store, ctx) {
            let status = status?;
            debug!(
                ti = %target.ti,
                dep = dep.name(),
                passed = status.passed(),
                reason = status.reason(),
                "dependency status"
            );

            let blocking = blocks(mode, &status);
            statuses.push(status);

            if blocking {
                admitted = false;
                if mode == EvaluationMode::Admission {
                    debug!(ti = %target.ti, dep = dep.name(), "short-circuiting on blocking failure");
                    break 'deps;
                }
            }
        }
    }

    info!(
        ti = %target.ti,
        admitted,
        mode = ?mode,
        evaluated = statuses.len(),
        "dependency evaluation finished"
    );

    Ok(AdmissionDecision {
        admitted,
        mode,
        statuses,
    })
}
