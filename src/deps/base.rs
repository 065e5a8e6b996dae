// src/deps/base.rs

//! The interface every dependency predicate implements.

use std::iter;

use crate::dag::TiRef;
use crate::deps::{DepContext, DepStatus};
use crate::errors::Result;
use crate::store::HistoryStore;

/// Lazily produced statuses of one predicate.
///
/// Nothing is evaluated (and the store is not touched) until the first item
/// is pulled; consumers may stop early. Each call produces a fresh sequence.
pub type DepStatuses<'a> = Box<dyn Iterator<Item = Result<DepStatus>> + 'a>;

/// A dependency predicate: inspects a task instance and yields zero or more
/// [`DepStatus`]es. An empty sequence counts as passing.
pub trait TiDep: Sized {
    /// Human-readable name shown next to every status.
    const NAME: &'static str;

    /// Whether `ignore_all_deps` waives this predicate.
    const IGNORABLE: bool = false;

    /// Whether `ignore_task_deps` waives this predicate.
    const IS_TASK_DEP: bool = false;

    /// Predicate-specific evaluation. Callers go through
    /// [`TiDep::get_dep_statuses`] so the context waivers apply.
    fn dep_statuses<'a>(
        &'a self,
        target: TiRef<'a>,
        store: &'a dyn HistoryStore,
        ctx: &'a DepContext,
    ) -> DepStatuses<'a>;

    fn get_dep_statuses<'a>(
        &'a self,
        target: TiRef<'a>,
        store: &'a dyn HistoryStore,
        ctx: &'a DepContext,
    ) -> DepStatuses<'a> {
        if Self::IGNORABLE && ctx.ignore_all_deps {
            return Box::new(iter::once(Ok(Self::passing_status(
                "Context specified all dependencies should be ignored.",
            ))));
        }

        if Self::IS_TASK_DEP && ctx.ignore_task_deps {
            return Box::new(iter::once(Ok(Self::passing_status(
                "Context specified all task dependencies should be ignored.",
            ))));
        }

        self.dep_statuses(target, store, ctx)
    }

    /// True when no status fails. Stops at the first failure.
    fn is_met(
        &self,
        target: TiRef<'_>,
        store: &dyn HistoryStore,
        ctx: &DepContext,
    ) -> Result<bool> {
        for status in self.get_dep_statuses(target, store, ctx) {
            if !status?.passed() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn failure_reasons(
        &self,
        target: TiRef<'_>,
        store: &dyn HistoryStore,
        ctx: &DepContext,
    ) -> Result<Vec<String>> {
        let mut reasons = Vec::new();
        for status in self.get_dep_statuses(target, store, ctx) {
            let status = status?;
            if !status.passed() {
                reasons.push(status.reason().to_string());
            }
        }
        Ok(reasons)
    }

    fn passing_status(reason: impl Into<String>) -> DepStatus {
        DepStatus::passing(Self::NAME, Self::IGNORABLE, reason)
    }

    fn failing_status(reason: impl Into<String>) -> DepStatus {
        DepStatus::failing(Self::NAME, Self::IGNORABLE, reason)
    }
}
