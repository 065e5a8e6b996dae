// src/deps/status.rs

use std::fmt;

/// Outcome of one dependency predicate for one task instance.
///
/// Immutable once built; the reason is what operators see in "why is this
/// task not running" output, so it is always non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepStatus {
    dep_name: &'static str,
    passed: bool,
    reason: String,
    ignorable: bool,
}

impl DepStatus {
    pub fn passing(dep_name: &'static str, ignorable: bool, reason: impl Into<String>) -> Self {
        Self::new(dep_name, ignorable, true, reason.into())
    }

    pub fn failing(dep_name: &'static str, ignorable: bool, reason: impl Into<String>) -> Self {
        Self::new(dep_name, ignorable, false, reason.into())
    }

    fn new(dep_name: &'static str, ignorable: bool, passed: bool, reason: String) -> Self {
        debug_assert!(!reason.is_empty(), "dependency status without a reason");
        Self {
            dep_name,
            passed,
            reason,
            ignorable,
        }
    }

    pub fn dep_name(&self) -> &'static str {
        self.dep_name
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Whether the predicate that produced this can be waived.
    pub fn ignorable(&self) -> bool {
        self.ignorable
    }
}

impl fmt::Display for DepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "[{verdict}] {}: {}", self.dep_name, self.reason)
    }
}
