// src/engine/core.rs

//! Pure admission core.
//!
//! Synchronous and deterministic: given a snapshot it runs the evaluator
//! once and says whether the shell should poll again. No Tokio, channels or
//! filesystem in here.

use tracing::{info, warn};

use crate::deps::{AdmissionDecision, DepEvaluator};
use crate::engine::{PollOptions, Snapshot};
use crate::errors::Result;

/// What one attempt produced.
#[derive(Debug, Clone)]
pub struct AdmissionOutcome {
    pub decision: AdmissionDecision,
    /// 1-based attempt counter.
    pub attempt: u32,
    pub keep_polling: bool,
}

#[derive(Debug)]
pub struct AdmissionCore {
    evaluator: DepEvaluator,
    options: PollOptions,
    attempts: u32,
}

impl AdmissionCore {
    pub fn new(evaluator: DepEvaluator, options: PollOptions) -> Self {
        Self {
            evaluator,
            options,
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run one admission attempt against `snapshot`.
    pub fn attempt(&mut self, snapshot: &Snapshot) -> Result<AdmissionOutcome> {
        self.attempts += 1;

        let target = snapshot.dag.ti_ref(&snapshot.ti)?;
        let decision = self
            .evaluator
            .evaluate(target, &snapshot.store, &snapshot.ctx)?;

        let limit_reached = self
            .options
            .max_attempts
            .is_some_and(|max| self.attempts >= max);
        let keep_polling =
            !decision.admitted && self.options.interval.is_some() && !limit_reached;

        if decision.admitted {
            info!(ti = %snapshot.ti, attempt = self.attempts, "task instance admitted");
        } else {
            for status in decision.blocking() {
                warn!(
                    ti = %snapshot.ti,
                    attempt = self.attempts,
                    dep = status.dep_name(),
                    reason = status.reason(),
                    "task instance blocked"
                );
            }
            if limit_reached {
                info!(attempt = self.attempts, "attempt limit reached; giving up");
            }
        }

        Ok(AdmissionOutcome {
            decision,
            attempt: self.attempts,
            keep_polling,
        })
    }
}
