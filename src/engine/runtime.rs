// src/engine/runtime.rs

use std::fmt;

use tracing::{debug, info};

use crate::deps::AdmissionDecision;
use crate::errors::Result;

use super::core::AdmissionCore;
use super::{PollOptions, SnapshotSource};

/// Async shell around [`AdmissionCore`]: loads a snapshot, asks the core,
/// sleeps, repeats.
///
/// Store and config errors end the loop and are returned; nothing is
/// retried here.
pub struct Runtime<S: SnapshotSource> {
    core: AdmissionCore,
    source: S,
    options: PollOptions,
}

impl<S: SnapshotSource> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl<S: SnapshotSource> Runtime<S> {
    pub fn new(core: AdmissionCore, source: S, options: PollOptions) -> Self {
        Self {
            core,
            source,
            options,
        }
    }

    /// Poll until admitted, out of attempts, or Ctrl-C. Returns the last
    /// decision.
    pub async fn run(mut self) -> Result<AdmissionDecision> {
        info!("tideps runtime started");

        loop {
            let snapshot = self.source.load()?;
            let outcome = self.core.attempt(&snapshot)?;

            debug!(
                attempt = outcome.attempt,
                admitted = outcome.decision.admitted,
                keep_polling = outcome.keep_polling,
                "admission attempt finished"
            );

            let Some(interval) = self.options.interval.filter(|_| outcome.keep_polling) else {
                info!(attempts = outcome.attempt, "runtime exiting");
                return Ok(outcome.decision);
            };

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        debug!(error = %e, "failed to listen for Ctrl+C");
                    }
                    info!("shutdown requested; returning last decision");
                    return Ok(outcome.decision);
                }
            }
        }
    }
}
