// src/engine/mod.rs

//! Polling admission loop.
//!
//! A scheduler re-evaluates a pending task instance on its own cadence;
//! this module models that loop:
//! - the pure, synchronous [`core`] performs one admission attempt against
//!   a snapshot of the history and decides whether to keep polling;
//! - the async [`runtime`] shell reloads snapshots on a timer and stops on
//!   admission, attempt limit or Ctrl-C.

pub mod core;
pub mod runtime;
pub mod snapshot;

use std::time::Duration;

pub use self::core::{AdmissionCore, AdmissionOutcome};
pub use runtime::Runtime;
pub use snapshot::{FileSnapshotSource, Snapshot, SnapshotSource, TiRequest};

/// Options shared by the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollOptions {
    /// Delay between attempts; `None` means a single attempt.
    pub interval: Option<Duration>,
    /// Stop after this many attempts even if still denied.
    pub max_attempts: Option<u32>,
}

/// Parse `<n>ms`, `<n>s`, `<n>m` or `<n>h`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => secs(value, 60).map(Duration::from_secs),
        "h" => secs(value, 60 * 60).map(Duration::from_secs),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn secs(value: u64, unit: u64) -> Result<u64, String> {
    value
        .checked_mul(unit)
        .ok_or_else(|| format!("duration {value} overflows"))
}
