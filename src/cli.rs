// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::deps::DepContext;
use crate::types::EvaluationMode;

/// Command-line arguments for `tideps`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tideps",
    version,
    about = "Explain whether a task instance may run, given its DAG's run history.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the scenario file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Tideps.toml")]
    pub scenario: String,

    /// Task id of the instance to evaluate.
    #[arg(long, value_name = "ID")]
    pub task: String,

    /// Run id of the DAG run the instance belongs to.
    #[arg(long, value_name = "ID")]
    pub run_id: String,

    /// Map index of the instance (-1 for unmapped).
    #[arg(long, value_name = "N", default_value_t = -1, allow_hyphen_values = true)]
    pub map_index: i32,

    /// Override `[config].mode` from the scenario
    /// (admission, explain, hard-blockers-only).
    #[arg(long, value_name = "MODE")]
    pub mode: Option<EvaluationMode>,

    #[arg(long)]
    pub ignore_all_deps: bool,

    #[arg(long)]
    pub ignore_depends_on_past: bool,

    #[arg(long)]
    pub ignore_task_deps: bool,

    #[arg(long)]
    pub ignore_ti_state: bool,

    /// Record `past_depends_met` when the past-dependency check passes.
    #[arg(long)]
    pub wait_for_past_depends: bool,

    /// Re-evaluate on this interval (e.g. "5s") until admitted.
    #[arg(long, value_name = "DURATION")]
    pub poll: Option<String>,

    /// Give up after this many attempts when polling.
    #[arg(long, value_name = "N")]
    pub max_polls: Option<u32>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TIDEPS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the scenario, but don't evaluate anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Context flags given on the command line. These are OR-ed into the
    /// scenario's `[context]`.
    pub fn context_overrides(&self) -> DepContext {
        DepContext {
            ignore_all_deps: self.ignore_all_deps,
            ignore_depends_on_past: self.ignore_depends_on_past,
            ignore_task_deps: self.ignore_task_deps,
            ignore_ti_state: self.ignore_ti_state,
            wait_for_past_depends_before_skipping: self.wait_for_past_depends,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
