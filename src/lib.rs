// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod deps;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod store;
pub mod types;

use std::fmt::Write as _;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::deps::{AdmissionDecision, DepEvaluator};
use crate::engine::{
    parse_duration, AdmissionCore, FileSnapshotSource, PollOptions, Runtime, TiRequest,
};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - scenario loading and validation
/// - the predicate set and evaluation mode
/// - the polling runtime (single attempt unless `--poll` is given)
/// - report output on stdout
///
/// Returns `None` for `--dry-run`, otherwise the final decision.
pub async fn run(args: CliArgs) -> Result<Option<AdmissionDecision>> {
    let cfg = load_and_validate(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario))?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(None);
    }

    let mode = args.mode.unwrap_or(cfg.config.mode);
    let evaluator = DepEvaluator::for_kind(cfg.config.deps, mode);

    let interval = args
        .poll
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(|e| anyhow::anyhow!("invalid --poll: {e}"))?;
    let options = PollOptions {
        interval,
        max_attempts: args.max_polls,
    };

    let request = TiRequest {
        task_id: args.task.clone(),
        run_id: args.run_id.clone(),
        map_index: args.map_index,
    };
    info!(?request, ?mode, deps = ?cfg.config.deps, "evaluating task instance");

    let source = FileSnapshotSource::new(&args.scenario, request.clone(), args.context_overrides());
    let core = AdmissionCore::new(evaluator, options);
    let decision = Runtime::new(core, source, options).run().await?;

    print!("{}", render_report(&request, &decision));
    Ok(Some(decision))
}

/// Human-readable report of a decision, one line per status.
pub fn render_report(request: &TiRequest, decision: &AdmissionDecision) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "task instance {} in run {} (map_index={}), mode {:?}",
        request.task_id, request.run_id, request.map_index, decision.mode
    );

    for status in &decision.statuses {
        let _ = write!(out, "  {status}");
        if !status.passed() && status.ignorable() {
            out.push_str(" (ignorable)");
        }
        out.push('\n');
    }

    let verdict = if decision.admitted { "ADMITTED" } else { "DENIED" };
    let _ = writeln!(out, "decision: {verdict}");
    out
}

/// Simple dry-run output: print the DAG, its runs and task instances.
fn print_dry_run(cfg: &ConfigFile) {
    println!("tideps dry-run");
    println!("  config.mode = {:?}", cfg.config.mode);
    println!("  config.deps = {:?}", cfg.config.deps);
    println!("  context = {:?}", cfg.context);
    println!();

    println!("dag {} (catchup = {}):", cfg.dag.dag_id, cfg.dag.catchup);
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        if task.depends_on_past {
            println!("      depends_on_past: true");
        }
        if task.wait_for_downstream {
            println!("      wait_for_downstream: true");
        }
        if task.ignore_first_depends_on_past {
            println!("      ignore_first_depends_on_past: true");
        }
        if let Some(start) = task.start_date {
            println!("      start_date: {start}");
        }
    }

    println!();
    println!("dag runs ({}):", cfg.dag_run.len());
    for dr in cfg.dag_run.iter() {
        println!("  - {} @ {} [{}]", dr.run_id, dr.execution_date, dr.state);
    }

    println!();
    println!("task instances ({}):", cfg.task_instance.len());
    for ti in cfg.task_instance.iter() {
        println!(
            "  - {} in {} (map_index={}) [{}]",
            ti.task_id, ti.run_id, ti.map_index, ti.state
        );
    }

    debug!("dry-run complete (no evaluation)");
}
