// src/config/validate.rs

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TidepsError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TidepsError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Run every semantic check on a raw scenario.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_raw_config(cfg)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_dag_section(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    validate_dag_runs(cfg)?;
    validate_task_instances(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TidepsError::ConfigError(
            "scenario must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_dag_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.dag.dag_id.trim().is_empty() {
        return Err(TidepsError::ConfigError(
            "[dag].dag_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if !cfg.task.contains_key(dep) {
                return Err(TidepsError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(TidepsError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: upstream -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(TidepsError::DagCycle(format!(
            "cycle detected in task DAG involving task '{}'",
            cycle.node_id()
        ))),
    }
}

fn validate_dag_runs(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    let mut dates = HashMap::new();
    for dr in cfg.dag_run.iter() {
        if !seen.insert(dr.run_id.as_str()) {
            return Err(TidepsError::ConfigError(format!(
                "dag run '{}' is listed more than once",
                dr.run_id
            )));
        }
        // Schedule order must be total.
        if let Some(other) = dates.insert(dr.execution_date, dr.run_id.as_str()) {
            return Err(TidepsError::ConfigError(format!(
                "dag runs '{}' and '{}' share execution_date {}",
                other, dr.run_id, dr.execution_date
            )));
        }
    }
    Ok(())
}

fn validate_task_instances(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for ti in cfg.task_instance.iter() {
        if !cfg.task.contains_key(&ti.task_id) {
            return Err(TidepsError::ConfigError(format!(
                "task instance references unknown task '{}'",
                ti.task_id
            )));
        }
        if !cfg.dag_run.iter().any(|dr| dr.run_id == ti.run_id) {
            return Err(TidepsError::ConfigError(format!(
                "task instance of '{}' references unknown dag run '{}'",
                ti.task_id, ti.run_id
            )));
        }
        if ti.map_index < -1 {
            return Err(TidepsError::ConfigError(format!(
                "task instance of '{}' in '{}' has invalid map_index {}",
                ti.task_id, ti.run_id, ti.map_index
            )));
        }
        if !seen.insert((ti.task_id.as_str(), ti.run_id.as_str(), ti.map_index)) {
            return Err(TidepsError::ConfigError(format!(
                "task instance of '{}' in '{}' (map_index {}) is listed more than once",
                ti.task_id, ti.run_id, ti.map_index
            )));
        }
    }
    Ok(())
}
