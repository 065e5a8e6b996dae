#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tideps::config::{
    ConfigFile, ConfigSection, DagRunConfig, DagSection, RawConfigFile, TaskConfig,
    TaskInstanceConfig,
};
use tideps::deps::DepContext;
use tideps::types::{DagRunState, DepSetKind, EvaluationMode, TaskInstanceState};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(dag_id: &str) -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                context: DepContext::default(),
                dag: DagSection {
                    dag_id: dag_id.to_string(),
                    catchup: true,
                    start_date: None,
                },
                task: BTreeMap::new(),
                dag_run: Vec::new(),
                task_instance: Vec::new(),
            },
        }
    }

    pub fn catchup(mut self, val: bool) -> Self {
        self.config.dag.catchup = val;
        self
    }

    pub fn start_date(mut self, date: DateTime<Utc>) -> Self {
        self.config.dag.start_date = Some(date);
        self
    }

    pub fn mode(mut self, mode: EvaluationMode) -> Self {
        self.config.config.mode = mode;
        self
    }

    pub fn deps(mut self, kind: DepSetKind) -> Self {
        self.config.config.deps = kind;
        self
    }

    pub fn context(mut self, ctx: DepContext) -> Self {
        self.config.context = ctx;
        self
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    /// Runs are created in the order this is called.
    pub fn with_dag_run(mut self, run_id: &str, execution_date: DateTime<Utc>, state: DagRunState) -> Self {
        self.config.dag_run.push(DagRunConfig {
            run_id: run_id.to_string(),
            execution_date,
            state,
        });
        self
    }

    pub fn with_ti(self, task_id: &str, run_id: &str, state: TaskInstanceState) -> Self {
        self.with_mapped_ti(task_id, run_id, -1, state)
    }

    pub fn with_mapped_ti(
        mut self,
        task_id: &str,
        run_id: &str,
        map_index: i32,
        state: TaskInstanceState,
    ) -> Self {
        self.config.task_instance.push(TaskInstanceConfig {
            task_id: task_id.to_string(),
            run_id: run_id.to_string(),
            map_index,
            state,
        });
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn depends_on_past(mut self, val: bool) -> Self {
        self.task.depends_on_past = val;
        self
    }

    pub fn wait_for_downstream(mut self, val: bool) -> Self {
        self.task.wait_for_downstream = val;
        self
    }

    pub fn ignore_first_depends_on_past(mut self, val: bool) -> Self {
        self.task.ignore_first_depends_on_past = val;
        self
    }

    pub fn start_date(mut self, date: DateTime<Utc>) -> Self {
        self.task.start_date = Some(date);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

impl Default for TaskConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
