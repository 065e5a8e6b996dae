// src/dag/graph.rs

use std::collections::HashMap;

use crate::config::model::ConfigFile;

/// Internal node structure: stores immediate upstreams and downstreams.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Tasks that must finish before this one can run.
    upstream: Vec<String>,
    /// Tasks that list this one as upstream.
    downstream: Vec<String>,
}

/// Adjacency of a DAG keyed by task id.
///
/// Acyclicity is checked in `config::validate`; this only keeps the edges
/// the dependency predicates need (e.g. `wait_for_downstream`).
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    nodes: HashMap<String, DagNode>,
}

impl DagGraph {
    /// Build a graph from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::from_edges(
            cfg.task
                .iter()
                .map(|(name, task)| (name.as_str(), task.after.as_slice())),
        )
    }

    /// Build a graph from `(task_id, upstream_ids)` pairs.
    ///
    /// Upstream ids that are not themselves listed are ignored.
    pub fn from_edges<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut nodes: HashMap<String, DagNode> = HashMap::new();

        for (name, upstream) in tasks {
            nodes.insert(
                name.to_string(),
                DagNode {
                    upstream: upstream.to_vec(),
                    downstream: Vec::new(),
                },
            );
        }

        let task_names: Vec<String> = nodes.keys().cloned().collect();
        for task_name in task_names {
            let upstream = nodes
                .get(&task_name)
                .map(|n| n.upstream.clone())
                .unwrap_or_default();

            for up in upstream {
                if let Some(up_node) = nodes.get_mut(&up) {
                    up_node.downstream.push(task_name.clone());
                }
            }
        }

        for node in nodes.values_mut() {
            node.downstream.sort();
        }

        Self { nodes }
    }

    /// Immediate downstream task ids, sorted.
    pub fn downstream_of(&self, task_id: &str) -> &[String] {
        self.nodes
            .get(task_id)
            .map(|n| n.downstream.as_slice())
            .unwrap_or(&[])
    }
}
