//! The task graph a flow's tasks and edges live in.

use std::collections::HashSet;

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fingerprint::TaskFingerprintSource;

/// A workflow graph: a project, a name, a version, and a DAG of tasks.
///
/// `version` participates in nothing but display/bookkeeping. It is
/// deliberately excluded from the flow fingerprint and therefore from every
/// task id.
pub struct Flow<T: TaskFingerprintSource> {
    project: String,
    name: String,
    version: String,
    graph: DiGraph<T, ()>,
}

impl<T: TaskFingerprintSource> Flow<T> {
    /// Creates an empty flow.
    #[must_use]
    pub fn new(project: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
            version: version.into(),
            graph: DiGraph::new(),
        }
    }

    /// Returns the flow's project.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the flow's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the flow's version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Adds a task to the flow, returning its opaque handle.
    ///
    /// Two tasks with identical fingerprints remain distinct nodes: the
    /// handle, not the fingerprint, is the task's identity within the
    /// graph.
    pub fn add_task(&mut self, task: T) -> NodeIndex {
        let idx = self.graph.add_node(task);
        debug!(node = ?idx, "added task to flow");
        idx
    }

    /// Adds a directed dependency edge `upstream -> downstream`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingEdge`] if either handle does not belong to
    /// this flow's graph, [`Error::SelfLoop`] if `upstream == downstream`,
    /// and [`Error::DuplicateEdge`] if the edge already exists.
    pub fn add_edge(&mut self, upstream: NodeIndex, downstream: NodeIndex) -> Result<()> {
        if !self.graph.node_indices().any(|i| i == upstream) {
            return Err(Error::DanglingEdge {
                message: format!("{upstream:?} is not a task in this flow"),
            });
        }
        if !self.graph.node_indices().any(|i| i == downstream) {
            return Err(Error::DanglingEdge {
                message: format!("{downstream:?} is not a task in this flow"),
            });
        }
        if upstream == downstream {
            return Err(Error::SelfLoop {
                task: format!("{upstream:?}"),
            });
        }
        if self.graph.find_edge(upstream, downstream).is_some() {
            return Err(Error::DuplicateEdge {
                message: format!("{upstream:?} -> {downstream:?}"),
            });
        }

        self.graph.add_edge(upstream, downstream, ());
        Ok(())
    }

    /// Returns `true` if the flow's graph contains a cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns every task handle in the flow, in insertion order.
    #[must_use]
    pub fn task_indices(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().collect()
    }

    /// Returns a reference to a task's data.
    #[must_use]
    pub fn task(&self, idx: NodeIndex) -> Option<&T> {
        self.graph.node_weight(idx)
    }

    /// Returns the task's direct upstream neighbors (unordered).
    #[must_use]
    pub fn upstream(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph.neighbors_directed(idx, Direction::Incoming).collect()
    }

    /// Returns the task's direct downstream neighbors (unordered).
    #[must_use]
    pub fn downstream(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph.neighbors_directed(idx, Direction::Outgoing).collect()
    }

    /// Returns every direct neighbor (upstream and downstream), deduplicated.
    #[must_use]
    pub fn neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut out = Vec::new();
        for n in self.upstream(idx).into_iter().chain(self.downstream(idx)) {
            if seen.insert(n) {
                out.push(n);
            }
        }
        out
    }

    /// Returns tasks in topological order (upstream before downstream).
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] if the graph is not a DAG.
    pub fn topological_order(&self) -> Result<Vec<NodeIndex>> {
        toposort(&self.graph, None).map_err(|cycle| Error::CycleDetected {
            message: format!("cycle through node {:?}", cycle.node_id()),
        })
    }
}
