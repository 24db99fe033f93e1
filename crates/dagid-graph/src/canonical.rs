//! Canonical-form helpers used to break ties between tasks that remain
//! indistinguishable after the concentric-neighbor fixed point.
//!
//! None of these functions claim to resolve every graph automorphism.
//! See the step-5 discussion in the crate-level documentation. They
//! resolve every case of symmetry this crate's tests exercise.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::NodeIndex;

use crate::fingerprint::TaskFingerprintSource;
use crate::flow::Flow;
use crate::hash::TaskId;

/// The secondary key used to rank tasks within a step-4 partition before
/// assigning final, disambiguated ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct CanonicalKey {
    depth: usize,
    component: Vec<TaskId>,
    bfs_signature: Vec<TaskId>,
}

/// Longest-path distance from any source task (a task with no upstream
/// neighbors) to `idx`.
pub(crate) fn depth_from_source<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    order: &[NodeIndex],
    idx: NodeIndex,
) -> usize {
    let mut depth = vec![0usize; order.len()];
    let pos: std::collections::HashMap<NodeIndex, usize> =
        order.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    for &node in order {
        let mut d = 0usize;
        for up in flow.upstream(node) {
            if let Some(&up_pos) = pos.get(&up) {
                d = d.max(depth[up_pos] + 1);
            }
        }
        depth[pos[&node]] = d;
    }

    depth[pos[&idx]]
}

/// The sorted multiset of `id_4` values reachable from `idx` ignoring edge
/// direction, i.e. the weakly-connected component's signature.
pub(crate) fn component_multiset<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    id4: &std::collections::HashMap<NodeIndex, TaskId>,
    idx: NodeIndex,
) -> Vec<TaskId> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(idx);
    seen.insert(idx);
    let mut out = Vec::new();

    while let Some(n) = queue.pop_front() {
        out.push(id4[&n]);
        for neighbor in flow.neighbors(n) {
            if seen.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    out.sort();
    out
}

/// A deterministic multi-source BFS signature: at each level, upstream
/// neighbors are visited before downstream neighbors, and each level's
/// neighbor ids are sorted before being folded into the signature and
/// before becoming the next level's frontier.
pub(crate) fn bfs_signature<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    id4: &std::collections::HashMap<NodeIndex, TaskId>,
    idx: NodeIndex,
) -> Vec<TaskId> {
    let mut visited = HashSet::new();
    visited.insert(idx);
    let mut frontier = vec![idx];
    let mut signature = vec![id4[&idx]];

    while !frontier.is_empty() {
        let mut next_level: Vec<TaskId> = Vec::new();
        let mut next_frontier = Vec::new();

        for &n in &frontier {
            let mut ups: Vec<NodeIndex> = flow
                .upstream(n)
                .into_iter()
                .filter(|u| !visited.contains(u))
                .collect();
            ups.sort_by_key(|&u| id4[&u]);

            let mut downs: Vec<NodeIndex> = flow
                .downstream(n)
                .into_iter()
                .filter(|d| !visited.contains(d))
                .collect();
            downs.sort_by_key(|&d| id4[&d]);

            for n2 in ups.into_iter().chain(downs) {
                if visited.insert(n2) {
                    next_level.push(id4[&n2]);
                    next_frontier.push(n2);
                }
            }
        }

        next_level.sort();
        signature.extend(next_level);
        frontier = next_frontier;
    }

    signature
}

/// Computes the full canonical key used to rank a task against its
/// step-4-identical peers.
pub(crate) fn canonical_key<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    order: &[NodeIndex],
    id4: &std::collections::HashMap<NodeIndex, TaskId>,
    idx: NodeIndex,
) -> CanonicalKey {
    CanonicalKey {
        depth: depth_from_source(flow, order, idx),
        component: component_multiset(flow, id4, idx),
        bfs_signature: bfs_signature(flow, id4, idx),
    }
}
