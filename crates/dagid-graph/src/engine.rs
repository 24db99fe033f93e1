//! The five-step identifier diffusion algorithm.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::canonical::canonical_key;
use crate::error::Result;
use crate::fingerprint::{fingerprint, flow_fp};
use crate::flow::Flow;
use crate::hash::{digest, TaskId};
use crate::TaskFingerprintSource;

/// The id mapping produced by one step of the algorithm.
pub type StepMapping = HashMap<NodeIndex, TaskId>;

/// Computes the final `task -> id` mapping for every task in `flow`.
///
/// # Errors
///
/// Returns an error if the flow's graph contains a cycle.
pub fn generate_task_ids<T: TaskFingerprintSource>(flow: &Flow<T>) -> Result<StepMapping> {
    let steps = run_steps(flow)?;
    // SAFETY (logical, not memory): run_steps always returns exactly 5
    // entries.
    Ok(steps.into_iter().last().unwrap_or_default())
}

/// Computes the id mapping after each of the five algorithm steps, for
/// testing the algorithm's convergence behavior.
///
/// # Errors
///
/// Returns an error if the flow's graph contains a cycle.
pub fn generate_task_ids_debug<T: TaskFingerprintSource>(flow: &Flow<T>) -> Result<[StepMapping; 5]> {
    let steps = run_steps(flow)?;
    let mut iter = steps.into_iter();
    Ok([
        iter.next().unwrap_or_default(),
        iter.next().unwrap_or_default(),
        iter.next().unwrap_or_default(),
        iter.next().unwrap_or_default(),
        iter.next().unwrap_or_default(),
    ])
}

fn run_steps<T: TaskFingerprintSource>(flow: &Flow<T>) -> Result<Vec<StepMapping>> {
    let order = flow.topological_order()?;
    let total = order.len();
    let fp = flow_fp(flow.project(), flow.name());

    let mut steps: Vec<StepMapping> = Vec::with_capacity(5);

    // Step 1: self.
    let step1 = self_step(flow, &order, &fp);
    steps.push(step1.clone());

    // Step 2: forward diffusion.
    let step2 = if resolved(&steps[0], total) {
        steps[0].clone()
    } else {
        forward_step(flow, &order, &fp)
    };
    steps.push(step2.clone());

    // Step 3: backward diffusion.
    let step3 = if resolved(&steps[1], total) {
        steps[1].clone()
    } else {
        backward_step(flow, &order, &step2)
    };
    steps.push(step3.clone());

    // Step 4: concentric neighbor fixed point.
    let step4 = if resolved(&steps[2], total) {
        steps[2].clone()
    } else {
        concentric_step(flow, &order, &step3)
    };
    steps.push(step4.clone());

    // Step 5: duplicate disambiguation.
    let step5 = if resolved(&steps[3], total) {
        steps[3].clone()
    } else {
        disambiguate_step(flow, &order, &step4)
    };
    steps.push(step5);

    debug!(
        tasks = total,
        unique_after_5 = steps.last().map(|s| unique_count(s)).unwrap_or_default(),
        "computed task ids"
    );

    Ok(steps)
}

fn resolved(step: &StepMapping, total: usize) -> bool {
    unique_count(step) == total
}

fn unique_count(step: &StepMapping) -> usize {
    let mut ids: Vec<&TaskId> = step.values().collect();
    ids.sort();
    ids.dedup();
    ids.len()
}

fn self_step<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    order: &[NodeIndex],
    fp: &[u8],
) -> StepMapping {
    order
        .iter()
        .filter_map(|&idx| {
            let task = flow.task(idx)?;
            let id = digest([fp.to_vec(), fingerprint(task)]);
            Some((idx, id))
        })
        .collect()
}

fn forward_step<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    order: &[NodeIndex],
    fp: &[u8],
) -> StepMapping {
    let mut out: StepMapping = HashMap::with_capacity(order.len());

    for &idx in order {
        let Some(task) = flow.task(idx) else { continue };

        let mut upstream_ids: Vec<TaskId> = flow
            .upstream(idx)
            .into_iter()
            .map(|u| out[&u])
            .collect();
        upstream_ids.sort();

        let mut parts: Vec<Vec<u8>> = vec![fp.to_vec(), fingerprint(task), b"\xe2\x86\x91".to_vec()];
        parts.extend(upstream_ids.iter().map(|id| id.as_bytes().to_vec()));

        let id = digest(parts);
        out.insert(idx, id);
    }

    out
}

fn backward_step<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    order: &[NodeIndex],
    step2: &StepMapping,
) -> StepMapping {
    let mut out: StepMapping = HashMap::with_capacity(order.len());

    for &idx in order.iter().rev() {
        let mut downstream_ids: Vec<TaskId> = flow
            .downstream(idx)
            .into_iter()
            .map(|d| out[&d])
            .collect();
        downstream_ids.sort();

        let mut parts: Vec<Vec<u8>> = vec![step2[&idx].as_bytes().to_vec(), b"\xe2\x86\x93".to_vec()];
        parts.extend(downstream_ids.iter().map(|id| id.as_bytes().to_vec()));

        let id = digest(parts);
        out.insert(idx, id);
    }

    out
}

fn concentric_step<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    order: &[NodeIndex],
    step3: &StepMapping,
) -> StepMapping {
    let mut current = step3.clone();
    let max_rounds = order.len().max(1);

    for _ in 0..max_rounds {
        let mut next: StepMapping = HashMap::with_capacity(order.len());
        let mut changed = false;

        for &idx in order {
            let mut neighbor_ids: Vec<TaskId> = flow.neighbors(idx).into_iter().map(|n| current[&n]).collect();
            neighbor_ids.sort();

            let mut parts: Vec<Vec<u8>> = vec![current[&idx].as_bytes().to_vec(), b"\xe2\x88\x98".to_vec()];
            parts.extend(neighbor_ids.iter().map(|id| id.as_bytes().to_vec()));

            let id = digest(parts);
            if id != current[&idx] {
                changed = true;
            }
            next.insert(idx, id);
        }

        current = next;
        if !changed {
            break;
        }
    }

    current
}

fn disambiguate_step<T: TaskFingerprintSource>(
    flow: &Flow<T>,
    order: &[NodeIndex],
    step4: &StepMapping,
) -> StepMapping {
    let mut partitions: HashMap<TaskId, Vec<NodeIndex>> = HashMap::new();
    for &idx in order {
        partitions.entry(step4[&idx]).or_default().push(idx);
    }

    let mut out: StepMapping = HashMap::with_capacity(order.len());

    for (_id, mut members) in partitions {
        if members.len() == 1 {
            let idx = members[0];
            out.insert(idx, step4[&idx]);
            continue;
        }

        members.sort_by(|&a, &b| {
            let ka = canonical_key(flow, order, step4, a);
            let kb = canonical_key(flow, order, step4, b);
            ka.cmp(&kb).then_with(|| a.cmp(&b))
        });

        for (rank, idx) in members.into_iter().enumerate() {
            let parts: [Vec<u8>; 3] = [
                step4[&idx].as_bytes().to_vec(),
                b"#".to_vec(),
                (rank as u64).to_le_bytes().to_vec(),
            ];
            out.insert(idx, digest(parts));
        }
    }

    out
}
