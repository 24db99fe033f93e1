//! Literal debug-trace step-count and stability scenarios.

use std::collections::HashMap;

use dagid_graph::{generate_task_ids, generate_task_ids_debug, Flow, NodeIndex, TaskFingerprintSource};

#[derive(Clone)]
struct ScenarioTask {
    label: &'static str,
}

impl TaskFingerprintSource for ScenarioTask {
    fn identity_bytes(&self) -> Vec<Vec<u8>> {
        vec![self.label.as_bytes().to_vec()]
    }
}

fn new_flow() -> Flow<ScenarioTask> {
    Flow::new("proj", "scenario-flow", "1")
}

fn unique_counts(steps: &[HashMap<NodeIndex, dagid_graph::TaskId>; 5]) -> [usize; 5] {
    let mut out = [0usize; 5];
    for (i, step) in steps.iter().enumerate() {
        let mut ids: Vec<_> = step.values().collect();
        ids.sort();
        ids.dedup();
        out[i] = ids.len();
    }
    out
}

#[test]
fn single_task() {
    let mut flow = new_flow();
    flow.add_task(ScenarioTask { label: "x1" });

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 1, 1, 1, 1]);
}

#[test]
fn two_independent_identical_tasks() {
    let mut flow = new_flow();
    flow.add_task(ScenarioTask { label: "x" });
    flow.add_task(ScenarioTask { label: "x" });

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 1, 1, 1, 2]);
}

#[test]
fn ten_independent_identical_tasks() {
    let mut flow = new_flow();
    for _ in 0..10 {
        flow.add_task(ScenarioTask { label: "x" });
    }

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 1, 1, 1, 10]);
}

#[test]
fn ten_independent_distinct_tasks() {
    let labels: Vec<&'static str> = vec![
        "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8", "t9",
    ];
    let mut flow = new_flow();
    for label in labels {
        flow.add_task(ScenarioTask { label });
    }

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [10, 10, 10, 10, 10]);
}

#[test]
fn chain_of_two_identical_tasks() {
    let mut flow = new_flow();
    let x1 = flow.add_task(ScenarioTask { label: "x" });
    let x2 = flow.add_task(ScenarioTask { label: "x" });
    flow.add_edge(x1, x2).unwrap();

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 2, 2, 2, 2]);
}

#[test]
fn two_identical_chains() {
    let mut flow = new_flow();
    let x1 = flow.add_task(ScenarioTask { label: "x" });
    let x2 = flow.add_task(ScenarioTask { label: "x" });
    let y1 = flow.add_task(ScenarioTask { label: "x" });
    let y2 = flow.add_task(ScenarioTask { label: "x" });
    flow.add_edge(x1, x2).unwrap();
    flow.add_edge(y1, y2).unwrap();

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 2, 2, 2, 4]);
}

#[test]
fn linked_chains_with_cross_edge() {
    let mut flow = new_flow();
    let x1 = flow.add_task(ScenarioTask { label: "x" });
    let x2 = flow.add_task(ScenarioTask { label: "x" });
    let x3 = flow.add_task(ScenarioTask { label: "x" });
    let y1 = flow.add_task(ScenarioTask { label: "x" });
    let y2 = flow.add_task(ScenarioTask { label: "x" });
    let y3 = flow.add_task(ScenarioTask { label: "x" });
    flow.add_edge(x1, x2).unwrap();
    flow.add_edge(x2, x3).unwrap();
    flow.add_edge(y1, y2).unwrap();
    flow.add_edge(y2, y3).unwrap();
    flow.add_edge(x1, y2).unwrap();

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 5, 6, 6, 6]);
}

#[test]
fn three_identical_chains_of_three() {
    let mut flow = new_flow();
    for _ in 0..3 {
        let a = flow.add_task(ScenarioTask { label: "x" });
        let b = flow.add_task(ScenarioTask { label: "x" });
        let c = flow.add_task(ScenarioTask { label: "x" });
        flow.add_edge(a, b).unwrap();
        flow.add_edge(b, c).unwrap();
    }

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 3, 3, 3, 9]);
}

#[test]
fn diamond() {
    let mut flow = new_flow();
    let x1 = flow.add_task(ScenarioTask { label: "x" });
    let x2 = flow.add_task(ScenarioTask { label: "x" });
    let x3 = flow.add_task(ScenarioTask { label: "x" });
    let y1 = flow.add_task(ScenarioTask { label: "x" });
    flow.add_edge(x1, x2).unwrap();
    flow.add_edge(x2, x3).unwrap();
    flow.add_edge(x1, y1).unwrap();
    flow.add_edge(y1, x3).unwrap();

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 3, 3, 3, 4]);

    // x2 and y1 are the genuinely symmetric pair; they must still end up
    // with distinct final ids.
    let last = &steps[4];
    assert_ne!(last[&x2], last[&y1]);
}

/// Builds five independent chains of 10 identical tasks each (labeled
/// `a0..a9`, `b0..b9`, ..., `e0..e9`), returning the flow plus a lookup from
/// label to the task's handle so callers can add cross-branch edges.
fn five_chains_of_ten() -> (Flow<ScenarioTask>, HashMap<String, NodeIndex>) {
    let mut flow = new_flow();
    let mut by_label = HashMap::new();

    for branch in ["a", "b", "c", "d", "e"] {
        let mut prev = None;
        for i in 0..10 {
            let n = flow.add_task(ScenarioTask { label: "x" });
            by_label.insert(format!("{branch}{i}"), n);
            if let Some(p) = prev {
                flow.add_edge(p, n).unwrap();
            }
            prev = Some(n);
        }
    }

    (flow, by_label)
}

#[test]
fn pathological_grid_needs_concentric_search() {
    // Five chains of 10, cross-linked a3->b4, b3->c4, c3->d4, d3->e4.
    // One forward and one backward pass are not enough; this is exactly the
    // shape the concentric neighbor fixed point exists to resolve.
    let (mut flow, by_label) = five_chains_of_ten();
    flow.add_edge(by_label["a3"], by_label["b4"]).unwrap();
    flow.add_edge(by_label["b3"], by_label["c4"]).unwrap();
    flow.add_edge(by_label["c3"], by_label["d4"]).unwrap();
    flow.add_edge(by_label["d3"], by_label["e4"]).unwrap();

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 16, 24, 50, 50]);
}

#[test]
fn near_pathological_grid_resolves_by_backward_pass() {
    // Five chains of 10, cross-linked a4->b3, b4->c3, c4->d3, d4->e3: a
    // staggered variant of the pathological grid that a forward-then-backward
    // pass alone is enough to fully resolve.
    let (mut flow, by_label) = five_chains_of_ten();
    flow.add_edge(by_label["a4"], by_label["b3"]).unwrap();
    flow.add_edge(by_label["b4"], by_label["c3"]).unwrap();
    flow.add_edge(by_label["c4"], by_label["d3"]).unwrap();
    flow.add_edge(by_label["d4"], by_label["e3"]).unwrap();

    let steps = generate_task_ids_debug(&flow).unwrap();
    assert_eq!(unique_counts(&steps), [1, 38, 50, 50, 50]);
}

#[test]
fn empty_flow_returns_empty_mapping() {
    let flow: Flow<ScenarioTask> = new_flow();
    let ids = generate_task_ids(&flow).unwrap();
    assert!(ids.is_empty());
}

#[test]
fn rebuilding_same_flow_is_stable() {
    let build = || {
        let mut flow = new_flow();
        let a = flow.add_task(ScenarioTask { label: "fetch" });
        let b = flow.add_task(ScenarioTask { label: "process" });
        flow.add_edge(a, b).unwrap();
        flow
    };

    let ids_a = generate_task_ids(&build()).unwrap();
    let ids_b = generate_task_ids(&build()).unwrap();

    let mut sorted_a: Vec<_> = ids_a.values().collect();
    let mut sorted_b: Vec<_> = ids_b.values().collect();
    sorted_a.sort();
    sorted_b.sort();
    assert_eq!(sorted_a, sorted_b);
}

#[test]
fn version_change_preserves_every_id() {
    let mut flow_a = Flow::new("proj", "name", "1.0.0");
    let a1 = flow_a.add_task(ScenarioTask { label: "a" });
    let a2 = flow_a.add_task(ScenarioTask { label: "b" });
    flow_a.add_edge(a1, a2).unwrap();

    let mut flow_b = Flow::new("proj", "name", "2.0.0");
    let b1 = flow_b.add_task(ScenarioTask { label: "a" });
    let b2 = flow_b.add_task(ScenarioTask { label: "b" });
    flow_b.add_edge(b1, b2).unwrap();

    let ids_a = generate_task_ids(&flow_a).unwrap();
    let ids_b = generate_task_ids(&flow_b).unwrap();

    assert_eq!(ids_a[&a1], ids_b[&b1]);
    assert_eq!(ids_a[&a2], ids_b[&b2]);
}

#[test]
fn project_change_changes_every_id() {
    let mut flow_a = Flow::new("proj-a", "name", "1");
    let a1 = flow_a.add_task(ScenarioTask { label: "a" });
    let a2 = flow_a.add_task(ScenarioTask { label: "b" });
    flow_a.add_edge(a1, a2).unwrap();

    let mut flow_b = Flow::new("proj-b", "name", "1");
    let b1 = flow_b.add_task(ScenarioTask { label: "a" });
    let b2 = flow_b.add_task(ScenarioTask { label: "b" });
    flow_b.add_edge(b1, b2).unwrap();

    let ids_a = generate_task_ids(&flow_a).unwrap();
    let ids_b = generate_task_ids(&flow_b).unwrap();

    assert_ne!(ids_a[&a1], ids_b[&b1]);
    assert_ne!(ids_a[&a2], ids_b[&b2]);
}

#[test]
fn renaming_a_task_only_affects_its_descendants() {
    // x1 -> x2 -> ... -> x7, renaming x5 affects {x5, x6, x7}.
    let build = |x5_label: &'static str| {
        let mut flow = new_flow();
        let mut prev = None;
        let mut nodes = Vec::new();
        for i in 1..=7 {
            let label = if i == 5 { x5_label } else { "x" };
            let n = flow.add_task(ScenarioTask { label });
            if let Some(p) = prev {
                flow.add_edge(p, n).unwrap();
            }
            prev = Some(n);
            nodes.push(n);
        }
        (flow, nodes)
    };

    let (flow_a, nodes_a) = build("x");
    let (flow_b, nodes_b) = build("renamed");

    let ids_a = generate_task_ids(&flow_a).unwrap();
    let ids_b = generate_task_ids(&flow_b).unwrap();

    let mut overlap = 0;
    let values_a: Vec<_> = nodes_a.iter().map(|n| ids_a[n]).collect();
    let values_b: Vec<_> = nodes_b.iter().map(|n| ids_b[n]).collect();
    for va in &values_a {
        if values_b.contains(va) {
            overlap += 1;
        }
    }
    assert_eq!(overlap, 4);
}
