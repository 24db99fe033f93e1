//! Deterministic, content-derived task identifiers for DAG workflow graphs.
//!
//! Given a [`Flow`] (a DAG of tasks, possibly containing tasks that are
//! structurally indistinguishable from one another), [`generate_task_ids`]
//! assigns every task a stable 128-bit [`TaskId`] such that:
//!
//! - the same flow, built twice, yields the same ids (stability),
//! - distinct tasks in the same flow always get distinct ids (uniqueness),
//! - a small local edit to the flow changes only the ids it must (locality
//!   of change).
//!
//! # Example
//!
//! ```
//! use dagid_graph::{Flow, TaskFingerprintSource, generate_task_ids};
//!
//! struct Step(&'static str);
//!
//! impl TaskFingerprintSource for Step {
//!     fn identity_bytes(&self) -> Vec<Vec<u8>> {
//!         vec![self.0.as_bytes().to_vec()]
//!     }
//! }
//!
//! let mut flow = Flow::new("my-project", "my-flow", "1");
//! let extract = flow.add_task(Step("extract"));
//! let transform = flow.add_task(Step("transform"));
//! flow.add_edge(extract, transform).unwrap();
//!
//! let ids = generate_task_ids(&flow).unwrap();
//! assert_eq!(ids.len(), 2);
//! assert_ne!(ids[&extract], ids[&transform]);
//! ```

mod canonical;
mod engine;
mod error;
mod fingerprint;
mod flow;
mod hash;

pub use engine::{generate_task_ids, generate_task_ids_debug, StepMapping};
pub use error::{Error, Result};
pub use fingerprint::TaskFingerprintSource;
pub use flow::Flow;
pub use hash::{digest, TaskId};

pub use petgraph::graph::NodeIndex;
