//! Error types for task-identifier generation.

use std::fmt;

/// Result type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a flow or computing task ids.
#[derive(Debug, Clone)]
pub enum Error {
    /// A dependency cycle was detected in the flow's task graph.
    CycleDetected {
        /// Human-readable description of where the cycle was found.
        message: String,
    },

    /// An edge referenced a task handle that does not belong to this flow.
    DanglingEdge {
        /// Description of the offending edge.
        message: String,
    },

    /// An edge would create a self-loop, which is not a valid dependency.
    SelfLoop {
        /// Name of the offending task, if available.
        task: String,
    },

    /// The same directed edge was added twice.
    DuplicateEdge {
        /// Description of the duplicated edge.
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleDetected { message } => {
                write!(f, "cycle detected in flow graph: {message}")
            }
            Self::DanglingEdge { message } => {
                write!(f, "edge references a task outside this flow: {message}")
            }
            Self::SelfLoop { task } => {
                write!(f, "task '{task}' cannot depend on itself")
            }
            Self::DuplicateEdge { message } => {
                write!(f, "duplicate edge: {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
