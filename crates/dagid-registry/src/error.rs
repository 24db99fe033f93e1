//! Error types for registry operations.

use thiserror::Error;

/// Result type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures surfaced to the caller.
///
/// Soft failures (duplicate registration, missing encryption key) are
/// delivered through the installed [`crate::observer::WarningObserver`]
/// instead of as an `Err`. See the crate-level documentation.
#[derive(Debug, Error)]
pub enum Error {
    /// No flow is registered under the requested `(project, name, version)`.
    #[error("no flow registered for {project}/{name}@{version}")]
    NotFound {
        /// The requested project.
        project: String,
        /// The requested flow name.
        name: String,
        /// The requested version.
        version: String,
    },

    /// The serialized registry could not be parsed, or was wrapped with a
    /// key that does not match the one it was sealed with.
    #[error("serialized registry is corrupt: {0}")]
    CorruptSerializedRegistry(String),

    /// Reading or writing the `load_on_startup` snapshot path failed.
    #[error("registry snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A flow's graph was invalid (propagated from the engine).
    #[error(transparent)]
    Graph(#[from] dagid_graph::Error),
}
