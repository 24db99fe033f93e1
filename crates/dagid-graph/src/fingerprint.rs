//! Fingerprinting of individual tasks and of the enclosing flow.

use crate::hash::digest;

/// Trait implemented by a host's task type to expose the bytes that
/// identify it.
///
/// Only attributes returned by [`identity_bytes`](TaskFingerprintSource::identity_bytes)
/// participate in id generation; anything else attached to the task
/// (runtime state, caches, incidental bookkeeping) is invisible to the
/// algorithm.
pub trait TaskFingerprintSource {
    /// Returns the ordered list of byte strings that make up this task's
    /// identifying content (name, slug, declared type, user-set identity
    /// fields, ...).
    fn identity_bytes(&self) -> Vec<Vec<u8>>;
}

/// Computes a task's self-fingerprint, independent of any flow context.
pub(crate) fn fingerprint<T: TaskFingerprintSource>(task: &T) -> Vec<u8> {
    let parts = task.identity_bytes();
    digest(parts).as_bytes().to_vec()
}

/// Computes the flow's identity fingerprint from `(project, name)`.
///
/// The flow's version is deliberately excluded: bumping it must never
/// change any task id.
pub(crate) fn flow_fp(project: &str, name: &str) -> Vec<u8> {
    digest([project.as_bytes(), name.as_bytes()])
        .as_bytes()
        .to_vec()
}
