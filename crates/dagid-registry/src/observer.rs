//! Soft-failure reporting.
//!
//! The registry never fails a call outright for a duplicate registration
//! or a missing encryption key; it reports the condition through an
//! injectable [`WarningObserver`] instead, mirroring how the rest of this
//! workspace treats non-fatal conditions as something the caller observes
//! rather than something that aborts the call.

use std::sync::Arc;

/// The kind of non-fatal condition encountered by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A flow was registered under a key that was already present.
    DuplicateRegistration,
    /// Serialization or deserialization proceeded without an encryption
    /// key configured.
    EncryptionUnavailable,
}

/// Receives non-fatal warnings produced by a [`crate::Registry`].
pub trait WarningObserver: Send + Sync {
    /// Called once per warning, with a human-readable detail string.
    fn on_warning(&self, kind: WarningKind, detail: &str);
}

/// Default observer: forwards every warning to `tracing::warn!`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl WarningObserver for TracingObserver {
    fn on_warning(&self, kind: WarningKind, detail: &str) {
        tracing::warn!(?kind, detail, "registry warning");
    }
}

pub(crate) fn default_observer() -> Arc<dyn WarningObserver> {
    Arc::new(TracingObserver)
}
