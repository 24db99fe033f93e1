//! The process-wide flow registry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use dagid_graph::{generate_task_ids, Flow, NodeIndex, TaskFingerprintSource, TaskId};

use crate::cipher;
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::observer::{default_observer, WarningKind, WarningObserver};

/// Key under which a flow is registered: `(project, name, version)`.
pub type FlowKey = (String, String, String);

/// What the registry actually keeps for a registered flow.
///
/// Only the computed task ids and the edge shape they were derived from
/// are kept, not the original task payloads. This matches the registry's
/// definition of flow equality (see the crate-level documentation):
/// `(project, name, version, sorted task ids, sorted edges)`, not deep
/// task-object identity. It also means a flow loaded from a serialized
/// snapshot is just as usable as one registered directly in this process.
#[derive(Clone)]
struct Entry {
    ids: Vec<(usize, TaskId)>,
    edges: Vec<(usize, usize)>,
}

impl Entry {
    fn id_map(&self) -> HashMap<NodeIndex, TaskId> {
        self.ids
            .iter()
            .map(|&(idx, id)| (NodeIndex::new(idx), id))
            .collect()
    }
}

/// A process-wide (or locally constructed) registry of flows, keyed by
/// `(project, name, version)`.
///
/// All operations acquire a single internal lock for their duration;
/// iteration snapshots the registered keys under the lock before
/// releasing it, so callers never observe a torn view.
pub struct Registry<T: TaskFingerprintSource> {
    config: RegistryConfig,
    observer: Arc<dyn WarningObserver>,
    entries: Mutex<HashMap<FlowKey, Entry>>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: TaskFingerprintSource> Registry<T> {
    /// Creates an empty registry from the given configuration.
    ///
    /// If `config.load_on_startup` names a non-empty path, the registry
    /// attempts to load a previously serialized snapshot from it; any
    /// failure to do so is reported through the observer, not returned.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        let registry = Self {
            observer: default_observer(),
            entries: Mutex::new(HashMap::new()),
            config,
            _marker: PhantomData,
        };

        if !registry.config.load_on_startup.is_empty() {
            let path = registry.config.load_on_startup.clone();
            if let Err(err) = registry.load_snapshot_from_path(&path) {
                registry.observer.on_warning(
                    WarningKind::EncryptionUnavailable,
                    &format!("load_on_startup failed for {path}: {err}"),
                );
            }
        }

        registry
    }

    /// Installs a custom warning observer, replacing the default
    /// tracing-backed one.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn WarningObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the process-wide registry shared by every caller building
    /// flows of task type `T`, created on first access with the default
    /// configuration.
    ///
    /// A bare `static` cannot itself be generic, so this keeps a single
    /// process-wide map from [`TypeId`] to a leaked, genuinely `'static`
    /// registry, one per distinct task type, instead of the single
    /// concrete-typed `static` a non-generic singleton (like this
    /// workspace's own process-wide registries elsewhere) would use.
    #[must_use]
    pub fn global() -> &'static Self
    where
        T: 'static,
    {
        static GLOBAL_REGISTRIES: OnceLock<Mutex<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>> =
            OnceLock::new();

        let registries = GLOBAL_REGISTRIES.get_or_init(|| Mutex::new(HashMap::new()));
        let mut registries = registries.lock();

        let any_ref = *registries.entry(TypeId::of::<T>()).or_insert_with(|| {
            let leaked: &'static Self = Box::leak(Box::new(Self::new(RegistryConfig::default())));
            leaked as &'static (dyn Any + Send + Sync)
        });

        any_ref.downcast_ref::<Self>().unwrap_or_else(|| {
            // Unreachable in practice: this slot is only ever populated by
            // the `TypeId::of::<T>()` branch above, with exactly this `T`.
            let leaked: &'static Self = Box::leak(Box::new(Self::new(RegistryConfig::default())));
            leaked
        })
    }

    /// Constructs an empty flow and immediately registers it in
    /// [`Self::global`], mirroring a constructor-time `register` flag: the
    /// flow is registered under `(project, name, version)` before it is
    /// handed back to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Graph`] if registering the (empty) flow fails.
    pub fn new_flow_and_register(
        project: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Flow<T>>
    where
        T: 'static,
    {
        let flow = Flow::new(project, name, version);
        Self::global().register_flow(&flow)?;
        Ok(flow)
    }

    /// Registers a flow under `(project, name, version)`.
    ///
    /// If the key is already present, the first registration is always
    /// kept. Re-registering the same key never replaces it. Whether a
    /// [`WarningKind::DuplicateRegistration`] warning fires for the
    /// attempt is controlled by `config.warn_on_duplicate_registration`
    /// (default `true`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Graph`] if the flow's graph contains a cycle.
    pub fn register_flow(&self, flow: &Flow<T>) -> Result<()> {
        let key = (
            flow.project().to_string(),
            flow.name().to_string(),
            flow.version().to_string(),
        );

        let ids = generate_task_ids(flow)?;
        let mut entries = self.entries.lock();

        if entries.contains_key(&key) {
            if self.config.warn_on_duplicate_registration {
                self.observer.on_warning(
                    WarningKind::DuplicateRegistration,
                    &format!("{}/{}@{}", key.0, key.1, key.2),
                );
            }
            return Ok(());
        }

        let mut edges = Vec::new();
        for idx in flow.task_indices() {
            for downstream in flow.downstream(idx) {
                edges.push((idx.index(), downstream.index()));
            }
        }
        edges.sort_unstable();

        let mut sorted_ids: Vec<(usize, TaskId)> =
            ids.into_iter().map(|(idx, id)| (idx.index(), id)).collect();
        sorted_ids.sort_by_key(|(idx, _)| *idx);

        entries.insert(
            key,
            Entry {
                ids: sorted_ids,
                edges,
            },
        );
        Ok(())
    }

    /// Looks up a registered flow's computed task id mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no flow is registered under the key.
    pub fn load_flow(&self, project: &str, name: &str, version: &str) -> Result<HashMap<NodeIndex, TaskId>> {
        let key = (project.to_string(), name.to_string(), version.to_string());
        let entries = self.entries.lock();
        entries.get(&key).map(Entry::id_map).ok_or_else(|| Error::NotFound {
            project: project.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// Returns `true` if a flow is registered under the given key.
    #[must_use]
    pub fn has_flow(&self, project: &str, name: &str, version: &str) -> bool {
        let key = (project.to_string(), name.to_string(), version.to_string());
        self.entries.lock().contains_key(&key)
    }

    /// Returns every registered `(project, name, version)` key, snapshotted
    /// under the lock.
    #[must_use]
    pub fn keys(&self) -> Vec<FlowKey> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Serializes the registry's current contents (project/name/version
    /// and each flow's computed task ids and edges) into a self-describing
    /// byte string, optionally wrapped with the configured encryption key.
    ///
    /// If no key is configured, emits
    /// [`WarningKind::EncryptionUnavailable`] and serializes in clear.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptSerializedRegistry`] only if `serde_json`
    /// itself fails, which does not happen for this crate's own snapshot
    /// type.
    pub fn serialize_registry(&self) -> Result<Vec<u8>> {
        let snapshot = self.snapshot();
        let plain = serde_json::to_vec(&snapshot)
            .map_err(|e| Error::CorruptSerializedRegistry(e.to_string()))?;

        if self.config.encryption_key.is_empty() {
            self.observer.on_warning(
                WarningKind::EncryptionUnavailable,
                "serializing registry without an encryption key",
            );
            return Ok(plain);
        }

        Ok(cipher::wrap(&plain, &self.config.encryption_key))
    }

    /// Merges a previously serialized registry into this one.
    ///
    /// If no key is configured and `bytes` is a wrapped blob, emits
    /// [`WarningKind::EncryptionUnavailable`] and skips the merge entirely
    /// rather than failing: there is nothing this call can safely do with
    /// ciphertext it cannot unwrap. If no key is configured and `bytes`
    /// looks like plain JSON, the same warning fires but the merge proceeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptSerializedRegistry`] if a configured key
    /// fails to unwrap the bytes, or if the (unwrapped) bytes do not parse.
    pub fn load_serialized_registry(&self, bytes: &[u8]) -> Result<()> {
        let plain = if self.config.encryption_key.is_empty() {
            if cipher::looks_wrapped(bytes) {
                self.observer.on_warning(
                    WarningKind::EncryptionUnavailable,
                    "skipping wrapped registry snapshot: no encryption key configured",
                );
                return Ok(());
            }
            self.observer.on_warning(
                WarningKind::EncryptionUnavailable,
                "deserializing registry without an encryption key",
            );
            bytes.to_vec()
        } else {
            cipher::unwrap(bytes, &self.config.encryption_key)
                .map_err(Error::CorruptSerializedRegistry)?
        };

        let snapshot: RegistrySnapshot =
            serde_json::from_slice(&plain).map_err(|e| Error::CorruptSerializedRegistry(e.to_string()))?;

        let mut entries = self.entries.lock();
        for flow_snapshot in snapshot.flows {
            let key = (
                flow_snapshot.project,
                flow_snapshot.name,
                flow_snapshot.version,
            );
            entries.insert(
                key,
                Entry {
                    ids: flow_snapshot.task_ids,
                    edges: flow_snapshot.edges,
                },
            );
        }

        Ok(())
    }

    fn load_snapshot_from_path(&self, path: &str) -> Result<()> {
        let bytes = fs::read(Path::new(path))?;
        self.load_serialized_registry(&bytes)
    }

    fn snapshot(&self) -> RegistrySnapshot {
        let entries = self.entries.lock();
        let flows = entries
            .iter()
            .map(|((project, name, version), entry)| FlowSnapshot {
                project: project.clone(),
                name: name.clone(),
                version: version.clone(),
                task_ids: entry.ids.clone(),
                edges: entry.edges.clone(),
            })
            .collect();

        RegistrySnapshot { flows }
    }
}

#[derive(Serialize, Deserialize)]
struct RegistrySnapshot {
    flows: Vec<FlowSnapshot>,
}

#[derive(Serialize, Deserialize)]
struct FlowSnapshot {
    project: String,
    name: String,
    version: String,
    task_ids: Vec<(usize, TaskId)>,
    edges: Vec<(usize, usize)>,
}
