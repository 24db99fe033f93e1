//! A process-wide (or locally constructed) registry of [`dagid_graph::Flow`]
//! values, keyed by `(project, name, version)`, with serialization.
//!
//! [`Registry::global`] exposes one lazily-initialized, process-wide
//! instance per task type; [`Registry::new_flow_and_register`] builds an
//! empty flow and registers it there immediately, for callers that want
//! flows to register themselves on construction rather than via an
//! explicit [`Registry::register_flow`] call.
//!
//! # Example
//!
//! ```
//! use dagid_graph::{Flow, TaskFingerprintSource};
//! use dagid_registry::{Registry, RegistryConfig};
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
//! let a = flow.add_task(Step("extract"));
//! let b = flow.add_task(Step("transform"));
//! flow.add_edge(a, b).unwrap();
//!
//! let registry: Registry<Step> = Registry::new(RegistryConfig::default());
//! registry.register_flow(&flow).unwrap();
//!
//! let ids = registry.load_flow("my-project", "my-flow", "1").unwrap();
//! assert_eq!(ids.len(), 2);
//! ```

mod cipher;
mod config;
mod error;
mod observer;
mod registry;

pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use observer::{TracingObserver, WarningKind, WarningObserver};
pub use registry::{FlowKey, Registry};
