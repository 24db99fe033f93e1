//! Recognized registry configuration, with environment-variable overrides.

use std::env;

const ENV_PREFIX: &str = "DAGID";

/// Recognized configuration options for a [`crate::Registry`].
///
/// Every field can be set directly, or left at its default and overridden
/// by an environment variable named `{ENV_PREFIX}__REGISTRY__{FIELD}` in
/// upper snake case, e.g. `DAGID__REGISTRY__ENCRYPTION_KEY`.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Symmetric key used to wrap/unwrap a serialized registry. Empty
    /// disables wrapping (and triggers an `EncryptionUnavailable`
    /// warning on every serialize/deserialize).
    pub encryption_key: String,

    /// Whether to warn when the same `(project, name, version)` key is
    /// registered twice. Defaults to `true`. Re-registering a key never
    /// replaces the first registration regardless of this flag. It only
    /// controls whether the attempt is reported.
    pub warn_on_duplicate_registration: bool,

    /// Filesystem path to a previously serialized registry. If non-empty,
    /// a fresh [`crate::Registry`] loads it at construction time.
    pub load_on_startup: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            encryption_key: String::new(),
            warn_on_duplicate_registration: true,
            load_on_startup: String::new(),
        }
    }
}

impl RegistryConfig {
    /// Builds a configuration from explicit values, applying environment
    /// overrides for any field present in the environment.
    #[must_use]
    pub fn from_env_with_defaults(mut self) -> Self {
        if let Ok(key) = env::var(env_key("ENCRYPTION_KEY")) {
            self.encryption_key = key;
        }
        if let Ok(flag) = env::var(env_key("WARN_ON_DUPLICATE_REGISTRATION")) {
            self.warn_on_duplicate_registration = parse_bool(&flag, self.warn_on_duplicate_registration);
        }
        if let Ok(path) = env::var(env_key("LOAD_ON_STARTUP")) {
            self.load_on_startup = path;
        }
        self
    }
}

fn env_key(field: &str) -> String {
    format!("{ENV_PREFIX}__REGISTRY__{field}")
}

fn parse_bool(raw: &str, fallback: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => fallback,
    }
}
