//! Credentials and the in-memory credential store.

use indexmap::IndexMap;
use parking_lot::RwLock;
use pip_container_common::config::ConfigParams;
use pip_container_common::constants::GROUP;
use pip_container_common::error::Result;
use pip_container_common::types::Descriptor;

use crate::build::SimpleFactory;
use crate::component::{Component, Configurable};

/// Credential parameters such as user name, password, or access keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialParams(ConfigParams);

impl CredentialParams {
    /// Wraps raw parameters.
    #[must_use]
    pub const fn new(params: ConfigParams) -> Self {
        Self(params)
    }

    /// User name, from `username` or `user`.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.0.get_first(&["username", "user"])
    }

    /// Password, from `password` or `pass`.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.0.get_first(&["password", "pass"])
    }

    /// Access id, from `access_id` or `client_id`.
    #[must_use]
    pub fn access_id(&self) -> Option<&str> {
        self.0.get_first(&["access_id", "client_id"])
    }

    /// Access key, from `access_key` or `client_key`.
    #[must_use]
    pub fn access_key(&self) -> Option<&str> {
        self.0.get_first(&["access_key", "client_key"])
    }

    /// Key under which the credentials are kept in a store.
    #[must_use]
    pub fn store_key(&self) -> Option<&str> {
        self.0.get_first(&["store_key"])
    }

    /// Raw parameters.
    #[must_use]
    pub const fn params(&self) -> &ConfigParams {
        &self.0
    }
}

impl From<ConfigParams> for CredentialParams {
    fn from(params: ConfigParams) -> Self {
        Self(params)
    }
}

/// Credential store backed by memory and populated from configuration.
///
/// Each configuration section becomes one entry keyed by its section name:
/// `admin.username` and `admin.password` are stored under `admin`.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    items: RwLock<IndexMap<String, CredentialParams>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores credentials under `key`, or removes them when `credential` is `None`.
    pub fn store(&self, correlation_id: Option<&str>, key: &str, credential: Option<CredentialParams>) {
        let mut items = self.items.write();
        match credential {
            Some(credential) => {
                let _ = items.insert(key.to_owned(), credential);
            }
            None => {
                let _ = items.shift_remove(key);
            }
        }
        tracing::debug!(correlation_id, key, "credential store updated");
    }

    /// Returns the credentials stored under `key`.
    #[must_use]
    pub fn lookup(&self, _correlation_id: Option<&str>, key: &str) -> Option<CredentialParams> {
        self.items.read().get(key).cloned()
    }

    /// Number of stored credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl Configurable for MemoryCredentialStore {
    fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        let items = self.items.get_mut();
        for name in config.section_names() {
            let section = config.get_section(&name);
            if section.is_empty() {
                continue;
            }
            let _ = items.insert(name, CredentialParams::new(section));
        }
        Ok(())
    }
}

impl Component for MemoryCredentialStore {
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

/// Factory for the in-memory credential store.
#[must_use]
pub fn default_factory() -> SimpleFactory {
    let mut factory = SimpleFactory::new();
    factory.register_default::<MemoryCredentialStore>(Descriptor::new(
        GROUP,
        "credential-store",
        "memory",
        "*",
        "1.0",
    ));
    factory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_become_credentials() {
        let mut store = MemoryCredentialStore::new();
        store
            .configure(&ConfigParams::from_tuples(&[
                ("descriptor", "pip-services:credential-store:memory:default:1.0"),
                ("admin.username", "root"),
                ("admin.password", "secret"),
                ("api.access_id", "id-1"),
                ("api.access_key", "key-1"),
            ]))
            .expect("configure");

        assert_eq!(store.len(), 2);
        let admin = store.lookup(None, "admin").expect("admin");
        assert_eq!(admin.username(), Some("root"));
        assert_eq!(admin.password(), Some("secret"));
        let api = store.lookup(None, "api").expect("api");
        assert_eq!(api.access_key(), Some("key-1"));
    }

    #[test]
    fn store_and_remove() {
        let store = MemoryCredentialStore::new();
        let credential = CredentialParams::from(ConfigParams::from_tuples(&[("user", "bob")]));
        store.store(Some("123"), "bob", Some(credential));
        assert_eq!(
            store.lookup(None, "bob").and_then(|c| c.username().map(str::to_owned)),
            Some("bob".to_owned())
        );

        store.store(None, "bob", None);
        assert!(store.lookup(None, "bob").is_none());
    }
}
