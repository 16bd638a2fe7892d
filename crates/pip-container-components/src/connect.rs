//! Connection parameters and in-memory discovery.

use indexmap::IndexMap;
use parking_lot::RwLock;
use pip_container_common::config::ConfigParams;
use pip_container_common::constants::GROUP;
use pip_container_common::error::Result;
use pip_container_common::types::Descriptor;

use crate::build::SimpleFactory;
use crate::component::{Component, Configurable};

/// Where a service can be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams(ConfigParams);

impl ConnectionParams {
    /// Wraps raw parameters.
    #[must_use]
    pub const fn new(params: ConfigParams) -> Self {
        Self(params)
    }

    /// Host name, from `host` or `ip`.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.0.get_first(&["host", "ip"])
    }

    /// Port number.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.0.get_i64("port").and_then(|p| u16::try_from(p).ok())
    }

    /// Protocol, such as `http`.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        self.0.get("protocol")
    }

    /// Full URI, when given directly.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.0.get("uri")
    }

    /// Discovery key the connection is registered under.
    #[must_use]
    pub fn discovery_key(&self) -> Option<&str> {
        self.0.get("discovery_key")
    }

    /// Raw parameters.
    #[must_use]
    pub const fn params(&self) -> &ConfigParams {
        &self.0
    }
}

impl From<ConfigParams> for ConnectionParams {
    fn from(params: ConfigParams) -> Self {
        Self(params)
    }
}

/// Discovery service backed by memory and populated from configuration.
///
/// A key may resolve to several connections; they are returned in
/// registration order.
#[derive(Debug, Default)]
pub struct MemoryDiscovery {
    items: RwLock<IndexMap<String, Vec<ConnectionParams>>>,
}

impl MemoryDiscovery {
    /// Creates an empty discovery service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection under `key`.
    pub fn register(&self, correlation_id: Option<&str>, key: &str, connection: ConnectionParams) {
        self.items
            .write()
            .entry(key.to_owned())
            .or_default()
            .push(connection);
        tracing::debug!(correlation_id, key, "connection registered");
    }

    /// First connection registered under `key`.
    #[must_use]
    pub fn resolve_one(&self, _correlation_id: Option<&str>, key: &str) -> Option<ConnectionParams> {
        self.items.read().get(key).and_then(|c| c.first().cloned())
    }

    /// Every connection registered under `key`.
    #[must_use]
    pub fn resolve_all(&self, _correlation_id: Option<&str>, key: &str) -> Vec<ConnectionParams> {
        self.items.read().get(key).cloned().unwrap_or_default()
    }
}

impl Configurable for MemoryDiscovery {
    fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        let items = self.items.get_mut();
        for name in config.section_names() {
            let section = config.get_section(&name);
            if section.is_empty() {
                continue;
            }
            items
                .entry(name)
                .or_default()
                .push(ConnectionParams::new(section));
        }
        Ok(())
    }
}

impl Component for MemoryDiscovery {
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

/// Factory for in-memory discovery.
#[must_use]
pub fn default_factory() -> SimpleFactory {
    let mut factory = SimpleFactory::new();
    factory.register_default::<MemoryDiscovery>(Descriptor::new(
        GROUP,
        "discovery",
        "memory",
        "*",
        "1.0",
    ));
    factory
}
