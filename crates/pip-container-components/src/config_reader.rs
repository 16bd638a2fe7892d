//! Configuration served to components from memory.

use parking_lot::RwLock;
use pip_container_common::config::ConfigParams;
use pip_container_common::constants::GROUP;
use pip_container_common::error::Result;
use pip_container_common::types::Descriptor;
use pip_container_config::template;

use crate::build::SimpleFactory;
use crate::component::{Component, Configurable};

/// Serves the parameters it was configured with.
///
/// Values may contain `{{ NAME }}` placeholders that are filled in from the
/// parameters passed to [`MemoryConfigReader::read_config`].
#[derive(Debug, Default)]
pub struct MemoryConfigReader {
    config: RwLock<ConfigParams>,
}

impl MemoryConfigReader {
    /// Creates a reader serving `config`.
    #[must_use]
    pub fn new(config: ConfigParams) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Returns the stored configuration with placeholders filled in.
    ///
    /// # Errors
    ///
    /// Never fails for the in-memory reader; the signature matches readers
    /// backed by external stores.
    pub fn read_config(
        &self,
        correlation_id: Option<&str>,
        parameters: Option<&ConfigParams>,
    ) -> Result<ConfigParams> {
        let config = self.config.read();
        let Some(parameters) = parameters else {
            return Ok(config.clone());
        };
        tracing::debug!(correlation_id, keys = config.len(), "parameterizing in-memory config");
        Ok(config
            .iter()
            .map(|(key, value)| (key, template::parameterize(value, parameters)))
            .collect())
    }

    /// Replaces the stored configuration.
    pub fn set_config(&self, config: ConfigParams) {
        *self.config.write() = config;
    }
}

impl Configurable for MemoryConfigReader {
    fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        let mut stored = config.clone();
        let _ = stored.remove("descriptor");
        let _ = stored.remove("type");
        *self.config.get_mut() = stored;
        Ok(())
    }
}

impl Component for MemoryConfigReader {
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

/// Factory for the in-memory config reader.
#[must_use]
pub fn default_factory() -> SimpleFactory {
    let mut factory = SimpleFactory::new();
    factory.register_default::<MemoryConfigReader>(Descriptor::new(
        GROUP,
        "config-reader",
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
    fn configured_values_are_served_without_locator_keys() {
        let mut reader = MemoryConfigReader::default();
        reader
            .configure(&ConfigParams::from_tuples(&[
                ("descriptor", "pip-services:config-reader:memory:default:1.0"),
                ("db.host", "localhost"),
            ]))
            .expect("configure");

        let config = reader.read_config(None, None).expect("read");
        assert_eq!(config.get("db.host"), Some("localhost"));
        assert!(!config.contains_key("descriptor"));
    }

    #[test]
    fn placeholders_are_filled_from_parameters() {
        let reader = MemoryConfigReader::new(ConfigParams::from_tuples(&[(
            "connection.uri",
            "postgres://{{HOST}}:{{PORT}}/app",
        )]));
        let params = ConfigParams::from_tuples(&[("HOST", "db"), ("PORT", "5432")]);

        let config = reader.read_config(Some("123"), Some(&params)).expect("read");
        assert_eq!(config.get("connection.uri"), Some("postgres://db:5432/app"));
    }
}
