//! Container metadata available to every component.

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use pip_container_common::config::ConfigParams;
use pip_container_common::constants::GROUP;
use pip_container_common::error::Result;
use pip_container_common::types::Descriptor;
use uuid::Uuid;

use crate::build::SimpleFactory;
use crate::component::{Component, Configurable};

/// Name used when a container is created without one.
pub const UNKNOWN_NAME: &str = "unknown";

/// Identity and start time of the running container.
#[derive(Debug, Clone)]
pub struct ContextInfo {
    name: String,
    description: String,
    context_id: String,
    start_time: DateTime<Utc>,
    properties: IndexMap<String, String>,
}

impl ContextInfo {
    /// Creates context info with a fresh context id, started now.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() {
                UNKNOWN_NAME.to_owned()
            } else {
                name
            },
            description: description.into(),
            context_id: Uuid::new_v4().to_string(),
            start_time: Utc::now(),
            properties: IndexMap::new(),
        }
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Unique id of this container instance.
    #[must_use]
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// When the info was created.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Time elapsed since [`Self::start_time`].
    #[must_use]
    pub fn uptime(&self) -> Duration {
        Utc::now() - self.start_time
    }

    /// Additional key/value metadata.
    #[must_use]
    pub const fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Sets one metadata property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let _ = self.properties.insert(key.into(), value.into());
    }
}

impl Default for ContextInfo {
    fn default() -> Self {
        Self::new(UNKNOWN_NAME, "")
    }
}

impl Configurable for ContextInfo {
    fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        if let Some(name) = config
            .get_first(&["name", "info.name"])
            .filter(|n| !n.is_empty())
        {
            name.clone_into(&mut self.name);
        }
        if let Some(description) = config.get_first(&["description", "info.description"]) {
            description.clone_into(&mut self.description);
        }
        for (key, value) in config.get_section("properties").iter() {
            self.set_property(key, value);
        }
        Ok(())
    }
}

impl Component for ContextInfo {
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

/// Factory for context info under both of its well-known kinds.
#[must_use]
pub fn default_factory() -> SimpleFactory {
    let mut factory = SimpleFactory::new();
    factory.register_default::<ContextInfo>(Descriptor::new(
        GROUP,
        "context-info",
        "default",
        "*",
        "1.0",
    ));
    factory.register_default::<ContextInfo>(Descriptor::new(
        GROUP,
        "container-info",
        "default",
        "*",
        "1.0",
    ));
    factory
}

#[cfg(test)]
mod tests {
    use pip_container_common::types::Locator;

    use super::*;
    use crate::build::Factory;

    #[test]
    fn empty_name_falls_back_to_unknown() {
        let info = ContextInfo::new("", "no name");
        assert_eq!(info.name(), UNKNOWN_NAME);
        assert_eq!(ContextInfo::default().name(), UNKNOWN_NAME);
        assert!(!info.context_id().is_empty());
    }

    #[test]
    fn each_instance_gets_its_own_context_id() {
        assert_ne!(
            ContextInfo::default().context_id(),
            ContextInfo::default().context_id()
        );
    }

    #[test]
    fn configure_reads_plain_and_prefixed_keys() {
        let mut info = ContextInfo::default();
        info.configure(&ConfigParams::from_tuples(&[
            ("info.name", "billing"),
            ("description", "Billing service"),
            ("properties.region", "eu"),
            ("properties.tier", "gold"),
        ]))
        .expect("configure");

        assert_eq!(info.name(), "billing");
        assert_eq!(info.description(), "Billing service");
        assert_eq!(info.properties().get("region").map(String::as_str), Some("eu"));
        assert_eq!(info.properties().len(), 2);
    }

    #[test]
    fn empty_configured_name_keeps_current() {
        let mut info = ContextInfo::new("svc", "");
        info.configure(&ConfigParams::from_tuples(&[("name", "")]))
            .expect("configure");
        assert_eq!(info.name(), "svc");
    }

    #[test]
    fn uptime_is_not_negative() {
        let info = ContextInfo::default();
        assert!(info.uptime() >= Duration::zero());
    }

    #[test]
    fn factory_serves_both_kinds() {
        let factory = default_factory();
        for text in [
            "pip-services:context-info:default:default:1.0",
            "pip-services:container-info:default:default:1.0",
        ] {
            let locator: Locator = text.parse::<Descriptor>().expect("descriptor").into();
            assert!(factory.create(&locator).expect("info").is::<ContextInfo>());
        }
    }
}
