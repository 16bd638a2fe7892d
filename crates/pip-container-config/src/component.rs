//! Configuration of a single component.
//!
//! A section names what to build, either through a `descriptor` or a
//! factory `type` hint, and carries the parameters passed to the component
//! once it has been created.

use pip_container_common::config::ConfigParams;
use pip_container_common::error::{ContainerError, Result};
use pip_container_common::types::{Descriptor, Locator, TypeName};

/// One section of a container configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentConfig {
    /// Descriptor of the component, if declared.
    pub descriptor: Option<Descriptor>,
    /// Factory type hint, if declared.
    pub type_name: Option<TypeName>,
    /// Full section parameters, including `descriptor`/`type` keys.
    pub config: ConfigParams,
}

impl ComponentConfig {
    /// Creates a section identified by a descriptor.
    #[must_use]
    pub const fn from_descriptor(descriptor: Descriptor, config: ConfigParams) -> Self {
        Self {
            descriptor: Some(descriptor),
            type_name: None,
            config,
        }
    }

    /// Creates a section identified by a factory type hint.
    #[must_use]
    pub const fn from_type(type_name: TypeName, config: ConfigParams) -> Self {
        Self {
            descriptor: None,
            type_name: Some(type_name),
            config,
        }
    }

    /// Builds a section from its flat parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if neither `descriptor` nor `type` is
    /// present, or if either one is malformed.
    pub fn from_config(config: ConfigParams) -> Result<Self> {
        let descriptor = config
            .get("descriptor")
            .filter(|d| !d.is_empty())
            .map(str::parse::<Descriptor>)
            .transpose()?;
        let type_name = config
            .get("type")
            .filter(|t| !t.is_empty())
            .map(str::parse::<TypeName>)
            .transpose()?;

        if descriptor.is_none() && type_name.is_none() {
            return Err(ContainerError::config(format!(
                "component configuration must have descriptor or type: {config}"
            )));
        }

        Ok(Self {
            descriptor,
            type_name,
            config,
        })
    }

    /// Key used to create and register the component.
    ///
    /// The type hint takes precedence over the descriptor when both are set.
    #[must_use]
    pub fn locator(&self) -> Locator {
        match (&self.type_name, &self.descriptor) {
            (Some(type_name), _) => Locator::Type(type_name.clone()),
            (None, Some(descriptor)) => Locator::Descriptor(descriptor.clone()),
            (None, None) => Locator::Type(TypeName::new("", None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_section_builds_descriptor_locator() {
        let config = ConfigParams::from_tuples(&[
            ("descriptor", "pip-services:logger:console:default:1.0"),
            ("level", "debug"),
        ]);
        let section = ComponentConfig::from_config(config).expect("valid section");
        assert!(section.type_name.is_none());
        assert_eq!(
            section.locator().to_string(),
            "pip-services:logger:console:default:1.0"
        );
        assert_eq!(section.config.get("level"), Some("debug"));
    }

    #[test]
    fn type_takes_precedence_over_descriptor() {
        let config = ConfigParams::from_tuples(&[
            ("descriptor", "acme:widget:default:default:1.0"),
            ("type", "widget,acme"),
        ]);
        let section = ComponentConfig::from_config(config).expect("valid section");
        assert!(matches!(section.locator(), Locator::Type(t) if t.name() == "widget"));
    }

    #[test]
    fn section_without_locator_is_rejected() {
        let config = ConfigParams::from_tuples(&[("param1", "123")]);
        let err = ComponentConfig::from_config(config).unwrap_err();
        assert!(matches!(err, ContainerError::Config { .. }));
        assert!(err.to_string().contains("descriptor or type"), "got: {err}");
    }

    #[test]
    fn malformed_descriptor_is_rejected() {
        let config = ConfigParams::from_tuples(&[("descriptor", "acme:widget")]);
        assert!(ComponentConfig::from_config(config).is_err());
    }
}
