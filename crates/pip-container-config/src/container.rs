//! Ordered container configuration.

use pip_container_common::config::ConfigParams;
use pip_container_common::error::Result;
use pip_container_common::types::Descriptor;

use crate::component::ComponentConfig;

/// Ordered list of component sections.
///
/// The order is significant: components are created and opened in this
/// order and closed in the reverse one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerConfig {
    components: Vec<ComponentConfig>,
}

impl ContainerConfig {
    /// Creates a configuration from already-built sections.
    #[must_use]
    pub const fn new(components: Vec<ComponentConfig>) -> Self {
        Self { components }
    }

    /// Builds a configuration from flat parameters, one section per
    /// top-level key in first-appearance order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for the first section that lacks a
    /// valid descriptor or type.
    pub fn from_config(config: &ConfigParams) -> Result<Self> {
        let components = config
            .section_names()
            .iter()
            .map(|name| ComponentConfig::from_config(config.get_section(name)))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(sections = components.len(), "container configuration built");
        Ok(Self { components })
    }

    /// Appends a section.
    pub fn push(&mut self, component: ComponentConfig) {
        self.components.push(component);
    }

    /// Iterates over sections in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ComponentConfig> {
        self.components.iter()
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if there are no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if any section's descriptor matches `pattern`.
    #[must_use]
    pub fn declares(&self, pattern: &Descriptor) -> bool {
        self.components
            .iter()
            .filter_map(|c| c.descriptor.as_ref())
            .any(|d| pattern.matches(d))
    }
}

impl<'a> IntoIterator for &'a ContainerConfig {
    type Item = &'a ComponentConfig;
    type IntoIter = std::slice::Iter<'a, ComponentConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}
