//! Registry of a running container and its lifecycle phases.

use std::sync::Arc;

use pip_container_common::error::{ContainerError, Result};
use pip_container_common::types::Locator;
use pip_container_components::component::Component;
use pip_container_components::refer::References;
use pip_container_config::container::ContainerConfig;

use crate::fault;

/// Registry owned by an open container.
///
/// Besides lookups, it drives the phases that span every component: bulk
/// creation from configuration, linking and opening in registration order,
/// and closing and unlinking in reverse order.
#[derive(Debug, Default)]
pub struct ContainerReferences {
    references: References,
}

impl ContainerReferences {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying registry.
    #[must_use]
    pub const fn references(&self) -> &References {
        &self.references
    }

    /// Appends a component.
    pub fn put(&mut self, locator: impl Into<Locator>, component: Arc<dyn Component>) {
        self.references.put(locator, component);
    }

    /// Creates, configures, and appends one component per section.
    ///
    /// Each section is created by the first factory in the registry that can
    /// create its locator. Stops at the first failing section.
    ///
    /// # Errors
    ///
    /// Returns a build error naming the locator when no factory can create
    /// it, or the error of a failed creation or configuration.
    pub fn put_from_config(
        &mut self,
        correlation_id: Option<&str>,
        config: &ContainerConfig,
    ) -> Result<()> {
        for section in config {
            let locator = section.locator();
            let factory = self
                .references
                .get_all()
                .into_iter()
                .filter_map(|c| c.to_factory())
                .find(|f| f.can_create(&locator))
                .ok_or_else(|| {
                    ContainerError::build(
                        correlation_id,
                        &locator,
                        "cannot find factory for component",
                    )
                })?;

            let mut component = factory.create(&locator)?;
            if let Some(configurable) = component.as_configurable() {
                configurable.configure(&section.config)?;
            }
            tracing::debug!(correlation_id, locator = %locator, "component created");
            self.references.put(locator, Arc::from(component));
        }
        Ok(())
    }

    /// Links every referenceable component, then opens every openable one,
    /// both in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first linking or opening error.
    pub fn open(&self, correlation_id: Option<&str>) -> Result<()> {
        let components = self.references.get_all();
        for component in &components {
            if let Some(referenceable) = component.as_referenceable() {
                referenceable.set_references(&self.references)?;
            }
        }
        for component in &components {
            if let Some(openable) = component.as_openable() {
                openable.open(correlation_id)?;
            }
        }
        tracing::debug!(correlation_id, components = components.len(), "components opened");
        Ok(())
    }

    /// Closes every closeable component, then unlinks every unreferenceable
    /// one, both in reverse registration order.
    ///
    /// Every component is attempted even after a failure; a panic in one
    /// component is recorded as a recovered fault.
    ///
    /// # Errors
    ///
    /// Returns the single failure, or an aggregate of several.
    pub fn close(&self, correlation_id: Option<&str>) -> Result<()> {
        let components = self.references.get_all();
        let mut errors = Vec::new();

        for component in components.iter().rev() {
            let result = fault::catch(correlation_id, || {
                if let Some(closeable) = component.as_closeable() {
                    closeable.close(correlation_id)
                } else if let Some(openable) = component.as_openable() {
                    openable.close(correlation_id)
                } else {
                    Ok(())
                }
            });
            if let Err(err) = result {
                errors.push(err);
            }
        }

        for component in components.iter().rev() {
            if let Some(unreferenceable) = component.as_unreferenceable() {
                let result = fault::catch(correlation_id, || {
                    unreferenceable.unset_references();
                    Ok(())
                });
                if let Err(err) = result {
                    errors.push(err);
                }
            }
        }

        ContainerError::aggregate(errors).map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use pip_container_common::config::ConfigParams;
    use pip_container_common::constants;
    use pip_container_common::types::Descriptor;
    use pip_container_components::build::CompositeFactory;
    use pip_container_components::cache::MemoryCache;
    use pip_container_config::component::ComponentConfig;

    use super::*;
    use crate::factory::default_container_factory;

    fn seeded() -> ContainerReferences {
        let mut refs = ContainerReferences::new();
        let factory: Arc<CompositeFactory> = Arc::new(default_container_factory());
        refs.put(constants::container_factory(), factory);
        refs
    }

    fn section(descriptor: &str, params: &[(&str, &str)]) -> ComponentConfig {
        ComponentConfig::from_descriptor(
            descriptor.parse::<Descriptor>().expect("descriptor"),
            ConfigParams::from_tuples(params),
        )
    }

    #[test]
    fn creates_and_configures_sections_in_order() {
        let mut refs = seeded();
        let config = ContainerConfig::new(vec![
            section("pip-services:logger:null:default:1.0", &[]),
            section("pip-services:cache:memory:default:1.0", &[("max_size", "3")]),
        ]);
        refs.put_from_config(None, &config).expect("populated");

        assert_eq!(refs.references().len(), 3);
        let cache = refs
            .references()
            .get_one_required_as::<MemoryCache>(Descriptor::new("*", "cache", "*", "*", "*"))
            .expect("cache");
        assert_eq!(cache.max_size(), 3);
    }

    #[test]
    fn unresolvable_section_is_build_error() {
        let mut refs = seeded();
        let config = ContainerConfig::new(vec![section("acme:widget:default:default:1.0", &[])]);
        let err = refs.put_from_config(Some("123"), &config).unwrap_err();
        assert!(matches!(err, ContainerError::Build { ref locator, .. } if locator == "acme:widget:default:default:1.0"));
        assert_eq!(err.correlation_id(), Some("123"));
    }

    #[test]
    fn registry_without_factories_cannot_build() {
        let mut refs = ContainerReferences::new();
        let config =
            ContainerConfig::new(vec![section("pip-services:logger:null:default:1.0", &[])]);
        assert!(refs.put_from_config(None, &config).is_err());
    }

    #[test]
    fn invalid_section_parameters_fail_configuration() {
        let mut refs = seeded();
        let config = ContainerConfig::new(vec![section(
            "pip-services:cache:memory:default:1.0",
            &[("timeout", "soon")],
        )]);
        let err = refs.put_from_config(None, &config).unwrap_err();
        assert!(matches!(err, ContainerError::Config { .. }));
        assert_eq!(refs.references().len(), 1);
    }

    #[test]
    fn empty_registry_opens_and_closes() {
        let refs = ContainerReferences::new();
        refs.open(None).expect("open");
        refs.close(None).expect("close");
    }
}
