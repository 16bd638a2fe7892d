//! Component capability contract.
//!
//! A component is any `Send + Sync` value registered in a container. What
//! the container does with it depends on the capabilities it declares: each
//! lifecycle phase asks every component once, through the accessor methods
//! of [`Component`], whether it supports that phase. Accessors default to
//! `None`, so a component opts into exactly the phases it implements.
//!
//! Configuration is the only phase that needs exclusive access; it runs
//! before the component is shared. Every later phase takes `&self`, and
//! components keep their mutable state behind interior mutability.

use std::any::Any;
use std::sync::Arc;

use pip_container_common::config::ConfigParams;
use pip_container_common::error::Result;

use crate::build::Factory;
use crate::log::Logger;
use crate::refer::References;

/// Type-erasure helper implemented for every `Send + Sync` type.
pub trait AsAny: Any + Send + Sync {
    /// Borrows `self` as [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// Converts a shared handle into a shared [`Any`].
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A value managed by a container.
pub trait Component: AsAny {
    /// Returns the configuration capability.
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }

    /// Returns the capability to receive references to other components.
    fn as_referenceable(&self) -> Option<&dyn Referenceable> {
        None
    }

    /// Returns the capability to release references to other components.
    fn as_unreferenceable(&self) -> Option<&dyn Unreferenceable> {
        None
    }

    /// Returns the open capability.
    fn as_openable(&self) -> Option<&dyn Openable> {
        None
    }

    /// Returns the close capability.
    fn as_closeable(&self) -> Option<&dyn Closeable> {
        None
    }

    /// Returns this component as a logger, if it is one.
    fn to_logger(self: Arc<Self>) -> Option<Arc<dyn Logger>> {
        None
    }

    /// Returns this component as a factory, if it is one.
    fn to_factory(self: Arc<Self>) -> Option<Arc<dyn Factory>> {
        None
    }
}

impl dyn Component {
    /// Returns `true` if the concrete type is `T`.
    pub fn is<T: Component>(&self) -> bool {
        AsAny::as_any(self).is::<T>()
    }

    /// Borrows the component as its concrete type.
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }
}

/// Converts a shared component into a shared handle of its concrete type.
pub fn downcast_arc<T: Component>(component: Arc<dyn Component>) -> Option<Arc<T>> {
    AsAny::into_any(component).downcast::<T>().ok()
}

/// Accepts configuration parameters before the component is shared.
pub trait Configurable {
    /// Applies `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a parameter is invalid.
    fn configure(&mut self, config: &ConfigParams) -> Result<()>;
}

/// Receives the registry to look up its dependencies.
pub trait Referenceable {
    /// Resolves dependencies from `references`.
    ///
    /// # Errors
    ///
    /// Returns a reference error if a required dependency is missing.
    fn set_references(&self, references: &References) -> Result<()>;
}

/// Releases dependencies obtained through [`Referenceable`].
pub trait Unreferenceable {
    /// Drops every reference held to other components.
    fn unset_references(&self);
}

/// Releases resources held by an open component.
pub trait Closeable {
    /// Closes the component. Closing a closed component is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if resources could not be released.
    fn close(&self, correlation_id: Option<&str>) -> Result<()>;
}

/// Acquires resources and starts the component.
pub trait Openable: Closeable {
    /// Returns `true` while the component is open.
    fn is_open(&self) -> bool;

    /// Opens the component.
    ///
    /// # Errors
    ///
    /// Returns an error if the component cannot start.
    fn open(&self, correlation_id: Option<&str>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Plain;

    impl Component for Plain {}

    #[derive(Debug, Default)]
    struct Other;

    impl Component for Other {}

    #[test]
    fn plain_component_declares_no_capabilities() {
        let mut plain = Plain;
        assert!(plain.as_configurable().is_none());
        assert!(plain.as_referenceable().is_none());
        assert!(plain.as_openable().is_none());
        assert!(plain.as_closeable().is_none());
        assert!(Arc::new(Plain).to_logger().is_none());
    }

    #[test]
    fn downcasts_to_concrete_type() {
        let component: Arc<dyn Component> = Arc::new(Plain);
        assert!(component.is::<Plain>());
        assert!(!component.is::<Other>());
        assert!(component.downcast_ref::<Plain>().is_some());
        assert!(downcast_arc::<Plain>(Arc::clone(&component)).is_some());
        assert!(downcast_arc::<Other>(component).is_none());
    }
}
