//! Factories that turn locators into new component instances.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use pip_container_common::error::{ContainerError, Result};
use pip_container_common::types::Locator;

use crate::component::Component;

/// Creates components for the locators it recognizes.
pub trait Factory: Send + Sync {
    /// Returns `true` if this factory can create a component for `locator`.
    fn can_create(&self, locator: &Locator) -> bool;

    /// Creates a new, not yet configured component.
    ///
    /// # Errors
    ///
    /// Returns a build error if `locator` is not supported or construction
    /// fails.
    fn create(&self, locator: &Locator) -> Result<Box<dyn Component>>;
}

type Creator = Box<dyn Fn(&Locator) -> Result<Box<dyn Component>> + Send + Sync>;

struct Registration {
    locator: Locator,
    create: Creator,
}

/// Factory backed by an ordered list of locator patterns and constructors.
///
/// The first registration whose pattern matches the requested locator wins.
#[derive(Default)]
pub struct SimpleFactory {
    registrations: Vec<Registration>,
}

impl SimpleFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor for `locator`.
    pub fn register<F>(&mut self, locator: impl Into<Locator>, create: F)
    where
        F: Fn(&Locator) -> Result<Box<dyn Component>> + Send + Sync + 'static,
    {
        self.registrations.push(Registration {
            locator: locator.into(),
            create: Box::new(create),
        });
    }

    /// Registers `C::default()` as the constructor for `locator`.
    pub fn register_default<C: Component + Default>(&mut self, locator: impl Into<Locator>) {
        self.register(locator, |_| Ok(Box::new(C::default())));
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn find(&self, locator: &Locator) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.locator.matches(locator))
    }
}

impl fmt::Debug for SimpleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locators: Vec<String> = self
            .registrations
            .iter()
            .map(|r| r.locator.to_string())
            .collect();
        f.debug_struct("SimpleFactory")
            .field("registrations", &locators)
            .finish()
    }
}

impl Factory for SimpleFactory {
    fn can_create(&self, locator: &Locator) -> bool {
        self.find(locator).is_some()
    }

    fn create(&self, locator: &Locator) -> Result<Box<dyn Component>> {
        match self.find(locator) {
            Some(registration) => (registration.create)(locator),
            None => Err(ContainerError::build(
                None,
                locator,
                "no registration matches the locator",
            )),
        }
    }
}

impl Component for SimpleFactory {
    fn to_factory(self: Arc<Self>) -> Option<Arc<dyn Factory>> {
        Some(self)
    }
}

/// Ordered collection of factories that delegates to the first capable one.
///
/// Factories can be added after the composite has been shared.
#[derive(Default)]
pub struct CompositeFactory {
    factories: RwLock<Vec<Arc<dyn Factory>>>,
}

impl CompositeFactory {
    /// Creates an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a composite over `factories`, keeping their order.
    #[must_use]
    pub fn from_factories(factories: Vec<Arc<dyn Factory>>) -> Self {
        Self {
            factories: RwLock::new(factories),
        }
    }

    /// Appends a factory. Earlier factories take precedence.
    pub fn add(&self, factory: Arc<dyn Factory>) {
        self.factories.write().push(factory);
    }

    /// Number of child factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// Returns `true` if there are no child factories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    fn find(&self, locator: &Locator) -> Option<Arc<dyn Factory>> {
        self.factories
            .read()
            .iter()
            .find(|f| f.can_create(locator))
            .map(Arc::clone)
    }
}

impl fmt::Debug for CompositeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeFactory")
            .field("factories", &self.len())
            .finish()
    }
}

impl Factory for CompositeFactory {
    fn can_create(&self, locator: &Locator) -> bool {
        self.find(locator).is_some()
    }

    fn create(&self, locator: &Locator) -> Result<Box<dyn Component>> {
        // The lock is released before delegating so a child may add factories.
        let factory = self.find(locator).ok_or_else(|| {
            ContainerError::build(None, locator, "no factory can create the component")
        })?;
        factory.create(locator)
    }
}

impl Component for CompositeFactory {
    fn to_factory(self: Arc<Self>) -> Option<Arc<dyn Factory>> {
        Some(self)
    }
}
