//! Ordered registry of component references.
//!
//! Entries keep the order in which they were put and are never reordered.
//! Every lookup walks the registry front to back, so "one" lookups return
//! the earliest registered match and "all" lookups return matches in
//! registration order.

use std::fmt;
use std::sync::Arc;

use pip_container_common::error::{ContainerError, Result};
use pip_container_common::types::Locator;

use crate::component::{Component, downcast_arc};

/// A component registered under a locator.
#[derive(Clone)]
pub struct Reference {
    locator: Locator,
    component: Arc<dyn Component>,
}

impl Reference {
    /// Creates a reference.
    #[must_use]
    pub fn new(locator: Locator, component: Arc<dyn Component>) -> Self {
        Self { locator, component }
    }

    /// Locator the component was registered under.
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The registered component.
    #[must_use]
    pub const fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    /// Returns `true` if this reference answers to `locator`.
    #[must_use]
    pub fn matches(&self, locator: &Locator) -> bool {
        self.locator.matches(locator)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("locator", &self.locator.to_string())
            .finish_non_exhaustive()
    }
}

/// Ordered registry of component references.
#[derive(Debug, Clone, Default)]
pub struct References {
    entries: Vec<Reference>,
}

impl References {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a component. Duplicate locators are allowed.
    pub fn put(&mut self, locator: impl Into<Locator>, component: Arc<dyn Component>) {
        let locator = locator.into();
        tracing::debug!(locator = %locator, position = self.entries.len(), "reference added");
        self.entries.push(Reference::new(locator, component));
    }

    /// Removes the first component matching `locator`.
    pub fn remove(&mut self, locator: impl Into<Locator>) -> Option<Arc<dyn Component>> {
        let locator = locator.into();
        let index = self.entries.iter().position(|r| r.matches(&locator))?;
        Some(self.entries.remove(index).component)
    }

    /// Removes every component matching `locator`, in registration order.
    pub fn remove_all(&mut self, locator: impl Into<Locator>) -> Vec<Arc<dyn Component>> {
        let locator = locator.into();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|r| r.matches(&locator));
        self.entries = kept;
        removed.into_iter().map(|r| r.component).collect()
    }

    /// Iterates over references in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.entries.iter()
    }

    /// Every registered component in registration order.
    #[must_use]
    pub fn get_all(&self) -> Vec<Arc<dyn Component>> {
        self.entries.iter().map(|r| Arc::clone(&r.component)).collect()
    }

    /// Number of registered references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every component matching `locator`; empty when nothing matches.
    #[must_use]
    pub fn get_optional(&self, locator: impl Into<Locator>) -> Vec<Arc<dyn Component>> {
        let locator = locator.into();
        self.entries
            .iter()
            .filter(|r| r.matches(&locator))
            .map(|r| Arc::clone(&r.component))
            .collect()
    }

    /// Every component matching `locator`.
    ///
    /// # Errors
    ///
    /// Returns a reference error when nothing matches.
    pub fn get_required(&self, locator: impl Into<Locator>) -> Result<Vec<Arc<dyn Component>>> {
        let locator = locator.into();
        let found = self.get_optional(locator.clone());
        if found.is_empty() {
            return Err(missing(&locator));
        }
        Ok(found)
    }

    /// First component matching `locator`, if any.
    #[must_use]
    pub fn get_one_optional(&self, locator: impl Into<Locator>) -> Option<Arc<dyn Component>> {
        let locator = locator.into();
        self.entries
            .iter()
            .find(|r| r.matches(&locator))
            .map(|r| Arc::clone(&r.component))
    }

    /// The only component matching `locator`.
    ///
    /// # Errors
    ///
    /// Returns a reference error when nothing matches, or an ambiguity error
    /// when several components match.
    pub fn get_one_required(&self, locator: impl Into<Locator>) -> Result<Arc<dyn Component>> {
        let locator = locator.into();
        exactly_one(&locator, self.get_optional(locator.clone()))
    }

    /// Every component matching `locator` whose concrete type is `T`.
    #[must_use]
    pub fn get_optional_as<T: Component>(&self, locator: impl Into<Locator>) -> Vec<Arc<T>> {
        self.get_optional(locator)
            .into_iter()
            .filter_map(downcast_arc::<T>)
            .collect()
    }

    /// First component matching `locator` whose concrete type is `T`.
    #[must_use]
    pub fn get_one_optional_as<T: Component>(&self, locator: impl Into<Locator>) -> Option<Arc<T>> {
        self.get_optional_as::<T>(locator).into_iter().next()
    }

    /// The only component matching `locator` whose concrete type is `T`.
    ///
    /// # Errors
    ///
    /// Returns a reference error when no component of type `T` matches, or
    /// an ambiguity error when several do.
    pub fn get_one_required_as<T: Component>(&self, locator: impl Into<Locator>) -> Result<Arc<T>> {
        let locator = locator.into();
        exactly_one(&locator, self.get_optional_as::<T>(locator.clone()))
    }
}

impl<'a> IntoIterator for &'a References {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn exactly_one<T>(locator: &Locator, mut found: Vec<T>) -> Result<T> {
    match found.len() {
        0 => Err(missing(locator)),
        1 => Ok(found.remove(0)),
        count => Err(ContainerError::AmbiguousReference {
            correlation_id: None,
            locator: locator.to_string(),
            count,
        }),
    }
}

fn missing(locator: &Locator) -> ContainerError {
    ContainerError::Reference {
        correlation_id: None,
        locator: locator.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pip_container_common::types::{Descriptor, TypeName};

    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Component for Named {}

    #[derive(Debug)]
    struct Other;

    impl Component for Other {}

    fn desc(text: &str) -> Descriptor {
        text.parse().expect("descriptor")
    }

    fn registry() -> References {
        let mut refs = References::new();
        refs.put(desc("acme:widget:a:one:1.0"), Arc::new(Named("first")));
        refs.put(desc("acme:gadget:a:two:1.0"), Arc::new(Other));
        refs.put(desc("acme:widget:b:three:1.0"), Arc::new(Named("second")));
        refs
    }

    #[test]
    fn one_optional_returns_first_registered_match() {
        let refs = registry();
        let found = refs
            .get_one_optional_as::<Named>(desc("*:widget:*:*:*"))
            .expect("widget");
        assert_eq!(found.0, "first");
    }

    #[test]
    fn optional_lookup_without_match_is_none() {
        let refs = registry();
        assert!(refs.get_one_optional(desc("*:missing:*:*:*")).is_none());
        assert!(refs.get_optional(desc("*:missing:*:*:*")).is_empty());
    }

    #[test]
    fn required_lookup_without_match_is_reference_error() {
        let refs = registry();
        let err = refs.get_one_required(desc("*:missing:*:*:*")).err().expect("error");
        assert!(matches!(err, ContainerError::Reference { .. }));
        assert!(err.to_string().contains("*:missing:*:*:*"));
        assert!(refs.get_required(desc("*:missing:*:*:*")).is_err());
    }

    #[test]
    fn required_one_lookup_rejects_several_matches() {
        let refs = registry();
        let err = refs.get_one_required(desc("*:widget:*:*:*")).err().expect("error");
        assert!(matches!(
            err,
            ContainerError::AmbiguousReference { count: 2, ref locator, .. } if locator == "*:widget:*:*:*"
        ));
        assert!(refs.get_one_required_as::<Named>(desc("acme:widget:*:*:*")).is_err());
        assert!(refs.get_one_optional(desc("*:widget:*:*:*")).is_some());

        let only = refs
            .get_one_required_as::<Named>(desc("acme:widget:b:*:*"))
            .expect("single widget");
        assert_eq!(only.0, "second");
    }

    #[test]
    fn all_matches_keep_registration_order() {
        let refs = registry();
        let names: Vec<&str> = refs
            .get_optional_as::<Named>(desc("acme:widget:*:*:*"))
            .iter()
            .map(|n| n.0)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn typed_lookup_skips_other_types() {
        let refs = registry();
        assert!(refs.get_one_optional_as::<Named>(desc("*:gadget:*:*:*")).is_none());
        assert!(refs.get_one_required_as::<Other>(desc("*:*:*:*:*")).is_ok());
    }

    #[test]
    fn remove_takes_first_match_only() {
        let mut refs = registry();
        let removed = refs.remove(desc("*:widget:*:*:*")).expect("removed");
        assert!(removed.downcast_ref::<Named>().is_some_and(|n| n.0 == "first"));
        assert_eq!(refs.len(), 2);

        let rest = refs.remove_all(desc("*:*:*:*:*"));
        assert_eq!(rest.len(), 2);
        assert!(refs.is_empty());
    }

    #[test]
    fn type_locators_match_by_name() {
        let mut refs = References::new();
        refs.put(TypeName::new("widget", None), Arc::new(Named("typed")));
        assert!(refs.get_one_optional(TypeName::new("widget", None)).is_some());
        assert!(refs.get_one_optional(desc("*:*:*:*:*")).is_none());
    }
}
