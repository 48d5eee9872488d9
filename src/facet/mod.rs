//! Facets
//!
//! A facet is a pluggable extension registered under a unique key. It maps
//! element kinds to the typed view it attaches to elements of that kind
//! ("the graphql view of an attribute"). Every element carries one slot per
//! registered facet; a slot tracks whether the facet is enabled there and
//! holds the view, created on first access.
//!
//! ## Ordering
//!
//! Registration order is part of the contract. The completion pass runs each
//! facet's hooks over the whole model before moving on to the next facet, so a
//! facet may read state derived by any facet registered before it.
//!
//! ```ignore
//! let mut registry = FacetRegistry::new();
//! registry.register(
//!     Facet::new("audit")
//!         .enhance::<AuditEntity>(ElementKind::Entity)
//!         .enhance::<AuditAttribute>(ElementKind::Attribute),
//! )?;
//! ```

mod access;
mod slots;

pub use slots::{FacetSlot, FacetSlots};

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;

use crate::error::{ModelError, Result};
use crate::model::{ElementKind, ElementRef, Repository};

/// Facet identifier
pub type FacetKey = &'static str;

/// Creates the default view of one facet for one element kind
pub type ViewFactory = fn() -> Box<dyn FacetView>;

/// Downcasting support for views
pub trait AsViewAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsViewAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Cloning support for boxed views, used when characteristics are copied
/// into subtypes
pub trait CloneView {
    fn clone_view(&self) -> Box<dyn FacetView>;
}

impl<T: FacetView + Clone + 'static> CloneView for T {
    fn clone_view(&self) -> Box<dyn FacetView> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn FacetView> {
    fn clone(&self) -> Self {
        (**self).clone_view()
    }
}

/// Facet-specific state attached to one model element.
///
/// Views hold configuration only; derived values are computed from the model
/// on access, with the element passed in. While a hook runs the view is
/// detached from its slot, so a hook must not read its own view back through
/// the repository.
pub trait FacetView: AsViewAny + CloneView + fmt::Debug {
    /// Runs once per element during completion, facet by facet in
    /// registration order.
    fn pre_complete(&mut self, _model: &mut Repository, _element: ElementRef) -> Result<()> {
        Ok(())
    }

    /// Runs after every `pre_complete` hook, in the same order.
    fn post_complete(&mut self, _model: &mut Repository, _element: ElementRef) -> Result<()> {
        Ok(())
    }

    /// Variables exposed to output path patterns as `<scope>.<facet>.<name>`
    fn template_variables(&self, _model: &Repository, _element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(Vec::new())
    }
}

fn new_view<V: FacetView + Default + 'static>() -> Box<dyn FacetView> {
    Box::new(V::default())
}

/// A named extension and the views it attaches, per element kind
#[derive(Debug, Clone)]
pub struct Facet {
    key: FacetKey,
    views: IndexMap<ElementKind, ViewFactory>,
}

impl Facet {
    pub fn new(key: FacetKey) -> Self {
        Self {
            key,
            views: IndexMap::new(),
        }
    }

    /// Attach view type `V` to elements of `kind`
    pub fn enhance<V: FacetView + Default + 'static>(mut self, kind: ElementKind) -> Self {
        self.views.insert(kind, new_view::<V>);
        self
    }

    pub fn key(&self) -> FacetKey {
        self.key
    }

    pub fn enhances(&self, kind: ElementKind) -> bool {
        self.views.contains_key(&kind)
    }

    pub fn enhanced_kinds(&self) -> Vec<ElementKind> {
        self.views.keys().copied().collect()
    }

    pub(crate) fn factory(&self, kind: ElementKind) -> Option<ViewFactory> {
        self.views.get(&kind).copied()
    }
}

/// Ordered set of registered facets
#[derive(Debug, Clone, Default)]
pub struct FacetRegistry {
    facets: Vec<Facet>,
}

impl FacetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a facet; its position fixes its completion order
    pub fn register(&mut self, facet: Facet) -> Result<()> {
        if self.facets.iter().any(|f| f.key == facet.key) {
            return Err(ModelError::Duplicate {
                kind: "facet",
                name: facet.key.to_string(),
                scope: "facet registry".to_string(),
            });
        }
        self.facets.push(facet);
        Ok(())
    }

    /// Keys in registration order
    pub fn keys(&self) -> Vec<FacetKey> {
        self.facets.iter().map(|f| f.key).collect()
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn facet(&self, key: &str) -> Result<&Facet> {
        self.facets
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| ModelError::not_found("facet", key, "facet registry", &self.keys()))
    }

    /// Canonical key for a user-supplied facet name
    pub fn resolve(&self, key: &str) -> Result<FacetKey> {
        Ok(self.facet(key)?.key)
    }

    /// Slots for a new element of `kind`, inheriting enablement from the
    /// element's parent.
    pub fn slots_for(&self, kind: ElementKind, parent: Option<&FacetSlots>) -> FacetSlots {
        let slots = self
            .facets
            .iter()
            .map(|facet| {
                let enabled = parent.map_or(false, |p| p.is_enabled(facet.key));
                FacetSlot::new(facet.key, enabled, facet.factory(kind))
            })
            .collect();
        FacetSlots::new(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Marker {
        label: String,
    }

    impl FacetView for Marker {}

    #[test]
    fn test_register_rejects_duplicate_key() {
        let mut registry = FacetRegistry::new();
        registry.register(Facet::new("audit")).unwrap();
        let err = registry.register(Facet::new("audit")).unwrap_err();
        assert!(matches!(err, ModelError::Duplicate { kind: "facet", .. }));
    }

    #[test]
    fn test_keys_keep_registration_order() {
        let mut registry = FacetRegistry::new();
        registry.register(Facet::new("b")).unwrap();
        registry.register(Facet::new("a")).unwrap();
        assert_eq!(registry.keys(), vec!["b", "a"]);
    }

    #[test]
    fn test_resolve_unknown_key_lists_known_keys() {
        let mut registry = FacetRegistry::new();
        registry.register(Facet::new("graphql")).unwrap();
        let message = registry.resolve("graphq").unwrap_err().to_string();
        assert!(message.contains("Available facet set = graphql"));
    }

    #[test]
    fn test_slots_inherit_parent_enablement() {
        let mut registry = FacetRegistry::new();
        registry
            .register(Facet::new("audit").enhance::<Marker>(ElementKind::Entity))
            .unwrap();
        registry.register(Facet::new("other")).unwrap();

        let mut parent = registry.slots_for(ElementKind::DataModule, None);
        assert!(!parent.is_enabled("audit"));
        parent.set_enabled("audit", true);

        let child = registry.slots_for(ElementKind::Entity, Some(&parent));
        assert!(child.is_enabled("audit"));
        assert!(!child.is_enabled("other"));
        assert!(child.enhances("audit"));
        assert!(!child.enhances("other"));
    }

    #[test]
    fn test_boxed_view_clone_keeps_concrete_type() {
        let view: Box<dyn FacetView> = Box::new(Marker {
            label: "x".to_string(),
        });
        let copy = view.clone();
        let marker = (*copy).as_any().downcast_ref::<Marker>().unwrap();
        assert_eq!(marker.label, "x");
    }
}
