//! Facet access on the repository
//!
//! Enablement changes cascade from an element to all of its descendants and
//! never touch siblings. Views are reached through the element handle and
//! downcast to the requested view type.

use super::slots::SlotError;
use super::FacetView;
use crate::error::{ModelError, Result};
use crate::model::{ElementKind, ElementRef, Repository};

fn slot_error(error: SlotError, facet: &str, kind: ElementKind, element: String) -> ModelError {
    match error {
        SlotError::UnknownFacet => ModelError::NotFound {
            kind: "facet",
            name: facet.to_string(),
            scope: element,
            available: String::new(),
            hint: String::new(),
        },
        SlotError::Disabled => ModelError::FacetNotEnabled {
            facet: facet.to_string(),
            element,
        },
        SlotError::NotApplicable => ModelError::FacetNotApplicable {
            facet: facet.to_string(),
            kind: kind.to_string(),
            element,
        },
    }
}

impl Repository {
    /// Is facet `key` enabled on `element`? Unknown keys are never enabled.
    pub fn facet_enabled(&self, element: ElementRef, key: &str) -> bool {
        self.facets(element)
            .map(|slots| slots.is_enabled(key))
            .unwrap_or(false)
    }

    /// Enable a facet on `element` and everything below it
    pub fn enable_facet(&mut self, element: ElementRef, key: &str) -> Result<()> {
        self.set_facet_enabled(element, key, true)
    }

    /// Disable a facet on `element` and everything below it. Views already
    /// created are kept.
    pub fn disable_facet(&mut self, element: ElementRef, key: &str) -> Result<()> {
        self.set_facet_enabled(element, key, false)
    }

    fn set_facet_enabled(&mut self, element: ElementRef, key: &str, enabled: bool) -> Result<()> {
        self.ensure_open()?;
        let key = self.registry.resolve(key)?;
        for target in self.descendants(element)? {
            self.facets_mut(target)?.set_enabled(key, enabled);
        }
        Ok(())
    }

    /// Untyped view of facet `key` on `element`, created on first access
    pub fn facet_view(&self, element: ElementRef, key: &str) -> Result<&dyn FacetView> {
        self.facets(element)?
            .view(key)
            .map_err(|e| slot_error(e, key, element.kind(), self.describe(element)))
    }

    /// The view of facet `key` on `element`, created on first access
    pub fn view<V: FacetView + 'static>(&self, element: ElementRef, key: &str) -> Result<&V> {
        let view = self.facet_view(element, key)?;
        view.as_any()
            .downcast_ref::<V>()
            .ok_or_else(|| ModelError::FacetViewType {
                facet: key.to_string(),
                element: self.describe(element),
                expected: std::any::type_name::<V>(),
            })
    }

    /// Mutable view access, available until the model is completed
    pub fn view_mut<V: FacetView + 'static>(&mut self, element: ElementRef, key: &str) -> Result<&mut V> {
        self.ensure_open()?;
        let name = self.describe(element);
        let slots = self.facets_mut(element)?;
        let view = slots
            .view_mut(key)
            .map_err(|e| slot_error(e, key, element.kind(), name.clone()))?;
        (**view)
            .as_any_mut()
            .downcast_mut::<V>()
            .ok_or_else(|| ModelError::FacetViewType {
                facet: key.to_string(),
                element: name,
                expected: std::any::type_name::<V>(),
            })
    }

    /// Configure a view at authoring time
    pub fn configure<V, F>(&mut self, element: ElementRef, key: &str, configure: F) -> Result<()>
    where
        V: FacetView + 'static,
        F: FnOnce(&mut V),
    {
        configure(self.view_mut::<V>(element, key)?);
        Ok(())
    }

    fn describe(&self, element: ElementRef) -> String {
        self.qualified_name(element)
            .unwrap_or_else(|_| format!("{:?}", element))
    }
}
