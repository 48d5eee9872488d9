//! Per-element facet slots

use std::cell::OnceCell;

use super::{FacetKey, FacetView, ViewFactory};

/// Why a view could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotError {
    UnknownFacet,
    Disabled,
    NotApplicable,
}

/// One facet's state on one element
#[derive(Debug, Clone)]
pub struct FacetSlot {
    key: FacetKey,
    enabled: bool,
    /// `None` when the facet does not enhance this element kind
    factory: Option<ViewFactory>,
    view: OnceCell<Box<dyn FacetView>>,
}

impl FacetSlot {
    pub(crate) fn new(key: FacetKey, enabled: bool, factory: Option<ViewFactory>) -> Self {
        Self {
            key,
            enabled,
            factory,
            view: OnceCell::new(),
        }
    }

    pub fn key(&self) -> FacetKey {
        self.key
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Slots for every registered facet, in registration order
#[derive(Debug, Clone, Default)]
pub struct FacetSlots {
    slots: Vec<FacetSlot>,
}

impl FacetSlots {
    pub(crate) fn new(slots: Vec<FacetSlot>) -> Self {
        Self { slots }
    }

    fn slot(&self, key: &str) -> Option<&FacetSlot> {
        self.slots.iter().find(|s| s.key == key)
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut FacetSlot> {
        self.slots.iter_mut().find(|s| s.key == key)
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.slot(key).map_or(false, |s| s.enabled)
    }

    /// Keys of enabled facets, in registration order
    pub fn enabled_keys(&self) -> Vec<FacetKey> {
        self.slots.iter().filter(|s| s.enabled).map(|s| s.key).collect()
    }

    /// Does the facet attach a view to this element?
    pub fn enhances(&self, key: &str) -> bool {
        self.slot(key).map_or(false, |s| s.factory.is_some())
    }

    /// Has the view been created yet?
    pub fn has_view(&self, key: &str) -> bool {
        self.slot(key).map_or(false, |s| s.view.get().is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FacetSlot> {
        self.slots.iter()
    }

    /// Returns false for an unknown key
    pub(crate) fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        match self.slot_mut(key) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub(crate) fn view(&self, key: &str) -> Result<&dyn FacetView, SlotError> {
        let slot = self.slot(key).ok_or(SlotError::UnknownFacet)?;
        if !slot.enabled {
            return Err(SlotError::Disabled);
        }
        let factory = slot.factory.ok_or(SlotError::NotApplicable)?;
        Ok(&**slot.view.get_or_init(factory))
    }

    pub(crate) fn view_mut(&mut self, key: &str) -> Result<&mut Box<dyn FacetView>, SlotError> {
        let slot = self.slot_mut(key).ok_or(SlotError::UnknownFacet)?;
        if !slot.enabled {
            return Err(SlotError::Disabled);
        }
        let factory = slot.factory.ok_or(SlotError::NotApplicable)?;
        slot.view.get_or_init(factory);
        slot.view.get_mut().ok_or(SlotError::NotApplicable)
    }

    /// Detach the view of an enabled, applicable facet, creating it first
    /// if needed. Pair with [`FacetSlots::restore`].
    pub(crate) fn take_enabled(&mut self, key: &str) -> Option<Box<dyn FacetView>> {
        let slot = self.slot_mut(key)?;
        if !slot.enabled {
            return None;
        }
        let factory = slot.factory?;
        Some(slot.view.take().unwrap_or_else(factory))
    }

    pub(crate) fn restore(&mut self, key: &str, view: Box<dyn FacetView>) {
        if let Some(slot) = self.slot_mut(key) {
            slot.view = OnceCell::from(view);
        }
    }
}
