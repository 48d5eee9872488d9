//! Element tree traversal
//!
//! The model forms a tree rooted at the repository:
//!
//! ```text
//! Repository
//! └── DataModule
//!     ├── Enumeration ── EnumerationValue
//!     ├── Struct ── StructField
//!     ├── Entity ── Attribute ── InverseElement
//!     └── Dao ── Query ── QueryParameter
//! ```
//!
//! [`Repository::elements`] walks it depth first, parents before children,
//! siblings in definition order. This is the "model order" used by the
//! completion pass and by facet cascades.

use super::container::CharacteristicContainer;
use super::{CharacteristicRef, ContainerRef, ElementRef, Repository};
use crate::error::{ModelError, Result};
use crate::facet::FacetSlots;

impl Repository {
    /// Direct children of `element`
    pub fn children(&self, element: ElementRef) -> Result<Vec<ElementRef>> {
        let children = match element {
            ElementRef::Repository => self.data_modules().map(ElementRef::DataModule).collect(),
            ElementRef::DataModule(id) => {
                let module = self.data_module(id);
                module
                    .enumerations()
                    .map(ElementRef::Enumeration)
                    .chain(module.structs().map(ElementRef::Struct))
                    .chain(module.entities().map(ElementRef::Entity))
                    .chain(module.daos().map(ElementRef::Dao))
                    .collect()
            }
            ElementRef::Enumeration(id) => (0..self.enumeration(id).values().len())
                .map(|index| ElementRef::EnumerationValue(id, index))
                .collect(),
            ElementRef::Entity(id) => self.characteristic_refs(ContainerRef::Entity(id)),
            ElementRef::Struct(id) => self.characteristic_refs(ContainerRef::Struct(id)),
            ElementRef::Query(id) => self.characteristic_refs(ContainerRef::Query(id)),
            ElementRef::Dao(id) => self.dao(id).queries().map(ElementRef::Query).collect(),
            ElementRef::Characteristic(at) => {
                if self.characteristic(at)?.inverse().is_some() {
                    vec![ElementRef::Inverse(at)]
                } else {
                    Vec::new()
                }
            }
            ElementRef::EnumerationValue(..) | ElementRef::Inverse(_) => Vec::new(),
        };
        Ok(children)
    }

    fn characteristic_refs(&self, container: ContainerRef) -> Vec<ElementRef> {
        (0..self.container(container).characteristic_map().len())
            .map(|index| ElementRef::Characteristic(CharacteristicRef { container, index }))
            .collect()
    }

    /// Every element, depth first from the repository
    pub fn elements(&self) -> Result<Vec<ElementRef>> {
        self.descendants(ElementRef::Repository)
    }

    /// `element` followed by all of its descendants, depth first
    pub fn descendants(&self, element: ElementRef) -> Result<Vec<ElementRef>> {
        let mut out = Vec::new();
        let mut stack = vec![element];
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut children = self.children(current)?;
            children.reverse();
            stack.extend(children);
        }
        Ok(out)
    }

    /// Name used to identify `element` in messages
    pub fn qualified_name(&self, element: ElementRef) -> Result<String> {
        let name = match element {
            ElementRef::Repository => self.name().to_string(),
            ElementRef::DataModule(id) => format!("{}.{}", self.name(), self.data_module(id).name()),
            ElementRef::Enumeration(id) => self.enumeration(id).qualified_name().to_string(),
            ElementRef::EnumerationValue(id, index) => {
                let enumeration = self.enumeration(id);
                let value = enumeration.values().get(index).ok_or_else(|| {
                    ModelError::invalid(enumeration.qualified_name(), format!("no value at index {}", index))
                })?;
                format!("{}.{}", enumeration.qualified_name(), value.name())
            }
            ElementRef::Entity(id) => self.entity(id).qualified_name(),
            ElementRef::Struct(id) => self.struct_type(id).qualified_name(),
            ElementRef::Dao(id) => self.dao(id).qualified_name().to_string(),
            ElementRef::Query(id) => self.query(id).qualified_name(),
            ElementRef::Characteristic(at) => self.characteristic(at)?.qualified_name(),
            ElementRef::Inverse(at) => format!("{}.inverse", self.characteristic(at)?.qualified_name()),
        };
        Ok(name)
    }

    /// Facet slots carried by `element`
    pub fn facets(&self, element: ElementRef) -> Result<&FacetSlots> {
        let slots = match element {
            ElementRef::Repository => &self.facets,
            ElementRef::DataModule(id) => &self.data_modules[id.0].facets,
            ElementRef::Enumeration(id) => &self.enumerations[id.0].facets,
            ElementRef::EnumerationValue(id, index) => {
                &self.enumeration_value(id, index)?.facets
            }
            ElementRef::Entity(id) => &self.entities[id.0].facets,
            ElementRef::Struct(id) => &self.structs[id.0].facets,
            ElementRef::Dao(id) => &self.daos[id.0].facets,
            ElementRef::Query(id) => &self.queries[id.0].facets,
            ElementRef::Characteristic(at) => &self.characteristic(at)?.facets,
            ElementRef::Inverse(at) => &self.inverse_of(at)?.facets,
        };
        Ok(slots)
    }

    pub(crate) fn facets_mut(&mut self, element: ElementRef) -> Result<&mut FacetSlots> {
        let name = self.qualified_name(element)?;
        let slots = match element {
            ElementRef::Repository => &mut self.facets,
            ElementRef::DataModule(id) => &mut self.data_modules[id.0].facets,
            ElementRef::Enumeration(id) => &mut self.enumerations[id.0].facets,
            ElementRef::EnumerationValue(id, index) => {
                match self.enumerations[id.0].values.get_mut(index) {
                    Some(value) => &mut value.facets,
                    None => return Err(ModelError::invalid(name, "no such enumeration value")),
                }
            }
            ElementRef::Entity(id) => &mut self.entities[id.0].facets,
            ElementRef::Struct(id) => &mut self.structs[id.0].facets,
            ElementRef::Dao(id) => &mut self.daos[id.0].facets,
            ElementRef::Query(id) => &mut self.queries[id.0].facets,
            ElementRef::Characteristic(at) => &mut self.characteristic_entry_mut(at)?.facets,
            ElementRef::Inverse(at) => match self.characteristic_entry_mut(at)?.inverse.as_mut() {
                Some(inverse) => &mut inverse.facets,
                None => return Err(ModelError::invalid(name, "characteristic has no inverse")),
            },
        };
        Ok(slots)
    }

    pub(crate) fn enumeration_value(
        &self,
        id: super::EnumerationId,
        index: usize,
    ) -> Result<&super::EnumerationValue> {
        let enumeration = self.enumeration(id);
        enumeration.values().get(index).ok_or_else(|| {
            ModelError::invalid(enumeration.qualified_name(), format!("no value at index {}", index))
        })
    }

    /// Inverse side of a reference attribute
    pub fn inverse_of(&self, at: CharacteristicRef) -> Result<&super::InverseElement> {
        let characteristic = self.characteristic(at)?;
        characteristic.inverse().ok_or_else(|| {
            ModelError::invalid(characteristic.qualified_name(), "characteristic has no inverse")
        })
    }
}
