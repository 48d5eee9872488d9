//! Characteristic containers
//!
//! Entities, structs and queries hold an ordered, name-unique map of
//! characteristics. Typed constructors live on [`ContainerMut`], a short-lived
//! handle borrowing the repository so that symbolic names (enumerations,
//! referenced entities and structs) resolve against the owning data module.

use indexmap::IndexMap;

use super::characteristic::{
    Characteristic, CharacteristicOptions, CharacteristicType, Length, LengthBound,
};
use super::elements::{EnumerationOptions, EnumerationType, InverseElement};
use super::{CharacteristicRef, ContainerRef, DataModuleId, Repository};
use crate::error::{ModelError, Result};
use crate::facet::FacetSlots;

/// Ordered mapping from characteristic name to characteristic
#[derive(Debug, Clone, Default)]
pub struct CharacteristicMap {
    entries: IndexMap<String, Characteristic>,
}

impl CharacteristicMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Characteristic> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Characteristics in declaration order, inherited ones first
    pub fn iter(&self) -> impl Iterator<Item = &Characteristic> {
        self.entries.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    pub(crate) fn get_index(&self, index: usize) -> Option<&Characteristic> {
        self.entries.get_index(index).map(|(_, c)| c)
    }

    pub(crate) fn get_index_mut(&mut self, index: usize) -> Option<&mut Characteristic> {
        self.entries.get_index_mut(index).map(|(_, c)| c)
    }

    /// Register a declared characteristic.
    ///
    /// A name already present fails, unless `allow_override` is set and the
    /// existing entry was inherited; the new declaration then takes its slot.
    pub(crate) fn declare(&mut self, characteristic: Characteristic, allow_override: bool) -> Result<usize> {
        match self.entries.get_index_of(characteristic.name()) {
            Some(index) => {
                if allow_override && self.entries[index].inherited() {
                    self.entries[index] = characteristic;
                    Ok(index)
                } else {
                    Err(ModelError::Duplicate {
                        kind: characteristic.characteristic_kind(),
                        name: characteristic.name().to_string(),
                        scope: characteristic.container_name().to_string(),
                    })
                }
            }
            None => {
                let (index, _) = self
                    .entries
                    .insert_full(characteristic.name().to_string(), characteristic);
                Ok(index)
            }
        }
    }

    /// Insert a clone taken from a parent type
    pub(crate) fn inherit(&mut self, characteristic: Characteristic) -> usize {
        let (index, _) = self
            .entries
            .insert_full(characteristic.name().to_string(), characteristic);
        index
    }

    /// Lookup that lists the available names on failure
    pub fn by_name(&self, name: &str, scope: &str, kind: &'static str) -> Result<&Characteristic> {
        self.entries
            .get(name)
            .ok_or_else(|| ModelError::not_found(kind, name, scope, &self.names()))
    }
}

/// A named holder of characteristics
pub trait CharacteristicContainer {
    fn name(&self) -> &str;

    fn qualified_name(&self) -> String;

    fn data_module(&self) -> DataModuleId;

    /// Noun used for the held characteristics in messages
    fn characteristic_kind(&self) -> &'static str;

    fn characteristic_map(&self) -> &CharacteristicMap;

    fn facets(&self) -> &FacetSlots;

    fn characteristics(&self) -> Vec<&Characteristic> {
        self.characteristic_map().iter().collect()
    }

    fn characteristic_exists(&self, name: &str) -> bool {
        self.characteristic_map().contains(name)
    }

    fn characteristic_by_name(&self, name: &str) -> Result<&Characteristic> {
        self.characteristic_map()
            .by_name(name, &self.qualified_name(), self.characteristic_kind())
    }
}

/// Typed constructors for one container
pub struct ContainerMut<'a> {
    model: &'a mut Repository,
    container: ContainerRef,
}

impl<'a> ContainerMut<'a> {
    pub(crate) fn new(model: &'a mut Repository, container: ContainerRef) -> Self {
        Self { model, container }
    }

    pub fn container(&self) -> ContainerRef {
        self.container
    }

    fn data_module(&self) -> DataModuleId {
        self.model.container(self.container).data_module()
    }

    pub fn boolean(&mut self, name: &str, options: CharacteristicOptions) -> Result<CharacteristicRef> {
        self.characteristic(name, CharacteristicType::Boolean, options)
    }

    pub fn text(&mut self, name: &str, options: CharacteristicOptions) -> Result<CharacteristicRef> {
        self.characteristic(name, CharacteristicType::Text, options)
    }

    /// Text with a maximum length, or a `min..=max` range
    pub fn string(
        &mut self,
        name: &str,
        length: impl Into<LengthBound>,
        options: CharacteristicOptions,
    ) -> Result<CharacteristicRef> {
        let options = match length.into() {
            LengthBound::Max(length) => options.length(length),
            LengthBound::Range { min, max } => options.min_length(min).length(Length::Chars(max)),
        };
        self.characteristic(name, CharacteristicType::Text, options)
    }

    pub fn integer(&mut self, name: &str, options: CharacteristicOptions) -> Result<CharacteristicRef> {
        self.characteristic(name, CharacteristicType::Integer, options)
    }

    pub fn real(&mut self, name: &str, options: CharacteristicOptions) -> Result<CharacteristicRef> {
        self.characteristic(name, CharacteristicType::Real, options)
    }

    pub fn datetime(&mut self, name: &str, options: CharacteristicOptions) -> Result<CharacteristicRef> {
        self.characteristic(name, CharacteristicType::DateTime, options)
    }

    pub fn date(&mut self, name: &str, options: CharacteristicOptions) -> Result<CharacteristicRef> {
        self.characteristic(name, CharacteristicType::Date, options)
    }

    /// Enumeration with integer storage, synthesized as `<container><name>`
    pub fn i_enum<S: AsRef<str>>(
        &mut self,
        name: &str,
        values: &[S],
        options: CharacteristicOptions,
    ) -> Result<CharacteristicRef> {
        self.synthesized_enumeration(name, EnumerationType::Integer, values, options)
    }

    /// Enumeration with text storage, synthesized as `<container><name>`
    pub fn s_enum<S: AsRef<str>>(
        &mut self,
        name: &str,
        values: &[S],
        options: CharacteristicOptions,
    ) -> Result<CharacteristicRef> {
        self.synthesized_enumeration(name, EnumerationType::Text, values, options)
    }

    fn synthesized_enumeration<S: AsRef<str>>(
        &mut self,
        name: &str,
        enumeration_type: EnumerationType,
        values: &[S],
        options: CharacteristicOptions,
    ) -> Result<CharacteristicRef> {
        let enumeration_name = format!("{}{}", self.model.container(self.container).name(), name);
        let data_module = self.data_module();
        let id = self.model.define_enumeration(
            data_module,
            &enumeration_name,
            enumeration_type,
            EnumerationOptions::values(values).top_level(false),
        )?;
        match self.enumeration(name, &enumeration_name, options) {
            Ok(at) => Ok(at),
            Err(e) => {
                self.model.discard_last_enumeration(id);
                Err(e)
            }
        }
    }

    /// Characteristic typed by a named enumeration. Textual enumerations fix
    /// the length to their longest value.
    pub fn enumeration(
        &mut self,
        name: &str,
        enumeration_key: &str,
        options: CharacteristicOptions,
    ) -> Result<CharacteristicRef> {
        let id = self.model.enumeration_by_name(self.data_module(), enumeration_key)?;
        let enumeration = self.model.enumeration(id);
        let options = if enumeration.textual_values() {
            options.length(enumeration.max_value_length())
        } else {
            options
        };
        self.characteristic(name, CharacteristicType::Enumeration(Some(id)), options)
    }

    /// Reference to another entity, named after its last dotted segment
    /// unless `options.name` is set
    pub fn reference(&mut self, other_type: &str, options: CharacteristicOptions) -> Result<CharacteristicRef> {
        let name = match &options.name {
            Some(name) => name.clone(),
            None => match other_type.rsplit_once('.') {
                Some((_, last)) => last.to_string(),
                None => other_type.to_string(),
            },
        };
        let entity = self.model.entity_by_name(self.data_module(), other_type)?;
        self.characteristic(&name, CharacteristicType::Reference(Some(entity)), options)
    }

    /// Field or attribute typed by a named struct
    pub fn structure(
        &mut self,
        name: &str,
        struct_key: &str,
        options: CharacteristicOptions,
    ) -> Result<CharacteristicRef> {
        let id = self.model.struct_by_name(self.data_module(), struct_key)?;
        self.characteristic(name, CharacteristicType::Struct(Some(id)), options)
    }

    /// Declare a characteristic of any type.
    ///
    /// Payload-carrying types may be declared unbound and bound later through
    /// [`CharacteristicMut`](super::CharacteristicMut).
    pub fn characteristic(
        &mut self,
        name: &str,
        characteristic_type: CharacteristicType,
        options: CharacteristicOptions,
    ) -> Result<CharacteristicRef> {
        self.model.ensure_open()?;
        let owner = self.model.container(self.container);
        let facets = self
            .model
            .registry
            .slots_for(self.container.characteristic_element_kind(), Some(owner.facets()));
        let mut characteristic = Characteristic::new(
            name,
            self.container,
            &owner.qualified_name(),
            characteristic_type,
            facets,
        );
        characteristic.apply(&options, self.model)?;

        if let (ContainerRef::Entity(_), CharacteristicType::Reference(_)) =
            (self.container, characteristic_type)
        {
            let facets = self
                .model
                .registry
                .slots_for(super::ElementKind::InverseElement, Some(&characteristic.facets));
            characteristic.inverse = Some(InverseElement::new(&options.inverse, facets));
        }

        let allow_override = self.container.is_inheritable();
        let index = self
            .model
            .characteristic_map_mut(self.container)
            .declare(characteristic, allow_override)?;
        Ok(CharacteristicRef {
            container: self.container,
            index,
        })
    }
}
