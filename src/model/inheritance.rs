//! Single inheritance for entities and structs
//!
//! Extension copies the parent's characteristics into the subtype at the
//! moment `extend` runs. Characteristics added to the parent afterwards are
//! not propagated.

use super::characteristic::Characteristic;
use super::container::CharacteristicContainer;
use super::{ContainerRef, EntityId, Repository, StructId};
use crate::error::{ModelError, Result};

/// Extension state of an inheritable container
#[derive(Debug, Clone)]
pub struct Inheritance<I> {
    pub(crate) extends: Option<I>,
    is_abstract: Option<bool>,
    is_final: Option<bool>,
    pub(crate) direct_subtypes: Vec<I>,
}

impl<I: Copy> Inheritance<I> {
    pub(crate) fn new(is_abstract: Option<bool>, is_final: Option<bool>) -> Self {
        Self {
            extends: None,
            is_abstract,
            is_final,
            direct_subtypes: Vec::new(),
        }
    }

    pub fn extends(&self) -> Option<I> {
        self.extends
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract.unwrap_or(false)
    }

    /// Defaults to "not abstract"
    pub fn is_final(&self) -> bool {
        self.is_final.unwrap_or(!self.is_abstract())
    }

    pub fn direct_subtypes(&self) -> &[I] {
        &self.direct_subtypes
    }
}

/// A container that may extend one parent of its own kind
pub trait InheritableCharacteristicContainer: CharacteristicContainer {
    type Id: Copy;

    fn inheritance(&self) -> &Inheritance<Self::Id>;

    fn extends(&self) -> Option<Self::Id> {
        self.inheritance().extends()
    }

    fn is_abstract(&self) -> bool {
        self.inheritance().is_abstract()
    }

    fn is_final(&self) -> bool {
        self.inheritance().is_final()
    }

    fn direct_subtypes(&self) -> &[Self::Id] {
        self.inheritance().direct_subtypes()
    }

    fn declared_characteristics(&self) -> Vec<&Characteristic> {
        self.characteristic_map().iter().filter(|c| !c.inherited()).collect()
    }

    fn inherited_characteristics(&self) -> Vec<&Characteristic> {
        self.characteristic_map().iter().filter(|c| c.inherited()).collect()
    }
}

impl Repository {
    /// Make `entity` extend the entity named `extends`
    pub fn extend_entity(&mut self, entity: EntityId, extends: &str) -> Result<()> {
        self.ensure_open()?;
        let parent = self.entity_by_name(self.entity(entity).data_module(), extends)?;
        self.perform_extend(ContainerRef::Entity(entity), ContainerRef::Entity(parent))
    }

    /// Make `definition` extend the struct named `extends`
    pub fn extend_struct(&mut self, definition: StructId, extends: &str) -> Result<()> {
        self.ensure_open()?;
        let parent = self.struct_by_name(self.struct_type(definition).data_module(), extends)?;
        self.perform_extend(ContainerRef::Struct(definition), ContainerRef::Struct(parent))
    }

    /// Link `child` under `parent` and copy the parent's characteristics.
    ///
    /// Every check runs before the first mutation.
    pub(crate) fn perform_extend(&mut self, child: ContainerRef, parent: ContainerRef) -> Result<()> {
        let (type_key, already_extends, parent_final) = match (child, parent) {
            (ContainerRef::Entity(c), ContainerRef::Entity(p)) => (
                "entity",
                self.entities[c.0].inheritance.extends.is_some(),
                self.entities[p.0].is_final(),
            ),
            (ContainerRef::Struct(c), ContainerRef::Struct(p)) => (
                "struct",
                self.structs[c.0].inheritance.extends.is_some(),
                self.structs[p.0].is_final(),
            ),
            _ => {
                return Err(ModelError::invalid(
                    self.container(child).qualified_name(),
                    "only entities and structs extend types of their own kind",
                ))
            }
        };

        let child_name = self.container(child).qualified_name();
        let parent_name = self.container(parent).qualified_name();
        if child == parent {
            return Err(ModelError::invalid(child_name, "a type cannot extend itself"));
        }
        if already_extends {
            return Err(ModelError::invalid(child_name, "type already extends another type"));
        }
        if parent_final {
            return Err(ModelError::ExtendFinal {
                kind: type_key,
                name: child_name,
                parent: parent_name,
            });
        }

        match (child, parent) {
            (ContainerRef::Entity(c), ContainerRef::Entity(p)) => {
                self.entities[c.0].inheritance.extends = Some(p);
                self.entities[p.0].inheritance.direct_subtypes.push(c);
            }
            (ContainerRef::Struct(c), ContainerRef::Struct(p)) => {
                self.structs[c.0].inheritance.extends = Some(p);
                self.structs[p.0].inheritance.direct_subtypes.push(c);
            }
            _ => {}
        }

        let snapshot: Vec<Characteristic> = self
            .container(parent)
            .characteristic_map()
            .iter()
            .cloned()
            .collect();
        let map = self.characteristic_map_mut(child);
        for mut characteristic in snapshot {
            characteristic.rehome(child, &child_name);
            map.inherit(characteristic);
        }
        Ok(())
    }
}
