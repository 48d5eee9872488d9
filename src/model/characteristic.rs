//! Characteristics
//!
//! A characteristic is a named, typed field held by a container: an entity
//! attribute, a struct field or a query parameter. Its type is a closed
//! tagged union; type-specific payloads (enumeration, referenced entity,
//! referenced struct) only exist on the matching variant, and reading or
//! setting them on another variant is a configuration error.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::elements::{InverseElement, Multiplicity};
use super::{
    ContainerRef, EntityId, EnumerationId, InheritableCharacteristicContainer, Repository, StructId,
};
use crate::error::{ModelError, Result};
use crate::facet::FacetSlots;
use crate::naming;

/// Type of a characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacteristicType {
    Boolean,
    Text,
    Integer,
    Real,
    DateTime,
    Date,
    /// Payload is unset until bound to an enumeration
    Enumeration(Option<EnumerationId>),
    /// Payload is unset until bound to an entity
    Reference(Option<EntityId>),
    /// Payload is unset until bound to a struct
    Struct(Option<StructId>),
}

impl CharacteristicType {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Enumeration(_) => "enumeration",
            Self::Reference(_) => "reference",
            Self::Struct(_) => "struct",
        }
    }

    /// Types without a payload, by key
    pub fn scalar(key: &str) -> Option<Self> {
        match key {
            "boolean" => Some(Self::Boolean),
            "text" => Some(Self::Text),
            "integer" => Some(Self::Integer),
            "real" => Some(Self::Real),
            "datetime" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            _ => None,
        }
    }
}

/// Maximum length of a textual characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Chars(u32),
    /// Unbounded
    Max,
}

impl From<u32> for Length {
    fn from(chars: u32) -> Self {
        Length::Chars(chars)
    }
}

/// Length argument of [`ContainerMut::string`](super::ContainerMut::string):
/// either a maximum or a `min..=max` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBound {
    Max(Length),
    Range { min: u32, max: u32 },
}

impl From<u32> for LengthBound {
    fn from(max: u32) -> Self {
        LengthBound::Max(Length::Chars(max))
    }
}

impl From<Length> for LengthBound {
    fn from(length: Length) -> Self {
        LengthBound::Max(length)
    }
}

impl From<RangeInclusive<u32>> for LengthBound {
    fn from(range: RangeInclusive<u32>) -> Self {
        LengthBound::Range {
            min: *range.start(),
            max: *range.end(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    #[default]
    None,
    Sequence,
    Set,
}

/// Settings for the inverse side of a reference attribute
#[derive(Debug, Clone, Default)]
pub struct InverseOptions {
    pub name: Option<String>,
    pub multiplicity: Option<Multiplicity>,
    pub traversable: Option<bool>,
}

/// Optional settings applied when a characteristic is declared.
///
/// Every setting goes through the same validation as the setters on
/// [`CharacteristicMut`].
#[derive(Debug, Clone, Default)]
pub struct CharacteristicOptions {
    /// Explicit name, used by `reference`
    pub name: Option<String>,
    pub nullable: Option<bool>,
    pub allow_blank: Option<bool>,
    pub length: Option<Length>,
    pub min_length: Option<u32>,
    pub collection_type: Option<CollectionType>,
    pub primary_key: bool,
    pub polymorphic: Option<bool>,
    pub is_abstract: Option<bool>,
    pub is_override: Option<bool>,
    pub description: Option<String>,
    pub inverse: InverseOptions,
}

impl CharacteristicOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn allow_blank(mut self, allow_blank: bool) -> Self {
        self.allow_blank = Some(allow_blank);
        self
    }

    pub fn length(mut self, length: impl Into<Length>) -> Self {
        self.length = Some(length.into());
        self
    }

    pub fn min_length(mut self, min_length: u32) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn collection_type(mut self, collection_type: CollectionType) -> Self {
        self.collection_type = Some(collection_type);
        self
    }

    pub fn primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    pub fn polymorphic(mut self, polymorphic: bool) -> Self {
        self.polymorphic = Some(polymorphic);
        self
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = Some(is_abstract);
        self
    }

    pub fn is_override(mut self, is_override: bool) -> Self {
        self.is_override = Some(is_override);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn inverse_name(mut self, name: impl Into<String>) -> Self {
        self.inverse.name = Some(name.into());
        self
    }

    pub fn inverse_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.inverse.multiplicity = Some(multiplicity);
        self
    }

    pub fn inverse_traversable(mut self, traversable: bool) -> Self {
        self.inverse.traversable = Some(traversable);
        self
    }
}

/// A named, typed field on an entity, struct or query
#[derive(Debug, Clone)]
pub struct Characteristic {
    name: String,
    pub(crate) container: ContainerRef,
    container_name: String,
    characteristic_type: CharacteristicType,
    nullable: Option<bool>,
    allow_blank: Option<bool>,
    length: Option<Length>,
    min_length: Option<u32>,
    collection_type: CollectionType,
    polymorphic: Option<bool>,
    primary_key: bool,
    description: Option<String>,
    pub(crate) inherited: bool,
    is_abstract: Option<bool>,
    is_override: Option<bool>,
    pub(crate) inverse: Option<InverseElement>,
    pub(crate) facets: FacetSlots,
}

impl Characteristic {
    pub(crate) fn new(
        name: &str,
        container: ContainerRef,
        container_name: &str,
        characteristic_type: CharacteristicType,
        facets: FacetSlots,
    ) -> Self {
        Self {
            name: name.to_string(),
            container,
            container_name: container_name.to_string(),
            characteristic_type,
            nullable: None,
            allow_blank: None,
            length: None,
            min_length: None,
            collection_type: CollectionType::None,
            polymorphic: None,
            primary_key: false,
            description: None,
            inherited: false,
            is_abstract: None,
            is_override: None,
            inverse: None,
            facets,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> ContainerRef {
        self.container
    }

    /// Qualified name of the owning container
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// `Module.Container.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.container_name, self.name)
    }

    /// `attribute`, `field` or `parameter`
    pub fn characteristic_kind(&self) -> &'static str {
        self.container.characteristic_kind()
    }

    pub fn characteristic_type(&self) -> CharacteristicType {
        self.characteristic_type
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::Boolean)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::Text)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::Integer)
    }

    pub fn is_real(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::Real)
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::DateTime)
    }

    pub fn is_date(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::Date)
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::Enumeration(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::Reference(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.characteristic_type, CharacteristicType::Struct(_))
    }

    pub fn nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
    }

    pub fn allow_blank(&self) -> bool {
        self.allow_blank.unwrap_or(true)
    }

    pub fn length(&self) -> Option<Length> {
        self.length
    }

    pub fn has_non_max_length(&self) -> bool {
        matches!(self.length, Some(Length::Chars(_)))
    }

    pub fn min_length(&self) -> u32 {
        self.min_length
            .unwrap_or(if self.allow_blank() { 0 } else { 1 })
    }

    pub fn collection_type(&self) -> CollectionType {
        self.collection_type
    }

    pub fn is_collection(&self) -> bool {
        self.collection_type != CollectionType::None
    }

    pub fn primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Cloned from a parent type rather than declared here
    pub fn inherited(&self) -> bool {
        self.inherited
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract.unwrap_or(false)
    }

    pub fn is_override(&self) -> bool {
        self.is_override.unwrap_or(false)
    }

    /// Inverse side, present on reference attributes of entities
    pub fn inverse(&self) -> Option<&InverseElement> {
        self.inverse.as_ref()
    }

    pub fn facets(&self) -> &FacetSlots {
        &self.facets
    }

    /// Text, or an enumeration stored as text
    pub fn allows_length(&self, model: &Repository) -> bool {
        match self.characteristic_type {
            CharacteristicType::Text => true,
            CharacteristicType::Enumeration(Some(id)) => model.enumeration(id).textual_values(),
            _ => false,
        }
    }

    pub fn enumeration(&self) -> Result<EnumerationId> {
        match self.characteristic_type {
            CharacteristicType::Enumeration(Some(id)) => Ok(id),
            CharacteristicType::Enumeration(None) => Err(self.unbound("enumeration")),
            _ => Err(self.mismatch("enumeration", "an enumeration")),
        }
    }

    pub fn referenced_entity(&self) -> Result<EntityId> {
        match self.characteristic_type {
            CharacteristicType::Reference(Some(id)) => Ok(id),
            CharacteristicType::Reference(None) => Err(self.unbound("referenced_entity")),
            _ => Err(self.mismatch("referenced_entity", "a reference")),
        }
    }

    pub fn referenced_struct(&self) -> Result<StructId> {
        match self.characteristic_type {
            CharacteristicType::Struct(Some(id)) => Ok(id),
            CharacteristicType::Struct(None) => Err(self.unbound("referenced_struct")),
            _ => Err(self.mismatch("referenced_struct", "a struct")),
        }
    }

    /// Defaults to "the referenced entity is not final"
    pub fn polymorphic(&self, model: &Repository) -> Result<bool> {
        if !self.is_reference() {
            return Err(self.mismatch("polymorphic", "a reference"));
        }
        match self.polymorphic {
            Some(polymorphic) => Ok(polymorphic),
            None => Ok(!model.entity(self.referenced_entity()?).is_final()),
        }
    }

    /// Foreign-key style name: `owner` referencing an entity keyed by `id`
    /// gives `ownerId`.
    pub fn referencing_link_name(&self, model: &Repository) -> Result<String> {
        if !self.is_reference() {
            return Err(self.mismatch("referencing_link_name", "a reference"));
        }
        let entity = model.entity(self.referenced_entity()?);
        let key = entity.primary_key()?;
        Ok(format!("{}{}", self.name, naming::capitalize(key.name())))
    }

    // -------------------------------------------------------------------------
    // Validated assignment
    // -------------------------------------------------------------------------

    pub(crate) fn assign_length(&mut self, length: Length, allows_length: bool) -> Result<()> {
        if !allows_length {
            return Err(self.mismatch("length", "a string"));
        }
        self.length = Some(length);
        Ok(())
    }

    pub(crate) fn assign_min_length(&mut self, min_length: u32, allows_length: bool) -> Result<()> {
        if !allows_length {
            return Err(self.mismatch("min_length", "a string"));
        }
        self.min_length = Some(min_length);
        Ok(())
    }

    pub(crate) fn assign_enumeration(&mut self, id: EnumerationId) -> Result<()> {
        match self.characteristic_type {
            CharacteristicType::Enumeration(_) => {
                self.characteristic_type = CharacteristicType::Enumeration(Some(id));
                Ok(())
            }
            _ => Err(self.mismatch("enumeration", "an enumeration")),
        }
    }

    pub(crate) fn assign_referenced_entity(&mut self, id: EntityId) -> Result<()> {
        match self.characteristic_type {
            CharacteristicType::Reference(_) => {
                self.characteristic_type = CharacteristicType::Reference(Some(id));
                Ok(())
            }
            _ => Err(self.mismatch("referenced_entity", "a reference")),
        }
    }

    pub(crate) fn assign_referenced_struct(&mut self, id: StructId) -> Result<()> {
        match self.characteristic_type {
            CharacteristicType::Struct(_) => {
                self.characteristic_type = CharacteristicType::Struct(Some(id));
                Ok(())
            }
            _ => Err(self.mismatch("referenced_struct", "a struct")),
        }
    }

    pub(crate) fn assign_polymorphic(&mut self, polymorphic: bool) -> Result<()> {
        if !self.is_reference() {
            return Err(self.mismatch("polymorphic", "a reference"));
        }
        self.polymorphic = Some(polymorphic);
        Ok(())
    }

    pub(crate) fn assign_primary_key(&mut self, primary_key: bool) -> Result<()> {
        if primary_key && !matches!(self.container, ContainerRef::Entity(_)) {
            return Err(ModelError::invalid(
                self.qualified_name(),
                format!("a {} cannot be a primary key", self.characteristic_kind()),
            ));
        }
        self.primary_key = primary_key;
        Ok(())
    }

    pub(crate) fn set_flags(
        &mut self,
        nullable: Option<bool>,
        allow_blank: Option<bool>,
        collection_type: Option<CollectionType>,
    ) {
        if nullable.is_some() {
            self.nullable = nullable;
        }
        if allow_blank.is_some() {
            self.allow_blank = allow_blank;
        }
        if let Some(collection_type) = collection_type {
            self.collection_type = collection_type;
        }
    }

    pub(crate) fn set_abstract(&mut self, is_abstract: bool) {
        self.is_abstract = Some(is_abstract);
    }

    pub(crate) fn set_override(&mut self, is_override: bool) {
        self.is_override = Some(is_override);
    }

    pub(crate) fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Apply declaration options; `model` must not contain `self` yet.
    pub(crate) fn apply(&mut self, options: &CharacteristicOptions, model: &Repository) -> Result<()> {
        self.set_flags(options.nullable, options.allow_blank, options.collection_type);
        let allows_length = self.allows_length(model);
        if let Some(length) = options.length {
            self.assign_length(length, allows_length)?;
        }
        if let Some(min_length) = options.min_length {
            self.assign_min_length(min_length, allows_length)?;
        }
        if let Some(polymorphic) = options.polymorphic {
            self.assign_polymorphic(polymorphic)?;
        }
        self.assign_primary_key(options.primary_key)?;
        self.is_abstract = options.is_abstract;
        self.is_override = options.is_override;
        self.description = options.description.clone();
        Ok(())
    }

    /// Move a clone onto a subtype
    pub(crate) fn rehome(&mut self, container: ContainerRef, container_name: &str) {
        self.container = container;
        self.container_name = container_name.to_string();
        self.inherited = true;
    }

    /// Payload bound on a payload-carrying type
    pub(crate) fn verify(&self) -> Result<()> {
        match self.characteristic_type {
            CharacteristicType::Enumeration(None) => Err(self.unbound("enumeration")),
            CharacteristicType::Reference(None) => Err(self.unbound("referenced_entity")),
            CharacteristicType::Struct(None) => Err(self.unbound("referenced_struct")),
            _ => Ok(()),
        }
    }

    fn mismatch(&self, property: &'static str, expected: &str) -> ModelError {
        ModelError::TypeMismatch {
            element: self.qualified_name(),
            property,
            reason: format!("{} is not {}", self.characteristic_kind(), expected),
        }
    }

    fn unbound(&self, property: &str) -> ModelError {
        ModelError::invalid(self.qualified_name(), format!("{} has not been set", property))
    }
}

/// Validated setters for a characteristic already declared on its container
pub struct CharacteristicMut<'a> {
    model: &'a mut Repository,
    at: super::CharacteristicRef,
}

impl<'a> CharacteristicMut<'a> {
    pub(crate) fn new(model: &'a mut Repository, at: super::CharacteristicRef) -> Self {
        Self { model, at }
    }

    pub fn at(&self) -> super::CharacteristicRef {
        self.at
    }

    fn entry(&mut self) -> Result<&mut Characteristic> {
        self.model.ensure_open()?;
        self.model.characteristic_entry_mut(self.at)
    }

    fn allows_length(&self) -> Result<bool> {
        let model = &*self.model;
        Ok(model.characteristic(self.at)?.allows_length(model))
    }

    fn data_module(&self) -> super::DataModuleId {
        self.model.container(self.at.container).data_module()
    }

    pub fn set_length(&mut self, length: impl Into<Length>) -> Result<()> {
        let allows_length = self.allows_length()?;
        self.entry()?.assign_length(length.into(), allows_length)
    }

    pub fn set_min_length(&mut self, min_length: u32) -> Result<()> {
        let allows_length = self.allows_length()?;
        self.entry()?.assign_min_length(min_length, allows_length)
    }

    pub fn set_nullable(&mut self, nullable: bool) -> Result<()> {
        self.entry()?.set_flags(Some(nullable), None, None);
        Ok(())
    }

    pub fn set_allow_blank(&mut self, allow_blank: bool) -> Result<()> {
        self.entry()?.set_flags(None, Some(allow_blank), None);
        Ok(())
    }

    pub fn set_collection_type(&mut self, collection_type: CollectionType) -> Result<()> {
        self.entry()?.set_flags(None, None, Some(collection_type));
        Ok(())
    }

    pub fn set_polymorphic(&mut self, polymorphic: bool) -> Result<()> {
        self.entry()?.assign_polymorphic(polymorphic)
    }

    pub fn set_primary_key(&mut self, primary_key: bool) -> Result<()> {
        self.entry()?.assign_primary_key(primary_key)
    }

    pub fn set_abstract(&mut self, is_abstract: bool) -> Result<()> {
        self.entry()?.set_abstract(is_abstract);
        Ok(())
    }

    pub fn set_override(&mut self, is_override: bool) -> Result<()> {
        self.entry()?.set_override(is_override);
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.entry()?.set_description(Some(description.into()));
        Ok(())
    }

    pub fn set_enumeration(&mut self, id: EnumerationId) -> Result<()> {
        self.entry()?.assign_enumeration(id)
    }

    /// Resolve `name` against the owning data module, then bind it
    pub fn set_enumeration_by_name(&mut self, name: &str) -> Result<()> {
        let id = self.model.enumeration_by_name(self.data_module(), name)?;
        self.set_enumeration(id)
    }

    pub fn set_referenced_entity(&mut self, id: EntityId) -> Result<()> {
        self.entry()?.assign_referenced_entity(id)
    }

    /// Resolve `name` against the owning data module, then bind it
    pub fn set_referenced_entity_by_name(&mut self, name: &str) -> Result<()> {
        let id = self.model.entity_by_name(self.data_module(), name)?;
        self.set_referenced_entity(id)
    }

    pub fn set_referenced_struct(&mut self, id: StructId) -> Result<()> {
        self.entry()?.assign_referenced_struct(id)
    }

    /// Resolve `name` against the owning data module, then bind it
    pub fn set_referenced_struct_by_name(&mut self, name: &str) -> Result<()> {
        let id = self.model.struct_by_name(self.data_module(), name)?;
        self.set_referenced_struct(id)
    }
}
