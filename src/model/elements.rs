//! Model elements other than characteristics
//!
//! Data modules own the name → handle tables of their entities, structs,
//! enumerations and daos; the elements themselves live in the repository's
//! arena.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::characteristic::{Characteristic, InverseOptions};
use super::container::{CharacteristicContainer, CharacteristicMap};
use super::inheritance::{Inheritance, InheritableCharacteristicContainer};
use super::{DaoId, DataModuleId, EntityId, EnumerationId, Repository, StructId};
use crate::error::{ModelError, Result};
use crate::facet::FacetSlots;
use crate::naming;

/// Options for `define_entity` / `define_struct`
#[derive(Debug, Clone, Default)]
pub struct TypeOptions {
    pub is_abstract: Option<bool>,
    pub is_final: Option<bool>,
    /// Parent type, resolved in the same data module unless dotted
    pub extends: Option<String>,
    pub description: Option<String>,
}

impl TypeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = Some(is_abstract);
        self
    }

    pub fn is_final(mut self, is_final: bool) -> Self {
        self.is_final = Some(is_final);
        self
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// Data module
// =============================================================================

/// A named grouping of types (a "schema" in rendering terms)
#[derive(Debug, Clone)]
pub struct DataModule {
    name: String,
    pub(crate) entities: IndexMap<String, EntityId>,
    pub(crate) structs: IndexMap<String, StructId>,
    pub(crate) enumerations: IndexMap<String, EnumerationId>,
    pub(crate) daos: IndexMap<String, DaoId>,
    pub(crate) facets: FacetSlots,
}

impl DataModule {
    pub(crate) fn new(name: &str, facets: FacetSlots) -> Self {
        Self {
            name: name.to_string(),
            entities: IndexMap::new(),
            structs: IndexMap::new(),
            enumerations: IndexMap::new(),
            daos: IndexMap::new(),
            facets,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.values().copied()
    }

    pub fn structs(&self) -> impl Iterator<Item = StructId> + '_ {
        self.structs.values().copied()
    }

    pub fn enumerations(&self) -> impl Iterator<Item = EnumerationId> + '_ {
        self.enumerations.values().copied()
    }

    pub fn daos(&self) -> impl Iterator<Item = DaoId> + '_ {
        self.daos.values().copied()
    }

    pub fn facets(&self) -> &FacetSlots {
        &self.facets
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Storage of an enumeration's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationType {
    Integer,
    Text,
}

#[derive(Debug, Clone, Default)]
pub struct EnumerationOptions {
    pub values: Vec<String>,
    /// Defaults to true; synthesized enumerations are not top level
    pub top_level: Option<bool>,
    pub description: Option<String>,
}

impl EnumerationOptions {
    pub fn values<S: AsRef<str>>(values: &[S]) -> Self {
        Self {
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn top_level(mut self, top_level: bool) -> Self {
        self.top_level = Some(top_level);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct EnumerationValue {
    name: String,
    description: Option<String>,
    pub(crate) facets: FacetSlots,
}

impl EnumerationValue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn facets(&self) -> &FacetSlots {
        &self.facets
    }
}

#[derive(Debug, Clone)]
pub struct Enumeration {
    name: String,
    data_module: DataModuleId,
    qualified_name: String,
    enumeration_type: EnumerationType,
    pub(crate) values: Vec<EnumerationValue>,
    top_level: bool,
    description: Option<String>,
    pub(crate) facets: FacetSlots,
}

impl Enumeration {
    pub(crate) fn new(
        name: &str,
        data_module: DataModuleId,
        qualified_name: String,
        enumeration_type: EnumerationType,
        options: &EnumerationOptions,
        facets: FacetSlots,
    ) -> Self {
        Self {
            name: name.to_string(),
            data_module,
            qualified_name,
            enumeration_type,
            values: Vec::new(),
            top_level: options.top_level.unwrap_or(true),
            description: options.description.clone(),
            facets,
        }
    }

    pub(crate) fn push_value(&mut self, name: &str, facets: FacetSlots) -> Result<()> {
        if self.values.iter().any(|v| v.name == name) {
            return Err(ModelError::Duplicate {
                kind: "enumeration value",
                name: name.to_string(),
                scope: self.qualified_name.clone(),
            });
        }
        self.values.push(EnumerationValue {
            name: name.to_string(),
            description: None,
            facets,
        });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn data_module(&self) -> DataModuleId {
        self.data_module
    }

    pub fn enumeration_type(&self) -> EnumerationType {
        self.enumeration_type
    }

    pub fn values(&self) -> &[EnumerationValue] {
        &self.values
    }

    pub fn value_by_name(&self, name: &str) -> Result<&EnumerationValue> {
        self.values.iter().find(|v| v.name == name).ok_or_else(|| {
            let available: Vec<&str> = self.values.iter().map(|v| v.name()).collect();
            ModelError::not_found("enumeration value", name, &self.qualified_name, &available)
        })
    }

    pub fn top_level(&self) -> bool {
        self.top_level
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn textual_values(&self) -> bool {
        self.enumeration_type == EnumerationType::Text
    }

    /// Length of the longest value name
    pub fn max_value_length(&self) -> u32 {
        self.values
            .iter()
            .map(|v| v.name.chars().count() as u32)
            .max()
            .unwrap_or(0)
    }

    pub fn facets(&self) -> &FacetSlots {
        &self.facets
    }
}

// =============================================================================
// Entities and structs
// =============================================================================

/// A persistent type whose characteristics are attributes
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    data_module: DataModuleId,
    qualified_name: String,
    description: Option<String>,
    pub(crate) inheritance: Inheritance<EntityId>,
    pub(crate) attributes: CharacteristicMap,
    pub(crate) facets: FacetSlots,
}

impl Entity {
    pub(crate) fn new(
        name: &str,
        data_module: DataModuleId,
        module_name: &str,
        options: &TypeOptions,
        facets: FacetSlots,
    ) -> Self {
        Self {
            name: name.to_string(),
            data_module,
            qualified_name: format!("{}.{}", module_name, name),
            description: options.description.clone(),
            inheritance: Inheritance::new(options.is_abstract, options.is_final),
            attributes: CharacteristicMap::default(),
            facets,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attributes(&self) -> Vec<&Characteristic> {
        self.characteristics()
    }

    pub fn attribute_by_name(&self, name: &str) -> Result<&Characteristic> {
        self.characteristic_by_name(name)
    }

    /// The attribute flagged as primary key
    pub fn primary_key(&self) -> Result<&Characteristic> {
        self.attributes
            .iter()
            .find(|a| a.primary_key())
            .ok_or_else(|| ModelError::invalid(&self.qualified_name, "entity has no primary key"))
    }
}

impl CharacteristicContainer for Entity {
    fn name(&self) -> &str {
        &self.name
    }

    fn qualified_name(&self) -> String {
        self.qualified_name.clone()
    }

    fn data_module(&self) -> DataModuleId {
        self.data_module
    }

    fn characteristic_kind(&self) -> &'static str {
        "attribute"
    }

    fn characteristic_map(&self) -> &CharacteristicMap {
        &self.attributes
    }

    fn facets(&self) -> &FacetSlots {
        &self.facets
    }
}

impl InheritableCharacteristicContainer for Entity {
    type Id = EntityId;

    fn inheritance(&self) -> &Inheritance<EntityId> {
        &self.inheritance
    }
}

/// A value type whose characteristics are fields
#[derive(Debug, Clone)]
pub struct Struct {
    name: String,
    data_module: DataModuleId,
    qualified_name: String,
    description: Option<String>,
    pub(crate) inheritance: Inheritance<StructId>,
    pub(crate) fields: CharacteristicMap,
    pub(crate) facets: FacetSlots,
}

impl Struct {
    pub(crate) fn new(
        name: &str,
        data_module: DataModuleId,
        module_name: &str,
        options: &TypeOptions,
        facets: FacetSlots,
    ) -> Self {
        Self {
            name: name.to_string(),
            data_module,
            qualified_name: format!("{}.{}", module_name, name),
            description: options.description.clone(),
            inheritance: Inheritance::new(options.is_abstract, options.is_final),
            fields: CharacteristicMap::default(),
            facets,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> Vec<&Characteristic> {
        self.characteristics()
    }

    pub fn field_by_name(&self, name: &str) -> Result<&Characteristic> {
        self.characteristic_by_name(name)
    }
}

impl CharacteristicContainer for Struct {
    fn name(&self) -> &str {
        &self.name
    }

    fn qualified_name(&self) -> String {
        self.qualified_name.clone()
    }

    fn data_module(&self) -> DataModuleId {
        self.data_module
    }

    fn characteristic_kind(&self) -> &'static str {
        "field"
    }

    fn characteristic_map(&self) -> &CharacteristicMap {
        &self.fields
    }

    fn facets(&self) -> &FacetSlots {
        &self.facets
    }
}

impl InheritableCharacteristicContainer for Struct {
    type Id = StructId;

    fn inheritance(&self) -> &Inheritance<StructId> {
        &self.inheritance
    }
}

// =============================================================================
// Inverse side of references
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    One,
    #[default]
    Many,
    ZeroOrOne,
}

/// The "other end" of a reference attribute, seen from the referenced entity
#[derive(Debug, Clone)]
pub struct InverseElement {
    name: Option<String>,
    multiplicity: Multiplicity,
    traversable: Option<bool>,
    pub(crate) facets: FacetSlots,
}

impl InverseElement {
    pub(crate) fn new(options: &InverseOptions, facets: FacetSlots) -> Self {
        Self {
            name: options.name.clone(),
            multiplicity: options.multiplicity.unwrap_or_default(),
            traversable: options.traversable,
            facets,
        }
    }

    /// Defaults to the owning entity's name, pluralized for `many`
    pub fn name(&self, model: &Repository, attribute: &Characteristic) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let owner = model.container(attribute.container()).name();
        match self.multiplicity {
            Multiplicity::Many => naming::pluralize(owner),
            _ => owner.to_string(),
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    pub fn traversable(&self) -> bool {
        self.traversable.unwrap_or(false)
    }

    pub fn facets(&self) -> &FacetSlots {
        &self.facets
    }
}

// =============================================================================
// Daos and queries
// =============================================================================

/// A named holder of queries, optionally bound to an entity
#[derive(Debug, Clone)]
pub struct Dao {
    name: String,
    data_module: DataModuleId,
    qualified_name: String,
    entity: Option<EntityId>,
    pub(crate) queries: IndexMap<String, super::QueryId>,
    pub(crate) facets: FacetSlots,
}

impl Dao {
    pub(crate) fn new(
        name: &str,
        data_module: DataModuleId,
        module_name: &str,
        entity: Option<EntityId>,
        facets: FacetSlots,
    ) -> Self {
        Self {
            name: name.to_string(),
            data_module,
            qualified_name: format!("{}.{}", module_name, name),
            entity,
            queries: IndexMap::new(),
            facets,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn data_module(&self) -> DataModuleId {
        self.data_module
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn queries(&self) -> impl Iterator<Item = super::QueryId> + '_ {
        self.queries.values().copied()
    }

    pub fn query_by_name(&self, name: &str) -> Result<super::QueryId> {
        self.queries.get(name).copied().ok_or_else(|| {
            let available: Vec<&str> = self.queries.keys().map(String::as_str).collect();
            ModelError::not_found("query", name, &self.qualified_name, &available)
        })
    }

    pub fn facets(&self) -> &FacetSlots {
        &self.facets
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

/// What a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryResult {
    Entity(EntityId),
    Struct(StructId),
    Scalar,
    None,
}

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub query_type: QueryType,
    pub multiplicity: Multiplicity,
    /// Defaults to the dao's entity for selects on an entity-bound dao
    pub result: Option<QueryResult>,
    pub description: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = query_type;
        self
    }

    pub fn multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn result(mut self, result: QueryResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A dao operation whose characteristics are parameters
#[derive(Debug, Clone)]
pub struct Query {
    name: String,
    dao: DaoId,
    data_module: DataModuleId,
    qualified_name: String,
    query_type: QueryType,
    multiplicity: Multiplicity,
    result: QueryResult,
    description: Option<String>,
    pub(crate) parameters: CharacteristicMap,
    pub(crate) facets: FacetSlots,
}

impl Query {
    pub(crate) fn new(
        name: &str,
        dao: DaoId,
        owner: &Dao,
        result: QueryResult,
        options: &QueryOptions,
        facets: FacetSlots,
    ) -> Self {
        Self {
            name: name.to_string(),
            dao,
            data_module: owner.data_module(),
            qualified_name: format!("{}.{}", owner.qualified_name(), name),
            query_type: options.query_type,
            multiplicity: options.multiplicity,
            result,
            description: options.description.clone(),
            parameters: CharacteristicMap::default(),
            facets,
        }
    }

    pub fn dao(&self) -> DaoId {
        self.dao
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    pub fn result(&self) -> QueryResult {
        self.result
    }

    pub fn result_entity(&self) -> Option<EntityId> {
        match self.result {
            QueryResult::Entity(id) => Some(id),
            _ => None,
        }
    }

    pub fn result_struct(&self) -> Option<StructId> {
        match self.result {
            QueryResult::Struct(id) => Some(id),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Verb derived from query type and multiplicity
    pub fn name_prefix(&self) -> &'static str {
        match (self.query_type, self.multiplicity) {
            (QueryType::Select, Multiplicity::Many) => "findAll",
            (QueryType::Select, Multiplicity::ZeroOrOne) => "find",
            (QueryType::Select, Multiplicity::One) => "get",
            (QueryType::Insert, _) => "insert",
            (QueryType::Update, _) => "update",
            (QueryType::Delete, _) => "delete",
        }
    }

    pub fn base_name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> Vec<&Characteristic> {
        self.characteristics()
    }

    pub fn parameter_by_name(&self, name: &str) -> Result<&Characteristic> {
        self.characteristic_by_name(name)
    }
}

impl CharacteristicContainer for Query {
    fn name(&self) -> &str {
        &self.name
    }

    fn qualified_name(&self) -> String {
        self.qualified_name.clone()
    }

    fn data_module(&self) -> DataModuleId {
        self.data_module
    }

    fn characteristic_kind(&self) -> &'static str {
        "parameter"
    }

    fn characteristic_map(&self) -> &CharacteristicMap {
        &self.parameters
    }

    fn facets(&self) -> &FacetSlots {
        &self.facets
    }
}
