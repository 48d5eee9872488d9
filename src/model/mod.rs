//! Domain Model
//!
//! The model is an arena owned by [`Repository`]: data modules, entities,
//! structs, enumerations, daos and queries live in flat vectors and refer to
//! each other through copyable handles (`EntityId`, `StructId`, ...).
//! Characteristics are owned by their container and addressed with a
//! [`CharacteristicRef`] (container + insertion index).
//!
//! Lifecycle:
//! - construction: `define_*` calls plus the typed constructors on
//!   [`ContainerMut`]
//! - completion: [`Repository::complete`] runs the facet hooks once
//! - rendering: the completed model is only read

pub mod characteristic;
pub mod complete;
pub mod container;
pub mod elements;
pub mod inheritance;
pub mod tree;

pub use characteristic::{
    Characteristic, CharacteristicMut, CharacteristicOptions, CharacteristicType, CollectionType,
    InverseOptions, Length, LengthBound,
};
pub use container::{CharacteristicContainer, CharacteristicMap, ContainerMut};
pub use elements::{
    DataModule, Dao, Entity, Enumeration, EnumerationOptions, EnumerationType, EnumerationValue,
    InverseElement, Multiplicity, Query, QueryOptions, QueryResult, QueryType, Struct, TypeOptions,
};
pub use inheritance::{Inheritance, InheritableCharacteristicContainer};

use std::fmt;

use indexmap::IndexMap;

use crate::error::{ModelError, Result};
use crate::facet::{FacetRegistry, FacetSlots};

// =============================================================================
// Handles
// =============================================================================

macro_rules! element_id {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub(crate) usize);
        )*
    };
}

element_id! {
    /// Handle to a data module (a "schema" in rendering terms)
    DataModuleId,
    /// Handle to an entity (an "object type" in rendering terms)
    EntityId,
    /// Handle to a struct
    StructId,
    /// Handle to an enumeration
    EnumerationId,
    /// Handle to a dao
    DaoId,
    /// Handle to a query
    QueryId,
}

/// A characteristic container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    Entity(EntityId),
    Struct(StructId),
    Query(QueryId),
}

impl ContainerRef {
    /// Noun used for this container's characteristics in messages
    pub fn characteristic_kind(&self) -> &'static str {
        match self {
            ContainerRef::Entity(_) => "attribute",
            ContainerRef::Struct(_) => "field",
            ContainerRef::Query(_) => "parameter",
        }
    }

    /// Element kind of the characteristics held by this container
    pub fn characteristic_element_kind(&self) -> ElementKind {
        match self {
            ContainerRef::Entity(_) => ElementKind::Attribute,
            ContainerRef::Struct(_) => ElementKind::StructField,
            ContainerRef::Query(_) => ElementKind::QueryParameter,
        }
    }

    /// Whether declarations on this container may override inherited ones
    pub fn is_inheritable(&self) -> bool {
        matches!(self, ContainerRef::Entity(_) | ContainerRef::Struct(_))
    }
}

impl From<EntityId> for ContainerRef {
    fn from(id: EntityId) -> Self {
        ContainerRef::Entity(id)
    }
}

impl From<StructId> for ContainerRef {
    fn from(id: StructId) -> Self {
        ContainerRef::Struct(id)
    }
}

impl From<QueryId> for ContainerRef {
    fn from(id: QueryId) -> Self {
        ContainerRef::Query(id)
    }
}

/// A characteristic, addressed by its container and insertion index.
///
/// Indexes are stable: overriding an inherited characteristic replaces it in
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacteristicRef {
    pub container: ContainerRef,
    pub(crate) index: usize,
}

// =============================================================================
// Elements
// =============================================================================

/// Kind of a model element, as seen by the facet registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Repository,
    DataModule,
    Enumeration,
    EnumerationValue,
    Entity,
    Attribute,
    InverseElement,
    Struct,
    StructField,
    Dao,
    Query,
    QueryParameter,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Repository => "Repository",
            Self::DataModule => "DataModule",
            Self::Enumeration => "Enumeration",
            Self::EnumerationValue => "EnumerationValue",
            Self::Entity => "Entity",
            Self::Attribute => "Attribute",
            Self::InverseElement => "InverseElement",
            Self::Struct => "Struct",
            Self::StructField => "StructField",
            Self::Dao => "Dao",
            Self::Query => "Query",
            Self::QueryParameter => "QueryParameter",
        };
        write!(f, "{}", name)
    }
}

/// Any element that can carry facet views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Repository,
    DataModule(DataModuleId),
    Enumeration(EnumerationId),
    EnumerationValue(EnumerationId, usize),
    Entity(EntityId),
    Struct(StructId),
    Dao(DaoId),
    Query(QueryId),
    /// Attribute, struct field or query parameter, depending on the container
    Characteristic(CharacteristicRef),
    /// The inverse side of a reference attribute
    Inverse(CharacteristicRef),
}

impl ElementRef {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Repository => ElementKind::Repository,
            ElementRef::DataModule(_) => ElementKind::DataModule,
            ElementRef::Enumeration(_) => ElementKind::Enumeration,
            ElementRef::EnumerationValue(..) => ElementKind::EnumerationValue,
            ElementRef::Entity(_) => ElementKind::Entity,
            ElementRef::Struct(_) => ElementKind::Struct,
            ElementRef::Dao(_) => ElementKind::Dao,
            ElementRef::Query(_) => ElementKind::Query,
            ElementRef::Characteristic(at) => at.container.characteristic_element_kind(),
            ElementRef::Inverse(_) => ElementKind::InverseElement,
        }
    }
}

impl From<DataModuleId> for ElementRef {
    fn from(id: DataModuleId) -> Self {
        ElementRef::DataModule(id)
    }
}

impl From<EntityId> for ElementRef {
    fn from(id: EntityId) -> Self {
        ElementRef::Entity(id)
    }
}

impl From<StructId> for ElementRef {
    fn from(id: StructId) -> Self {
        ElementRef::Struct(id)
    }
}

impl From<EnumerationId> for ElementRef {
    fn from(id: EnumerationId) -> Self {
        ElementRef::Enumeration(id)
    }
}

impl From<DaoId> for ElementRef {
    fn from(id: DaoId) -> Self {
        ElementRef::Dao(id)
    }
}

impl From<QueryId> for ElementRef {
    fn from(id: QueryId) -> Self {
        ElementRef::Query(id)
    }
}

impl From<ContainerRef> for ElementRef {
    fn from(container: ContainerRef) -> Self {
        match container {
            ContainerRef::Entity(id) => ElementRef::Entity(id),
            ContainerRef::Struct(id) => ElementRef::Struct(id),
            ContainerRef::Query(id) => ElementRef::Query(id),
        }
    }
}

impl From<CharacteristicRef> for ElementRef {
    fn from(at: CharacteristicRef) -> Self {
        ElementRef::Characteristic(at)
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Root of the model and owner of every element.
#[derive(Debug, Clone)]
pub struct Repository {
    name: String,
    pub(crate) registry: FacetRegistry,
    pub(crate) facets: FacetSlots,
    pub(crate) data_modules: Vec<DataModule>,
    data_module_names: IndexMap<String, DataModuleId>,
    pub(crate) entities: Vec<Entity>,
    pub(crate) structs: Vec<Struct>,
    pub(crate) enumerations: Vec<Enumeration>,
    pub(crate) daos: Vec<Dao>,
    pub(crate) queries: Vec<Query>,
    pub(crate) completed: bool,
}

impl Repository {
    /// Create an empty repository whose elements may carry the facets of
    /// `registry`. No facet is enabled yet.
    pub fn new(name: impl Into<String>, registry: FacetRegistry) -> Self {
        let facets = registry.slots_for(ElementKind::Repository, None);
        Self {
            name: name.into(),
            registry,
            facets,
            data_modules: Vec::new(),
            data_module_names: IndexMap::new(),
            entities: Vec::new(),
            structs: Vec::new(),
            enumerations: Vec::new(),
            daos: Vec::new(),
            queries: Vec::new(),
            completed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &FacetRegistry {
        &self.registry
    }

    /// Has the completion pass run?
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.completed {
            return Err(ModelError::AlreadyCompleted(self.name.clone()));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Define a data module
    pub fn define_data_module(&mut self, name: &str) -> Result<DataModuleId> {
        self.ensure_open()?;
        if self.data_module_names.contains_key(name) {
            return Err(ModelError::Duplicate {
                kind: "data module",
                name: name.to_string(),
                scope: self.name.clone(),
            });
        }
        let id = DataModuleId(self.data_modules.len());
        let facets = self.registry.slots_for(ElementKind::DataModule, Some(&self.facets));
        self.data_modules.push(DataModule::new(name, facets));
        self.data_module_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Define an entity; `options.extends` performs the extension immediately,
    /// before any attribute of the new entity is declared.
    pub fn define_entity(
        &mut self,
        data_module: DataModuleId,
        name: &str,
        options: TypeOptions,
    ) -> Result<EntityId> {
        self.ensure_open()?;
        let module = &self.data_modules[data_module.0];
        if module.entities.contains_key(name) {
            return Err(ModelError::Duplicate {
                kind: "entity",
                name: name.to_string(),
                scope: module.name().to_string(),
            });
        }
        let parent = match &options.extends {
            Some(extends) => Some(self.entity_by_name(data_module, extends)?),
            None => None,
        };
        if let Some(parent) = parent {
            let parent = self.entity(parent);
            if parent.is_final() {
                return Err(ModelError::ExtendFinal {
                    kind: "entity",
                    name: format!("{}.{}", module.name(), name),
                    parent: parent.qualified_name(),
                });
            }
        }

        let id = EntityId(self.entities.len());
        let module = &self.data_modules[data_module.0];
        let facets = self.registry.slots_for(ElementKind::Entity, Some(&module.facets));
        let entity = Entity::new(name, data_module, module.name(), &options, facets);
        self.entities.push(entity);
        self.data_modules[data_module.0]
            .entities
            .insert(name.to_string(), id);

        if let Some(parent) = parent {
            self.perform_extend(ContainerRef::Entity(id), ContainerRef::Entity(parent))?;
        }
        Ok(id)
    }

    /// Define a struct; `options.extends` behaves as for entities.
    pub fn define_struct(
        &mut self,
        data_module: DataModuleId,
        name: &str,
        options: TypeOptions,
    ) -> Result<StructId> {
        self.ensure_open()?;
        let module = &self.data_modules[data_module.0];
        if module.structs.contains_key(name) {
            return Err(ModelError::Duplicate {
                kind: "struct",
                name: name.to_string(),
                scope: module.name().to_string(),
            });
        }
        let parent = match &options.extends {
            Some(extends) => Some(self.struct_by_name(data_module, extends)?),
            None => None,
        };
        if let Some(parent) = parent {
            let parent = self.struct_type(parent);
            if parent.is_final() {
                return Err(ModelError::ExtendFinal {
                    kind: "struct",
                    name: format!("{}.{}", module.name(), name),
                    parent: parent.qualified_name(),
                });
            }
        }

        let id = StructId(self.structs.len());
        let module = &self.data_modules[data_module.0];
        let facets = self.registry.slots_for(ElementKind::Struct, Some(&module.facets));
        let definition = Struct::new(name, data_module, module.name(), &options, facets);
        self.structs.push(definition);
        self.data_modules[data_module.0]
            .structs
            .insert(name.to_string(), id);

        if let Some(parent) = parent {
            self.perform_extend(ContainerRef::Struct(id), ContainerRef::Struct(parent))?;
        }
        Ok(id)
    }

    /// Define an enumeration with its values
    pub fn define_enumeration(
        &mut self,
        data_module: DataModuleId,
        name: &str,
        enumeration_type: EnumerationType,
        options: EnumerationOptions,
    ) -> Result<EnumerationId> {
        self.ensure_open()?;
        let module = &self.data_modules[data_module.0];
        if module.enumerations.contains_key(name) {
            return Err(ModelError::Duplicate {
                kind: "enumeration",
                name: name.to_string(),
                scope: module.name().to_string(),
            });
        }

        let qualified_name = format!("{}.{}", module.name(), name);
        let facets = self
            .registry
            .slots_for(ElementKind::Enumeration, Some(&module.facets));
        let mut enumeration = Enumeration::new(
            name,
            data_module,
            qualified_name,
            enumeration_type,
            &options,
            facets,
        );
        for value in &options.values {
            let facets = self
                .registry
                .slots_for(ElementKind::EnumerationValue, Some(&enumeration.facets));
            enumeration.push_value(value, facets)?;
        }

        let id = EnumerationId(self.enumerations.len());
        self.enumerations.push(enumeration);
        self.data_modules[data_module.0]
            .enumerations
            .insert(name.to_string(), id);
        Ok(id)
    }

    /// Drop the most recently defined enumeration. Only valid while nothing
    /// refers to it yet.
    pub(crate) fn discard_last_enumeration(&mut self, id: EnumerationId) {
        if id.0 + 1 != self.enumerations.len() {
            return;
        }
        if let Some(enumeration) = self.enumerations.pop() {
            let module = enumeration.data_module();
            self.data_modules[module.0].enumerations.shift_remove(enumeration.name());
        }
    }

    /// Define a dao, optionally bound to the entity it serves
    pub fn define_dao(
        &mut self,
        data_module: DataModuleId,
        name: &str,
        entity: Option<EntityId>,
    ) -> Result<DaoId> {
        self.ensure_open()?;
        let module = &self.data_modules[data_module.0];
        if module.daos.contains_key(name) {
            return Err(ModelError::Duplicate {
                kind: "dao",
                name: name.to_string(),
                scope: module.name().to_string(),
            });
        }
        let id = DaoId(self.daos.len());
        let facets = self.registry.slots_for(ElementKind::Dao, Some(&module.facets));
        self.daos
            .push(Dao::new(name, data_module, module.name(), entity, facets));
        self.data_modules[data_module.0]
            .daos
            .insert(name.to_string(), id);
        Ok(id)
    }

    /// Define a query on a dao
    pub fn define_query(&mut self, dao: DaoId, name: &str, options: QueryOptions) -> Result<QueryId> {
        self.ensure_open()?;
        let owner = &self.daos[dao.0];
        if owner.queries.contains_key(name) {
            return Err(ModelError::Duplicate {
                kind: "query",
                name: name.to_string(),
                scope: owner.qualified_name().to_string(),
            });
        }
        let result = match options.result {
            Some(result) => result,
            None => match (options.query_type, owner.entity()) {
                (QueryType::Select, Some(entity)) => QueryResult::Entity(entity),
                _ => QueryResult::None,
            },
        };
        let id = QueryId(self.queries.len());
        let facets = self.registry.slots_for(ElementKind::Query, Some(&owner.facets));
        let query = Query::new(name, dao, owner, result, &options, facets);
        self.queries.push(query);
        self.daos[dao.0].queries.insert(name.to_string(), id);
        Ok(id)
    }

    /// Typed constructors for an entity's attributes
    pub fn entity_mut(&mut self, id: EntityId) -> ContainerMut<'_> {
        ContainerMut::new(self, ContainerRef::Entity(id))
    }

    /// Typed constructors for a struct's fields
    pub fn struct_mut(&mut self, id: StructId) -> ContainerMut<'_> {
        ContainerMut::new(self, ContainerRef::Struct(id))
    }

    /// Typed constructors for a query's parameters
    pub fn query_mut(&mut self, id: QueryId) -> ContainerMut<'_> {
        ContainerMut::new(self, ContainerRef::Query(id))
    }

    /// Validated setters for one characteristic
    pub fn characteristic_mut(&mut self, at: CharacteristicRef) -> CharacteristicMut<'_> {
        CharacteristicMut::new(self, at)
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    pub fn data_module(&self, id: DataModuleId) -> &DataModule {
        &self.data_modules[id.0]
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn struct_type(&self, id: StructId) -> &Struct {
        &self.structs[id.0]
    }

    pub fn enumeration(&self, id: EnumerationId) -> &Enumeration {
        &self.enumerations[id.0]
    }

    pub fn dao(&self, id: DaoId) -> &Dao {
        &self.daos[id.0]
    }

    pub fn query(&self, id: QueryId) -> &Query {
        &self.queries[id.0]
    }

    /// Data modules in definition order
    pub fn data_modules(&self) -> impl Iterator<Item = DataModuleId> + '_ {
        self.data_module_names.values().copied()
    }

    pub fn data_module_by_name(&self, name: &str) -> Result<DataModuleId> {
        self.data_module_names.get(name).copied().ok_or_else(|| {
            let available: Vec<&str> = self.data_module_names.keys().map(String::as_str).collect();
            ModelError::not_found("data module", name, &self.name, &available)
        })
    }

    /// Resolve an entity name relative to `data_module`; a dotted name
    /// (`Module.Entity`) resolves through the repository.
    pub fn entity_by_name(&self, data_module: DataModuleId, name: &str) -> Result<EntityId> {
        let (module, local) = self.split_qualified(data_module, name)?;
        let module = &self.data_modules[module.0];
        module.entities.get(local).copied().ok_or_else(|| {
            let available: Vec<&str> = module.entities.keys().map(String::as_str).collect();
            ModelError::not_found("entity", local, module.name(), &available)
        })
    }

    pub fn struct_by_name(&self, data_module: DataModuleId, name: &str) -> Result<StructId> {
        let (module, local) = self.split_qualified(data_module, name)?;
        let module = &self.data_modules[module.0];
        module.structs.get(local).copied().ok_or_else(|| {
            let available: Vec<&str> = module.structs.keys().map(String::as_str).collect();
            ModelError::not_found("struct", local, module.name(), &available)
        })
    }

    pub fn enumeration_by_name(&self, data_module: DataModuleId, name: &str) -> Result<EnumerationId> {
        let (module, local) = self.split_qualified(data_module, name)?;
        let module = &self.data_modules[module.0];
        module.enumerations.get(local).copied().ok_or_else(|| {
            let available: Vec<&str> = module.enumerations.keys().map(String::as_str).collect();
            ModelError::not_found("enumeration", local, module.name(), &available)
        })
    }

    pub fn dao_by_name(&self, data_module: DataModuleId, name: &str) -> Result<DaoId> {
        let (module, local) = self.split_qualified(data_module, name)?;
        let module = &self.data_modules[module.0];
        module.daos.get(local).copied().ok_or_else(|| {
            let available: Vec<&str> = module.daos.keys().map(String::as_str).collect();
            ModelError::not_found("dao", local, module.name(), &available)
        })
    }

    /// Split `Module.Type` on its last dot; a bare name stays in `data_module`
    pub(crate) fn split_qualified<'n>(
        &self,
        data_module: DataModuleId,
        name: &'n str,
    ) -> Result<(DataModuleId, &'n str)> {
        match name.rsplit_once('.') {
            Some((module, local)) => Ok((self.data_module_by_name(module)?, local)),
            None => Ok((data_module, name)),
        }
    }

    /// The container behind a handle
    pub fn container(&self, container: ContainerRef) -> &dyn CharacteristicContainer {
        match container {
            ContainerRef::Entity(id) => &self.entities[id.0],
            ContainerRef::Struct(id) => &self.structs[id.0],
            ContainerRef::Query(id) => &self.queries[id.0],
        }
    }

    pub(crate) fn characteristic_map_mut(&mut self, container: ContainerRef) -> &mut CharacteristicMap {
        match container {
            ContainerRef::Entity(id) => &mut self.entities[id.0].attributes,
            ContainerRef::Struct(id) => &mut self.structs[id.0].fields,
            ContainerRef::Query(id) => &mut self.queries[id.0].parameters,
        }
    }

    /// Resolve a characteristic handle
    pub fn characteristic(&self, at: CharacteristicRef) -> Result<&Characteristic> {
        let container = self.container(at.container);
        container
            .characteristic_map()
            .get_index(at.index)
            .ok_or_else(|| {
                ModelError::invalid(
                    container.qualified_name(),
                    format!("no {} at index {}", container.characteristic_kind(), at.index),
                )
            })
    }

    pub(crate) fn characteristic_entry_mut(&mut self, at: CharacteristicRef) -> Result<&mut Characteristic> {
        let scope = self.container(at.container).qualified_name();
        self.characteristic_map_mut(at.container)
            .get_index_mut(at.index)
            .ok_or_else(|| ModelError::invalid(scope, format!("no characteristic at index {}", at.index)))
    }

    /// Handle of a named characteristic on a container
    pub fn characteristic_ref(&self, container: ContainerRef, name: &str) -> Result<CharacteristicRef> {
        let owner = self.container(container);
        owner.characteristic_by_name(name)?;
        let index = owner
            .characteristic_map()
            .index_of(name)
            .ok_or_else(|| ModelError::invalid(owner.qualified_name(), format!("no {}", name)))?;
        Ok(CharacteristicRef { container, index })
    }
}
