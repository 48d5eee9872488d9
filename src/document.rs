//! Schema documents
//!
//! A declarative description of a repository in TOML or JSON. Building a
//! document goes through the model-building API, so every rule enforced
//! there applies to documents too.
//!
//! ## Example (TOML)
//! ```toml
//! name = "Acme"
//! facets = ["jpa", "graphql"]
//!
//! [[data_modules]]
//! name = "Core"
//!
//! [[data_modules.entities]]
//! name = "Person"
//!
//! [[data_modules.entities.attributes]]
//! name = "id"
//! type = "integer"
//! primary_key = true
//! ```
//!
//! Types are defined parents first, whatever their order in the document.
//! Reference and struct payloads are bound once every type exists, so a
//! characteristic may name a type declared further down.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builtin::appconfig::AppconfigRepository;
use crate::builtin::APPCONFIG;
use crate::error::{ModelError, Result};
use crate::facet::FacetRegistry;
use crate::model::{
    CharacteristicOptions, CharacteristicType, CollectionType, ContainerRef, DataModuleId,
    ElementRef, EnumerationOptions, EnumerationType, InheritableCharacteristicContainer,
    InverseOptions, Length, Multiplicity, QueryOptions, QueryResult, QueryType, Repository,
    TypeOptions,
};

// =============================================================================
// Document types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,

    /// Facets enabled on the whole repository
    #[serde(default)]
    pub facets: Vec<String>,

    #[serde(default)]
    pub data_modules: Vec<DataModuleDocument>,

    /// Requires the `appconfig` facet
    #[serde(default)]
    pub feature_flags: Vec<FeatureFlagDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataModuleDocument {
    pub name: String,
    #[serde(default)]
    pub disabled_facets: Vec<String>,
    #[serde(default)]
    pub enumerations: Vec<EnumerationDocument>,
    #[serde(default)]
    pub structs: Vec<TypeDocument>,
    #[serde(default)]
    pub entities: Vec<TypeDocument>,
    #[serde(default)]
    pub daos: Vec<DaoDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerationDocument {
    pub name: String,
    #[serde(rename = "type", default = "default_enumeration_type")]
    pub enumeration_type: EnumerationType,
    pub values: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_enumeration_type() -> EnumerationType {
    EnumerationType::Text
}

/// An entity or a struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDocument {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(rename = "abstract", default)]
    pub is_abstract: Option<bool>,
    #[serde(rename = "final", default)]
    pub is_final: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disabled_facets: Vec<String>,
    /// Attributes of an entity, fields of a struct
    #[serde(default, alias = "attributes", alias = "fields")]
    pub characteristics: Vec<CharacteristicDocument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicTypeDocument {
    Boolean,
    Text,
    Integer,
    Real,
    Datetime,
    Date,
    Enumeration,
    /// Synthesized integer enumeration over `values`
    IEnum,
    /// Synthesized text enumeration over `values`
    SEnum,
    Reference,
    Struct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxKeyword {
    Max,
}

/// `length = 50` or `length = "max"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthDocument {
    Chars(u32),
    Keyword(MaxKeyword),
}

impl From<LengthDocument> for Length {
    fn from(length: LengthDocument) -> Self {
        match length {
            LengthDocument::Chars(chars) => Length::Chars(chars),
            LengthDocument::Keyword(MaxKeyword::Max) => Length::Max,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InverseDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub multiplicity: Option<Multiplicity>,
    #[serde(default)]
    pub traversable: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacteristicDocument {
    /// Defaults to the last segment of `references` for references
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub characteristic_type: CharacteristicTypeDocument,
    /// Enumeration, entity or struct name for payload-carrying types
    #[serde(default)]
    pub references: Option<String>,
    /// Values of a synthesized enumeration
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub allow_blank: Option<bool>,
    #[serde(default)]
    pub length: Option<LengthDocument>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub collection: Option<CollectionType>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub polymorphic: Option<bool>,
    #[serde(rename = "abstract", default)]
    pub is_abstract: Option<bool>,
    #[serde(rename = "override", default)]
    pub is_override: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inverse: Option<InverseDocument>,
    #[serde(default)]
    pub disabled_facets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaoDocument {
    pub name: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub queries: Vec<QueryDocument>,
}

/// `result = "scalar"` or `result = { entity = "Person" }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResultDocument {
    Entity(String),
    Struct(String),
    Scalar,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDocument {
    pub name: String,
    #[serde(default)]
    pub query_type: QueryType,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default)]
    pub result: Option<QueryResultDocument>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disabled_facets: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<CharacteristicDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlagDocument {
    pub key: String,
    #[serde(default)]
    pub key_value: Option<String>,
    #[serde(default)]
    pub initial_value: Option<bool>,
    #[serde(default)]
    pub disable_in_integration_test: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Loading
// =============================================================================

impl Document {
    /// Parse a document, choosing the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

// =============================================================================
// Building
// =============================================================================

/// A payload bound once every type exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload {
    Entity,
    Struct,
}

type TypeKey = (DataModuleId, String);

#[derive(Default)]
struct Builder {
    /// (declaring container, characteristic name) -> payload to bind
    pending: HashMap<(ContainerRef, String), (Payload, String)>,
    /// Facets to disable once the tree is complete
    disabled: Vec<(ElementRef, String)>,
}

impl Document {
    /// Build a repository from this document. `default_facets` are enabled
    /// when the document names none.
    pub fn build(&self, registry: FacetRegistry, default_facets: &[String]) -> Result<Repository> {
        let mut model = Repository::new(&self.name, registry);
        let facets = if self.facets.is_empty() {
            default_facets
        } else {
            self.facets.as_slice()
        };
        for facet in facets {
            model.enable_facet(ElementRef::Repository, facet)?;
        }

        let mut builder = Builder::default();
        let mut modules = Vec::new();
        for document in &self.data_modules {
            let id = model.define_data_module(&document.name)?;
            builder.disable(id.into(), &document.disabled_facets);
            for enumeration in &document.enumerations {
                model.define_enumeration(
                    id,
                    &enumeration.name,
                    enumeration.enumeration_type,
                    EnumerationOptions {
                        description: enumeration.description.clone(),
                        ..EnumerationOptions::values(enumeration.values.as_slice())
                    },
                )?;
            }
            modules.push((id, document));
        }

        let structs = parents_first(&model, &modules, |d| &d.structs)?;
        for (module, document) in structs {
            let id = model.define_struct(module, &document.name, type_options(document))?;
            builder.disable(id.into(), &document.disabled_facets);
            builder.declare_all(&mut model, ContainerRef::Struct(id), &document.characteristics)?;
        }
        let entities = parents_first(&model, &modules, |d| &d.entities)?;
        for (module, document) in entities {
            let id = model.define_entity(module, &document.name, type_options(document))?;
            builder.disable(id.into(), &document.disabled_facets);
            builder.declare_all(&mut model, ContainerRef::Entity(id), &document.characteristics)?;
        }

        for (module, document) in &modules {
            for dao in &document.daos {
                let entity = match &dao.entity {
                    Some(name) => Some(model.entity_by_name(*module, name)?),
                    None => None,
                };
                let dao_id = model.define_dao(*module, &dao.name, entity)?;
                for query in &dao.queries {
                    let result = match &query.result {
                        Some(QueryResultDocument::Entity(name)) => {
                            Some(QueryResult::Entity(model.entity_by_name(*module, name)?))
                        }
                        Some(QueryResultDocument::Struct(name)) => {
                            Some(QueryResult::Struct(model.struct_by_name(*module, name)?))
                        }
                        Some(QueryResultDocument::Scalar) => Some(QueryResult::Scalar),
                        Some(QueryResultDocument::None) => Some(QueryResult::None),
                        None => None,
                    };
                    let options = QueryOptions {
                        query_type: query.query_type,
                        multiplicity: query.multiplicity,
                        result,
                        description: query.description.clone(),
                    };
                    let id = model.define_query(dao_id, &query.name, options)?;
                    builder.disable(id.into(), &query.disabled_facets);
                    builder.declare_all(&mut model, ContainerRef::Query(id), &query.parameters)?;
                }
            }
        }

        builder.bind_payloads(&mut model)?;
        for (element, facet) in builder.disabled {
            model.disable_facet(element, &facet)?;
        }

        for flag in &self.feature_flags {
            let view = model.view_mut::<AppconfigRepository>(ElementRef::Repository, APPCONFIG)?;
            let entry = view.feature_flag(&flag.key)?;
            entry.key_value = flag.key_value.clone();
            entry.initial_value = flag.initial_value;
            entry.disable_in_integration_test = flag.disable_in_integration_test;
            entry.description = flag.description.clone();
        }

        debug!(repository = %self.name, modules = self.data_modules.len(), "Built model from document");
        Ok(model)
    }
}

fn type_options(document: &TypeDocument) -> TypeOptions {
    TypeOptions {
        is_abstract: document.is_abstract,
        is_final: document.is_final,
        extends: document.extends.clone(),
        description: document.description.clone(),
    }
}

/// Order type documents so that every parent precedes its subtypes.
/// Parents that are not in the document are left for the model to resolve.
fn parents_first<'d, F>(
    model: &Repository,
    modules: &[(DataModuleId, &'d DataModuleDocument)],
    types: F,
) -> Result<Vec<(DataModuleId, &'d TypeDocument)>>
where
    F: Fn(&'d DataModuleDocument) -> &'d Vec<TypeDocument>,
{
    let mut pending: Vec<(DataModuleId, &'d TypeDocument)> = modules
        .iter()
        .flat_map(|&(id, document)| types(document).iter().map(move |t| (id, t)))
        .collect();
    let declared: HashSet<TypeKey> = pending
        .iter()
        .map(|(module, t)| (*module, t.name.clone()))
        .collect();

    let parent_key = |module: DataModuleId, extends: &str| -> Result<TypeKey> {
        let (module, name) = model.split_qualified(module, extends)?;
        Ok((module, name.to_string()))
    };

    let mut ordered = Vec::with_capacity(pending.len());
    let mut placed: HashSet<TypeKey> = HashSet::new();
    while !pending.is_empty() {
        let before = pending.len();
        let mut deferred = Vec::new();
        for (module, document) in pending.drain(..) {
            let ready = match &document.extends {
                None => true,
                Some(extends) => {
                    let key = parent_key(module, extends)?;
                    placed.contains(&key) || !declared.contains(&key)
                }
            };
            if ready {
                placed.insert((module, document.name.clone()));
                ordered.push((module, document));
            } else {
                deferred.push((module, document));
            }
        }
        if deferred.len() == before {
            let (module, document) = deferred[0];
            return Err(ModelError::invalid(
                format!("{}.{}", model.data_module(module).name(), document.name),
                "circular extends chain",
            ));
        }
        pending = deferred;
    }
    Ok(ordered)
}

impl Builder {
    fn disable(&mut self, element: ElementRef, facets: &[String]) {
        for facet in facets {
            self.disabled.push((element, facet.clone()));
        }
    }

    fn declare_all(
        &mut self,
        model: &mut Repository,
        container: ContainerRef,
        characteristics: &[CharacteristicDocument],
    ) -> Result<()> {
        for document in characteristics {
            self.declare(model, container, document)?;
        }
        Ok(())
    }

    fn declare(
        &mut self,
        model: &mut Repository,
        container: ContainerRef,
        document: &CharacteristicDocument,
    ) -> Result<()> {
        let options = characteristic_options(document);
        let owner = model.container(container).qualified_name();
        let target = || {
            document.references.clone().ok_or_else(|| {
                ModelError::invalid(
                    owner.clone(),
                    format!(
                        "{:?} characteristic {} needs `references`",
                        document.characteristic_type,
                        document.name.as_deref().unwrap_or("<unnamed>")
                    ),
                )
            })
        };
        let name = match (&document.name, document.characteristic_type) {
            (Some(name), _) => name.clone(),
            (None, CharacteristicTypeDocument::Reference) => {
                let target = target()?;
                match target.rsplit_once('.') {
                    Some((_, last)) => last.to_string(),
                    None => target,
                }
            }
            (None, _) => {
                return Err(ModelError::invalid(owner.clone(), "characteristic without a name"));
            }
        };

        let mut characteristics = match container {
            ContainerRef::Entity(id) => model.entity_mut(id),
            ContainerRef::Struct(id) => model.struct_mut(id),
            ContainerRef::Query(id) => model.query_mut(id),
        };
        let at = match document.characteristic_type {
            CharacteristicTypeDocument::Boolean => characteristics.boolean(&name, options)?,
            CharacteristicTypeDocument::Text => characteristics.text(&name, options)?,
            CharacteristicTypeDocument::Integer => characteristics.integer(&name, options)?,
            CharacteristicTypeDocument::Real => characteristics.real(&name, options)?,
            CharacteristicTypeDocument::Datetime => characteristics.datetime(&name, options)?,
            CharacteristicTypeDocument::Date => characteristics.date(&name, options)?,
            CharacteristicTypeDocument::Enumeration => {
                characteristics.enumeration(&name, &target()?, options)?
            }
            CharacteristicTypeDocument::IEnum => {
                characteristics.i_enum(&name, document.values.as_slice(), options)?
            }
            CharacteristicTypeDocument::SEnum => {
                characteristics.s_enum(&name, document.values.as_slice(), options)?
            }
            CharacteristicTypeDocument::Reference => {
                let target = target()?;
                let at = characteristics.characteristic(&name, CharacteristicType::Reference(None), options)?;
                self.pending
                    .insert((container, name.clone()), (Payload::Entity, target));
                at
            }
            CharacteristicTypeDocument::Struct => {
                let target = target()?;
                let at = characteristics.characteristic(&name, CharacteristicType::Struct(None), options)?;
                self.pending
                    .insert((container, name.clone()), (Payload::Struct, target));
                at
            }
        };
        self.disable(at.into(), &document.disabled_facets);
        Ok(())
    }

    /// Bind reference and struct payloads on declared and inherited
    /// characteristics. Names resolve against the declaring type's module.
    fn bind_payloads(&self, model: &mut Repository) -> Result<()> {
        let mut containers: Vec<ContainerRef> = Vec::new();
        for module in model.data_modules().collect::<Vec<_>>() {
            let data_module = model.data_module(module);
            containers.extend(data_module.structs().map(ContainerRef::Struct));
            containers.extend(data_module.entities().map(ContainerRef::Entity));
            for dao in data_module.daos() {
                containers.extend(model.dao(dao).queries().map(ContainerRef::Query));
            }
        }

        for container in containers {
            let unbound: Vec<String> = model
                .container(container)
                .characteristics()
                .into_iter()
                .filter(|c| {
                    matches!(
                        c.characteristic_type(),
                        CharacteristicType::Reference(None) | CharacteristicType::Struct(None)
                    )
                })
                .map(|c| c.name().to_string())
                .collect();

            for name in unbound {
                let Some((declaring, payload, target)) = self.declaration(model, container, &name) else {
                    continue;
                };
                let module = model.container(declaring).data_module();
                let at = model.characteristic_ref(container, &name)?;
                match payload {
                    Payload::Entity => {
                        let id = model.entity_by_name(module, target)?;
                        model.characteristic_mut(at).set_referenced_entity(id)?;
                    }
                    Payload::Struct => {
                        let id = model.struct_by_name(module, target)?;
                        model.characteristic_mut(at).set_referenced_struct(id)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// The type that declared `name`, walking up from `container`
    fn declaration<'b>(
        &'b self,
        model: &Repository,
        container: ContainerRef,
        name: &str,
    ) -> Option<(ContainerRef, Payload, &'b str)> {
        let mut current = Some(container);
        while let Some(at) = current {
            if let Some((payload, target)) = self.pending.get(&(at, name.to_string())) {
                return Some((at, *payload, target.as_str()));
            }
            current = match at {
                ContainerRef::Entity(id) => model.entity(id).extends().map(ContainerRef::Entity),
                ContainerRef::Struct(id) => model.struct_type(id).extends().map(ContainerRef::Struct),
                ContainerRef::Query(_) => None,
            };
        }
        None
    }
}

fn characteristic_options(document: &CharacteristicDocument) -> CharacteristicOptions {
    let inverse = document.inverse.clone().unwrap_or_default();
    CharacteristicOptions {
        name: document.name.clone(),
        nullable: document.nullable,
        allow_blank: document.allow_blank,
        length: document.length.map(Length::from),
        min_length: document.min_length,
        collection_type: document.collection,
        primary_key: document.primary_key,
        polymorphic: document.polymorphic,
        is_abstract: document.is_abstract,
        is_override: document.is_override,
        description: document.description.clone(),
        inverse: InverseOptions {
            name: inverse.name,
            multiplicity: inverse.multiplicity,
            traversable: inverse.traversable,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_registry;

    const SCHEMA: &str = r#"
name = "Acme"
facets = ["jpa"]

[[data_modules]]
name = "Core"

[[data_modules.entities]]
name = "Employee"
extends = "Person"

[[data_modules.entities.attributes]]
name = "salary"
type = "integer"

[[data_modules.entities]]
name = "Person"
abstract = true

[[data_modules.entities.attributes]]
name = "id"
type = "integer"
primary_key = true

[[data_modules.entities.attributes]]
name = "manager"
type = "reference"
references = "Employee"
nullable = true
"#;

    #[test]
    fn test_parents_defined_first() {
        let document = Document::from_toml_str(SCHEMA).unwrap();
        let model = document.build(builtin_registry().unwrap(), &[]).unwrap();
        let module = model.data_module_by_name("Core").unwrap();
        let employee = model.entity(model.entity_by_name(module, "Employee").unwrap());

        let declared: Vec<&str> = employee.declared_characteristics().iter().map(|c| c.name()).collect();
        let inherited: Vec<&str> = employee.inherited_characteristics().iter().map(|c| c.name()).collect();
        assert_eq!(declared, vec!["salary"]);
        assert_eq!(inherited, vec!["id", "manager"]);
    }

    #[test]
    fn test_forward_reference_bound_on_subtypes() {
        let document = Document::from_toml_str(SCHEMA).unwrap();
        let model = document.build(builtin_registry().unwrap(), &[]).unwrap();
        let module = model.data_module_by_name("Core").unwrap();
        let employee_id = model.entity_by_name(module, "Employee").unwrap();
        let employee = model.entity(employee_id);
        let manager = employee.attribute_by_name("manager").unwrap();
        assert_eq!(manager.referenced_entity().unwrap(), employee_id);
    }

    #[test]
    fn test_default_facets_apply_when_none_named() {
        let document = Document::from_json_str(r#"{ "name": "Acme" }"#).unwrap();
        let model = document
            .build(builtin_registry().unwrap(), &["graphql".to_string()])
            .unwrap();
        assert!(model.facet_enabled(ElementRef::Repository, "graphql"));
        assert!(!model.facet_enabled(ElementRef::Repository, "jpa"));
    }

    #[test]
    fn test_circular_extends() {
        let document = Document::from_toml_str(
            r#"
name = "Acme"

[[data_modules]]
name = "Core"

[[data_modules.structs]]
name = "A"
extends = "B"
final = false

[[data_modules.structs]]
name = "B"
extends = "A"
final = false
"#,
        )
        .unwrap();
        let err = document.build(builtin_registry().unwrap(), &[]).unwrap_err();
        assert!(err.to_string().contains("circular extends chain"));
    }

    #[test]
    fn test_length_keyword() {
        let document = Document::from_json_str(
            r#"{
                "name": "Acme",
                "data_modules": [{
                    "name": "Core",
                    "structs": [{
                        "name": "Note",
                        "fields": [{ "name": "body", "type": "text", "length": "max" }]
                    }]
                }]
            }"#,
        )
        .unwrap();
        let model = document.build(builtin_registry().unwrap(), &[]).unwrap();
        let module = model.data_module_by_name("Core").unwrap();
        let note = model.struct_type(model.struct_by_name(module, "Note").unwrap());
        let body = note.field_by_name("body").unwrap();
        assert_eq!(body.length(), Some(Length::Max));
        assert!(!body.has_non_max_length());
    }

    #[test]
    fn test_feature_flags_need_appconfig() {
        let document = Document::from_toml_str(
            r#"
name = "Acme"

[[feature_flags]]
key = "NewUi"
"#,
        )
        .unwrap();
        let err = document.build(builtin_registry().unwrap(), &[]).unwrap_err();
        assert!(matches!(err, ModelError::FacetNotEnabled { .. }));
    }
}
