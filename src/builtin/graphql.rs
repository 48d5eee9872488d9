//! `graphql` facet: API exposure
//!
//! Type names carry the data module prefix (empty for the module named after
//! the repository). Attributes and parameters register their scalar types on
//! the repository view during completion.

use super::jpa::{JpaDao, TransactionType};
use super::{
    characteristic_of, data_module_of, entity_of, enumeration_of, inverse_of, query_of, struct_of,
    GRAPHQL, JPA,
};
use crate::error::{ModelError, Result};
use crate::facet::{Facet, FacetView};
use crate::model::{
    Characteristic, CharacteristicContainer, CharacteristicType, DataModuleId, ElementKind,
    ElementRef, EntityId, EnumerationId, Multiplicity, QueryType, Repository, StructId,
};
use crate::naming;

pub fn facet() -> Facet {
    Facet::new(GRAPHQL)
        .enhance::<GraphqlRepository>(ElementKind::Repository)
        .enhance::<GraphqlDataModule>(ElementKind::DataModule)
        .enhance::<GraphqlEnumeration>(ElementKind::Enumeration)
        .enhance::<GraphqlEnumerationValue>(ElementKind::EnumerationValue)
        .enhance::<GraphqlEntity>(ElementKind::Entity)
        .enhance::<GraphqlAttribute>(ElementKind::Attribute)
        .enhance::<GraphqlInverse>(ElementKind::InverseElement)
        .enhance::<GraphqlStruct>(ElementKind::Struct)
        .enhance::<GraphqlStructField>(ElementKind::StructField)
        .enhance::<GraphqlQuery>(ElementKind::Query)
        .enhance::<GraphqlQueryParameter>(ElementKind::QueryParameter)
}

/// Scalars every GraphQL runtime understands
pub const STANDARD_SCALARS: &[&str] = &[
    "Byte", "Short", "Int", "Long", "BigInteger", "Float", "BigDecimal", "String", "Boolean", "ID",
    "Char",
];

// =============================================================================
// Repository and data module
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct GraphqlRepository {
    pub query_description: Option<String>,
    pub mutation_description: Option<String>,
    pub subscription_description: Option<String>,
    pub graphqls_schema_url: Option<String>,
    pub api_endpoint: Option<String>,
    pub graphiql: Option<bool>,
    pub graphiql_api_endpoint: Option<String>,
    pub graphiql_endpoint: Option<String>,
    pub graphql_schema_name: Option<String>,
    scalars: Vec<String>,
}

impl GraphqlRepository {
    pub fn graphqls_schema_url(&self, model: &Repository) -> String {
        self.graphqls_schema_url
            .clone()
            .unwrap_or_else(|| format!("/graphiql/{}.graphqls", naming::underscore(model.name())))
    }

    pub fn api_endpoint(&self) -> &str {
        self.api_endpoint.as_deref().unwrap_or("/api/graphql")
    }

    pub fn graphiql(&self) -> bool {
        self.graphiql.unwrap_or(true)
    }

    pub fn graphiql_api_endpoint(&self) -> &str {
        self.graphiql_api_endpoint.as_deref().unwrap_or("/graphql")
    }

    pub fn graphiql_endpoint(&self) -> &str {
        self.graphiql_endpoint.as_deref().unwrap_or("/graphiql")
    }

    pub fn graphql_schema_name(&self, model: &Repository) -> String {
        self.graphql_schema_name
            .clone()
            .unwrap_or_else(|| model.name().to_string())
    }

    /// Scalars used anywhere in the schema, in first-use order
    pub fn scalars(&self) -> &[String] {
        &self.scalars
    }

    pub fn scalar(&mut self, scalar: &str) {
        if !self.scalars.iter().any(|s| s == scalar) {
            self.scalars.push(scalar.to_string());
        }
    }

    pub fn non_standard_scalars(&self) -> Vec<&str> {
        self.scalars
            .iter()
            .map(String::as_str)
            .filter(|s| !STANDARD_SCALARS.contains(s))
            .collect()
    }
}

impl FacetView for GraphqlRepository {
    fn template_variables(&self, model: &Repository, _element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(vec![("schema_name".to_string(), self.graphql_schema_name(model))])
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphqlDataModule {
    pub prefix: Option<String>,
}

impl GraphqlDataModule {
    pub fn prefix(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.prefix {
            Some(prefix) => Ok(prefix.clone()),
            None => Ok(default_prefix(model, data_module_of(model, element)?)),
        }
    }
}

impl FacetView for GraphqlDataModule {
    fn template_variables(&self, model: &Repository, element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(vec![("prefix".to_string(), self.prefix(model, element)?)])
    }
}

fn default_prefix(model: &Repository, data_module: DataModuleId) -> String {
    let name = model.data_module(data_module).name();
    if name == model.name() {
        String::new()
    } else {
        name.to_string()
    }
}

/// Prefix for types in `data_module`, honouring an explicit view setting
fn prefix(model: &Repository, data_module: DataModuleId) -> Result<String> {
    let element = ElementRef::DataModule(data_module);
    if model.facet_enabled(element, GRAPHQL) {
        model.view::<GraphqlDataModule>(element, GRAPHQL)?.prefix(model, element)
    } else {
        Ok(default_prefix(model, data_module))
    }
}

pub(crate) fn entity_name(model: &Repository, entity: EntityId) -> Result<String> {
    let element = ElementRef::Entity(entity);
    if model.facet_enabled(element, GRAPHQL) {
        return model.view::<GraphqlEntity>(element, GRAPHQL)?.name(model, element);
    }
    let entity = model.entity(entity);
    Ok(format!("{}{}", prefix(model, entity.data_module())?, entity.name()))
}

pub(crate) fn struct_name(model: &Repository, definition: StructId) -> Result<String> {
    let element = ElementRef::Struct(definition);
    if model.facet_enabled(element, GRAPHQL) {
        return model.view::<GraphqlStruct>(element, GRAPHQL)?.name(model, element);
    }
    let definition = model.struct_type(definition);
    Ok(format!("{}{}", prefix(model, definition.data_module())?, definition.name()))
}

pub(crate) fn enumeration_name(model: &Repository, enumeration: EnumerationId) -> Result<String> {
    let element = ElementRef::Enumeration(enumeration);
    if model.facet_enabled(element, GRAPHQL) {
        return model
            .view::<GraphqlEnumeration>(element, GRAPHQL)?
            .name(model, element);
    }
    let enumeration = model.enumeration(enumeration);
    Ok(format!("{}{}", prefix(model, enumeration.data_module())?, enumeration.name()))
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct GraphqlEnumeration {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl GraphqlEnumeration {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let enumeration = model.enumeration(enumeration_of(model, element)?);
        Ok(format!("{}{}", prefix(model, enumeration.data_module())?, enumeration.name()))
    }

    pub fn description(&self, model: &Repository, element: ElementRef) -> Result<Option<String>> {
        if self.description.is_some() {
            return Ok(self.description.clone());
        }
        let enumeration = model.enumeration(enumeration_of(model, element)?);
        Ok(enumeration.description().map(str::to_string))
    }
}

impl FacetView for GraphqlEnumeration {}

#[derive(Debug, Clone, Default)]
pub struct GraphqlEnumerationValue {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl GraphqlEnumerationValue {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        match element {
            ElementRef::EnumerationValue(id, index) => {
                let enumeration = model.enumeration(id);
                let value = model.enumeration_value(id, index)?;
                Ok(format!("{}{}", prefix(model, enumeration.data_module())?, value.name()))
            }
            _ => Err(ModelError::invalid(
                model.qualified_name(element)?,
                "expected enumeration value element",
            )),
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

impl FacetView for GraphqlEnumerationValue {}

#[derive(Debug, Clone, Default)]
pub struct GraphqlEntity {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl GraphqlEntity {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let entity = model.entity(entity_of(model, element)?);
        Ok(format!("{}{}", prefix(model, entity.data_module())?, entity.name()))
    }

    pub fn description(&self, model: &Repository, element: ElementRef) -> Result<Option<String>> {
        if self.description.is_some() {
            return Ok(self.description.clone());
        }
        let entity = model.entity(entity_of(model, element)?);
        Ok(entity.description().map(str::to_string))
    }
}

impl FacetView for GraphqlEntity {}

#[derive(Debug, Clone, Default)]
pub struct GraphqlStruct {
    pub name: Option<String>,
}

impl GraphqlStruct {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let definition = model.struct_type(struct_of(model, element)?);
        Ok(format!("{}{}", prefix(model, definition.data_module())?, definition.name()))
    }
}

impl FacetView for GraphqlStruct {}

// =============================================================================
// Characteristics
// =============================================================================

fn default_scalar(characteristic_type: CharacteristicType) -> Option<&'static str> {
    match characteristic_type {
        CharacteristicType::Text => Some("String"),
        CharacteristicType::Integer => Some("Int"),
        CharacteristicType::Real => Some("Float"),
        CharacteristicType::Date => Some("Date"),
        CharacteristicType::DateTime => Some("DateTime"),
        CharacteristicType::Boolean => Some("Boolean"),
        _ => None,
    }
}

fn scalar_type(explicit: &Option<String>, characteristic: &Characteristic) -> Result<String> {
    if let Some(scalar) = explicit {
        return Ok(scalar.clone());
    }
    if characteristic.primary_key() {
        return Ok("ID".to_string());
    }
    default_scalar(characteristic.characteristic_type())
        .map(str::to_string)
        .ok_or_else(|| ModelError::TypeMismatch {
            element: characteristic.qualified_name(),
            property: "graphql.scalar_type",
            reason: format!(
                "{} is a {}",
                characteristic.characteristic_kind(),
                characteristic.characteristic_type().key()
            ),
        })
}

/// GraphQL type of a characteristic: the named type for references,
/// enumerations and structs, the scalar otherwise
fn type_name(model: &Repository, explicit: &Option<String>, characteristic: &Characteristic) -> Result<String> {
    match characteristic.characteristic_type() {
        CharacteristicType::Reference(_) => entity_name(model, characteristic.referenced_entity()?),
        CharacteristicType::Enumeration(_) => enumeration_name(model, characteristic.enumeration()?),
        CharacteristicType::Struct(_) => struct_name(model, characteristic.referenced_struct()?),
        _ => scalar_type(explicit, characteristic),
    }
}

/// Record the characteristic's scalar on the repository view
fn save_scalar_type(model: &mut Repository, explicit: &Option<String>, element: ElementRef) -> Result<()> {
    let scalar = match explicit {
        Some(scalar) => Some(scalar.clone()),
        None => default_scalar(characteristic_of(model, element)?.characteristic_type()).map(str::to_string),
    };
    if let Some(scalar) = scalar {
        if model.facet_enabled(ElementRef::Repository, GRAPHQL) {
            model
                .view_mut::<GraphqlRepository>(ElementRef::Repository, GRAPHQL)?
                .scalar(&scalar);
        }
    }
    Ok(())
}

fn upper_or_camel(name: &str) -> String {
    if name.to_uppercase() == name {
        name.to_string()
    } else {
        naming::camelize(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphqlAttribute {
    pub name: Option<String>,
    pub description: Option<String>,
    pub scalar_type: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl GraphqlAttribute {
    /// Camel case, unless the attribute name is all upper case
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.name {
            Some(name) => Ok(name.clone()),
            None => Ok(upper_or_camel(characteristic_of(model, element)?.name())),
        }
    }

    pub fn description(&self, model: &Repository, element: ElementRef) -> Result<Option<String>> {
        if self.description.is_some() {
            return Ok(self.description.clone());
        }
        Ok(characteristic_of(model, element)?.description().map(str::to_string))
    }

    pub fn scalar_type(&self, model: &Repository, element: ElementRef) -> Result<String> {
        scalar_type(&self.scalar_type, characteristic_of(model, element)?)
    }

    pub fn type_name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        type_name(model, &self.scalar_type, characteristic_of(model, element)?)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

impl FacetView for GraphqlAttribute {
    fn pre_complete(&mut self, model: &mut Repository, element: ElementRef) -> Result<()> {
        save_scalar_type(model, &self.scalar_type, element)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphqlQueryParameter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub scalar_type: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl GraphqlQueryParameter {
    /// Camel case of the name, or of the link name for references
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let parameter = characteristic_of(model, element)?;
        if parameter.is_reference() {
            Ok(naming::camelize(&parameter.referencing_link_name(model)?))
        } else {
            Ok(naming::camelize(parameter.name()))
        }
    }

    pub fn scalar_type(&self, model: &Repository, element: ElementRef) -> Result<String> {
        scalar_type(&self.scalar_type, characteristic_of(model, element)?)
    }

    pub fn type_name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        type_name(model, &self.scalar_type, characteristic_of(model, element)?)
    }
}

impl FacetView for GraphqlQueryParameter {
    fn pre_complete(&mut self, model: &mut Repository, element: ElementRef) -> Result<()> {
        save_scalar_type(model, &self.scalar_type, element)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphqlStructField {
    pub name: Option<String>,
    pub scalar_type: Option<String>,
}

impl GraphqlStructField {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.name {
            Some(name) => Ok(name.clone()),
            None => Ok(upper_or_camel(characteristic_of(model, element)?.name())),
        }
    }

    pub fn scalar_type(&self, model: &Repository, element: ElementRef) -> Result<String> {
        scalar_type(&self.scalar_type, characteristic_of(model, element)?)
    }

    pub fn type_name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        type_name(model, &self.scalar_type, characteristic_of(model, element)?)
    }
}

impl FacetView for GraphqlStructField {
    fn pre_complete(&mut self, model: &mut Repository, element: ElementRef) -> Result<()> {
        save_scalar_type(model, &self.scalar_type, element)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphqlInverse {
    pub name: Option<String>,
    pub traversable: Option<bool>,
}

impl GraphqlInverse {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let at = inverse_of(model, element)?;
        let attribute = model.characteristic(at)?;
        let inverse = model.inverse_of(at)?;
        Ok(upper_or_camel(&inverse.name(model, attribute)))
    }

    /// Defaults to traversable only when the referenced entity is exposed
    pub fn traversable(&self, model: &Repository, element: ElementRef) -> Result<bool> {
        if let Some(traversable) = self.traversable {
            return Ok(traversable);
        }
        let at = inverse_of(model, element)?;
        let inverse = model.inverse_of(at)?;
        let referenced = model.characteristic(at)?.referenced_entity()?;
        Ok(inverse.traversable() && model.facet_enabled(referenced.into(), GRAPHQL))
    }
}

impl FacetView for GraphqlInverse {}

// =============================================================================
// Queries
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct GraphqlQuery {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl GraphqlQuery {
    /// `<prefix><ResultType(s)><base name>` in camel case
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let query = model.query(query_of(model, element)?);
        let inset = match (query.result_entity(), query.result_struct()) {
            (Some(entity), _) => entity_name(model, entity)?,
            (None, Some(definition)) => struct_name(model, definition)?,
            (None, None) => {
                return Err(ModelError::invalid(
                    query.qualified_name(),
                    "query returns neither an entity nor a struct",
                ))
            }
        };
        let inset = if query.multiplicity() == Multiplicity::Many {
            naming::pluralize(&inset)
        } else {
            inset
        };
        Ok(naming::camelize(&format!(
            "{}{}{}",
            query.name_prefix(),
            inset,
            query.base_name()
        )))
    }

    pub fn description(&self, model: &Repository, element: ElementRef) -> Result<Option<String>> {
        if self.description.is_some() {
            return Ok(self.description.clone());
        }
        let query = model.query(query_of(model, element)?);
        Ok(query.description().map(str::to_string))
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

impl FacetView for GraphqlQuery {
    /// Only queries backed by jpa that return entities or structs are exposed.
    /// Modifying queries that run in their own transaction are withheld.
    fn pre_complete(&mut self, model: &mut Repository, element: ElementRef) -> Result<()> {
        let query = model.query(query_of(model, element)?);
        let dao = ElementRef::Dao(query.dao());
        let returns_type = query.result_entity().is_some() || query.result_struct().is_some();
        let requires_new = query.query_type() != QueryType::Select
            && model.facet_enabled(dao, JPA)
            && model.view::<JpaDao>(dao, JPA)?.transaction_type == TransactionType::RequiresNew;

        if !returns_type || !model.facet_enabled(element, JPA) || requires_new {
            model.disable_facet(element, GRAPHQL)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_registry;
    use crate::model::{CharacteristicOptions, QueryOptions, TypeOptions};

    fn model() -> Repository {
        let mut model = Repository::new("Acme", builtin_registry().unwrap());
        model.enable_facet(ElementRef::Repository, GRAPHQL).unwrap();
        model
    }

    #[test]
    fn test_prefix_depends_on_module_name() {
        let mut model = model();
        let own = model.define_data_module("Acme").unwrap();
        let other = model.define_data_module("Billing").unwrap();
        let a = model.define_entity(own, "Person", TypeOptions::new()).unwrap();
        let b = model.define_entity(other, "Invoice", TypeOptions::new()).unwrap();

        assert_eq!(entity_name(&model, a).unwrap(), "Person");
        assert_eq!(entity_name(&model, b).unwrap(), "BillingInvoice");
    }

    #[test]
    fn test_attribute_names_and_scalars() {
        let mut model = model();
        let module = model.define_data_module("Acme").unwrap();
        let person = model.define_entity(module, "Person", TypeOptions::new()).unwrap();
        let mut attributes = model.entity_mut(person);
        let id = attributes.integer("id", CharacteristicOptions::new().primary_key(true)).unwrap();
        let first = attributes.text("first_name", CharacteristicOptions::new()).unwrap();
        let code = attributes.text("ISO", CharacteristicOptions::new()).unwrap();
        let parent = attributes
            .reference("Person", CharacteristicOptions::new().name("parent"))
            .unwrap();

        let view = model.view::<GraphqlAttribute>(id.into(), GRAPHQL).unwrap();
        assert_eq!(view.scalar_type(&model, id.into()).unwrap(), "ID");

        let view = model.view::<GraphqlAttribute>(first.into(), GRAPHQL).unwrap();
        assert_eq!(view.name(&model, first.into()).unwrap(), "firstName");
        assert_eq!(view.scalar_type(&model, first.into()).unwrap(), "String");

        let view = model.view::<GraphqlAttribute>(code.into(), GRAPHQL).unwrap();
        assert_eq!(view.name(&model, code.into()).unwrap(), "ISO");

        let view = model.view::<GraphqlAttribute>(parent.into(), GRAPHQL).unwrap();
        let err = view.scalar_type(&model, parent.into()).unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { .. }));
        assert!(err.to_string().contains("Acme.Person.parent"));
        assert_eq!(view.type_name(&model, parent.into()).unwrap(), "Person");
    }

    #[test]
    fn test_scalars_registered_during_completion() {
        let mut model = model();
        let module = model.define_data_module("Acme").unwrap();
        let person = model.define_entity(module, "Person", TypeOptions::new()).unwrap();
        let mut attributes = model.entity_mut(person);
        attributes.integer("id", CharacteristicOptions::new().primary_key(true)).unwrap();
        attributes.date("born", CharacteristicOptions::new()).unwrap();
        attributes.text("name", CharacteristicOptions::new()).unwrap();
        model.complete().unwrap();

        let view = model.view::<GraphqlRepository>(ElementRef::Repository, GRAPHQL).unwrap();
        assert_eq!(view.scalars(), &["Int", "Date", "String"]);
        assert_eq!(view.non_standard_scalars(), vec!["Date"]);
    }

    #[test]
    fn test_query_disabled_without_jpa() {
        let mut model = model();
        let module = model.define_data_module("Acme").unwrap();
        let person = model.define_entity(module, "Person", TypeOptions::new()).unwrap();
        model
            .entity_mut(person)
            .integer("id", CharacteristicOptions::new().primary_key(true))
            .unwrap();
        let dao = model.define_dao(module, "PersonRepository", Some(person)).unwrap();
        let query = model.define_query(dao, "ByName", QueryOptions::new()).unwrap();
        model
            .query_mut(query)
            .text("name", CharacteristicOptions::new())
            .unwrap();

        let name = model
            .view::<GraphqlQuery>(query.into(), GRAPHQL)
            .unwrap()
            .name(&model, query.into())
            .unwrap();
        assert_eq!(name, "findAllPersonsByName");

        model.complete().unwrap();
        assert!(!model.facet_enabled(query.into(), GRAPHQL));
        assert!(model.facet_enabled(dao.into(), GRAPHQL));
    }

    #[test]
    fn test_query_kept_with_jpa() {
        let mut model = model();
        model.enable_facet(ElementRef::Repository, JPA).unwrap();
        let module = model.define_data_module("Acme").unwrap();
        let person = model.define_entity(module, "Person", TypeOptions::new()).unwrap();
        model
            .entity_mut(person)
            .integer("id", CharacteristicOptions::new().primary_key(true))
            .unwrap();
        let dao = model.define_dao(module, "PersonRepository", Some(person)).unwrap();
        let select = model.define_query(dao, "ByName", QueryOptions::new()).unwrap();
        let update = model
            .define_query(
                dao,
                "Name",
                QueryOptions::new()
                    .query_type(QueryType::Update)
                    .result(crate::model::QueryResult::Entity(person)),
            )
            .unwrap();
        model
            .configure(dao.into(), JPA, |view: &mut JpaDao| {
                view.transaction_type = TransactionType::RequiresNew
            })
            .unwrap();
        model.complete().unwrap();

        assert!(model.facet_enabled(select.into(), GRAPHQL));
        assert!(!model.facet_enabled(update.into(), GRAPHQL));
    }

    #[test]
    fn test_inverse_traversable_needs_exposed_entity() {
        let mut model = model();
        let module = model.define_data_module("Acme").unwrap();
        let person = model.define_entity(module, "Person", TypeOptions::new()).unwrap();
        model
            .entity_mut(person)
            .integer("id", CharacteristicOptions::new().primary_key(true))
            .unwrap();
        let car = model.define_entity(module, "Car", TypeOptions::new()).unwrap();
        let owner = model
            .entity_mut(car)
            .reference(
                "Person",
                CharacteristicOptions::new().name("owner").inverse_traversable(true),
            )
            .unwrap();
        let inverse = ElementRef::Inverse(owner);

        let view = model.view::<GraphqlInverse>(inverse, GRAPHQL).unwrap();
        assert_eq!(view.name(&model, inverse).unwrap(), "cars");
        assert!(view.traversable(&model, inverse).unwrap());

        model.disable_facet(person.into(), GRAPHQL).unwrap();
        let view = model.view::<GraphqlInverse>(inverse, GRAPHQL).unwrap();
        assert!(!view.traversable(&model, inverse).unwrap());
    }
}
