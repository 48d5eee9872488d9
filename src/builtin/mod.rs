//! Built-in facets
//!
//! | key         | enhances                                                  |
//! |-------------|-----------------------------------------------------------|
//! | `jpa`       | repository, entity, attribute, dao, query                 |
//! | `appconfig` | repository (feature flags)                                |
//! | `graphql`   | repository, data module, enumeration (+ values), entity,  |
//! |             | attribute, inverse, struct (+ fields), query (+ params)   |
//! | `xml`       | enumeration, struct, struct field, query parameter        |
//! | `ruby`      | data module, entity, attribute                            |
//!
//! Registration order matters: `appconfig` writes into the `jpa` repository
//! view, and `graphql` reads `jpa` enablement and dao settings.

pub mod appconfig;
pub mod graphql;
pub mod jpa;
pub mod ruby;
pub mod xml;

use crate::error::{ModelError, Result};
use crate::facet::{FacetKey, FacetRegistry};
use crate::model::{
    Characteristic, DataModuleId, EntityId, EnumerationId, QueryId, Repository, StructId,
};
use crate::model::{CharacteristicRef, ElementRef};

pub const JPA: FacetKey = "jpa";
pub const APPCONFIG: FacetKey = "appconfig";
pub const GRAPHQL: FacetKey = "graphql";
pub const XML: FacetKey = "xml";
pub const RUBY: FacetKey = "ruby";

/// Registry holding every built-in facet in dependency order
pub fn builtin_registry() -> Result<FacetRegistry> {
    let mut registry = FacetRegistry::new();
    registry.register(jpa::facet())?;
    registry.register(appconfig::facet())?;
    registry.register(graphql::facet())?;
    registry.register(xml::facet())?;
    registry.register(ruby::facet())?;
    Ok(registry)
}

// =============================================================================
// Element unpacking shared by the views
// =============================================================================

fn wrong_element(model: &Repository, element: ElementRef, expected: &str) -> ModelError {
    let name = model
        .qualified_name(element)
        .unwrap_or_else(|_| format!("{:?}", element));
    ModelError::invalid(name, format!("expected {} element, found {}", expected, element.kind()))
}

pub(crate) fn data_module_of(model: &Repository, element: ElementRef) -> Result<DataModuleId> {
    match element {
        ElementRef::DataModule(id) => Ok(id),
        _ => Err(wrong_element(model, element, "data module")),
    }
}

pub(crate) fn entity_of(model: &Repository, element: ElementRef) -> Result<EntityId> {
    match element {
        ElementRef::Entity(id) => Ok(id),
        _ => Err(wrong_element(model, element, "entity")),
    }
}

pub(crate) fn struct_of(model: &Repository, element: ElementRef) -> Result<StructId> {
    match element {
        ElementRef::Struct(id) => Ok(id),
        _ => Err(wrong_element(model, element, "struct")),
    }
}

pub(crate) fn enumeration_of(model: &Repository, element: ElementRef) -> Result<EnumerationId> {
    match element {
        ElementRef::Enumeration(id) => Ok(id),
        _ => Err(wrong_element(model, element, "enumeration")),
    }
}

pub(crate) fn query_of(model: &Repository, element: ElementRef) -> Result<QueryId> {
    match element {
        ElementRef::Query(id) => Ok(id),
        _ => Err(wrong_element(model, element, "query")),
    }
}

pub(crate) fn characteristic_of(model: &Repository, element: ElementRef) -> Result<&Characteristic> {
    match element {
        ElementRef::Characteristic(at) => model.characteristic(at),
        _ => Err(wrong_element(model, element, "characteristic")),
    }
}

pub(crate) fn inverse_of(model: &Repository, element: ElementRef) -> Result<CharacteristicRef> {
    match element {
        ElementRef::Inverse(at) => Ok(at),
        _ => Err(wrong_element(model, element, "inverse")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.keys(), vec![JPA, APPCONFIG, GRAPHQL, XML, RUBY]);
    }

    #[test]
    fn test_wrong_element_is_reported() {
        let model = Repository::new("Acme", builtin_registry().unwrap());
        let err = entity_of(&model, ElementRef::Repository).unwrap_err();
        assert!(err.to_string().contains("expected entity element, found Repository"));
    }
}
