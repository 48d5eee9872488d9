//! `jpa` facet: persistence mapping

use serde::{Deserialize, Serialize};

use super::{characteristic_of, entity_of, JPA};
use crate::error::Result;
use crate::facet::{Facet, FacetView};
use crate::model::{
    CharacteristicContainer, ElementKind, ElementRef, InheritableCharacteristicContainer, Repository,
};

pub fn facet() -> Facet {
    Facet::new(JPA)
        .enhance::<JpaRepository>(ElementKind::Repository)
        .enhance::<JpaEntity>(ElementKind::Entity)
        .enhance::<JpaAttribute>(ElementKind::Attribute)
        .enhance::<JpaDao>(ElementKind::Dao)
        .enhance::<JpaQuery>(ElementKind::Query)
}

/// Persistence unit settings
#[derive(Debug, Clone, Default)]
pub struct JpaRepository {
    pub data_source: Option<String>,
    pub unit_name: Option<String>,
    /// Extra `<persistence-unit>` blocks contributed by other facets
    pub persistence_file_content_fragments: Vec<String>,
}

impl JpaRepository {
    pub fn data_source(&self, model: &Repository) -> String {
        self.data_source
            .clone()
            .unwrap_or_else(|| format!("jdbc/{}", model.name()))
    }

    pub fn unit_name(&self, model: &Repository) -> String {
        self.unit_name
            .clone()
            .unwrap_or_else(|| model.name().to_string())
    }
}

impl FacetView for JpaRepository {
    fn template_variables(&self, model: &Repository, _element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("unit_name".to_string(), self.unit_name(model)),
            ("data_source".to_string(), self.data_source(model)),
        ])
    }
}

#[derive(Debug, Clone, Default)]
pub struct JpaEntity {
    pub table_name: Option<String>,
}

impl JpaEntity {
    pub fn table_name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.table_name {
            Some(table_name) => Ok(table_name.clone()),
            None => Ok(model.entity(entity_of(model, element)?).name().to_string()),
        }
    }
}

impl FacetView for JpaEntity {
    /// Concrete entities must be identifiable
    fn pre_complete(&mut self, model: &mut Repository, element: ElementRef) -> Result<()> {
        let entity = model.entity(entity_of(model, element)?);
        if !entity.is_abstract() {
            entity.primary_key()?;
        }
        Ok(())
    }

    fn template_variables(&self, model: &Repository, element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(vec![("table_name".to_string(), self.table_name(model, element)?)])
    }
}

#[derive(Debug, Clone, Default)]
pub struct JpaAttribute {
    pub column_name: Option<String>,
}

impl JpaAttribute {
    /// Defaults to the attribute name, or the link name for references
    pub fn column_name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(column_name) = &self.column_name {
            return Ok(column_name.clone());
        }
        let attribute = characteristic_of(model, element)?;
        if attribute.is_reference() {
            attribute.referencing_link_name(model)
        } else {
            Ok(attribute.name().to_string())
        }
    }
}

impl FacetView for JpaAttribute {}

/// Container-managed transaction demarcation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Required,
    RequiresNew,
    Mandatory,
    Supports,
    NotSupported,
    Never,
}

#[derive(Debug, Clone, Default)]
pub struct JpaDao {
    pub transaction_type: TransactionType,
}

impl FacetView for JpaDao {}

/// Carries enablement only; graphql exposes a query while jpa is enabled on it
#[derive(Debug, Clone, Default)]
pub struct JpaQuery;

impl FacetView for JpaQuery {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_registry;
    use crate::model::{CharacteristicOptions, TypeOptions};

    #[test]
    fn test_column_name_of_reference() {
        let mut model = Repository::new("Acme", builtin_registry().unwrap());
        model.enable_facet(ElementRef::Repository, JPA).unwrap();
        let module = model.define_data_module("Core").unwrap();
        let person = model.define_entity(module, "Person", TypeOptions::new()).unwrap();
        model
            .entity_mut(person)
            .integer("id", CharacteristicOptions::new().primary_key(true))
            .unwrap();
        let car = model.define_entity(module, "Car", TypeOptions::new()).unwrap();
        let owner = model
            .entity_mut(car)
            .reference("Person", CharacteristicOptions::new().name("owner"))
            .unwrap();

        let view = model.view::<JpaAttribute>(owner.into(), JPA).unwrap();
        assert_eq!(view.column_name(&model, owner.into()).unwrap(), "ownerId");
    }

    #[test]
    fn test_concrete_entity_requires_primary_key() {
        let mut model = Repository::new("Acme", builtin_registry().unwrap());
        model.enable_facet(ElementRef::Repository, JPA).unwrap();
        let module = model.define_data_module("Core").unwrap();
        model.define_entity(module, "Keyless", TypeOptions::new()).unwrap();
        let err = model.complete().unwrap_err();
        assert!(err.to_string().contains("Core.Keyless"));
        assert!(err.to_string().contains("no primary key"));
    }

    #[test]
    fn test_repository_defaults() {
        let mut model = Repository::new("Acme", builtin_registry().unwrap());
        model.enable_facet(ElementRef::Repository, JPA).unwrap();
        let view = model.view::<JpaRepository>(ElementRef::Repository, JPA).unwrap();
        assert_eq!(view.data_source(&model), "jdbc/Acme");
        assert_eq!(view.unit_name(&model), "Acme");
    }
}
