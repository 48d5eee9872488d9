//! `xml` facet: XML schema naming for structs, enumerations and their fields

use super::{characteristic_of, enumeration_of, struct_of, XML};
use crate::error::Result;
use crate::facet::{Facet, FacetView};
use crate::model::{CharacteristicContainer, ElementKind, ElementRef, Repository};
use crate::naming;

pub fn facet() -> Facet {
    Facet::new(XML)
        .enhance::<XmlEnumeration>(ElementKind::Enumeration)
        .enhance::<XmlStruct>(ElementKind::Struct)
        .enhance::<XmlField>(ElementKind::StructField)
        .enhance::<XmlField>(ElementKind::QueryParameter)
}

/// Element name of a type: kebab case without the transfer-object suffix
fn type_element_name(name: &str) -> String {
    let name = naming::xmlize(name);
    for suffix in ["-dto", "-vo"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    name
}

/// Namespace of the data module holding a type
fn default_namespace(model: &Repository, module: &str) -> String {
    format!(
        "{}/{}",
        naming::underscore(model.name()),
        naming::underscore(module)
    )
}

#[derive(Debug, Clone, Default)]
pub struct XmlStruct {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl XmlStruct {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.name {
            Some(name) => Ok(name.clone()),
            None => Ok(type_element_name(model.struct_type(struct_of(model, element)?).name())),
        }
    }

    pub fn namespace(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(namespace) = &self.namespace {
            return Ok(namespace.clone());
        }
        let module = model.struct_type(struct_of(model, element)?).data_module();
        Ok(default_namespace(model, model.data_module(module).name()))
    }
}

impl FacetView for XmlStruct {
    fn template_variables(&self, model: &Repository, element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("name".to_string(), self.name(model, element)?),
            ("namespace".to_string(), self.namespace(model, element)?),
        ])
    }
}

#[derive(Debug, Clone, Default)]
pub struct XmlEnumeration {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl XmlEnumeration {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.name {
            Some(name) => Ok(name.clone()),
            None => Ok(type_element_name(
                model.enumeration(enumeration_of(model, element)?).name(),
            )),
        }
    }

    pub fn namespace(&self, model: &Repository, element: ElementRef) -> Result<String> {
        if let Some(namespace) = &self.namespace {
            return Ok(namespace.clone());
        }
        let module = model.enumeration(enumeration_of(model, element)?).data_module();
        Ok(default_namespace(model, model.data_module(module).name()))
    }
}

impl FacetView for XmlEnumeration {}

/// Naming of struct fields and query parameters
#[derive(Debug, Clone, Default)]
pub struct XmlField {
    pub name: Option<String>,
    pub required: Option<bool>,
    pub element: Option<bool>,
}

impl XmlField {
    pub fn name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.name {
            Some(name) => Ok(name.clone()),
            None => Ok(naming::xmlize(characteristic_of(model, element)?.name())),
        }
    }

    /// Defaults to required unless nullable
    pub fn required(&self, model: &Repository, element: ElementRef) -> Result<bool> {
        match self.required {
            Some(required) => Ok(required),
            None => Ok(!characteristic_of(model, element)?.nullable()),
        }
    }

    /// Collections and structs are child elements, everything else an attribute
    pub fn element(&self, model: &Repository, element: ElementRef) -> Result<bool> {
        match self.element {
            Some(is_element) => Ok(is_element),
            None => {
                let field = characteristic_of(model, element)?;
                Ok(field.is_collection() || field.is_struct())
            }
        }
    }
}

impl FacetView for XmlField {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_registry;
    use crate::model::{CharacteristicOptions, CollectionType, TypeOptions};

    #[test]
    fn test_type_element_name_strips_suffix() {
        assert_eq!(type_element_name("PersonDTO"), "person");
        assert_eq!(type_element_name("AddressVO"), "address");
        assert_eq!(type_element_name("MailingAddress"), "mailing-address");
    }

    #[test]
    fn test_field_defaults() {
        let mut model = Repository::new("Acme", builtin_registry().unwrap());
        let module = model.define_data_module("Core").unwrap();
        model.enable_facet(module.into(), XML).unwrap();
        let address = model.define_struct(module, "Address", TypeOptions::new()).unwrap();
        let person = model.define_struct(module, "Person", TypeOptions::new()).unwrap();
        let mut fields = model.struct_mut(person);
        let first = fields.text("firstName", CharacteristicOptions::new()).unwrap();
        let nick = fields
            .text("nickName", CharacteristicOptions::new().nullable(true))
            .unwrap();
        let home = fields.structure("home", "Address", CharacteristicOptions::new()).unwrap();
        let tags = fields
            .text("tags", CharacteristicOptions::new().collection_type(CollectionType::Sequence))
            .unwrap();

        let view = model.view::<XmlField>(first.into(), XML).unwrap();
        assert_eq!(view.name(&model, first.into()).unwrap(), "first-name");
        assert!(view.required(&model, first.into()).unwrap());
        assert!(!view.element(&model, first.into()).unwrap());

        let view = model.view::<XmlField>(nick.into(), XML).unwrap();
        assert!(!view.required(&model, nick.into()).unwrap());

        let view = model.view::<XmlField>(home.into(), XML).unwrap();
        assert!(view.element(&model, home.into()).unwrap());
        let view = model.view::<XmlField>(tags.into(), XML).unwrap();
        assert!(view.element(&model, tags.into()).unwrap());

        let view = model.view::<XmlStruct>(address.into(), XML).unwrap();
        assert_eq!(view.namespace(&model, address.into()).unwrap(), "acme/core");
    }
}
