//! `ruby` facet: ActiveRecord class naming

use super::{data_module_of, entity_of, RUBY};
use crate::error::Result;
use crate::facet::{Facet, FacetView};
use crate::model::{CharacteristicContainer, DataModuleId, ElementKind, ElementRef, Repository};
use crate::naming;

pub fn facet() -> Facet {
    Facet::new(RUBY)
        .enhance::<RubyModule>(ElementKind::DataModule)
        .enhance::<RubyClass>(ElementKind::Entity)
        .enhance::<RubyAttribute>(ElementKind::Attribute)
}

#[derive(Debug, Clone, Default)]
pub struct RubyModule {
    pub module_name: Option<String>,
}

impl RubyModule {
    pub fn module_name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.module_name {
            Some(name) => Ok(name.clone()),
            None => Ok(model.data_module(data_module_of(model, element)?).name().to_string()),
        }
    }
}

impl FacetView for RubyModule {
    fn template_variables(&self, model: &Repository, element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(vec![("module_name".to_string(), self.module_name(model, element)?)])
    }
}

fn module_name(model: &Repository, data_module: DataModuleId) -> Result<String> {
    let element = ElementRef::DataModule(data_module);
    if model.facet_enabled(element, RUBY) {
        model.view::<RubyModule>(element, RUBY)?.module_name(model, element)
    } else {
        Ok(model.data_module(data_module).name().to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RubyClass {
    pub classname: Option<String>,
    included_modules: Vec<String>,
}

impl RubyClass {
    pub fn classname(&self, model: &Repository, element: ElementRef) -> Result<String> {
        match &self.classname {
            Some(name) => Ok(name.clone()),
            None => Ok(model.entity(entity_of(model, element)?).name().to_string()),
        }
    }

    pub fn include_module(&mut self, module: impl Into<String>) {
        self.included_modules.push(module.into());
    }

    pub fn included_modules(&self) -> &[String] {
        &self.included_modules
    }

    /// `::Module::Class`
    pub fn qualified_name(&self, model: &Repository, element: ElementRef) -> Result<String> {
        let entity = model.entity(entity_of(model, element)?);
        Ok(format!(
            "::{}::{}",
            module_name(model, entity.data_module())?,
            self.classname(model, element)?
        ))
    }

    /// Source path relative to the ruby root, without extension
    pub fn filename(&self, model: &Repository, element: ElementRef) -> Result<String> {
        let qualified_name = self.qualified_name(model, element)?;
        Ok(qualified_name
            .trim_start_matches("::")
            .split("::")
            .map(naming::underscore)
            .collect::<Vec<_>>()
            .join("/"))
    }
}

impl FacetView for RubyClass {
    fn template_variables(&self, model: &Repository, element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("classname".to_string(), self.classname(model, element)?),
            ("qualified_name".to_string(), self.qualified_name(model, element)?),
            ("filename".to_string(), self.filename(model, element)?),
        ])
    }
}

/// Carries enablement only; the model renderer skips attributes with ruby disabled
#[derive(Debug, Clone, Default)]
pub struct RubyAttribute;

impl FacetView for RubyAttribute {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_registry;
    use crate::model::TypeOptions;

    #[test]
    fn test_class_naming() {
        let mut model = Repository::new("Acme", builtin_registry().unwrap());
        model.enable_facet(ElementRef::Repository, RUBY).unwrap();
        let module = model.define_data_module("HumanResources").unwrap();
        let entity = model
            .define_entity(module, "PayGrade", TypeOptions::new())
            .unwrap();

        let view = model.view::<RubyClass>(entity.into(), RUBY).unwrap();
        assert_eq!(
            view.qualified_name(&model, entity.into()).unwrap(),
            "::HumanResources::PayGrade"
        );
        assert_eq!(
            view.filename(&model, entity.into()).unwrap(),
            "human_resources/pay_grade"
        );
    }

    #[test]
    fn test_module_name_override() {
        let mut model = Repository::new("Acme", builtin_registry().unwrap());
        model.enable_facet(ElementRef::Repository, RUBY).unwrap();
        let module = model.define_data_module("Core").unwrap();
        let entity = model.define_entity(module, "Person", TypeOptions::new()).unwrap();
        model
            .configure(module.into(), RUBY, |view: &mut RubyModule| {
                view.module_name = Some("Base".to_string())
            })
            .unwrap();
        model
            .configure(entity.into(), RUBY, |view: &mut RubyClass| {
                view.include_module("Auditable")
            })
            .unwrap();

        let view = model.view::<RubyClass>(entity.into(), RUBY).unwrap();
        assert_eq!(view.filename(&model, entity.into()).unwrap(), "base/person");
        assert_eq!(view.included_modules(), &["Auditable".to_string()]);
    }
}
