//! Generator driver
//!
//! Renders templates over a completed model. Each template declares the scope
//! it iterates, an output path pattern, an optional guard and the facet an
//! element must have enabled for the template to apply there.
//!
//! Path patterns interpolate `{placeholder}` segments:
//!
//! | placeholder                   | available in scope              |
//! |-------------------------------|---------------------------------|
//! | `repository.name`             | all                             |
//! | `data_module.name`            | data module, entity             |
//! | `entity.name`                 | entity                          |
//! | `<scope>.<facet>.<variable>`  | where the facet view exists     |

pub mod templates;

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::facet::FacetKey;
use crate::model::{CharacteristicContainer, ElementRef, Repository};

// =============================================================================
// Templates
// =============================================================================

/// The model level a template is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Repository,
    DataModule,
    Entity,
}

impl Scope {
    fn variable_prefix(self) -> &'static str {
        match self {
            Scope::Repository => "repository",
            Scope::DataModule => "data_module",
            Scope::Entity => "entity",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variable_prefix())
    }
}

/// Skips the scope element when it returns false
pub type Guard = fn(&Repository, ElementRef) -> Result<bool>;

/// Produces the artifact content for one scope element
pub type Renderer = fn(&Repository, ElementRef) -> Result<String>;

/// One output artifact per matching scope element
#[derive(Debug, Clone)]
pub struct Template {
    pub name: &'static str,
    pub scope: Scope,
    /// Facet that must be enabled on the scope element
    pub facet: FacetKey,
    pub path_pattern: &'static str,
    pub guard: Option<Guard>,
    pub renderer: Renderer,
}

impl Template {
    pub fn new(
        name: &'static str,
        scope: Scope,
        facet: FacetKey,
        path_pattern: &'static str,
        renderer: Renderer,
    ) -> Self {
        Self {
            name,
            scope,
            facet,
            path_pattern,
            guard: None,
            renderer,
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }
}

/// Templates grouped by generator key
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    generators: IndexMap<String, Vec<Template>>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the built-in generators
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (key, templates) in templates::builtin_templates() {
            catalog.define(key, templates);
        }
        catalog
    }

    /// Register templates under `key`, appending to any already there
    pub fn define(&mut self, key: &str, templates: Vec<Template>) {
        self.generators
            .entry(key.to_string())
            .or_default()
            .extend(templates);
    }

    pub fn keys(&self) -> Vec<&str> {
        self.generators.keys().map(String::as_str).collect()
    }

    pub fn templates_for(&self, key: &str) -> Result<&[Template]> {
        self.generators
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| ModelError::not_found("generator", key, "template catalog", &self.keys()))
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Files written by one generator run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub files: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub struct Generator<'a> {
    model: &'a Repository,
    catalog: &'a TemplateCatalog,
    placeholder: Regex,
}

impl<'a> Generator<'a> {
    pub fn new(model: &'a Repository, catalog: &'a TemplateCatalog) -> Result<Self> {
        Ok(Self {
            model,
            catalog,
            placeholder: Regex::new(r"\{([A-Za-z0-9_.]+)\}")?,
        })
    }

    /// Render every template of `keys` under `directory`. An empty key list
    /// runs every generator in the catalog.
    pub fn generate<S: AsRef<str>>(&self, directory: &Path, keys: &[S]) -> Result<GenerationReport> {
        if !self.model.is_completed() {
            return Err(ModelError::NotCompleted(self.model.name().to_string()));
        }
        let keys: Vec<String> = if keys.is_empty() {
            self.catalog.keys().into_iter().map(str::to_string).collect()
        } else {
            keys.iter().map(|k| k.as_ref().to_string()).collect()
        };
        // Resolve every key before writing anything
        let mut selected = Vec::new();
        for key in &keys {
            selected.push((key.as_str(), self.catalog.templates_for(key)?));
        }

        info!(generators = ?keys, "Generator started");
        let mut report = GenerationReport::default();
        for (key, templates) in selected {
            for template in templates {
                for element in self.scope_elements(template.scope) {
                    if let Some(path) = self.render(directory, template, element)? {
                        let element = self.model.qualified_name(element)?;
                        debug!(
                            generator = key,
                            template = template.name,
                            element = %element,
                            path = %path.display(),
                            "Generated artifact"
                        );
                        report.files.push(path);
                    }
                }
            }
        }
        info!(files = report.len(), "Generator completed");
        Ok(report)
    }

    fn scope_elements(&self, scope: Scope) -> Vec<ElementRef> {
        let model = self.model;
        match scope {
            Scope::Repository => vec![ElementRef::Repository],
            Scope::DataModule => model.data_modules().map(ElementRef::DataModule).collect(),
            Scope::Entity => model
                .data_modules()
                .flat_map(|module| model.data_module(module).entities())
                .map(ElementRef::Entity)
                .collect(),
        }
    }

    fn render(&self, directory: &Path, template: &Template, element: ElementRef) -> Result<Option<PathBuf>> {
        if !self.model.facet_enabled(element, template.facet) {
            return Ok(None);
        }
        if let Some(guard) = template.guard {
            if !guard(self.model, element)? {
                return Ok(None);
            }
        }
        let relative = self.expand(template, element)?;
        let content = (template.renderer)(self.model, element)?;

        let path = directory.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(Some(path))
    }

    /// Interpolate the template's path pattern for `element`
    pub fn expand(&self, template: &Template, element: ElementRef) -> Result<String> {
        let mut failure = None;
        let expanded = self
            .placeholder
            .replace_all(template.path_pattern, |captures: &Captures| {
                match self.variable(template.scope, element, &captures[1]) {
                    Ok(value) => value,
                    Err(e) => {
                        failure.get_or_insert(e);
                        String::new()
                    }
                }
            })
            .into_owned();
        match failure {
            Some(e) => Err(e),
            None => Ok(expanded),
        }
    }

    fn variable(&self, scope: Scope, element: ElementRef, placeholder: &str) -> Result<String> {
        let unknown = || {
            ModelError::invalid(
                format!("{} template path", scope),
                format!("unknown placeholder {{{}}}", placeholder),
            )
        };
        let mut parts = placeholder.splitn(3, '.');
        let (Some(prefix), Some(second)) = (parts.next(), parts.next()) else {
            return Err(unknown());
        };
        let Some(target) = self.scope_target(scope, element, prefix) else {
            return Err(unknown());
        };

        match parts.next() {
            None if second == "name" => Ok(self.element_name(target)),
            None => Err(unknown()),
            Some(variable) => {
                let view = self.model.facet_view(target, second)?;
                view.template_variables(self.model, target)?
                    .into_iter()
                    .find(|(name, _)| name == variable)
                    .map(|(_, value)| value)
                    .ok_or_else(unknown)
            }
        }
    }

    /// The element named by a placeholder prefix, when the scope has one
    fn scope_target(&self, scope: Scope, element: ElementRef, prefix: &str) -> Option<ElementRef> {
        match (prefix, scope, element) {
            ("repository", _, _) => Some(ElementRef::Repository),
            ("data_module", Scope::DataModule, ElementRef::DataModule(_)) => Some(element),
            ("data_module", Scope::Entity, ElementRef::Entity(id)) => {
                Some(ElementRef::DataModule(self.model.entity(id).data_module()))
            }
            ("entity", Scope::Entity, ElementRef::Entity(_)) => Some(element),
            _ => None,
        }
    }

    fn element_name(&self, element: ElementRef) -> String {
        match element {
            ElementRef::DataModule(id) => self.model.data_module(id).name().to_string(),
            ElementRef::Entity(id) => self.model.entity(id).name().to_string(),
            _ => self.model.name().to_string(),
        }
    }
}
