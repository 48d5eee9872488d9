//! `appconfig` facet: runtime feature flags owned by the repository

use indexmap::IndexMap;

use super::jpa::JpaRepository;
use super::{APPCONFIG, JPA};
use crate::error::{ModelError, Result};
use crate::facet::{Facet, FacetView};
use crate::model::{ElementKind, ElementRef, Repository};

pub fn facet() -> Facet {
    Facet::new(APPCONFIG).enhance::<AppconfigRepository>(ElementKind::Repository)
}

/// A named runtime switch
#[derive(Debug, Clone)]
pub struct FeatureFlag {
    key: String,
    pub key_value: Option<String>,
    pub initial_value: Option<bool>,
    pub disable_in_integration_test: Option<bool>,
    pub description: Option<String>,
}

impl FeatureFlag {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            key_value: None,
            initial_value: None,
            disable_in_integration_test: None,
            description: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key used to store the flag; defaults to the flag key
    pub fn key_value(&self) -> &str {
        self.key_value.as_deref().unwrap_or(&self.key)
    }

    /// Value set on first import
    pub fn initial_value(&self) -> bool {
        self.initial_value.unwrap_or(true)
    }

    pub fn disable_in_integration_test(&self) -> bool {
        self.disable_in_integration_test.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppconfigRepository {
    pub short_test_code: Option<String>,
    feature_flags: IndexMap<String, FeatureFlag>,
}

impl AppconfigRepository {
    pub fn short_test_code(&self) -> &str {
        self.short_test_code.as_deref().unwrap_or("ac")
    }

    /// Register a feature flag. Keys are unique.
    pub fn feature_flag(&mut self, key: &str) -> Result<&mut FeatureFlag> {
        if self.feature_flags.contains_key(key) {
            return Err(ModelError::Duplicate {
                kind: "feature flag",
                name: key.to_string(),
                scope: "appconfig".to_string(),
            });
        }
        let entry = self
            .feature_flags
            .entry(key.to_string())
            .or_insert_with(|| FeatureFlag::new(key));
        Ok(entry)
    }

    pub fn feature_flag_by_name(&self, key: &str) -> Result<&FeatureFlag> {
        self.feature_flags.get(key).ok_or_else(|| {
            let available: Vec<&str> = self.feature_flags.keys().map(String::as_str).collect();
            ModelError::not_found("feature flag", key, "appconfig", &available)
        })
    }

    pub fn has_feature_flags(&self) -> bool {
        !self.feature_flags.is_empty()
    }

    /// Flags in registration order
    pub fn feature_flags(&self) -> impl Iterator<Item = &FeatureFlag> {
        self.feature_flags.values()
    }
}

impl FacetView for AppconfigRepository {
    /// Adds the settings persistence unit when the repository is persisted
    fn pre_complete(&mut self, model: &mut Repository, _element: ElementRef) -> Result<()> {
        if !model.facet_enabled(ElementRef::Repository, JPA) {
            return Ok(());
        }
        let data_source = model
            .view::<JpaRepository>(ElementRef::Repository, JPA)?
            .data_source(model);
        let fragment = persistence_unit(model.name(), &data_source);
        model
            .view_mut::<JpaRepository>(ElementRef::Repository, JPA)?
            .persistence_file_content_fragments
            .push(fragment);
        Ok(())
    }

    fn template_variables(&self, _model: &Repository, _element: ElementRef) -> Result<Vec<(String, String)>> {
        Ok(vec![("short_test_code".to_string(), self.short_test_code().to_string())])
    }
}

fn persistence_unit(repository: &str, data_source: &str) -> String {
    format!(
        r#"<persistence-unit name="AppConfig" transaction-type="JTA">
  <jta-data-source>{data_source}</jta-data-source>
  <class>iris.appconfig.server.entity.SystemSetting</class>
  <exclude-unlisted-classes>true</exclude-unlisted-classes>
  <properties>
    <property name="eclipselink.session-name" value="{repository}AppConfig"/>
  </properties>
</persistence-unit>"#
    )
}
