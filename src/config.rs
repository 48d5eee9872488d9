//! Configuration management for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (modelsmith.toml)
//! - Environment variables (MODELSMITH__*)
//!
//! ## Example config file (modelsmith.toml):
//! ```toml
//! [generator]
//! output_dir = "target/generated"
//! generators = ["jpa", "graphql"]
//!
//! [facets]
//! enabled = ["jpa", "graphql"]
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// Main configuration for a generator run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Output settings
    #[serde(default)]
    pub generator: GeneratorSection,

    /// Facets enabled on the repository when a schema names none
    #[serde(default)]
    pub facets: FacetsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSection {
    /// Base directory for rendered artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Generator keys to run; empty runs every known key
    #[serde(default)]
    pub generators: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetsSection {
    #[serde(default)]
    pub enabled: Vec<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            generators: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["modelsmith.toml", ".modelsmith.toml", "config/modelsmith.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "modelsmith", "modelsmith") {
            let xdg_config = config_dir.config_dir().join("modelsmith.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // MODELSMITH__GENERATOR__OUTPUT_DIR=out
        builder = builder.add_source(
            Environment::with_prefix("MODELSMITH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("generator.generators")
                .with_list_parse_key("facets.enabled"),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Output directory, resolved against the working directory
    pub fn output_dir(&self) -> PathBuf {
        if self.generator.output_dir.is_absolute() {
            self.generator.output_dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.generator.output_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.generator.output_dir, PathBuf::from("generated"));
        assert!(config.generator.generators.is_empty());
        assert!(config.facets.enabled.is_empty());
    }

    #[test]
    fn test_serialize_config() {
        let config = GeneratorConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[generator]"));
        assert!(toml_str.contains("[facets]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[generator]\noutput_dir = \"out\"\ngenerators = [\"jpa\"]\n\n[facets]\nenabled = [\"jpa\"]\n",
        )
        .unwrap();

        let config = GeneratorConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.generator.output_dir, PathBuf::from("out"));
        assert_eq!(config.generator.generators, vec!["jpa"]);
        assert_eq!(config.facets.enabled, vec!["jpa"]);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = GeneratorConfig::default();
        config.facets.enabled.push("graphql".to_string());
        config.save(path.to_str().unwrap()).unwrap();

        let loaded: GeneratorConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.facets.enabled, vec!["graphql"]);
    }
}
