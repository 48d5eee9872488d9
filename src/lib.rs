//! Modelsmith
//!
//! Builds an in-memory domain model (data modules, entities, structs,
//! enumerations, daos and queries), decorates it with facets that carry
//! per-target metadata, completes it, and renders artifacts for the enabled
//! targets.
//!
//! ## Features
//!
//! - **Typed characteristics**: attributes, struct fields, query parameters
//!   and relations with validated length, nullability and inverse rules
//! - **Facets**: `jpa`, `appconfig`, `graphql`, `xml` and `ruby` views attached
//!   lazily to every element they enhance
//! - **Completion**: pre/post hooks run per facet in registration order
//! - **Generators**: template catalogs keyed by name, rendered into a directory
//! - **Schema documents**: TOML or JSON descriptions of a whole repository
//!
//! ## Architecture
//!
//! ```text
//! Document ──build──▶ Repository ──complete──▶ Generator ──▶ files
//!                        │
//!                        └── FacetRegistry (jpa, appconfig, graphql, xml, ruby)
//! ```

pub mod builtin;
pub mod config;
pub mod document;
pub mod error;
pub mod facet;
pub mod generator;
pub mod model;
pub mod naming;

pub use builtin::builtin_registry;
pub use config::GeneratorConfig;
pub use document::Document;
pub use error::{ModelError, Result};
pub use facet::{Facet, FacetKey, FacetRegistry, FacetView};
pub use generator::{GenerationReport, Generator, Scope, Template, TemplateCatalog};
pub use model::{ElementKind, ElementRef, Repository};
