//! Built-in templates
//!
//! Renderers emit compact artifacts straight from facet views. They only
//! ever see a completed model.

use std::fmt::Write as _;

use super::{Scope, Template};
use crate::builtin::appconfig::AppconfigRepository;
use crate::builtin::graphql::{
    entity_name, struct_name, GraphqlAttribute, GraphqlEntity, GraphqlEnumeration,
    GraphqlEnumerationValue, GraphqlInverse, GraphqlQuery, GraphqlQueryParameter, GraphqlRepository,
    GraphqlStruct, GraphqlStructField,
};
use crate::builtin::jpa::{JpaAttribute, JpaEntity, JpaRepository};
use crate::builtin::ruby::RubyClass;
use crate::builtin::xml::{XmlEnumeration, XmlField, XmlStruct};
use crate::builtin::{data_module_of, entity_of, APPCONFIG, GRAPHQL, JPA, RUBY, XML};
use crate::error::{ModelError, Result};
use crate::model::{
    Characteristic, CharacteristicContainer, CharacteristicRef, ContainerRef, ElementRef, EntityId, Multiplicity,
    Repository,
};

pub(crate) fn builtin_templates() -> Vec<(&'static str, Vec<Template>)> {
    vec![
        (
            "jpa",
            vec![Template::new(
                "persistence",
                Scope::Repository,
                JPA,
                "jpa/{repository.jpa.unit_name}/META-INF/persistence.xml",
                render_persistence,
            )],
        ),
        (
            "graphql",
            vec![Template::new(
                "schema",
                Scope::Repository,
                GRAPHQL,
                "graphql/{repository.graphql.schema_name}.graphqls",
                render_graphql_schema,
            )],
        ),
        (
            "appconfig",
            vec![Template::new(
                "feature_flags",
                Scope::Repository,
                APPCONFIG,
                "appconfig/{repository.name}FeatureFlags.properties",
                render_feature_flags,
            )
            .with_guard(has_feature_flags)],
        ),
        (
            "xml",
            vec![Template::new(
                "xsd",
                Scope::DataModule,
                XML,
                "xml/{data_module.name}.xsd",
                render_xsd,
            )],
        ),
        (
            "active_record",
            vec![Template::new(
                "model",
                Scope::Entity,
                RUBY,
                "ruby/{entity.ruby.filename}.rb",
                render_active_record,
            )],
        ),
    ]
}

fn fmt_error(e: std::fmt::Error) -> ModelError {
    ModelError::Template(e.to_string())
}

/// Entities with facet `key` enabled, in model order
fn entities_with(model: &Repository, key: &str) -> Result<Vec<EntityId>> {
    let mut entities = Vec::new();
    for element in model.elements()? {
        if let ElementRef::Entity(id) = element {
            if model.facet_enabled(element, key) {
                entities.push(id);
            }
        }
    }
    Ok(entities)
}

fn characteristics(model: &Repository, container: ContainerRef) -> Vec<CharacteristicRef> {
    (0..model.container(container).characteristic_map().len())
        .map(|index| CharacteristicRef { container, index })
        .collect()
}

// =============================================================================
// jpa
// =============================================================================

fn render_persistence(model: &Repository, element: ElementRef) -> Result<String> {
    let view = model.view::<JpaRepository>(element, JPA)?;
    let mut out = String::new();
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#).map_err(fmt_error)?;
    writeln!(out, r#"<persistence version="2.0">"#).map_err(fmt_error)?;
    writeln!(
        out,
        r#"<persistence-unit name="{}" transaction-type="JTA">"#,
        view.unit_name(model)
    )
    .map_err(fmt_error)?;
    writeln!(out, "  <jta-data-source>{}</jta-data-source>", view.data_source(model)).map_err(fmt_error)?;
    for id in entities_with(model, JPA)? {
        let entity = ElementRef::Entity(id);
        let table = model.view::<JpaEntity>(entity, JPA)?.table_name(model, entity)?;
        let mut columns = Vec::new();
        for at in characteristics(model, ContainerRef::Entity(id)) {
            if model.facet_enabled(at.into(), JPA) {
                columns.push(model.view::<JpaAttribute>(at.into(), JPA)?.column_name(model, at.into())?);
            }
        }
        writeln!(
            out,
            "  <class>{}</class> <!-- {}({}) -->",
            model.entity(id).qualified_name(),
            table,
            columns.join(", ")
        )
        .map_err(fmt_error)?;
    }
    writeln!(out, "</persistence-unit>").map_err(fmt_error)?;
    for fragment in &view.persistence_file_content_fragments {
        writeln!(out, "{}", fragment).map_err(fmt_error)?;
    }
    writeln!(out, "</persistence>").map_err(fmt_error)?;
    Ok(out)
}

// =============================================================================
// graphql
// =============================================================================

/// Wraps collections in a list and marks non-nullable fields
fn graphql_field_type(characteristic: &Characteristic, type_name: String) -> String {
    let type_name = if characteristic.is_collection() {
        format!("[{}!]", type_name)
    } else {
        type_name
    };
    if characteristic.nullable() {
        type_name
    } else {
        format!("{}!", type_name)
    }
}

fn render_graphql_schema(model: &Repository, element: ElementRef) -> Result<String> {
    let repository = model.view::<GraphqlRepository>(element, GRAPHQL)?;
    let mut out = String::new();

    for scalar in repository.non_standard_scalars() {
        writeln!(out, "scalar {}", scalar).map_err(fmt_error)?;
    }

    for enumeration in model.elements()? {
        if !matches!(enumeration, ElementRef::Enumeration(_)) || !model.facet_enabled(enumeration, GRAPHQL) {
            continue;
        }
        let view = model.view::<GraphqlEnumeration>(enumeration, GRAPHQL)?;
        writeln!(out, "\nenum {} {{", view.name(model, enumeration)?).map_err(fmt_error)?;
        for value in model.children(enumeration)? {
            let value_view = model.view::<GraphqlEnumerationValue>(value, GRAPHQL)?;
            let deprecation = match &value_view.deprecation_reason {
                Some(reason) => format!(" @deprecated(reason: \"{}\")", reason),
                None => String::new(),
            };
            writeln!(out, "  {}{}", value_view.name(model, value)?, deprecation).map_err(fmt_error)?;
        }
        writeln!(out, "}}").map_err(fmt_error)?;
    }

    for id in entities_with(model, GRAPHQL)? {
        let entity = ElementRef::Entity(id);
        let view = model.view::<GraphqlEntity>(entity, GRAPHQL)?;
        if let Some(description) = view.description(model, entity)? {
            writeln!(out, "\n\"{}\"", description).map_err(fmt_error)?;
        } else {
            writeln!(out).map_err(fmt_error)?;
        }
        writeln!(out, "type {} {{", view.name(model, entity)?).map_err(fmt_error)?;
        for at in characteristics(model, ContainerRef::Entity(id)) {
            let attribute = ElementRef::Characteristic(at);
            if !model.facet_enabled(attribute, GRAPHQL) {
                continue;
            }
            let field = model.view::<GraphqlAttribute>(attribute, GRAPHQL)?;
            let type_name = graphql_field_type(model.characteristic(at)?, field.type_name(model, attribute)?);
            writeln!(out, "  {}: {}", field.name(model, attribute)?, type_name).map_err(fmt_error)?;
        }
        writeln!(out, "}}").map_err(fmt_error)?;
    }

    for definition in model.elements()? {
        let ElementRef::Struct(id) = definition else {
            continue;
        };
        if !model.facet_enabled(definition, GRAPHQL) {
            continue;
        }
        let view = model.view::<GraphqlStruct>(definition, GRAPHQL)?;
        writeln!(out, "\ntype {} {{", view.name(model, definition)?).map_err(fmt_error)?;
        for at in characteristics(model, ContainerRef::Struct(id)) {
            let field = ElementRef::Characteristic(at);
            if !model.facet_enabled(field, GRAPHQL) {
                continue;
            }
            let field_view = model.view::<GraphqlStructField>(field, GRAPHQL)?;
            let type_name = graphql_field_type(model.characteristic(at)?, field_view.type_name(model, field)?);
            writeln!(out, "  {}: {}", field_view.name(model, field)?, type_name).map_err(fmt_error)?;
        }
        writeln!(out, "}}").map_err(fmt_error)?;
    }

    // Traversable inverses surface on the referenced type
    for inverse in model.elements()? {
        let ElementRef::Inverse(at) = inverse else {
            continue;
        };
        if !model.facet_enabled(inverse, GRAPHQL) {
            continue;
        }
        let view = model.view::<GraphqlInverse>(inverse, GRAPHQL)?;
        if !view.traversable(model, inverse)? {
            continue;
        }
        let owner = match at.container {
            ContainerRef::Entity(owner) => owner,
            _ => continue,
        };
        let referenced = model.characteristic(at)?.referenced_entity()?;
        let owner_name = entity_name(model, owner)?;
        let field_type = match model.inverse_of(at)?.multiplicity() {
            Multiplicity::Many => format!("[{}!]!", owner_name),
            Multiplicity::One => format!("{}!", owner_name),
            Multiplicity::ZeroOrOne => owner_name,
        };
        writeln!(
            out,
            "\nextend type {} {{\n  {}: {}\n}}",
            entity_name(model, referenced)?,
            view.name(model, inverse)?,
            field_type
        )
        .map_err(fmt_error)?;
    }

    let mut queries = Vec::new();
    for query in model.elements()? {
        if let ElementRef::Query(id) = query {
            if model.facet_enabled(query, GRAPHQL) {
                queries.push((id, query));
            }
        }
    }
    if !queries.is_empty() {
        if let Some(description) = &repository.query_description {
            writeln!(out, "\n\"{}\"", description).map_err(fmt_error)?;
        } else {
            writeln!(out).map_err(fmt_error)?;
        }
        writeln!(out, "type Query {{").map_err(fmt_error)?;
        for (id, query) in queries {
            let view = model.view::<GraphqlQuery>(query, GRAPHQL)?;
            let mut parameters = Vec::new();
            for parameter in model.children(query)? {
                if !model.facet_enabled(parameter, GRAPHQL) {
                    continue;
                }
                let parameter_view = model.view::<GraphqlQueryParameter>(parameter, GRAPHQL)?;
                parameters.push(format!(
                    "{}: {}!",
                    parameter_view.name(model, parameter)?,
                    parameter_view.type_name(model, parameter)?
                ));
            }
            let record = model.query(id);
            let result = match (record.result_entity(), record.result_struct()) {
                (Some(entity), _) => entity_name(model, entity)?,
                (None, Some(definition)) => struct_name(model, definition)?,
                (None, None) => continue,
            };
            let result = match record.multiplicity() {
                Multiplicity::Many => format!("[{}!]!", result),
                Multiplicity::One => format!("{}!", result),
                Multiplicity::ZeroOrOne => result,
            };
            let arguments = if parameters.is_empty() {
                String::new()
            } else {
                format!("({})", parameters.join(", "))
            };
            writeln!(out, "  {}{}: {}", view.name(model, query)?, arguments, result).map_err(fmt_error)?;
        }
        writeln!(out, "}}").map_err(fmt_error)?;
    }
    Ok(out)
}

// =============================================================================
// appconfig
// =============================================================================

fn has_feature_flags(model: &Repository, element: ElementRef) -> Result<bool> {
    Ok(model
        .view::<AppconfigRepository>(element, APPCONFIG)?
        .has_feature_flags())
}

fn render_feature_flags(model: &Repository, element: ElementRef) -> Result<String> {
    let view = model.view::<AppconfigRepository>(element, APPCONFIG)?;
    let mut out = String::new();
    writeln!(out, "# {} feature flags ({})", model.name(), view.short_test_code()).map_err(fmt_error)?;
    for flag in view.feature_flags() {
        if let Some(description) = &flag.description {
            writeln!(out, "# {}", description).map_err(fmt_error)?;
        }
        writeln!(out, "{}={}", flag.key_value(), flag.initial_value()).map_err(fmt_error)?;
    }
    Ok(out)
}

// =============================================================================
// xml
// =============================================================================

fn render_xsd(model: &Repository, element: ElementRef) -> Result<String> {
    let module = model.data_module(data_module_of(model, element)?);
    let mut out = String::new();
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#).map_err(fmt_error)?;
    writeln!(out, r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">"#).map_err(fmt_error)?;

    for id in module.enumerations() {
        let enumeration = ElementRef::Enumeration(id);
        if !model.facet_enabled(enumeration, XML) {
            continue;
        }
        let view = model.view::<XmlEnumeration>(enumeration, XML)?;
        writeln!(out, r#"  <xs:simpleType name="{}">"#, view.name(model, enumeration)?).map_err(fmt_error)?;
        writeln!(out, r#"    <xs:restriction base="xs:string">"#).map_err(fmt_error)?;
        for value in model.enumeration(id).values() {
            writeln!(out, r#"      <xs:enumeration value="{}"/>"#, value.name()).map_err(fmt_error)?;
        }
        writeln!(out, "    </xs:restriction>\n  </xs:simpleType>").map_err(fmt_error)?;
    }

    for id in module.structs() {
        let definition = ElementRef::Struct(id);
        if !model.facet_enabled(definition, XML) {
            continue;
        }
        let view = model.view::<XmlStruct>(definition, XML)?;
        writeln!(out, r#"  <xs:complexType name="{}">"#, view.name(model, definition)?).map_err(fmt_error)?;
        let mut elements = Vec::new();
        let mut attributes = Vec::new();
        for at in characteristics(model, ContainerRef::Struct(id)) {
            let field = ElementRef::Characteristic(at);
            if !model.facet_enabled(field, XML) {
                continue;
            }
            let field_view = model.view::<XmlField>(field, XML)?;
            let name = field_view.name(model, field)?;
            let required = field_view.required(model, field)?;
            if field_view.element(model, field)? {
                let min_occurs = if required { 1 } else { 0 };
                elements.push(format!(r#"<xs:element name="{}" minOccurs="{}"/>"#, name, min_occurs));
            } else {
                let usage = if required { "required" } else { "optional" };
                attributes.push(format!(r#"<xs:attribute name="{}" use="{}"/>"#, name, usage));
            }
        }
        if !elements.is_empty() {
            writeln!(out, "    <xs:sequence>").map_err(fmt_error)?;
            for line in elements {
                writeln!(out, "      {}", line).map_err(fmt_error)?;
            }
            writeln!(out, "    </xs:sequence>").map_err(fmt_error)?;
        }
        for line in attributes {
            writeln!(out, "    {}", line).map_err(fmt_error)?;
        }
        writeln!(out, "  </xs:complexType>").map_err(fmt_error)?;
    }
    writeln!(out, "</xs:schema>").map_err(fmt_error)?;
    Ok(out)
}

// =============================================================================
// active_record
// =============================================================================

fn render_active_record(model: &Repository, element: ElementRef) -> Result<String> {
    let id = entity_of(model, element)?;
    let view = model.view::<RubyClass>(element, RUBY)?;
    let qualified_name = view.qualified_name(model, element)?;
    let mut modules: Vec<&str> = qualified_name.trim_start_matches("::").split("::").collect();
    let classname = modules.pop().unwrap_or_default();

    let mut out = String::new();
    for (depth, module) in modules.iter().enumerate() {
        writeln!(out, "{}module {}", "  ".repeat(depth), module).map_err(fmt_error)?;
    }
    let indent = "  ".repeat(modules.len());
    writeln!(out, "{}class {} < ActiveRecord::Base", indent, classname).map_err(fmt_error)?;
    for module in view.included_modules() {
        writeln!(out, "{}  include {}", indent, module).map_err(fmt_error)?;
    }
    for at in characteristics(model, ContainerRef::Entity(id)) {
        if !model.facet_enabled(at.into(), RUBY) {
            continue;
        }
        let attribute = model.characteristic(at)?;
        if attribute.is_reference() {
            writeln!(out, "{}  belongs_to :{}", indent, crate::naming::underscore(attribute.name()))
                .map_err(fmt_error)?;
        } else if !attribute.nullable() && !attribute.primary_key() {
            writeln!(
                out,
                "{}  validates :{}, presence: true",
                indent,
                crate::naming::underscore(attribute.name())
            )
            .map_err(fmt_error)?;
        }
    }
    writeln!(out, "{}end", indent).map_err(fmt_error)?;
    for depth in (0..modules.len()).rev() {
        writeln!(out, "{}end", "  ".repeat(depth)).map_err(fmt_error)?;
    }
    Ok(out)
}
