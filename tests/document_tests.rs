//! Building repositories from schema documents

use std::path::{Path, PathBuf};

use modelsmith::builtin::{APPCONFIG, GRAPHQL, JPA, RUBY};
use modelsmith::builtin::appconfig::AppconfigRepository;
use modelsmith::model::{
    CharacteristicContainer, EnumerationType, InheritableCharacteristicContainer, Length,
};
use modelsmith::{builtin_registry, Document, ElementRef, ModelError};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn test_build_toml_fixture() {
    let document = Document::load(&fixture("acme.toml")).unwrap();
    let mut model = document.build(builtin_registry().unwrap(), &[]).unwrap();

    let module = model.data_module_by_name("Acme").unwrap();
    let employee = model.entity_by_name(module, "Employee").unwrap();
    let person = model.entity_by_name(module, "Person").unwrap();
    let car = model.entity_by_name(module, "Car").unwrap();

    // Subtype listed before its parent in the document
    assert_eq!(model.entity(employee).extends(), Some(person));
    let inherited: Vec<&str> = model
        .entity(employee)
        .inherited_characteristics()
        .iter()
        .map(|c| c.name())
        .collect();
    assert_eq!(inherited, vec!["id", "name", "born"]);

    // Forward reference to a type defined later
    let owner = model.entity(car).attribute_by_name("owner").unwrap();
    assert_eq!(owner.referenced_entity().unwrap(), employee);
    assert_eq!(owner.referencing_link_name(&model).unwrap(), "ownerId");

    for facet in [JPA, APPCONFIG, GRAPHQL] {
        assert!(model.facet_enabled(car.into(), facet));
    }

    let flags = model
        .view::<AppconfigRepository>(ElementRef::Repository, APPCONFIG)
        .unwrap();
    let flag = flags.feature_flag_by_name("newCheckout").unwrap();
    assert!(!flag.initial_value());
    assert_eq!(flag.key_value(), "newCheckout");

    model.complete().unwrap();
}

#[test]
fn test_build_json_fixture() {
    let document = Document::load(&fixture("library.json")).unwrap();
    let model = document.build(builtin_registry().unwrap(), &[]).unwrap();

    let module = model.data_module_by_name("Catalog").unwrap();
    let book = model.entity_by_name(module, "Book").unwrap();
    let author = model.entity_by_name(module, "Author").unwrap();
    let entity = model.entity(book);

    assert_eq!(entity.attribute_by_name("title").unwrap().length(), Some(Length::Max));

    // Unnamed references take the referenced type's name
    let reference = entity.attribute_by_name("Author").unwrap();
    assert_eq!(reference.referenced_entity().unwrap(), author);

    let status = model.enumeration_by_name(module, "BookStatus").unwrap();
    assert_eq!(model.enumeration(status).enumeration_type(), EnumerationType::Text);
    assert!(!model.enumeration(status).top_level());
    assert_eq!(
        entity.attribute_by_name("Status").unwrap().length(),
        Some(Length::Chars(7))
    );

    let name = model.entity(author).attribute_by_name("name").unwrap();
    assert_eq!(name.min_length(), 1);

    assert!(model.facet_enabled(book.into(), RUBY));
    assert!(!model.facet_enabled(author.into(), RUBY));
    let at = model.characteristic_ref(book.into(), "Author").unwrap();
    assert!(!model.facet_enabled(at.into(), RUBY));
    let at = model.characteristic_ref(book.into(), "title").unwrap();
    assert!(model.facet_enabled(at.into(), RUBY));
}

#[test]
fn test_unknown_reference_lists_types() {
    let document = Document::from_toml_str(
        r#"
name = "Acme"

[[data_modules]]
name = "Core"

[[data_modules.entities]]
name = "Car"

[[data_modules.entities.attributes]]
name = "owner"
type = "reference"
references = "Persn"

[[data_modules.entities]]
name = "Person"
"#,
    )
    .unwrap();

    let err = document.build(builtin_registry().unwrap(), &[]).unwrap_err();
    assert!(matches!(err, ModelError::NotFound { kind: "entity", .. }));
    assert!(err.to_string().contains("Did you mean 'Person'?"));
}

#[test]
fn test_qualified_parent_in_other_module() {
    let document = Document::from_toml_str(
        r#"
name = "Acme"

[[data_modules]]
name = "Billing"

[[data_modules.entities]]
name = "Customer"
extends = "Core.Party"

[[data_modules]]
name = "Core"

[[data_modules.entities]]
name = "Party"
abstract = true

[[data_modules.entities.attributes]]
name = "id"
type = "integer"
primary_key = true
"#,
    )
    .unwrap();

    let model = document.build(builtin_registry().unwrap(), &[]).unwrap();
    let billing = model.data_module_by_name("Billing").unwrap();
    let core = model.data_module_by_name("Core").unwrap();
    let customer = model.entity_by_name(billing, "Customer").unwrap();
    let party = model.entity_by_name(core, "Party").unwrap();

    assert_eq!(model.entity(customer).extends(), Some(party));
    assert_eq!(model.entity_by_name(billing, "Core.Party").unwrap(), party);
    let inherited: Vec<&str> = model
        .entity(customer)
        .inherited_characteristics()
        .iter()
        .map(|c| c.name())
        .collect();
    assert_eq!(inherited, vec!["id"]);
}

#[test]
fn test_unknown_facet_fails() {
    let document = Document::from_toml_str("name = \"Acme\"\nfacets = [\"soap\"]\n").unwrap();
    let err = document.build(builtin_registry().unwrap(), &[]).unwrap_err();
    assert!(matches!(err, ModelError::NotFound { kind: "facet", .. }));
}

#[test]
fn test_malformed_document() {
    let err = Document::from_toml_str("name = \"Acme\"\n[[data_modules]]\n").unwrap_err();
    assert!(matches!(err, ModelError::Toml(_)));

    let err = Document::from_json_str("{\"name\": 3}").unwrap_err();
    assert!(matches!(err, ModelError::Json(_)));
}
