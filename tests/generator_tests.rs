//! End-to-end rendering of the built-in generators

use std::fs;
use std::path::Path;

use modelsmith::builtin::{GRAPHQL, JPA};
use modelsmith::model::{CharacteristicOptions, TypeOptions};
use modelsmith::{
    builtin_registry, Document, ElementRef, Generator, ModelError, Repository, TemplateCatalog,
};

fn completed_model() -> Repository {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/acme.toml");
    let document = Document::load(&path).unwrap();
    let mut model = document.build(builtin_registry().unwrap(), &[]).unwrap();
    model.complete().unwrap();
    model
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

#[test]
fn test_generate_all() {
    let model = completed_model();
    let catalog = TemplateCatalog::builtin();
    let generator = Generator::new(&model, &catalog).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let report = generator.generate::<&str>(dir.path(), &[]).unwrap();
    assert_eq!(report.len(), 7);

    let mut files: Vec<String> = report
        .files
        .iter()
        .map(|f| {
            f.strip_prefix(dir.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec![
            "appconfig/AcmeFeatureFlags.properties",
            "graphql/Acme.graphqls",
            "jpa/Acme/META-INF/persistence.xml",
            "ruby/acme/car.rb",
            "ruby/acme/employee.rb",
            "ruby/acme/person.rb",
            "xml/Acme.xsd",
        ]
    );
}

#[test]
fn test_persistence_unit() {
    let model = completed_model();
    let catalog = TemplateCatalog::builtin();
    let generator = Generator::new(&model, &catalog).unwrap();
    let dir = tempfile::tempdir().unwrap();
    generator.generate(dir.path(), &["jpa"]).unwrap();

    let content = read(dir.path(), "jpa/Acme/META-INF/persistence.xml");
    assert!(content.contains(r#"<persistence-unit name="Acme" transaction-type="JTA">"#));
    assert!(content.contains("<jta-data-source>jdbc/Acme</jta-data-source>"));
    assert!(content.contains("<class>Acme.Person</class> <!-- Person(id, name, born) -->"));
    assert!(content.contains("<class>Acme.Car</class> <!-- Car(id, ownerId, colour) -->"));
    // Contributed by appconfig during completion
    assert!(content.contains(r#"<persistence-unit name="AppConfig" transaction-type="JTA">"#));
}

#[test]
fn test_graphql_schema() {
    let model = completed_model();
    let catalog = TemplateCatalog::builtin();
    let generator = Generator::new(&model, &catalog).unwrap();
    let dir = tempfile::tempdir().unwrap();
    generator.generate(dir.path(), &["graphql"]).unwrap();

    let schema = read(dir.path(), "graphql/Acme.graphqls");
    assert!(schema.starts_with("scalar Date\n"));
    assert!(schema.contains("enum Colour {\n  Red\n  Green\n}\n"));
    assert!(schema.contains("type Car {\n  id: ID!\n  owner: Employee!\n  colour: Colour!\n}\n"));
    assert!(schema.contains(
        "type Employee {\n  id: ID!\n  name: String!\n  born: Date\n  salary: Int\n}\n"
    ));
    assert!(schema.contains("extend type Employee {\n  cars: [Car!]!\n}\n"));
    assert!(schema.contains("type AddressDto {\n  street: String!\n  lines: [String!]\n}\n"));
    // The update query is not exposed
    assert!(schema.contains("type Query {\n  findAllCarsByColour(colour: Colour!): [Car!]!\n}\n"));
}

#[test]
fn test_graphql_declares_struct_types() {
    let mut model = Repository::new("Acme", builtin_registry().unwrap());
    model.enable_facet(ElementRef::Repository, JPA).unwrap();
    model.enable_facet(ElementRef::Repository, GRAPHQL).unwrap();
    let module = model.define_data_module("Acme").unwrap();
    let address = model.define_struct(module, "Address", TypeOptions::new()).unwrap();
    model
        .struct_mut(address)
        .text("street", CharacteristicOptions::new())
        .unwrap();
    model
        .struct_mut(address)
        .date("since", CharacteristicOptions::new().nullable(true))
        .unwrap();
    let person = model.define_entity(module, "Person", TypeOptions::new()).unwrap();
    model
        .entity_mut(person)
        .integer("id", CharacteristicOptions::new().primary_key(true))
        .unwrap();
    model
        .entity_mut(person)
        .structure("home", "Address", CharacteristicOptions::new())
        .unwrap();
    model.complete().unwrap();

    let catalog = TemplateCatalog::builtin();
    let generator = Generator::new(&model, &catalog).unwrap();
    let dir = tempfile::tempdir().unwrap();
    generator.generate(dir.path(), &["graphql"]).unwrap();

    let schema = read(dir.path(), "graphql/Acme.graphqls");
    // Scalars used only by struct fields are declared too
    assert!(schema.starts_with("scalar Date\n"));
    assert!(schema.contains("type Person {\n  id: ID!\n  home: Address!\n}\n"));
    assert!(schema.contains("type Address {\n  street: String!\n  since: Date\n}\n"));
}

#[test]
fn test_feature_flags_and_xsd() {
    let model = completed_model();
    let catalog = TemplateCatalog::builtin();
    let generator = Generator::new(&model, &catalog).unwrap();
    let dir = tempfile::tempdir().unwrap();
    generator.generate(dir.path(), &["appconfig", "xml"]).unwrap();

    assert_eq!(
        read(dir.path(), "appconfig/AcmeFeatureFlags.properties"),
        "# Acme feature flags (ac)\n# Route checkout through the new flow\nnewCheckout=false\n"
    );

    let xsd = read(dir.path(), "xml/Acme.xsd");
    assert!(xsd.contains(r#"<xs:simpleType name="colour">"#));
    assert!(xsd.contains(r#"<xs:enumeration value="Green"/>"#));
    assert!(xsd.contains(concat!(
        "  <xs:complexType name=\"address\">\n",
        "    <xs:sequence>\n",
        "      <xs:element name=\"lines\" minOccurs=\"0\"/>\n",
        "    </xs:sequence>\n",
        "    <xs:attribute name=\"street\" use=\"required\"/>\n",
        "  </xs:complexType>\n",
    )));
}

#[test]
fn test_active_record_models() {
    let model = completed_model();
    let catalog = TemplateCatalog::builtin();
    let generator = Generator::new(&model, &catalog).unwrap();
    let dir = tempfile::tempdir().unwrap();
    generator.generate(dir.path(), &["active_record"]).unwrap();

    assert_eq!(
        read(dir.path(), "ruby/acme/car.rb"),
        concat!(
            "module Acme\n",
            "  class Car < ActiveRecord::Base\n",
            "    belongs_to :owner\n",
            "    validates :colour, presence: true\n",
            "  end\n",
            "end\n",
        )
    );
}

#[test]
fn test_generation_is_repeatable() {
    let model = completed_model();
    let catalog = TemplateCatalog::builtin();
    let generator = Generator::new(&model, &catalog).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let first = generator.generate(dir.path(), &["active_record"]).unwrap();
    let content = read(dir.path(), "ruby/acme/person.rb");
    let second = generator.generate(dir.path(), &["active_record"]).unwrap();

    assert_eq!(first.files, second.files);
    assert_eq!(read(dir.path(), "ruby/acme/person.rb"), content);
}

#[test]
fn test_unknown_generator_writes_nothing() {
    let model = completed_model();
    let catalog = TemplateCatalog::builtin();
    let generator = Generator::new(&model, &catalog).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let err = generator.generate(dir.path(), &["jpa", "sql"]).unwrap_err();
    assert!(matches!(err, ModelError::NotFound { kind: "generator", .. }));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
