//! Model construction and completion through the public API

use modelsmith::builtin::RUBY;
use modelsmith::model::{
    Characteristic, CharacteristicContainer, CharacteristicOptions, EnumerationOptions, EnumerationType,
    InheritableCharacteristicContainer, Length, TypeOptions,
};
use modelsmith::{builtin_registry, ElementKind, ElementRef, Facet, FacetRegistry, FacetView, ModelError, Repository};

fn repository() -> Repository {
    Repository::new("Acme", builtin_registry().unwrap())
}

fn names(characteristics: Vec<&Characteristic>) -> Vec<String> {
    characteristics.iter().map(|c| c.name().to_string()).collect()
}

#[test]
fn test_person_employee_inheritance() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    let person = model
        .define_entity(module, "Person", TypeOptions::new().is_abstract(true))
        .unwrap();
    model
        .entity_mut(person)
        .string("name", 50u32, CharacteristicOptions::new())
        .unwrap();
    let employee = model
        .define_entity(module, "Employee", TypeOptions::new().extends("Person"))
        .unwrap();
    model
        .entity_mut(employee)
        .integer("salary", CharacteristicOptions::new())
        .unwrap();

    let entity = model.entity(employee);
    assert_eq!(names(entity.declared_characteristics()), vec!["salary"]);
    assert_eq!(names(entity.inherited_characteristics()), vec!["name"]);

    let name = entity.characteristic_by_name("name").unwrap();
    assert!(name.inherited());
    assert_eq!(name.length(), Some(Length::Chars(50)));
    assert_eq!(name.qualified_name(), "Core.Employee.name");

    assert_eq!(model.entity(person).direct_subtypes(), &[employee]);
    assert_eq!(model.entity(employee).extends(), Some(person));

    model.complete().unwrap();
}

#[test]
fn test_inherited_characteristics_are_a_snapshot() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    let base = model
        .define_entity(module, "Base", TypeOptions::new().is_abstract(true))
        .unwrap();
    model.entity_mut(base).text("code", CharacteristicOptions::new()).unwrap();
    let derived = model
        .define_entity(module, "Derived", TypeOptions::new().extends("Base"))
        .unwrap();

    // Added to the parent after the extension
    model.entity_mut(base).text("label", CharacteristicOptions::new()).unwrap();

    assert!(model.entity(base).characteristic_exists("label"));
    assert!(!model.entity(derived).characteristic_exists("label"));
    assert!(model.entity(derived).characteristic_exists("code"));
}

#[test]
fn test_extend_final_type_fails() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    model
        .define_entity(module, "Closed", TypeOptions::new().is_final(true))
        .unwrap();
    model.define_entity(module, "Plain", TypeOptions::new()).unwrap();

    let err = model
        .define_entity(module, "Sub", TypeOptions::new().extends("Closed"))
        .unwrap_err();
    assert!(matches!(err, ModelError::ExtendFinal { .. }));
    assert_eq!(
        err.to_string(),
        "entity Core.Sub attempting to extend final entity Core.Closed"
    );

    // Neither abstract nor explicitly open means final
    let err = model
        .define_entity(module, "Other", TypeOptions::new().extends("Plain"))
        .unwrap_err();
    assert!(matches!(err, ModelError::ExtendFinal { .. }));

    // A failed extension leaves no half-defined type behind
    assert!(model.entity_by_name(module, "Sub").is_err());
}

#[test]
fn test_duplicate_and_override() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    let base = model
        .define_entity(module, "Base", TypeOptions::new().is_abstract(true))
        .unwrap();
    model.entity_mut(base).text("code", CharacteristicOptions::new()).unwrap();

    let err = model
        .entity_mut(base)
        .text("code", CharacteristicOptions::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "Attempting to redefine attribute 'code' on Core.Base");

    let derived = model
        .define_entity(module, "Derived", TypeOptions::new().extends("Base"))
        .unwrap();
    model
        .entity_mut(derived)
        .integer("code", CharacteristicOptions::new().is_override(true))
        .unwrap();

    let code = model.entity(derived).characteristic_by_name("code").unwrap();
    assert!(!code.inherited());
    assert!(code.is_integer());
    assert_eq!(model.entity(derived).characteristics().len(), 1);
}

#[test]
fn test_struct_inheritance() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    let base = model
        .define_struct(module, "Address", TypeOptions::new().is_abstract(true))
        .unwrap();
    model
        .struct_mut(base)
        .string("street", 80u32, CharacteristicOptions::new())
        .unwrap();
    let postal = model
        .define_struct(module, "PostalAddress", TypeOptions::new().extends("Address"))
        .unwrap();
    model
        .struct_mut(postal)
        .text("postcode", CharacteristicOptions::new())
        .unwrap();

    // Added to the parent after the extension
    model.struct_mut(base).text("city", CharacteristicOptions::new()).unwrap();

    let definition = model.struct_type(postal);
    assert_eq!(names(definition.declared_characteristics()), vec!["postcode"]);
    assert_eq!(names(definition.inherited_characteristics()), vec!["street"]);
    assert!(!definition.characteristic_exists("city"));

    let street = definition.characteristic_by_name("street").unwrap();
    assert!(street.inherited());
    assert_eq!(street.qualified_name(), "Core.PostalAddress.street");

    assert_eq!(model.struct_type(base).direct_subtypes(), &[postal]);
    assert_eq!(model.struct_type(postal).extends(), Some(base));
    assert!(model.struct_type(postal).is_final());

    let err = model
        .define_struct(module, "Label", TypeOptions::new().extends("PostalAddress"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "struct Core.Label attempting to extend final struct Core.PostalAddress"
    );
    assert!(model.struct_by_name(module, "Label").is_err());

    model.complete().unwrap();
}

#[test]
fn test_extend_guards() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    let base = model
        .define_entity(module, "Base", TypeOptions::new().is_abstract(true))
        .unwrap();
    model
        .define_entity(module, "Other", TypeOptions::new().is_abstract(true))
        .unwrap();
    let derived = model
        .define_entity(module, "Derived", TypeOptions::new().extends("Base"))
        .unwrap();

    let err = model.extend_entity(base, "Base").unwrap_err();
    assert!(matches!(err, ModelError::Invalid { .. }));
    assert!(err.to_string().contains("cannot extend itself"));

    let err = model.extend_entity(derived, "Other").unwrap_err();
    assert!(matches!(err, ModelError::Invalid { .. }));
    assert!(err.to_string().contains("already extends"));
    assert_eq!(model.entity(derived).extends(), Some(base));

    let open = model
        .define_struct(module, "Open", TypeOptions::new().is_abstract(true))
        .unwrap();
    let err = model.extend_struct(open, "Open").unwrap_err();
    assert!(matches!(err, ModelError::Invalid { .. }));
    assert!(model.struct_type(open).direct_subtypes().is_empty());
}

#[test]
fn test_failed_synthesized_enumeration_is_discarded() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    let thing = model.define_entity(module, "Thing", TypeOptions::new()).unwrap();
    model.entity_mut(thing).text("Status", CharacteristicOptions::new()).unwrap();

    let err = model
        .entity_mut(thing)
        .i_enum("Status", &["A", "B"], CharacteristicOptions::new())
        .unwrap_err();
    assert!(matches!(err, ModelError::Duplicate { .. }));
    assert!(model.enumeration_by_name(module, "ThingStatus").is_err());
    assert_eq!(model.data_module(module).enumerations().count(), 0);

    // The name is free again
    model
        .entity_mut(thing)
        .s_enum("State", &["Open", "Closed"], CharacteristicOptions::new())
        .unwrap();
    let state = model.enumeration_by_name(module, "ThingState").unwrap();
    assert!(!model.enumeration(state).top_level());
    assert!(model.entity(thing).characteristic_by_name("State").unwrap().is_enumeration());
}

#[test]
fn test_length_only_on_textual_types() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    model
        .define_enumeration(module, "Colour", EnumerationType::Text, EnumerationOptions::values(&["Red", "Yellow"]))
        .unwrap();
    model
        .define_enumeration(module, "Level", EnumerationType::Integer, EnumerationOptions::values(&["Low", "High"]))
        .unwrap();
    let thing = model.define_entity(module, "Thing", TypeOptions::new()).unwrap();

    let mut attributes = model.entity_mut(thing);
    let name = attributes.text("name", CharacteristicOptions::new()).unwrap();
    let colour = attributes.enumeration("colour", "Colour", CharacteristicOptions::new()).unwrap();
    let level = attributes.enumeration("level", "Level", CharacteristicOptions::new()).unwrap();
    let count = attributes.integer("count", CharacteristicOptions::new()).unwrap();
    let err = attributes
        .integer("size", CharacteristicOptions::new().length(10u32))
        .unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { property: "length", .. }));

    assert!(model.characteristic(name).unwrap().allows_length(&model));
    assert!(model.characteristic(colour).unwrap().allows_length(&model));
    assert!(!model.characteristic(level).unwrap().allows_length(&model));
    assert!(!model.characteristic(count).unwrap().allows_length(&model));

    // Textual enumerations take the longest value as their length
    assert_eq!(model.characteristic(colour).unwrap().length(), Some(Length::Chars(6)));

    assert!(model.characteristic_mut(count).set_min_length(1).is_err());
    assert!(model.characteristic_mut(name).set_min_length(1).is_ok());
}

#[test]
fn test_min_length_default() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    let thing = model.define_entity(module, "Thing", TypeOptions::new()).unwrap();
    let mut attributes = model.entity_mut(thing);
    let required = attributes
        .text("code", CharacteristicOptions::new().allow_blank(false))
        .unwrap();
    let optional = attributes.text("notes", CharacteristicOptions::new()).unwrap();
    let explicit = attributes
        .text("label", CharacteristicOptions::new().allow_blank(false).min_length(3))
        .unwrap();

    assert_eq!(model.characteristic(required).unwrap().min_length(), 1);
    assert_eq!(model.characteristic(optional).unwrap().min_length(), 0);
    assert_eq!(model.characteristic(explicit).unwrap().min_length(), 3);
}

#[test]
fn test_referencing_link_name() {
    let mut model = repository();
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
    let model_name = model.entity_mut(car).text("model", CharacteristicOptions::new()).unwrap();

    let owner = model.characteristic(owner).unwrap();
    assert_eq!(owner.referencing_link_name(&model).unwrap(), "ownerId");

    let err = model
        .characteristic(model_name)
        .unwrap()
        .referencing_link_name(&model)
        .unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { .. }));
}

#[test]
fn test_lookup_failures_list_alternatives() {
    let mut model = repository();
    let module = model.define_data_module("Core").unwrap();
    model.define_entity(module, "Person", TypeOptions::new()).unwrap();
    model.define_entity(module, "Place", TypeOptions::new()).unwrap();

    let err = model.entity_by_name(module, "Persn").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Unable to find entity named Persn on Core"));
    assert!(message.contains("Person, Place"));
    assert!(message.contains("Did you mean 'Person'?"));
}

#[test]
fn test_disable_does_not_affect_siblings() {
    let mut model = repository();
    model.enable_facet(ElementRef::Repository, RUBY).unwrap();
    let module = model.define_data_module("Core").unwrap();
    let first = model.define_entity(module, "First", TypeOptions::new()).unwrap();
    let second = model.define_entity(module, "Second", TypeOptions::new()).unwrap();

    model.disable_facet(first.into(), RUBY).unwrap();

    assert!(!model.facet_enabled(first.into(), RUBY));
    assert!(model.facet_enabled(second.into(), RUBY));
    assert!(model.facet_enabled(module.into(), RUBY));
}

// -----------------------------------------------------------------------------
// Completion ordering
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct Seed {
    value: Option<u32>,
}

impl FacetView for Seed {
    fn pre_complete(&mut self, _model: &mut Repository, _element: ElementRef) -> modelsmith::Result<()> {
        self.value.get_or_insert(41);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct Derived {
    observed: Option<u32>,
}

impl FacetView for Derived {
    fn pre_complete(&mut self, model: &mut Repository, element: ElementRef) -> modelsmith::Result<()> {
        let seed = model.view::<Seed>(element, "seed")?;
        self.observed = seed.value.map(|value| value + 1);
        Ok(())
    }
}

#[test]
fn test_later_facet_observes_earlier_completion() {
    let mut registry = FacetRegistry::new();
    registry
        .register(Facet::new("seed").enhance::<Seed>(ElementKind::Entity))
        .unwrap();
    registry
        .register(Facet::new("derived").enhance::<Derived>(ElementKind::Entity))
        .unwrap();

    let mut model = Repository::new("Acme", registry);
    model.enable_facet(ElementRef::Repository, "seed").unwrap();
    model.enable_facet(ElementRef::Repository, "derived").unwrap();
    let module = model.define_data_module("Core").unwrap();
    let entity = model.define_entity(module, "Thing", TypeOptions::new()).unwrap();

    assert_eq!(model.view::<Seed>(entity.into(), "seed").unwrap().value, None);
    model.complete().unwrap();

    assert_eq!(model.view::<Seed>(entity.into(), "seed").unwrap().value, Some(41));
    assert_eq!(
        model.view::<Derived>(entity.into(), "derived").unwrap().observed,
        Some(42)
    );
}

#[test]
fn test_registration_order_is_completion_order() {
    // Registered the other way round, the reader runs before the seed is set
    let mut registry = FacetRegistry::new();
    registry
        .register(Facet::new("derived").enhance::<Derived>(ElementKind::Entity))
        .unwrap();
    registry
        .register(Facet::new("seed").enhance::<Seed>(ElementKind::Entity))
        .unwrap();

    let mut model = Repository::new("Acme", registry);
    model.enable_facet(ElementRef::Repository, "seed").unwrap();
    model.enable_facet(ElementRef::Repository, "derived").unwrap();
    let module = model.define_data_module("Core").unwrap();
    let entity = model.define_entity(module, "Thing", TypeOptions::new()).unwrap();
    model.complete().unwrap();

    assert_eq!(model.view::<Derived>(entity.into(), "derived").unwrap().observed, None);
}
