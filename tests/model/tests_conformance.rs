//! Tests for heritage lists and conformance.

use rstest::rstest;
use syster_model::{ElementKind, Model};

use crate::helpers::model_assertions::*;
use crate::helpers::model_builders::*;

#[test]
fn test_conformance_is_transitive() {
    let mut model = Model::new();
    let a = named(&mut model, ElementKind::Class, "A");
    let b = named(&mut model, ElementKind::Class, "B");
    let c = named(&mut model, ElementKind::Class, "C");
    model.specialize(a, ElementKind::Subclassification, b);
    model.specialize(b, ElementKind::Subclassification, c);

    assert_conforms(&model, a, &[a, b, c]);
    assert!(!model.conforms(c, a));
    assert_eq!(model.all_supertypes(a), vec![b, c]);
}

#[test]
fn test_cyclic_heritage_terminates() {
    let mut model = Model::new();
    let a = named(&mut model, ElementKind::Class, "A");
    let b = named(&mut model, ElementKind::Class, "B");
    let unrelated = named(&mut model, ElementKind::Class, "X");
    model.specialize(a, ElementKind::Subclassification, b);
    model.specialize(b, ElementKind::Subclassification, a);

    assert!(model.conforms(a, b));
    assert!(model.conforms(b, a));
    assert!(!model.conforms(a, unrelated));
    assert_eq!(model.all_supertypes(a), vec![b]);
}

#[test]
fn test_removing_heritage_breaks_conformance() {
    let mut model = Model::new();
    let a = named(&mut model, ElementKind::Class, "A");
    let b = named(&mut model, ElementKind::Class, "B");
    let edge = model.specialize(a, ElementKind::Subclassification, b);
    assert!(model.conforms(a, b));

    assert!(model.remove_heritage(a, edge));
    assert!(!model.remove_heritage(a, edge));
    assert!(!model.conforms(a, b));
    assert!(model.heritage(a).is_empty());
}

#[test]
fn test_explicit_source_moves_edge_between_types() {
    let mut model = Model::new();
    let a = named(&mut model, ElementKind::Class, "A");
    let b = named(&mut model, ElementKind::Class, "B");
    let general = named(&mut model, ElementKind::Class, "G");
    let edge = model.specialize(a, ElementKind::Subclassification, general);

    model.set_source(edge, Some(b));
    assert!(model.heritage(a).is_empty());
    assert_eq!(model.heritage(b), &[edge]);
    assert!(model.conforms(b, general));
    assert!(!model.conforms(a, general));
}

#[test]
fn test_conforms_to_named_uses_qualified_names() {
    let mut model = Model::new();
    let base = library_package(&mut model, "Base", &[(ElementKind::Classifier, "Anything")]);
    let anything = assert_resolves(&model, base, "Anything");
    let pkg = named(&mut model, ElementKind::Package, "P");
    let vehicle = member(&mut model, pkg, ElementKind::Class, "Vehicle");
    model.specialize(vehicle, ElementKind::Subclassification, anything);

    assert!(model.conforms_to_named(vehicle, "Base::Anything"));
    assert!(model.conforms_to_named(vehicle, "P::Vehicle"));
    assert!(!model.conforms_to_named(vehicle, "Base::DataValue"));
}

#[test]
fn test_conjugation_is_heritage() {
    let mut model = Model::new();
    let port = named(&mut model, ElementKind::PortDefinition, "FuelPort");
    let conjugate = named(&mut model, ElementKind::PortDefinition, "~FuelPort");
    model.specialize(conjugate, ElementKind::Conjugation, port);

    assert!(model.is_conjugated(conjugate));
    assert!(!model.is_conjugated(port));
    assert_eq!(model.conjugated_type(conjugate), Some(port));
    assert!(model.conforms(conjugate, port));
}

#[rstest]
#[case(ElementKind::Unioning)]
#[case(ElementKind::Intersecting)]
#[case(ElementKind::Differencing)]
#[case(ElementKind::Disjoining)]
fn test_type_relationships_are_not_heritage(#[case] kind: ElementKind) {
    let mut model = Model::new();
    let a = named(&mut model, ElementKind::Class, "A");
    let b = named(&mut model, ElementKind::Class, "B");
    let edge = model.relate(a, kind, b);

    assert_eq!(model.type_relationships(a), &[edge]);
    assert_eq!(model.related_types(a, kind), vec![b]);
    assert!(model.heritage(a).is_empty());
    assert!(!model.conforms(a, b));
}
