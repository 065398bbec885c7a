//! Tests for single-valued owned edges: feature values, results and
//! multiplicities.

use syster_model::model::{Bound, MultiplicityBounds, Slot};
use syster_model::{ElementId, ElementKind, Model};

use crate::helpers::model_builders::*;

fn literal_value(model: &mut Model) -> (ElementId, ElementId) {
    let literal = model.create(ElementKind::LiteralInteger);
    let edge = model.create(ElementKind::FeatureValue);
    model.set_element(edge, Some(literal));
    (edge, literal)
}

#[test]
fn test_swapping_value_moves_each_element_once() {
    let mut model = Model::recording();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let mass = member(&mut model, pkg, ElementKind::AttributeUsage, "mass");
    let (e1, x) = literal_value(&mut model);
    let (e2, y) = literal_value(&mut model);

    model.swap_edge_ownership(mass, Slot::Value, Some(e1));
    assert_eq!(model.value(mass), Some(e1));
    assert_eq!(model.value_expression(mass), Some(x));
    assert_eq!(model.owner(e1), Some(mass));

    model.take_events();
    model.swap_edge_ownership(mass, Slot::Value, Some(e2));

    assert_eq!(model.value(mass), Some(e2));
    assert_eq!(model.parent(x), None);
    assert_eq!(model.parent(e1), None);
    assert_eq!(model.parent(y), Some(e2));
    assert_eq!(model.owner(y), Some(e2));
    assert_eq!(model.journal().owner_transitions(x), vec![(Some(e1), None)]);
    assert_eq!(model.journal().owner_transitions(y), vec![(None, Some(e2))]);
    assert_eq!(model.journal().owner_transitions(e2), vec![(None, Some(mass))]);
}

#[test]
fn test_swapping_in_current_edge_records_nothing() {
    let mut model = Model::recording();
    let mass = named(&mut model, ElementKind::AttributeUsage, "mass");
    let (e1, x) = literal_value(&mut model);
    model.swap_edge_ownership(mass, Slot::Value, Some(e1));
    model.take_events();

    model.swap_edge_ownership(mass, Slot::Value, Some(e1));
    assert!(model.take_events().is_empty());
    assert_eq!(model.parent(x), Some(e1));
}

#[test]
fn test_swapping_in_none_empties_slot() {
    let mut model = Model::new();
    let mass = named(&mut model, ElementKind::AttributeUsage, "mass");
    let (e1, x) = literal_value(&mut model);
    model.swap_edge_ownership(mass, Slot::Value, Some(e1));

    model.swap_edge_ownership(mass, Slot::Value, None);
    assert_eq!(model.value(mass), None);
    assert_eq!(model.parent(x), None);
    assert!(model.owned(mass).is_empty());
}

#[test]
fn test_value_binding_flags() {
    let mut model = Model::new();
    let mass = named(&mut model, ElementKind::AttributeUsage, "mass");
    let (edge, _) = literal_value(&mut model);
    model.swap_edge_ownership(mass, Slot::Value, Some(edge));

    assert_eq!(model.value_binding(edge), Some((false, false)));
    model.set_value_binding(edge, true, false);
    assert_eq!(model.value_binding(edge), Some((true, false)));
}

#[test]
fn test_owned_multiplicity_fills_slot() {
    let mut model = Model::new();
    let wheels = named(&mut model, ElementKind::PartUsage, "wheels");
    let range = model.create(ElementKind::MultiplicityRange);
    model.set_bounds(range, MultiplicityBounds::exactly(4));
    let membership = model.add_owned_member(wheels, range);

    assert_eq!(model.multiplicity(wheels), Some(range));
    assert_eq!(model.slot(wheels, Slot::Multiplicity), Some(membership));
    assert!(!model.is(membership, ElementKind::FeatureMembership));
    assert!(model.owned_features(wheels).is_empty());
    assert!(model.input_parameters(wheels).is_empty());
    assert_eq!(
        model.multiplicity_bounds(wheels),
        Some(MultiplicityBounds::exactly(4))
    );
    assert_eq!(
        model.effective_multiplicity(wheels),
        Some(MultiplicityBounds::exactly(4))
    );
}

#[test]
fn test_multiplicity_is_inherited_through_subsetting() {
    let mut model = Model::new();
    let wheels = named(&mut model, ElementKind::PartUsage, "wheels");
    let range = model.create(ElementKind::MultiplicityRange);
    model.set_bounds(range, MultiplicityBounds::range(0, Bound::Infinite));
    model.add_owned_member(wheels, range);

    let spares = named(&mut model, ElementKind::PartUsage, "spares");
    model.specialize(spares, ElementKind::Subsetting, wheels);

    assert_eq!(model.multiplicity(spares), None);
    assert_eq!(
        model.effective_multiplicity(spares),
        Some(MultiplicityBounds::range(0, Bound::Infinite))
    );
}

#[test]
fn test_result_expression_slot() {
    let mut model = Model::new();
    let function = named(&mut model, ElementKind::Function, "area");
    let body = model.create(ElementKind::Expression);
    let edge = model.add_member_as(function, body, ElementKind::ResultExpressionMembership);

    assert_eq!(model.slot(function, Slot::Result), Some(edge));
    assert_eq!(model.result_expression(function), Some(body));
}
