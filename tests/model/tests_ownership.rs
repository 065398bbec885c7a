//! Tests for parent/owner tracking.

use syster_model::{ElementKind, Model, ModelError, ModelEvent};

use crate::helpers::model_assertions::*;
use crate::helpers::model_builders::*;

#[test]
fn test_membership_registers_name_once_parented() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let engine = named(&mut model, ElementKind::PartDefinition, "Engine");
    let membership = model.create(ElementKind::OwningMembership);
    model.set_element(membership, Some(engine));
    model.set_parent(engine, Some(membership));
    model.set_parent(membership, Some(pkg));

    assert_eq!(model.parent(engine), Some(membership));
    assert_eq!(model.owner(membership), Some(pkg));
    assert_eq!(model.find_member(pkg, "Engine"), Some(membership));

    model.set_parent(engine, None);
    assert_not_found(&model, pkg, "Engine");
}

#[test]
fn test_reparenting_membership_moves_lookup_and_qualified_name() {
    let mut model = Model::new();
    let a = named(&mut model, ElementKind::Package, "A");
    let b = named(&mut model, ElementKind::Package, "B");
    let engine = named(&mut model, ElementKind::PartDefinition, "Engine");
    let membership = model.add_owned_member(a, engine);
    assert_qualified(&model, engine, "A::Engine");

    model.set_parent(membership, Some(b));
    assert_not_found(&model, a, "Engine");
    assert_eq!(assert_resolves(&model, b, "Engine"), engine);
    assert_qualified(&model, engine, "B::Engine");
    assert!(model.owned(a).is_empty());
}

#[test]
fn test_single_parent_invariant() {
    let mut model = Model::new();
    let a = model.create(ElementKind::Package);
    let b = model.create(ElementKind::Package);
    let child = model.create(ElementKind::Package);

    model.set_parent(child, Some(a));
    model.set_parent(child, Some(b));
    model.set_parent(child, Some(b));

    assert!(model.owned(a).is_empty());
    assert_eq!(model.owned(b), &[child]);
}

#[test]
fn test_cycles_are_rejected_without_side_effects() {
    let mut model = Model::new();
    let outer = model.create(ElementKind::Package);
    let inner = model.create(ElementKind::Package);
    model.set_parent(inner, Some(outer));

    assert_eq!(
        model.try_set_parent(outer, Some(inner)),
        Err(ModelError::OwnershipCycle {
            child: outer,
            parent: inner
        })
    );
    assert_eq!(model.parent(outer), None);
    assert!(model.owned(inner).is_empty());
}

#[test]
fn test_owner_events_follow_transitions() {
    let mut model = Model::recording();
    let pkg = model.create(ElementKind::Package);
    let part = model.create(ElementKind::PartDefinition);
    model.take_events();

    let membership = model.add_owned_member(pkg, part);
    let events = model.take_events();
    assert!(events.contains(&ModelEvent::OwnerSet {
        element: part,
        previous: None,
        current: Some(membership),
    }));
    assert!(events.contains(&ModelEvent::OwnerSet {
        element: membership,
        previous: None,
        current: Some(pkg),
    }));
}

#[test]
fn test_destroy_removes_subtree_and_names() {
    let mut model = Model::recording();
    let root = named(&mut model, ElementKind::Package, "Root");
    let pkg = member(&mut model, root, ElementKind::Package, "P");
    let part = member(&mut model, pkg, ElementKind::PartDefinition, "Engine");
    let membership = model.parent(pkg).unwrap();
    model.journal_mut().clear();

    model.destroy(membership);
    assert!(!model.contains(pkg));
    assert!(!model.contains(part));
    assert_not_found(&model, root, "P");
    assert!(model.journal().is_removed(part));
}

#[test]
fn test_reinitialize_keeps_identity_and_parent() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let part = member(&mut model, pkg, ElementKind::PartDefinition, "Engine");
    let nested = member(&mut model, part, ElementKind::PartUsage, "cylinder");
    let membership = model.parent(part);

    model.reinitialize(part, ElementKind::PartDefinition);
    assert!(model.contains(part));
    assert!(!model.contains(nested));
    assert_eq!(model.parent(part), membership);
    assert_eq!(model.name(part), None);

    model.set_declared_name(part, Some("Motor"));
    assert_eq!(assert_resolves(&model, pkg, "Motor"), part);
    assert_qualified(&model, part, "P::Motor");
}
