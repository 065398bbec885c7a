//! Tests for names, qualified names and the member lookup table.

use rstest::rstest;
use smol_str::SmolStr;
use syster_model::model::MemberEntry;
use syster_model::{ElementKind, Model};

use crate::helpers::model_assertions::*;
use crate::helpers::model_builders::*;

#[rstest]
#[case("Engine", "Engine")]
#[case("'Rear Axle'", "Rear Axle")]
#[case("'it\\'s'", "it's")]
fn test_declared_names_are_sanitized(#[case] written: &str, #[case] expected: &str) {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let part = member(&mut model, pkg, ElementKind::PartDefinition, written);

    assert_eq!(model.declared_name(part), Some(written));
    assert_eq!(model.name(part), Some(expected));
    assert_eq!(assert_resolves(&model, pkg, expected), part);
}

#[test]
fn test_rename_updates_lookup_and_subtree() {
    let mut model = Model::new();
    let root = named(&mut model, ElementKind::Package, "Root");
    let vehicle = member(&mut model, root, ElementKind::PartDefinition, "Vehicle");
    let engine = member(&mut model, vehicle, ElementKind::PartUsage, "engine");
    let cylinder = member(&mut model, engine, ElementKind::PartUsage, "cylinder");
    assert_qualified(&model, cylinder, "Root::Vehicle::engine::cylinder");

    model.set_declared_name(vehicle, Some("Car"));
    assert_not_found(&model, root, "Vehicle");
    assert_eq!(assert_resolves(&model, root, "Car"), vehicle);
    assert_qualified(&model, engine, "Root::Car::engine");
    assert_qualified(&model, cylinder, "Root::Car::engine::cylinder");
}

#[test]
fn test_anonymous_segment_breaks_qualification() {
    let mut model = Model::new();
    let root = named(&mut model, ElementKind::Package, "Root");
    let anonymous = model.create(ElementKind::PartDefinition);
    model.add_owned_member(root, anonymous);
    let inner = member(&mut model, anonymous, ElementKind::PartUsage, "inner");

    assert_eq!(model.qualified_name(anonymous), None);
    assert_eq!(model.qualified_name(inner), None);

    model.set_declared_name(anonymous, Some("Named"));
    assert_qualified(&model, inner, "Root::Named::inner");
}

#[test]
fn test_short_name_is_a_lookup_key() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let req = named(&mut model, ElementKind::RequirementDefinition, "MassLimit");
    model.set_declared_short_name(req, Some("R1"));
    model.add_owned_member(pkg, req);

    assert_eq!(assert_resolves(&model, pkg, "R1"), req);
    assert_eq!(assert_resolves(&model, pkg, "MassLimit"), req);
    assert_eq!(
        model.reserved_names(pkg),
        vec![SmolStr::new("MassLimit"), SmolStr::new("R1")]
    );
}

#[test]
fn test_first_registrant_keeps_slot_until_removed() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let first = member(&mut model, pkg, ElementKind::PartDefinition, "Dup");
    let second = member(&mut model, pkg, ElementKind::PartDefinition, "Dup");
    let third = member(&mut model, pkg, ElementKind::PartDefinition, "Dup");
    assert_eq!(assert_resolves(&model, pkg, "Dup"), first);

    // The slot passes to the next same-named member in ownership order.
    let first_membership = model.parent(first).unwrap();
    model.destroy(first_membership);
    assert_eq!(assert_resolves(&model, pkg, "Dup"), second);

    model.set_declared_name(second, Some("Unique"));
    assert_eq!(assert_resolves(&model, pkg, "Unique"), second);
    assert_eq!(assert_resolves(&model, pkg, "Dup"), third);
}

#[test]
fn test_membership_alias_registers_instead_of_element_name() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let engine = named(&mut model, ElementKind::PartDefinition, "Engine");
    let alias = model.create(ElementKind::Membership);
    model.set_declared_name(alias, Some("Motor"));
    model.set_element(alias, Some(engine));
    model.set_parent(alias, Some(pkg));

    assert_eq!(model.find_member(pkg, "Motor"), Some(alias));
    assert_not_found(&model, pkg, "Engine");
    // A referencing membership does not own its element.
    assert_eq!(model.parent(engine), None);
    assert!(model.owned_members(pkg).is_empty());
    assert_eq!(model.members(pkg), vec![engine]);
}

#[test]
fn test_lookup_entries_are_pure_table_reads() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let part = member(&mut model, pkg, ElementKind::PartDefinition, "Engine");
    let membership = model.parent(part).unwrap();

    assert_eq!(
        model.lookup_entry(pkg, "Engine"),
        Some(MemberEntry::Membership(membership))
    );
    assert_eq!(model.lookup_entry(pkg, "engine"), None);
    assert!(model.has_member(pkg, "Engine"));
    assert!(!model.is_shadowed(pkg, "Engine"));
    assert_eq!(model.named_members(pkg).len(), 1);
}
