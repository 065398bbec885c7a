//! Tests for redefinition: adopted names, implied ordering and shadows.

use syster_model::{ElementId, ElementKind, Model};

use crate::helpers::model_assertions::*;
use crate::helpers::model_builders::*;

struct Fixture {
    derived: ElementId,
    redefined: ElementId,
    redefining: ElementId,
    redefining_membership: ElementId,
}

/// `Base` owns `regular` (short name `short`, ordered); `Derived`
/// specializes `Base` and owns an anonymous feature.
fn fixture(model: &mut Model) -> Fixture {
    let pkg = named(model, ElementKind::Package, "P");
    let base = member(model, pkg, ElementKind::PartDefinition, "Base");
    let derived = member(model, pkg, ElementKind::PartDefinition, "Derived");
    model.specialize(derived, ElementKind::Subclassification, base);

    let redefined = member(model, base, ElementKind::PartUsage, "regular");
    model.set_declared_short_name(redefined, Some("short"));
    model.update_feature_flags(redefined, |flags| flags.ordered = true);

    let redefining = model.create(ElementKind::PartUsage);
    let redefining_membership = model.add_owned_member(derived, redefining);
    Fixture {
        derived,
        redefined,
        redefining,
        redefining_membership,
    }
}

#[test]
fn test_redefinition_round_trip() {
    let mut model = Model::new();
    let f = fixture(&mut model);
    assert_eq!(model.name(f.redefining), None);
    assert!(!model.is_ordered(f.redefining));

    let edge = model.specialize(f.redefining, ElementKind::Redefinition, f.redefined);
    assert_eq!(model.name(f.redefining), Some("regular"));
    assert_eq!(model.short_name(f.redefining), Some("short"));
    assert!(model.is_ordered(f.redefining));
    assert_eq!(
        model.find_member(f.derived, "regular"),
        Some(f.redefining_membership)
    );
    assert_eq!(
        model.find_member(f.derived, "short"),
        Some(f.redefining_membership)
    );
    assert_qualified(&model, f.redefining, "P::Derived::regular");

    assert!(model.remove_heritage(f.redefining, edge));
    assert_eq!(model.name(f.redefining), None);
    assert_eq!(model.short_name(f.redefining), None);
    assert!(!model.is_ordered(f.redefining));
    assert_not_found(&model, f.derived, "regular");
    assert_not_found(&model, f.derived, "short");
    assert!(!model.is_shadowed(f.derived, "regular"));
}

#[test]
fn test_named_redefinition_shadows_inherited_name() {
    let mut model = Model::new();
    let f = fixture(&mut model);
    model.set_declared_name(f.redefining, Some("custom"));
    model.specialize(f.redefining, ElementKind::Redefinition, f.redefined);

    assert_eq!(assert_resolves(&model, f.derived, "custom"), f.redefining);
    assert!(model.is_shadowed(f.derived, "regular"));
    assert!(model.is_shadowed(f.derived, "short"));
    assert!(!model.has_member(f.derived, "regular"));
}

#[test]
fn test_shadow_is_dropped_when_redefining_feature_leaves() {
    let mut model = Model::new();
    let f = fixture(&mut model);
    model.set_declared_name(f.redefining, Some("custom"));
    model.specialize(f.redefining, ElementKind::Redefinition, f.redefined);
    assert!(model.is_shadowed(f.derived, "regular"));

    model.set_parent(f.redefining_membership, None);
    assert!(!model.is_shadowed(f.derived, "regular"));
    assert!(model.reserved_names(f.derived).is_empty());
}

#[test]
fn test_adopted_name_follows_rename_of_redefined() {
    let mut model = Model::new();
    let f = fixture(&mut model);
    model.specialize(f.redefining, ElementKind::Redefinition, f.redefined);

    model.set_declared_name(f.redefined, Some("renamed"));
    assert_eq!(model.name(f.redefining), Some("renamed"));
    assert_eq!(
        model.find_member(f.derived, "renamed"),
        Some(f.redefining_membership)
    );
    assert_not_found(&model, f.derived, "regular");
}
