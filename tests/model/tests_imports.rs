//! Tests for membership and namespace imports.

use syster_model::model::{MemberEntry, Visibility};
use syster_model::{ElementId, ElementKind, Model};

use crate::helpers::model_assertions::*;
use crate::helpers::model_builders::*;

fn import_namespace(model: &mut Model, into: ElementId, namespace: ElementId) -> ElementId {
    let import = model.create(ElementKind::NamespaceImport);
    model.set_element(import, Some(namespace));
    model.set_parent(import, Some(into));
    import
}

#[test]
fn test_membership_import_tracks_imported_name() {
    let mut model = Model::new();
    let lib = named(&mut model, ElementKind::Package, "Lib");
    let engine = member(&mut model, lib, ElementKind::PartDefinition, "Engine");
    let engine_m = model.find_member(lib, "Engine").unwrap();
    let user = named(&mut model, ElementKind::Package, "User");

    let import = model.create(ElementKind::MembershipImport);
    model.set_parent(import, Some(user));
    model.set_element(import, Some(engine_m));
    assert_eq!(model.imports(user), vec![import]);
    assert_eq!(assert_resolves(&model, user, "Engine"), engine);

    model.set_declared_name(engine, Some("Motor"));
    assert_not_found(&model, user, "Engine");
    assert_eq!(assert_resolves(&model, user, "Motor"), engine);
    // Importing does not change qualification.
    assert_qualified(&model, engine, "Lib::Motor");
}

#[test]
fn test_retargeted_membership_import_drops_previous_entry() {
    let mut model = Model::new();
    let lib = named(&mut model, ElementKind::Package, "Lib");
    let engine = member(&mut model, lib, ElementKind::PartDefinition, "Engine");
    let gearbox = member(&mut model, lib, ElementKind::PartDefinition, "Gearbox");
    let engine_m = model.find_member(lib, "Engine").unwrap();
    let gearbox_m = model.find_member(lib, "Gearbox").unwrap();
    let user = named(&mut model, ElementKind::Package, "User");

    let import = model.create(ElementKind::MembershipImport);
    model.set_parent(import, Some(user));
    model.set_element(import, Some(engine_m));
    assert_eq!(assert_resolves(&model, user, "Engine"), engine);

    model.set_element(import, Some(gearbox_m));
    assert_not_found(&model, user, "Engine");
    assert_eq!(assert_resolves(&model, user, "Gearbox"), gearbox);

    model.set_element(import, None);
    assert_not_found(&model, user, "Gearbox");
    assert!(!model.has_member(user, "Engine"));

    model.set_element(import, Some(engine_m));
    model.destroy(engine_m);
    assert!(!model.has_member(user, "Engine"));
    assert_eq!(model.lookup_entry(user, "Engine"), None);
}

#[test]
fn test_unlinked_membership_import_is_a_placeholder() {
    let mut model = Model::new();
    let user = named(&mut model, ElementKind::Package, "User");
    let import = model.create(ElementKind::MembershipImport);
    model.set_imported_name(import, Some("Engine"));
    model.set_parent(import, Some(user));

    assert_eq!(
        model.lookup_entry(user, "Engine"),
        Some(MemberEntry::UnresolvedImport(import))
    );
    assert!(model.has_member(user, "Engine"));
    assert_not_found(&model, user, "Engine");

    model.set_parent(import, None);
    assert!(!model.has_member(user, "Engine"));
}

#[test]
fn test_namespace_import_respects_visibility() {
    let mut model = Model::new();
    let lib = named(&mut model, ElementKind::Package, "Lib");
    member(&mut model, lib, ElementKind::PartDefinition, "Engine");
    member(&mut model, lib, ElementKind::PartDefinition, "Internal");
    let engine_m = model.find_member(lib, "Engine").unwrap();
    let internal_m = model.find_member(lib, "Internal").unwrap();
    model.set_visibility(internal_m, Visibility::Private);

    let user = named(&mut model, ElementKind::Package, "User");
    let import = import_namespace(&mut model, user, lib);
    assert!(model.is_namespace_import(import));
    assert_eq!(model.imported_namespace(import), Some(lib));
    assert_eq!(model.imported_memberships(user), vec![engine_m]);

    model.set_import_all(import, true);
    assert_eq!(model.imported_memberships(user), vec![engine_m, internal_m]);
}

#[test]
fn test_public_imports_are_reexported() {
    let mut model = Model::new();
    let lib = named(&mut model, ElementKind::Package, "Lib");
    member(&mut model, lib, ElementKind::PartDefinition, "Engine");
    let engine_m = model.find_member(lib, "Engine").unwrap();

    let facade = named(&mut model, ElementKind::Package, "Facade");
    let reexport = import_namespace(&mut model, facade, lib);
    let user = named(&mut model, ElementKind::Package, "User");
    import_namespace(&mut model, user, facade);

    assert_eq!(model.imported_memberships(user), vec![engine_m]);

    model.set_visibility(reexport, Visibility::Private);
    assert!(model.imported_memberships(user).is_empty());
    assert_eq!(model.imported_memberships(facade), vec![engine_m]);
}

#[test]
fn test_recursive_import_reaches_nested_members() {
    let mut model = Model::new();
    let lib = named(&mut model, ElementKind::Package, "Lib");
    let nested = member(&mut model, lib, ElementKind::Package, "Nested");
    member(&mut model, nested, ElementKind::PartDefinition, "Deep");
    let nested_m = model.find_member(lib, "Nested").unwrap();
    let deep_m = model.find_member(nested, "Deep").unwrap();

    let user = named(&mut model, ElementKind::Package, "User");
    let import = import_namespace(&mut model, user, lib);
    assert_eq!(model.imported_memberships(user), vec![nested_m]);

    model.set_recursive(import, true);
    assert_eq!(model.imported_memberships(user), vec![nested_m, deep_m]);
}

#[test]
fn test_visible_memberships_lists_owned_first() {
    let mut model = Model::new();
    let lib = named(&mut model, ElementKind::Package, "Lib");
    member(&mut model, lib, ElementKind::PartDefinition, "Engine");
    let engine_m = model.find_member(lib, "Engine").unwrap();

    let user = named(&mut model, ElementKind::Package, "User");
    member(&mut model, user, ElementKind::PartDefinition, "Vehicle");
    let vehicle_m = model.find_member(user, "Vehicle").unwrap();
    import_namespace(&mut model, user, lib);

    assert_eq!(model.visible_memberships(user), vec![vehicle_m, engine_m]);
}
