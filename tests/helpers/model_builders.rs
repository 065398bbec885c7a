//! Builders for small models.

use syster_model::model::QualifiedNameIndex;
use syster_model::{ElementId, ElementKind, Model};

/// Create an element with a declared name.
pub fn named(model: &mut Model, kind: ElementKind, name: &str) -> ElementId {
    let id = model.create(kind);
    model.set_declared_name(id, Some(name));
    id
}

/// Create a named element and add it to `namespace` through an owning
/// membership. Returns the element.
pub fn member(model: &mut Model, namespace: ElementId, kind: ElementKind, name: &str) -> ElementId {
    let id = named(model, kind, name);
    model.add_owned_member(namespace, id);
    id
}

/// Create an end feature owned by `ty`.
pub fn end_feature(model: &mut Model, ty: ElementId) -> ElementId {
    let end = model.create(ElementKind::Feature);
    model.add_member_as(ty, end, ElementKind::EndFeatureMembership);
    end
}

/// Create a root package `name` holding `members`, each `(kind, name)`.
/// Returns the package.
pub fn library_package(model: &mut Model, name: &str, members: &[(ElementKind, &str)]) -> ElementId {
    let package = named(model, ElementKind::LibraryPackage, name);
    for &(kind, member_name) in members {
        member(model, package, kind, member_name);
    }
    package
}

/// A slice of the KerML library used by implicit generalization tests,
/// plus an index over it.
pub fn kernel_library(model: &mut Model) -> QualifiedNameIndex {
    library_package(
        model,
        "Base",
        &[
            (ElementKind::Classifier, "Anything"),
            (ElementKind::DataType, "DataValue"),
            (ElementKind::Feature, "things"),
            (ElementKind::Feature, "dataValues"),
        ],
    );
    library_package(
        model,
        "Occurrences",
        &[
            (ElementKind::Class, "Occurrence"),
            (ElementKind::Feature, "occurrences"),
        ],
    );
    library_package(
        model,
        "Objects",
        &[
            (ElementKind::Structure, "Object"),
            (ElementKind::Feature, "objects"),
            (ElementKind::Feature, "linkObjects"),
            (ElementKind::Feature, "binaryLinkObjects"),
        ],
    );
    let links = library_package(
        model,
        "Links",
        &[
            (ElementKind::Association, "Link"),
            (ElementKind::Association, "BinaryLink"),
            (ElementKind::Feature, "links"),
            (ElementKind::Feature, "binaryLinks"),
        ],
    );
    if let Some(link) = model.find_member(links, "Link").and_then(|m| model.element(m)) {
        member(model, link, ElementKind::Feature, "participant");
    }
    model.library_snapshot()
}
