//! Tests for comments, documentation and metadata registration.

use syster_model::{ElementKind, Model};

use crate::helpers::model_builders::*;

#[test]
fn test_comment_in_package_annotates_package() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let comment = model.create(ElementKind::Comment);
    model.set_body(comment, Some("/* fuel system */"));
    model.add_owned_member(pkg, comment);

    assert_eq!(model.comments(pkg), &[comment]);
    assert_eq!(model.annotated_elements(comment), &[pkg]);
    assert_eq!(model.body(comment), Some("/* fuel system */"));
}

#[test]
fn test_documentation_of_part_lands_in_documentation() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let engine = member(&mut model, pkg, ElementKind::PartDefinition, "Engine");
    let doc = model.create(ElementKind::Documentation);
    model.add_owned_member(engine, doc);

    assert_eq!(model.documentation(engine), &[doc]);
    assert!(model.comments(engine).is_empty());
    assert!(model.documentation(pkg).is_empty());
}

#[test]
fn test_about_edge_with_explicit_source_annotates_target() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let dependency = model.create(ElementKind::Dependency);
    model.add_owned_member(pkg, dependency);

    let comment = model.create(ElementKind::Comment);
    model.add_owned_member(pkg, comment);
    assert_eq!(model.comments(pkg), &[comment]);

    let about = model.create(ElementKind::Annotation);
    model.set_element(about, Some(dependency));
    model.set_source(about, Some(comment));

    assert_eq!(model.element(about), Some(dependency));
    assert_eq!(model.source(about), Some(comment));
    assert_eq!(model.annotating_element(about), Some(comment));
    assert_eq!(model.annotated_element(about), Some(dependency));
    assert_eq!(model.annotation_edges(comment), &[about]);
    assert_eq!(model.comments(dependency), &[comment]);
    assert!(model.comments(pkg).is_empty());
}

#[test]
fn test_removing_last_about_edge_restores_implicit_target() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let engine = member(&mut model, pkg, ElementKind::PartDefinition, "Engine");
    let comment = model.create(ElementKind::Comment);
    model.add_owned_member(pkg, comment);

    let about = model.create(ElementKind::Annotation);
    model.set_element(about, Some(engine));
    model.set_parent(about, Some(comment));
    assert_eq!(model.comments(engine), &[comment]);
    assert!(model.comments(pkg).is_empty());

    model.destroy(about);
    assert!(model.comments(engine).is_empty());
    assert_eq!(model.comments(pkg), &[comment]);
}

#[test]
fn test_metadata_usage_is_metadata() {
    let mut model = Model::new();
    let pkg = named(&mut model, ElementKind::Package, "P");
    let engine = member(&mut model, pkg, ElementKind::PartDefinition, "Engine");
    let metadata = model.create(ElementKind::MetadataUsage);
    model.add_owned_member(engine, metadata);

    assert_eq!(model.metadata(engine), &[metadata]);
    assert!(model.comments(engine).is_empty());
}

#[test]
fn test_moving_comment_moves_registration() {
    let mut model = Model::new();
    let a = named(&mut model, ElementKind::Package, "A");
    let b = named(&mut model, ElementKind::Package, "B");
    let comment = model.create(ElementKind::Comment);
    let membership = model.add_owned_member(a, comment);

    model.set_parent(membership, Some(b));
    assert!(model.comments(a).is_empty());
    assert_eq!(model.comments(b), &[comment]);

    model.destroy(comment);
    assert!(model.comments(b).is_empty());
}
