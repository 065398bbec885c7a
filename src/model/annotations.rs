//! Annotation collections and annotating-element registration.
//!
//! An annotating element (comment, documentation, textual representation,
//! metadata) annotates the targets of its `Annotation` edges, or its parent
//! when it has none. Registration is recomputed as a whole whenever the
//! element's owner, one of its edges, or an edge target changes; only the
//! difference to the previous registration touches the target collections.

use smol_str::SmolStr;
use tracing::trace;

use super::{Annotations, Cleanup, ElementKind, Model};
use crate::base::ElementId;

impl Model {
    pub fn annotations(&self, id: ElementId) -> Option<&Annotations> {
        self.get(id).map(|e| &e.annotations)
    }

    pub fn comments(&self, id: ElementId) -> &[ElementId] {
        self.annotations(id).map_or(&[], Annotations::comments)
    }

    pub fn documentation(&self, id: ElementId) -> &[ElementId] {
        self.annotations(id).map_or(&[], Annotations::documentation)
    }

    pub fn metadata(&self, id: ElementId) -> &[ElementId] {
        self.annotations(id).map_or(&[], Annotations::metadata)
    }

    pub fn textual_representations(&self, id: ElementId) -> &[ElementId] {
        self.annotations(id)
            .map_or(&[], Annotations::textual_representations)
    }

    /// Add `annotating` to the matching collection of `target`. Returns
    /// false if it was already there or is not an annotating element.
    pub fn add_annotation(&mut self, target: ElementId, annotating: ElementId) -> bool {
        let Some(kind) = self.kind(annotating) else {
            return false;
        };
        let Some(collection) = self
            .get_mut(target)
            .and_then(|t| t.annotations.collection_mut(kind))
        else {
            return false;
        };
        if collection.contains(&annotating) {
            return false;
        }
        collection.push(annotating);
        true
    }

    /// Remove `annotating` from `target`. Returns false if it was absent.
    pub fn remove_annotation(&mut self, target: ElementId, annotating: ElementId) -> bool {
        let Some(kind) = self.kind(annotating) else {
            // Already destroyed.
            return self
                .get_mut(target)
                .is_some_and(|t| t.annotations.remove_everywhere(annotating));
        };
        let Some(collection) = self
            .get_mut(target)
            .and_then(|t| t.annotations.collection_mut(kind))
        else {
            return false;
        };
        let before = collection.len();
        collection.retain(|&c| c != annotating);
        before != collection.len()
    }

    // ── Annotating elements ─────────────────────────────────────────

    pub fn body(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.body()
    }

    pub fn set_body(&mut self, id: ElementId, body: Option<&str>) {
        if let Some(data) = self.annotating_mut(id) {
            data.body = body.map(SmolStr::new);
        }
    }

    pub fn language(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.language()
    }

    pub fn set_language(&mut self, id: ElementId, language: Option<&str>) {
        if let Some(data) = self.annotating_mut(id) {
            data.language = language.map(SmolStr::new);
        }
    }

    /// Annotation edges registered with `annotating`.
    pub fn annotation_edges(&self, annotating: ElementId) -> &[ElementId] {
        self.annotating(annotating)
            .map_or(&[], |d| d.annotations.as_slice())
    }

    /// Elements whose collections currently list `annotating` because of
    /// its edges or its parent.
    pub fn annotated_elements(&self, annotating: ElementId) -> &[ElementId] {
        self.annotating(annotating)
            .map_or(&[], |d| d.registered.as_slice())
    }

    /// Annotating side of an Annotation edge: its explicit source, its owner
    /// or its owned target, whichever is an annotating element.
    pub fn annotating_element(&self, edge: ElementId) -> Option<ElementId> {
        let annotating =
            |id: Option<ElementId>| id.filter(|&e| self.is(e, ElementKind::AnnotatingElement));
        annotating(self.explicit_source(edge))
            .or_else(|| annotating(self.owner(edge)))
            .or_else(|| {
                annotating(self.element(edge).filter(|_| self.owns_target(edge)))
            })
    }

    /// Annotated side of an Annotation edge: its target, else a
    /// non-annotating owner.
    pub fn annotated_element(&self, edge: ElementId) -> Option<ElementId> {
        if let Some(target) = self.element(edge)
            && !self.owns_target(edge)
        {
            return Some(target);
        }
        self.owner(edge)
            .filter(|&o| !self.is(o, ElementKind::AnnotatingElement))
    }

    pub(crate) fn refresh_annotation_edge(&mut self, edge: ElementId) {
        let Some(rel) = self.rel(edge) else {
            return;
        };
        let previous = rel.attached_to;
        let current = self.annotating_element(edge);
        if previous != current {
            if let Some(data) = previous.and_then(|p| self.annotating_mut(p)) {
                data.annotations.retain(|&e| e != edge);
            }
            if let Some(rel) = self.rel_mut(edge) {
                rel.attached_to = current;
            }
            if let Some(data) = current.and_then(|c| self.annotating_mut(c))
                && !data.annotations.contains(&edge)
            {
                data.annotations.push(edge);
            }
        }
        for annotating in [previous, current].into_iter().flatten() {
            self.refresh_annotation_targets(annotating);
        }
    }

    fn implicit_annotated_element(&self, annotating: ElementId) -> Option<ElementId> {
        let parent = self.parent(annotating)?;
        if self.is(parent, ElementKind::Membership) && self.element(parent) == Some(annotating) {
            self.owner(parent)
        } else {
            Some(parent)
        }
    }

    /// Recompute which elements list `annotating`.
    pub(crate) fn refresh_annotation_targets(&mut self, annotating: ElementId) {
        let Some(data) = self.annotating(annotating) else {
            return;
        };
        let previous = data.registered.clone();
        let mut targets = Vec::new();
        if data.annotations.is_empty() {
            targets.extend(self.implicit_annotated_element(annotating));
        } else {
            for &edge in &data.annotations {
                if let Some(target) = self.annotated_element(edge)
                    && !targets.contains(&target)
                {
                    targets.push(target);
                }
            }
        }
        targets.retain(|&t| t != annotating && self.contains(t));
        if targets == previous {
            return;
        }

        for &old in previous.iter().filter(|t| !targets.contains(t)) {
            self.remove_annotation(old, annotating);
        }
        let own_document = self.document_of(annotating);
        for &new in targets.iter().filter(|t| !previous.contains(t)) {
            self.add_annotation(new, annotating);
            if let Some(document) = own_document
                && self.document_of(new).is_some_and(|d| d != document)
            {
                self.register_cleanup(
                    document,
                    Cleanup::RetractAnnotation {
                        target: new,
                        annotating,
                    },
                );
            }
        }
        trace!(annotating = %annotating, ?targets, "annotation targets");
        if let Some(data) = self.annotating_mut(annotating) {
            data.registered = targets;
        }
    }

    /// Remove `annotating` from everything it is registered with.
    pub(crate) fn retract_annotating(&mut self, annotating: ElementId) {
        let Some(data) = self.annotating_mut(annotating) else {
            return;
        };
        let registered = std::mem::take(&mut data.registered);
        for target in registered {
            self.remove_annotation(target, annotating);
        }
    }

    /// Forget `target` in the registrations of its annotating elements.
    pub(crate) fn drop_annotations_of(&mut self, target: ElementId) {
        let Some(annotations) = self.annotations(target) else {
            return;
        };
        let annotating: Vec<_> = annotations
            .comments()
            .iter()
            .chain(annotations.documentation())
            .chain(annotations.metadata())
            .chain(annotations.textual_representations())
            .copied()
            .collect();
        for a in annotating {
            if let Some(data) = self.annotating_mut(a) {
                data.registered.retain(|&t| t != target);
            }
        }
    }
}
