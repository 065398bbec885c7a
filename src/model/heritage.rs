//! Heritage edges, non-heritage type relationships, and conformance.
//!
//! An edge is attached to the type named by its explicit source, or to its
//! owner when there is none. Attaching and detaching are driven entirely
//! from the relationship hooks, so `add_heritage` and `remove_heritage`
//! are thin wrappers over ownership and the lists stay consistent under
//! `set_parent`, `set_source`, `destroy` and `reinitialize` alike.
//!
//! Conformance walks the live graph; nothing is memoized across mutation.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::{ElementKind, Model, ModelError, ModelEvent, ModelResult};
use crate::base::ElementId;

impl Model {
    /// Inheritance-family edges of `ty`, in declaration order.
    pub fn heritage(&self, ty: ElementId) -> &[ElementId] {
        self.ty(ty).map_or(&[], |t| t.heritage.as_slice())
    }

    /// Unioning, intersecting, differencing, disjoining, chaining,
    /// inverting and featuring edges of `ty`.
    pub fn type_relationships(&self, ty: ElementId) -> &[ElementId] {
        self.ty(ty).map_or(&[], |t| t.type_relationships.as_slice())
    }

    /// Attach an existing heritage edge to `ty`. Adding it twice is a no-op.
    pub fn try_add_heritage(&mut self, ty: ElementId, edge: ElementId) -> ModelResult<()> {
        self.require_kind(ty, ElementKind::Type)?;
        self.require_kind(edge, ElementKind::Inheritance)?;
        self.try_set_parent(edge, Some(ty))
    }

    pub fn add_heritage(&mut self, ty: ElementId, edge: ElementId) {
        if let Err(err) = self.try_add_heritage(ty, edge) {
            debug!(%err, "rejected add_heritage");
        }
    }

    /// Detach `edge` from `ty`. Returns false if `ty` did not hold it.
    pub fn remove_heritage(&mut self, ty: ElementId, edge: ElementId) -> bool {
        if !self.heritage(ty).contains(&edge) {
            return false;
        }
        self.release_type_edge(ty, edge);
        true
    }

    /// Create a `kind` heritage edge from `ty` to `general` and attach it.
    pub fn specialize(&mut self, ty: ElementId, kind: ElementKind, general: ElementId) -> ElementId {
        let edge = self.create_like(ty, kind);
        self.set_element(edge, Some(general));
        self.add_heritage(ty, edge);
        edge
    }

    pub fn try_add_type_relationship(&mut self, ty: ElementId, edge: ElementId) -> ModelResult<()> {
        self.require_kind(ty, ElementKind::Type)?;
        let element = self.require(edge)?;
        if !element.kind.is_type_relationship() {
            return Err(ModelError::kind_mismatch(edge, ElementKind::Relationship, element.kind));
        }
        self.try_set_parent(edge, Some(ty))
    }

    pub fn add_type_relationship(&mut self, ty: ElementId, edge: ElementId) {
        if let Err(err) = self.try_add_type_relationship(ty, edge) {
            debug!(%err, "rejected add_type_relationship");
        }
    }

    pub fn remove_type_relationship(&mut self, ty: ElementId, edge: ElementId) -> bool {
        if !self.type_relationships(ty).contains(&edge) {
            return false;
        }
        self.release_type_edge(ty, edge);
        true
    }

    /// Create a `kind` type relationship from `ty` to `other` and attach it.
    pub fn relate(&mut self, ty: ElementId, kind: ElementKind, other: ElementId) -> ElementId {
        let edge = self.create_like(ty, kind);
        self.set_element(edge, Some(other));
        self.add_type_relationship(ty, edge);
        edge
    }

    fn release_type_edge(&mut self, ty: ElementId, edge: ElementId) {
        if self.explicit_source(edge) == Some(ty) {
            self.set_source(edge, None);
        }
        if self.parent(edge) == Some(ty) {
            self.set_parent(edge, None);
        }
    }

    // ── Attachment ──────────────────────────────────────────────────

    fn type_edge_subject(&self, edge: ElementId) -> Option<ElementId> {
        self.source(edge).filter(|&s| self.is(s, ElementKind::Type))
    }

    /// Move `edge` into the list of the type it currently belongs to.
    pub(crate) fn refresh_type_attachment(&mut self, edge: ElementId) {
        let Some(rel) = self.rel(edge) else {
            return;
        };
        let previous = rel.attached_to;
        let current = self.type_edge_subject(edge);
        if previous == current {
            return;
        }
        let Some(kind) = self.kind(edge) else {
            return;
        };
        let heritage = kind.is_heritage();

        if let Some(old) = previous {
            if let Some(ty) = self.ty_mut(old) {
                if heritage {
                    ty.heritage.retain(|&e| e != edge);
                } else {
                    ty.type_relationships.retain(|&e| e != edge);
                }
            }
            if heritage {
                self.record(ModelEvent::HeritageRemoved { ty: old, edge });
            }
        }
        if let Some(rel) = self.rel_mut(edge) {
            rel.attached_to = current;
        }
        if let Some(new) = current {
            if let Some(ty) = self.ty_mut(new) {
                let list = if heritage {
                    &mut ty.heritage
                } else {
                    &mut ty.type_relationships
                };
                if !list.contains(&edge) {
                    list.push(edge);
                }
            }
            if heritage {
                self.record(ModelEvent::HeritageAdded { ty: new, edge });
            }
        }
        trace!(edge = %edge, %kind, ?previous, ?current, "type edge attachment");

        self.bump_heritage_epoch();
        for ty in [previous, current].into_iter().flatten() {
            self.after_type_edge_change(ty, kind);
        }
    }

    pub(crate) fn on_type_edge_retarget(&mut self, edge: ElementId) {
        self.bump_heritage_epoch();
        let attached = self.rel(edge).and_then(|r| r.attached_to);
        if let (Some(ty), Some(kind)) = (attached, self.kind(edge)) {
            self.after_type_edge_change(ty, kind);
        }
    }

    fn after_type_edge_change(&mut self, ty: ElementId, kind: ElementKind) {
        if kind.is(ElementKind::Redefinition) {
            self.refresh_names(ty);
            self.rederive_shadows_around(ty);
        } else if kind.is(ElementKind::FeatureChaining) {
            self.refresh_names(ty);
        }
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Heritage edges of `ty` whose kind is `kind` or a subkind.
    pub fn specializations(&self, ty: ElementId, kind: ElementKind) -> Vec<ElementId> {
        self.heritage(ty)
            .iter()
            .copied()
            .filter(|&e| self.is(e, kind))
            .collect()
    }

    /// Targets of the `kind` heritage edges of `ty`; unresolved edges
    /// contribute nothing.
    pub fn types(&self, ty: ElementId, kind: ElementKind) -> Vec<ElementId> {
        self.specializations(ty, kind)
            .into_iter()
            .filter_map(|e| self.element(e))
            .collect()
    }

    /// Targets of every heritage edge of `ty`.
    pub fn general_types(&self, ty: ElementId) -> Vec<ElementId> {
        self.types(ty, ElementKind::Inheritance)
    }

    /// Targets of the `kind` type relationships of `ty`.
    pub fn related_types(&self, ty: ElementId, kind: ElementKind) -> Vec<ElementId> {
        self.type_relationships(ty)
            .iter()
            .copied()
            .filter(|&e| self.is(e, kind))
            .filter_map(|e| self.element(e))
            .collect()
    }

    pub fn unioning_types(&self, ty: ElementId) -> Vec<ElementId> {
        self.related_types(ty, ElementKind::Unioning)
    }

    pub fn intersecting_types(&self, ty: ElementId) -> Vec<ElementId> {
        self.related_types(ty, ElementKind::Intersecting)
    }

    pub fn differencing_types(&self, ty: ElementId) -> Vec<ElementId> {
        self.related_types(ty, ElementKind::Differencing)
    }

    pub fn disjoining_types(&self, ty: ElementId) -> Vec<ElementId> {
        self.related_types(ty, ElementKind::Disjoining)
    }

    pub fn is_conjugated(&self, ty: ElementId) -> bool {
        !self.specializations(ty, ElementKind::Conjugation).is_empty()
    }

    /// The original type of a conjugated type.
    pub fn conjugated_type(&self, ty: ElementId) -> Option<ElementId> {
        self.types(ty, ElementKind::Conjugation).into_iter().next()
    }

    /// Types one heritage step above `ty`, including the final features of
    /// chains.
    fn direct_supertypes(&self, ty: ElementId) -> Vec<ElementId> {
        let mut next = Vec::new();
        for general in self.general_types(ty) {
            next.push(general);
            let last = self.final_feature(general);
            if last != general {
                next.push(last);
            }
        }
        let last = self.final_feature(ty);
        if last != ty {
            next.push(last);
        }
        next
    }

    /// Returns true if `other` is `ty` or reachable from it over heritage.
    /// Terminates on cyclic heritage.
    pub fn conforms(&self, ty: ElementId, other: ElementId) -> bool {
        if ty == other {
            return self.contains(ty);
        }
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([ty]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if current == other {
                return true;
            }
            queue.extend(self.direct_supertypes(current));
        }
        false
    }

    /// Every type `ty` conforms to, nearest first, without `ty` itself.
    pub fn all_supertypes(&self, ty: ElementId) -> Vec<ElementId> {
        let mut visited = FxHashSet::default();
        visited.insert(ty);
        let mut order = Vec::new();
        let mut queue = VecDeque::from(self.direct_supertypes(ty));
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            order.push(current);
            queue.extend(self.direct_supertypes(current));
        }
        order
    }

    /// Returns true if `ty` or one of its supertypes has `qualified_name`.
    pub fn conforms_to_named(&self, ty: ElementId, qualified_name: &str) -> bool {
        std::iter::once(ty)
            .chain(self.all_supertypes(ty))
            .any(|t| self.qualified_name(t) == Some(qualified_name))
    }
}
