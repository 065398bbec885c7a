//! Parent/owner tracking and the owner-change hook chain.
//!
//! The structural parent is whatever physically holds an element. The
//! semantic owner skips a *pure* relationship (one that is not also a
//! namespace) when that relationship does not own the element as its
//! target: body children of a referencing relationship belong to the
//! relationship's owner.
//!
//! Owners are cached and refreshed only when a parent or a relationship
//! target changes. When the owner actually changes, facet hooks run in a
//! fixed order, most general first:
//!
//! 1. element: memberships that name this element re-register its keys
//! 2. relationship: lookup registration, heritage lists, slots, annotations
//! 3. feature: owning type, shadows of the owning type
//! 4. annotating: annotated-element registration

use tracing::{debug, trace};

use super::{ElementKind, Model, ModelError, ModelEvent, ModelResult};
use crate::base::ElementId;

impl Model {
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.parent
    }

    /// Semantic owner; O(1).
    pub fn owner(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.owner
    }

    /// Structural children in insertion order.
    pub fn owned(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map_or(&[], |e| e.owned.as_slice())
    }

    /// Parent chain, nearest first.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Returns true if `ancestor` is `id` or one of its parents.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Move `child` under `parent` (or detach it with `None`).
    pub fn try_set_parent(&mut self, child: ElementId, parent: Option<ElementId>) -> ModelResult<()> {
        let previous = self.require(child)?.parent;
        if previous == parent {
            return Ok(());
        }
        if let Some(parent) = parent {
            self.require(parent)?;
            if parent == child {
                return Err(ModelError::SelfOwnership(child));
            }
            if self.is_ancestor(child, parent) {
                return Err(ModelError::cycle(child, parent));
            }
        }

        if let Some(old) = previous.and_then(|p| self.get_mut(p)) {
            old.owned.retain(|&c| c != child);
        }
        if let Some(new) = parent.and_then(|p| self.get_mut(p)) {
            new.owned.push(child);
        }
        if let Some(element) = self.get_mut(child) {
            element.parent = parent;
        }
        self.record(ModelEvent::ParentSet {
            element: child,
            previous,
            current: parent,
        });

        self.refresh_owner(child);
        self.refresh_qualified_names(child);
        Ok(())
    }

    pub fn set_parent(&mut self, child: ElementId, parent: Option<ElementId>) {
        if let Err(err) = self.try_set_parent(child, parent) {
            debug!(%err, "rejected set_parent");
        }
    }

    /// Wrap `element` in a membership of the kind its own kind calls for and
    /// add it to `namespace`. Returns the membership.
    pub fn add_owned_member(&mut self, namespace: ElementId, element: ElementId) -> ElementId {
        let kind = self
            .kind(element)
            .map_or(ElementKind::OwningMembership, ElementKind::membership_kind_for);
        self.add_member_as(namespace, element, kind)
    }

    /// Wrap `element` in a new `membership_kind` edge owned by `namespace`.
    pub fn add_member_as(
        &mut self,
        namespace: ElementId,
        element: ElementId,
        membership_kind: ElementKind,
    ) -> ElementId {
        let membership = self.create_like(namespace, membership_kind);
        self.set_element(membership, Some(element));
        if membership_kind.is_owning_membership() {
            self.set_parent(element, Some(membership));
        }
        self.set_parent(membership, Some(namespace));
        membership
    }

    /// Create an element in the same document as `sibling`.
    pub(crate) fn create_like(&mut self, sibling: ElementId, kind: ElementKind) -> ElementId {
        match self.get(sibling).and_then(|e| e.document) {
            Some(document) => self.create_in(document, kind),
            None => self.create(kind),
        }
    }

    // ── Owner resolution ────────────────────────────────────────────

    fn compute_owner(&self, id: ElementId) -> Option<ElementId> {
        let parent_id = self.get(id)?.parent?;
        let parent = self.get(parent_id)?;
        if parent.kind.is_pure_relationship() && parent.target() != Some(id) {
            parent.owner
        } else {
            Some(parent_id)
        }
    }

    /// Recompute the cached owner and, if it changed, run the hooks.
    pub(crate) fn refresh_owner(&mut self, id: ElementId) {
        let Some(element) = self.get(id) else {
            return;
        };
        let previous = element.owner;
        let current = self.compute_owner(id);
        if previous == current {
            return;
        }
        if let Some(element) = self.get_mut(id) {
            element.owner = current;
        }
        self.record(ModelEvent::OwnerSet {
            element: id,
            previous,
            current,
        });
        self.on_owner_set(id, previous, current);

        // Body children of a pure relationship inherit its owner.
        if self.kind(id).is_some_and(ElementKind::is_pure_relationship) {
            let target = self.get(id).and_then(|e| e.target());
            for child in self.owned(id).to_vec() {
                if Some(child) != target {
                    self.refresh_owner(child);
                }
            }
        }
    }

    fn on_owner_set(&mut self, id: ElementId, previous: Option<ElementId>, current: Option<ElementId>) {
        let Some(kind) = self.kind(id) else {
            return;
        };
        trace!(element = %id, %kind, ?previous, ?current, "owner set");

        self.element_owner_set(id, previous, current);
        if kind.is_relationship() {
            self.relationship_owner_set(id, previous);
        }
        if kind.is_feature() {
            self.refresh_feature_context(id);
        }
        if kind.is_annotating() {
            self.refresh_annotation_targets(id);
        }
    }

    /// A membership naming this element tracks whether the element is
    /// parented by it.
    fn element_owner_set(&mut self, id: ElementId, previous: Option<ElementId>, current: Option<ElementId>) {
        for membership in [previous, current].into_iter().flatten() {
            let names_element = self
                .get(membership)
                .is_some_and(|m| m.kind.is_membership() && m.target() == Some(id));
            if names_element {
                self.refresh_names(membership);
            }
        }
    }

    fn relationship_owner_set(&mut self, id: ElementId, previous: Option<ElementId>) {
        let Some(kind) = self.kind(id) else {
            return;
        };
        if kind.is_membership() || kind.is(ElementKind::Import) {
            self.refresh_registration(id);
        }
        if kind.is_heritage() || kind.is_type_relationship() {
            self.refresh_type_attachment(id);
        }
        if let Some(previous) = previous {
            self.clear_stale_slot(previous, id);
        }
        self.fill_slot(id);
        let owned_target = self
            .get(id)
            .and_then(|m| m.target())
            .filter(|&t| self.parent(t) == Some(id));
        if let Some(target) = owned_target {
            if kind.is(ElementKind::FeatureMembership) {
                self.refresh_feature_context(target);
            }
            // An annotating element in a membership annotates the
            // membership's owner.
            if kind.is_membership() && self.kind(target).is_some_and(ElementKind::is_annotating) {
                self.refresh_annotation_targets(target);
            }
        }
        if kind.is(ElementKind::Annotation) {
            self.refresh_annotation_edge(id);
        }
    }
}
