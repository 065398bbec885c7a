//! Relationship targets, sources and slot ownership.
//!
//! A relationship is *owning* when its target is parented by the
//! relationship itself, and *referencing* when the target lives elsewhere.
//! `set_element` only repoints the edge; ownership is changed through
//! `set_parent` or, for single-valued slots, [`Model::swap_edge_ownership`].

use tracing::{debug, trace};

use super::{ElementKind, Model, ModelError, ModelResult, Visibility};
use crate::base::ElementId;

/// A single-valued property of a type held through an owned edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// `Feature::value`, a `FeatureValue` edge.
    Value,
    /// `Function::result` / `Expression::result`, a `ResultExpressionMembership`.
    Result,
    /// `Type::multiplicity`, an owning membership of a `MultiplicityRange`.
    Multiplicity,
}

impl Slot {
    /// Kind the slot holder must be.
    pub fn holder_kind(self) -> ElementKind {
        match self {
            Slot::Value => ElementKind::Feature,
            Slot::Result | Slot::Multiplicity => ElementKind::Type,
        }
    }

    const ALL: [Slot; 3] = [Slot::Value, Slot::Result, Slot::Multiplicity];
}

impl Model {
    // ── Target and source ───────────────────────────────────────────

    /// The relationship's target, `element()`.
    pub fn element(&self, edge: ElementId) -> Option<ElementId> {
        self.rel(edge)?.element
    }

    /// Repoint `edge` at `target` without changing ownership.
    pub fn try_set_element(&mut self, edge: ElementId, target: Option<ElementId>) -> ModelResult<()> {
        self.require_kind(edge, ElementKind::Relationship)?;
        if let Some(target) = target {
            self.require(target)?;
        }
        let previous = self.element(edge);
        if previous == target {
            return Ok(());
        }
        if let Some(rel) = self.rel_mut(edge) {
            rel.element = target;
        }
        if let Some(previous) = previous {
            self.unlink_incoming(previous, edge);
        }
        if let Some(target) = target {
            self.link_incoming(target, edge);
        }
        trace!(edge = %edge, ?previous, ?target, "relationship target set");

        for end in [previous, target].into_iter().flatten() {
            if self.parent(end) == Some(edge) {
                self.refresh_owner(end);
            }
        }
        self.on_target_set(edge);
        Ok(())
    }

    pub fn set_element(&mut self, edge: ElementId, target: Option<ElementId>) {
        if let Err(err) = self.try_set_element(edge, target) {
            debug!(%err, "rejected set_element");
        }
    }

    fn on_target_set(&mut self, edge: ElementId) {
        let Some(kind) = self.kind(edge) else {
            return;
        };
        if kind.is_membership() {
            self.refresh_names(edge);
            self.refresh_registration(edge);
        } else if kind.is(ElementKind::Import) {
            self.refresh_registration(edge);
        }
        if kind.is_heritage() || kind.is_type_relationship() {
            self.on_type_edge_retarget(edge);
        }
        if kind.is(ElementKind::FeatureMembership)
            && let Some(feature) = self.element(edge).filter(|&t| self.parent(t) == Some(edge))
        {
            self.refresh_feature_context(feature);
        }
        if kind.is(ElementKind::Annotation) {
            self.refresh_annotation_edge(edge);
        }
        self.fill_slot(edge);
    }

    /// Explicit source, else the semantic owner.
    pub fn source(&self, edge: ElementId) -> Option<ElementId> {
        let rel = self.rel(edge)?;
        rel.explicit_source.or_else(|| self.owner(edge))
    }

    pub fn explicit_source(&self, edge: ElementId) -> Option<ElementId> {
        self.rel(edge)?.explicit_source
    }

    pub fn try_set_source(&mut self, edge: ElementId, source: Option<ElementId>) -> ModelResult<()> {
        self.require_kind(edge, ElementKind::Relationship)?;
        if let Some(source) = source {
            self.require(source)?;
        }
        let previous = self.explicit_source(edge);
        if previous == source {
            return Ok(());
        }
        if let Some(rel) = self.rel_mut(edge) {
            rel.explicit_source = source;
        }
        if let Some(previous) = previous {
            self.unlink_sourced(previous, edge);
        }
        if let Some(source) = source {
            self.link_sourced(source, edge);
        }
        let Some(kind) = self.kind(edge) else {
            return Ok(());
        };
        if kind.is_heritage() || kind.is_type_relationship() {
            self.refresh_type_attachment(edge);
        }
        if kind.is(ElementKind::Annotation) {
            self.refresh_annotation_edge(edge);
        }
        Ok(())
    }

    pub fn set_source(&mut self, edge: ElementId, source: Option<ElementId>) {
        if let Err(err) = self.try_set_source(edge, source) {
            debug!(%err, "rejected set_source");
        }
    }

    /// `[source, target]`, skipping absent ends.
    pub fn related_elements(&self, edge: ElementId) -> Vec<ElementId> {
        [self.source(edge), self.element(edge)]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Returns true if `edge` structurally owns its target.
    pub fn owns_target(&self, edge: ElementId) -> bool {
        self.element(edge)
            .is_some_and(|t| self.parent(t) == Some(edge))
    }

    pub fn visibility(&self, edge: ElementId) -> Visibility {
        self.get(edge).map_or(Visibility::Public, |e| e.visibility())
    }

    pub fn set_visibility(&mut self, edge: ElementId, visibility: Visibility) {
        if let Some(rel) = self.rel_mut(edge) {
            rel.visibility = visibility;
        }
    }

    pub fn is_implied(&self, edge: ElementId) -> bool {
        self.rel(edge).is_some_and(|r| r.is_implied)
    }

    pub(crate) fn set_implied(&mut self, edge: ElementId, implied: bool) {
        if let Some(rel) = self.rel_mut(edge) {
            rel.is_implied = implied;
        }
    }

    // ── Slots ───────────────────────────────────────────────────────

    pub fn slot(&self, holder: ElementId, slot: Slot) -> Option<ElementId> {
        match slot {
            Slot::Value => self.feat(holder)?.value,
            Slot::Result => self.ty(holder)?.result,
            Slot::Multiplicity => self.ty(holder)?.multiplicity,
        }
    }

    fn set_slot(&mut self, holder: ElementId, slot: Slot, edge: Option<ElementId>) {
        match slot {
            Slot::Value => {
                if let Some(feature) = self.feat_mut(holder) {
                    feature.value = edge;
                }
            }
            Slot::Result => {
                if let Some(ty) = self.ty_mut(holder) {
                    ty.result = edge;
                }
            }
            Slot::Multiplicity => {
                if let Some(ty) = self.ty_mut(holder) {
                    ty.multiplicity = edge;
                }
            }
        }
    }

    /// The slot an owned edge of this shape fills, if any.
    fn slot_for_edge(&self, edge: ElementId) -> Option<Slot> {
        let kind = self.kind(edge)?;
        if kind.is(ElementKind::FeatureValue) {
            Some(Slot::Value)
        } else if kind.is(ElementKind::ResultExpressionMembership) {
            Some(Slot::Result)
        } else if kind.is_owning_membership()
            && self
                .element(edge)
                .is_some_and(|t| self.is(t, ElementKind::MultiplicityRange))
        {
            Some(Slot::Multiplicity)
        } else {
            None
        }
    }

    /// Put a newly owned edge into its holder's empty slot.
    pub(crate) fn fill_slot(&mut self, edge: ElementId) {
        let Some(slot) = self.slot_for_edge(edge) else {
            return;
        };
        let Some(holder) = self.owner(edge) else {
            return;
        };
        if self.is(holder, slot.holder_kind()) && self.slot(holder, slot).is_none() {
            self.set_slot(holder, slot, Some(edge));
        }
    }

    /// Clear slots of `holder` still pointing at an edge it no longer owns.
    pub(crate) fn clear_stale_slot(&mut self, holder: ElementId, edge: ElementId) {
        if self.owner(edge) == Some(holder) {
            return;
        }
        for slot in Slot::ALL {
            if self.slot(holder, slot) == Some(edge) {
                self.set_slot(holder, slot, None);
            }
        }
    }

    /// Replace the edge held in `slot` of `holder` with `new_edge`.
    ///
    /// The old edge's owned target is detached first, then the old edge;
    /// the new edge is attached before its target. Each affected element
    /// sees exactly one owner transition. Passing the current edge is a
    /// no-op.
    pub fn try_swap_edge_ownership(
        &mut self,
        holder: ElementId,
        slot: Slot,
        new_edge: Option<ElementId>,
    ) -> ModelResult<()> {
        self.require_kind(holder, slot.holder_kind())?;
        if let Some(edge) = new_edge {
            self.require_kind(edge, ElementKind::Relationship)?;
            if self.is_ancestor(edge, holder) {
                return Err(ModelError::cycle(edge, holder));
            }
        }
        let current = self.slot(holder, slot);
        if current == new_edge {
            return Ok(());
        }

        if let Some(old) = current {
            if let Some(target) = self.element(old).filter(|&t| self.parent(t) == Some(old)) {
                self.set_parent(target, None);
            }
            self.set_slot(holder, slot, None);
            self.set_parent(old, None);
        }

        if let Some(new) = new_edge {
            self.set_parent(new, Some(holder));
            self.set_slot(holder, slot, Some(new));
            if let Some(target) = self.element(new).filter(|&t| self.parent(t) != Some(new)) {
                self.set_parent(target, Some(new));
            }
        }
        Ok(())
    }

    pub fn swap_edge_ownership(&mut self, holder: ElementId, slot: Slot, new_edge: Option<ElementId>) {
        if let Err(err) = self.try_swap_edge_ownership(holder, slot, new_edge) {
            debug!(%err, "rejected swap_edge_ownership");
        }
    }

    /// Feature value edge.
    pub fn value(&self, feature: ElementId) -> Option<ElementId> {
        self.slot(feature, Slot::Value)
    }

    /// Expression bound by the feature value edge.
    pub fn value_expression(&self, feature: ElementId) -> Option<ElementId> {
        self.element(self.value(feature)?)
    }

    pub fn set_value_binding(&mut self, edge: ElementId, is_default: bool, is_initial: bool) {
        if let Some(binding) = self.get_mut(edge).and_then(|e| e.value.as_mut()) {
            binding.is_default = is_default;
            binding.is_initial = is_initial;
        }
    }

    /// `(is_default, is_initial)` of a FeatureValue edge.
    pub fn value_binding(&self, edge: ElementId) -> Option<(bool, bool)> {
        let binding = self.get(edge)?.value?;
        Some((binding.is_default, binding.is_initial))
    }

    /// Result expression of a function or expression.
    pub fn result_expression(&self, ty: ElementId) -> Option<ElementId> {
        self.element(self.slot(ty, Slot::Result)?)
    }
}
