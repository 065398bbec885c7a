//! Feature queries: typings inference, multiplicity, direction, featuring.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::element::TypingsCache;
use super::{Direction, ElementKind, FeatureFlags, Model, MultiplicityBounds, Slot};
use crate::base::ElementId;

impl Model {
    // ── Typings ─────────────────────────────────────────────────────

    /// Most specific types `feature` is an instance of.
    ///
    /// Direct `FeatureTyping` targets are unioned with the typings of
    /// subsetted, redefined and conjugated features and of the last
    /// chaining feature, then reduced so no result conforms to another.
    /// Memoized until the next heritage change anywhere in the model.
    pub fn all_typings(&self, feature: ElementId) -> Vec<ElementId> {
        let Some(data) = self.feat(feature) else {
            return Vec::new();
        };
        let epoch = self.heritage_epoch();
        if let Some(cache) = data.typings.lock().as_ref()
            && cache.epoch == epoch
        {
            return cache.types.clone();
        }

        let mut raw = Vec::new();
        let mut visited = FxHashSet::default();
        self.collect_typings(feature, &mut raw, &mut visited, 0);
        let types = self.most_specific(raw);
        trace!(feature = %feature, ?types, epoch, "typings rebuilt");

        *data.typings.lock() = Some(TypingsCache {
            epoch,
            types: types.clone(),
        });
        types
    }

    fn collect_typings(
        &self,
        feature: ElementId,
        raw: &mut Vec<ElementId>,
        visited: &mut FxHashSet<ElementId>,
        depth: usize,
    ) {
        if depth > self.config().max_inference_depth || !visited.insert(feature) {
            return;
        }
        for &edge in self.heritage(feature) {
            let (Some(kind), Some(target)) = (self.kind(edge), self.element(edge)) else {
                continue;
            };
            if kind.is(ElementKind::FeatureTyping) {
                if !raw.contains(&target) {
                    raw.push(target);
                }
            } else if kind.is(ElementKind::Subsetting) {
                self.collect_typings(target, raw, visited, depth + 1);
            } else if kind.is(ElementKind::Conjugation) {
                if self.is(target, ElementKind::Feature) {
                    self.collect_typings(target, raw, visited, depth + 1);
                } else if !raw.contains(&target) {
                    raw.push(target);
                }
            }
        }
        if let Some(&last) = self.chaining_features(feature).last() {
            self.collect_typings(last, raw, visited, depth + 1);
        }
    }

    /// Drop every candidate that some other candidate conforms to.
    fn most_specific(&self, candidates: Vec<ElementId>) -> Vec<ElementId> {
        let mut result: Vec<ElementId> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if result.iter().any(|&kept| self.conforms(kept, candidate)) {
                continue;
            }
            result.retain(|&kept| !self.conforms(candidate, kept));
            result.push(candidate);
        }
        result
    }

    // ── Chains ──────────────────────────────────────────────────────

    /// Features of a `a.b.c` chain, in order.
    pub fn chaining_features(&self, feature: ElementId) -> Vec<ElementId> {
        self.related_types(feature, ElementKind::FeatureChaining)
    }

    /// Last chaining feature, or `feature` itself when it is not a chain.
    pub fn final_feature(&self, feature: ElementId) -> ElementId {
        self.chaining_features(feature)
            .last()
            .copied()
            .unwrap_or(feature)
    }

    pub fn redefined_features(&self, feature: ElementId) -> Vec<ElementId> {
        self.types(feature, ElementKind::Redefinition)
    }

    /// Subsetted features, redefined ones included.
    pub fn subsetted_features(&self, feature: ElementId) -> Vec<ElementId> {
        self.types(feature, ElementKind::Subsetting)
    }

    // ── Multiplicity ────────────────────────────────────────────────

    /// The owned `MultiplicityRange` of a type.
    pub fn multiplicity(&self, ty: ElementId) -> Option<ElementId> {
        self.element(self.slot(ty, Slot::Multiplicity)?)
    }

    /// Literal bounds of the owned multiplicity of `ty`.
    pub fn multiplicity_bounds(&self, ty: ElementId) -> Option<MultiplicityBounds> {
        self.get(self.multiplicity(ty)?)?.range
    }

    pub fn set_bounds(&mut self, range: ElementId, bounds: MultiplicityBounds) {
        if let Some(slot) = self.get_mut(range).and_then(|e| e.range.as_mut()) {
            *slot = bounds;
        }
    }

    /// Own multiplicity, else the first one inherited through subsetting or
    /// redefinition.
    pub fn effective_multiplicity(&self, feature: ElementId) -> Option<MultiplicityBounds> {
        let mut visited = FxHashSet::default();
        self.find_multiplicity(feature, &mut visited, 0)
    }

    fn find_multiplicity(
        &self,
        feature: ElementId,
        visited: &mut FxHashSet<ElementId>,
        depth: usize,
    ) -> Option<MultiplicityBounds> {
        if depth > self.config().max_inference_depth || !visited.insert(feature) {
            return None;
        }
        if let Some(bounds) = self.multiplicity_bounds(feature) {
            return Some(bounds);
        }
        self.subsetted_features(feature)
            .into_iter()
            .find_map(|general| self.find_multiplicity(self.final_feature(general), visited, depth + 1))
    }

    // ── Flags and direction ─────────────────────────────────────────

    /// Explicit flags; implied bits are not included.
    pub fn feature_flags(&self, feature: ElementId) -> FeatureFlags {
        self.feat(feature).map(|f| f.flags).unwrap_or_default()
    }

    pub fn set_feature_flags(&mut self, feature: ElementId, flags: FeatureFlags) {
        if let Some(data) = self.feat_mut(feature) {
            data.flags = flags;
        }
    }

    /// Update explicit flags in place.
    pub fn update_feature_flags(&mut self, feature: ElementId, update: impl FnOnce(&mut FeatureFlags)) {
        if let Some(data) = self.feat_mut(feature) {
            update(&mut data.flags);
        }
    }

    pub fn set_abstract(&mut self, ty: ElementId, value: bool) {
        if let Some(data) = self.ty_mut(ty) {
            data.is_abstract = value;
        }
    }

    pub fn set_sufficient(&mut self, ty: ElementId, value: bool) {
        if let Some(data) = self.ty_mut(ty) {
            data.is_sufficient = value;
        }
    }

    /// Membership that owns `feature` as its target.
    fn owning_membership(&self, feature: ElementId) -> Option<ElementId> {
        self.parent(feature)
            .filter(|&m| self.is(m, ElementKind::Membership) && self.element(m) == Some(feature))
    }

    /// Explicit end flag or ownership through an end feature membership.
    pub fn is_end(&self, feature: ElementId) -> bool {
        self.feature_flags(feature).end
            || self
                .owning_membership(feature)
                .is_some_and(|m| self.is(m, ElementKind::EndFeatureMembership))
    }

    pub fn is_composite(&self, feature: ElementId) -> bool {
        self.feature_flags(feature).composite
    }

    pub fn is_unique(&self, feature: ElementId) -> bool {
        !self.feature_flags(feature).nonunique
    }

    pub fn set_direction(&mut self, feature: ElementId, direction: Option<Direction>) {
        if let Some(data) = self.feat_mut(feature) {
            data.direction = direction;
        }
    }

    /// Explicit direction, else the one implied by a parameter membership.
    pub fn direction(&self, feature: ElementId) -> Option<Direction> {
        if let Some(direction) = self.feat(feature)?.direction {
            return Some(direction);
        }
        let membership = self.owning_membership(feature)?;
        if self.is(membership, ElementKind::ReturnParameterMembership) {
            Some(Direction::Out)
        } else if self.is(membership, ElementKind::ParameterMembership) {
            Some(Direction::In)
        } else {
            None
        }
    }

    // ── Featuring ───────────────────────────────────────────────────

    /// Type owning `feature` through a feature membership.
    pub fn owning_type(&self, feature: ElementId) -> Option<ElementId> {
        self.feat(feature)?.owning_type
    }

    pub(crate) fn refresh_feature_context(&mut self, feature: ElementId) {
        let owning = self
            .parent(feature)
            .filter(|&m| self.is(m, ElementKind::FeatureMembership) && self.element(m) == Some(feature))
            .and_then(|m| self.owner(m))
            .filter(|&t| self.is(t, ElementKind::Type));
        let Some(data) = self.feat_mut(feature) else {
            return;
        };
        let previous = data.owning_type;
        if previous == owning {
            return;
        }
        data.owning_type = owning;
        trace!(feature = %feature, ?previous, ?owning, "owning type");

        if !self.redefined_features(feature).is_empty() {
            for ty in [previous, owning].into_iter().flatten() {
                self.rederive_shadows(ty);
            }
        }
    }

    /// Owning type plus `TypeFeaturing` targets; a chain is featured like
    /// its first chaining feature.
    pub fn featuring_types(&self, feature: ElementId) -> Vec<ElementId> {
        let mut current = feature;
        let mut visited = FxHashSet::default();
        while let Some(&first) = self.chaining_features(current).first() {
            if !visited.insert(current) {
                return Vec::new();
            }
            current = first;
        }
        let mut types: Vec<_> = self.owning_type(current).into_iter().collect();
        for ty in self.related_types(current, ElementKind::TypeFeaturing) {
            if !types.contains(&ty) {
                types.push(ty);
            }
        }
        types
    }

    /// Returns true if instances of `ty` may carry values of `feature`.
    pub fn is_featured_by(&self, feature: ElementId, ty: ElementId) -> bool {
        let featuring = self.featuring_types(feature);
        featuring.is_empty() || featuring.iter().any(|&f| self.conforms(ty, f))
    }

    pub fn is_association_end(&self, feature: ElementId) -> bool {
        self.is_end(feature)
            && self
                .owning_type(feature)
                .is_some_and(|t| self.is(t, ElementKind::Association))
    }

    // ── Owned features ──────────────────────────────────────────────

    /// Features owned through feature memberships, in order.
    pub fn owned_features(&self, ty: ElementId) -> Vec<ElementId> {
        self.memberships(ty)
            .into_iter()
            .filter(|&m| self.is(m, ElementKind::FeatureMembership))
            .filter_map(|m| self.element(m).filter(|&f| self.parent(f) == Some(m)))
            .filter(|&f| self.is(f, ElementKind::Feature))
            .collect()
    }

    pub fn owned_end_features(&self, ty: ElementId) -> Vec<ElementId> {
        self.owned_features(ty)
            .into_iter()
            .filter(|&f| self.is_end(f))
            .collect()
    }

    pub fn end_count(&self, ty: ElementId) -> usize {
        self.owned_end_features(ty).len()
    }

    /// Owned features with direction `in` or `inout`.
    pub fn input_parameters(&self, ty: ElementId) -> Vec<ElementId> {
        self.owned_features(ty)
            .into_iter()
            .filter(|&f| matches!(self.direction(f), Some(Direction::In | Direction::InOut)))
            .collect()
    }

    /// Owned features with direction `out` or `inout`.
    pub fn output_parameters(&self, ty: ElementId) -> Vec<ElementId> {
        self.owned_features(ty)
            .into_iter()
            .filter(|&f| matches!(self.direction(f), Some(Direction::Out | Direction::InOut)))
            .collect()
    }
}
