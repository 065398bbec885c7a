//! Redefinition effects: adopted names, implied ordering, lookup shadows.
//!
//! A feature without declared names adopts the names of the feature it
//! redefines (after following that feature's chain). Its owning type gets a
//! [`MemberEntry::Shadow`](super::MemberEntry::Shadow) under each redefined
//! name that no member claims, hiding the inherited member from
//! unqualified lookup.
//!
//! Shadows are never refcounted. Whenever a redefinition, a redefining
//! feature, or a member of the type changes, every shadow of the type is
//! dropped and re-derived from the redefinitions that remain, so a name
//! stays shadowed as long as any sibling still redefines it.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use super::{MemberEntry, Model};
use crate::base::ElementId;

impl Model {
    /// Names a feature without declared names takes over: those of its
    /// final chaining feature, else those of the first redefined feature.
    pub(crate) fn adopted_names(&self, feature: ElementId) -> (Option<SmolStr>, Option<SmolStr>) {
        let source = self.chaining_features(feature).last().copied().or_else(|| {
            self.redefined_features(feature)
                .into_iter()
                .map(|r| self.final_feature(r))
                .find(|&r| r != feature)
        });
        let Some(source) = source.and_then(|s| self.get(s)) else {
            return (None, None);
        };
        (source.names.name.clone(), source.names.short_name.clone())
    }

    /// Explicit `ordered`, or ordered because a redefined feature is.
    pub fn is_ordered(&self, feature: ElementId) -> bool {
        let mut visited = FxHashSet::default();
        self.is_ordered_guarded(feature, &mut visited)
    }

    fn is_ordered_guarded(&self, feature: ElementId, visited: &mut FxHashSet<ElementId>) -> bool {
        if !visited.insert(feature) || visited.len() > self.config().max_inference_depth {
            return false;
        }
        if self.feature_flags(feature).ordered {
            return true;
        }
        self.redefined_features(feature)
            .into_iter()
            .any(|r| self.is_ordered_guarded(self.final_feature(r), visited))
    }

    /// Names that owned features of `ty` redefine.
    fn redefined_names(&self, ty: ElementId) -> Vec<SmolStr> {
        let mut names = Vec::new();
        for feature in self.owned_features(ty) {
            for redefined in self.redefined_features(feature) {
                let Some(target) = self.get(self.final_feature(redefined)) else {
                    continue;
                };
                names.extend(target.names.name.clone());
                names.extend(target.names.short_name.clone());
            }
        }
        names
    }

    /// Drop all shadows of `namespace` and re-derive them.
    pub(crate) fn rederive_shadows(&mut self, namespace: ElementId) {
        if self.ns(namespace).is_none() {
            return;
        }
        let names = if self.ty(namespace).is_some() {
            self.redefined_names(namespace)
        } else {
            Vec::new()
        };
        let Some(ns) = self.ns_mut(namespace) else {
            return;
        };
        ns.members.retain(|_, entry| !entry.is_shadow());
        for name in names {
            ns.members.entry(name).or_insert(MemberEntry::Shadow);
        }
        trace!(namespace = %namespace, "shadows re-derived");
    }

    /// Re-derive the shadows of the type owning `feature`.
    pub(crate) fn rederive_shadows_around(&mut self, feature: ElementId) {
        if let Some(ty) = self.owning_type(feature) {
            self.rederive_shadows(ty);
        }
    }
}
