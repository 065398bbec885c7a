//! Names, qualified names and the per-namespace member lookup table.
//!
//! Declared names are stored as written. The effective (sanitized) names
//! are cached on the element and recomputed only when something they depend
//! on changes: the declaration itself, a membership's target, or a
//! redefined/chained feature's name. A change propagates along
//! [`Model::incoming`] edges with a visited guard.
//!
//! The lookup table of a namespace maps a name to a [`MemberEntry`]. Only
//! memberships and membership imports put names in it; redefinitions add
//! [`MemberEntry::Shadow`]s (see `redefinition`). A registrant claims a slot
//! only when it is empty, a shadow, or stale, and records the entry it
//! stored. Removal clears only slots still holding that recorded entry. A
//! freed slot goes to the next registrant of the namespace, in ownership
//! order, that carries the same name.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::{ElementKind, MemberEntry, Model, ModelEvent, ModelResult};
use crate::base::{ElementId, sanitize_name};

impl Model {
    // ── Names ───────────────────────────────────────────────────────

    pub fn declared_name(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.declared_name()
    }

    pub fn declared_short_name(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.declared_short_name()
    }

    /// Effective sanitized name.
    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.name()
    }

    /// Effective sanitized short name.
    pub fn short_name(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.short_name()
    }

    pub fn qualified_name(&self, id: ElementId) -> Option<&str> {
        self.get(id)?.qualified_name()
    }

    /// Set the name as written (quotes and escapes included).
    ///
    /// On a membership, a name equal to its element's name clears the
    /// explicit member name so the membership keeps tracking the element.
    pub fn try_set_declared_name(&mut self, id: ElementId, name: Option<&str>) -> ModelResult<()> {
        self.set_declared(id, name, false)
    }

    pub fn set_declared_name(&mut self, id: ElementId, name: Option<&str>) {
        if let Err(err) = self.try_set_declared_name(id, name) {
            debug!(%err, "rejected set_declared_name");
        }
    }

    pub fn try_set_declared_short_name(&mut self, id: ElementId, name: Option<&str>) -> ModelResult<()> {
        self.set_declared(id, name, true)
    }

    pub fn set_declared_short_name(&mut self, id: ElementId, name: Option<&str>) {
        if let Err(err) = self.try_set_declared_short_name(id, name) {
            debug!(%err, "rejected set_declared_short_name");
        }
    }

    fn set_declared(&mut self, id: ElementId, name: Option<&str>, short: bool) -> ModelResult<()> {
        let element = self.require(id)?;
        let mut value = name.map(SmolStr::new);

        if element.kind.is_membership()
            && let (Some(written), Some(target)) = (&value, element.target())
        {
            let tracked = self.get(target).and_then(|t| {
                if short {
                    t.names.short_name.clone()
                } else {
                    t.names.name.clone()
                }
            });
            if tracked.as_ref() == Some(&sanitize_name(written)) {
                value = None;
            }
        }

        if let Some(element) = self.get_mut(id) {
            if short {
                element.names.declared_short_name = value;
            } else {
                element.names.declared_name = value;
            }
        }
        self.refresh_names(id);
        Ok(())
    }

    fn compute_names(&self, id: ElementId) -> (Option<SmolStr>, Option<SmolStr>) {
        let Some(element) = self.get(id) else {
            return (None, None);
        };
        let declared = element.names.declared_name.as_deref().map(sanitize_name);
        let declared_short = element.names.declared_short_name.as_deref().map(sanitize_name);

        if element.kind.is_membership() {
            let tracked = element.target().filter(|&t| {
                !element.kind.is_owning_membership() || self.parent(t) == Some(id)
            });
            let target = tracked.and_then(|t| self.get(t));
            return (
                declared.or_else(|| target.and_then(|t| t.names.name.clone())),
                declared_short.or_else(|| target.and_then(|t| t.names.short_name.clone())),
            );
        }

        if element.kind.is_feature() && declared.is_none() && declared_short.is_none() {
            return self.adopted_names(id);
        }
        (declared, declared_short)
    }

    /// Recompute the effective names of `id` and propagate a change.
    pub(crate) fn refresh_names(&mut self, id: ElementId) {
        let mut visited = FxHashSet::default();
        self.refresh_names_guarded(id, &mut visited);
    }

    pub(crate) fn refresh_names_guarded(&mut self, id: ElementId, visited: &mut FxHashSet<ElementId>) {
        if !visited.insert(id) {
            return;
        }
        let (name, short_name) = self.compute_names(id);
        let Some(element) = self.get_mut(id) else {
            return;
        };
        if element.names.name == name && element.names.short_name == short_name {
            return;
        }
        element.names.name = name.clone();
        element.names.short_name = short_name;
        let kind = element.kind;
        let parent = element.parent;
        self.record(ModelEvent::NameChanged { element: id, name });

        if kind.is_membership() || kind.is(ElementKind::Import) {
            self.refresh_registration(id);
        }
        if let Some(parent) = parent
            && self
                .get(parent)
                .is_some_and(|p| p.kind.is_membership() && p.target() == Some(id))
        {
            self.refresh_names_guarded(parent, visited);
        }
        self.refresh_qualified_names(id);

        for edge in self.incoming(id).to_vec() {
            let Some(edge_kind) = self.kind(edge) else {
                continue;
            };
            if edge_kind.is_membership() {
                self.refresh_names_guarded(edge, visited);
            } else if edge_kind.is(ElementKind::MembershipImport) {
                self.refresh_registration(edge);
            } else if edge_kind.is(ElementKind::Redefinition) {
                if let Some(feature) = self.rel(edge).and_then(|r| r.attached_to) {
                    self.refresh_names_guarded(feature, visited);
                    self.rederive_shadows_around(feature);
                }
            } else if edge_kind.is(ElementKind::FeatureChaining)
                && let Some(chain) = self.rel(edge).and_then(|r| r.attached_to)
            {
                self.refresh_names_guarded(chain, visited);
            }
        }
    }

    // ── Qualified names ─────────────────────────────────────────────

    fn compute_qualified_name(&self, id: ElementId) -> Option<SmolStr> {
        let element = self.get(id)?;
        if element.kind.is_pure_relationship() {
            return None;
        }
        let name = element.names.name.as_deref()?;
        let holder = self
            .ancestors(id)
            .find(|&a| self.kind(a).is_some_and(|k| !k.is_pure_relationship()));
        let Some(holder) = holder.and_then(|h| self.get(h)) else {
            return Some(SmolStr::new(name));
        };
        match holder.names.qualified_name.as_deref() {
            Some(prefix) => Some(SmolStr::from(self.config().qualify(Some(prefix), name))),
            // Unnamed root namespaces do not qualify their members.
            None if holder.parent.is_none() && holder.names.name.is_none() => {
                Some(SmolStr::new(name))
            }
            None => None,
        }
    }

    /// Recompute qualified names over the subtree rooted at `root`.
    pub(crate) fn refresh_qualified_names(&mut self, root: ElementId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let qualified = self.compute_qualified_name(id);
            if let Some(element) = self.get_mut(id) {
                element.names.qualified_name = qualified;
                stack.extend(element.owned.iter().rev().copied());
            }
        }
    }

    // ── Lookup table ────────────────────────────────────────────────

    /// Raw table entry for `name` in `namespace`.
    pub fn lookup_entry(&self, namespace: ElementId, name: &str) -> Option<MemberEntry> {
        self.ns(namespace)?.members.get(name).copied()
    }

    /// The membership registered under `name`; shadows and unresolved
    /// imports yield `None`.
    pub fn find_member(&self, namespace: ElementId, name: &str) -> Option<ElementId> {
        self.lookup_entry(namespace, name)?
            .membership()
            .filter(|&m| self.contains(m))
    }

    /// Returns true if `name` is bound to a membership or a pending import.
    pub fn has_member(&self, namespace: ElementId, name: &str) -> bool {
        self.lookup_entry(namespace, name)
            .is_some_and(|entry| !entry.is_shadow())
    }

    pub fn is_shadowed(&self, namespace: ElementId, name: &str) -> bool {
        self.lookup_entry(namespace, name)
            .is_some_and(MemberEntry::is_shadow)
    }

    /// `(name, membership)` pairs, sorted by name.
    pub fn named_members(&self, namespace: ElementId) -> Vec<(SmolStr, ElementId)> {
        let Some(ns) = self.ns(namespace) else {
            return Vec::new();
        };
        let mut members: Vec<_> = ns
            .members
            .iter()
            .filter_map(|(name, entry)| Some((name.clone(), entry.membership()?)))
            .collect();
        members.sort_by(|a, b| a.0.cmp(&b.0));
        members
    }

    /// Every name with a table entry, shadows included, sorted.
    pub fn reserved_names(&self, namespace: ElementId) -> Vec<SmolStr> {
        let Some(ns) = self.ns(namespace) else {
            return Vec::new();
        };
        let mut names: Vec<_> = ns.members.keys().cloned().collect();
        names.sort();
        names
    }

    /// Memberships directly owned by `namespace`, in order.
    pub fn memberships(&self, namespace: ElementId) -> Vec<ElementId> {
        self.owned(namespace)
            .iter()
            .copied()
            .filter(|&c| self.kind(c).is_some_and(ElementKind::is_membership))
            .collect()
    }

    /// Elements of all memberships of `namespace`.
    pub fn members(&self, namespace: ElementId) -> Vec<ElementId> {
        self.memberships(namespace)
            .into_iter()
            .filter_map(|m| self.element(m))
            .collect()
    }

    /// Elements owned through owning memberships of `namespace`.
    pub fn owned_members(&self, namespace: ElementId) -> Vec<ElementId> {
        self.memberships(namespace)
            .into_iter()
            .filter_map(|m| self.element(m).filter(|&t| self.parent(t) == Some(m)))
            .collect()
    }

    fn registration_keys(&self, registrant: ElementId) -> Vec<SmolStr> {
        let Some(element) = self.get(registrant) else {
            return Vec::new();
        };
        let mut keys = Vec::with_capacity(2);
        if element.kind.is_membership() {
            keys.extend(element.names.name.clone());
            keys.extend(element.names.short_name.clone());
        } else if element.kind.is(ElementKind::MembershipImport) {
            let imported = element
                .import
                .as_ref()
                .and_then(|i| i.imported_name.clone())
                .or_else(|| {
                    element
                        .target()
                        .and_then(|t| self.get(t))
                        .and_then(|t| t.names.name.clone())
                });
            keys.extend(imported);
        }
        keys.dedup();
        keys
    }

    fn entry_for(&self, registrant: ElementId) -> MemberEntry {
        let Some(element) = self.get(registrant) else {
            return MemberEntry::UnresolvedImport(registrant);
        };
        if element.kind.is_membership() {
            return MemberEntry::Membership(registrant);
        }
        match element.target() {
            Some(t) if self.kind(t).is_some_and(ElementKind::is_membership) => {
                MemberEntry::Membership(t)
            }
            _ => MemberEntry::UnresolvedImport(registrant),
        }
    }

    fn is_stale(&self, entry: MemberEntry) -> bool {
        match entry {
            MemberEntry::Membership(m) | MemberEntry::UnresolvedImport(m) => !self.contains(m),
            MemberEntry::Shadow => true,
        }
    }

    fn is_free(&self, namespace: ElementId, key: &str) -> bool {
        self.lookup_entry(namespace, key)
            .is_none_or(|e| self.is_stale(e))
    }

    /// Re-register the lookup keys of a membership or import in its owner.
    pub(crate) fn refresh_registration(&mut self, registrant: ElementId) {
        let Some(rel) = self.rel(registrant) else {
            return;
        };
        let old_namespace = rel.registered_in;
        let old_keys = rel.registered_keys.clone();
        let old_entry = rel.registered_entry;
        let new_namespace = self.owner(registrant).filter(|&o| self.ns(o).is_some());
        let keys = match new_namespace {
            Some(_) => self.registration_keys(registrant),
            None => Vec::new(),
        };
        let entry = self.entry_for(registrant);

        let mut freed = Vec::new();
        if let (Some(namespace), Some(old_entry)) = (old_namespace, old_entry)
            && let Some(ns) = self.ns_mut(namespace)
        {
            for key in old_keys {
                if ns.members.get(&key) == Some(&old_entry) {
                    ns.members.remove(&key);
                    freed.push(key);
                }
            }
        }

        let mut inserted = Vec::new();
        if let Some(namespace) = new_namespace {
            let free: Vec<_> = keys
                .into_iter()
                .filter(|k| self.is_free(namespace, k))
                .collect();
            if let Some(ns) = self.ns_mut(namespace) {
                for key in free {
                    ns.members.insert(key.clone(), entry);
                    inserted.push(key);
                }
            }
        }
        trace!(registrant = %registrant, ?old_namespace, ?new_namespace, keys = ?inserted, "member registration");

        if let Some(rel) = self.rel_mut(registrant) {
            rel.registered_in = new_namespace;
            rel.registered_entry = (!inserted.is_empty()).then_some(entry);
            rel.registered_keys = inserted;
        }
        if !freed.is_empty() && let Some(namespace) = old_namespace {
            self.reoffer_keys(namespace, &freed);
            self.rederive_shadows(namespace);
        }
    }

    /// Hand freed keys of `namespace` to the remaining registrants that
    /// carry them, first in ownership order.
    fn reoffer_keys(&mut self, namespace: ElementId, keys: &[SmolStr]) {
        let registrants: Vec<_> = self
            .owned(namespace)
            .iter()
            .copied()
            .filter(|&c| self.rel(c).is_some_and(|r| r.registered_in == Some(namespace)))
            .collect();
        for registrant in registrants {
            let entry = self.entry_for(registrant);
            if self
                .rel(registrant)
                .and_then(|r| r.registered_entry)
                .is_some_and(|e| e != entry)
            {
                continue;
            }
            let claimed: Vec<_> = self
                .registration_keys(registrant)
                .into_iter()
                .filter(|k| keys.contains(k) && self.is_free(namespace, k))
                .collect();
            if claimed.is_empty() {
                continue;
            }
            if let Some(ns) = self.ns_mut(namespace) {
                for key in &claimed {
                    ns.members.insert(key.clone(), entry);
                }
            }
            trace!(registrant = %registrant, keys = ?claimed, "freed keys claimed");
            if let Some(rel) = self.rel_mut(registrant) {
                rel.registered_entry = Some(entry);
                rel.registered_keys.extend(claimed);
            }
        }
    }
}
