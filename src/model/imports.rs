//! Imports: membership imports register by name, namespace imports expand
//! on demand.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::{ElementKind, Model, Visibility};
use crate::base::ElementId;

impl Model {
    /// Imports directly owned by `namespace`, in order.
    pub fn imports(&self, namespace: ElementId) -> Vec<ElementId> {
        self.owned(namespace)
            .iter()
            .copied()
            .filter(|&c| self.is(c, ElementKind::Import))
            .collect()
    }

    pub fn imported_name(&self, import: ElementId) -> Option<&str> {
        self.get(import)?.import.as_ref()?.imported_name.as_deref()
    }

    /// Set the name a membership import was written with. The import's
    /// lookup key follows it.
    pub fn set_imported_name(&mut self, import: ElementId, name: Option<&str>) {
        let Some(data) = self.get_mut(import).and_then(|e| e.import.as_mut()) else {
            return;
        };
        let name = name.map(SmolStr::new);
        if data.imported_name == name {
            return;
        }
        data.imported_name = name;
        self.refresh_registration(import);
    }

    pub fn is_recursive(&self, import: ElementId) -> bool {
        self.get(import)
            .and_then(|e| e.import.as_ref())
            .is_some_and(|i| i.is_recursive)
    }

    pub fn set_recursive(&mut self, import: ElementId, recursive: bool) {
        if let Some(data) = self.get_mut(import).and_then(|e| e.import.as_mut()) {
            data.is_recursive = recursive;
        }
    }

    /// Ignore visibility when expanding.
    pub fn is_import_all(&self, import: ElementId) -> bool {
        self.get(import)
            .and_then(|e| e.import.as_ref())
            .is_some_and(|i| i.is_import_all)
    }

    pub fn set_import_all(&mut self, import: ElementId, all: bool) {
        if let Some(data) = self.get_mut(import).and_then(|e| e.import.as_mut()) {
            data.is_import_all = all;
        }
    }

    /// Wholesale import of a namespace's members.
    pub fn is_namespace_import(&self, import: ElementId) -> bool {
        self.is(import, ElementKind::NamespaceImport)
    }

    /// Namespace whose members the import brings in: the target of a
    /// namespace import, or the element of a membership import's target.
    pub fn imported_namespace(&self, import: ElementId) -> Option<ElementId> {
        let target = self.element(import)?;
        let namespace = if self.is_namespace_import(import) {
            target
        } else {
            self.element(target)?
        };
        self.ns(namespace).map(|_| namespace)
    }

    /// Memberships brought into `namespace` by its imports.
    pub fn imported_memberships(&self, namespace: ElementId) -> Vec<ElementId> {
        let mut visited = FxHashSet::default();
        visited.insert(namespace);
        let mut out = Vec::new();
        for import in self.imports(namespace) {
            self.expand_import(import, &mut visited, &mut out);
        }
        out
    }

    /// Owned memberships followed by imported ones.
    pub fn visible_memberships(&self, namespace: ElementId) -> Vec<ElementId> {
        let mut all = self.memberships(namespace);
        for m in self.imported_memberships(namespace) {
            if !all.contains(&m) {
                all.push(m);
            }
        }
        all
    }

    fn expand_import(&self, import: ElementId, visited: &mut FxHashSet<ElementId>, out: &mut Vec<ElementId>) {
        let all = self.is_import_all(import);
        let recursive = self.is_recursive(import);
        if self.is_namespace_import(import) {
            if let Some(namespace) = self.imported_namespace(import) {
                self.collect_visible(namespace, all, recursive, visited, out);
            }
            return;
        }

        let Some(membership) = self
            .element(import)
            .filter(|&m| self.is(m, ElementKind::Membership))
        else {
            return;
        };
        if all || self.visibility(membership) == Visibility::Public {
            push_unique(out, membership);
        }
        if recursive && let Some(namespace) = self.imported_namespace(import) {
            self.collect_visible(namespace, all, true, visited, out);
        }
    }

    fn collect_visible(
        &self,
        namespace: ElementId,
        all: bool,
        recursive: bool,
        visited: &mut FxHashSet<ElementId>,
        out: &mut Vec<ElementId>,
    ) {
        if !visited.insert(namespace) || visited.len() > self.config().max_inference_depth {
            return;
        }
        let visible: Vec<_> = self
            .memberships(namespace)
            .into_iter()
            .filter(|&m| all || self.visibility(m) == Visibility::Public)
            .collect();
        for &m in &visible {
            push_unique(out, m);
        }
        // Public imports are re-exported.
        for import in self.imports(namespace) {
            if all || self.visibility(import) == Visibility::Public {
                self.expand_import(import, visited, out);
            }
        }
        if recursive {
            for m in visible {
                if let Some(nested) = self.element(m).filter(|&t| self.ns(t).is_some()) {
                    self.collect_visible(nested, all, true, visited, out);
                }
            }
        }
    }
}

fn push_unique(out: &mut Vec<ElementId>, id: ElementId) {
    if !out.contains(&id) {
        out.push(id);
    }
}
