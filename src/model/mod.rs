//! The semantic element model.
//!
//! [`Model`] is an arena of [`Element`]s addressed by [`ElementId`]. Every
//! structural mutation goes through the model so the derived state it
//! implies (semantic owners, member lookup tables, qualified names, heritage
//! lists, typings caches, redefinition shadows, annotation registrations)
//! is updated before the call returns.
//!
//! ## Example
//!
//! ```ignore
//! use syster_model::model::{ElementKind, Model};
//!
//! let mut model = Model::new();
//! let pkg = model.create(ElementKind::Package);
//! model.set_declared_name(pkg, Some("P"));
//!
//! let vehicle = model.create(ElementKind::PartDefinition);
//! model.set_declared_name(vehicle, Some("Vehicle"));
//! let membership = model.add_owned_member(pkg, vehicle);
//!
//! assert_eq!(model.find_member(pkg, "Vehicle"), Some(membership));
//! assert_eq!(model.qualified_name(vehicle), Some("P::Vehicle"));
//! ```
//!
//! The module is split by concern; each file adds an `impl Model` block:
//!
//! | File | Concern |
//! |------|---------|
//! | `ownership` | `set_parent`, owner resolution, facet hooks |
//! | `naming` | names, qualified names, member lookup table |
//! | `relationship` | targets, sources, slot ownership swaps |
//! | `heritage` | heritage lists, type relationships, conformance |
//! | `typing` | typings inference and feature queries |
//! | `redefinition` | effective names and lookup shadows |
//! | `implicit` | default library generalizations |
//! | `annotations` | annotation collections |
//! | `documents` | document registry and cleanups |
//! | `imports` | imported memberships |

mod annotations;
mod config;
mod documents;
mod element;
mod error;
mod events;
mod heritage;
mod implicit;
mod imports;
mod kind;
mod naming;
mod ownership;
mod redefinition;
mod relationship;
mod typing;
pub mod views;

pub use config::ModelConfig;
pub use documents::{Cleanup, DocumentInfo, DocumentRegistry};
pub use element::{
    AnnotatingData, Annotations, Bound, Direction, Element, FeatureData, FeatureFlags,
    ImportData, MemberEntry, MultiplicityBounds, NamespaceData, Names, RelationshipData,
    TypeData, ValueBinding, Visibility,
};
pub use error::{ModelError, ModelResult};
pub use events::{ChangeJournal, ModelEvent};
pub use implicit::{GeneralizationTable, LibraryIndex, QualifiedNameIndex, TypeCatalogue};
pub use kind::{ElementKind, KindSet};
pub use relationship::Slot;
pub use views::{ElementView, FeatureView, TypeView};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::base::{DocumentId, ElementId};

/// The element arena plus everything derived from it.
#[derive(Debug)]
pub struct Model {
    config: ModelConfig,
    catalogue: TypeCatalogue,
    elements: IndexMap<ElementId, Element>,
    next_id: u32,
    /// Relationship edges by their target element.
    incoming: FxHashMap<ElementId, Vec<ElementId>>,
    /// Relationship edges by their explicit source.
    sourced: FxHashMap<ElementId, Vec<ElementId>>,
    /// Bumped on every heritage or type-relationship change; typings caches
    /// compare against it.
    heritage_epoch: u64,
    documents: DocumentRegistry,
    journal: ChangeJournal,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create an empty model with the default config and the standard
    /// type catalogue.
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default(), TypeCatalogue::standard())
    }

    /// Like [`new`](Self::new), with event recording turned on.
    pub fn recording() -> Self {
        let config = ModelConfig {
            record_events: true,
            ..ModelConfig::default()
        };
        Self::with_config(config, TypeCatalogue::standard())
    }

    pub fn with_config(config: ModelConfig, catalogue: TypeCatalogue) -> Self {
        Self {
            config,
            catalogue,
            elements: IndexMap::new(),
            next_id: 0,
            incoming: FxHashMap::default(),
            sourced: FxHashMap::default(),
            heritage_epoch: 0,
            documents: DocumentRegistry::default(),
            journal: ChangeJournal::default(),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &TypeCatalogue {
        &self.catalogue
    }

    // ── Lookup ──────────────────────────────────────────────────────

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.get(id).map(|e| e.kind)
    }

    /// Returns true if `id` is live and of `kind` (or a subkind).
    pub fn is(&self, id: ElementId, kind: ElementKind) -> bool {
        self.kind(id).is_some_and(|k| k.is(kind))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Live elements in creation order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Elements without a parent.
    pub fn roots(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements
            .values()
            .filter(|e| e.parent.is_none())
            .map(|e| e.id)
    }

    /// The element or an `UnknownElement` error.
    pub(crate) fn require(&self, id: ElementId) -> ModelResult<&Element> {
        self.get(id).ok_or(ModelError::UnknownElement(id))
    }

    /// Fail unless `id` is live and of `kind`.
    pub(crate) fn require_kind(&self, id: ElementId, kind: ElementKind) -> ModelResult<()> {
        let element = self.require(id)?;
        if element.kind.is(kind) {
            Ok(())
        } else {
            Err(ModelError::kind_mismatch(id, kind, element.kind))
        }
    }

    // ── Facet access ────────────────────────────────────────────────

    pub(crate) fn rel(&self, id: ElementId) -> Option<&RelationshipData> {
        self.get(id)?.relationship.as_deref()
    }

    pub(crate) fn rel_mut(&mut self, id: ElementId) -> Option<&mut RelationshipData> {
        self.get_mut(id)?.relationship.as_deref_mut()
    }

    pub(crate) fn ty(&self, id: ElementId) -> Option<&TypeData> {
        self.get(id)?.ty.as_deref()
    }

    pub(crate) fn ty_mut(&mut self, id: ElementId) -> Option<&mut TypeData> {
        self.get_mut(id)?.ty.as_deref_mut()
    }

    pub(crate) fn feat(&self, id: ElementId) -> Option<&FeatureData> {
        self.get(id)?.feature.as_deref()
    }

    pub(crate) fn feat_mut(&mut self, id: ElementId) -> Option<&mut FeatureData> {
        self.get_mut(id)?.feature.as_deref_mut()
    }

    pub(crate) fn ns(&self, id: ElementId) -> Option<&NamespaceData> {
        self.get(id)?.namespace.as_deref()
    }

    pub(crate) fn ns_mut(&mut self, id: ElementId) -> Option<&mut NamespaceData> {
        self.get_mut(id)?.namespace.as_deref_mut()
    }

    pub(crate) fn annotating(&self, id: ElementId) -> Option<&AnnotatingData> {
        self.get(id)?.annotating.as_deref()
    }

    pub(crate) fn annotating_mut(&mut self, id: ElementId) -> Option<&mut AnnotatingData> {
        self.get_mut(id)?.annotating.as_deref_mut()
    }

    // ── Journal ─────────────────────────────────────────────────────

    pub fn journal(&self) -> &ChangeJournal {
        &self.journal
    }

    pub fn journal_mut(&mut self) -> &mut ChangeJournal {
        &mut self.journal
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<ModelEvent> {
        self.journal.take_events()
    }

    pub(crate) fn record(&mut self, event: ModelEvent) {
        if self.config.record_events {
            self.journal.record(event);
        }
    }

    // ── Derived-state bookkeeping ───────────────────────────────────

    pub fn heritage_epoch(&self) -> u64 {
        self.heritage_epoch
    }

    pub(crate) fn bump_heritage_epoch(&mut self) {
        self.heritage_epoch = self.heritage_epoch.wrapping_add(1);
    }

    /// Relationships whose target is `id`.
    pub fn incoming(&self, id: ElementId) -> &[ElementId] {
        self.incoming.get(&id).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn link_incoming(&mut self, target: ElementId, edge: ElementId) {
        let edges = self.incoming.entry(target).or_default();
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    pub(crate) fn unlink_incoming(&mut self, target: ElementId, edge: ElementId) {
        if let Some(edges) = self.incoming.get_mut(&target) {
            edges.retain(|&e| e != edge);
            if edges.is_empty() {
                self.incoming.remove(&target);
            }
        }
    }

    /// Relationships whose explicit source is `id`.
    pub fn sourced_edges(&self, id: ElementId) -> &[ElementId] {
        self.sourced.get(&id).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn link_sourced(&mut self, source: ElementId, edge: ElementId) {
        let edges = self.sourced.entry(source).or_default();
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    pub(crate) fn unlink_sourced(&mut self, source: ElementId, edge: ElementId) {
        if let Some(edges) = self.sourced.get_mut(&source) {
            edges.retain(|&e| e != edge);
            if edges.is_empty() {
                self.sourced.remove(&source);
            }
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Create a detached element of `kind`.
    pub fn create(&mut self, kind: ElementKind) -> ElementId {
        self.allocate(kind, None)
    }

    /// Create a detached element that belongs to `document`.
    pub fn try_create_in(&mut self, document: DocumentId, kind: ElementKind) -> ModelResult<ElementId> {
        if !self.documents.contains(document) {
            return Err(ModelError::UnknownDocument(document));
        }
        Ok(self.allocate(kind, Some(document)))
    }

    /// Like [`try_create_in`](Self::try_create_in); an unknown document
    /// yields an element without a document.
    pub fn create_in(&mut self, document: DocumentId, kind: ElementKind) -> ElementId {
        match self.try_create_in(document, kind) {
            Ok(id) => id,
            Err(err) => {
                debug!(%err, "creating element outside any document");
                self.allocate(kind, None)
            }
        }
    }

    fn allocate(&mut self, kind: ElementKind, document: Option<DocumentId>) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, Element::new(id, kind, document));
        self.record(ModelEvent::ElementCreated { element: id, kind });
        id
    }

    /// Remove an element and everything it owns.
    ///
    /// Relationships pointing at a destroyed element keep existing with an
    /// absent target.
    pub fn try_destroy(&mut self, id: ElementId) -> ModelResult<()> {
        self.require(id)?;
        self.set_parent(id, None);
        self.destroy_detached(id);
        Ok(())
    }

    pub fn destroy(&mut self, id: ElementId) {
        if let Err(err) = self.try_destroy(id) {
            debug!(%err, "rejected destroy");
        }
    }

    fn destroy_detached(&mut self, id: ElementId) {
        let children = self.owned(id).to_vec();
        for child in children {
            if self.contains(child) {
                self.set_parent(child, None);
                self.destroy_detached(child);
            }
        }

        self.release_links(id);

        for edge in self.incoming(id).to_vec() {
            self.set_element(edge, None);
        }
        for edge in self.sourced_edges(id).to_vec() {
            self.set_source(edge, None);
        }

        self.retract_annotating(id);
        self.drop_annotations_of(id);

        self.elements.shift_remove(&id);
        self.incoming.remove(&id);
        self.sourced.remove(&id);
        self.bump_heritage_epoch();
        self.record(ModelEvent::ElementDestroyed(id));
    }

    /// Clear the outgoing links of a relationship so its derived state is
    /// retracted.
    fn release_links(&mut self, id: ElementId) {
        if self.rel(id).is_some() {
            self.set_source(id, None);
            self.set_element(id, None);
        }
    }

    /// Re-bind an element in place as `kind`.
    ///
    /// Identity, parent and document survive; owned content, names and all
    /// facet state are dropped. Relationships pointing at the element keep
    /// pointing at it.
    pub fn try_reinitialize(&mut self, id: ElementId, kind: ElementKind) -> ModelResult<()> {
        let parent = self.require(id)?.parent;

        for child in self.owned(id).to_vec() {
            self.destroy(child);
        }
        self.release_links(id);
        self.set_parent(id, None);
        self.retract_annotating(id);
        self.set_declared_name(id, None);
        self.set_declared_short_name(id, None);

        if let Some(element) = self.get_mut(id) {
            element.reset_facets(kind);
            element.names = Names::default();
        }
        self.bump_heritage_epoch();
        if self.config.record_events {
            self.journal.mark_dirty(id);
        }

        self.try_set_parent(id, parent)
    }

    pub fn reinitialize(&mut self, id: ElementId, kind: ElementKind) {
        if let Err(err) = self.try_reinitialize(id, kind) {
            debug!(%err, "rejected reinitialize");
        }
    }
}
