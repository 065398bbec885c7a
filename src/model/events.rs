//! Change journal for [`Model`](super::Model) mutations.
//!
//! When [`ModelConfig::record_events`](super::ModelConfig::record_events)
//! is set, every mutation that changes structure or derived state appends a
//! [`ModelEvent`]. The journal also keeps the classic dirty/created/removed
//! sets so incremental consumers can ask "what changed since I last looked"
//! without replaying the event list.
//!
//! Nothing in the model drains the journal. Consumers that turn recording
//! on call [`ChangeJournal::take_events`] or [`ChangeJournal::clear`].

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{DocumentId, ElementId};

use super::kind::ElementKind;

/// A recorded mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    ElementCreated {
        element: ElementId,
        kind: ElementKind,
    },
    ElementDestroyed(ElementId),
    /// Structural parent changed.
    ParentSet {
        element: ElementId,
        previous: Option<ElementId>,
        current: Option<ElementId>,
    },
    /// Semantic owner changed; fired once per owner transition.
    OwnerSet {
        element: ElementId,
        previous: Option<ElementId>,
        current: Option<ElementId>,
    },
    NameChanged {
        element: ElementId,
        name: Option<SmolStr>,
    },
    HeritageAdded {
        ty: ElementId,
        edge: ElementId,
    },
    HeritageRemoved {
        ty: ElementId,
        edge: ElementId,
    },
    DocumentInvalidated {
        document: DocumentId,
        version: u32,
    },
}

impl ModelEvent {
    /// The element the event is about, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            ModelEvent::ElementCreated { element, .. }
            | ModelEvent::ParentSet { element, .. }
            | ModelEvent::OwnerSet { element, .. }
            | ModelEvent::NameChanged { element, .. } => Some(*element),
            ModelEvent::ElementDestroyed(element) => Some(*element),
            ModelEvent::HeritageAdded { ty, .. } | ModelEvent::HeritageRemoved { ty, .. } => {
                Some(*ty)
            }
            ModelEvent::DocumentInvalidated { .. } => None,
        }
    }
}

/// Tracks mutations applied to a model.
#[derive(Clone, Debug, Default)]
pub struct ChangeJournal {
    /// Elements touched since the last clear (includes created ones).
    modified: FxHashSet<ElementId>,
    created: FxHashSet<ElementId>,
    removed: FxHashSet<ElementId>,
    events: Vec<ModelEvent>,
}

impl ChangeJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all dirty state and drop recorded events.
    pub fn clear(&mut self) {
        self.modified.clear();
        self.created.clear();
        self.removed.clear();
        self.events.clear();
    }

    // ── Query ───────────────────────────────────────────────────────

    /// Whether any mutations have been recorded.
    pub fn has_changes(&self) -> bool {
        !self.modified.is_empty() || !self.removed.is_empty()
    }

    pub fn is_dirty(&self, id: ElementId) -> bool {
        self.modified.contains(&id)
    }

    pub fn is_created(&self, id: ElementId) -> bool {
        self.created.contains(&id)
    }

    pub fn is_removed(&self, id: ElementId) -> bool {
        self.removed.contains(&id)
    }

    /// Dirty element ids in ascending order.
    pub fn dirty_elements(&self) -> Vec<ElementId> {
        let mut ids: Vec<_> = self.modified.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Removed element ids in ascending order.
    pub fn removed_elements(&self) -> Vec<ElementId> {
        let mut ids: Vec<_> = self.removed.iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn events(&self) -> &[ModelEvent] {
        &self.events
    }

    /// Owner transitions recorded for `id`, oldest first.
    pub fn owner_transitions(&self, id: ElementId) -> Vec<(Option<ElementId>, Option<ElementId>)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ModelEvent::OwnerSet {
                    element,
                    previous,
                    current,
                } if *element == id => Some((*previous, *current)),
                _ => None,
            })
            .collect()
    }

    /// Drain the event list, keeping the dirty sets.
    pub fn take_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Recording ───────────────────────────────────────────────────

    /// Mark an element as dirty without an event.
    pub fn mark_dirty(&mut self, id: ElementId) {
        self.modified.insert(id);
    }

    pub(crate) fn record(&mut self, event: ModelEvent) {
        match &event {
            ModelEvent::ElementCreated { element, .. } => {
                self.created.insert(*element);
                self.modified.insert(*element);
            }
            ModelEvent::ElementDestroyed(element) => {
                self.modified.remove(element);
                if !self.created.remove(element) {
                    self.removed.insert(*element);
                }
            }
            other => {
                if let Some(element) = other.element() {
                    self.modified.insert(element);
                }
            }
        }
        self.events.push(event);
    }
}
