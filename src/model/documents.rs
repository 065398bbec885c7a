//! Source documents and their invalidation cleanups.
//!
//! The model is otherwise document-agnostic. The one cross-document concern
//! is an annotating element that annotates an element of another document:
//! it registers a [`Cleanup`] with its own document so that editing or
//! removing that document retracts the back-reference.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use super::{Model, ModelError, ModelEvent, ModelResult};
use crate::base::{DocumentId, ElementId};

/// Work to run when a document is invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cleanup {
    /// Remove `annotating` from `target`'s annotation collections.
    RetractAnnotation {
        target: ElementId,
        annotating: ElementId,
    },
}

/// State of one open document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentInfo {
    uri: SmolStr,
    version: u32,
    cleanups: Vec<Cleanup>,
}

impl DocumentInfo {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Number of invalidations so far.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn cleanups(&self) -> &[Cleanup] {
        &self.cleanups
    }
}

/// Open documents by id.
#[derive(Clone, Debug, Default)]
pub struct DocumentRegistry {
    documents: IndexMap<DocumentId, DocumentInfo>,
    next_id: u32,
}

impl DocumentRegistry {
    /// Open `uri`, or return the id it is already open under.
    pub fn open(&mut self, uri: &str) -> DocumentId {
        if let Some(id) = self.by_uri(uri) {
            return id;
        }
        let id = DocumentId::new(self.next_id);
        self.next_id += 1;
        self.documents.insert(
            id,
            DocumentInfo {
                uri: SmolStr::new(uri),
                version: 0,
                cleanups: Vec::new(),
            },
        );
        id
    }

    pub fn get(&self, id: DocumentId) -> Option<&DocumentInfo> {
        self.documents.get(&id)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    pub fn by_uri(&self, uri: &str) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|(_, info)| info.uri == uri)
            .map(|(&id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentId, &DocumentInfo)> {
        self.documents.iter().map(|(&id, info)| (id, info))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Queue `cleanup` for the next invalidation of `id`; duplicates are
    /// ignored.
    pub fn register_cleanup(&mut self, id: DocumentId, cleanup: Cleanup) {
        if let Some(info) = self.documents.get_mut(&id)
            && !info.cleanups.contains(&cleanup)
        {
            info.cleanups.push(cleanup);
        }
    }

    fn take_cleanups(&mut self, id: DocumentId) -> Vec<Cleanup> {
        self.documents
            .get_mut(&id)
            .map(|info| std::mem::take(&mut info.cleanups))
            .unwrap_or_default()
    }

    fn bump_version(&mut self, id: DocumentId) -> u32 {
        match self.documents.get_mut(&id) {
            Some(info) => {
                info.version += 1;
                info.version
            }
            None => 0,
        }
    }

    fn remove(&mut self, id: DocumentId) -> Option<DocumentInfo> {
        self.documents.shift_remove(&id)
    }
}

impl Model {
    pub fn documents(&self) -> &DocumentRegistry {
        &self.documents
    }

    pub fn open_document(&mut self, uri: &str) -> DocumentId {
        self.documents.open(uri)
    }

    /// Document of `id` or of its nearest ancestor that has one.
    pub fn document_of(&self, id: ElementId) -> Option<DocumentId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|e| self.get(e)?.document)
    }

    pub(crate) fn register_cleanup(&mut self, document: DocumentId, cleanup: Cleanup) {
        self.documents.register_cleanup(document, cleanup);
    }

    /// Run the cleanups registered with `document` and bump its version.
    pub fn try_invalidate_document(&mut self, document: DocumentId) -> ModelResult<()> {
        if !self.documents.contains(document) {
            return Err(ModelError::UnknownDocument(document));
        }
        let cleanups = self.documents.take_cleanups(document);
        debug!(%document, cleanups = cleanups.len(), "invalidating document");
        for cleanup in cleanups {
            self.run_cleanup(cleanup);
        }
        let version = self.documents.bump_version(document);
        self.record(ModelEvent::DocumentInvalidated { document, version });
        Ok(())
    }

    pub fn invalidate_document(&mut self, document: DocumentId) {
        if let Err(err) = self.try_invalidate_document(document) {
            debug!(%err, "rejected invalidate_document");
        }
    }

    fn run_cleanup(&mut self, cleanup: Cleanup) {
        match cleanup {
            Cleanup::RetractAnnotation { target, annotating } => {
                self.remove_annotation(target, annotating);
                if let Some(data) = self.annotating_mut(annotating) {
                    data.registered.retain(|&t| t != target);
                }
            }
        }
    }

    /// Invalidate `document`, destroy its elements and forget it.
    pub fn try_remove_document(&mut self, document: DocumentId) -> ModelResult<()> {
        self.try_invalidate_document(document)?;
        let members: Vec<_> = self
            .elements()
            .filter(|e| e.document == Some(document))
            .map(|e| e.id)
            .collect();
        for id in members {
            if self.contains(id) {
                self.destroy(id);
            }
        }
        self.documents.remove(document);
        Ok(())
    }

    pub fn remove_document(&mut self, document: DocumentId) {
        if let Err(err) = self.try_remove_document(document) {
            debug!(%err, "rejected remove_document");
        }
    }
}
