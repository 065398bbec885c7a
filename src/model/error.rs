//! Errors for rejected model mutations.

use thiserror::Error;

use super::kind::ElementKind;
use crate::base::{DocumentId, ElementId};

/// A mutation the model refused to apply.
///
/// Queries never produce these; only the `try_*` mutation forms do. The
/// infallible forms log the error at `debug` level and leave the model
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The id does not name a live element.
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),

    /// Parenting would make an element its own ancestor.
    #[error("Ownership cycle: {child} is an ancestor of {parent}")]
    OwnershipCycle { child: ElementId, parent: ElementId },

    /// An element was given itself as parent.
    #[error("Element {0} cannot own itself")]
    SelfOwnership(ElementId),

    /// The element does not support the operation.
    #[error("Expected {expected} but {element} is {actual}")]
    KindMismatch {
        element: ElementId,
        expected: ElementKind,
        actual: ElementKind,
    },

    /// The id does not name an open document.
    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),
}

impl ModelError {
    /// Create a kind mismatch error.
    pub fn kind_mismatch(element: ElementId, expected: ElementKind, actual: ElementKind) -> Self {
        Self::KindMismatch {
            element,
            expected,
            actual,
        }
    }

    /// Create an ownership cycle error.
    pub fn cycle(child: ElementId, parent: ElementId) -> Self {
        Self::OwnershipCycle { child, parent }
    }
}

/// Result alias for model mutations.
pub type ModelResult<T> = Result<T, ModelError>;
