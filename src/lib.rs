//! # syster-model
//!
//! Semantic element model for KerML and SysML v2.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! model     → Element arena: ownership, naming, relationships, heritage,
//!             typings, redefinition shadows, annotations, documents,
//!             implicit generalizations, views
//!   ↓
//! base      → Primitives (ElementId, DocumentId, name sanitizing)
//! ```
//!
//! Parsing, linking and validation live outside this crate. A builder walks
//! its syntax tree and calls [`Model`] mutators; scope providers and
//! validators read the result through the query API or [`model::views`].

// ============================================================================
// MODULES (dependency order: base → model)
// ============================================================================

/// Foundation types: ElementId, DocumentId, name sanitizing
pub mod base;

/// The semantic element model
pub mod model;

// Re-export the types nearly every caller needs
pub use base::{DocumentId, ElementId};
pub use model::{ElementKind, Model, ModelConfig, ModelError, ModelEvent, ModelResult};
