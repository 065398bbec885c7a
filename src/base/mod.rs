//! Foundation types for the model layer.
//!
//! This module provides the primitives every other layer builds on:
//! - [`ElementId`], [`DocumentId`] - arena handles for elements and source documents
//! - [`names`] - sanitizing and escaping of declared names
//!
//! This module has NO dependencies on other syster-model modules.

mod ids;
pub mod names;

pub use ids::{DocumentId, ElementId};
pub use names::{escape_name, is_basic_name, sanitize_name};
