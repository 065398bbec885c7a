//! Model layer tests
//!
//! Integration tests for the semantic element model:
//! - Ownership and owner-change hooks
//! - Naming, qualified names and member lookup
//! - Relationship slots and ownership swaps
//! - Specialization, conformance and typings
//! - Redefinition shadowing
//! - Annotations and cross-document cleanup
//! - Implicit generalizations
//! - Imports

pub mod tests_annotations;
pub mod tests_conformance;
pub mod tests_imports;
pub mod tests_naming;
pub mod tests_ownership;
pub mod tests_redefinition;
pub mod tests_slots;
