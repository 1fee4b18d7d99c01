//! Shared infrastructure for the Vela compiler phases.
//!
//! This crate sits at the bottom of the dependency hierarchy:
//!
//! ```text
//! common (base layer)
//!   ↓
//! decl → checker
//! ```
//!
//! No module here may depend on a later phase.

pub mod diagnostics;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation};
pub use span::{Pos, Span};
