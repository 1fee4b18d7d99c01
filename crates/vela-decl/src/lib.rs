//! Resolved declaration surface for the Vela compiler.
//!
//! This crate defines what later phases consume, not how it is produced:
//! - `ty` - The resolved type grammar (a closed sum, one node per construct)
//! - `decl` - Class and typedef declaration info with their type parameters
//! - `provider` - The read-only lookup capability over declarations
//!
//! Parsing and name resolution live upstream; everything here is already
//! resolved and positioned.

pub mod decl;
pub mod names;
pub mod provider;
pub mod ty;

pub use decl::{
    ClassElt, ClassInfo, ClassKind, DeclaredVariance, Tparam, TypeDecl, TypedefInfo, Visibility,
};
pub use provider::{DeclProvider, DeclStore};
pub use ty::{
    ConstraintKind, FnParam, FnType, ParamMode, Prim, ShapeField, Ty, TyKind, WhereConstraint,
};
