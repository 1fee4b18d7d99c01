//! Declaration-site variance checking.
//!
//! Every generic parameter of a Vela class or typedef carries a declared
//! variance (`+`, `-`, or none for invariant). This crate verifies that each
//! *use* of a parameter sits in a position consistent with its declaration,
//! and explains violations by replaying the chain of contexts that produced
//! the inferred polarity.
//!
//! The crate is organized as:
//! - `reason` - Reason stacks: the provenance record behind every inferred
//!   polarity, and the rendering of those records into messages
//! - `variance` - The polarity algebra: `flip`, `compose`, construction from
//!   declared annotations
//! - `oracle` - Per-name declared-variance vectors, projected from the
//!   declaration provider
//! - `traverse` - The structural walk over the type grammar
//! - `check` - Entry points: `check_class`, `check_typedef`, `check_program`
//! - `errors` - Structured error records and the sink they are reported to
//!
//! The checker is purely functional over its inputs: no shared mutable
//! state, no I/O, no suspension points. Callers parallelize by invoking it
//! on disjoint declarations.

pub mod errors;
pub mod oracle;
pub mod reason;
pub mod variance;

mod check;
mod traverse;

pub use check::{check_class, check_program, check_typedef, CheckRequest};
pub use errors::{codes, ErrorSink, VarianceError};
pub use reason::{Polarity, PositionDescr, Reason, ReasonStack};
pub use variance::{compose, flip, make_variance, Variance};

#[cfg(test)]
mod prop_tests;
