//! The polarity algebra.
//!
//! An inferred `Variance` pairs a polarity with the proof of how it arose.
//! `flip` negates across a contravariant construct, `compose` threads the
//! current polarity through a declared type-argument slot, and
//! `make_variance` seeds a variance from a user-written annotation. All
//! three keep the reason stacks in step with the tags so errors can replay
//! the inference.

use vela_common::Pos;
use vela_decl::decl::DeclaredVariance;

use crate::reason::{Polarity, PositionDescr, Reason, ReasonStack};

/// The variance inferred for a position, with its provenance.
///
/// `Covariant`/`Contravariant` carry the chain of contexts that produced the
/// sign. `Invariant` appears in both roles at once and keeps one proof for
/// each. `Bivariant` is the absence of a constraint: a parameter that does
/// not appear, or one that is out of scope, imposes nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Variance {
    Covariant(ReasonStack),
    Contravariant(ReasonStack),
    Invariant(ReasonStack, ReasonStack),
    Bivariant,
}

impl Variance {
    /// The tag alone, if there is one.
    pub fn polarity(&self) -> Option<Polarity> {
        match self {
            Variance::Covariant(_) => Some(Polarity::Covariant),
            Variance::Contravariant(_) => Some(Polarity::Contravariant),
            Variance::Invariant(_, _) => Some(Polarity::Invariant),
            Variance::Bivariant => None,
        }
    }

    /// A copy whose innermost reason points at `pos`. Refining the head
    /// tightens error arrows when a generic occurs deep inside a larger
    /// type; invariant and bivariant values are returned unchanged.
    pub fn refined_at(&self, pos: &Pos) -> Variance {
        match self {
            Variance::Covariant(stack) if head_pos_differs(stack, pos) => {
                Variance::Covariant(stack.with_head_pos(pos.clone()))
            }
            Variance::Contravariant(stack) if head_pos_differs(stack, pos) => {
                Variance::Contravariant(stack.with_head_pos(pos.clone()))
            }
            other => other.clone(),
        }
    }
}

fn head_pos_differs(stack: &ReasonStack, pos: &Pos) -> bool {
    stack.head().is_some_and(|reason| &reason.pos != pos)
}

impl std::fmt::Display for Variance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.polarity() {
            Some(polarity) => f.write_str(polarity.describe()),
            None => f.write_str("bivariant"),
        }
    }
}

/// Negate a polarity across a contravariant construct, recording `reason`.
///
/// Invariant is already maximally constrained and bivariant has nothing to
/// negate; both pass through unchanged.
pub fn flip(reason: Reason, variance: &Variance) -> Variance {
    match variance {
        Variance::Covariant(stack) => Variance::Contravariant(stack.push(reason)),
        Variance::Contravariant(stack) => Variance::Covariant(stack.push(reason)),
        Variance::Invariant(_, _) => variance.clone(),
        Variance::Bivariant => Variance::Bivariant,
    }
}

/// Compose the current polarity `from` with the declared polarity `to` of a
/// type-argument slot.
///
/// The result follows sign composition; the new head reason records the
/// slot's declared polarity at the argument's position, on top of `from`'s
/// stack. `to`'s own stack is discarded: its declaration can live in a
/// distant file, while the local position is always meaningful. An
/// invariant slot therefore restarts both proofs at the argument itself,
/// and bivariant on either side is the identity.
pub fn compose(pos: &Pos, descr: PositionDescr, from: &Variance, to: &Variance) -> Variance {
    match (from, to) {
        (Variance::Invariant(_, _), _) => from.clone(),
        (_, Variance::Invariant(_, _)) => {
            let stack =
                ReasonStack::singleton(Reason::new(pos.clone(), descr, Polarity::Invariant));
            Variance::Invariant(stack.clone(), stack)
        }
        (Variance::Bivariant, _) => to.clone(),
        (_, Variance::Bivariant) => from.clone(),
        (Variance::Covariant(stack), Variance::Covariant(_)) => Variance::Covariant(
            stack.push(Reason::new(pos.clone(), descr, Polarity::Covariant)),
        ),
        (Variance::Covariant(stack), Variance::Contravariant(_)) => Variance::Contravariant(
            stack.push(Reason::new(pos.clone(), descr, Polarity::Contravariant)),
        ),
        (Variance::Contravariant(stack), Variance::Covariant(_)) => Variance::Contravariant(
            stack.push(Reason::new(pos.clone(), descr, Polarity::Covariant)),
        ),
        (Variance::Contravariant(stack), Variance::Contravariant(_)) => Variance::Covariant(
            stack.push(Reason::new(pos.clone(), descr, Polarity::Contravariant)),
        ),
    }
}

/// Seed a variance from a declared annotation at `pos`.
pub fn make_variance(descr: PositionDescr, pos: &Pos, annotation: DeclaredVariance) -> Variance {
    let polarity = Polarity::from(annotation);
    let stack = ReasonStack::singleton(Reason::new(pos.clone(), descr, polarity));
    match annotation {
        DeclaredVariance::Covariant => Variance::Covariant(stack),
        DeclaredVariance::Contravariant => Variance::Contravariant(stack),
        DeclaredVariance::Invariant => Variance::Invariant(stack.clone(), stack),
    }
}

#[cfg(test)]
#[path = "tests/polarity_tests.rs"]
mod tests;
