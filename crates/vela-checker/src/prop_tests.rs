//! Property tests for the polarity algebra using proptest.
//!
//! These stress invariants that must hold for ANY variance value the
//! algebra can produce, not just hand-picked examples:
//!
//! 1. Every non-bivariant value carries at least one reason per stack
//! 2. Flipping twice with the same reason preserves the tag
//! 3. Invariant absorbs composition from either side
//! 4. Bivariant is the identity of composition, up to re-tagging
//! 5. Composition of tags follows the sign table
//! 6. Chain rendering covers every frame exactly once

use proptest::prelude::*;

use vela_common::{Pos, Span};
use vela_decl::decl::DeclaredVariance;

use crate::reason::{detailed_message, Polarity, PositionDescr, Reason, ReasonStack};
use crate::variance::{compose, flip, make_variance, Variance};

fn arb_pos() -> impl Strategy<Value = Pos> {
    (0u32..200).prop_map(|start| Pos::new("prop.vela", Span::from_len(start, 1)))
}

fn arb_polarity() -> impl Strategy<Value = Polarity> {
    prop::sample::select(vec![
        Polarity::Covariant,
        Polarity::Contravariant,
        Polarity::Invariant,
    ])
}

fn arb_declared() -> impl Strategy<Value = DeclaredVariance> {
    prop::sample::select(vec![
        DeclaredVariance::Covariant,
        DeclaredVariance::Contravariant,
        DeclaredVariance::Invariant,
    ])
}

fn arb_descr() -> impl Strategy<Value = PositionDescr> {
    prop::sample::select(vec![
        PositionDescr::Typedef,
        PositionDescr::Member,
        PositionDescr::TypeParameter,
        PositionDescr::FunctionParameter,
        PositionDescr::FunctionReturn,
        PositionDescr::TypeArgument("Box".to_string()),
        PositionDescr::ConstraintAs,
        PositionDescr::ConstraintSuper,
        PositionDescr::WhereEq,
        PositionDescr::InoutParameter,
    ])
}

fn arb_reason() -> impl Strategy<Value = Reason> {
    (arb_pos(), arb_descr(), arb_polarity())
        .prop_map(|(pos, descr, polarity)| Reason::new(pos, descr, polarity))
}

/// One algebra step applied on top of a base variance.
#[derive(Clone, Debug)]
enum Op {
    Flip(Reason),
    Compose(Pos, DeclaredVariance),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_reason().prop_map(Op::Flip),
        (arb_pos(), arb_declared()).prop_map(|(pos, declared)| Op::Compose(pos, declared)),
    ]
}

/// Any variance the algebra can produce: a seeded annotation or bivariant,
/// pushed through a short random sequence of flips and compositions.
fn arb_variance() -> impl Strategy<Value = Variance> {
    let base = prop_oneof![
        (arb_pos(), arb_declared()).prop_map(|(pos, declared)| make_variance(
            PositionDescr::TypeParameter,
            &pos,
            declared
        )),
        Just(Variance::Bivariant),
    ];
    (base, prop::collection::vec(arb_op(), 0..4)).prop_map(|(base, ops)| {
        ops.into_iter().fold(base, |variance, op| match op {
            Op::Flip(reason) => flip(reason, &variance),
            Op::Compose(pos, declared) => {
                let slot = make_variance(PositionDescr::TypeParameter, &pos, declared);
                compose(
                    &pos,
                    PositionDescr::TypeArgument("Box".to_string()),
                    &variance,
                    &slot,
                )
            }
        })
    })
}

fn stacks_are_sound(variance: &Variance) -> bool {
    match variance {
        Variance::Covariant(stack) | Variance::Contravariant(stack) => !stack.is_empty(),
        Variance::Invariant(co, contra) => !co.is_empty() && !contra.is_empty(),
        Variance::Bivariant => true,
    }
}

proptest! {
    /// Whatever sequence of operations produced a variance, a signed value
    /// always carries its proof.
    #[test]
    fn generated_variances_carry_proofs(variance in arb_variance()) {
        prop_assert!(stacks_are_sound(&variance));
    }

    /// Flipping twice with the same reason is the identity on the tag.
    #[test]
    fn double_flip_preserves_the_tag(reason in arb_reason(), variance in arb_variance()) {
        let twice = flip(reason.clone(), &flip(reason, &variance));
        prop_assert_eq!(twice.polarity(), variance.polarity());
    }

    /// One flip maps the tag through polarity negation.
    #[test]
    fn flip_negates_the_tag(reason in arb_reason(), variance in arb_variance()) {
        let flipped = flip(reason, &variance);
        prop_assert_eq!(flipped.polarity(), variance.polarity().map(Polarity::flip));
    }

    /// Invariant absorbs composition from either side.
    #[test]
    fn invariant_absorbs_composition(
        pos in arb_pos(),
        seed in arb_pos(),
        variance in arb_variance(),
    ) {
        let invariant =
            make_variance(PositionDescr::TypeParameter, &seed, DeclaredVariance::Invariant);
        let descr = PositionDescr::TypeArgument("Box".to_string());
        let left = compose(&pos, descr.clone(), &invariant, &variance);
        prop_assert!(matches!(left, Variance::Invariant(_, _)));
        let right = compose(&pos, descr, &variance, &invariant);
        prop_assert!(matches!(right, Variance::Invariant(_, _)));
    }

    /// Bivariant on either side of a composition returns the other operand,
    /// up to re-tagging of the recorded reasons.
    #[test]
    fn bivariant_is_the_identity(pos in arb_pos(), variance in arb_variance()) {
        let descr = PositionDescr::TypeArgument("Box".to_string());
        let left = compose(&pos, descr.clone(), &Variance::Bivariant, &variance);
        prop_assert_eq!(left.polarity(), variance.polarity());
        let right = compose(&pos, descr, &variance, &Variance::Bivariant);
        prop_assert_eq!(right.polarity(), variance.polarity());
    }

    /// `compose` on full variances agrees with sign composition on tags.
    #[test]
    fn composition_follows_the_sign_table(
        pos in arb_pos(),
        from in arb_variance(),
        to in arb_variance(),
    ) {
        let result = compose(
            &pos,
            PositionDescr::TypeArgument("Box".to_string()),
            &from,
            &to,
        );
        let expected = match (from.polarity(), to.polarity()) {
            (None, other) => other,
            (other, None) => other,
            (Some(a), Some(b)) => Some(a.compose(b)),
        };
        prop_assert_eq!(result.polarity(), expected);
    }

    /// Rendering covers every frame: one line for a lone leaf, a summary
    /// plus one line per frame otherwise.
    #[test]
    fn detailed_message_covers_every_frame(
        reasons in prop::collection::vec(arb_reason(), 0..6),
        pos in arb_pos(),
    ) {
        let stack = reasons
            .iter()
            .fold(ReasonStack::empty(), |stack, reason| stack.push(reason.clone()));
        let rendered = detailed_message("covariant (+)", &pos, &stack);
        let expected = match reasons.len() {
            0 => 0,
            1 => 1,
            n => n + 1,
        };
        prop_assert_eq!(rendered.len(), expected);
    }
}
