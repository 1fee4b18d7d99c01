use super::*;
use crate::reason::{Polarity, PositionDescr, Reason, ReasonStack};
use vela_common::{Pos, Span};
use vela_decl::decl::DeclaredVariance;

fn pos(start: u32) -> Pos {
    Pos::new("algebra.vela", Span::from_len(start, 1))
}

fn reason(start: u32, polarity: Polarity) -> Reason {
    Reason::new(pos(start), PositionDescr::FunctionParameter, polarity)
}

fn cov(start: u32) -> Variance {
    make_variance(PositionDescr::TypeParameter, &pos(start), DeclaredVariance::Covariant)
}

fn contra(start: u32) -> Variance {
    make_variance(
        PositionDescr::TypeParameter,
        &pos(start),
        DeclaredVariance::Contravariant,
    )
}

fn inv(start: u32) -> Variance {
    make_variance(PositionDescr::TypeParameter, &pos(start), DeclaredVariance::Invariant)
}

#[test]
fn test_make_variance_seeds_single_frame_stacks() {
    match cov(3) {
        Variance::Covariant(stack) => {
            assert_eq!(stack.len(), 1);
            let head = stack.head().unwrap();
            assert_eq!(head.pos, pos(3));
            assert_eq!(head.polarity, Polarity::Covariant);
        }
        other => panic!("expected covariant, got {other}"),
    }
    match inv(4) {
        Variance::Invariant(co, contra) => {
            assert_eq!(co.len(), 1);
            assert_eq!(contra.len(), 1);
            assert_eq!(co.head().unwrap().polarity, Polarity::Invariant);
        }
        other => panic!("expected invariant, got {other}"),
    }
}

#[test]
fn test_flip_negates_and_records() {
    let flipped = flip(reason(9, Polarity::Contravariant), &cov(1));
    match flipped {
        Variance::Contravariant(stack) => {
            assert_eq!(stack.len(), 2);
            assert_eq!(stack.head().unwrap().pos, pos(9));
        }
        other => panic!("expected contravariant, got {other}"),
    }

    let back = flip(reason(10, Polarity::Covariant), &contra(1));
    assert!(matches!(back, Variance::Covariant(_)));
}

#[test]
fn test_flip_fixes_invariant_and_bivariant() {
    let invariant = inv(2);
    assert_eq!(flip(reason(9, Polarity::Covariant), &invariant), invariant);
    assert_eq!(
        flip(reason(9, Polarity::Covariant), &Variance::Bivariant),
        Variance::Bivariant
    );
}

/// The full sign table, all sixteen combinations.
#[test]
fn test_compose_sign_table() {
    let operands = [
        (Some(Polarity::Covariant), cov(1)),
        (Some(Polarity::Contravariant), contra(1)),
        (Some(Polarity::Invariant), inv(1)),
        (None, Variance::Bivariant),
    ];
    for (from_tag, from) in &operands {
        for (to_tag, to) in &operands {
            let result = compose(&pos(50), PositionDescr::TypeArgument("Box".into()), from, to);
            let expected = match (from_tag, to_tag) {
                // Bivariant is the identity on either side.
                (None, other) => *other,
                (other, None) => *other,
                // Invariant absorbs.
                (Some(Polarity::Invariant), _) | (_, Some(Polarity::Invariant)) => {
                    Some(Polarity::Invariant)
                }
                (Some(a), Some(b)) => Some(a.compose(*b)),
            };
            assert_eq!(
                result.polarity(),
                expected,
                "compose({from_tag:?}, {to_tag:?})"
            );
        }
    }
}

/// The head reason records the slot's declared polarity at the argument's
/// position, on top of `from`'s stack.
#[test]
fn test_compose_head_reason_is_the_slot() {
    let result = compose(
        &pos(50),
        PositionDescr::TypeArgument("Box".into()),
        &contra(1),
        &cov(2),
    );
    match result {
        Variance::Contravariant(stack) => {
            assert_eq!(stack.len(), 2);
            let head = stack.head().unwrap();
            assert_eq!(head.pos, pos(50));
            assert_eq!(head.polarity, Polarity::Covariant);
            // The tail is `from`'s stack, untouched.
            assert_eq!(stack.iter().nth(1).unwrap().pos, pos(1));
        }
        other => panic!("expected contravariant, got {other}"),
    }
}

#[test]
fn test_compose_contra_through_contra_is_covariant() {
    let result = compose(
        &pos(50),
        PositionDescr::TypeArgument("Box".into()),
        &contra(1),
        &contra(2),
    );
    match result {
        Variance::Covariant(stack) => {
            assert_eq!(stack.head().unwrap().polarity, Polarity::Contravariant);
        }
        other => panic!("expected covariant, got {other}"),
    }
}

/// An invariant slot restarts both proofs at the argument position; the
/// outer declaration can be in a distant file.
#[test]
fn test_compose_into_invariant_slot_points_here() {
    let result = compose(
        &pos(50),
        PositionDescr::TypeArgument("Cell".into()),
        &cov(1),
        &inv(2),
    );
    match result {
        Variance::Invariant(co, contra) => {
            assert_eq!(co.len(), 1);
            assert_eq!(contra.len(), 1);
            assert_eq!(co.head().unwrap().pos, pos(50));
            assert_eq!(contra.head().unwrap().pos, pos(50));
        }
        other => panic!("expected invariant, got {other}"),
    }
}

#[test]
fn test_compose_invariant_from_absorbs_unchanged() {
    let invariant = inv(1);
    let result = compose(
        &pos(50),
        PositionDescr::TypeArgument("Box".into()),
        &invariant,
        &cov(2),
    );
    assert_eq!(result, invariant);
}

#[test]
fn test_compose_bivariant_identity() {
    let operand = contra(1);
    assert_eq!(
        compose(
            &pos(50),
            PositionDescr::TypeArgument("Box".into()),
            &Variance::Bivariant,
            &operand
        ),
        operand
    );
    assert_eq!(
        compose(
            &pos(50),
            PositionDescr::TypeArgument("Box".into()),
            &operand,
            &Variance::Bivariant
        ),
        operand
    );
}

#[test]
fn test_refined_at_rebuilds_only_the_head() {
    let two_deep = flip(reason(9, Polarity::Contravariant), &cov(1));
    let refined = two_deep.refined_at(&pos(70));
    match (&two_deep, &refined) {
        (Variance::Contravariant(before), Variance::Contravariant(after)) => {
            assert_eq!(after.len(), 2);
            assert_eq!(after.head().unwrap().pos, pos(70));
            // Descriptor and polarity survive the rebuild.
            assert_eq!(after.head().unwrap().descr, before.head().unwrap().descr);
            assert_eq!(
                after.head().unwrap().polarity,
                before.head().unwrap().polarity
            );
            // The tail is shared, not copied.
            assert_eq!(after.iter().nth(1).unwrap(), before.iter().nth(1).unwrap());
        }
        _ => panic!("refinement changed the constructor"),
    }
}

#[test]
fn test_refined_at_same_position_is_noop() {
    let variance = cov(5);
    assert_eq!(variance.refined_at(&pos(5)), variance);
}

#[test]
fn test_refined_at_leaves_invariant_and_bivariant() {
    let invariant = inv(1);
    assert_eq!(invariant.refined_at(&pos(70)), invariant);
    assert_eq!(Variance::Bivariant.refined_at(&pos(70)), Variance::Bivariant);
}

#[test]
fn test_display() {
    assert_eq!(cov(1).to_string(), "covariant (+)");
    assert_eq!(contra(1).to_string(), "contravariant (-)");
    assert_eq!(inv(1).to_string(), "invariant");
    assert_eq!(Variance::Bivariant.to_string(), "bivariant");
}
