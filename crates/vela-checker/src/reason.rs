//! Reason stacks: the provenance record behind every inferred polarity.
//!
//! A `Reason` names one syntactic context that contributed to an inferred
//! polarity: "this is a function parameter", "this is the second type
//! argument of `Box`". A `ReasonStack` chains them innermost-first, so the
//! head identifies the exact leaf position of a problem and the tail replays
//! the enclosing constructs that composed its polarity.
//!
//! Stacks are persistent: pushing builds a new head that shares its tail
//! with the old stack, so sibling traversals extend a common prefix without
//! copying. Nothing is ever mutated in place.

use std::sync::Arc;

use vela_common::Pos;
use vela_decl::decl::DeclaredVariance;

/// A polarity: the sign a position imposes on the generics inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    Covariant,
    Contravariant,
    Invariant,
}

impl Polarity {
    /// One-character sign used in composition summaries.
    pub fn sign(self) -> &'static str {
        match self {
            Polarity::Covariant => "+",
            Polarity::Contravariant => "-",
            Polarity::Invariant => "*",
        }
    }

    /// Long form used in message bodies.
    pub fn describe(self) -> &'static str {
        match self {
            Polarity::Covariant => "covariant (+)",
            Polarity::Contravariant => "contravariant (-)",
            Polarity::Invariant => "invariant",
        }
    }

    /// Negation. Invariant is a fixed point.
    pub fn flip(self) -> Polarity {
        match self {
            Polarity::Covariant => Polarity::Contravariant,
            Polarity::Contravariant => Polarity::Covariant,
            Polarity::Invariant => Polarity::Invariant,
        }
    }

    /// Sign composition with the declared polarity of an enclosing slot.
    /// Invariant absorbs from either side.
    pub fn compose(self, slot: Polarity) -> Polarity {
        match (self, slot) {
            (Polarity::Invariant, _) | (_, Polarity::Invariant) => Polarity::Invariant,
            (Polarity::Covariant, other) => other,
            (Polarity::Contravariant, Polarity::Covariant) => Polarity::Contravariant,
            (Polarity::Contravariant, Polarity::Contravariant) => Polarity::Covariant,
        }
    }
}

impl From<DeclaredVariance> for Polarity {
    fn from(annotation: DeclaredVariance) -> Self {
        match annotation {
            DeclaredVariance::Covariant => Polarity::Covariant,
            DeclaredVariance::Contravariant => Polarity::Contravariant,
            DeclaredVariance::Invariant => Polarity::Invariant,
        }
    }
}

/// The syntactic role that induced a polarity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PositionDescr {
    /// The body of a typedef.
    Typedef,
    /// The type of a non-private instance member.
    Member,
    /// A type parameter at its declaration site.
    TypeParameter,
    FunctionParameter,
    FunctionReturn,
    /// A type argument slot of the named class or typedef.
    TypeArgument(String),
    ConstraintAs,
    ConstraintEq,
    ConstraintSuper,
    WhereAs,
    WhereEq,
    WhereSuper,
    InoutParameter,
}

/// One frame of provenance: where, in what role, with what sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reason {
    pub pos: Pos,
    pub descr: PositionDescr,
    pub polarity: Polarity,
}

impl Reason {
    pub fn new(pos: Pos, descr: PositionDescr, polarity: Polarity) -> Self {
        Reason {
            pos,
            descr,
            polarity,
        }
    }

    /// The fixed message for this frame. With `sign`, the frame's own sign
    /// is prefixed, as in composition breakdowns.
    pub fn to_message(&self, sign: bool) -> String {
        let body = match &self.descr {
            PositionDescr::Typedef => "Aliased types are covariant".to_string(),
            PositionDescr::Member => "A non-private class member is always invariant".to_string(),
            PositionDescr::TypeParameter => {
                format!("The type parameter was declared as {}", self.polarity.describe())
            }
            PositionDescr::FunctionParameter => "Function parameters are contravariant".to_string(),
            PositionDescr::FunctionReturn => "Function return types are covariant".to_string(),
            PositionDescr::TypeArgument(name) => format!(
                "This type parameter was declared as {} (cf `{}`)",
                self.polarity.describe(),
                name
            ),
            PositionDescr::ConstraintAs => {
                "`as` constraints on method type parameters are contravariant".to_string()
            }
            PositionDescr::ConstraintEq => {
                "`=` constraints on method type parameters are invariant".to_string()
            }
            PositionDescr::ConstraintSuper => {
                "`super` constraints on method type parameters are covariant".to_string()
            }
            PositionDescr::WhereAs => {
                "`where _ as _` constraints are covariant on the left and contravariant on the right"
                    .to_string()
            }
            PositionDescr::WhereEq => {
                "`where _ = _` constraints are invariant on the left and right".to_string()
            }
            PositionDescr::WhereSuper => {
                "`where _ super _` constraints are contravariant on the left and covariant on the right"
                    .to_string()
            }
            PositionDescr::InoutParameter => {
                "Inout parameters are both covariant and contravariant".to_string()
            }
        };
        if sign {
            format!("{} {}", self.polarity.sign(), body)
        } else {
            body
        }
    }
}

// =============================================================================
// ReasonStack - persistent, innermost-first
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
struct Node {
    reason: Reason,
    next: Option<Arc<Node>>,
}

/// An immutable stack of reasons, innermost-first.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ReasonStack {
    head: Option<Arc<Node>>,
}

impl ReasonStack {
    pub fn empty() -> Self {
        ReasonStack { head: None }
    }

    pub fn singleton(reason: Reason) -> Self {
        ReasonStack::empty().push(reason)
    }

    /// A new stack with `reason` on top; the tail is shared with `self`.
    pub fn push(&self, reason: Reason) -> Self {
        ReasonStack {
            head: Some(Arc::new(Node {
                reason,
                next: self.head.clone(),
            })),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// The innermost reason.
    pub fn head(&self) -> Option<&Reason> {
        self.head.as_deref().map(|node| &node.reason)
    }

    /// A new stack whose head carries `pos` instead of its original
    /// position, tail shared. Used to point error arrows at the exact
    /// occurrence of a generic inside a larger type. No-op on an empty
    /// stack.
    pub fn with_head_pos(&self, pos: Pos) -> Self {
        match self.head.as_deref() {
            None => self.clone(),
            Some(node) => ReasonStack {
                head: Some(Arc::new(Node {
                    reason: Reason {
                        pos,
                        descr: node.reason.descr.clone(),
                        polarity: node.reason.polarity,
                    },
                    next: node.next.clone(),
                })),
            },
        }
    }

    pub fn iter(&self) -> ReasonIter<'_> {
        ReasonIter {
            node: self.head.as_deref(),
        }
    }
}

pub struct ReasonIter<'a> {
    node: Option<&'a Node>,
}

impl<'a> Iterator for ReasonIter<'a> {
    type Item = &'a Reason;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.next.as_deref();
        Some(&node.reason)
    }
}

impl<'a> IntoIterator for &'a ReasonStack {
    type Item = &'a Reason;
    type IntoIter = ReasonIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Chain rendering
// =============================================================================

/// Render a reason stack into positioned messages.
///
/// A single-frame stack speaks for itself: only the leaf message is shown.
/// Longer stacks open with a summary at the offending use, then decompose
/// the inference frame by frame, each line prefixed by its own sign.
pub fn detailed_message(
    polarity: &str,
    use_pos: &Pos,
    stack: &ReasonStack,
) -> Vec<(Pos, String)> {
    let mut frames = stack.iter();
    let Some(first) = frames.next() else {
        return Vec::new();
    };
    if frames.next().is_none() {
        return vec![(first.pos.clone(), first.to_message(false))];
    }

    let signs: String = stack.iter().map(|r| r.polarity.sign()).collect();
    let mut messages = vec![(
        use_pos.clone(),
        format!(
            "This position is {polarity} because it is the composition of {signs}"
        ),
    )];
    for reason in stack.iter() {
        messages.push((reason.pos.clone(), reason.to_message(true)));
    }
    messages
}

#[cfg(test)]
#[path = "tests/reason_tests.rs"]
mod tests;
