//! Structured variance errors and the sink they are reported to.
//!
//! The traversal never aborts: every violation becomes a record here and
//! checking continues, so one pass yields every diagnostic a declaration
//! deserves. Records keep their positions and reason chains structured;
//! rendering to a `Diagnostic` happens at the reporting boundary.

use vela_common::{Diagnostic, Pos};

/// Stable diagnostic codes for variance errors.
pub mod codes {
    pub const DECLARED_COVARIANT: u32 = 3001;
    pub const DECLARED_CONTRAVARIANT: u32 = 3002;
    pub const CONTRAVARIANT_THIS: u32 = 3003;
    pub const STATIC_PROPERTY_TYPE_GENERIC_PARAM: u32 = 3004;
}

/// A variance violation. All variants carry the stripped name of the
/// parameter involved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VarianceError {
    /// A covariant-declared parameter used contravariantly or invariantly.
    DeclaredCovariant {
        param: String,
        /// Where the parameter was declared covariant.
        decl_pos: Pos,
        /// The offending use.
        use_pos: Pos,
        /// Rendered reason chain explaining the use's polarity.
        chain: Vec<(Pos, String)>,
    },
    /// A contravariant-declared parameter used covariantly or invariantly.
    DeclaredContravariant {
        param: String,
        decl_pos: Pos,
        use_pos: Pos,
        chain: Vec<(Pos, String)>,
    },
    /// `this` in a contravariant position of a final class with a variant
    /// parameter.
    ContravariantThis {
        pos: Pos,
        class_name: String,
        param: String,
    },
    /// A generic parameter in the type of a static property outside a trait.
    StaticPropertyTypeGenericParam {
        param: String,
        generic_pos: Pos,
        prop_type_pos: Pos,
        class_pos: Pos,
    },
}

impl VarianceError {
    pub fn code(&self) -> u32 {
        match self {
            VarianceError::DeclaredCovariant { .. } => codes::DECLARED_COVARIANT,
            VarianceError::DeclaredContravariant { .. } => codes::DECLARED_CONTRAVARIANT,
            VarianceError::ContravariantThis { .. } => codes::CONTRAVARIANT_THIS,
            VarianceError::StaticPropertyTypeGenericParam { .. } => {
                codes::STATIC_PROPERTY_TYPE_GENERIC_PARAM
            }
        }
    }

    /// The position of the offending occurrence.
    pub fn use_pos(&self) -> Option<&Pos> {
        match self {
            VarianceError::DeclaredCovariant { use_pos, .. }
            | VarianceError::DeclaredContravariant { use_pos, .. } => Some(use_pos),
            VarianceError::ContravariantThis { pos, .. } => Some(pos),
            VarianceError::StaticPropertyTypeGenericParam { generic_pos, .. } => Some(generic_pos),
        }
    }

    /// The stripped name of the parameter the error is about.
    pub fn param(&self) -> &str {
        match self {
            VarianceError::DeclaredCovariant { param, .. }
            | VarianceError::DeclaredContravariant { param, .. }
            | VarianceError::ContravariantThis { param, .. }
            | VarianceError::StaticPropertyTypeGenericParam { param, .. } => param,
        }
    }

    /// Render into the shared diagnostic form.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            VarianceError::DeclaredCovariant {
                decl_pos, chain, ..
            } => {
                let mut diagnostic = Diagnostic::error(
                    decl_pos.clone(),
                    "Illegal usage of a covariant type parameter",
                    codes::DECLARED_COVARIANT,
                );
                for (pos, message) in chain {
                    diagnostic = diagnostic.with_related(pos.clone(), message.clone());
                }
                diagnostic
            }
            VarianceError::DeclaredContravariant {
                decl_pos, chain, ..
            } => {
                let mut diagnostic = Diagnostic::error(
                    decl_pos.clone(),
                    "Illegal usage of a contravariant type parameter",
                    codes::DECLARED_CONTRAVARIANT,
                );
                for (pos, message) in chain {
                    diagnostic = diagnostic.with_related(pos.clone(), message.clone());
                }
                diagnostic
            }
            VarianceError::ContravariantThis {
                pos,
                class_name,
                param,
            } => Diagnostic::error(
                pos.clone(),
                format!(
                    "The `this` type cannot be used in this contravariant position \
                     because its enclosing class `{class_name}` is final and has a \
                     variant type parameter `{param}`"
                ),
                codes::CONTRAVARIANT_THIS,
            ),
            VarianceError::StaticPropertyTypeGenericParam {
                generic_pos,
                prop_type_pos,
                class_pos,
                ..
            } => Diagnostic::error(
                generic_pos.clone(),
                "A generic parameter cannot be used in the type of a static property",
                codes::STATIC_PROPERTY_TYPE_GENERIC_PARAM,
            )
            .with_related(
                prop_type_pos.clone(),
                "This is the type of the static property",
            )
            .with_related(
                class_pos.clone(),
                "This is the class containing the static property",
            ),
        }
    }
}

/// Where errors accumulate. Appends must be atomic when shared across
/// workers; the plain `Vec` impl covers the single-threaded case.
pub trait ErrorSink {
    fn add(&mut self, error: VarianceError);
}

impl ErrorSink for Vec<VarianceError> {
    fn add(&mut self, error: VarianceError) {
        self.push(error);
    }
}
