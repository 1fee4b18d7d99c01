//! Class and typedef declaration info.
//!
//! These are the per-declaration facts the checker needs: type parameters
//! with their declared variances and bounds, member types with visibility
//! and finality, and the class kind. Members are stored in declaration
//! order; checks that iterate them are deterministic because of it.

use std::sync::Arc;

use vela_common::Pos;

use crate::ty::{ConstraintKind, Ty};

/// The user-written variance annotation on a generic parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclaredVariance {
    /// `+T`
    Covariant,
    /// `-T`
    Contravariant,
    /// Unannotated.
    Invariant,
}

/// A declared generic parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tparam {
    pub name: String,
    /// Position of the parameter name at its declaration site.
    pub pos: Pos,
    pub variance: DeclaredVariance,
    pub constraints: Vec<(ConstraintKind, Ty)>,
}

impl Tparam {
    pub fn new(name: impl Into<String>, pos: Pos, variance: DeclaredVariance) -> Self {
        Tparam {
            name: name.into(),
            pos,
            variance,
            constraints: Vec::new(),
        }
    }

    /// Whether the parameter is declared covariant or contravariant.
    pub fn is_variant(&self) -> bool {
        self.variance != DeclaredVariance::Invariant
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A class member: a property or a method, with the facts the checker
/// consults before looking at its type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassElt {
    pub name: String,
    pub pos: Pos,
    pub visibility: Visibility,
    pub is_final: bool,
    pub ty: Ty,
}

impl ClassElt {
    pub fn new(name: impl Into<String>, pos: Pos, visibility: Visibility, ty: Ty) -> Self {
        ClassElt {
            name: name.into(),
            pos,
            visibility,
            is_final: false,
            ty,
        }
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }
}

/// Declaration info for a class, interface or trait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub pos: Pos,
    pub kind: ClassKind,
    pub is_final: bool,
    pub tparams: Vec<Tparam>,
    pub props: Vec<ClassElt>,
    pub static_props: Vec<ClassElt>,
    pub methods: Vec<ClassElt>,
    pub static_methods: Vec<ClassElt>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, pos: Pos, kind: ClassKind) -> Self {
        ClassInfo {
            name: name.into(),
            pos,
            kind,
            is_final: false,
            tparams: Vec::new(),
            props: Vec::new(),
            static_props: Vec::new(),
            methods: Vec::new(),
            static_methods: Vec::new(),
        }
    }
}

/// Declaration info for a typedef (type alias).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedefInfo {
    pub name: String,
    pub pos: Pos,
    pub tparams: Vec<Tparam>,
    pub ty: Ty,
}

/// A named type declaration, as returned by lookup.
#[derive(Clone, Debug)]
pub enum TypeDecl {
    Class(Arc<ClassInfo>),
    Typedef(Arc<TypedefInfo>),
}

impl TypeDecl {
    /// The declared type parameters, in parameter order.
    pub fn tparams(&self) -> &[Tparam] {
        match self {
            TypeDecl::Class(c) => &c.tparams,
            TypeDecl::Typedef(t) => &t.tparams,
        }
    }
}
