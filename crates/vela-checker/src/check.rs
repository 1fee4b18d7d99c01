//! Entry points: where a declaration's members meet the traversal.
//!
//! `check_class` and `check_typedef` establish the generic environment and
//! the initial polarity for each part of a declaration, then hand off to the
//! structural walk in `traverse`. Members are visited in declaration order,
//! so the error sequence for a given input is always the same.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use vela_common::Pos;
use vela_decl::decl::{ClassElt, ClassInfo, ClassKind, DeclaredVariance, Tparam, TypedefInfo, Visibility};
use vela_decl::names::strip_qualified;
use vela_decl::provider::DeclProvider;
use vela_decl::ty::{Ty, TyKind};

use crate::errors::{ErrorSink, VarianceError};
use crate::oracle::VarianceOracle;
use crate::reason::{Polarity, PositionDescr, Reason, ReasonStack};
use crate::variance::{make_variance, Variance};

/// Generic parameters in scope, with their declared variances. Established
/// at scope entry and read-only during traversal.
pub(crate) type Env = FxHashMap<String, Variance>;

pub(crate) struct VarianceChecker<'a> {
    pub(crate) oracle: VarianceOracle<'a>,
    pub(crate) sink: &'a mut dyn ErrorSink,
}

fn tparam_env(tparams: &[Tparam]) -> Env {
    tparams
        .iter()
        .map(|tp| {
            (
                tp.name.clone(),
                make_variance(PositionDescr::TypeParameter, &tp.pos, tp.variance),
            )
        })
        .collect()
}

/// Check every member of a class against the declared variances of its type
/// parameters. `parents` is the list of `extends`/`implements`/`use` types.
pub fn check_class(
    provider: &dyn DeclProvider,
    class: &ClassInfo,
    parents: &[Ty],
    sink: &mut dyn ErrorSink,
) {
    trace!(class = %class.name, "variance-checking class");
    let mut checker = VarianceChecker {
        oracle: VarianceOracle::new(provider),
        sink,
    };
    let env = tparam_env(&class.tparams);

    // Parent clauses impose no polarity of their own; only the declared
    // slots of the parent constrain how our parameters may appear there.
    for parent in parents {
        checker.type_(Some(class), &Variance::Bivariant, &env, parent);
    }
    for prop in &class.props {
        checker.class_member(class, &env, prop);
    }
    for prop in &class.static_props {
        checker.static_member(class, prop);
    }
    for method in &class.methods {
        checker.class_method(class, &env, method);
    }
    // Non-final static members can be invoked through `classname<T>`
    // values, so they obey the same discipline as instance members.
    if !class.is_final {
        for method in &class.static_methods {
            checker.class_method(class, &env, method);
        }
    }
}

/// Check a typedef body. Aliased types are covariant positions.
pub fn check_typedef(provider: &dyn DeclProvider, typedef: &TypedefInfo, sink: &mut dyn ErrorSink) {
    trace!(typedef = %typedef.name, "variance-checking typedef");
    let mut checker = VarianceChecker {
        oracle: VarianceOracle::new(provider),
        sink,
    };
    let env = tparam_env(&typedef.tparams);
    let variance = Variance::Covariant(ReasonStack::singleton(Reason::new(
        typedef.ty.pos.clone(),
        PositionDescr::Typedef,
        Polarity::Covariant,
    )));
    checker.type_(None, &variance, &env, &typedef.ty);
}

/// One declaration to check, as handed out by the surrounding worker pool.
#[derive(Clone, Debug)]
pub enum CheckRequest {
    Class {
        class: Arc<ClassInfo>,
        parents: Vec<Ty>,
    },
    Typedef(Arc<TypedefInfo>),
}

/// Check a batch of declarations in order.
pub fn check_program(
    provider: &dyn DeclProvider,
    requests: &[CheckRequest],
    sink: &mut dyn ErrorSink,
) {
    for request in requests {
        match request {
            CheckRequest::Class { class, parents } => check_class(provider, class, parents, sink),
            CheckRequest::Typedef(typedef) => check_typedef(provider, typedef, sink),
        }
    }
}

impl<'a> VarianceChecker<'a> {
    /// An instance property. Class members can be both read and written, so
    /// they are invariant positions; private members cannot be seen from a
    /// subtype and are exempt.
    fn class_member(&mut self, class: &ClassInfo, env: &Env, member: &ClassElt) {
        if member.visibility == Visibility::Private {
            return;
        }
        let variance = make_variance(
            PositionDescr::Member,
            &member.ty.pos,
            DeclaredVariance::Invariant,
        );
        self.type_(Some(class), &variance, env, &member.ty);
    }

    /// A static property. Generic parameters are banned in these outright:
    /// statics are shared across all instantiations of the class. Traits are
    /// exempt because every use site re-types the trait body.
    fn static_member(&mut self, class: &ClassInfo, member: &ClassElt) {
        if class.kind == ClassKind::Trait {
            return;
        }
        let mut bound = Vec::new();
        if let Some((pos, name)) = find_generic(&member.ty, &mut bound) {
            self.sink.add(VarianceError::StaticPropertyTypeGenericParam {
                param: strip_qualified(name).to_string(),
                generic_pos: pos.clone(),
                prop_type_pos: member.ty.pos.clone(),
                class_pos: class.pos.clone(),
            });
        }
    }

    /// A method. Final methods cannot be overridden, so either polarity is
    /// sound and they are skipped. The method type itself starts covariant
    /// with an empty proof: the function-type case supplies the first frame
    /// as soon as it reaches a parameter or the return.
    fn class_method(&mut self, class: &ClassInfo, env: &Env, method: &ClassElt) {
        if method.visibility == Visibility::Private {
            return;
        }
        if method.is_final {
            return;
        }
        if let TyKind::Fn(_) = method.ty.kind {
            self.type_(
                Some(class),
                &Variance::Covariant(ReasonStack::empty()),
                env,
                &method.ty,
            );
        }
    }
}

/// First generic-parameter occurrence in `ty`, in pre-order, ignoring names
/// bound by an enclosing function type's own parameters.
fn find_generic<'t>(ty: &'t Ty, bound: &mut Vec<&'t str>) -> Option<(&'t Pos, &'t str)> {
    match &ty.kind {
        TyKind::Any
        | TyKind::Error
        | TyKind::Mixed
        | TyKind::Nonnull
        | TyKind::Dynamic
        | TyKind::Var
        | TyKind::Prim(_)
        | TyKind::This => None,
        TyKind::Option(inner) | TyKind::Like(inner) | TyKind::Access(inner, _) | TyKind::Varray(inner) => {
            find_generic(inner, bound)
        }
        TyKind::Union(members) | TyKind::Intersection(members) | TyKind::Tuple(members) => {
            members.iter().find_map(|member| find_generic(member, bound))
        }
        TyKind::Darray(key, value) | TyKind::VarrayOrDarray(key, value) => {
            find_generic(key, bound).or_else(|| find_generic(value, bound))
        }
        TyKind::Shape(fields) => fields.iter().find_map(|field| find_generic(&field.ty, bound)),
        TyKind::Generic(name, targs) => {
            if !bound.contains(&name.as_str()) {
                return Some((&ty.pos, name.as_str()));
            }
            targs.iter().find_map(|targ| find_generic(targ, bound))
        }
        TyKind::Apply(_, targs) => targs.iter().find_map(|targ| find_generic(targ, bound)),
        TyKind::Fn(fn_type) => {
            let depth = bound.len();
            bound.extend(fn_type.tparams.iter().map(|tp| tp.name.as_str()));
            let found = fn_type
                .params
                .iter()
                .find_map(|param| find_generic(&param.ty, bound))
                .or_else(|| {
                    fn_type
                        .variadic
                        .as_ref()
                        .and_then(|param| find_generic(&param.ty, bound))
                })
                .or_else(|| {
                    fn_type.tparams.iter().find_map(|tp| {
                        tp.constraints
                            .iter()
                            .find_map(|(_, constraint)| find_generic(constraint, bound))
                    })
                })
                .or_else(|| {
                    fn_type.where_constraints.iter().find_map(|clause| {
                        find_generic(&clause.left, bound)
                            .or_else(|| find_generic(&clause.right, bound))
                    })
                })
                .or_else(|| find_generic(&fn_type.ret, bound));
            bound.truncate(depth);
            found
        }
    }
}

#[cfg(test)]
#[path = "tests/check_tests.rs"]
mod tests;
