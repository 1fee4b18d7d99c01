//! The structural walk over the type grammar.
//!
//! `type_` descends a type expression carrying the current inferred
//! `Variance` and the generic environment, applying the polarity algebra at
//! each constructor: function parameters flip, type-argument slots compose
//! with the slot's declared variance, containers pass the polarity through.
//! Generic occurrences are checked against their declaration on the spot;
//! nothing aborts, so one pass reports every violation in a declaration.

use rustc_hash::FxHashSet;
use tracing::trace;

use vela_decl::decl::{ClassInfo, Tparam};
use vela_decl::names::strip_qualified;
use vela_decl::ty::{ConstraintKind, FnParam, FnType, ParamMode, Ty, TyKind, WhereConstraint};

use crate::check::{Env, VarianceChecker};
use crate::errors::VarianceError;
use crate::reason::{detailed_message, Polarity, PositionDescr, Reason, ReasonStack};
use crate::variance::{compose, flip, Variance};

impl<'a> VarianceChecker<'a> {
    pub(crate) fn type_(
        &mut self,
        root: Option<&ClassInfo>,
        variance: &Variance,
        env: &Env,
        ty: &Ty,
    ) {
        match &ty.kind {
            TyKind::Any
            | TyKind::Error
            | TyKind::Mixed
            | TyKind::Nonnull
            | TyKind::Dynamic
            | TyKind::Var
            | TyKind::Prim(_) => {}
            TyKind::This => self.this_(root, variance, ty),
            TyKind::Option(inner)
            | TyKind::Like(inner)
            | TyKind::Access(inner, _)
            | TyKind::Varray(inner) => self.type_(root, variance, env, inner),
            TyKind::Union(members) | TyKind::Intersection(members) | TyKind::Tuple(members) => {
                for member in members {
                    self.type_(root, variance, env, member);
                }
            }
            TyKind::Darray(key, value) | TyKind::VarrayOrDarray(key, value) => {
                self.type_(root, variance, env, key);
                self.type_(root, variance, env, value);
            }
            TyKind::Shape(fields) => {
                for field in fields {
                    self.type_(root, variance, env, &field.ty);
                }
            }
            TyKind::Generic(name, _targs) => {
                // Point the innermost reason at this exact occurrence; the
                // enclosing type can be large, the arrow should not be.
                let variance = variance.refined_at(&ty.pos);
                self.generic_use(env, &variance, name);
                // TODO: traverse `_targs` once generic parameters accept
                // type arguments with declared variances of their own.
            }
            TyKind::Apply((_, name), targs) => self.apply(root, variance, env, name, targs),
            TyKind::Fn(fn_type) => self.fn_type(root, variance, env, fn_type),
        }
    }

    /// `this` is bivariant in general: it names the runtime class of the
    /// receiver, not this declaration's own instantiation. In a final class
    /// the two coincide, so a contravariant `this` smuggles every variant
    /// parameter of the class into a contravariant position.
    fn this_(&mut self, root: Option<&ClassInfo>, variance: &Variance, ty: &Ty) {
        let Some(class) = root else { return };
        if !class.is_final {
            return;
        }
        if let Variance::Contravariant(_) = variance {
            for tp in class.tparams.iter().filter(|tp| tp.is_variant()) {
                self.sink.add(VarianceError::ContravariantThis {
                    pos: ty.pos.clone(),
                    class_name: strip_qualified(&class.name).to_string(),
                    param: tp.name.clone(),
                });
            }
        }
    }

    /// Compare an occurrence of a generic against its declared variance.
    fn generic_use(&mut self, env: &Env, variance: &Variance, name: &str) {
        let Some(declared) = env.get(name) else {
            // Not a parameter of the enclosing scope (e.g. a method-local
            // tparam): no discipline applies.
            return;
        };
        match (declared, variance) {
            // An invariant declaration tolerates any use.
            (Variance::Invariant(_, _), _) | (Variance::Bivariant, _) => {}
            // A use that imposes nothing is always accepted.
            (_, Variance::Bivariant) => {}
            (Variance::Covariant(_), Variance::Covariant(_))
            | (Variance::Contravariant(_), Variance::Contravariant(_)) => {}
            (Variance::Covariant(decl_stack), Variance::Contravariant(use_stack))
            | (Variance::Covariant(decl_stack), Variance::Invariant(_, use_stack)) => {
                self.declared_mismatch(name, decl_stack, use_stack, Polarity::Covariant);
            }
            (Variance::Contravariant(decl_stack), Variance::Covariant(use_stack))
            | (Variance::Contravariant(decl_stack), Variance::Invariant(use_stack, _)) => {
                self.declared_mismatch(name, decl_stack, use_stack, Polarity::Contravariant);
            }
        }
    }

    /// Report a use that contradicts a covariant or contravariant
    /// declaration. `declared` is the declaration's polarity; the rendered
    /// chain explains the opposite sign observed at the use.
    fn declared_mismatch(
        &mut self,
        name: &str,
        decl_stack: &ReasonStack,
        use_stack: &ReasonStack,
        declared: Polarity,
    ) {
        let (Some(decl_head), Some(use_head)) = (decl_stack.head(), use_stack.head()) else {
            return;
        };
        let param = strip_qualified(name).to_string();
        trace!(param = %param, declared = declared.describe(), "variance violation");
        let decl_pos = decl_head.pos.clone();
        let use_pos = use_head.pos.clone();
        let error = match declared {
            Polarity::Covariant => VarianceError::DeclaredCovariant {
                param,
                decl_pos,
                use_pos: use_pos.clone(),
                chain: detailed_message("contravariant (-)", &use_pos, use_stack),
            },
            _ => VarianceError::DeclaredContravariant {
                param,
                decl_pos,
                use_pos: use_pos.clone(),
                chain: detailed_message("covariant (+)", &use_pos, use_stack),
            },
        };
        self.sink.add(error);
    }

    /// An applied class or typedef: each argument's polarity is the current
    /// one composed with the declared variance of its slot. The two vectors
    /// zip short; arity mismatches are some other check's business.
    fn apply(
        &mut self,
        root: Option<&ClassInfo>,
        variance: &Variance,
        env: &Env,
        name: &str,
        targs: &[Ty],
    ) {
        let variancel = self.oracle.declared_variances(name);
        for (declared, targ) in variancel.iter().zip(targs) {
            let descr = PositionDescr::TypeArgument(strip_qualified(name).to_string());
            let composed = compose(&targ.pos, descr, variance, declared);
            self.type_(root, &composed, env, targ);
        }
    }

    fn fn_type(
        &mut self,
        root: Option<&ClassInfo>,
        variance: &Variance,
        env: &Env,
        fn_type: &FnType,
    ) {
        // The signature's own tparams are bound here and shadow the scope.
        let mut inner_env = env.clone();
        for tp in &fn_type.tparams {
            inner_env.remove(&tp.name);
        }
        let env = &inner_env;

        for param in &fn_type.params {
            self.fn_param(root, variance, env, param);
        }
        if let Some(param) = &fn_type.variadic {
            self.fn_param(root, variance, env, param);
        }
        for tp in &fn_type.tparams {
            for (kind, constraint) in &tp.constraints {
                self.constraint_(root, env, *kind, constraint);
            }
        }
        for clause in &fn_type.where_constraints {
            self.where_constraint(root, env, clause);
        }
        self.fn_ret(root, variance, env, &fn_type.ret);
        self.propagate_tparam_bounds(root, env, fn_type);
    }

    fn fn_param(
        &mut self,
        root: Option<&ClassInfo>,
        variance: &Variance,
        env: &Env,
        param: &FnParam,
    ) {
        match param.mode {
            ParamMode::Normal => {
                let reason = Reason::new(
                    param.ty.pos.clone(),
                    PositionDescr::FunctionParameter,
                    Polarity::Contravariant,
                );
                let flipped = flip(reason, variance);
                self.type_(root, &flipped, env, &param.ty);
            }
            // Inout flows both ways, which makes the position invariant.
            ParamMode::Inout => {
                let stack = ReasonStack::singleton(Reason::new(
                    param.ty.pos.clone(),
                    PositionDescr::InoutParameter,
                    Polarity::Invariant,
                ));
                let invariant = Variance::Invariant(stack.clone(), stack);
                self.type_(root, &invariant, env, &param.ty);
            }
        }
    }

    /// Returns compose covariantly: the frame keeps the sign but records
    /// that a return stands between the use and its context.
    fn fn_ret(&mut self, root: Option<&ClassInfo>, variance: &Variance, env: &Env, ret: &Ty) {
        let reason = Reason::new(
            ret.pos.clone(),
            PositionDescr::FunctionReturn,
            Polarity::Covariant,
        );
        let variance = match variance {
            Variance::Covariant(stack) => Variance::Covariant(stack.push(reason)),
            Variance::Contravariant(stack) => Variance::Contravariant(stack.push(reason)),
            other => other.clone(),
        };
        self.type_(root, &variance, env, ret);
    }

    /// A bound on a method tparam is a position of its own, independent of
    /// the surrounding polarity: upper bounds are contravariant, lower
    /// bounds covariant, equality bounds invariant.
    fn constraint_(
        &mut self,
        root: Option<&ClassInfo>,
        env: &Env,
        kind: ConstraintKind,
        constraint: &Ty,
    ) {
        let variance = match kind {
            ConstraintKind::As => Variance::Contravariant(ReasonStack::singleton(Reason::new(
                constraint.pos.clone(),
                PositionDescr::ConstraintAs,
                Polarity::Contravariant,
            ))),
            ConstraintKind::Super => Variance::Covariant(ReasonStack::singleton(Reason::new(
                constraint.pos.clone(),
                PositionDescr::ConstraintSuper,
                Polarity::Covariant,
            ))),
            ConstraintKind::Eq => {
                let stack = ReasonStack::singleton(Reason::new(
                    constraint.pos.clone(),
                    PositionDescr::ConstraintEq,
                    Polarity::Invariant,
                ));
                Variance::Invariant(stack.clone(), stack)
            }
        };
        self.type_(root, &variance, env, constraint);
    }

    fn where_constraint(&mut self, root: Option<&ClassInfo>, env: &Env, clause: &WhereConstraint) {
        let (left, right) = match clause.kind {
            ConstraintKind::As => (
                Variance::Covariant(ReasonStack::singleton(Reason::new(
                    clause.left.pos.clone(),
                    PositionDescr::WhereAs,
                    Polarity::Covariant,
                ))),
                Variance::Contravariant(ReasonStack::singleton(Reason::new(
                    clause.right.pos.clone(),
                    PositionDescr::WhereAs,
                    Polarity::Contravariant,
                ))),
            ),
            ConstraintKind::Super => (
                Variance::Contravariant(ReasonStack::singleton(Reason::new(
                    clause.left.pos.clone(),
                    PositionDescr::WhereSuper,
                    Polarity::Contravariant,
                ))),
                Variance::Covariant(ReasonStack::singleton(Reason::new(
                    clause.right.pos.clone(),
                    PositionDescr::WhereSuper,
                    Polarity::Covariant,
                ))),
            ),
            ConstraintKind::Eq => {
                let left = ReasonStack::singleton(Reason::new(
                    clause.left.pos.clone(),
                    PositionDescr::WhereEq,
                    Polarity::Invariant,
                ));
                let right = ReasonStack::singleton(Reason::new(
                    clause.right.pos.clone(),
                    PositionDescr::WhereEq,
                    Polarity::Invariant,
                ));
                (
                    Variance::Invariant(left.clone(), left),
                    Variance::Invariant(right.clone(), right),
                )
            }
        };
        self.type_(root, &left, env, &clause.left);
        self.type_(root, &right, env, &clause.right);
    }

    // =========================================================================
    // Tparam bound propagation
    // =========================================================================

    /// Transitive obligations through a signature's own tparams: if a
    /// method generic `T` occurs covariantly, anything below `T` can flow
    /// out wherever `T` does, so `T`'s lower bounds are re-entered as
    /// covariant positions; symmetrically, contravariant occurrences turn
    /// `T`'s upper bounds into contravariant positions.
    fn propagate_tparam_bounds(&mut self, root: Option<&ClassInfo>, env: &Env, fn_type: &FnType) {
        if fn_type.tparams.is_empty() {
            return;
        }
        let occurrences = self.signature_occurrences(fn_type);
        for tp in &fn_type.tparams {
            if occurrences.covariant.contains(&tp.name) {
                for (descr, bound) in lower_bounds(fn_type, tp) {
                    let variance = Variance::Covariant(ReasonStack::singleton(Reason::new(
                        bound.pos.clone(),
                        descr,
                        Polarity::Covariant,
                    )));
                    self.type_(root, &variance, env, bound);
                }
            }
            if occurrences.contravariant.contains(&tp.name) {
                for (descr, bound) in upper_bounds(fn_type, tp) {
                    let variance = Variance::Contravariant(ReasonStack::singleton(Reason::new(
                        bound.pos.clone(),
                        descr,
                        Polarity::Contravariant,
                    )));
                    self.type_(root, &variance, env, bound);
                }
            }
        }
    }

    /// Free generic occurrences in a signature, by sign. Names bound by a
    /// nested signature's own tparams are that signature's business and are
    /// not collected.
    fn signature_occurrences(&self, fn_type: &FnType) -> Occurrences {
        let mut occurrences = Occurrences::default();
        let mut shadowed = Vec::new();
        self.collect_signature(
            &mut occurrences,
            &mut shadowed,
            Polarity::Covariant,
            fn_type,
            false,
        );
        occurrences
    }

    fn collect_signature(
        &self,
        occurrences: &mut Occurrences,
        shadowed: &mut Vec<String>,
        polarity: Polarity,
        fn_type: &FnType,
        shadow_own: bool,
    ) {
        let depth = shadowed.len();
        if shadow_own {
            shadowed.extend(fn_type.tparams.iter().map(|tp| tp.name.clone()));
        }
        for param in &fn_type.params {
            self.collect_param(occurrences, shadowed, polarity, param);
        }
        if let Some(param) = &fn_type.variadic {
            self.collect_param(occurrences, shadowed, polarity, param);
        }
        for tp in &fn_type.tparams {
            for (kind, constraint) in &tp.constraints {
                let fixed = match kind {
                    ConstraintKind::As => Polarity::Contravariant,
                    ConstraintKind::Super => Polarity::Covariant,
                    ConstraintKind::Eq => Polarity::Invariant,
                };
                self.collect_ty(occurrences, shadowed, fixed, constraint);
            }
        }
        for clause in &fn_type.where_constraints {
            let (left, right) = match clause.kind {
                ConstraintKind::As => (Polarity::Covariant, Polarity::Contravariant),
                ConstraintKind::Super => (Polarity::Contravariant, Polarity::Covariant),
                ConstraintKind::Eq => (Polarity::Invariant, Polarity::Invariant),
            };
            self.collect_ty(occurrences, shadowed, left, &clause.left);
            self.collect_ty(occurrences, shadowed, right, &clause.right);
        }
        self.collect_ty(occurrences, shadowed, polarity, &fn_type.ret);
        shadowed.truncate(depth);
    }

    fn collect_param(
        &self,
        occurrences: &mut Occurrences,
        shadowed: &mut Vec<String>,
        polarity: Polarity,
        param: &FnParam,
    ) {
        match param.mode {
            ParamMode::Normal => {
                self.collect_ty(occurrences, shadowed, polarity.flip(), &param.ty)
            }
            ParamMode::Inout => {
                self.collect_ty(occurrences, shadowed, Polarity::Invariant, &param.ty)
            }
        }
    }

    fn collect_ty(
        &self,
        occurrences: &mut Occurrences,
        shadowed: &mut Vec<String>,
        polarity: Polarity,
        ty: &Ty,
    ) {
        match &ty.kind {
            TyKind::Any
            | TyKind::Error
            | TyKind::Mixed
            | TyKind::Nonnull
            | TyKind::Dynamic
            | TyKind::Var
            | TyKind::Prim(_)
            | TyKind::This => {}
            TyKind::Option(inner)
            | TyKind::Like(inner)
            | TyKind::Access(inner, _)
            | TyKind::Varray(inner) => self.collect_ty(occurrences, shadowed, polarity, inner),
            TyKind::Union(members) | TyKind::Intersection(members) | TyKind::Tuple(members) => {
                for member in members {
                    self.collect_ty(occurrences, shadowed, polarity, member);
                }
            }
            TyKind::Darray(key, value) | TyKind::VarrayOrDarray(key, value) => {
                self.collect_ty(occurrences, shadowed, polarity, key);
                self.collect_ty(occurrences, shadowed, polarity, value);
            }
            TyKind::Shape(fields) => {
                for field in fields {
                    self.collect_ty(occurrences, shadowed, polarity, &field.ty);
                }
            }
            TyKind::Generic(name, _targs) => {
                if !shadowed.iter().any(|bound| bound == name) {
                    occurrences.record(name, polarity);
                }
            }
            TyKind::Apply((_, name), targs) => {
                let variancel = self.oracle.declared_variances(name);
                for (declared, targ) in variancel.iter().zip(targs) {
                    let composed = match declared.polarity() {
                        Some(slot) => polarity.compose(slot),
                        None => polarity,
                    };
                    self.collect_ty(occurrences, shadowed, composed, targ);
                }
            }
            TyKind::Fn(nested) => {
                self.collect_signature(occurrences, shadowed, polarity, nested, true)
            }
        }
    }
}

#[derive(Default)]
struct Occurrences {
    covariant: FxHashSet<String>,
    contravariant: FxHashSet<String>,
}

impl Occurrences {
    fn record(&mut self, name: &str, polarity: Polarity) {
        match polarity {
            Polarity::Covariant => {
                self.covariant.insert(name.to_string());
            }
            Polarity::Contravariant => {
                self.contravariant.insert(name.to_string());
            }
            Polarity::Invariant => {
                self.covariant.insert(name.to_string());
                self.contravariant.insert(name.to_string());
            }
        }
    }
}

/// Lower bounds of `tp` in this signature: its `super`/`=` bounds plus
/// where-clauses of shape `L as T` (yielding `L`) and `T super R`
/// (yielding `R`).
fn lower_bounds<'t>(fn_type: &'t FnType, tp: &'t Tparam) -> Vec<(PositionDescr, &'t Ty)> {
    let mut bounds = Vec::new();
    for (kind, constraint) in &tp.constraints {
        match kind {
            ConstraintKind::Super => bounds.push((PositionDescr::ConstraintSuper, constraint)),
            ConstraintKind::Eq => bounds.push((PositionDescr::ConstraintEq, constraint)),
            ConstraintKind::As => {}
        }
    }
    for clause in &fn_type.where_constraints {
        match clause.kind {
            ConstraintKind::As if is_generic_named(&clause.right, &tp.name) => {
                bounds.push((PositionDescr::WhereAs, &clause.left));
            }
            ConstraintKind::Super if is_generic_named(&clause.left, &tp.name) => {
                bounds.push((PositionDescr::WhereSuper, &clause.right));
            }
            _ => {}
        }
    }
    bounds
}

/// Upper bounds of `tp`: its `as`/`=` bounds plus where-clauses of shape
/// `T as R` (yielding `R`) and `L super T` (yielding `L`).
fn upper_bounds<'t>(fn_type: &'t FnType, tp: &'t Tparam) -> Vec<(PositionDescr, &'t Ty)> {
    let mut bounds = Vec::new();
    for (kind, constraint) in &tp.constraints {
        match kind {
            ConstraintKind::As => bounds.push((PositionDescr::ConstraintAs, constraint)),
            ConstraintKind::Eq => bounds.push((PositionDescr::ConstraintEq, constraint)),
            ConstraintKind::Super => {}
        }
    }
    for clause in &fn_type.where_constraints {
        match clause.kind {
            ConstraintKind::As if is_generic_named(&clause.left, &tp.name) => {
                bounds.push((PositionDescr::WhereAs, &clause.right));
            }
            ConstraintKind::Super if is_generic_named(&clause.right, &tp.name) => {
                bounds.push((PositionDescr::WhereSuper, &clause.left));
            }
            _ => {}
        }
    }
    bounds
}

fn is_generic_named(ty: &Ty, name: &str) -> bool {
    matches!(&ty.kind, TyKind::Generic(generic, _) if generic == name)
}
