//! Declared-variance vectors for named types.
//!
//! The traversal needs exactly one fact per applied class or typedef: the
//! declared variance of each of its parameters, in order. This projection
//! over the declaration provider keeps the walk independent of everything
//! else a declaration carries.

use tracing::trace;
use vela_decl::names;
use vela_decl::provider::DeclProvider;

use crate::reason::PositionDescr;
use crate::variance::{make_variance, Variance};

pub struct VarianceOracle<'a> {
    provider: &'a dyn DeclProvider,
}

impl<'a> VarianceOracle<'a> {
    pub fn new(provider: &'a dyn DeclProvider) -> Self {
        VarianceOracle { provider }
    }

    /// The declared variance vector of `name`, in parameter order.
    ///
    /// The awaitable type always reports a single covariant parameter: it is
    /// declared in a prelude whose decl may not be loaded, and its variance
    /// must not depend on that. Unknown names report an empty vector; the
    /// caller zips against type arguments and leaves arity errors to other
    /// checks.
    pub fn declared_variances(&self, name: &str) -> Vec<Variance> {
        if name == names::AWAITABLE {
            return vec![make_variance(
                PositionDescr::TypeParameter,
                &vela_common::Pos::none(),
                vela_decl::decl::DeclaredVariance::Covariant,
            )];
        }
        match self.provider.lookup_class_or_typedef(name) {
            Some(decl) => decl
                .tparams()
                .iter()
                .map(|tp| make_variance(PositionDescr::TypeParameter, &tp.pos, tp.variance))
                .collect(),
            None => {
                trace!(name, "no declaration for applied type");
                Vec::new()
            }
        }
    }
}
