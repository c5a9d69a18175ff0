//! Solver-state machinery for iterative solvers on Riemannian manifolds.
//!
//! This crate provides the shared machinery of the two solvers shipped in
//! `riemannsolve-solvers`: the object model for opaque manifold points and
//! tangent vectors, the pluggable numerical strategies, and the generic
//! driver loop that iterates a solver state in place.
//!
//! # Modules
//!
//! - [`manifold`]: the capability interface manifolds implement
//! - [`objective`]: user-supplied cost / subgradient / bundle-map callbacks
//! - [`problem`]: immutable problem aggregates
//! - [`stepsize`]: step-length schedules and damping strategies
//! - [`stopping`]: composable stopping criteria
//! - [`solver`]: the `initialize` → `step` → `solution` driver loop
//! - [`error`]: the two-level error taxonomy
//! - [`types`]: the [`Scalar`](types::Scalar) abstraction and vector aliases

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod manifold;
pub mod objective;
pub mod problem;
pub mod solver;
pub mod stepsize;
pub mod stopping;
pub mod types;

#[cfg(test)]
pub(crate) mod test_manifolds;

pub use error::{ManifoldError, Result, SolverError, SolverResult};
pub use manifold::{Manifold, PointOf, RetractionMethod, TangentOf, VectorTransportMethod};
pub use solver::{solve, SolverState};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use riemannsolve_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ManifoldError, Result, SolverError, SolverResult};
    pub use crate::manifold::{
        Manifold, PointOf, RetractionMethod, TangentOf, VectorTransportMethod,
    };
    pub use crate::objective::{BundleMapObjective, NonsmoothObjective, SubgradientFn};
    pub use crate::problem::{NonsmoothProblem, VectorBundleProblem};
    pub use crate::solver::{solve, SolverState};
    pub use crate::stepsize::{
        AffineCovariantConfig, DampingScratch, DampingStrategy, StepsizeMode, StepsizeSchedule,
    };
    pub use crate::stopping::{
        AllCriterion, AnyCriterion, DirectionNormBelow, MaxIterations, SolverProgress,
        StoppingCriterion,
    };
    pub use crate::types::{DMatrix, DVector, Scalar};
}
