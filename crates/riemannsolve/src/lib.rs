//! Iterative solvers on Riemannian manifolds.
//!
//! This facade crate re-exports the public surface of the workspace:
//!
//! - `riemannsolve-core`: the solver-state machinery — the opaque
//!   point/tangent object model, stepsize and stopping abstractions, and
//!   the generic [`solve`] driver loop;
//! - `riemannsolve-manifolds`: the [`Euclidean`] and [`Sphere`] collaborator
//!   manifolds;
//! - `riemannsolve-solvers`: the subgradient method and the vectorbundle
//!   Newton method with its inner sub-solvers and affine-covariant damping.
//!
//! # Example
//!
//! Zero the linear map F(p) = p − target on flat space; one undamped Newton
//! step is exact:
//!
//! ```
//! use riemannsolve::prelude::*;
//! use nalgebra::dvector;
//!
//! let target = dvector![2.0, -1.0];
//! let objective = BundleMapObjective::new(
//!     move |_m: &Euclidean<f64>, p: &DVector<f64>| Ok(p - &target),
//!     |_b: &Euclidean<f64>, v: &DVector<f64>| Ok(v.clone()),
//! );
//! let problem = VectorBundleProblem::new(Euclidean::new(2), Euclidean::new(2), objective);
//!
//! // The derivative is the identity, so the Newton direction is just the
//! // negative residual; the allocating sub-problem convention expresses
//! // that directly.
//! let subproblem = NewtonSubproblem::allocating(
//!     |problem: &VectorBundleProblem<f64, Euclidean<f64>, Euclidean<f64>>, p: &DVector<f64>| {
//!         Ok(-problem.residual(p)?)
//!     },
//! );
//!
//! let mut state = VectorBundleNewtonState::new(problem.manifold(), dvector![0.0, 0.0], subproblem)
//!     .with_stopping_criterion(Box::new(DirectionNormBelow::new(1e-12)));
//!
//! let root = solve(&problem, &mut state).unwrap();
//! assert_eq!(root, dvector![2.0, -1.0]);
//! ```

pub use riemannsolve_core as core;
pub use riemannsolve_manifolds as manifolds;
pub use riemannsolve_solvers as solvers;

pub use riemannsolve_core::solver::{solve, SolverState};
pub use riemannsolve_manifolds::{Euclidean, Sphere};
pub use riemannsolve_solvers::{
    subgradient_method_scalar, CoordinateLinearSolver, NewtonSubproblem, NewtonSubsolver,
    SubgradientState, VectorBundleNewtonState,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use riemannsolve_core::prelude::*;
    pub use riemannsolve_manifolds::{Euclidean, Sphere};
    pub use riemannsolve_solvers::{
        subgradient_method_scalar, CoordinateLinearSolver, NewtonSubproblem, NewtonSubsolver,
        SubgradientState, VectorBundleNewtonState,
    };
}
