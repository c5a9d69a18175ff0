//! The two solvers built on the riemannsolve core machinery.
//!
//! - [`subgradient`]: subgradient descent for nonsmooth objectives, with
//!   best-iterate tracking and a scalar boundary wrapper.
//! - [`vectorbundle_newton`]: the Newton-type method for zeroing a map into
//!   a vector bundle, composed with an inner sub-problem ([`subsolver`])
//!   and the adaptive affine-covariant damping rule.
//!
//! Both are driven by [`riemannsolve_core::solver::solve`].

#![cfg_attr(not(feature = "std"), no_std)]

mod affine_covariant;
pub mod subgradient;
pub mod subsolver;
pub mod vectorbundle_newton;

pub use subgradient::{subgradient_method_scalar, SubgradientState};
pub use subsolver::{CoordinateLinearSolver, NewtonSubproblem, NewtonSubsolver};
pub use vectorbundle_newton::VectorBundleNewtonState;
