//! The adaptive affine-covariant damping rule.
//!
//! Chooses a damping factor α ∈ (0, 1] that keeps the Newton iteration in
//! its region of fast local convergence. Instead of a line search on a
//! function value, the rule estimates the contraction of the Newton
//! correction itself: it retracts a trial step α·X, re-solves the linearized
//! system *at the trial point* (the "simplified Newton" correction), and
//! compares the two direction norms. Per trial:
//!
//! - θ = ‖simplified‖ (at the trial point) / ‖X‖ (at the iterate);
//! - θ ≤ θ_acc: accept the α that produced this trial;
//! - otherwise shrink proportionally, α ← min(1, α·θ_des/θ), and retry.
//!
//! The trial loop is bounded; exhausting it raises
//! [`SolverError::DampingFailed`]. A direction of (near-)zero norm is
//! treated as already converged: θ = 0, α = 1, no trials — the stopping
//! criterion fires at the next check.

use riemannsolve_core::error::{SolverError, SolverResult};
use riemannsolve_core::manifold::{
    Manifold, PointOf, RetractionMethod, TangentOf, VectorTransportMethod,
};
use riemannsolve_core::problem::VectorBundleProblem;
use riemannsolve_core::stepsize::{AffineCovariantConfig, DampingScratch};
use riemannsolve_core::types::Scalar;
use num_traits::Float;

use crate::subsolver::NewtonSubproblem;

/// Computes the damping factor for one outer Newton iteration.
///
/// `trial` is the state's scratch trial point; on acceptance it holds the
/// retraction of the accepted step and `is_same` is left `true`, matching
/// the retraction the outer step performs when it commits. Between trials
/// `is_same` is `false` so downstream evaluation recomputes at the fresh
/// trial point.
#[allow(clippy::too_many_arguments)]
pub(crate) fn affine_covariant_step<T, M, B>(
    problem: &VectorBundleProblem<T, M, B>,
    point: &PointOf<T, M>,
    direction: &TangentOf<T, M>,
    direction_norm: T,
    subproblem: &mut NewtonSubproblem<T, M, B>,
    trial: &mut PointOf<T, M>,
    is_same: &mut bool,
    scratch: &mut DampingScratch<T>,
    config: &AffineCovariantConfig<T>,
    retraction: &RetractionMethod,
    transport: &VectorTransportMethod,
) -> SolverResult<T>
where
    T: Scalar,
    M: Manifold<T>,
    B: Manifold<T>,
{
    scratch.reset();
    if direction_norm <= T::EPSILON {
        // Already at a root; any step length works and no trial is needed.
        scratch.theta = T::zero();
        return Ok(scratch.alpha);
    }

    let manifold = problem.manifold();
    let mut simplified = manifold.zero_vector(point);
    for _ in 0..config.max_trials {
        manifold.retract_into(trial, point, direction, scratch.alpha, retraction)?;
        *is_same = false;
        subproblem.solve_at(problem, trial, &mut simplified, retraction, transport)?;
        let simplified_norm = manifold.norm(trial, &simplified)?;
        scratch.theta = simplified_norm / direction_norm;
        if scratch.theta <= config.theta_acc {
            *is_same = true;
            return Ok(scratch.alpha);
        }
        scratch.alpha =
            <T as Float>::min(T::one(), scratch.alpha * config.theta_des / scratch.theta);
    }
    Err(SolverError::damping_failed(
        config.max_trials,
        scratch.theta.to_f64(),
    ))
}
