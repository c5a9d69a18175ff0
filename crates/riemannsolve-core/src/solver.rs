//! The generic driver loop shared by all solvers.
//!
//! [`solve`] knows nothing about subgradients or Newton directions; it is
//! polymorphic over the capability set of [`SolverState`]: initialize once,
//! step while the stopping check says continue, extract the solution. The
//! loop is strictly sequential — iteration k is fully committed before k+1
//! begins — and cancellation is cooperative at the between-iteration check
//! only.
//!
//! The state stays borrowed mutably for the duration of the solve and
//! remains inspectable afterwards, so callers can read iteration metadata
//! (or the full state) beyond the extracted solution.

use crate::error::SolverResult;
use crate::types::Scalar;

/// Capability set the driver loop is polymorphic over.
///
/// A solver is a state type implementing these four hooks; the concrete
/// algorithm lives entirely in [`SolverState::step`].
pub trait SolverState<T: Scalar> {
    /// The immutable problem aggregate this solver consumes.
    type Problem;

    /// The value extracted at termination (typically a manifold point).
    type Solution;

    /// Called once before the first step. Resets per-solve bookkeeping so a
    /// state can be reused for a fresh solve.
    fn initialize(&mut self, problem: &Self::Problem) -> SolverResult<()>;

    /// Performs one iteration. `iteration` is the 1-based index of the step
    /// being performed.
    fn step(&mut self, problem: &Self::Problem, iteration: usize) -> SolverResult<()>;

    /// Consults the stopping criterion. `iteration` is the number of
    /// completed steps.
    fn should_stop(&mut self, problem: &Self::Problem, iteration: usize) -> bool;

    /// Extracts the solution from the final state.
    fn solution(&self, problem: &Self::Problem) -> Self::Solution;
}

/// Runs a solver state against a problem until its stopping criterion fires.
///
/// Mutates `state` in place and returns the extracted solution. A failing
/// step aborts the solve; whatever was committed to the state before the
/// failure remains readable.
pub fn solve<T, S>(problem: &S::Problem, state: &mut S) -> SolverResult<S::Solution>
where
    T: Scalar,
    S: SolverState<T>,
{
    state.initialize(problem)?;
    let mut iteration = 0;
    while !state.should_stop(problem, iteration) {
        iteration += 1;
        state.step(problem, iteration)?;
    }
    Ok(state.solution(problem))
}
