//! The Riemannian subgradient method.
//!
//! Minimizes a nonsmooth objective f: ℳ → ℝ by repeatedly retracting along
//! the negative of one selected subgradient element:
//!
//! 1. evaluate one subgradient element X at the current iterate p;
//! 2. compute the step length from the configured schedule;
//! 3. retract p along −length·X in place;
//! 4. keep the best iterate seen so far in `p_star`.
//!
//! Subgradient steps are not monotone, so the solution is `p_star` (the best
//! of all visited iterates, the start point included), not the final `p`.

use riemannsolve_core::error::SolverResult;
use riemannsolve_core::manifold::{Manifold, PointOf, RetractionMethod, TangentOf};
use riemannsolve_core::objective::{NonsmoothObjective, SubgradientFn};
use riemannsolve_core::problem::NonsmoothProblem;
use riemannsolve_core::solver::{solve, SolverState};
use riemannsolve_core::stepsize::StepsizeSchedule;
use riemannsolve_core::stopping::{MaxIterations, SolverProgress, StoppingCriterion};
use riemannsolve_core::types::Scalar;
use riemannsolve_manifolds::Euclidean;

/// Iteration budget used when no stopping criterion is configured.
const DEFAULT_MAX_ITERATIONS: usize = 5000;

/// State of the subgradient method.
///
/// Constructed from an initial point, configured through the `with_*`
/// builders, and driven by [`solve`](riemannsolve_core::solver::solve).
#[derive(Debug)]
pub struct SubgradientState<T: Scalar, M: Manifold<T>> {
    p: PointOf<T, M>,
    p_star: PointOf<T, M>,
    subgradient: TangentOf<T, M>,
    retraction: RetractionMethod,
    schedule: StepsizeSchedule<T>,
    criterion: Box<dyn StoppingCriterion<T>>,
    iteration: usize,
    direction_norm: Option<T>,
}

impl<T: Scalar, M: Manifold<T>> SubgradientState<T, M> {
    /// Creates a state starting at `initial`.
    ///
    /// Defaults: exponential retraction, constant stepsize 0.1, and a
    /// 5000-iteration budget.
    pub fn new(manifold: &M, initial: PointOf<T, M>) -> Self {
        let p_star = manifold.copy_point(&initial);
        let subgradient = manifold.zero_vector(&initial);
        Self {
            p: initial,
            p_star,
            subgradient,
            retraction: RetractionMethod::default(),
            schedule: StepsizeSchedule::constant(<T as Scalar>::from_f64(0.1)),
            criterion: Box::new(MaxIterations::new(DEFAULT_MAX_ITERATIONS)),
            iteration: 0,
            direction_norm: None,
        }
    }

    /// Sets the retraction method.
    pub fn with_retraction(mut self, retraction: RetractionMethod) -> Self {
        self.retraction = retraction;
        self
    }

    /// Sets the stepsize schedule.
    pub fn with_stepsize(mut self, schedule: StepsizeSchedule<T>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets the stopping criterion.
    pub fn with_stopping_criterion(mut self, criterion: Box<dyn StoppingCriterion<T>>) -> Self {
        self.criterion = criterion;
        self
    }

    /// The current iterate.
    pub const fn iterate(&self) -> &PointOf<T, M> {
        &self.p
    }

    /// The best iterate visited so far.
    pub const fn best_iterate(&self) -> &PointOf<T, M> {
        &self.p_star
    }

    /// The most recently evaluated subgradient element.
    pub const fn subgradient(&self) -> &TangentOf<T, M> {
        &self.subgradient
    }

    /// Number of completed iterations.
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Norm of the most recent subgradient, `None` before the first step.
    pub const fn direction_norm(&self) -> Option<T> {
        self.direction_norm
    }

    /// Whether the stopping criterion that fired indicates convergence
    /// rather than an exhausted budget.
    pub fn has_converged(&self) -> bool {
        self.criterion.indicates_convergence()
    }

    /// Human-readable reason for termination, once a criterion fired.
    pub fn stop_reason(&self) -> Option<String> {
        self.criterion.reason()
    }
}

impl<T: Scalar, M: Manifold<T>> SolverState<T> for SubgradientState<T, M> {
    type Problem = NonsmoothProblem<T, M>;
    type Solution = PointOf<T, M>;

    fn initialize(&mut self, problem: &Self::Problem) -> SolverResult<()> {
        problem.manifold().copy_point_into(&mut self.p_star, &self.p);
        self.iteration = 0;
        self.direction_norm = None;
        Ok(())
    }

    fn step(&mut self, problem: &Self::Problem, iteration: usize) -> SolverResult<()> {
        let manifold = problem.manifold();
        problem.subgradient_into(&mut self.subgradient, &self.p)?;
        let norm = manifold.norm(&self.p, &self.subgradient)?;
        let length = self.schedule.length(iteration, norm);
        self.p = manifold.retract(&self.p, &self.subgradient, -length, &self.retraction)?;
        if problem.cost(&self.p)? < problem.cost(&self.p_star)? {
            manifold.copy_point_into(&mut self.p_star, &self.p);
        }
        self.direction_norm = Some(norm);
        self.iteration = iteration;
        Ok(())
    }

    fn should_stop(&mut self, _problem: &Self::Problem, iteration: usize) -> bool {
        let progress = SolverProgress {
            direction_norm: self.direction_norm,
        };
        self.criterion.evaluate(&progress, iteration)
    }

    fn solution(&self, problem: &Self::Problem) -> Self::Solution {
        problem.manifold().copy_point(&self.p_star)
    }
}

/// Runs the subgradient method on a single real unknown.
///
/// Boundary convenience for scalar problems: wraps the callbacks into a
/// 1-dimensional [`Euclidean`] problem, runs the solver with the given
/// schedule and criterion, and unwraps the scalar best iterate. Kept outside
/// the core loop so the solvers never special-case scalar domains.
pub fn subgradient_method_scalar<T, F, G>(
    cost: F,
    subgradient: G,
    initial: T,
    schedule: StepsizeSchedule<T>,
    criterion: Box<dyn StoppingCriterion<T>>,
) -> SolverResult<T>
where
    T: Scalar,
    F: Fn(T) -> T + 'static,
    G: Fn(T) -> T + 'static,
{
    let objective = NonsmoothObjective::new(
        move |_m: &Euclidean<T>, p: &riemannsolve_core::types::DVector<T>| Ok(cost(p[0])),
        SubgradientFn::allocating(move |_m, p: &riemannsolve_core::types::DVector<T>| {
            Ok(riemannsolve_core::types::DVector::from_element(
                1,
                subgradient(p[0]),
            ))
        }),
    );
    let problem = NonsmoothProblem::new(Euclidean::new(1), objective);
    let initial_point = riemannsolve_core::types::DVector::from_element(1, initial);
    let mut state = SubgradientState::new(problem.manifold(), initial_point)
        .with_stepsize(schedule)
        .with_stopping_criterion(criterion);
    let best = solve(&problem, &mut state)?;
    Ok(best[0])
}
