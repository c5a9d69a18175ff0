//! The vectorbundle Newton method.
//!
//! Finds a zero of a map F: ℳ → ℰ into a vector bundle over the manifold by
//! iterating `p_{k+1} = retract(p_k, step·X_k)`, where X_k approximately
//! solves the linearized equation F′(p_k)[X_k] = −Q(F(p_k)) and `step` comes
//! from the configured damping strategy. One iteration:
//!
//! 1. notify the sub-problem of the current base point (re-linearize);
//! 2. reset the inner iterate to the zero tangent at p_k;
//! 3. run the inner solve to convergence — the new direction X_k;
//! 4. compute the damping factor (possibly several trial retractions);
//! 5. retract p_k along step·X_k in place and refresh the trial scratch.
//!
//! Steps 1–3 are one [`NewtonSubproblem::solve_at`] call. The solution is
//! the *final* iterate — no best-so-far tracking, Newton convergence is
//! assumed monotone near the root.

use riemannsolve_core::error::SolverResult;
use riemannsolve_core::manifold::{
    Manifold, PointOf, RetractionMethod, TangentOf, VectorTransportMethod,
};
use riemannsolve_core::problem::VectorBundleProblem;
use riemannsolve_core::solver::SolverState;
use riemannsolve_core::stepsize::{DampingScratch, DampingStrategy};
use riemannsolve_core::stopping::{MaxIterations, SolverProgress, StoppingCriterion};
use riemannsolve_core::types::Scalar;

use crate::affine_covariant::affine_covariant_step;
use crate::subsolver::NewtonSubproblem;

/// Iteration budget used when no stopping criterion is configured.
const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// State of the vectorbundle Newton method.
///
/// The sub-problem is a constructor argument: a Newton method with no way to
/// compute its direction cannot be represented. `X` holds the most recently
/// computed direction at `p` and is stale before the first step; `is_same`
/// is `true` exactly when the trial scratch `p_trial` coincides with `p`
/// (no pending trial retraction).
#[derive(Debug)]
pub struct VectorBundleNewtonState<T: Scalar, M: Manifold<T>, B: Manifold<T>> {
    p: PointOf<T, M>,
    p_trial: PointOf<T, M>,
    direction: TangentOf<T, M>,
    subproblem: NewtonSubproblem<T, M, B>,
    criterion: Box<dyn StoppingCriterion<T>>,
    damping: DampingStrategy<T>,
    retraction: RetractionMethod,
    transport: VectorTransportMethod,
    is_same: bool,
    scratch: DampingScratch<T>,
    iteration: usize,
    direction_norm: Option<T>,
    step_length: Option<T>,
}

impl<T: Scalar, M: Manifold<T>, B: Manifold<T>> VectorBundleNewtonState<T, M, B> {
    /// Creates a state starting at `initial` with the mandatory sub-problem.
    ///
    /// Defaults: affine-covariant damping, exponential retraction,
    /// projection transport, and a 1000-iteration budget.
    pub fn new(
        manifold: &M,
        initial: PointOf<T, M>,
        subproblem: NewtonSubproblem<T, M, B>,
    ) -> Self {
        let p_trial = manifold.copy_point(&initial);
        let direction = manifold.zero_vector(&initial);
        Self {
            p: initial,
            p_trial,
            direction,
            subproblem,
            criterion: Box::new(MaxIterations::new(DEFAULT_MAX_ITERATIONS)),
            damping: DampingStrategy::default(),
            retraction: RetractionMethod::default(),
            transport: VectorTransportMethod::default(),
            is_same: true,
            scratch: DampingScratch::default(),
            iteration: 0,
            direction_norm: None,
            step_length: None,
        }
    }

    /// Sets the damping strategy.
    pub fn with_damping(mut self, damping: DampingStrategy<T>) -> Self {
        self.damping = damping;
        self
    }

    /// Sets the retraction method.
    pub fn with_retraction(mut self, retraction: RetractionMethod) -> Self {
        self.retraction = retraction;
        self
    }

    /// Sets the vector-transport method.
    pub fn with_transport(mut self, transport: VectorTransportMethod) -> Self {
        self.transport = transport;
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

    /// The scratch trial point of the damping rule.
    pub const fn trial_point(&self) -> &PointOf<T, M> {
        &self.p_trial
    }

    /// The most recently computed Newton direction (stale before the first
    /// step).
    pub const fn direction(&self) -> &TangentOf<T, M> {
        &self.direction
    }

    /// Whether the trial scratch currently equals the committed iterate.
    pub const fn is_same(&self) -> bool {
        self.is_same
    }

    /// The damping scratch (`alpha`, `theta`) of the last damping
    /// evaluation.
    pub const fn damping_scratch(&self) -> &DampingScratch<T> {
        &self.scratch
    }

    /// Number of completed iterations.
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Norm of the most recent Newton direction, `None` before the first
    /// step.
    pub const fn direction_norm(&self) -> Option<T> {
        self.direction_norm
    }

    /// Step length committed by the most recent iteration.
    pub const fn step_length(&self) -> Option<T> {
        self.step_length
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

impl<T: Scalar, M: Manifold<T>, B: Manifold<T>> SolverState<T>
    for VectorBundleNewtonState<T, M, B>
{
    type Problem = VectorBundleProblem<T, M, B>;
    type Solution = PointOf<T, M>;

    fn initialize(&mut self, problem: &Self::Problem) -> SolverResult<()> {
        if let DampingStrategy::AffineCovariant(config) = &self.damping {
            config.validate()?;
        }
        problem.manifold().copy_point_into(&mut self.p_trial, &self.p);
        self.is_same = true;
        self.scratch.reset();
        self.iteration = 0;
        self.direction_norm = None;
        self.step_length = None;
        Ok(())
    }

    fn step(&mut self, problem: &Self::Problem, iteration: usize) -> SolverResult<()> {
        let manifold = problem.manifold();

        // Steps 1-3: re-linearize at p, restart the inner iterate from
        // zero, and run the inner solve to convergence.
        self.subproblem.solve_at(
            problem,
            &self.p,
            &mut self.direction,
            &self.retraction,
            &self.transport,
        )?;
        let norm = manifold.norm(&self.p, &self.direction)?;
        self.direction_norm = Some(norm);

        // Step 4: damping factor.
        let step = match &self.damping {
            DampingStrategy::Constant(alpha) => *alpha,
            DampingStrategy::AffineCovariant(config) => affine_covariant_step(
                problem,
                &self.p,
                &self.direction,
                norm,
                &mut self.subproblem,
                &mut self.p_trial,
                &mut self.is_same,
                &mut self.scratch,
                config,
                &self.retraction,
                &self.transport,
            )?,
        };

        // Step 5: commit the step and refresh the trial scratch.
        self.p = manifold.retract(&self.p, &self.direction, step, &self.retraction)?;
        manifold.copy_point_into(&mut self.p_trial, &self.p);
        self.is_same = true;
        self.step_length = Some(step);
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
        problem.manifold().copy_point(&self.p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsolver::CoordinateLinearSolver;
    use approx::assert_relative_eq;
    use nalgebra::dvector;
    use riemannsolve_core::error::SolverError;
    use riemannsolve_core::objective::BundleMapObjective;
    use riemannsolve_core::solver::solve;
    use riemannsolve_core::stepsize::AffineCovariantConfig;
    use riemannsolve_core::stopping::DirectionNormBelow;
    use riemannsolve_core::types::{DMatrix, DVector};
    use riemannsolve_manifolds::Euclidean;

    type Vec64 = DVector<f64>;
    type Space = Euclidean<f64>;

    fn shift_problem(target: Vec64) -> VectorBundleProblem<f64, Space, Space> {
        let dim = target.len();
        let identity = DMatrix::identity(dim, dim);
        let objective = BundleMapObjective::new(
            move |_m: &Space, p: &Vec64| Ok(p - &target),
            |_b: &Space, v: &Vec64| Ok(v.clone()),
        )
        .with_derivative(move |_m, _p| Ok(identity.clone()));
        VectorBundleProblem::new(Euclidean::new(dim), Euclidean::new(dim), objective)
    }

    #[test]
    fn test_linear_map_converges_in_one_full_step() {
        let target = dvector![3.0, -1.0, 0.5];
        let problem = shift_problem(target.clone());
        let mut state = VectorBundleNewtonState::new(
            problem.manifold(),
            dvector![0.0, 0.0, 0.0],
            NewtonSubproblem::solver(CoordinateLinearSolver::new()),
        )
        .with_damping(DampingStrategy::Constant(1.0))
        .with_stopping_criterion(Box::new(MaxIterations::new(1)));

        let result = solve(&problem, &mut state).unwrap();
        assert_relative_eq!(result, target);
        assert_relative_eq!(state.step_length().unwrap(), 1.0);
    }

    #[test]
    fn test_affine_covariant_accepts_full_step_for_linear_map() {
        let target = dvector![2.0, 2.0];
        let problem = shift_problem(target.clone());
        let mut state = VectorBundleNewtonState::new(
            problem.manifold(),
            dvector![-1.0, 4.0],
            NewtonSubproblem::solver(CoordinateLinearSolver::new()),
        )
        .with_stopping_criterion(Box::new(DirectionNormBelow::new(1e-10)));

        let result = solve(&problem, &mut state).unwrap();
        assert_relative_eq!(result, target, epsilon = 1e-12);
        assert!(state.has_converged());
        // Linear map: the simplified correction vanishes after a full step,
        // so the first trial is accepted with alpha = 1.
        assert_relative_eq!(state.damping_scratch().alpha, 1.0);
        assert!(state.is_same());
    }

    #[test]
    fn test_zero_map_at_start_stops_immediately() {
        let problem = shift_problem(dvector![1.0, 1.0]);
        let mut state = VectorBundleNewtonState::new(
            problem.manifold(),
            dvector![1.0, 1.0],
            NewtonSubproblem::solver(CoordinateLinearSolver::new()),
        )
        .with_stopping_criterion(Box::new(DirectionNormBelow::new(1e-12)));

        let result = solve(&problem, &mut state).unwrap();
        assert_relative_eq!(result, dvector![1.0, 1.0]);
        assert_eq!(state.iteration(), 1);
        assert!(state.direction_norm().unwrap() < 1e-12);
        // Zero direction: the damping rule declared immediate convergence.
        assert_relative_eq!(state.damping_scratch().theta, 0.0);
    }

    #[test]
    fn test_invalid_damping_config_fails_at_initialize() {
        let problem = shift_problem(dvector![1.0]);
        let config = AffineCovariantConfig::default().with_acceptance_bound(0.1);
        let mut state = VectorBundleNewtonState::new(
            problem.manifold(),
            dvector![0.0],
            NewtonSubproblem::solver(CoordinateLinearSolver::new()),
        )
        .with_damping(DampingStrategy::AffineCovariant(config));

        let err = solve(&problem, &mut state).unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_constant_damping_halves_the_distance() {
        let target = dvector![4.0, 0.0];
        let problem = shift_problem(target);
        let mut state = VectorBundleNewtonState::new(
            problem.manifold(),
            dvector![0.0, 0.0],
            NewtonSubproblem::solver(CoordinateLinearSolver::new()),
        )
        .with_damping(DampingStrategy::Constant(0.5))
        .with_stopping_criterion(Box::new(MaxIterations::new(1)));

        let result = solve(&problem, &mut state).unwrap();
        assert_relative_eq!(result, dvector![2.0, 0.0]);
    }
}
