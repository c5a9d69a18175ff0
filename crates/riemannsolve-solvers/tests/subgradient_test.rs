//! End-to-end tests for the subgradient method.

use approx::assert_relative_eq;
use nalgebra::dvector;
use riemannsolve_core::manifold::Manifold;
use riemannsolve_core::objective::{NonsmoothObjective, SubgradientFn};
use riemannsolve_core::problem::NonsmoothProblem;
use riemannsolve_core::solver::solve;
use riemannsolve_core::stepsize::StepsizeSchedule;
use riemannsolve_core::stopping::MaxIterations;
use riemannsolve_core::types::DVector;
use riemannsolve_manifolds::Sphere;
use riemannsolve_solvers::SubgradientState;

type Vec64 = DVector<f64>;

/// f(p) = distance(p, target) on the sphere; the subgradient away from the
/// target and its antipode is -log_p(target)/distance.
fn distance_problem(target: Vec64) -> NonsmoothProblem<f64, Sphere<f64>> {
    let dim = target.len();
    let cost_target = target.clone();
    let objective = NonsmoothObjective::new(
        move |m: &Sphere<f64>, p: &Vec64| Ok(m.distance(p, &cost_target)),
        SubgradientFn::in_place(move |m: &Sphere<f64>, result: &mut Vec64, p: &Vec64| {
            let d = m.distance(p, &target);
            if d > f64::EPSILON {
                *result = -(m.log_map(p, &target)? / d);
            } else {
                // At the minimizer every direction of norm <= 1 is a
                // subgradient; select zero.
                result.fill(0.0);
            }
            Ok(())
        }),
    );
    NonsmoothProblem::new(Sphere::new(dim).unwrap(), objective)
}

#[test]
fn minimizes_distance_to_target_on_sphere() {
    let target = dvector![0.0, 0.0, 1.0];
    let problem = distance_problem(target.clone());
    // Geodesic distance 1.0 to the target: ten unit-norm steps of 0.1 walk
    // straight onto the minimizer, where the subgradient selector returns
    // zero and the iterate stays put.
    let start = dvector![1.0_f64.sin(), 0.0, 1.0_f64.cos()];

    let mut state = SubgradientState::new(problem.manifold(), start)
        .with_stepsize(StepsizeSchedule::constant(0.1))
        .with_stopping_criterion(Box::new(MaxIterations::new(200)));

    let best = solve(&problem, &mut state).unwrap();
    assert!(problem.manifold().distance(&best, &target) < 1e-3);
    // Iterates stay on the sphere throughout.
    assert_relative_eq!(best.norm(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(state.iterate().norm(), 1.0, epsilon = 1e-12);
}

#[test]
fn squared_distance_reaches_tight_tolerance() {
    // f(p) = dist(p, target)^2 / 2 has gradient -log_p(target): the same
    // constant 0.1 step now contracts the distance geometrically and 200
    // iterations are far more than enough for 1e-3.
    let target = dvector![0.0, 0.0, 1.0];
    let grad_target = target.clone();
    let objective = NonsmoothObjective::new(
        move |m: &Sphere<f64>, p: &Vec64| {
            let d = m.distance(p, &target);
            Ok(0.5 * d * d)
        },
        SubgradientFn::allocating(move |m: &Sphere<f64>, p: &Vec64| {
            Ok(-m.log_map(p, &grad_target)?)
        }),
    );
    let problem = NonsmoothProblem::new(Sphere::new(3).unwrap(), objective);
    let start = dvector![1.0, 0.0, 0.0];

    let mut state = SubgradientState::new(problem.manifold(), start)
        .with_stepsize(StepsizeSchedule::constant(0.1))
        .with_stopping_criterion(Box::new(MaxIterations::new(200)));
    let best = solve(&problem, &mut state).unwrap();
    assert!(problem.cost(&best).unwrap() < 1e-6);
}

#[test]
fn best_iterate_dominates_every_visited_cost() {
    let target = dvector![0.0, 1.0, 0.0];
    let problem = distance_problem(target);
    let start = dvector![1.0, 0.0, 0.0];
    let start_cost = problem.cost(&start).unwrap();

    // An oversized constant step oscillates around the minimizer; the best
    // iterate must still dominate both the start and the final iterate.
    let mut state = SubgradientState::new(problem.manifold(), start)
        .with_stepsize(StepsizeSchedule::constant(1.3))
        .with_stopping_criterion(Box::new(MaxIterations::new(60)));
    solve(&problem, &mut state).unwrap();

    let best_cost = problem.cost(state.best_iterate()).unwrap();
    assert!(best_cost <= start_cost);
    assert!(best_cost <= problem.cost(state.iterate()).unwrap());
}

#[test]
fn absolute_mode_takes_unit_length_scaled_steps() {
    let target = dvector![0.0, 0.0, 1.0];
    let problem = distance_problem(target.clone());
    let start = dvector![1.0, 0.0, 0.0];

    // Absolute normalization makes each step exactly 0.05 long regardless
    // of the subgradient magnitude; 200 iterations more than cover the
    // quarter-circle distance.
    let mut state = SubgradientState::new(problem.manifold(), start)
        .with_stepsize(StepsizeSchedule::constant_absolute(0.05))
        .with_stopping_criterion(Box::new(MaxIterations::new(200)));
    let best = solve(&problem, &mut state).unwrap();
    assert!(problem.manifold().distance(&best, &target) < 0.05);
}
