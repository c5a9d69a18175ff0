//! Composable stopping criteria.
//!
//! A criterion is asked between iterations whether the solve should stop.
//! Criteria are mutable so that each one can record *when* it fired and
//! produce a human-readable reason afterwards; combinators ([`AnyCriterion`],
//! [`AllCriterion`]) evaluate every child on every check so the records stay
//! complete.
//!
//! Exhausting an iteration budget is normal termination, not an error.
//! Callers distinguish "converged" from "budget exhausted" through
//! [`StoppingCriterion::indicates_convergence`].

use crate::types::Scalar;
use std::fmt::Debug;

/// Snapshot of solver progress consumed by stopping criteria.
///
/// Solver states assemble one of these before each stopping check.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverProgress<T: Scalar> {
    /// Norm of the most recently computed search direction (the subgradient
    /// for subgradient descent, the Newton direction for the Newton method).
    /// `None` before the first step.
    pub direction_norm: Option<T>,
}

/// A predicate deciding when the driver loop terminates.
pub trait StoppingCriterion<T: Scalar>: Debug {
    /// Returns `true` if the solve should stop, given the progress snapshot
    /// and the number of completed iterations.
    fn evaluate(&mut self, progress: &SolverProgress<T>, iteration: usize) -> bool;

    /// Human-readable explanation of why this criterion fired, or `None` if
    /// it has not fired.
    fn reason(&self) -> Option<String>;

    /// Iteration count at which this criterion first fired.
    fn fired_at(&self) -> Option<usize>;

    /// Whether a firing of this criterion signals convergence (as opposed
    /// to an exhausted budget).
    fn indicates_convergence(&self) -> bool;
}

/// Stops after a fixed number of iterations. Firing does not indicate
/// convergence.
#[derive(Debug, Clone)]
pub struct MaxIterations {
    limit: usize,
    fired_at: Option<usize>,
}

impl MaxIterations {
    /// Creates a criterion firing once `limit` iterations have completed.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            fired_at: None,
        }
    }

    /// The configured iteration budget.
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl<T: Scalar> StoppingCriterion<T> for MaxIterations {
    fn evaluate(&mut self, _progress: &SolverProgress<T>, iteration: usize) -> bool {
        if iteration >= self.limit {
            if self.fired_at.is_none() {
                self.fired_at = Some(iteration);
            }
            true
        } else {
            false
        }
    }

    fn reason(&self) -> Option<String> {
        self.fired_at
            .map(|_| format!("reached the maximum of {} iterations", self.limit))
    }

    fn fired_at(&self) -> Option<usize> {
        self.fired_at
    }

    fn indicates_convergence(&self) -> bool {
        false
    }
}

/// Stops once the direction norm drops below a tolerance. Firing indicates
/// convergence.
#[derive(Debug, Clone)]
pub struct DirectionNormBelow<T: Scalar> {
    tolerance: T,
    fired_at: Option<usize>,
    fired_norm: Option<T>,
}

impl<T: Scalar> DirectionNormBelow<T> {
    /// Creates a criterion firing when the direction norm is below
    /// `tolerance`. Checks before the first step (no direction yet) never
    /// fire.
    pub fn new(tolerance: T) -> Self {
        Self {
            tolerance,
            fired_at: None,
            fired_norm: None,
        }
    }
}

impl<T: Scalar> StoppingCriterion<T> for DirectionNormBelow<T> {
    fn evaluate(&mut self, progress: &SolverProgress<T>, iteration: usize) -> bool {
        match progress.direction_norm {
            Some(norm) if norm < self.tolerance => {
                if self.fired_at.is_none() {
                    self.fired_at = Some(iteration);
                    self.fired_norm = Some(norm);
                }
                true
            }
            _ => false,
        }
    }

    fn reason(&self) -> Option<String> {
        self.fired_norm.map(|norm| {
            format!(
                "direction norm {:.3e} fell below the tolerance {:.3e}",
                norm.to_f64(),
                self.tolerance.to_f64()
            )
        })
    }

    fn fired_at(&self) -> Option<usize> {
        self.fired_at
    }

    fn indicates_convergence(&self) -> bool {
        true
    }
}

/// Logical OR of several criteria: stops as soon as any child fires.
#[derive(Debug)]
pub struct AnyCriterion<T: Scalar> {
    criteria: Vec<Box<dyn StoppingCriterion<T>>>,
}

impl<T: Scalar> AnyCriterion<T> {
    /// Combines the given criteria.
    pub fn new(criteria: Vec<Box<dyn StoppingCriterion<T>>>) -> Self {
        Self { criteria }
    }
}

impl<T: Scalar> StoppingCriterion<T> for AnyCriterion<T> {
    fn evaluate(&mut self, progress: &SolverProgress<T>, iteration: usize) -> bool {
        let mut stop = false;
        for criterion in &mut self.criteria {
            if criterion.evaluate(progress, iteration) {
                stop = true;
            }
        }
        stop
    }

    fn reason(&self) -> Option<String> {
        let reasons: Vec<String> = self.criteria.iter().filter_map(|c| c.reason()).collect();
        if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        }
    }

    fn fired_at(&self) -> Option<usize> {
        self.criteria.iter().filter_map(|c| c.fired_at()).min()
    }

    fn indicates_convergence(&self) -> bool {
        self.criteria
            .iter()
            .any(|c| c.fired_at().is_some() && c.indicates_convergence())
    }
}

/// Logical AND of several criteria: stops only when every child fires on
/// the same check.
#[derive(Debug)]
pub struct AllCriterion<T: Scalar> {
    criteria: Vec<Box<dyn StoppingCriterion<T>>>,
}

impl<T: Scalar> AllCriterion<T> {
    /// Combines the given criteria.
    pub fn new(criteria: Vec<Box<dyn StoppingCriterion<T>>>) -> Self {
        Self { criteria }
    }
}

impl<T: Scalar> StoppingCriterion<T> for AllCriterion<T> {
    fn evaluate(&mut self, progress: &SolverProgress<T>, iteration: usize) -> bool {
        let mut stop = true;
        for criterion in &mut self.criteria {
            if !criterion.evaluate(progress, iteration) {
                stop = false;
            }
        }
        stop && !self.criteria.is_empty()
    }

    fn reason(&self) -> Option<String> {
        let reasons: Vec<String> = self.criteria.iter().filter_map(|c| c.reason()).collect();
        if reasons.len() == self.criteria.len() && !reasons.is_empty() {
            Some(reasons.join("; "))
        } else {
            None
        }
    }

    fn fired_at(&self) -> Option<usize> {
        self.criteria.iter().filter_map(|c| c.fired_at()).max()
    }

    fn indicates_convergence(&self) -> bool {
        self.criteria
            .iter()
            .any(|c| c.fired_at().is_some() && c.indicates_convergence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn progress(norm: Option<f64>) -> SolverProgress<f64> {
        SolverProgress {
            direction_norm: norm,
        }
    }

    #[test]
    fn test_max_iterations_fires_at_limit() {
        let mut criterion = MaxIterations::new(3);
        assert!(!StoppingCriterion::<f64>::evaluate(
            &mut criterion,
            &progress(None),
            2
        ));
        assert!(StoppingCriterion::<f64>::evaluate(
            &mut criterion,
            &progress(None),
            3
        ));
        assert_eq!(StoppingCriterion::<f64>::fired_at(&criterion), Some(3));
        assert_eq!(
            StoppingCriterion::<f64>::reason(&criterion),
            Some("reached the maximum of 3 iterations".to_string())
        );
        assert!(!StoppingCriterion::<f64>::indicates_convergence(&criterion));
    }

    #[test]
    fn test_direction_norm_below() {
        let mut criterion = DirectionNormBelow::new(1e-6);
        // No direction yet: never fires.
        assert!(!criterion.evaluate(&progress(None), 0));
        assert!(!criterion.evaluate(&progress(Some(0.5)), 1));
        assert!(criterion.evaluate(&progress(Some(1e-9)), 2));
        assert_eq!(criterion.fired_at(), Some(2));
        assert!(criterion.indicates_convergence());
        assert_eq!(
            criterion.reason(),
            Some("direction norm 1.000e-9 fell below the tolerance 1.000e-6".to_string())
        );
    }

    #[test]
    fn test_any_combinator() {
        let mut any = AnyCriterion::new(vec![
            Box::new(MaxIterations::new(10)),
            Box::new(DirectionNormBelow::new(1e-6)),
        ]);
        assert!(!any.evaluate(&progress(Some(0.1)), 4));
        assert!(any.evaluate(&progress(Some(1e-8)), 5));
        assert_eq!(any.fired_at(), Some(5));
        assert!(any.indicates_convergence());
        assert_eq!(
            any.reason(),
            Some("direction norm 1.000e-8 fell below the tolerance 1.000e-6".to_string())
        );
    }

    #[test]
    fn test_any_records_every_fired_child() {
        let mut any = AnyCriterion::new(vec![
            Box::new(MaxIterations::new(5)),
            Box::new(DirectionNormBelow::new(1e-6)),
        ]);
        // Both children fire on the same check; both must record it.
        assert!(any.evaluate(&progress(Some(1e-9)), 5));
        let reasons = any.reason().unwrap();
        assert!(reasons.contains("maximum of 5 iterations"));
        assert!(reasons.contains("fell below the tolerance"));
    }

    #[test]
    fn test_all_combinator() {
        let mut all = AllCriterion::new(vec![
            Box::new(MaxIterations::new(5)),
            Box::new(DirectionNormBelow::new(1e-6)),
        ]);
        // Only the budget is exhausted: no stop.
        assert!(!all.evaluate(&progress(Some(0.1)), 6));
        // Both hold simultaneously.
        assert!(all.evaluate(&progress(Some(1e-9)), 7));
        assert!(all.indicates_convergence());
        assert!(all.reason().is_some());
    }

    #[test]
    fn test_empty_all_never_stops() {
        let mut all = AllCriterion::<f64>::new(vec![]);
        assert!(!all.evaluate(&progress(None), 100));
    }
}
