//! Stepsize strategies for the solvers.
//!
//! Strategies are plain values: evaluating one is a pure function of the
//! iteration index and the current direction norm. Any per-solve memory the
//! adaptive damping rule needs lives in [`DampingScratch`], which is owned by
//! the solver state — a single strategy value can therefore be reused across
//! independent solves without hidden coupling.
//!
//! Two families exist:
//! - [`StepsizeSchedule`] produces the step length for subgradient descent
//!   (constant or decreasing, optionally normalized by the direction norm);
//! - [`DampingStrategy`] produces the damping factor for the Newton method
//!   (a constant factor, or the adaptive affine-covariant rule whose
//!   parameters live in [`AffineCovariantConfig`]).

use crate::error::{SolverError, SolverResult};
use crate::types::Scalar;
use num_traits::Float;

/// Damping factor tried first on every adaptive damping evaluation.
const INITIAL_ALPHA: f64 = 1.0;

/// Sentinel contraction estimate, above any valid acceptance bound.
const INITIAL_THETA: f64 = 1.3;

/// How a schedule output relates to the direction it scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepsizeMode {
    /// The output multiplies the direction as-is.
    #[default]
    Relative,
    /// The output is divided by the current direction norm, so the actual
    /// movement has exactly the scheduled length. Skipped when the norm is
    /// at or below machine epsilon to avoid division blow-up.
    Absolute,
}

/// Step-length schedule for subgradient descent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepsizeSchedule<T: Scalar> {
    /// Fixed length at every iteration.
    Constant {
        /// The scheduled length.
        length: T,
        /// Normalization mode.
        mode: StepsizeMode,
    },
    /// Length at iteration k is
    /// `(length − k·subtrahend) · factor^k / (k + shift)^exponent`.
    ///
    /// Not internally clamped: choosing parameters (or a stopping criterion)
    /// that keep `length − k·subtrahend` nonnegative is the caller's
    /// responsibility.
    Decreasing {
        /// Initial length.
        length: T,
        /// Geometric decay factor.
        factor: T,
        /// Amount subtracted per iteration.
        subtrahend: T,
        /// Exponent of the `(k + shift)` denominator.
        exponent: T,
        /// Shift of the denominator.
        shift: T,
        /// Normalization mode.
        mode: StepsizeMode,
    },
}

impl<T: Scalar> StepsizeSchedule<T> {
    /// Constant step length.
    pub fn constant(length: T) -> Self {
        Self::Constant {
            length,
            mode: StepsizeMode::Relative,
        }
    }

    /// Constant step length, normalized by the direction norm.
    pub fn constant_absolute(length: T) -> Self {
        Self::Constant {
            length,
            mode: StepsizeMode::Absolute,
        }
    }

    /// Harmonically decreasing length `length / k`.
    pub fn harmonic(length: T) -> Self {
        Self::Decreasing {
            length,
            factor: T::one(),
            subtrahend: T::zero(),
            exponent: T::one(),
            shift: T::zero(),
            mode: StepsizeMode::Relative,
        }
    }

    /// Fully parameterized decreasing schedule.
    pub fn decreasing(length: T, factor: T, subtrahend: T, exponent: T, shift: T) -> Self {
        Self::Decreasing {
            length,
            factor,
            subtrahend,
            exponent,
            shift,
            mode: StepsizeMode::Relative,
        }
    }

    /// Returns the same schedule with [`StepsizeMode::Absolute`]
    /// normalization.
    pub fn absolute(mut self) -> Self {
        match &mut self {
            Self::Constant { mode, .. } | Self::Decreasing { mode, .. } => {
                *mode = StepsizeMode::Absolute;
            }
        }
        self
    }

    /// Normalization mode of this schedule.
    pub const fn mode(&self) -> StepsizeMode {
        match self {
            Self::Constant { mode, .. } | Self::Decreasing { mode, .. } => *mode,
        }
    }

    /// Evaluates the schedule at the given 1-based iteration index.
    ///
    /// `direction_norm` is the norm of the direction the step will scale;
    /// it is only consumed in [`StepsizeMode::Absolute`].
    pub fn length(&self, iteration: usize, direction_norm: T) -> T {
        let raw = match self {
            Self::Constant { length, .. } => *length,
            Self::Decreasing {
                length,
                factor,
                subtrahend,
                exponent,
                shift,
                ..
            } => {
                let k = <T as Scalar>::from_usize(iteration);
                let numerator =
                    (*length - k * *subtrahend) * <T as Float>::powi(*factor, iteration as i32);
                numerator / <T as Float>::powf(k + *shift, *exponent)
            }
        };
        match self.mode() {
            StepsizeMode::Relative => raw,
            StepsizeMode::Absolute => {
                if direction_norm > T::EPSILON {
                    raw / direction_norm
                } else {
                    raw
                }
            }
        }
    }
}

/// Damping-factor strategy for the Newton method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DampingStrategy<T: Scalar> {
    /// Fixed damping factor (1.0 is the undamped Newton method).
    Constant(T),
    /// Adaptive affine-covariant damping.
    AffineCovariant(AffineCovariantConfig<T>),
}

impl<T: Scalar> Default for DampingStrategy<T> {
    fn default() -> Self {
        Self::AffineCovariant(AffineCovariantConfig::default())
    }
}

/// Parameters of the affine-covariant damping rule.
///
/// The rule accepts a trial damping factor once the observed contraction
/// `theta = ‖simplified Newton correction‖ / ‖Newton direction‖` drops to
/// `theta_acc` or below, and shrinks the factor proportionally to
/// `theta_des / theta` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineCovariantConfig<T: Scalar> {
    /// Desired contraction per Newton step.
    pub theta_des: T,
    /// Acceptance bound on the observed contraction.
    pub theta_acc: T,
    /// Maximum number of trial retractions per outer iteration before the
    /// rule fails with [`SolverError::DampingFailed`].
    pub max_trials: usize,
}

impl<T: Scalar> Default for AffineCovariantConfig<T> {
    fn default() -> Self {
        Self {
            theta_des: <T as Scalar>::from_f64(0.5),
            theta_acc: <T as Scalar>::from_f64(0.55),
            max_trials: 20,
        }
    }
}

impl<T: Scalar> AffineCovariantConfig<T> {
    /// Creates a configuration with the given desired contraction and the
    /// conventional acceptance bound `1.1 · theta_des`.
    pub fn new(theta_des: T) -> SolverResult<Self> {
        let config = Self {
            theta_des,
            theta_acc: <T as Scalar>::from_f64(1.1) * theta_des,
            max_trials: 20,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the acceptance bound explicitly.
    pub fn with_acceptance_bound(mut self, theta_acc: T) -> Self {
        self.theta_acc = theta_acc;
        self
    }

    /// Sets the trial budget.
    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }

    /// Checks the parameter ranges: `0 < theta_des ≤ theta_acc < 1` and
    /// `max_trials ≥ 1`.
    pub fn validate(&self) -> SolverResult<()> {
        if self.theta_des <= T::zero() || self.theta_des >= T::one() {
            return Err(SolverError::invalid_configuration(
                "desired contraction must lie in (0, 1)",
                "theta_des",
                format!("{}", self.theta_des),
            ));
        }
        if self.theta_acc < self.theta_des || self.theta_acc >= T::one() {
            return Err(SolverError::invalid_configuration(
                "acceptance bound must lie in [theta_des, 1)",
                "theta_acc",
                format!("{}", self.theta_acc),
            ));
        }
        if self.max_trials == 0 {
            return Err(SolverError::invalid_configuration(
                "at least one trial is required",
                "max_trials",
                "0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-solve scratch of the affine-covariant rule, owned by the Newton
/// solver state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampingScratch<T: Scalar> {
    /// Current damping factor.
    pub alpha: T,
    /// Most recent contraction estimate.
    pub theta: T,
}

impl<T: Scalar> Default for DampingScratch<T> {
    fn default() -> Self {
        Self {
            alpha: <T as Scalar>::from_f64(INITIAL_ALPHA),
            theta: <T as Scalar>::from_f64(INITIAL_THETA),
        }
    }
}

impl<T: Scalar> DampingScratch<T> {
    /// Resets to the initial trial values (`alpha = 1.0`, `theta = 1.3`,
    /// the latter deliberately above any valid acceptance bound).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_constant_schedule() {
        let schedule = StepsizeSchedule::constant(0.1);
        assert_relative_eq!(schedule.length(1, 2.0), 0.1);
        assert_relative_eq!(schedule.length(500, 0.3), 0.1);
    }

    #[test]
    fn test_constant_absolute_normalizes_by_norm() {
        let schedule = StepsizeSchedule::constant_absolute(0.1);
        assert_relative_eq!(schedule.length(1, 2.0), 0.05);
        assert_relative_eq!(schedule.length(7, 0.5), 0.2);
    }

    #[test]
    fn test_absolute_mode_skips_tiny_norms() {
        // A zero or epsilon-sized norm must not blow the step up.
        let schedule = StepsizeSchedule::constant_absolute(0.1);
        assert_relative_eq!(schedule.length(1, 0.0), 0.1);
        assert_relative_eq!(schedule.length(1, f64::EPSILON), 0.1);
    }

    #[test]
    fn test_decreasing_schedule_formula() {
        let schedule = StepsizeSchedule::decreasing(1.0, 0.5, 0.01, 2.0, 1.0);
        // k = 3: (1 - 3*0.01) * 0.5^3 / (3 + 1)^2
        let expected = (1.0 - 0.03) * 0.125 / 16.0;
        assert_relative_eq!(schedule.length(3, 1.0), expected, epsilon = 1e-15);
    }

    #[test]
    fn test_harmonic_schedule() {
        let schedule = StepsizeSchedule::harmonic(2.0);
        assert_relative_eq!(schedule.length(1, 1.0), 2.0);
        assert_relative_eq!(schedule.length(4, 1.0), 0.5);
    }

    #[test]
    fn test_absolute_builder() {
        let schedule = StepsizeSchedule::harmonic(1.0).absolute();
        assert_eq!(schedule.mode(), StepsizeMode::Absolute);
        assert_relative_eq!(schedule.length(2, 4.0), 0.125);
    }

    proptest! {
        #[test]
        fn prop_schedules_are_nonnegative(
            length in 0.0..10.0f64,
            factor in 0.0..=1.0f64,
            subtrahend in 0.0..0.01f64,
            exponent in 0.0..3.0f64,
            shift in 0.0..5.0f64,
            norm in 0.0..100.0f64,
            k in 1usize..200,
        ) {
            prop_assume!(length - (k as f64) * subtrahend >= 0.0);
            let decreasing = StepsizeSchedule::decreasing(length, factor, subtrahend, exponent, shift);
            prop_assert!(decreasing.length(k, norm) >= 0.0);
            let constant = StepsizeSchedule::constant_absolute(length);
            prop_assert!(constant.length(k, norm) >= 0.0);
        }
    }

    #[test]
    fn test_affine_covariant_config_default_is_valid() {
        let config = AffineCovariantConfig::<f64>::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.theta_acc, 1.1 * config.theta_des);
    }

    #[test]
    fn test_affine_covariant_config_rejects_bad_contraction() {
        assert!(AffineCovariantConfig::new(0.0).is_err());
        assert!(AffineCovariantConfig::new(-0.5).is_err());
        // theta_acc = 1.1 * 0.95 exceeds 1.
        assert!(AffineCovariantConfig::new(0.95).is_err());
        assert!(AffineCovariantConfig::new(0.5).is_ok());
    }

    #[test]
    fn test_affine_covariant_config_rejects_bad_bounds() {
        let config = AffineCovariantConfig::new(0.5)
            .unwrap()
            .with_acceptance_bound(0.3);
        assert!(matches!(
            config.validate(),
            Err(SolverError::InvalidConfiguration { .. })
        ));

        let config = AffineCovariantConfig::new(0.5).unwrap().with_max_trials(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_damping_scratch_reset() {
        let mut scratch = DampingScratch::<f64>::default();
        scratch.alpha = 0.25;
        scratch.theta = 0.9;
        scratch.reset();
        assert_relative_eq!(scratch.alpha, 1.0);
        assert_relative_eq!(scratch.theta, 1.3);
    }
}
