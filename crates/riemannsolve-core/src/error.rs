//! Error types for manifold operations and solver execution.
//!
//! Two levels mirror the two layers of the system: [`ManifoldError`] is
//! raised by manifold implementations and user callbacks, [`SolverError`] by
//! the solvers themselves. Solver code converts manifold errors with `?`;
//! nothing is caught or retried on the way up (a failing step aborts the
//! whole solve).
//!
//! Reaching an iteration budget is *not* an error: the driver loop returns
//! normally and callers inspect the stopping criterion to distinguish
//! convergence from exhaustion.

use thiserror::Error;

/// Errors arising from manifold operations or user-supplied callbacks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ManifoldError {
    /// A point is not a valid element of the manifold.
    #[error("Invalid point: {reason}")]
    InvalidPoint {
        /// Why the point is invalid.
        reason: String,
    },

    /// A tangent vector is not valid at its base point.
    #[error("Invalid tangent vector: {reason}")]
    InvalidTangent {
        /// Why the tangent vector is invalid.
        reason: String,
    },

    /// Dimensions of operands do not agree.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// A numerical operation failed (overflow, NaN, loss of precision).
    #[error("Numerical error: {reason}")]
    NumericalError {
        /// Description of the failure.
        reason: String,
    },

    /// An optional capability is not provided by this manifold.
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Name of the missing capability.
        feature: String,
    },
}

impl ManifoldError {
    /// Creates an invalid point error.
    pub fn invalid_point(reason: impl Into<String>) -> Self {
        Self::InvalidPoint {
            reason: reason.into(),
        }
    }

    /// Creates an invalid tangent vector error.
    pub fn invalid_tangent(reason: impl Into<String>) -> Self {
        Self::InvalidTangent {
            reason: reason.into(),
        }
    }

    /// Creates a dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates a numerical error.
    pub fn numerical_error(reason: impl Into<String>) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Creates a not-implemented error for an optional capability.
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }
}

/// Errors arising from solver configuration or execution.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SolverError {
    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {reason} (parameter: {parameter}, value: {value})")]
    InvalidConfiguration {
        /// What is wrong.
        reason: String,
        /// Name of the offending parameter.
        parameter: String,
        /// The offending value, formatted.
        value: String,
    },

    /// The adaptive damping loop exhausted its trial budget without the
    /// contraction estimate dropping below the acceptance bound.
    #[error("Damping failed to contract after {trials} trials (last contraction estimate: {contraction:.3e})")]
    DampingFailed {
        /// Number of trial retractions performed.
        trials: usize,
        /// Contraction estimate of the last rejected trial.
        contraction: f64,
    },

    /// The inner linear system is numerically singular.
    #[error("Singular linear system of size {size} in the inner solve")]
    SingularSystem {
        /// Number of unknowns of the system.
        size: usize,
    },

    /// A manifold operation or user callback failed.
    #[error("Manifold error: {0}")]
    Manifold(#[from] ManifoldError),
}

impl SolverError {
    /// Creates an invalid configuration error.
    pub fn invalid_configuration(
        reason: impl Into<String>,
        parameter: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Creates a damping failure error.
    pub fn damping_failed(trials: usize, contraction: f64) -> Self {
        Self::DampingFailed {
            trials,
            contraction,
        }
    }

    /// Creates a singular system error.
    pub fn singular_system(size: usize) -> Self {
        Self::SingularSystem { size }
    }
}

/// Result type for manifold operations and callbacks.
pub type Result<T> = std::result::Result<T, ManifoldError>;

/// Result type for solver operations.
pub type SolverResult<T> = std::result::Result<T, SolverError>;
