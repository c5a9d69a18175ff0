//! User-supplied objective callbacks.
//!
//! Two objective shapes exist, one per solver:
//!
//! - [`NonsmoothObjective`] couples a cost function with a subgradient
//!   selector for subgradient descent. The selector comes in two evaluation
//!   conventions ([`SubgradientFn::Allocating`] / [`SubgradientFn::InPlace`]);
//!   the convention is chosen once at construction and the step dispatches on
//!   the tag.
//! - [`BundleMapObjective`] describes the root-finding data of the Newton
//!   method: the bundle map F: ℳ → ℰ, the connection map Q mapping a bundle
//!   value back into the tangent space over its base point, and optionally
//!   the derivative F′ expressed as a matrix in tangent-space coordinates.
//!   Without a derivative callback, the linearization is approximated by
//!   finite differences on the residual field Q∘F, transporting each probe
//!   back to the base point.
//!
//! Callbacks may fail; errors propagate to the driver loop and abort the
//! solve.

use crate::error::{ManifoldError, Result};
use crate::manifold::{Manifold, PointOf, RetractionMethod, TangentOf, VectorTransportMethod};
use crate::types::{DMatrix, Scalar};
use num_traits::Float;
use std::fmt;

/// Boxed cost callback.
pub type CostFn<T, M> = Box<dyn Fn(&M, &PointOf<T, M>) -> Result<T>>;

/// A subgradient selector in one of the two evaluation conventions.
///
/// The callback returns *one element* of the (possibly set-valued)
/// subgradient at the given point; it may select nondeterministically among
/// valid elements.
pub enum SubgradientFn<T: Scalar, M: Manifold<T>> {
    /// Returns the subgradient by value.
    Allocating(Box<dyn Fn(&M, &PointOf<T, M>) -> Result<TangentOf<T, M>>>),
    /// Writes the subgradient into a caller-supplied tangent vector.
    InPlace(Box<dyn Fn(&M, &mut TangentOf<T, M>, &PointOf<T, M>) -> Result<()>>),
}

impl<T: Scalar, M: Manifold<T>> SubgradientFn<T, M> {
    /// Wraps an allocating callback.
    pub fn allocating<F>(f: F) -> Self
    where
        F: Fn(&M, &PointOf<T, M>) -> Result<TangentOf<T, M>> + 'static,
    {
        Self::Allocating(Box::new(f))
    }

    /// Wraps an in-place callback.
    pub fn in_place<F>(f: F) -> Self
    where
        F: Fn(&M, &mut TangentOf<T, M>, &PointOf<T, M>) -> Result<()> + 'static,
    {
        Self::InPlace(Box::new(f))
    }
}

impl<T: Scalar, M: Manifold<T>> fmt::Debug for SubgradientFn<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocating(_) => f.write_str("SubgradientFn::Allocating"),
            Self::InPlace(_) => f.write_str("SubgradientFn::InPlace"),
        }
    }
}

/// A nonsmooth objective: cost plus subgradient selector.
pub struct NonsmoothObjective<T: Scalar, M: Manifold<T>> {
    cost: CostFn<T, M>,
    subgradient: SubgradientFn<T, M>,
}

impl<T: Scalar, M: Manifold<T>> NonsmoothObjective<T, M> {
    /// Creates an objective from a cost callback and a subgradient selector.
    pub fn new<F>(cost: F, subgradient: SubgradientFn<T, M>) -> Self
    where
        F: Fn(&M, &PointOf<T, M>) -> Result<T> + 'static,
    {
        Self {
            cost: Box::new(cost),
            subgradient,
        }
    }

    /// Evaluates the cost at `point`.
    pub fn cost(&self, manifold: &M, point: &PointOf<T, M>) -> Result<T> {
        (self.cost)(manifold, point)
    }

    /// Evaluates one subgradient element at `point` into `result`,
    /// dispatching on the configured convention.
    pub fn subgradient_into(
        &self,
        manifold: &M,
        result: &mut TangentOf<T, M>,
        point: &PointOf<T, M>,
    ) -> Result<()> {
        match &self.subgradient {
            SubgradientFn::Allocating(f) => {
                *result = f(manifold, point)?;
                Ok(())
            }
            SubgradientFn::InPlace(f) => f(manifold, result, point),
        }
    }
}

impl<T: Scalar, M: Manifold<T>> fmt::Debug for NonsmoothObjective<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonsmoothObjective")
            .field("subgradient", &self.subgradient)
            .finish_non_exhaustive()
    }
}

/// Boxed bundle-map callback F: ℳ → ℰ.
pub type BundleMapFn<T, M, B> = Box<dyn Fn(&M, &PointOf<T, M>) -> Result<PointOf<T, B>>>;

/// Boxed connection-map callback Q: value of F at p ↦ tangent vector at p.
pub type ConnectionFn<T, M, B> = Box<dyn Fn(&B, &PointOf<T, B>) -> Result<TangentOf<T, M>>>;

/// Boxed derivative callback returning F′(p) in tangent-space coordinates.
pub type DerivativeFn<T, M> = Box<dyn Fn(&M, &PointOf<T, M>) -> Result<DMatrix<T>>>;

/// Root-finding data of the vectorbundle Newton method.
pub struct BundleMapObjective<T: Scalar, M: Manifold<T>, B: Manifold<T>> {
    map: BundleMapFn<T, M, B>,
    connection: ConnectionFn<T, M, B>,
    derivative: Option<DerivativeFn<T, M>>,
}

impl<T: Scalar, M: Manifold<T>, B: Manifold<T>> BundleMapObjective<T, M, B> {
    /// Creates an objective from the bundle map and the connection map.
    ///
    /// The derivative is approximated by finite differences until
    /// [`BundleMapObjective::with_derivative`] supplies it analytically.
    pub fn new<F, Q>(map: F, connection: Q) -> Self
    where
        F: Fn(&M, &PointOf<T, M>) -> Result<PointOf<T, B>> + 'static,
        Q: Fn(&B, &PointOf<T, B>) -> Result<TangentOf<T, M>> + 'static,
    {
        Self {
            map: Box::new(map),
            connection: Box::new(connection),
            derivative: None,
        }
    }

    /// Supplies the analytic derivative F′(p), expressed in the same
    /// tangent-space bases that [`Manifold::basis`] produces.
    pub fn with_derivative<D>(mut self, derivative: D) -> Self
    where
        D: Fn(&M, &PointOf<T, M>) -> Result<DMatrix<T>> + 'static,
    {
        self.derivative = Some(Box::new(derivative));
        self
    }

    /// Whether an analytic derivative callback was supplied.
    pub const fn has_derivative(&self) -> bool {
        self.derivative.is_some()
    }

    /// Evaluates the bundle map F at `point`.
    pub fn value(&self, manifold: &M, point: &PointOf<T, M>) -> Result<PointOf<T, B>> {
        (self.map)(manifold, point)
    }

    /// Evaluates the residual field Q(F(p)), a tangent vector at `point`.
    pub fn residual(
        &self,
        manifold: &M,
        bundle: &B,
        point: &PointOf<T, M>,
    ) -> Result<TangentOf<T, M>> {
        let value = (self.map)(manifold, point)?;
        (self.connection)(bundle, &value)
    }

    /// Assembles the linearization matrix of the bundle map at `point` in
    /// the coordinates of `basis`.
    ///
    /// Uses the analytic callback when supplied. Otherwise each column j is
    /// the finite-difference quotient of the residual field along the j-th
    /// basis vector: probe `retract(p, bⱼ, h)`, transport the residual back
    /// to `point` with the configured `transport` method, and difference the
    /// coordinates.
    pub fn derivative_matrix(
        &self,
        manifold: &M,
        bundle: &B,
        point: &PointOf<T, M>,
        basis: &[TangentOf<T, M>],
        retraction: &RetractionMethod,
        transport: &VectorTransportMethod,
    ) -> Result<DMatrix<T>> {
        if let Some(derivative) = &self.derivative {
            return derivative(manifold, point);
        }

        let n = basis.len();
        let h = <T as Float>::sqrt(<T as Scalar>::EPSILON);
        let base_residual = self.residual(manifold, bundle, point)?;
        let base_coords = manifold.coordinates(point, &base_residual, basis)?;
        if base_coords.len() != n {
            return Err(ManifoldError::dimension_mismatch(n, base_coords.len()));
        }

        let mut matrix = DMatrix::zeros(n, n);
        for (j, direction) in basis.iter().enumerate() {
            let probe = manifold.retract(point, direction, h, retraction)?;
            let probe_residual = self.residual(manifold, bundle, &probe)?;
            let transported = manifold.vector_transport(&probe, &probe_residual, point, transport)?;
            let probe_coords = manifold.coordinates(point, &transported, basis)?;
            let column = (probe_coords - &base_coords) / h;
            matrix.set_column(j, &column);
        }
        Ok(matrix)
    }
}

impl<T: Scalar, M: Manifold<T>, B: Manifold<T>> fmt::Debug for BundleMapObjective<T, M, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let derivative = if self.derivative.is_some() {
            "analytic"
        } else {
            "finite-difference"
        };
        f.debug_struct("BundleMapObjective")
            .field("derivative", &derivative)
            .finish_non_exhaustive()
    }
}
