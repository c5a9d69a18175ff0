//! The manifold capability interface consumed by the solvers.
//!
//! A Riemannian manifold ℳ supplies points, tangent vectors attached to
//! base points, and a small set of operations on them. The solvers treat
//! both [`Manifold::Point`] and [`Manifold::TangentVector`] as opaque: they
//! are cloned, handed back to the manifold, and never inspected. In
//! particular the core performs no arithmetic on tangent vectors — scaling a
//! direction is expressed through the `scale` argument of [`Manifold::retract`],
//! so `retract(p, X, -t, m)` moves from p along −t·X.
//!
//! # Required and optional capabilities
//!
//! Retraction, zero vectors, point copies and the metric (`inner_product` /
//! `norm`) are required by every solver. The coordinate-basis operations
//! ([`Manifold::basis`], [`Manifold::coordinates`],
//! [`Manifold::vector_from_coordinates`]) and [`Manifold::vector_transport`]
//! default to [`ManifoldError::NotImplemented`]; they are needed only by
//! coordinate-based inner solvers and the finite-difference derivative, which
//! reduce a linear operator on T_p ℳ to a finite-dimensional system.

use crate::error::{ManifoldError, Result};
use crate::types::{DVector, Scalar};
use num_traits::Float;
use std::fmt::Debug;

/// Shorthand for the point type of a manifold.
pub type PointOf<T, M> = <M as Manifold<T>>::Point;

/// Shorthand for the tangent vector type of a manifold.
pub type TangentOf<T, M> = <M as Manifold<T>>::TangentVector;

/// Selects how a manifold realizes its retraction.
///
/// The solver state owns a method value and passes it through to the
/// manifold on every retraction; manifolds that do not support a requested
/// method return [`ManifoldError::NotImplemented`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetractionMethod {
    /// The exponential map, following the geodesic exactly.
    #[default]
    Exponential,
    /// A projection-based first-order retraction (move in the embedding,
    /// project back onto the manifold).
    Projection,
}

/// Selects how a manifold transports tangent vectors between base points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorTransportMethod {
    /// Project the vector onto the tangent space at the target point.
    #[default]
    Projection,
    /// Parallel transport along the connecting geodesic.
    Parallel,
}

/// Capability interface of a Riemannian manifold.
///
/// Implementations provide the geometry; the solvers provide the iteration.
/// All operations are blocking and must leave the manifold value itself
/// unchanged (`&self` everywhere): any mutability lives in the solver state
/// that owns the points.
pub trait Manifold<T: Scalar>: Debug + Send + Sync {
    /// An element of the manifold.
    type Point: Clone + Debug;

    /// An element of a tangent space T_p ℳ, attached to the base point it
    /// was produced at.
    type TangentVector: Clone + Debug;

    /// Returns a human-readable name for the manifold.
    fn name(&self) -> &str;

    /// Returns the intrinsic dimension of the manifold.
    ///
    /// For example, the sphere S^{n-1} embedded in ℝⁿ has dimension n−1.
    fn dimension(&self) -> usize;

    /// Returns the zero tangent vector at `point`.
    fn zero_vector(&self, point: &Self::Point) -> Self::TangentVector;

    /// Returns an owned copy of `point`.
    fn copy_point(&self, point: &Self::Point) -> Self::Point {
        point.clone()
    }

    /// Overwrites `dest` with a copy of `src`, reusing its storage where the
    /// representation allows.
    fn copy_point_into(&self, dest: &mut Self::Point, src: &Self::Point) {
        dest.clone_from(src);
    }

    /// Riemannian inner product ⟨u, v⟩ₚ on the tangent space at `point`.
    fn inner_product(
        &self,
        point: &Self::Point,
        u: &Self::TangentVector,
        v: &Self::TangentVector,
    ) -> Result<T>;

    /// Riemannian norm ‖v‖ₚ of a tangent vector.
    fn norm(&self, point: &Self::Point, v: &Self::TangentVector) -> Result<T> {
        Ok(<T as Float>::sqrt(self.inner_product(point, v, v)?))
    }

    /// Retracts from `point` along `scale · tangent`, returning the new
    /// point.
    ///
    /// A retraction satisfies R_p(0) = p and dR_p(0) = id; the `method`
    /// argument selects which retraction the manifold realizes.
    fn retract(
        &self,
        point: &Self::Point,
        tangent: &Self::TangentVector,
        scale: T,
        method: &RetractionMethod,
    ) -> Result<Self::Point>;

    /// Retracts from `point` along `scale · tangent`, writing the result
    /// into `dest`.
    ///
    /// `dest` must not alias `point`. The default allocates through
    /// [`Manifold::retract`]; manifolds can override to reuse the storage of
    /// `dest`.
    fn retract_into(
        &self,
        dest: &mut Self::Point,
        point: &Self::Point,
        tangent: &Self::TangentVector,
        scale: T,
        method: &RetractionMethod,
    ) -> Result<()> {
        *dest = self.retract(point, tangent, scale, method)?;
        Ok(())
    }

    /// Transports `tangent` from the tangent space at `from` to the tangent
    /// space at `to`.
    fn vector_transport(
        &self,
        from: &Self::Point,
        tangent: &Self::TangentVector,
        to: &Self::Point,
        method: &VectorTransportMethod,
    ) -> Result<Self::TangentVector> {
        let _ = (from, tangent, to, method);
        Err(ManifoldError::not_implemented("vector transport"))
    }

    /// Returns an orthonormal basis of the tangent space at `point`.
    ///
    /// The basis length equals [`Manifold::dimension`]. Required by
    /// coordinate-based inner solvers.
    fn basis(&self, point: &Self::Point) -> Result<Vec<Self::TangentVector>> {
        let _ = point;
        Err(ManifoldError::not_implemented("coordinate basis"))
    }

    /// Expresses `tangent` in `basis` coordinates at `point`.
    fn coordinates(
        &self,
        point: &Self::Point,
        tangent: &Self::TangentVector,
        basis: &[Self::TangentVector],
    ) -> Result<DVector<T>> {
        let _ = (point, tangent, basis);
        Err(ManifoldError::not_implemented("tangent coordinates"))
    }

    /// Reconstructs the tangent vector with the given `basis` coordinates at
    /// `point`; inverse of [`Manifold::coordinates`].
    fn vector_from_coordinates(
        &self,
        point: &Self::Point,
        coords: &DVector<T>,
        basis: &[Self::TangentVector],
    ) -> Result<Self::TangentVector> {
        let _ = (point, coords, basis);
        Err(ManifoldError::not_implemented("tangent reconstruction"))
    }
}
