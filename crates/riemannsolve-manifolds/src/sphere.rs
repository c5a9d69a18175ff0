//! The unit sphere S^{n-1} = {x ∈ ℝⁿ : ‖x‖ = 1}.
//!
//! The classic curved test bed: the exponential and logarithmic maps have
//! closed forms, parallel transport along geodesics is explicit, and an
//! orthonormal tangent basis falls out of a Householder reflector. Tangent
//! vectors at x are the ambient vectors orthogonal to x.

use num_traits::Float;
use rand_distr::{Distribution, StandardNormal};
use riemannsolve_core::error::{ManifoldError, Result};
use riemannsolve_core::manifold::{Manifold, RetractionMethod, VectorTransportMethod};
use riemannsolve_core::types::{DVector, Scalar};
use std::marker::PhantomData;

/// The unit sphere S^{n-1} embedded in ℝⁿ, with the metric inherited from
/// the ambient space.
#[derive(Debug, Clone)]
pub struct Sphere<T: Scalar> {
    ambient_dim: usize,
    _marker: PhantomData<T>,
}

impl<T: Scalar> Sphere<T> {
    /// Creates the sphere S^{n-1} embedded in ℝⁿ.
    ///
    /// # Errors
    ///
    /// Fails if `ambient_dim < 2`.
    pub fn new(ambient_dim: usize) -> Result<Self> {
        if ambient_dim < 2 {
            return Err(ManifoldError::invalid_point(
                "sphere requires ambient dimension >= 2",
            ));
        }
        Ok(Self {
            ambient_dim,
            _marker: PhantomData,
        })
    }

    /// The dimension n of the ambient space.
    pub const fn ambient_dimension(&self) -> usize {
        self.ambient_dim
    }

    /// Projects an ambient vector onto the sphere by normalization.
    ///
    /// A vector of (near-)zero norm has no nearest point; it maps to the
    /// first standard basis vector.
    pub fn project_point(&self, point: &DVector<T>) -> DVector<T> {
        let norm = point.norm();
        if norm < T::EPSILON {
            let mut e = DVector::zeros(self.ambient_dim);
            e[0] = T::one();
            e
        } else {
            point / norm
        }
    }

    /// Projects an ambient vector onto the tangent space at `point`:
    /// v − ⟨v, x⟩x.
    pub fn project_tangent(&self, point: &DVector<T>, vector: &DVector<T>) -> DVector<T> {
        vector - point * point.dot(vector)
    }

    /// Exponential map: exp_x(v) = cos(‖v‖)x + sin(‖v‖)v/‖v‖.
    ///
    /// The result is renormalized so round-off cannot accumulate across
    /// iterated retractions.
    pub fn exp_map(&self, point: &DVector<T>, tangent: &DVector<T>) -> DVector<T> {
        let norm = tangent.norm();
        if norm < T::EPSILON {
            return point.clone();
        }
        let moved = point * <T as Float>::cos(norm) + tangent * (<T as Float>::sin(norm) / norm);
        self.project_point(&moved)
    }

    /// Logarithmic map: log_x(y) = θ(y − cos(θ)x)/sin(θ) with
    /// θ = arccos(⟨x, y⟩).
    ///
    /// # Errors
    ///
    /// Fails with a numerical error for antipodal points, where the map is
    /// not unique.
    pub fn log_map(&self, point: &DVector<T>, other: &DVector<T>) -> Result<DVector<T>> {
        let cos_theta = clamp_unit(point.dot(other));
        let theta = <T as Float>::acos(cos_theta);
        if theta < T::EPSILON {
            return Ok(DVector::zeros(self.ambient_dim));
        }
        let sin_theta = <T as Float>::sin(theta);
        if sin_theta < T::EPSILON {
            return Err(ManifoldError::numerical_error(
                "logarithm of an antipodal point is not unique",
            ));
        }
        // Projecting keeps the result tangent at `point` even when the base
        // point carries round-off from earlier steps.
        let log = (other - point * cos_theta) * (theta / sin_theta);
        Ok(self.project_tangent(point, &log))
    }

    /// Geodesic distance θ = arccos(⟨x, y⟩).
    pub fn distance(&self, x: &DVector<T>, y: &DVector<T>) -> T {
        <T as Float>::acos(clamp_unit(x.dot(y)))
    }

    /// Samples a uniformly distributed point (normalized Gaussian vector).
    pub fn random_point(&self) -> DVector<T> {
        let mut rng = rand::thread_rng();
        let ambient = DVector::from_fn(self.ambient_dim, |_, _| {
            let v: f64 = StandardNormal.sample(&mut rng);
            <T as Scalar>::from_f64(v)
        });
        self.project_point(&ambient)
    }

    /// Samples a Gaussian tangent vector at `point`.
    pub fn random_tangent(&self, point: &DVector<T>) -> DVector<T> {
        let mut rng = rand::thread_rng();
        let ambient = DVector::from_fn(self.ambient_dim, |_, _| {
            let v: f64 = StandardNormal.sample(&mut rng);
            <T as Scalar>::from_f64(v)
        });
        self.project_tangent(point, &ambient)
    }
}

/// Clamps an inner product into [−1, 1] before arccos.
fn clamp_unit<T: Scalar>(value: T) -> T {
    <T as Float>::max(<T as Float>::min(value, T::one()), -T::one())
}

impl<T: Scalar> Manifold<T> for Sphere<T> {
    type Point = DVector<T>;
    type TangentVector = DVector<T>;

    fn name(&self) -> &str {
        "Sphere"
    }

    fn dimension(&self) -> usize {
        self.ambient_dim - 1
    }

    fn zero_vector(&self, point: &DVector<T>) -> DVector<T> {
        DVector::zeros(point.len())
    }

    fn inner_product(&self, _point: &DVector<T>, u: &DVector<T>, v: &DVector<T>) -> Result<T> {
        Ok(u.dot(v))
    }

    fn retract(
        &self,
        point: &DVector<T>,
        tangent: &DVector<T>,
        scale: T,
        method: &RetractionMethod,
    ) -> Result<DVector<T>> {
        if point.len() != self.ambient_dim || tangent.len() != self.ambient_dim {
            return Err(ManifoldError::dimension_mismatch(
                self.ambient_dim,
                point.len().max(tangent.len()),
            ));
        }
        let scaled = tangent * scale;
        match method {
            RetractionMethod::Exponential => Ok(self.exp_map(point, &scaled)),
            RetractionMethod::Projection => Ok(self.project_point(&(point + scaled))),
        }
    }

    fn vector_transport(
        &self,
        from: &DVector<T>,
        tangent: &DVector<T>,
        to: &DVector<T>,
        method: &VectorTransportMethod,
    ) -> Result<DVector<T>> {
        match method {
            VectorTransportMethod::Projection => Ok(self.project_tangent(to, tangent)),
            VectorTransportMethod::Parallel => {
                // P_{x→y}(v) = v − ⟨v, y⟩/(1 + ⟨x, y⟩) (x + y), the parallel
                // transport along the minimizing geodesic.
                let denom = T::one() + from.dot(to);
                if denom < T::EPSILON {
                    return Err(ManifoldError::numerical_error(
                        "parallel transport between antipodal points is not unique",
                    ));
                }
                Ok(tangent - (from + to) * (tangent.dot(to) / denom))
            }
        }
    }

    fn basis(&self, point: &DVector<T>) -> Result<Vec<DVector<T>>> {
        // Columns 2..n of the Householder reflector H = I − 2ww^T that maps
        // e1 to `point` form an orthonormal basis of the tangent space.
        let n = self.ambient_dim;
        let mut w = -point.clone();
        w[0] += T::one();
        let w_norm = w.norm();
        if w_norm < T::EPSILON {
            // point ≈ e1: the reflector degenerates to the identity and the
            // remaining standard basis vectors are already tangent.
            return Ok((1..n)
                .map(|i| {
                    let mut e = DVector::zeros(n);
                    e[i] = T::one();
                    e
                })
                .collect());
        }
        w /= w_norm;
        Ok((1..n)
            .map(|i| {
                let mut column = &w * (<T as Scalar>::from_f64(-2.0) * w[i]);
                column[i] += T::one();
                column
            })
            .collect())
    }

    fn coordinates(
        &self,
        point: &DVector<T>,
        tangent: &DVector<T>,
        basis: &[DVector<T>],
    ) -> Result<DVector<T>> {
        let mut coords = DVector::zeros(basis.len());
        for (i, b) in basis.iter().enumerate() {
            coords[i] = self.inner_product(point, tangent, b)?;
        }
        Ok(coords)
    }

    fn vector_from_coordinates(
        &self,
        point: &DVector<T>,
        coords: &DVector<T>,
        basis: &[DVector<T>],
    ) -> Result<DVector<T>> {
        if coords.len() != basis.len() {
            return Err(ManifoldError::dimension_mismatch(basis.len(), coords.len()));
        }
        let mut result = self.zero_vector(point);
        for (i, b) in basis.iter().enumerate() {
            result += b * coords[i];
        }
        Ok(result)
    }
}
