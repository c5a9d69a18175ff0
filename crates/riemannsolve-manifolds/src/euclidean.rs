//! Flat Euclidean space ℝⁿ.
//!
//! The trivial manifold: points and tangent vectors are plain vectors, both
//! retraction methods are translation, transport is the identity and the
//! standard basis spans every tangent space. It exists as a collaborator for
//! the solvers — in particular as the domain of the scalar boundary wrapper
//! and as the setting where Newton convergence is exact for linear maps.

use rand_distr::{Distribution, StandardNormal};
use riemannsolve_core::error::{ManifoldError, Result};
use riemannsolve_core::manifold::{Manifold, RetractionMethod, VectorTransportMethod};
use riemannsolve_core::types::{DVector, Scalar};
use std::marker::PhantomData;

/// The Euclidean space ℝⁿ with the standard inner product.
#[derive(Debug, Clone)]
pub struct Euclidean<T: Scalar> {
    dim: usize,
    _marker: PhantomData<T>,
}

impl<T: Scalar> Euclidean<T> {
    /// Creates the n-dimensional Euclidean space.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            _marker: PhantomData,
        }
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, x: &DVector<T>, y: &DVector<T>) -> T {
        (x - y).norm()
    }

    /// Samples a point with independent standard-normal components.
    pub fn random_point(&self) -> DVector<T> {
        let mut rng = rand::thread_rng();
        DVector::from_fn(self.dim, |_, _| {
            let v: f64 = StandardNormal.sample(&mut rng);
            <T as Scalar>::from_f64(v)
        })
    }

    fn check_dim(&self, v: &DVector<T>) -> Result<()> {
        if v.len() == self.dim {
            Ok(())
        } else {
            Err(ManifoldError::dimension_mismatch(self.dim, v.len()))
        }
    }
}

impl<T: Scalar> Manifold<T> for Euclidean<T> {
    type Point = DVector<T>;
    type TangentVector = DVector<T>;

    fn name(&self) -> &str {
        "Euclidean"
    }

    fn dimension(&self) -> usize {
        self.dim
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
        _method: &RetractionMethod,
    ) -> Result<DVector<T>> {
        // Every retraction on flat space is translation.
        self.check_dim(point)?;
        self.check_dim(tangent)?;
        Ok(point + tangent * scale)
    }

    fn vector_transport(
        &self,
        _from: &DVector<T>,
        tangent: &DVector<T>,
        _to: &DVector<T>,
        _method: &VectorTransportMethod,
    ) -> Result<DVector<T>> {
        Ok(tangent.clone())
    }

    fn basis(&self, _point: &DVector<T>) -> Result<Vec<DVector<T>>> {
        Ok((0..self.dim)
            .map(|i| {
                let mut e = DVector::zeros(self.dim);
                e[i] = T::one();
                e
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
