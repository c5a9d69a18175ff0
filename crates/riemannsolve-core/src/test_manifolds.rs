//! Minimal Euclidean manifold for this crate's own unit tests.
//!
//! Downstream crates test against the real manifold implementations; this
//! one exists so the core can exercise objective dispatch, the driver loop
//! and the capability defaults without a dependency cycle.

use crate::error::Result;
use crate::manifold::{Manifold, RetractionMethod, VectorTransportMethod};
use crate::types::DVector;

/// Flat n-dimensional Euclidean space with `DVector<f64>` points.
#[derive(Debug, Clone)]
pub struct TestEuclidean {
    dim: usize,
}

impl TestEuclidean {
    /// Creates an n-dimensional test manifold.
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Manifold<f64> for TestEuclidean {
    type Point = DVector<f64>;
    type TangentVector = DVector<f64>;

    fn name(&self) -> &str {
        "TestEuclidean"
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn zero_vector(&self, point: &DVector<f64>) -> DVector<f64> {
        DVector::zeros(point.len())
    }

    fn inner_product(
        &self,
        _point: &DVector<f64>,
        u: &DVector<f64>,
        v: &DVector<f64>,
    ) -> Result<f64> {
        Ok(u.dot(v))
    }

    fn retract(
        &self,
        point: &DVector<f64>,
        tangent: &DVector<f64>,
        scale: f64,
        _method: &RetractionMethod,
    ) -> Result<DVector<f64>> {
        Ok(point + tangent * scale)
    }

    fn vector_transport(
        &self,
        _from: &DVector<f64>,
        tangent: &DVector<f64>,
        _to: &DVector<f64>,
        _method: &VectorTransportMethod,
    ) -> Result<DVector<f64>> {
        Ok(tangent.clone())
    }

    fn basis(&self, _point: &DVector<f64>) -> Result<Vec<DVector<f64>>> {
        Ok((0..self.dim)
            .map(|i| {
                let mut e = DVector::zeros(self.dim);
                e[i] = 1.0;
                e
            })
            .collect())
    }

    fn coordinates(
        &self,
        _point: &DVector<f64>,
        tangent: &DVector<f64>,
        _basis: &[DVector<f64>],
    ) -> Result<DVector<f64>> {
        Ok(tangent.clone())
    }

    fn vector_from_coordinates(
        &self,
        _point: &DVector<f64>,
        coords: &DVector<f64>,
        _basis: &[DVector<f64>],
    ) -> Result<DVector<f64>> {
        Ok(coords.clone())
    }
}
