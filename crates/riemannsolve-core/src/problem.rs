//! Immutable problem aggregates handed to the driver loop.
//!
//! A problem couples the manifold(s) with the user-supplied objective
//! callbacks. It is created once per solve and never mutated; all per-solve
//! mutability lives in the solver state.

use crate::manifold::{Manifold, PointOf, RetractionMethod, TangentOf, VectorTransportMethod};
use crate::objective::{BundleMapObjective, NonsmoothObjective};
use crate::types::{DMatrix, Scalar};

/// A nonsmooth minimization problem: manifold plus objective.
#[derive(Debug)]
pub struct NonsmoothProblem<T: Scalar, M: Manifold<T>> {
    manifold: M,
    objective: NonsmoothObjective<T, M>,
}

impl<T: Scalar, M: Manifold<T>> NonsmoothProblem<T, M> {
    /// Creates a problem from a manifold and an objective.
    pub fn new(manifold: M, objective: NonsmoothObjective<T, M>) -> Self {
        Self {
            manifold,
            objective,
        }
    }

    /// The manifold the iterates live on.
    pub const fn manifold(&self) -> &M {
        &self.manifold
    }

    /// The objective callbacks.
    pub const fn objective(&self) -> &NonsmoothObjective<T, M> {
        &self.objective
    }

    /// Evaluates the cost at `point`.
    pub fn cost(&self, point: &PointOf<T, M>) -> crate::error::Result<T> {
        self.objective.cost(&self.manifold, point)
    }

    /// Evaluates one subgradient element at `point` into `result`.
    pub fn subgradient_into(
        &self,
        result: &mut TangentOf<T, M>,
        point: &PointOf<T, M>,
    ) -> crate::error::Result<()> {
        self.objective.subgradient_into(&self.manifold, result, point)
    }
}

/// A vector-bundle root-finding problem: domain manifold, bundle manifold,
/// and the bundle-map objective.
#[derive(Debug)]
pub struct VectorBundleProblem<T: Scalar, M: Manifold<T>, B: Manifold<T>> {
    manifold: M,
    bundle: B,
    objective: BundleMapObjective<T, M, B>,
}

impl<T: Scalar, M: Manifold<T>, B: Manifold<T>> VectorBundleProblem<T, M, B> {
    /// Creates a problem from the domain manifold, the bundle manifold, and
    /// the objective.
    pub fn new(manifold: M, bundle: B, objective: BundleMapObjective<T, M, B>) -> Self {
        Self {
            manifold,
            bundle,
            objective,
        }
    }

    /// The domain manifold the iterates live on.
    pub const fn manifold(&self) -> &M {
        &self.manifold
    }

    /// The vector-bundle manifold F maps into.
    pub const fn bundle(&self) -> &B {
        &self.bundle
    }

    /// The bundle-map objective.
    pub const fn objective(&self) -> &BundleMapObjective<T, M, B> {
        &self.objective
    }

    /// Evaluates the bundle map F at `point`.
    pub fn value(&self, point: &PointOf<T, M>) -> crate::error::Result<PointOf<T, B>> {
        self.objective.value(&self.manifold, point)
    }

    /// Evaluates the residual field Q(F(p)) at `point`.
    pub fn residual(&self, point: &PointOf<T, M>) -> crate::error::Result<TangentOf<T, M>> {
        self.objective.residual(&self.manifold, &self.bundle, point)
    }

    /// Assembles the linearization matrix of F at `point` in the coordinates
    /// of `basis`.
    pub fn derivative_matrix(
        &self,
        point: &PointOf<T, M>,
        basis: &[TangentOf<T, M>],
        retraction: &RetractionMethod,
        transport: &VectorTransportMethod,
    ) -> crate::error::Result<DMatrix<T>> {
        self.objective
            .derivative_matrix(&self.manifold, &self.bundle, point, basis, retraction, transport)
    }
}
