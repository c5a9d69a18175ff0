//! Inner solvers producing the Newton direction.
//!
//! The outer Newton loop delegates each direction computation to a
//! sub-problem: "given the current base point, produce a tangent vector X
//! approximately solving the linearized equation F′(p)[X] = −Q(F(p))". Three
//! calling conventions exist and are fixed at construction as the variants
//! of [`NewtonSubproblem`]:
//!
//! - [`NewtonSubproblem::Solver`]: a stateful inner solver with a full
//!   re-linearize / reset / solve lifecycle ([`NewtonSubsolver`]);
//! - [`NewtonSubproblem::Allocating`]: a callable returning the direction by
//!   value;
//! - [`NewtonSubproblem::InPlace`]: a callable writing into a caller-supplied
//!   buffer, which is reset to the zero tangent before the call.
//!
//! [`CoordinateLinearSolver`] is the built-in [`NewtonSubsolver`]: it reduces
//! the linearized equation to a dense system in tangent-space coordinates and
//! solves it by LU decomposition.

use riemannsolve_core::error::{ManifoldError, SolverError, SolverResult};
use riemannsolve_core::manifold::{
    Manifold, PointOf, RetractionMethod, TangentOf, VectorTransportMethod,
};
use riemannsolve_core::problem::VectorBundleProblem;
use riemannsolve_core::types::{DMatrix, DVector, Scalar};
use std::fmt;

/// A stateful inner solver with a full lifecycle.
///
/// The outer step (and each damping trial) drives it through
/// `set_base_point` → `reset` → `solve`; the inner solve always restarts
/// from the zero tangent, never warm-started from the previous direction.
pub trait NewtonSubsolver<T: Scalar, M: Manifold<T>, B: Manifold<T>> {
    /// Re-linearizes the sub-problem at `point`. The outer state's
    /// configured retraction and transport methods are passed through so the
    /// inner solver consumes the same geometry as the outer loop.
    fn set_base_point(
        &mut self,
        problem: &VectorBundleProblem<T, M, B>,
        point: &PointOf<T, M>,
        retraction: &RetractionMethod,
        transport: &VectorTransportMethod,
    ) -> SolverResult<()>;

    /// Resets the inner iterate to the given zero tangent vector.
    fn reset(&mut self, zero: TangentOf<T, M>);

    /// Runs the inner solve to convergence and returns the resulting
    /// direction.
    fn solve(
        &mut self,
        problem: &VectorBundleProblem<T, M, B>,
    ) -> SolverResult<&TangentOf<T, M>>;
}

/// Boxed callable returning the Newton direction by value.
pub type AllocatingDirectionFn<T, M, B> =
    Box<dyn Fn(&VectorBundleProblem<T, M, B>, &PointOf<T, M>) -> SolverResult<TangentOf<T, M>>>;

/// Boxed callable writing the Newton direction into a caller buffer.
pub type InPlaceDirectionFn<T, M, B> = Box<
    dyn Fn(
        &VectorBundleProblem<T, M, B>,
        &mut TangentOf<T, M>,
        &PointOf<T, M>,
    ) -> SolverResult<()>,
>;

/// The sub-problem of the Newton method, tagged with its calling convention.
///
/// The variant is selected once at construction and fixed for the life of
/// the owning state.
pub enum NewtonSubproblem<T: Scalar, M: Manifold<T>, B: Manifold<T>> {
    /// A stateful inner solver with its own lifecycle.
    Solver(Box<dyn NewtonSubsolver<T, M, B>>),
    /// A direct callable returning the direction by value.
    Allocating(AllocatingDirectionFn<T, M, B>),
    /// A direct callable writing into the caller-supplied buffer.
    InPlace(InPlaceDirectionFn<T, M, B>),
}

impl<T: Scalar, M: Manifold<T>, B: Manifold<T>> NewtonSubproblem<T, M, B> {
    /// Wraps a stateful inner solver.
    pub fn solver(solver: impl NewtonSubsolver<T, M, B> + 'static) -> Self {
        Self::Solver(Box::new(solver))
    }

    /// Wraps an allocating direction callable.
    pub fn allocating<F>(f: F) -> Self
    where
        F: Fn(&VectorBundleProblem<T, M, B>, &PointOf<T, M>) -> SolverResult<TangentOf<T, M>>
            + 'static,
    {
        Self::Allocating(Box::new(f))
    }

    /// Wraps an in-place direction callable.
    pub fn in_place<F>(f: F) -> Self
    where
        F: Fn(
                &VectorBundleProblem<T, M, B>,
                &mut TangentOf<T, M>,
                &PointOf<T, M>,
            ) -> SolverResult<()>
            + 'static,
    {
        Self::InPlace(Box::new(f))
    }

    /// Computes the Newton direction at `point` into `direction`, whichever
    /// convention is active.
    ///
    /// Used both at accepted iterates and, one level deeper, at the damping
    /// rule's trial points.
    pub fn solve_at(
        &mut self,
        problem: &VectorBundleProblem<T, M, B>,
        point: &PointOf<T, M>,
        direction: &mut TangentOf<T, M>,
        retraction: &RetractionMethod,
        transport: &VectorTransportMethod,
    ) -> SolverResult<()> {
        match self {
            Self::Solver(solver) => {
                solver.set_base_point(problem, point, retraction, transport)?;
                solver.reset(problem.manifold().zero_vector(point));
                *direction = solver.solve(problem)?.clone();
                Ok(())
            }
            Self::Allocating(f) => {
                *direction = f(problem, point)?;
                Ok(())
            }
            Self::InPlace(f) => {
                *direction = problem.manifold().zero_vector(point);
                f(problem, direction, point)
            }
        }
    }
}

impl<T: Scalar, M: Manifold<T>, B: Manifold<T>> fmt::Debug for NewtonSubproblem<T, M, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solver(_) => f.write_str("NewtonSubproblem::Solver"),
            Self::Allocating(_) => f.write_str("NewtonSubproblem::Allocating"),
            Self::InPlace(_) => f.write_str("NewtonSubproblem::InPlace"),
        }
    }
}

/// Direct inner solver in tangent-space coordinates.
///
/// At each base point it extracts the tangent basis, assembles the
/// derivative matrix (analytic callback or finite differences) and the
/// coordinate residual −Q(F(p)), and solves the dense square system by LU.
/// The solution is mapped back through
/// [`Manifold::vector_from_coordinates`].
pub struct CoordinateLinearSolver<T: Scalar, M: Manifold<T>> {
    base_point: Option<PointOf<T, M>>,
    basis: Vec<TangentOf<T, M>>,
    matrix: Option<DMatrix<T>>,
    rhs: Option<DVector<T>>,
    direction: Option<TangentOf<T, M>>,
}

impl<T: Scalar, M: Manifold<T>> CoordinateLinearSolver<T, M> {
    /// Creates an empty solver; linearization happens at `set_base_point`.
    pub fn new() -> Self {
        Self {
            base_point: None,
            basis: Vec::new(),
            matrix: None,
            rhs: None,
            direction: None,
        }
    }
}

impl<T: Scalar, M: Manifold<T>> Default for CoordinateLinearSolver<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, M: Manifold<T>> fmt::Debug for CoordinateLinearSolver<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateLinearSolver")
            .field("linearized", &self.matrix.is_some())
            .field("basis_len", &self.basis.len())
            .finish()
    }
}

impl<T: Scalar, M: Manifold<T>, B: Manifold<T>> NewtonSubsolver<T, M, B>
    for CoordinateLinearSolver<T, M>
{
    fn set_base_point(
        &mut self,
        problem: &VectorBundleProblem<T, M, B>,
        point: &PointOf<T, M>,
        retraction: &RetractionMethod,
        transport: &VectorTransportMethod,
    ) -> SolverResult<()> {
        let manifold = problem.manifold();
        let basis = manifold.basis(point)?;
        let n = basis.len();
        let matrix = problem.derivative_matrix(point, &basis, retraction, transport)?;
        if matrix.nrows() != n || matrix.ncols() != n {
            return Err(
                ManifoldError::dimension_mismatch(n, matrix.nrows().max(matrix.ncols())).into(),
            );
        }
        let residual = problem.residual(point)?;
        let rhs = -manifold.coordinates(point, &residual, &basis)?;
        self.base_point = Some(manifold.copy_point(point));
        self.basis = basis;
        self.matrix = Some(matrix);
        self.rhs = Some(rhs);
        Ok(())
    }

    fn reset(&mut self, zero: TangentOf<T, M>) {
        self.direction = Some(zero);
    }

    fn solve(
        &mut self,
        problem: &VectorBundleProblem<T, M, B>,
    ) -> SolverResult<&TangentOf<T, M>> {
        let (matrix, rhs, point) = match (&self.matrix, &self.rhs, &self.base_point) {
            (Some(matrix), Some(rhs), Some(point)) => (matrix, rhs, point),
            _ => {
                return Err(SolverError::invalid_configuration(
                    "solve called before set_base_point",
                    "base_point",
                    "none".to_string(),
                ))
            }
        };
        let n = rhs.len();
        let coords = matrix
            .clone()
            .lu()
            .solve(rhs)
            .ok_or_else(|| SolverError::singular_system(n))?;
        let direction = problem
            .manifold()
            .vector_from_coordinates(point, &coords, &self.basis)?;
        Ok(&*self.direction.insert(direction))
    }
}
