//! Concrete manifolds for the riemannsolve solvers.
//!
//! Two deliberately thin collaborator implementations of the
//! [`Manifold`](riemannsolve_core::manifold::Manifold) capability interface:
//! flat [`Euclidean`] space and the unit [`Sphere`]. They exist so the
//! solvers can be exercised end to end; they are not a general manifold
//! library.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod euclidean;
pub mod sphere;

pub use euclidean::Euclidean;
pub use sphere::Sphere;
