//! Integration tests for riemannsolve-manifolds.
//!
//! Verifies that both manifolds honor the capability contract the solvers
//! rely on, independently of any solver.

use approx::assert_relative_eq;
use nalgebra::dvector;
use riemannsolve_core::manifold::{Manifold, RetractionMethod, VectorTransportMethod};
use riemannsolve_manifolds::{Euclidean, Sphere};

#[test]
fn zero_tangent_retraction_is_identity_on_euclidean() {
    let space = Euclidean::<f64>::new(3);
    let p = dvector![1.0, -2.0, 0.5];
    let zero = space.zero_vector(&p);
    for method in [RetractionMethod::Exponential, RetractionMethod::Projection] {
        let q = space.retract(&p, &zero, 1.0, &method).unwrap();
        assert_relative_eq!(q, p);
    }
}

#[test]
fn zero_tangent_retraction_is_identity_on_sphere() {
    let sphere = Sphere::<f64>::new(4).unwrap();
    let p = sphere.random_point();
    let zero = sphere.zero_vector(&p);
    for method in [RetractionMethod::Exponential, RetractionMethod::Projection] {
        let q = sphere.retract(&p, &zero, 1.0, &method).unwrap();
        assert_relative_eq!(q, p, epsilon = 1e-14);
    }
}

#[test]
fn scale_argument_matches_pre_scaled_tangent() {
    let sphere = Sphere::<f64>::new(3).unwrap();
    let p = dvector![0.0, 0.0, 1.0];
    let v = dvector![0.2, -0.1, 0.0];
    let scaled = &v * -0.7;
    let with_scale = sphere
        .retract(&p, &v, -0.7, &RetractionMethod::Exponential)
        .unwrap();
    let pre_scaled = sphere
        .retract(&p, &scaled, 1.0, &RetractionMethod::Exponential)
        .unwrap();
    assert_relative_eq!(with_scale, pre_scaled, epsilon = 1e-14);
}

#[test]
fn retract_into_overwrites_destination() {
    let sphere = Sphere::<f64>::new(3).unwrap();
    let p = dvector![1.0, 0.0, 0.0];
    let v = dvector![0.0, 0.3, 0.0];
    let mut dest = sphere.copy_point(&p);
    sphere
        .retract_into(&mut dest, &p, &v, 1.0, &RetractionMethod::Exponential)
        .unwrap();
    let expected = sphere.retract(&p, &v, 1.0, &RetractionMethod::Exponential).unwrap();
    assert_relative_eq!(dest, expected);
}

#[test]
fn exp_retraction_moves_the_geodesic_distance() {
    let sphere = Sphere::<f64>::new(3).unwrap();
    let p = dvector![1.0, 0.0, 0.0];
    let v = dvector![0.0, 0.25, 0.0];
    let q = sphere.retract(&p, &v, 1.0, &RetractionMethod::Exponential).unwrap();
    assert_relative_eq!(sphere.distance(&p, &q), 0.25, epsilon = 1e-12);
}

#[test]
fn parallel_transport_of_geodesic_velocity() {
    // Transporting log_x(y) from x to y yields -log_y(x).
    let sphere = Sphere::<f64>::new(3).unwrap();
    let x = dvector![1.0, 0.0, 0.0];
    let y = dvector![0.0, 0.0, 1.0];
    let v = sphere.log_map(&x, &y).unwrap();
    let transported = sphere
        .vector_transport(&x, &v, &y, &VectorTransportMethod::Parallel)
        .unwrap();
    let back = sphere.log_map(&y, &x).unwrap();
    assert_relative_eq!(transported, -back, epsilon = 1e-12);
}

#[test]
fn copy_point_into_reuses_storage() {
    let space = Euclidean::<f64>::new(2);
    let src = dvector![4.0, 5.0];
    let mut dest = dvector![0.0, 0.0];
    space.copy_point_into(&mut dest, &src);
    assert_relative_eq!(dest, src);
}

#[test]
fn norm_agrees_with_inner_product() {
    let sphere = Sphere::<f64>::new(5).unwrap();
    let p = sphere.random_point();
    let v = sphere.random_tangent(&p);
    let norm = sphere.norm(&p, &v).unwrap();
    let inner = sphere.inner_product(&p, &v, &v).unwrap();
    assert_relative_eq!(norm * norm, inner, epsilon = 1e-12);
}
