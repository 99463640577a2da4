mod common;

use approx::assert_abs_diff_eq;
use droplet_core::geometry::Point;
use droplet_core::tensiometry::{fit_needle_width, Tolerances};

fn needle_edges(angle_deg: f64, diameter: f64) -> (Vec<Point>, Vec<Point>) {
    let edge0 = common::line_points(Point::new(100.0, 50.0), angle_deg, 150.0, 40);
    let (sin_t, cos_t) = angle_deg.to_radians().sin_cos();
    let offset = Point::new(diameter * sin_t, -diameter * cos_t);
    let edge1 = edge0.iter().map(|&p| p + offset).collect();
    (edge0, edge1)
}

#[test]
fn test_needle_width_of_tilted_edges() {
    let (edge0, edge1) = needle_edges(80.0, 120.0);
    let fit = fit_needle_width(&edge0, &edge1, &Tolerances::default()).unwrap();
    assert_abs_diff_eq!(fit.diameter, 120.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.theta.to_degrees().rem_euclid(180.0), 80.0, epsilon = 1e-6);
    assert!(fit.status.is_converged());
}

#[test]
fn test_needle_width_of_vertical_edges() {
    let (edge0, edge1) = needle_edges(90.0, 64.0);
    let fit = fit_needle_width(&edge0, &edge1, &Tolerances::default()).unwrap();
    assert_abs_diff_eq!(fit.diameter, 64.0, epsilon = 1e-6);
}

#[test]
fn test_needle_width_is_order_independent() {
    let (edge0, edge1) = needle_edges(75.0, 90.0);
    let a = fit_needle_width(&edge0, &edge1, &Tolerances::default()).unwrap();
    let b = fit_needle_width(&edge1, &edge0, &Tolerances::default()).unwrap();
    assert_abs_diff_eq!(a.diameter, b.diameter, epsilon = 1e-6);
}

#[test]
fn test_horizontal_needle_rejected() {
    let (edge0, edge1) = needle_edges(0.0, 50.0);
    assert!(fit_needle_width(&edge0, &edge1, &Tolerances::default()).is_err());
}

#[test]
fn test_needle_needs_points() {
    let (edge0, edge1) = needle_edges(80.0, 120.0);
    assert!(fit_needle_width(&edge0[..1], &edge1, &Tolerances::default()).is_err());
    assert!(fit_needle_width(&edge0, &[], &Tolerances::default()).is_err());
}
