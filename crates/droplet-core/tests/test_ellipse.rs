mod common;

use approx::assert_abs_diff_eq;
use droplet_core::clean::{clean, CleanConfig};
use droplet_core::fit::{fit_conic, fit_ellipse, EllipseParams, FitResult};
use droplet_core::geometry::Point;

use common::{elliptical_cap, reference_drop};

#[test]
fn test_elliptical_cap_angles() {
    // Semi-axes 60 x 40 with the centre 20 px above the baseline. The exact
    // contact angle is acos(-0.0125 / |(0.0125, 0.014434)|) = 130.89°.
    let cleaned = clean(&elliptical_cap(60.0, 40.0, 20.0, 401), &CleanConfig::default()).unwrap();
    let FitResult::Ellipse(fit) = fit_ellipse(&cleaned).unwrap() else {
        panic!("expected an ellipse fit");
    };

    assert_abs_diff_eq!(fit.angles.left, 130.89, epsilon = 0.05);
    assert_abs_diff_eq!(fit.angles.right, 130.89, epsilon = 0.05);
    assert_abs_diff_eq!(fit.params.semi_major, 60.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.params.semi_minor, 40.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.params.rotation.sin(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.baseline_width, 2.0 * 60.0 * 0.75_f64.sqrt(), epsilon = 1e-4);
    assert!(fit.metrics.rmse < 1e-3);
}

#[test]
fn test_circle_through_ellipse_fit() {
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();
    let angles = fit_ellipse(&cleaned).unwrap().angles();
    assert_abs_diff_eq!(angles.left, 120.0, epsilon = 0.1);
    assert_abs_diff_eq!(angles.right, 120.0, epsilon = 0.1);
}

#[test]
fn test_rotated_ellipse_recovered() {
    let truth = EllipseParams {
        center: Point::new(10.0, -5.0),
        semi_major: 30.0,
        semi_minor: 20.0,
        rotation: 0.3,
    };
    let conic = fit_conic(&truth.sample(180)).unwrap();
    assert!(conic.is_ellipse());
    let params = conic.to_ellipse().unwrap();

    assert_abs_diff_eq!(params.center.x, 10.0, epsilon = 1e-6);
    assert_abs_diff_eq!(params.center.y, -5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(params.semi_major, 30.0, epsilon = 1e-6);
    assert_abs_diff_eq!(params.semi_minor, 20.0, epsilon = 1e-6);
    assert_abs_diff_eq!(params.rotation, 0.3, epsilon = 1e-6);
}

#[test]
fn test_points_lie_on_fitted_conic() {
    let points = elliptical_cap(60.0, 40.0, 20.0, 101);
    let conic = fit_conic(&points).unwrap();
    let scale = conic.norm();
    for p in points {
        assert!(conic.eval(p).abs() / scale < 1e-8);
    }
}

#[test]
fn test_too_few_points() {
    let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)];
    assert!(fit_conic(&points).is_err());
}
