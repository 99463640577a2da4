mod common;

use approx::assert_abs_diff_eq;
use droplet_core::clean::{clean, CleanConfig};
use droplet_core::fit::{fit_polynomial, FitResult, PolynomialFitConfig};

use common::reference_drop;

#[test]
fn test_quadratic_fit_on_reference_drop() {
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();
    let result = fit_polynomial(&cleaned, 2, &PolynomialFitConfig::default()).unwrap();

    let angles = result.angles();
    assert_abs_diff_eq!(angles.left, 120.0, epsilon = 1.5);
    assert_abs_diff_eq!(angles.right, 120.0, epsilon = 1.5);
    assert_eq!(result.method_name(), "polynomial fit");
    let FitResult::PolynomialTangent(fit) = result else {
        panic!("expected a polynomial fit");
    };
    assert_eq!(fit.params.degree, 2);
    assert_eq!(fit.params.left.len(), 3);
    assert!(fit.metrics.max < 0.1, "max deviation {}", fit.metrics.max);
}

#[test]
fn test_tangent_fit_leans_toward_vertical() {
    // A straight line through a curved arc averages the slope above the
    // contact, which is closer to vertical for a hydrophobic drop.
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();
    let result = fit_polynomial(&cleaned, 1, &PolynomialFitConfig::default()).unwrap();

    let angles = result.angles();
    assert_eq!(result.method_name(), "tangent fit");
    for angle in [angles.left, angles.right] {
        assert!(angle < 120.0 && angle > 108.0, "tangent angle {angle}");
    }
}

#[test]
fn test_sides_are_symmetric() {
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();
    let angles = fit_polynomial(&cleaned, 2, &PolynomialFitConfig::default())
        .unwrap()
        .angles();
    assert_abs_diff_eq!(angles.left, angles.right, epsilon = 1e-6);
}

#[test]
fn test_more_points_than_profile_still_fits() {
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();
    let config = PolynomialFitConfig { points: 10_000 };
    assert!(fit_polynomial(&cleaned, 2, &config).is_ok());
}
