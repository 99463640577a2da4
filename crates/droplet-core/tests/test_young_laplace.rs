mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use droplet_core::clean::{clean, CleanConfig};
use droplet_core::consts::PIXEL_BOND_SCALE;
use droplet_core::error::{DropletError, FitMode};
use droplet_core::fit::{fit_bashforth_adams, BashforthAdamsConfig, BashforthAdamsParams, FitResult};
use droplet_core::geometry::Point;
use droplet_core::ode::{Integrator, OdeOptions, Termination};
use droplet_core::young_laplace::{
    generate_pixel_profile, generate_pixel_profile_with, pixel_bond_number, DropOrientation,
    ProfileTable,
};

const TRUTH: BashforthAdamsParams = BashforthAdamsParams { a: 100.0, b: 50.0 };
const HEIGHT: f64 = 70.0;

/// Image outline for the model: baseline at y = 0, apex above it.
fn synthetic_drop() -> Vec<Point> {
    let model = generate_pixel_profile(TRUTH, HEIGHT, Integrator::DormandPrince).unwrap();
    model
        .points
        .iter()
        .map(|p| Point::new(p.x, p.y - HEIGHT))
        .collect()
}

#[test]
fn test_pixel_profile_is_symmetric() {
    let model = generate_pixel_profile(TRUTH, HEIGHT, Integrator::DormandPrince).unwrap();
    let (left, right) = model.end_angles();
    assert_abs_diff_eq!(left, right, epsilon = 1e-6);
    assert!(left > 90.0 && left < 180.0, "contact angle {left}");
    assert_abs_diff_eq!(model.left()[0].y, HEIGHT, epsilon = 1e-6);
    assert_abs_diff_eq!(model.right().last().unwrap().y, HEIGHT, epsilon = 1e-6);
    assert!(model.width() > 0.0);
}

#[test]
fn test_pixel_profile_volume_matches_quadrature() {
    let model = generate_pixel_profile(TRUTH, HEIGHT, Integrator::DormandPrince).unwrap();
    let right = model.right();
    let quadrature: f64 = right
        .windows(2)
        .map(|w| {
            let dz = w[1].y - w[0].y;
            std::f64::consts::PI * 0.5 * (w[0].x * w[0].x + w[1].x * w[1].x) * dz
        })
        .sum();
    assert_relative_eq!(model.volume(), quadrature, max_relative = 1e-2);
}

#[test]
fn test_rosenbrock_agrees_with_dormand_prince() {
    let dp = generate_pixel_profile(TRUTH, HEIGHT, Integrator::DormandPrince).unwrap();
    let ros = generate_pixel_profile(TRUTH, HEIGHT, Integrator::Rosenbrock).unwrap();
    assert_abs_diff_eq!(dp.end_angles().0, ros.end_angles().0, epsilon = 0.05);
    assert_relative_eq!(dp.width(), ros.width(), max_relative = 1e-3);
}

#[test]
fn test_invalid_pixel_parameters() {
    let bad = BashforthAdamsParams { a: -1.0, b: 50.0 };
    assert!(generate_pixel_profile(bad, HEIGHT, Integrator::DormandPrince).is_err());
    assert!(generate_pixel_profile(TRUTH, 0.0, Integrator::DormandPrince).is_err());
}

#[test]
fn test_stalled_pixel_integration_is_an_error() {
    let options = OdeOptions {
        max_steps: 5,
        max_step: 0.01,
        ..OdeOptions::default()
    };
    let err = generate_pixel_profile_with(TRUTH, HEIGHT, &options).unwrap_err();
    assert!(
        matches!(
            err,
            DropletError::IntegrationFailed {
                mode: FitMode::BashforthAdams,
                termination: Termination::StepLimit,
            }
        ),
        "got {err}"
    );
}

#[test]
fn test_bashforth_adams_round_trip() {
    let model = generate_pixel_profile(TRUTH, HEIGHT, Integrator::DormandPrince).unwrap();
    let cleaned = clean(&synthetic_drop(), &CleanConfig::default()).unwrap();
    let FitResult::YoungLaplace(fit) =
        fit_bashforth_adams(&cleaned, &BashforthAdamsConfig::default()).unwrap()
    else {
        panic!("expected a Young-Laplace fit");
    };

    assert_relative_eq!(fit.params.b, TRUTH.b, max_relative = 1e-6);
    assert_relative_eq!(fit.params.a, TRUTH.a, max_relative = 1e-6);
    assert_abs_diff_eq!(fit.height, HEIGHT, epsilon = 1e-4);
    let (expected, _) = model.end_angles();
    assert_abs_diff_eq!(fit.angles.left, expected, epsilon = 1e-2);
    assert_abs_diff_eq!(fit.angles.right, expected, epsilon = 1e-2);
    assert!(fit.metrics.rmse < 1e-3, "rmse {}", fit.metrics.rmse);
}

#[test]
fn test_pixel_and_physical_bond_numbers_differ() {
    // The pixel fit reports 18·b²/a²; the physical model's Bond number for
    // the same shape is b²/a². The two scales are kept as they are.
    let pixel = pixel_bond_number(&TRUTH);
    let physical = (TRUTH.b / TRUTH.a).powi(2);
    assert_relative_eq!(pixel, PIXEL_BOND_SCALE * physical, max_relative = 1e-12);
    assert!(pixel != physical);
}

#[test]
fn test_profile_table_starts_as_sphere() {
    let table =
        ProfileTable::build(0.0, DropOrientation::Pendant, 1.0, Integrator::DormandPrince).unwrap();
    for s in [0.1, 0.5, 1.0] {
        let state = table.state_at(s);
        assert_abs_diff_eq!(state[0], s.sin(), epsilon = 1e-7);
        assert_abs_diff_eq!(state[1], 1.0 - s.cos(), epsilon = 1e-7);
        assert_abs_diff_eq!(state[2], s, epsilon = 1e-7);
    }
}

#[test]
fn test_sphere_volume_and_area() {
    let table = ProfileTable::build_with_points(
        0.0,
        DropOrientation::Pendant,
        std::f64::consts::FRAC_PI_2,
        Integrator::DormandPrince,
        2000,
    )
    .unwrap();
    let (volume, area) = table.volume_and_area(std::f64::consts::FRAC_PI_2);
    // Hemisphere of unit radius.
    assert_relative_eq!(volume, 2.0 * std::f64::consts::PI / 3.0, max_relative = 1e-4);
    assert_relative_eq!(area, 2.0 * std::f64::consts::PI, max_relative = 1e-4);
}

#[test]
fn test_bond_sensitivity_matches_finite_difference() {
    let bo = 0.3;
    let h = 1e-6;
    let build = |b: f64| {
        ProfileTable::build(b, DropOrientation::Pendant, 2.5, Integrator::DormandPrince).unwrap()
    };
    let (base, plus, minus) = (build(bo), build(bo + h), build(bo - h));
    let s = 2.0;
    let analytic = base.state_at(s);
    let (p, m) = (plus.state_at(s), minus.state_at(s));
    for k in 0..3 {
        let numeric = (p[k] - m[k]) / (2.0 * h);
        assert_abs_diff_eq!(analytic[k + 3], numeric, epsilon = 1e-4);
    }
}
