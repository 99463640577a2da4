mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use droplet_core::tensiometry::{
    analyze_drop, fit_drop_profile, mm_per_pixel, prepare_pendant_profile, DropOrientation,
    DropParameters, PhysicalParameters, TensiometryConfig,
};
use droplet_core::ode::Integrator;
use droplet_core::young_laplace::ProfileTable;

fn pendant(bond_number: f64, rotation: f64) -> DropParameters {
    DropParameters {
        apex_x: 300.0,
        apex_y: 400.0,
        apex_radius: 100.0,
        bond_number,
        rotation,
    }
}

#[test]
fn test_pendant_outline_preparation() {
    let truth = pendant(0.3, 0.0);
    let outline = common::young_laplace_outline(truth, DropOrientation::Pendant, 2.9, 300);
    let config = TensiometryConfig::default();
    let prepared =
        prepare_pendant_profile(&outline, DropOrientation::Pendant, &config.clean).unwrap();

    assert_eq!(prepared.points.len(), outline.len());
    assert_abs_diff_eq!(prepared.apex.x, 300.0, epsilon = 1e-6);
    assert_abs_diff_eq!(prepared.apex.y, 400.0, epsilon = 1e-9);
    // Ordered end to end: the first and last points are the two tips.
    assert!(prepared.points[0].x < 300.0);
    assert!(prepared.points.last().unwrap().x > 300.0);
    assert!(common::max_gap(&prepared.points) < 2.0);
}

#[test]
fn test_five_parameter_fit_recovers_truth() {
    let truth = pendant(0.3, 0.02);
    let outline = common::young_laplace_outline(truth, DropOrientation::Pendant, 2.9, 300);
    let start = DropParameters {
        apex_x: 302.0,
        apex_y: 397.0,
        apex_radius: 95.0,
        bond_number: 0.25,
        rotation: 0.0,
    };
    let fit = fit_drop_profile(&outline, start, 3.2, &TensiometryConfig::default()).unwrap();

    assert_abs_diff_eq!(fit.params.apex_x, truth.apex_x, epsilon = 1e-2);
    assert_abs_diff_eq!(fit.params.apex_y, truth.apex_y, epsilon = 1e-2);
    assert_relative_eq!(fit.params.apex_radius, truth.apex_radius, max_relative = 1e-4);
    assert_relative_eq!(fit.params.bond_number, truth.bond_number, max_relative = 1e-3);
    assert_abs_diff_eq!(fit.params.rotation, truth.rotation, epsilon = 1e-4);
    assert!(fit.rms_residual() < 1e-2, "rms {}", fit.rms_residual());
}

#[test]
fn test_fit_rejects_unphysical_start() {
    let outline =
        common::young_laplace_outline(pendant(0.3, 0.0), DropOrientation::Pendant, 2.9, 100);
    let config = TensiometryConfig::default();
    let mut start = pendant(0.3, 0.0);
    start.apex_radius = -1.0;
    assert!(fit_drop_profile(&outline, start, 3.2, &config).is_err());
    assert!(fit_drop_profile(&outline[..3], pendant(0.3, 0.0), 3.2, &config).is_err());
}

#[test]
fn test_analyze_drop_reports_tension() {
    for rotation in [0.0, 0.01] {
        let truth = pendant(0.2, rotation);
        let outline = common::young_laplace_outline(truth, DropOrientation::Pendant, 2.9, 300);
        let config = TensiometryConfig::default();
        // 127 px across a 1.27 mm needle: 0.01 mm per pixel, R₀ = 1 mm.
        let result = analyze_drop(&outline, 127.0, &config).unwrap();

        let physical = PhysicalParameters::default();
        let expected = physical.density_difference() * physical.gravity * 1e-6 / 0.2 * 1e3;
        assert_relative_eq!(result.quantities.tension, expected, max_relative = 1e-2);
        assert_relative_eq!(result.quantities.apex_radius_mm, 1.0, max_relative = 1e-3);
        assert_abs_diff_eq!(result.params.rotation, rotation, epsilon = 1e-3);

        let table = ProfileTable::build(0.2, DropOrientation::Pendant, 2.9, Integrator::DormandPrince)
            .unwrap();
        let (volume, area) = table.volume_and_area(2.9);
        assert_relative_eq!(result.quantities.volume, volume, max_relative = 2e-2);
        assert_relative_eq!(result.quantities.area, area, max_relative = 2e-2);
        assert!(result.quantities.worthington > 0.0);
    }
}

#[test]
fn test_tension_row_flattens_result() {
    let outline =
        common::young_laplace_outline(pendant(0.2, 0.0), DropOrientation::Pendant, 2.9, 300);
    let result = analyze_drop(&outline, 127.0, &TensiometryConfig::default()).unwrap();
    let row = result.to_row(2.5);
    assert_eq!(row.time, 2.5);
    assert_eq!(row.tension, result.quantities.tension);
    assert_eq!(row.apex_radius, result.params.apex_radius);
    assert_eq!(row.bond_number, result.params.bond_number);
}

#[test]
fn test_pixel_scale_requires_positive_widths() {
    let physical = PhysicalParameters::default();
    assert_relative_eq!(mm_per_pixel(&physical, 127.0).unwrap(), 0.01, max_relative = 1e-12);
    assert!(mm_per_pixel(&physical, 0.0).is_err());
    assert!(mm_per_pixel(&physical, -5.0).is_err());
    let no_needle = PhysicalParameters {
        needle_diameter_mm: 0.0,
        ..PhysicalParameters::default()
    };
    assert!(mm_per_pixel(&no_needle, 127.0).is_err());
}

#[test]
fn test_analyze_drop_rejects_bad_needle() {
    let outline =
        common::young_laplace_outline(pendant(0.2, 0.0), DropOrientation::Pendant, 2.9, 100);
    assert!(analyze_drop(&outline, 0.0, &TensiometryConfig::default()).is_err());
}
