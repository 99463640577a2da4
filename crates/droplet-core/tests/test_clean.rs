mod common;

use approx::assert_abs_diff_eq;
use droplet_core::clean::{clean, CleanConfig};
use droplet_core::error::{DropletError, Warning};
use droplet_core::geometry::{Point, Side};

use common::{baseline, circular_cap, max_gap, reference_drop, reference_scene};

#[test]
fn test_cleaned_profile_is_gap_free() {
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();
    let gap = max_gap(&cleaned.profile);
    assert!(
        gap < CleanConfig::default().jump_threshold,
        "largest gap {gap} exceeds the jump threshold"
    );
}

#[test]
fn test_contact_points_and_apex_of_reference_drop() {
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();

    assert_abs_diff_eq!(cleaned.apex().x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cleaned.apex().y, -75.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cleaned.contact_points.left.x, -43.3013, epsilon = 1e-3);
    assert_abs_diff_eq!(cleaned.contact_points.right.x, 43.3013, epsilon = 1e-3);
    assert_abs_diff_eq!(cleaned.contact_points.left.y, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cleaned.height(), 75.0, epsilon = 1e-9);
}

#[test]
fn test_profile_runs_left_contact_to_right_contact() {
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();
    let first = cleaned.profile.first().copied().unwrap();
    let last = cleaned.profile.last().copied().unwrap();
    assert_eq!(first, cleaned.contact_points.left);
    assert_eq!(last, cleaned.contact_points.right);
    assert_eq!(
        cleaned.profile.len(),
        cleaned.left.len() + cleaned.right.len()
    );
}

#[test]
fn test_half_profiles_start_at_apex() {
    let cleaned = clean(&reference_drop(), &CleanConfig::default()).unwrap();
    for half in [&cleaned.left, &cleaned.right] {
        let start = half.points[0];
        assert!(start.norm() < 1.0, "half starts at {start:?}, not near the apex");
        assert!(half.points.iter().all(|p| p.x >= -1e-9));
        assert!(half.points.iter().all(|p| p.y <= 1e-9));
    }
}

#[test]
fn test_outliers_are_discarded() {
    let mut raw = reference_drop();
    raw.extend([
        Point::new(200.0, 200.0),
        Point::new(230.0, 180.0),
        Point::new(-250.0, 150.0),
    ]);

    let cleaned = clean(&raw, &CleanConfig::default()).unwrap();
    assert!(cleaned
        .profile
        .iter()
        .all(|p| p.x.abs() <= 50.0 + 1e-9 && p.y <= 1e-9));
    assert!(cleaned
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::PointsDiscarded { count: 3 })));
}

#[test]
fn test_input_order_does_not_matter() {
    let raw = reference_drop();
    let mut shuffled: Vec<Point> = raw.iter().step_by(2).copied().collect();
    shuffled.extend(raw.iter().skip(1).step_by(2).rev().copied());

    let a = clean(&raw, &CleanConfig::default()).unwrap();
    let b = clean(&shuffled, &CleanConfig::default()).unwrap();
    assert_eq!(a.contact_points, b.contact_points);
    assert_eq!(a.apex(), b.apex());
    assert_eq!(a.profile.len(), b.profile.len());
}

#[test]
fn test_cleaning_is_deterministic() {
    let raw = reference_drop();
    let a = clean(&raw, &CleanConfig::default()).unwrap();
    let b = clean(&raw, &CleanConfig::default()).unwrap();
    assert_eq!(a.profile, b.profile);
}

#[test]
fn test_three_points_is_degenerate() {
    let raw = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, -1.0),
        Point::new(2.0, 0.0),
    ];
    let err = clean(&raw, &CleanConfig::default()).unwrap_err();
    assert!(matches!(err, DropletError::DegenerateApex(_)), "got {err}");
}

#[test]
fn test_empty_contour() {
    let err = clean(&[], &CleanConfig::default()).unwrap_err();
    assert!(matches!(err, DropletError::EmptyContour));
}

#[test]
fn test_flat_contour_is_degenerate() {
    let raw: Vec<Point> = (0..20).map(|i| Point::new(i as f64, 10.0)).collect();
    let err = clean(&raw, &CleanConfig::default()).unwrap_err();
    assert!(matches!(err, DropletError::DegenerateApex(_)), "got {err}");
}

#[test]
fn test_short_contour_warns() {
    let raw = common::circular_cap(50.0, 25.0, 45);
    let cleaned = clean(&raw, &CleanConfig::default()).unwrap();
    assert!(cleaned
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::ShortContour { points: 45, .. })));
}

fn assert_cut_at_baseline(raw: &[Point]) {
    let cleaned = clean(raw, &CleanConfig::default()).unwrap();
    let contacts = cleaned.contact_points;
    assert_abs_diff_eq!(contacts.left.x, -43.3013, epsilon = 0.1);
    assert_abs_diff_eq!(contacts.right.x, 43.3013, epsilon = 0.1);
    assert_abs_diff_eq!(contacts.left.y, 0.0, epsilon = 0.05);
    assert_abs_diff_eq!(contacts.right.y, 0.0, epsilon = 0.05);

    let n = cleaned.profile.len();
    for p in &cleaned.profile[1..n - 1] {
        assert!(p.y < -0.25, "baseline point {p:?} kept inside the profile");
        assert!(p.x.abs() <= 50.0 + 1e-9, "point {p:?} lies off the drop");
    }
    assert!(!cleaned
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::ContactAboveBand { .. })));
}

#[test]
fn test_baseline_through_the_drop_is_cut() {
    let mut raw = reference_drop();
    raw.extend(baseline(-43, 43, 0.0));
    assert_cut_at_baseline(&raw);
}

#[test]
fn test_baseline_outside_the_drop_is_cut() {
    let mut raw = reference_drop();
    raw.extend(baseline(-100, 100, 43.31));
    assert_cut_at_baseline(&raw);
}

#[test]
fn test_reflection_and_baseline_are_cut() {
    assert_cut_at_baseline(&reference_scene(200));
    assert_cut_at_baseline(&reference_scene(301));
}

#[test]
fn test_wetting_contact_above_band_warns() {
    let cleaned = clean(&circular_cap(50.0, -25.0, 301), &CleanConfig::default()).unwrap();
    for side in [Side::Left, Side::Right] {
        assert!(
            cleaned.warnings.iter().any(|w| matches!(
                w,
                Warning::ContactAboveBand { side: s, height } if *s == side && *height > 1.0
            )),
            "no {side} contact warning in {:?}",
            cleaned.warnings
        );
    }
}
