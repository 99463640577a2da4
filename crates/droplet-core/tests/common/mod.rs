#![allow(dead_code)]

use droplet_core::geometry::{Point, Side};
use droplet_core::tensiometry::{DropOrientation, DropParameters, ImageMapping};
use droplet_core::young_laplace::ProfileTable;
use droplet_core::ode::Integrator;

/// `n` points on an ellipse with axes along x and y, for parameter angles
/// `start_deg..=end_deg` (image coordinates, y down).
pub fn ellipse_arc(
    center: Point,
    semi_x: f64,
    semi_y: f64,
    start_deg: f64,
    end_deg: f64,
    n: usize,
) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let t = (start_deg + (end_deg - start_deg) * i as f64 / (n - 1) as f64).to_radians();
            Point::new(center.x + semi_x * t.cos(), center.y + semi_y * t.sin())
        })
        .collect()
}

/// Visible outline of a sessile drop shaped like an elliptical cap standing
/// on the baseline `y = 0`, with its centre `center_height` above it.
///
/// Only the part above the baseline is returned, from the left contact over
/// the apex to the right contact.
pub fn elliptical_cap(semi_x: f64, semi_y: f64, center_height: f64, n: usize) -> Vec<Point> {
    let half_span = (center_height / semi_y).asin().to_degrees();
    ellipse_arc(
        Point::new(0.0, -center_height),
        semi_x,
        semi_y,
        180.0 - half_span,
        360.0 + half_span,
        n,
    )
}

/// Circular cap of radius `radius` whose centre sits `center_height` above
/// the baseline. The contact angle is `acos(-center_height / radius)`.
pub fn circular_cap(radius: f64, center_height: f64, n: usize) -> Vec<Point> {
    elliptical_cap(radius, radius, center_height, n)
}

/// The reference drop: radius 50, centre 25 px above the baseline, so the
/// contact angle is 120° and the contacts sit at x = ±43.3.
pub fn reference_drop() -> Vec<Point> {
    circular_cap(50.0, 25.0, 301)
}

/// Integer-spaced points on the baseline `y = 0` for `x` in `x_min..=x_max`,
/// skipping `|x| < gap`.
pub fn baseline(x_min: i32, x_max: i32, gap: f64) -> Vec<Point> {
    (x_min..=x_max)
        .map(f64::from)
        .filter(|x| x.abs() >= gap)
        .map(|x| Point::new(x, 0.0))
        .collect()
}

/// The reference drop as a camera sees it: `n` points on the full radius-50
/// circle (drop plus its reflection below the substrate) and the baseline
/// `y = 0` running across the whole frame.
pub fn reference_scene(n: usize) -> Vec<Point> {
    let end_deg = 360.0 * (n - 1) as f64 / n as f64;
    let mut scene = ellipse_arc(Point::new(0.0, -25.0), 50.0, 50.0, 0.0, end_deg, n);
    scene.extend(baseline(-100, 100, 0.0));
    scene
}

/// `n` evenly spaced points from `start` along the unit direction at `angle_deg`.
pub fn line_points(start: Point, angle_deg: f64, length: f64, n: usize) -> Vec<Point> {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    (0..n)
        .map(|i| {
            let t = length * i as f64 / (n - 1) as f64;
            Point::new(start.x + t * cos_a, start.y + t * sin_a)
        })
        .collect()
}

/// Outline of a Young–Laplace drop for `params`, sampled from the tip of one
/// side through the apex to the tip of the other at arc lengths up to `s_end`.
pub fn young_laplace_outline(
    params: DropParameters,
    orientation: DropOrientation,
    s_end: f64,
    per_side: usize,
) -> Vec<Point> {
    let table = ProfileTable::build(
        params.bond_number,
        orientation,
        s_end * 1.1,
        Integrator::DormandPrince,
    )
    .unwrap();
    let mapping = ImageMapping::new(params, orientation);
    let at = |i: usize, side: Side| {
        let s = s_end * i as f64 / per_side as f64;
        let st = table.state_at(s);
        mapping.to_image(st[0], st[1], side)
    };
    let mut outline: Vec<Point> = (1..=per_side).rev().map(|i| at(i, Side::Left)).collect();
    outline.push(at(0, Side::Right));
    outline.extend((1..=per_side).map(|i| at(i, Side::Right)));
    outline
}

/// Largest distance between consecutive points.
pub fn max_gap(path: &[Point]) -> f64 {
    path.windows(2)
        .map(|w| w[0].distance(w[1]))
        .fold(0.0, f64::max)
}
