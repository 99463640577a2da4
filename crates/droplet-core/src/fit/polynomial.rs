//! Polynomial and tangent fits near the contact points.
//!
//! Each side is fitted in the baseline frame as `u = p(v)`: the along-baseline
//! offset as a polynomial in height. Writing the curve this way keeps it a
//! function even when the drop overhangs its contact point.

use std::time::Instant;

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::clean::CleanedProfile;
use crate::consts::{EPSILON, POLYNOMIAL_RESAMPLE_POINTS};
use crate::error::{DropletError, FitMode, Result, Warning};
use crate::geometry::{Baseline, ErrorMetrics, Point, Side};

use super::config::PolynomialFitConfig;
use super::result::{ContactAngles, FitResult, PolynomialFit, PolynomialParams, Timing};

/// Fit a polynomial of `degree` (1 = tangent, 2 = quadratic) to the points
/// next to each contact point and read the angle from its slope.
pub fn fit_polynomial(
    profile: &CleanedProfile,
    degree: usize,
    config: &PolynomialFitConfig,
) -> Result<FitResult> {
    let t0 = Instant::now();
    let baseline = profile
        .baseline()
        .ok_or_else(|| DropletError::InvalidInput("contact points coincide".into()))?;

    let n = profile.profile.len();
    let requested = config.points.max(degree + 1);
    let take = requested.min(n);
    if take < requested {
        let warning = Warning::FewFitPoints {
            requested,
            available: take,
        };
        warn!(%warning, "Polynomial fit");
    }
    if take < degree + 1 {
        return Err(DropletError::InvalidInput(format!(
            "degree-{degree} fit needs {} points, profile has {n}",
            degree + 1
        )));
    }

    let left_pts: Vec<Point> = profile.profile[..take].to_vec();
    let right_pts: Vec<Point> = profile.profile[n - take..].iter().rev().copied().collect();

    let (left_coeffs, left_angle, left_curve) = fit_side(&baseline, &left_pts, degree, Side::Left)?;
    let (right_coeffs, right_angle, right_curve) =
        fit_side(&baseline, &right_pts, degree, Side::Right)?;

    let mut distances = Vec::with_capacity(2 * take);
    for (pts, curve) in [(&left_pts, &left_curve), (&right_pts, &right_curve)] {
        distances.extend(
            pts.iter()
                .map(|&p| crate::geometry::distance_to_polyline(p, curve)),
        );
    }

    let angles = ContactAngles {
        left: left_angle,
        right: right_angle,
    };
    debug!(degree, points = take, left = angles.left, right = angles.right, "Polynomial fit");

    Ok(FitResult::PolynomialTangent(PolynomialFit {
        angles,
        params: PolynomialParams {
            degree,
            left: left_coeffs,
            right: right_coeffs,
        },
        metrics: ErrorMetrics::from_distances(&distances),
        timing: Timing::fitting_since(t0),
    }))
}

/// Fit one side; `points` start at the contact point.
fn fit_side(
    baseline: &Baseline,
    points: &[Point],
    degree: usize,
    side: Side,
) -> Result<(Vec<f64>, f64, Vec<Point>)> {
    let local: Vec<Point> = points.iter().map(|&p| baseline.to_frame(p)).collect();
    let vs: Vec<f64> = local.iter().map(|q| q.y).collect();
    let us: Vec<f64> = local.iter().map(|q| q.x).collect();
    let coeffs = polyfit(&vs, &us, degree)?;

    let v_contact = local[0].y;
    let slope = polyval_derivative(&coeffs, v_contact);
    let lean = slope.atan().to_degrees();
    let angle = match side {
        Side::Left => 90.0 - lean,
        Side::Right => 90.0 + lean,
    };

    let (v_lo, v_hi) = vs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let curve: Vec<Point> = (0..POLYNOMIAL_RESAMPLE_POINTS)
        .map(|i| {
            let v = v_lo + (v_hi - v_lo) * i as f64 / (POLYNOMIAL_RESAMPLE_POINTS - 1) as f64;
            baseline.from_frame(Point::new(polyval(&coeffs, v), v))
        })
        .collect();

    Ok((coeffs, angle, curve))
}

/// Least-squares polynomial coefficients, ascending powers.
///
/// Abscissae are centred and scaled before the solve, then the coefficients
/// are expanded back to the raw variable.
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Vec<f64>> {
    let n = xs.len();
    let mean = xs.iter().sum::<f64>() / n as f64;
    let scale = xs
        .iter()
        .map(|x| (x - mean).abs())
        .fold(0.0_f64, f64::max)
        .max(EPSILON);

    let a = DMatrix::from_fn(n, degree + 1, |i, j| ((xs[i] - mean) / scale).powi(j as i32));
    let b = DVector::from_column_slice(ys);
    let scaled = a
        .svd(true, true)
        .solve(&b, EPSILON)
        .map_err(|_| DropletError::SingularJacobian {
            mode: FitMode::Polynomial,
            iteration: 0,
        })?;

    // p(x) = sum_j s_j ((x - m)/k)^j, expanded with binomial coefficients.
    let mut coeffs = vec![0.0; degree + 1];
    for (j, &s) in scaled.iter().enumerate() {
        let factor = s / scale.powi(j as i32);
        for (k, c) in coeffs.iter_mut().enumerate().take(j + 1) {
            *c += factor * binomial(j, k) as f64 * (-mean).powi((j - k) as i32);
        }
    }
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(DropletError::SingularJacobian {
            mode: FitMode::Polynomial,
            iteration: 0,
        });
    }
    Ok(coeffs)
}

pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

pub fn polyval_derivative(coeffs: &[f64], x: f64) -> f64 {
    coeffs
        .iter()
        .enumerate()
        .skip(1)
        .rev()
        .fold(0.0, |acc, (k, &c)| acc * x + k as f64 * c)
}

fn binomial(n: usize, k: usize) -> u64 {
    (0..k).fold(1u64, |acc, i| acc * (n - i) as u64 / (i + 1) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyfit_recovers_quadratic() {
        let xs: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 - 0.5 * x + 0.25 * x * x).collect();
        let c = polyfit(&xs, &ys, 2).unwrap();
        assert!((c[0] - 2.0).abs() < 1e-6);
        assert!((c[1] + 0.5).abs() < 1e-8);
        assert!((c[2] - 0.25).abs() < 1e-10);
    }

    #[test]
    fn derivative_of_cubic() {
        let c = [1.0, 2.0, 3.0, 4.0];
        // 2 + 6x + 12x^2 at x = 2
        assert!((polyval_derivative(&c, 2.0) - 62.0).abs() < 1e-12);
        assert!((polyval(&c, 2.0) - 49.0).abs() < 1e-12);
    }
}
