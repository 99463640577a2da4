//! Circular contact-angle fit.
//!
//! A Kåsa algebraic fit seeds a Gauss–Newton refinement of the geometric
//! residual `|p − c| − mean_r`. The contact angle is the angle between the
//! baseline and the circle tangent where the circle crosses the baseline.

use std::time::Instant;

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};
use tracing::debug;

use crate::clean::CleanedProfile;
use crate::consts::{CIRCLE_REFINE_ITERATIONS, CIRCLE_REFINE_TOLERANCE, CURVE_RESAMPLE_POINTS};
use crate::error::{DropletError, FitMode, Result};
use crate::geometry::{Baseline, ErrorMetrics, Point, Side};

use super::config::CircleFitConfig;
use super::result::{CircleFit, CircleParams, ContactAngles, FitResult, Timing};

/// Fit a circle to the cleaned profile and measure both contact angles.
pub fn fit_circle(profile: &CleanedProfile, config: &CircleFitConfig) -> Result<FitResult> {
    let t0 = Instant::now();
    let baseline = profile
        .baseline()
        .ok_or_else(|| DropletError::InvalidInput("contact points coincide".into()))?;

    let params = fit_circle_params(&profile.profile)?;

    let intersect_params = if config.round_to_pixel {
        CircleParams {
            center: Point::new(params.center.x.round(), params.center.y.round()),
            radius: params.radius.round(),
        }
    } else {
        params
    };
    let (t_left, t_right) = intersect_line(&baseline, &intersect_params)
        .ok_or(DropletError::NonIntersectingGeometry {
            mode: FitMode::Circle,
        })?;

    let angle_at = |side: Side, t: f64| -> Result<f64> {
        let radial = baseline.at(t) - intersect_params.center;
        baseline
            .contact_angle(side, radial.perp())
            .ok_or(DropletError::NonIntersectingGeometry {
                mode: FitMode::Circle,
            })
    };
    let angles = ContactAngles {
        left: angle_at(Side::Left, t_left)?,
        right: angle_at(Side::Right, t_right)?,
    };

    let metrics = ErrorMetrics::against_curve(&profile.profile, &sample_circle(&params, CURVE_RESAMPLE_POINTS));

    debug!(
        cx = params.center.x,
        cy = params.center.y,
        r = params.radius,
        left = angles.left,
        right = angles.right,
        "Circle fit"
    );

    Ok(FitResult::Circle(CircleFit {
        angles,
        params,
        baseline_width: t_right - t_left,
        metrics,
        timing: Timing::fitting_since(t0),
    }))
}

/// Least-squares circle through `points` (geometric residual).
pub fn fit_circle_params(points: &[Point]) -> Result<CircleParams> {
    let initial = kasa_fit(points)?;
    refine_geometric(points, initial.center)
}

/// Algebraic (Kåsa) circle fit: `x² + y² + Dx + Ey + F = 0`.
///
/// Points are centered on their centroid before solving the 3x3 normal
/// equations.
pub fn kasa_fit(points: &[Point]) -> Result<CircleParams> {
    if points.len() < 3 {
        return Err(DropletError::InvalidInput(format!(
            "circle fit needs at least 3 points, got {}",
            points.len()
        )));
    }
    let n = points.len() as f64;
    let mean = points.iter().fold(Point::default(), |acc, &p| acc + p) * (1.0 / n);

    let mut ata = Matrix3::<f64>::zeros();
    let mut atb = Vector3::<f64>::zeros();
    for &p in points {
        let d = p - mean;
        let row = Vector3::new(d.x, d.y, 1.0);
        ata += row * row.transpose();
        atb += row * -(d.x * d.x + d.y * d.y);
    }

    let sol = ata.lu().solve(&atb).ok_or(DropletError::SingularJacobian {
        mode: FitMode::Circle,
        iteration: 0,
    })?;
    let cx = -0.5 * sol[0];
    let cy = -0.5 * sol[1];
    let r_sq = cx * cx + cy * cy - sol[2];
    if !r_sq.is_finite() || r_sq <= 0.0 {
        return Err(DropletError::SingularJacobian {
            mode: FitMode::Circle,
            iteration: 0,
        });
    }
    Ok(CircleParams {
        center: Point::new(cx + mean.x, cy + mean.y),
        radius: r_sq.sqrt(),
    })
}

/// Gauss–Newton on `r_i(c) = |p_i − c| − mean_j |p_j − c|`.
fn refine_geometric(points: &[Point], initial: Point) -> Result<CircleParams> {
    let mut center = initial;
    let n = points.len() as f64;

    for iteration in 0..CIRCLE_REFINE_ITERATIONS {
        let dists: Vec<f64> = points.iter().map(|&p| p.distance(center)).collect();
        let mean_r = dists.iter().sum::<f64>() / n;

        // d|p - c|/dc = -(p - c)/|p - c|
        let grads: Vec<Vector2<f64>> = points
            .iter()
            .zip(&dists)
            .map(|(&p, &d)| {
                if d > 0.0 {
                    Vector2::new(-(p.x - center.x) / d, -(p.y - center.y) / d)
                } else {
                    Vector2::zeros()
                }
            })
            .collect();
        let mean_grad = grads.iter().fold(Vector2::zeros(), |acc, g| acc + g) / n;

        let mut jtj = Matrix2::<f64>::zeros();
        let mut jtr = Vector2::<f64>::zeros();
        for (g, &d) in grads.iter().zip(&dists) {
            let j = g - mean_grad;
            let r = d - mean_r;
            jtj += j * j.transpose();
            jtr += j * r;
        }

        let step = jtj
            .lu()
            .solve(&(-jtr))
            .ok_or(DropletError::SingularJacobian {
                mode: FitMode::Circle,
                iteration,
            })?;
        center = Point::new(center.x + step[0], center.y + step[1]);
        if step.norm() < CIRCLE_REFINE_TOLERANCE {
            break;
        }
    }

    let radius = points.iter().map(|&p| p.distance(center)).sum::<f64>() / n;
    Ok(CircleParams { center, radius })
}

/// Parameters `t_left < t_right` where the baseline line meets the circle.
fn intersect_line(baseline: &Baseline, circle: &CircleParams) -> Option<(f64, f64)> {
    let offset = baseline.left - circle.center;
    let half_b = baseline.direction.dot(offset);
    let c = offset.dot(offset) - circle.radius * circle.radius;
    let disc = half_b * half_b - c;
    if disc < 0.0 || !disc.is_finite() {
        return None;
    }
    let root = disc.sqrt();
    Some((-half_b - root, -half_b + root))
}

/// `n` points around the circle, closed.
pub fn sample_circle(circle: &CircleParams, n: usize) -> Vec<Point> {
    (0..=n)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / n as f64;
            circle.center + Point::new(t.cos(), t.sin()) * circle.radius
        })
        .collect()
}
