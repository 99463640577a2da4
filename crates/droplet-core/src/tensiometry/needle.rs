//! Needle width from its two silhouette edges.
//!
//! Both edges are modelled as parallel lines `(x − Xᵢ) sin θ − y cos θ = 0`
//! sharing one direction θ. A Gauss–Newton solve on the stacked residuals
//! of both edges gives `(X0, X1, θ)`; the diameter is the perpendicular
//! distance `|X1 − X0| sin θ`.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DropletError, FitMode, Result};
use crate::fit::FitStatus;
use crate::geometry::Point;

use super::config::Tolerances;

/// Smallest |sin θ| accepted; flatter needles make `Xᵢ` ill-defined.
const MIN_SIN_THETA: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeedleFit {
    /// Needle diameter in pixels.
    pub diameter: f64,
    /// Edge intercepts on the centred x axis.
    pub x0: f64,
    pub x1: f64,
    /// Edge direction in radians from +x.
    pub theta: f64,
    /// Centre of the first edge, subtracted before fitting.
    pub origin: Point,
    pub status: FitStatus,
}

pub fn fit_needle_width(
    edge0: &[Point],
    edge1: &[Point],
    tolerances: &Tolerances,
) -> Result<NeedleFit> {
    if edge0.len() < 2 || edge1.is_empty() {
        return Err(DropletError::InvalidInput(format!(
            "needle fit needs two points on the first edge and one on the second, got {} and {}",
            edge0.len(),
            edge1.len()
        )));
    }

    let n0 = edge0.len() as f64;
    let origin = edge0.iter().fold(Point::default(), |acc, &p| acc + p) * (1.0 / n0);
    let side0: Vec<Point> = edge0.iter().map(|&p| p - origin).collect();
    let side1: Vec<Point> = edge1.iter().map(|&p| p - origin).collect();

    let mut theta = principal_direction(&side0);
    if theta.sin().abs() < MIN_SIN_THETA {
        return Err(DropletError::InvalidInput(format!(
            "needle edges run at {:.1}°, too close to horizontal",
            theta.to_degrees()
        )));
    }
    let intercept = |pts: &[Point], theta: f64| {
        let cot = theta.cos() / theta.sin();
        pts.iter().map(|p| p.x - p.y * cot).sum::<f64>() / pts.len() as f64
    };
    let mut x0 = intercept(&side0, theta);
    let mut x1 = intercept(&side1, theta);

    let mut status = FitStatus::MaxIterationsExceeded {
        iterations: tolerances.needle_steps,
    };
    for iteration in 1..=tolerances.needle_steps {
        let (sin_t, cos_t) = theta.sin_cos();
        let mut jtj = Matrix3::<f64>::zeros();
        let mut jtr = Vector3::<f64>::zeros();
        for (points, which) in [(&side0, 0), (&side1, 1)] {
            let xi = if which == 0 { x0 } else { x1 };
            for p in points.iter() {
                let r = (p.x - xi) * sin_t - p.y * cos_t;
                let mut j = Vector3::zeros();
                j[which] = -sin_t;
                j[2] = (p.x - xi) * cos_t + p.y * sin_t;
                jtj += j * j.transpose();
                jtr += j * r;
            }
        }
        let step = jtj
            .lu()
            .solve(&(-jtr))
            .ok_or(DropletError::SingularJacobian {
                mode: FitMode::Needle,
                iteration,
            })?;

        x0 += step[0];
        x1 += step[1];
        theta += step[2];

        // X0 sits near zero after centring and is left out of the test.
        let relative = |d: f64, v: f64| d.abs() / v.abs().max(f64::MIN_POSITIVE);
        let change = relative(step[1], x1).max(relative(step[2], theta));
        debug!(iteration, x0, x1, theta, change, "Needle Gauss-Newton step");
        if change < tolerances.needle_tol {
            status = FitStatus::Converged { iterations: iteration };
            break;
        }
    }
    if !status.is_converged() {
        warn!(steps = tolerances.needle_steps, "Needle fit did not converge");
    }

    Ok(NeedleFit {
        diameter: (x1 - x0).abs() * theta.sin().abs(),
        x0,
        x1,
        theta,
        origin,
        status,
    })
}

/// Direction of largest spread, in (0, π).
fn principal_direction(points: &[Point]) -> f64 {
    let n = points.len() as f64;
    let mean = points.iter().fold(Point::default(), |acc, &p| acc + p) * (1.0 / n);
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &p in points {
        let d = p - mean;
        sxx += d.x * d.x;
        syy += d.y * d.y;
        sxy += d.x * d.y;
    }
    let angle = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    if angle <= 0.0 {
        angle + std::f64::consts::PI
    } else {
        angle
    }
}
