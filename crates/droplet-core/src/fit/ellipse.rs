//! Ellipse contact-angle fit.
//!
//! Direct least-squares conic fit constrained to `4AC − B² = 1` (Fitzgibbon),
//! solved through the reduced 3×3 system of Halíř and Flusser on
//! centroid-normalized points.

use std::time::Instant;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clean::CleanedProfile;
use crate::consts::{CURVE_RESAMPLE_POINTS, EPSILON, MIN_CONTOUR_POINTS};
use crate::error::{DropletError, FitMode, Result};
use crate::geometry::{Point, Side};

use super::result::{ContactAngles, EllipseFit, EllipseParams, FitResult, Timing};

/// General conic `A x² + B xy + C y² + D x + E y + F = 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Conic {
    pub fn eval(&self, p: Point) -> f64 {
        self.a * p.x * p.x
            + self.b * p.x * p.y
            + self.c * p.y * p.y
            + self.d * p.x
            + self.e * p.y
            + self.f
    }

    pub fn gradient(&self, p: Point) -> Point {
        Point::new(
            2.0 * self.a * p.x + self.b * p.y + self.d,
            self.b * p.x + 2.0 * self.c * p.y + self.e,
        )
    }

    pub fn is_ellipse(&self) -> bool {
        self.b * self.b - 4.0 * self.a * self.c < 0.0
    }

    fn scaled(&self, k: f64) -> Self {
        Self {
            a: self.a * k,
            b: self.b * k,
            c: self.c * k,
            d: self.d * k,
            e: self.e * k,
            f: self.f * k,
        }
    }

    pub fn norm(&self) -> f64 {
        [self.a, self.b, self.c, self.d, self.e, self.f]
            .iter()
            .map(|v| v * v)
            .sum::<f64>()
            .sqrt()
    }

    /// Center, semi-axes and rotation. `None` unless the conic is a real ellipse.
    pub fn to_ellipse(&self) -> Option<EllipseParams> {
        let oriented = if self.a + self.c < 0.0 {
            self.scaled(-1.0)
        } else {
            *self
        };
        let Conic { a, b, c, d, e, f: _ } = oriented;
        let denom = 4.0 * a * c - b * b;
        if denom <= 0.0 {
            return None;
        }
        let cx = (b * e - 2.0 * c * d) / denom;
        let cy = (b * d - 2.0 * a * e) / denom;
        let f0 = oriented.eval(Point::new(cx, cy));
        if f0.abs() < EPSILON * self.norm().max(1.0) {
            return None;
        }

        let mean = 0.5 * (a + c);
        let half_diff = 0.5 * ((a - c).powi(2) + b * b).sqrt();
        let (l1, l2) = (mean + half_diff, mean - half_diff);
        let major_sq = -f0 / l2;
        let minor_sq = -f0 / l1;
        if !(major_sq > 0.0 && minor_sq > 0.0) {
            return None;
        }

        // Major axis lies along the eigenvector of the smaller eigenvalue.
        let theta = 0.5 * b.atan2(a - c) + std::f64::consts::FRAC_PI_2;
        Some(EllipseParams {
            center: Point::new(cx, cy),
            semi_major: major_sq.sqrt(),
            semi_minor: minor_sq.sqrt(),
            rotation: wrap_half_turn(theta),
        })
    }
}

/// Map an axis angle into (−π/2, π/2].
fn wrap_half_turn(mut angle: f64) -> f64 {
    use std::f64::consts::PI;
    while angle > PI / 2.0 {
        angle -= PI;
    }
    while angle <= -PI / 2.0 {
        angle += PI;
    }
    angle
}

/// Fit an ellipse to the cleaned profile and measure both contact angles.
pub fn fit_ellipse(profile: &CleanedProfile) -> Result<FitResult> {
    let t0 = Instant::now();
    let baseline = profile
        .baseline()
        .ok_or_else(|| DropletError::InvalidInput("contact points coincide".into()))?;

    let conic = fit_conic(&profile.profile)?;
    let params = conic.to_ellipse().ok_or(DropletError::NonIntersectingGeometry {
        mode: FitMode::Ellipse,
    })?;

    // Restrict the conic to the baseline: Q(left + t·dir) = α t² + β t + γ.
    let conic = conic.scaled(1.0 / conic.norm());
    let q0 = conic.eval(baseline.at(0.0));
    let q_pos = conic.eval(baseline.at(1.0));
    let q_neg = conic.eval(baseline.at(-1.0));
    let alpha = 0.5 * (q_pos + q_neg) - q0;
    let beta = 0.5 * (q_pos - q_neg);
    let disc = beta * beta - 4.0 * alpha * q0;
    if disc < 0.0 || alpha.abs() < f64::MIN_POSITIVE {
        return Err(DropletError::NonIntersectingGeometry {
            mode: FitMode::Ellipse,
        });
    }
    let root = disc.sqrt();
    let (r1, r2) = ((-beta - root) / (2.0 * alpha), (-beta + root) / (2.0 * alpha));
    let (t_left, t_right) = (r1.min(r2), r1.max(r2));

    let angle_at = |side: Side, t: f64| -> Result<f64> {
        baseline
            .contact_angle(side, conic.gradient(baseline.at(t)).perp())
            .ok_or(DropletError::NonIntersectingGeometry {
                mode: FitMode::Ellipse,
            })
    };
    let angles = ContactAngles {
        left: angle_at(Side::Left, t_left)?,
        right: angle_at(Side::Right, t_right)?,
    };

    let metrics = crate::geometry::ErrorMetrics::against_curve(
        &profile.profile,
        &params.sample(CURVE_RESAMPLE_POINTS),
    );

    debug!(
        cx = params.center.x,
        cy = params.center.y,
        major = params.semi_major,
        minor = params.semi_minor,
        left = angles.left,
        right = angles.right,
        "Ellipse fit"
    );

    Ok(FitResult::Ellipse(EllipseFit {
        angles,
        params,
        baseline_width: t_right - t_left,
        metrics,
        timing: Timing::fitting_since(t0),
    }))
}

/// Direct least-squares ellipse-specific conic through `points`.
pub fn fit_conic(points: &[Point]) -> Result<Conic> {
    if points.len() < MIN_CONTOUR_POINTS {
        return Err(DropletError::InvalidInput(format!(
            "ellipse fit needs at least {MIN_CONTOUR_POINTS} points, got {}",
            points.len()
        )));
    }
    let n = points.len() as f64;
    let mean = points.iter().fold(Point::default(), |acc, &p| acc + p) * (1.0 / n);
    let spread = points.iter().map(|&p| p.distance(mean)).sum::<f64>() / n;
    let scale = if spread > EPSILON {
        std::f64::consts::SQRT_2 / spread
    } else {
        1.0
    };

    // Scatter blocks of the quadratic [x², xy, y²] and linear [x, y, 1] parts.
    let mut s1 = Matrix3::<f64>::zeros();
    let mut s2 = Matrix3::<f64>::zeros();
    let mut s3 = Matrix3::<f64>::zeros();
    for &p in points {
        let q = (p - mean) * scale;
        let quad = Vector3::new(q.x * q.x, q.x * q.y, q.y * q.y);
        let lin = Vector3::new(q.x, q.y, 1.0);
        s1 += quad * quad.transpose();
        s2 += quad * lin.transpose();
        s3 += lin * lin.transpose();
    }

    let s3_inv = s3.try_inverse().ok_or_else(singular)?;
    let t = -s3_inv * s2.transpose();
    let m = s1 + s2 * t;
    // C1⁻¹ M with C1 = [[0, 0, 2], [0, −1, 0], [2, 0, 0]].
    let reduced = Matrix3::new(
        0.5 * m[(2, 0)],
        0.5 * m[(2, 1)],
        0.5 * m[(2, 2)],
        -m[(1, 0)],
        -m[(1, 1)],
        -m[(1, 2)],
        0.5 * m[(0, 0)],
        0.5 * m[(0, 1)],
        0.5 * m[(0, 2)],
    );

    let quad = reduced
        .complex_eigenvalues()
        .iter()
        .filter(|ev| ev.im.abs() <= 1e-9 * (1.0 + ev.re.abs()))
        .filter_map(|ev| null_vector(&(reduced - Matrix3::identity() * ev.re)))
        .find(|v| 4.0 * v[0] * v[2] - v[1] * v[1] > 0.0)
        .ok_or_else(singular)?;
    let lin = t * quad;

    // Undo x' = s(x − mx), y' = s(y − my).
    let (mx, my, s) = (mean.x, mean.y, scale);
    let s_sq = s * s;
    let (a, b, c) = (quad[0], quad[1], quad[2]);
    let (d, e, f) = (lin[0], lin[1], lin[2]);
    let conic = Conic {
        a: a * s_sq,
        b: b * s_sq,
        c: c * s_sq,
        d: -2.0 * a * s_sq * mx - b * s_sq * my + d * s,
        e: -b * s_sq * mx - 2.0 * c * s_sq * my + e * s,
        f: a * s_sq * mx * mx + b * s_sq * mx * my + c * s_sq * my * my - d * s * mx
            - e * s * my
            + f,
    };
    if !conic.is_ellipse() {
        return Err(DropletError::NonIntersectingGeometry {
            mode: FitMode::Ellipse,
        });
    }
    Ok(conic)
}

fn singular() -> DropletError {
    DropletError::SingularJacobian {
        mode: FitMode::Ellipse,
        iteration: 0,
    }
}

/// Unit null vector of a rank-2 3×3 matrix: the largest cross product of
/// two of its rows.
fn null_vector(m: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let rows: [Vector3<f64>; 3] = [
        m.row(0).transpose(),
        m.row(1).transpose(),
        m.row(2).transpose(),
    ];
    let v = [
        rows[0].cross(&rows[1]),
        rows[0].cross(&rows[2]),
        rows[1].cross(&rows[2]),
    ]
    .into_iter()
    .max_by(|a, b| a.norm_squared().total_cmp(&b.norm_squared()))?;
    let norm = v.norm();
    (norm > 1e-30).then(|| v / norm)
}
