//! Pixel-mode Young–Laplace fit ("Bashforth–Adams").
//!
//! The profile is moved into a frame with the apex at the origin and `z`
//! growing toward the baseline. A simplex search over `(a, b)` minimizes the
//! summed squared distance from the measured points to the integrated model
//! outline, with the drop height held at the measured value.

use std::time::Instant;

use tracing::{debug, warn};

use crate::clean::CleanedProfile;
use crate::error::{DropletError, Result};
use crate::geometry::{distance_to_polyline, Baseline, ErrorMetrics, Point};
use crate::optimize::minimize;
use crate::young_laplace::{generate_pixel_profile, pixel_bond_number, PixelProfile};

use super::circle::fit_circle_params;
use super::config::BashforthAdamsConfig;
use super::result::{
    BashforthAdamsParams, ContactAngles, FitResult, FitStatus, Timing, YoungLaplaceFit,
};

/// Upper bound on data points entering the objective.
const OBJECTIVE_POINTS: usize = 200;

/// Apex-centred model frame laid on the baseline.
#[derive(Clone, Copy, Debug)]
struct ModelFrame {
    baseline: Baseline,
    /// Apex in baseline coordinates `(u, v)`.
    apex: Point,
}

impl ModelFrame {
    fn to_model(&self, p: Point) -> Point {
        let q = self.baseline.to_frame(p);
        Point::new(q.x - self.apex.x, self.apex.y - q.y)
    }

    fn to_image(&self, m: Point) -> Point {
        self.baseline
            .from_frame(Point::new(self.apex.x + m.x, self.apex.y - m.y))
    }

    fn height(&self) -> f64 {
        self.apex.y
    }
}

pub fn fit_bashforth_adams(
    profile: &CleanedProfile,
    config: &BashforthAdamsConfig,
) -> Result<FitResult> {
    let t0 = Instant::now();
    let baseline = profile
        .baseline()
        .ok_or_else(|| DropletError::InvalidInput("contact points coincide".into()))?;
    let frame = ModelFrame {
        baseline,
        apex: baseline.to_frame(profile.apex()),
    };
    let height = frame.height();
    if !(height > 0.0) {
        return Err(DropletError::DegenerateApex(format!(
            "apex lies {height:.2} px from the baseline"
        )));
    }

    let model_points: Vec<Point> = profile.profile.iter().map(|&p| frame.to_model(p)).collect();
    let stride = model_points.len().div_ceil(OBJECTIVE_POINTS).max(1);
    let sample: Vec<Point> = model_points.iter().step_by(stride).copied().collect();

    let b0 = fit_circle_params(&profile.profile)?.radius;
    let a0 = config.initial_capillary_ratio * b0;
    let integrator = config.integrator;

    let objective = |x: &[f64]| {
        let params = BashforthAdamsParams { a: x[0], b: x[1] };
        if !(params.a > 0.0 && params.b > 0.0) {
            return f64::INFINITY;
        }
        match generate_pixel_profile(params, height, integrator) {
            Ok(model) => squared_distance_sum(&sample, &model),
            Err(_) => f64::INFINITY,
        }
    };
    let minimum = minimize(objective, &[a0, b0], &config.simplex);

    let params = BashforthAdamsParams {
        a: minimum.x[0],
        b: minimum.x[1],
    };
    let model = generate_pixel_profile(params, height, integrator)?;
    let status = if minimum.converged {
        FitStatus::Converged {
            iterations: minimum.iterations,
        }
    } else {
        warn!(
            iterations = minimum.iterations,
            objective = minimum.value,
            "Young-Laplace simplex did not converge"
        );
        FitStatus::MaxIterationsExceeded {
            iterations: minimum.iterations,
        }
    };

    let (left, right) = model.end_angles();
    let angles = ContactAngles { left, right };
    let curve: Vec<Point> = model.points.iter().map(|&m| frame.to_image(m)).collect();
    let metrics = ErrorMetrics::against_curve(&profile.profile, &curve);
    let bond_number = pixel_bond_number(&params);

    debug!(
        a = params.a,
        b = params.b,
        bond_number,
        left = angles.left,
        right = angles.right,
        "Young-Laplace fit"
    );

    Ok(FitResult::YoungLaplace(YoungLaplaceFit {
        angles,
        params,
        bond_number,
        volume: model.volume(),
        baseline_width: model.width(),
        height,
        metrics,
        status,
        timing: Timing::fitting_since(t0),
    }))
}

/// Σ squared distance from each point to the model half on its side of the axis.
pub(crate) fn squared_distance_sum(points: &[Point], model: &PixelProfile) -> f64 {
    let (left, right) = (model.left(), model.right());
    points
        .iter()
        .map(|&p| {
            let half = if p.x < 0.0 && !left.is_empty() {
                left
            } else {
                right
            };
            distance_to_polyline(p, half).powi(2)
        })
        .sum()
}
