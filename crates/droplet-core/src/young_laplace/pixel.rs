use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::consts::{APEX_START_OFFSET, PIXEL_BOND_SCALE, PIXEL_PROFILE_SAMPLES};
use crate::error::{DropletError, FitMode, Result};
use crate::fit::BashforthAdamsParams;
use crate::geometry::Point;
use crate::ode::{integrate, Integrator, OdeOptions, OdeSystem, Trajectory};

/// Bashforth–Adams equations in pixels with the tangent angle φ as the
/// independent variable. State `[x, z]`, `z` measured from the apex into
/// the drop.
#[derive(Clone, Copy, Debug)]
pub struct PixelSystem {
    pub a: f64,
    pub b: f64,
}

impl OdeSystem<2> for PixelSystem {
    fn rhs(&self, phi: f64, y: &[f64; 2]) -> [f64; 2] {
        let [x, z] = *y;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let denom = x * (2.0 / self.b + z / (self.a * self.a)) - sin_phi;
        [x * cos_phi / denom, x * sin_phi / denom]
    }
}

/// Pixel-mode Bond number `18·b²/a²`.
pub fn pixel_bond_number(params: &BashforthAdamsParams) -> f64 {
    PIXEL_BOND_SCALE * params.b * params.b / (params.a * params.a)
}

/// Predicted drop outline for one `(a, b, h)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PixelProfile {
    pub params: BashforthAdamsParams,
    /// Apex height above the contact line in pixels.
    pub height: f64,
    /// Tangent angle in radians per point: negative on the left half.
    pub phi: Vec<f64>,
    /// Model coordinates from the left end through the apex to the right end.
    pub points: Vec<Point>,
    /// Index of the first right-half point.
    pub apex_index: usize,
}

impl PixelProfile {
    pub fn left(&self) -> &[Point] {
        &self.points[..self.apex_index]
    }

    pub fn right(&self) -> &[Point] {
        &self.points[self.apex_index..]
    }

    /// Contact angles in degrees: `|φ|` at each end.
    pub fn end_angles(&self) -> (f64, f64) {
        let first = self.phi.first().copied().unwrap_or(0.0);
        let last = self.phi.last().copied().unwrap_or(0.0);
        (first.abs().to_degrees(), last.abs().to_degrees())
    }

    pub fn width(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(l), Some(r)) => r.x - l.x,
            _ => 0.0,
        }
    }

    /// Enclosed volume from the end state of each half,
    /// `V = π x² (h + 2a²/b) − 2π a² x sin φ`, averaged over both halves.
    pub fn volume(&self) -> f64 {
        let BashforthAdamsParams { a, b } = self.params;
        let end_volume = |p: Option<&Point>, phi: Option<&f64>| match (p, phi) {
            (Some(p), Some(phi)) => {
                let x = p.x.abs();
                let sin_phi = phi.abs().sin();
                PI * x * x * (self.height + 2.0 * a * a / b) - 2.0 * PI * a * a * x * sin_phi
            }
            _ => 0.0,
        };
        0.5 * (end_volume(self.points.first(), self.phi.first())
            + end_volume(self.points.last(), self.phi.last()))
    }
}

/// Integrate both halves from the apex until `z` reaches `height` or φ
/// reaches ±180°.
pub fn generate_pixel_profile(
    params: BashforthAdamsParams,
    height: f64,
    integrator: Integrator,
) -> Result<PixelProfile> {
    let options = OdeOptions {
        integrator,
        max_step: PI / PIXEL_PROFILE_SAMPLES as f64,
        ..OdeOptions::default()
    };
    generate_pixel_profile_with(params, height, &options)
}

/// [`generate_pixel_profile`] with explicit step control.
///
/// A half whose integration stalls or blows up before reaching the height
/// or ±180° is an error rather than a shortened profile.
pub fn generate_pixel_profile_with(
    params: BashforthAdamsParams,
    height: f64,
    options: &OdeOptions,
) -> Result<PixelProfile> {
    let BashforthAdamsParams { a, b } = params;
    if !(a > 0.0 && b > 0.0 && a.is_finite() && b.is_finite()) {
        return Err(DropletError::InvalidInput(format!(
            "capillary length and apex radius must be positive, got a={a}, b={b}"
        )));
    }
    if !(height > 0.0) {
        return Err(DropletError::InvalidInput(format!(
            "drop height must be positive, got {height}"
        )));
    }

    let system = PixelSystem { a, b };
    let reached_height = move |_phi: f64, y: &[f64; 2]| y[1] - height;

    let left = integrate(
        &system,
        0.0,
        [-APEX_START_OFFSET, 0.0],
        -PI,
        options,
        Some(&reached_height),
    );
    let right = integrate(
        &system,
        0.0,
        [APEX_START_OFFSET, 0.0],
        PI,
        options,
        Some(&reached_height),
    );
    for half in [&left, &right] {
        if !half.termination.is_complete() {
            return Err(DropletError::IntegrationFailed {
                mode: FitMode::BashforthAdams,
                termination: half.termination,
            });
        }
    }
    if left.len() < 2 || right.len() < 2 {
        return Err(DropletError::NonIntersectingGeometry {
            mode: FitMode::BashforthAdams,
        });
    }

    let (mut phi, mut points) = unpack(&left);
    phi.reverse();
    points.reverse();
    let apex_index = points.len();
    let (right_phi, right_points) = unpack(&right);
    phi.extend(right_phi);
    points.extend(right_points);

    Ok(PixelProfile {
        params,
        height,
        phi,
        points,
        apex_index,
    })
}

fn unpack(trajectory: &Trajectory<2>) -> (Vec<f64>, Vec<Point>) {
    let points = trajectory
        .y
        .iter()
        .map(|&[x, z]| Point::new(x, z))
        .collect();
    (trajectory.t.clone(), points)
}
