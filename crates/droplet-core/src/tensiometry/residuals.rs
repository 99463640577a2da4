//! Residuals and Jacobian of the measured outline against a profile table.
//!
//! Each measured point is matched to the model arc length nearest to it.
//! Consecutive points search a window around the previous match, seeded at
//! a fraction of the table length and doubled whenever the best node sits
//! on the window edge; Newton steps on the tangency condition then refine
//! the match between grid nodes.

use crate::consts::ARCLENGTH_WINDOW_FRACTION;
use crate::geometry::{Point, Side};
use crate::young_laplace::ProfileTable;

use super::config::Tolerances;
use super::model::{DropParameters, ImageMapping, PARAMETER_COUNT};

/// Where one measured point landed on the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcMatch {
    pub s: f64,
    pub side: Side,
    /// The point lies beyond the tabulated end of the profile.
    pub beyond_end: bool,
}

#[derive(Clone, Debug)]
pub struct Evaluation {
    pub residuals: Vec<f64>,
    /// One row of `∂e/∂p` per residual; empty unless requested.
    pub jacobian: Vec<[f64; PARAMETER_COUNT]>,
    pub matches: Vec<ArcMatch>,
}

impl Evaluation {
    /// Sum of squared residuals.
    pub fn objective(&self) -> f64 {
        self.residuals.iter().map(|e| e * e).sum()
    }

    /// Largest matched arc length.
    pub fn max_arc_length(&self) -> f64 {
        self.matches.iter().map(|m| m.s).fold(0.0, f64::max)
    }

    pub fn hit_end(&self) -> bool {
        self.matches.iter().any(|m| m.beyond_end)
    }
}

/// Residuals and Jacobian of `points` for `params`.
pub fn evaluate(
    points: &[Point],
    params: &DropParameters,
    table: &ProfileTable,
    tolerances: &Tolerances,
) -> Evaluation {
    let mapping = ImageMapping::new(*params, table.orientation);
    let s_end = table.s_end();
    let seed_window = (ARCLENGTH_WINDOW_FRACTION * s_end).max(table.ds);

    let mut residuals = Vec::with_capacity(points.len());
    let mut jacobian = Vec::with_capacity(points.len());
    let mut matches = Vec::with_capacity(points.len());
    let mut previous: Option<f64> = None;

    for &p in points {
        let (q, side) = mapping.to_model(p);
        let coarse = match previous {
            None => nearest_node(table, q, 0.0, s_end),
            Some(centre) => windowed_search(table, q, centre, seed_window),
        };
        let s = refine(table, q, coarse, tolerances);
        previous = Some(s);

        let state = table.state_at(s);
        let model = mapping.to_image(state[0], state[1], side);
        let offset = p - model;
        let along = (state[0] - q.x) * state[2].cos() + (state[1] - q.y) * state[2].sin();
        let beyond_end = s >= s_end && along < 0.0;

        let direction = if beyond_end {
            offset.normalized()
        } else {
            mapping.tangent(state[2], side).perp().normalized()
        }
        .unwrap_or_default();

        let e = offset.dot(direction);
        residuals.push(e);
        let d = mapping.parameter_derivatives(&state, side);
        jacobian.push(std::array::from_fn(|k| -d[k].dot(direction)));
        matches.push(ArcMatch {
            s,
            side,
            beyond_end,
        });
    }

    Evaluation {
        residuals,
        jacobian,
        matches,
    }
}

fn windowed_search(table: &ProfileTable, q: Point, centre: f64, seed: f64) -> f64 {
    let s_end = table.s_end();
    let mut half_width = seed;
    loop {
        let lo = (centre - half_width).max(0.0);
        let hi = (centre + half_width).min(s_end);
        let best = nearest_node(table, q, lo, hi);
        let on_low_edge = lo > 0.0 && best - lo < table.ds;
        let on_high_edge = hi < s_end && hi - best < table.ds;
        if !(on_low_edge || on_high_edge) || (lo <= 0.0 && hi >= s_end) {
            return best;
        }
        half_width *= 2.0;
    }
}

/// Grid node in `[lo, hi]` closest to `q` in the dimensionless plane.
fn nearest_node(table: &ProfileTable, q: Point, lo: f64, hi: f64) -> f64 {
    let last = table.len() - 1;
    let first = ((lo / table.ds).floor() as usize).min(last);
    let end = ((hi / table.ds).ceil() as usize).min(last);
    let mut best = (first, f64::INFINITY);
    for i in first..=end {
        let st = &table.states[i];
        let d2 = (st[0] - q.x).powi(2) + (st[1] - q.y).powi(2);
        if d2 < best.1 {
            best = (i, d2);
        }
    }
    best.0 as f64 * table.ds
}

/// Newton iterations on `(M(s) − q)·T(s) = 0`, clamped to the table.
fn refine(table: &ProfileTable, q: Point, mut s: f64, tolerances: &Tolerances) -> f64 {
    let s_end = table.s_end();
    for _ in 0..tolerances.max_arclength_steps {
        let st = table.state_at(s);
        let dphi = table.derivative_at(s)[2];
        let (sin_phi, cos_phi) = st[2].sin_cos();
        let dx = st[0] - q.x;
        let dz = st[1] - q.y;
        let g = dx * cos_phi + dz * sin_phi;
        let slope = 1.0 + dphi * (dz * cos_phi - dx * sin_phi);
        if slope <= 0.0 || !slope.is_finite() {
            break;
        }
        let next = (s - g / slope).clamp(0.0, s_end);
        let step = (next - s).abs();
        s = next;
        if step < tolerances.arclength_tol {
            break;
        }
    }
    s
}
