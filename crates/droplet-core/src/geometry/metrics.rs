use serde::{Deserialize, Serialize};

use super::point::Point;

/// Pointwise distance statistics between measured points and a fitted curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Mean absolute distance.
    pub mae: f64,
    /// Mean squared distance.
    pub mse: f64,
    /// Root mean squared distance.
    pub rmse: f64,
    /// Largest distance.
    pub max: f64,
}

impl ErrorMetrics {
    pub fn from_distances(distances: &[f64]) -> Self {
        if distances.is_empty() {
            return Self::default();
        }
        let n = distances.len() as f64;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut max = 0.0_f64;
        for &d in distances {
            let d = d.abs();
            sum += d;
            sum_sq += d * d;
            max = max.max(d);
        }
        let mse = sum_sq / n;
        Self {
            mae: sum / n,
            mse,
            rmse: mse.sqrt(),
            max,
        }
    }

    /// Metrics of every point against a densely sampled curve.
    pub fn against_curve(points: &[Point], curve: &[Point]) -> Self {
        let distances: Vec<f64> = points
            .iter()
            .map(|&p| distance_to_polyline(p, curve))
            .collect();
        Self::from_distances(&distances)
    }
}

/// Shortest distance from `p` to a polyline, projecting onto each segment.
///
/// Returns `f64::INFINITY` for an empty polyline.
pub fn distance_to_polyline(p: Point, curve: &[Point]) -> f64 {
    closest_on_polyline(p, curve)
        .map(|(_, q)| p.distance(q))
        .unwrap_or(f64::INFINITY)
}

/// Closest point on a polyline to `p`, with the index of the segment start.
pub fn closest_on_polyline(p: Point, curve: &[Point]) -> Option<(usize, Point)> {
    match curve.len() {
        0 => None,
        1 => Some((0, curve[0])),
        _ => {
            let mut best = (0, curve[0]);
            let mut best_d2 = f64::INFINITY;
            for (i, seg) in curve.windows(2).enumerate() {
                let q = project_onto_segment(p, seg[0], seg[1]);
                let d2 = p.distance_sq(q);
                if d2 < best_d2 {
                    best_d2 = d2;
                    best = (i, q);
                }
            }
            Some(best)
        }
    }
}

fn project_onto_segment(p: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
