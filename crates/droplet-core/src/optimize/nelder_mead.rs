//! Derivative-free Nelder–Mead simplex minimizer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    NELDER_MEAD_F_TOLERANCE, NELDER_MEAD_ITERATIONS_PER_PARAM, NELDER_MEAD_X_TOLERANCE,
};

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;
/// Vertex offset used for zero-valued start coordinates.
const ZERO_STEP: f64 = 0.00025;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NelderMeadOptions {
    pub max_iterations: usize,
    /// Convergence threshold on the simplex diameter (absolute, per coordinate).
    pub x_tolerance: f64,
    /// Convergence threshold on the spread of objective values.
    pub f_tolerance: f64,
    /// Relative offset of the initial simplex vertices from the start point.
    pub initial_step: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: NELDER_MEAD_ITERATIONS_PER_PARAM,
            x_tolerance: NELDER_MEAD_X_TOLERANCE,
            f_tolerance: NELDER_MEAD_F_TOLERANCE,
            initial_step: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

/// Minimize `objective` starting from `x0`.
///
/// Non-finite objective values are treated as `+∞`, so the objective may
/// return `f64::INFINITY` to reject infeasible points.
pub fn minimize<F>(mut objective: F, x0: &[f64], options: &NelderMeadOptions) -> Minimum
where
    F: FnMut(&[f64]) -> f64,
{
    let n = x0.len();
    let mut evaluations = 0;
    let mut eval = |x: &[f64]| {
        evaluations += 1;
        let v = objective(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((x0.to_vec(), eval(x0)));
    for i in 0..n {
        let mut vertex = x0.to_vec();
        vertex[i] = if vertex[i] != 0.0 {
            vertex[i] * (1.0 + options.initial_step)
        } else {
            ZERO_STEP
        };
        let value = eval(&vertex);
        simplex.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;
    while iterations < options.max_iterations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        if has_converged(&simplex, options) {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid = centroid(&simplex[..n]);
        let worst = simplex[n].clone();
        let best_value = simplex[0].1;
        let second_worst_value = simplex[n.saturating_sub(1)].1;

        let reflected = along(&centroid, &worst.0, -REFLECT);
        let f_reflected = eval(&reflected);

        if f_reflected < best_value {
            let expanded = along(&centroid, &worst.0, -REFLECT * EXPAND);
            let f_expanded = eval(&expanded);
            simplex[n] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }
        if f_reflected < second_worst_value {
            simplex[n] = (reflected, f_reflected);
            continue;
        }

        let contracted = if f_reflected < worst.1 {
            along(&centroid, &worst.0, -REFLECT * CONTRACT)
        } else {
            along(&centroid, &worst.0, CONTRACT)
        };
        let f_contracted = eval(&contracted);
        if f_contracted < f_reflected.min(worst.1) {
            simplex[n] = (contracted, f_contracted);
            continue;
        }

        let best = simplex[0].0.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let shrunk: Vec<f64> = best
                .iter()
                .zip(&vertex.0)
                .map(|(b, v)| b + SHRINK * (v - b))
                .collect();
            let value = eval(&shrunk);
            *vertex = (shrunk, value);
        }
    }
    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    if !converged {
        converged = has_converged(&simplex, options);
    }

    let (x, value) = simplex.swap_remove(0);
    debug!(iterations, evaluations, value, converged, "Nelder-Mead finished");
    Minimum {
        x,
        value,
        iterations,
        evaluations,
        converged,
    }
}

fn has_converged(simplex: &[(Vec<f64>, f64)], options: &NelderMeadOptions) -> bool {
    let (best, best_value) = &simplex[0];
    let x_spread = simplex[1..]
        .iter()
        .flat_map(|(v, _)| v.iter().zip(best).map(|(a, b)| (a - b).abs()))
        .fold(0.0_f64, f64::max);
    let f_spread = simplex[1..]
        .iter()
        .map(|(_, f)| (f - best_value).abs())
        .fold(0.0_f64, f64::max);
    x_spread <= options.x_tolerance && f_spread <= options.f_tolerance
}

fn centroid(vertices: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let n = vertices.len() as f64;
    let dim = vertices.first().map_or(0, |(v, _)| v.len());
    (0..dim)
        .map(|i| vertices.iter().map(|(v, _)| v[i]).sum::<f64>() / n)
        .collect()
}

/// `c + t·(w − c)`
fn along(c: &[f64], w: &[f64], t: f64) -> Vec<f64> {
    c.iter().zip(w).map(|(ci, wi)| ci + t * (wi - ci)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_rosenbrock_minimum() {
        let rosen = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let options = NelderMeadOptions {
            max_iterations: 2000,
            x_tolerance: 1e-8,
            f_tolerance: 1e-12,
            ..NelderMeadOptions::default()
        };
        let min = minimize(rosen, &[-1.2, 1.0], &options);
        assert!(min.converged);
        assert!((min.x[0] - 1.0).abs() < 1e-5);
        assert!((min.x[1] - 1.0).abs() < 1e-5);
    }
}
