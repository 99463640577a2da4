//! Five-parameter Levenberg–Marquardt fit of the Young–Laplace profile.
//!
//! Damping follows Fletcher's rules: λ grows by a factor ν ∈ [2, 10] when the
//! reduction ratio falls below ρ (starting from the critical value
//! `1 / max|diag(A⁻¹)|`), and is halved when the ratio exceeds σ, dropping
//! back to zero once it falls below the critical value. Only steps that
//! lower the objective are accepted; the previous parameters are kept
//! alongside the candidate until then.

use nalgebra::{SMatrix, SVector};
use tracing::{debug, info, warn};

use crate::consts::{DOMAIN_EXTENSION_FACTOR, EPSILON, LM_RHO, LM_SIGMA, MAX_DOMAIN_EXTENSIONS};
use crate::error::{DropletError, FitMode, Result};
use crate::fit::FitStatus;
use crate::geometry::Point;
use crate::young_laplace::ProfileTable;

use super::config::TensiometryConfig;
use super::model::{DropParameters, PARAMETER_COUNT};
use super::residuals::{evaluate, Evaluation};

type Matrix5 = SMatrix<f64, PARAMETER_COUNT, PARAMETER_COUNT>;
type Vector5 = SVector<f64, PARAMETER_COUNT>;

/// Converged (or best) model for one outline.
#[derive(Clone, Debug)]
pub struct ProfileFit {
    pub params: DropParameters,
    pub table: ProfileTable,
    pub evaluation: Evaluation,
    /// Sum of squared residuals in px².
    pub objective: f64,
    pub status: FitStatus,
    /// Arc-length domain of the final table.
    pub s_max: f64,
}

impl ProfileFit {
    /// Root-mean-square residual in pixels.
    pub fn rms_residual(&self) -> f64 {
        let n = self.evaluation.residuals.len().max(1) as f64;
        (self.objective / n).sqrt()
    }
}

/// A parameter set together with the table and residuals it produced.
struct Trial {
    params: DropParameters,
    table: ProfileTable,
    evaluation: Evaluation,
    objective: f64,
    s_max: f64,
}

/// Fit the outline `points` (ordered along the drop) starting at `initial`.
pub fn fit_drop_profile(
    points: &[Point],
    initial: DropParameters,
    s_max: f64,
    config: &TensiometryConfig,
) -> Result<ProfileFit> {
    if points.len() < PARAMETER_COUNT {
        return Err(DropletError::InvalidInput(format!(
            "tensiometry fit needs at least {PARAMETER_COUNT} points, got {}",
            points.len()
        )));
    }
    if !initial.is_physical() {
        return Err(DropletError::InvalidInput(format!(
            "initial parameters are not physical: {initial:?}"
        )));
    }
    let tol = &config.tolerances;

    let mut current = run_trial(points, initial, s_max, config)?;
    let mut lambda = 0.0_f64;
    let mut lambda_c = 0.0_f64;
    let mut iteration = 0;

    let status = 'outer: loop {
        let (a, g) = normal_equations(&current.evaluation);

        if scaled_gradient(&current.evaluation, &g) < tol.gradient_tol {
            break FitStatus::Converged {
                iterations: iteration,
            };
        }

        loop {
            if iteration >= tol.max_fitting_steps {
                break 'outer FitStatus::MaxIterationsExceeded {
                    iterations: iteration,
                };
            }
            iteration += 1;

            let damped = a + Matrix5::from_diagonal(&a.diagonal()) * lambda;
            let delta = damped
                .lu()
                .solve(&(-g))
                .ok_or(DropletError::SingularJacobian {
                    mode: FitMode::Tensiometry,
                    iteration,
                })?;
            let delta_arr: [f64; PARAMETER_COUNT] = std::array::from_fn(|k| delta[k]);
            let candidate_params = current.params.stepped(&delta_arr);

            let candidate = if candidate_params.is_physical() {
                run_trial(points, candidate_params, current.s_max, config).ok()
            } else {
                None
            };
            let new_objective = candidate.as_ref().map_or(f64::INFINITY, |c| c.objective);

            let predicted = delta.dot(&(-2.0 * g - a * delta));
            let ratio = if predicted > 0.0 {
                (current.objective - new_objective) / predicted
            } else {
                f64::NEG_INFINITY
            };

            if ratio < LM_RHO {
                let slope = delta.dot(&g);
                let mut nu = if new_objective.is_finite() && slope < 0.0 {
                    (2.0 - (new_objective - current.objective) / slope).clamp(2.0, 10.0)
                } else {
                    10.0
                };
                if lambda == 0.0 {
                    lambda_c = critical_lambda(&a);
                    lambda = lambda_c;
                    nu /= 2.0;
                }
                lambda *= nu;
            } else if ratio > LM_SIGMA {
                lambda /= 2.0;
                if lambda < lambda_c {
                    lambda = 0.0;
                }
            }

            debug!(
                iteration,
                lambda,
                objective = current.objective,
                candidate = new_objective,
                ratio,
                "Levenberg-Marquardt step"
            );

            if new_objective < current.objective {
                let Some(accepted) = candidate else {
                    continue;
                };
                let previous = std::mem::replace(&mut current, accepted);

                let prev = previous.params.to_array();
                let param_change = delta_arr
                    .iter()
                    .zip(prev.iter())
                    .map(|(d, p)| d.abs() / p.abs().max(1.0))
                    .fold(0.0_f64, f64::max);
                let objective_change = (previous.objective - current.objective)
                    / previous.objective.max(EPSILON);

                if param_change < tol.delta_tol
                    || objective_change < tol.objective_tol
                    || current.objective == 0.0
                {
                    break 'outer FitStatus::Converged {
                        iterations: iteration,
                    };
                }
                continue 'outer;
            }
        }
    };

    if !status.is_converged() {
        warn!(
            iterations = status.iterations(),
            objective = current.objective,
            "Tensiometry fit reached the step limit"
        );
    }
    info!(
        apex_x = current.params.apex_x,
        apex_y = current.params.apex_y,
        apex_radius = current.params.apex_radius,
        bond_number = current.params.bond_number,
        rotation = current.params.rotation,
        objective = current.objective,
        iterations = status.iterations(),
        "Drop profile fitted"
    );

    Ok(ProfileFit {
        params: current.params,
        table: current.table,
        evaluation: current.evaluation,
        objective: current.objective,
        status,
        s_max: current.s_max,
    })
}

/// Build the table for `params`, extending the arc-length domain while
/// measured points fall beyond its end.
fn run_trial(
    points: &[Point],
    params: DropParameters,
    s_max: f64,
    config: &TensiometryConfig,
) -> Result<Trial> {
    let mut s_max = s_max;
    let mut extensions = 0;
    loop {
        let table = ProfileTable::build(
            params.bond_number,
            config.orientation,
            s_max,
            config.integrator,
        )?;
        let evaluation = evaluate(points, &params, &table, &config.tolerances);
        let complete = table.s_end() + 0.5 * table.ds >= s_max;
        if evaluation.hit_end() && complete && extensions < MAX_DOMAIN_EXTENSIONS {
            s_max *= DOMAIN_EXTENSION_FACTOR;
            extensions += 1;
            debug!(s_max, extensions, "Extending arc-length domain");
            continue;
        }
        let objective = evaluation.objective();
        return Ok(Trial {
            params,
            table,
            evaluation,
            objective,
            s_max,
        });
    }
}

/// `A = JᵀJ`, `g = Jᵀe`.
fn normal_equations(evaluation: &Evaluation) -> (Matrix5, Vector5) {
    let mut a = Matrix5::zeros();
    let mut g = Vector5::zeros();
    for (row, &e) in evaluation.jacobian.iter().zip(&evaluation.residuals) {
        let j = Vector5::from_column_slice(row);
        a += j * j.transpose();
        g += j * e;
    }
    (a, g)
}

/// Largest cosine between the residual vector and a Jacobian column.
fn scaled_gradient(evaluation: &Evaluation, g: &Vector5) -> f64 {
    let residual_norm = evaluation.objective().sqrt();
    if residual_norm == 0.0 {
        return 0.0;
    }
    (0..PARAMETER_COUNT)
        .map(|k| {
            let column_norm = evaluation
                .jacobian
                .iter()
                .map(|row| row[k] * row[k])
                .sum::<f64>()
                .sqrt();
            if column_norm == 0.0 {
                0.0
            } else {
                g[k].abs() / (column_norm * residual_norm)
            }
        })
        .fold(0.0, f64::max)
}

/// `1 / max|diag(A⁻¹)|`, or a scale-relative floor when `A` is singular.
fn critical_lambda(a: &Matrix5) -> f64 {
    let fallback = EPSILON * a.diagonal().amax().max(1.0);
    match a.try_inverse() {
        Some(inv) => {
            let largest = inv.diagonal().amax();
            if largest > 0.0 && largest.is_finite() {
                1.0 / largest
            } else {
                fallback
            }
        }
        None => fallback,
    }
}
