//! Two-stage Rosenbrock method (ROS2, γ = 1 + 1/√2).
//!
//! Stages, with `W = I − γhJ`:
//!   W k1 = f(t, y) + γh ∂f/∂t
//!   W k2 = f(t + h, y + h k1) − 2 k1 − γh ∂f/∂t
//!   y⁺  = y + h (3/2 k1 + 1/2 k2)
//! The embedded first-order solution is `y + h k1`. Jacobians are formed by
//! forward differences.

use nalgebra::{DMatrix, DVector};

use super::{combine, OdeSystem, StepOutcome};

const GAMMA: f64 = 1.0 + std::f64::consts::FRAC_1_SQRT_2;

/// One ROS2 step; `None` when `W` is singular.
pub(crate) fn step<const N: usize, S: OdeSystem<N>>(
    system: &S,
    t: f64,
    y: &[f64; N],
    f0: &[f64; N],
    h: f64,
) -> Option<StepOutcome<N>> {
    let sqrt_eps = f64::EPSILON.sqrt();

    let mut w = DMatrix::<f64>::identity(N, N);
    for j in 0..N {
        let delta = sqrt_eps * y[j].abs().max(1.0);
        let mut shifted = *y;
        shifted[j] += delta;
        let fj = system.rhs(t, &shifted);
        for i in 0..N {
            w[(i, j)] -= GAMMA * h * (fj[i] - f0[i]) / delta;
        }
    }
    let dt = sqrt_eps * t.abs().max(1.0);
    let f_t = system.rhs(t + dt, y);
    let dfdt: [f64; N] = std::array::from_fn(|i| (f_t[i] - f0[i]) / dt);

    let lu = w.lu();

    let rhs1 = combine(f0, &[(GAMMA * h, &dfdt)]);
    let k1 = to_array(&lu.solve(&DVector::from_column_slice(&rhs1))?)?;

    let f1 = system.rhs(t + h, &combine(y, &[(h, &k1)]));
    let rhs2 = combine(&f1, &[(-2.0, &k1), (-GAMMA * h, &dfdt)]);
    let k2 = to_array(&lu.solve(&DVector::from_column_slice(&rhs2))?)?;

    let y_new = combine(y, &[(1.5 * h, &k1), (0.5 * h, &k2)]);
    let error = combine(&[0.0; N], &[(0.5 * h, &k1), (0.5 * h, &k2)]);
    Some(StepOutcome { y: y_new, error })
}

fn to_array<const N: usize>(v: &DVector<f64>) -> Option<[f64; N]> {
    v.as_slice().try_into().ok()
}
