use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{all_finite, dormand_prince, rosenbrock, Integrator, OdeOptions, OdeSystem, StepOutcome};

/// Why an integration stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Reached the end of the requested span.
    Completed,
    /// The terminal event function changed sign.
    Event,
    /// The state or its derivative stopped being finite.
    NonFinite,
    /// Step budget exhausted.
    StepLimit,
    /// Step size collapsed below round-off.
    StepTooSmall,
}

impl Termination {
    /// Whether the solve ran to the end of its span or to its event.
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Completed | Self::Event)
    }

    /// Step control gave up before the end of the span.
    pub fn is_stalled(self) -> bool {
        matches!(self, Self::StepLimit | Self::StepTooSmall)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Event => write!(f, "event reached"),
            Self::NonFinite => write!(f, "non-finite state"),
            Self::StepLimit => write!(f, "step budget exhausted"),
            Self::StepTooSmall => write!(f, "step size collapsed"),
        }
    }
}

/// Accepted steps of one integration, in integration order.
#[derive(Clone, Debug)]
pub struct Trajectory<const N: usize> {
    pub t: Vec<f64>,
    pub y: Vec<[f64; N]>,
    /// `f(t, y)` at every stored point.
    pub dy: Vec<[f64; N]>,
    pub termination: Termination,
}

impl<const N: usize> Trajectory<N> {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn last(&self) -> Option<(f64, [f64; N])> {
        Some((*self.t.last()?, *self.y.last()?))
    }

    /// Cubic Hermite interpolation of the state at `t`.
    ///
    /// `None` outside the integrated span.
    pub fn sample(&self, t: f64) -> Option<[f64; N]> {
        let n = self.t.len();
        if n == 0 {
            return None;
        }
        let forward = n < 2 || self.t[n - 1] >= self.t[0];
        let key = |v: f64| if forward { v } else { -v };
        let target = key(t);
        if target < key(self.t[0]) || target > key(self.t[n - 1]) {
            return None;
        }
        if n == 1 {
            return Some(self.y[0]);
        }
        let upper = self
            .t
            .partition_point(|&ti| key(ti) < target)
            .clamp(1, n - 1);
        let lower = upper - 1;

        let (t0, t1) = (self.t[lower], self.t[upper]);
        let h = t1 - t0;
        if h == 0.0 {
            return Some(self.y[upper]);
        }
        let s = (t - t0) / h;
        let h00 = (1.0 + 2.0 * s) * (1.0 - s) * (1.0 - s);
        let h10 = s * (1.0 - s) * (1.0 - s);
        let h01 = s * s * (3.0 - 2.0 * s);
        let h11 = s * s * (s - 1.0);
        let (y0, y1) = (&self.y[lower], &self.y[upper]);
        let (d0, d1) = (&self.dy[lower], &self.dy[upper]);
        Some(std::array::from_fn(|i| {
            h00 * y0[i] + h10 * h * d0[i] + h01 * y1[i] + h11 * h * d1[i]
        }))
    }
}

/// Integrate `system` from `(t0, y0)` toward `t_end`.
///
/// If `event` is given, integration stops at the first sign change of
/// `event(t, y)`; the crossing is located by bisection on the step size and
/// stored as the final point. Integration runs backwards when `t_end < t0`.
///
/// With [`Integrator::Auto`] the explicit solve is repeated with ROS2 when it
/// stalls.
pub fn integrate<const N: usize, S: OdeSystem<N>>(
    system: &S,
    t0: f64,
    y0: [f64; N],
    t_end: f64,
    options: &OdeOptions,
    event: Option<&dyn Fn(f64, &[f64; N]) -> f64>,
) -> Trajectory<N> {
    match options.integrator {
        Integrator::Auto => {
            let explicit = drive(system, t0, y0, t_end, options, event, Integrator::DormandPrince);
            if !explicit.termination.is_stalled() {
                return explicit;
            }
            debug!(
                termination = %explicit.termination,
                t = explicit.t.last().copied().unwrap_or(t0),
                "Explicit solve stalled, switching to Rosenbrock"
            );
            drive(system, t0, y0, t_end, options, event, Integrator::Rosenbrock)
        }
        scheme => drive(system, t0, y0, t_end, options, event, scheme),
    }
}

fn drive<const N: usize, S: OdeSystem<N>>(
    system: &S,
    t0: f64,
    y0: [f64; N],
    t_end: f64,
    options: &OdeOptions,
    event: Option<&dyn Fn(f64, &[f64; N]) -> f64>,
    scheme: Integrator,
) -> Trajectory<N> {
    let f0 = system.rhs(t0, &y0);
    let mut out = Trajectory {
        t: vec![t0],
        y: vec![y0],
        dy: vec![f0],
        termination: Termination::Completed,
    };
    if !all_finite(&y0) || !all_finite(&f0) {
        out.termination = Termination::NonFinite;
        return out;
    }
    let span = t_end - t0;
    if span == 0.0 {
        return out;
    }
    let direction = span.signum();
    let exponent = -1.0 / (scheme.error_order() + 1.0);

    let (mut t, mut y, mut f) = (t0, y0, f0);
    let mut g_prev = event.map(|g| g(t, &y));
    let mut h_abs = (0.01 * span.abs()).min(options.max_step);
    let mut steps = 0;

    out.termination = loop {
        if steps >= options.max_steps {
            break Termination::StepLimit;
        }
        steps += 1;

        let remaining = (t_end - t).abs();
        let h_min = 1e-14 * t.abs().max(1.0);
        h_abs = h_abs.min(options.max_step).min(remaining);
        if h_abs < h_min {
            break Termination::StepTooSmall;
        }
        let h = direction * h_abs;

        let Some(trial) = attempt(system, scheme, t, &y, &f, h) else {
            h_abs *= 0.5;
            continue;
        };
        let err = error_norm(&y, &trial, options);
        if !all_finite(&trial.y) || !err.is_finite() {
            h_abs *= 0.25;
            if h_abs < h_min {
                break Termination::NonFinite;
            }
            continue;
        }
        if err > 1.0 {
            h_abs *= (0.9 * err.powf(exponent)).max(0.2);
            continue;
        }

        let t_new = t + h;
        if let (Some(g), Some(g_old)) = (event, g_prev) {
            let g_new = g(t_new, &trial.y);
            if g_old != 0.0 && g_old.signum() != g_new.signum() {
                let (t_hit, y_hit) =
                    locate_event(system, scheme, g, t, &y, &f, h, g_old);
                push(&mut out, system, t_hit, y_hit);
                break Termination::Event;
            }
            g_prev = Some(g_new);
        }

        let f_new = system.rhs(t_new, &trial.y);
        out.t.push(t_new);
        out.y.push(trial.y);
        out.dy.push(f_new);
        if !all_finite(&f_new) {
            break Termination::NonFinite;
        }
        t = t_new;
        y = trial.y;
        f = f_new;
        if (t_end - t) * direction <= h_min {
            break Termination::Completed;
        }

        let factor = if err == 0.0 {
            5.0
        } else {
            (0.9 * err.powf(exponent)).clamp(0.2, 5.0)
        };
        h_abs *= factor;
    };

    debug!(
        integrator = %scheme,
        steps,
        points = out.len(),
        termination = ?out.termination,
        "ODE integration finished"
    );
    out
}

fn attempt<const N: usize, S: OdeSystem<N>>(
    system: &S,
    integrator: Integrator,
    t: f64,
    y: &[f64; N],
    f: &[f64; N],
    h: f64,
) -> Option<StepOutcome<N>> {
    match integrator {
        Integrator::Auto | Integrator::DormandPrince => {
            Some(dormand_prince::step(system, t, y, f, h))
        }
        Integrator::Rosenbrock => rosenbrock::step(system, t, y, f, h),
    }
}

/// RMS of the error scaled by `atol + rtol·max(|y|, |y⁺|)`.
fn error_norm<const N: usize>(y: &[f64; N], trial: &StepOutcome<N>, options: &OdeOptions) -> f64 {
    let sum: f64 = (0..N)
        .map(|i| {
            let scale = options.atol + options.rtol * y[i].abs().max(trial.y[i].abs());
            (trial.error[i] / scale).powi(2)
        })
        .sum();
    (sum / N as f64).sqrt()
}

/// Bisect the step size until the event bracket is below round-off.
#[allow(clippy::too_many_arguments)]
fn locate_event<const N: usize, S: OdeSystem<N>>(
    system: &S,
    integrator: Integrator,
    g: &dyn Fn(f64, &[f64; N]) -> f64,
    t: f64,
    y: &[f64; N],
    f: &[f64; N],
    h: f64,
    g_start: f64,
) -> (f64, [f64; N]) {
    let state_at = |tau: f64| attempt(system, integrator, t, y, f, tau).map(|s| s.y);
    let (mut lo, mut hi) = (0.0_f64, h);
    let mut best = state_at(h).unwrap_or(*y);
    for _ in 0..60 {
        if (hi - lo).abs() <= 1e-13 * t.abs().max(1.0) {
            break;
        }
        let mid = 0.5 * (lo + hi);
        let Some(y_mid) = state_at(mid) else {
            break;
        };
        if g(t + mid, &y_mid).signum() == g_start.signum() {
            lo = mid;
        } else {
            hi = mid;
            best = y_mid;
        }
    }
    (t + hi, best)
}

fn push<const N: usize, S: OdeSystem<N>>(out: &mut Trajectory<N>, system: &S, t: f64, y: [f64; N]) {
    out.dy.push(system.rhs(t, &y));
    out.t.push(t);
    out.y.push(y);
}
