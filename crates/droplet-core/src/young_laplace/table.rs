use std::f64::consts::PI;

use crate::consts::{PROFILE_START_ARC_LENGTH, PROFILE_TABLE_POINTS};
use crate::error::{DropletError, FitMode, Result};
use crate::ode::{integrate, Integrator, OdeOptions, OdeSystem};

use super::DropOrientation;

/// Dimensionless Young–Laplace equations in arc length, with the apex
/// radius as the length unit, plus their derivatives with respect to the
/// Bond number.
///
/// State `[x, z, φ, ∂x/∂Bo, ∂z/∂Bo, ∂φ/∂Bo]`.
#[derive(Clone, Copy, Debug)]
pub struct ProfileSystem {
    pub bond_number: f64,
    pub orientation: DropOrientation,
}

impl OdeSystem<6> for ProfileSystem {
    fn rhs(&self, _s: f64, y: &[f64; 6]) -> [f64; 6] {
        let [x, z, phi, x_b, z_b, phi_b] = *y;
        let sigma = self.orientation.gravity_sign();
        let bo = self.bond_number;
        let (sin_phi, cos_phi) = phi.sin_cos();
        [
            cos_phi,
            sin_phi,
            2.0 + sigma * bo * z - sin_phi / x,
            -sin_phi * phi_b,
            cos_phi * phi_b,
            sigma * z + sigma * bo * z_b - (cos_phi * phi_b * x - sin_phi * x_b) / (x * x),
        ]
    }
}

/// Uniform arc-length samples of one dimensionless profile.
///
/// Rebuilt wholesale whenever the Bond number or arc-length domain changes;
/// the apex radius only rescales it.
#[derive(Clone, Debug)]
pub struct ProfileTable {
    pub bond_number: f64,
    pub orientation: DropOrientation,
    /// Grid spacing.
    pub ds: f64,
    /// State per grid node, node `i` at `s = i·ds`.
    pub states: Vec<[f64; 6]>,
    derivatives: Vec<[f64; 6]>,
}

impl ProfileTable {
    /// Integrate from the apex to `s_max` with [`PROFILE_TABLE_POINTS`] nodes.
    ///
    /// The table ends early where the solution stops being finite or the
    /// profile returns to the axis.
    pub fn build(
        bond_number: f64,
        orientation: DropOrientation,
        s_max: f64,
        integrator: Integrator,
    ) -> Result<Self> {
        Self::build_with_points(bond_number, orientation, s_max, integrator, PROFILE_TABLE_POINTS)
    }

    pub fn build_with_points(
        bond_number: f64,
        orientation: DropOrientation,
        s_max: f64,
        integrator: Integrator,
        points: usize,
    ) -> Result<Self> {
        if !(s_max > PROFILE_START_ARC_LENGTH) || !bond_number.is_finite() || points < 2 {
            return Err(DropletError::InvalidInput(format!(
                "cannot tabulate profile with Bo={bond_number}, s_max={s_max}, {points} nodes"
            )));
        }
        let system = ProfileSystem {
            bond_number,
            orientation,
        };
        let ds = s_max / (points - 1) as f64;
        let options = OdeOptions {
            integrator,
            max_step: ds,
            ..OdeOptions::default()
        };

        let s0 = PROFILE_START_ARC_LENGTH;
        let start = series_state(s0);
        let trajectory = integrate(&system, s0, start, s_max, &options, None);

        let mut states = Vec::with_capacity(points);
        let mut derivatives = Vec::with_capacity(points);
        for i in 0..points {
            let s = i as f64 * ds;
            let state = if s <= s0 {
                Some(series_state(s))
            } else {
                trajectory.sample(s)
            };
            let Some(state) = state.filter(|st| st.iter().all(|v| v.is_finite())) else {
                break;
            };
            if i > 0 && state[0] <= 0.0 {
                break;
            }
            derivatives.push(if i == 0 {
                // Limit of the equations at the apex.
                [1.0, 0.0, 1.0, 0.0, 0.0, 0.0]
            } else {
                system.rhs(s, &state)
            });
            states.push(state);
        }

        if states.len() < 2 {
            return Err(DropletError::NonIntersectingGeometry {
                mode: FitMode::Tensiometry,
            });
        }
        Ok(Self {
            bond_number,
            orientation,
            ds,
            states,
            derivatives,
        })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Largest tabulated arc length.
    pub fn s_end(&self) -> f64 {
        (self.states.len().saturating_sub(1)) as f64 * self.ds
    }

    /// Cubic Hermite interpolation of the state, `s` clamped to the table.
    pub fn state_at(&self, s: f64) -> [f64; 6] {
        let s = s.clamp(0.0, self.s_end());
        let last = self.states.len() - 1;
        let i = ((s / self.ds).floor() as usize).min(last.saturating_sub(1));
        if last == 0 {
            return self.states[0];
        }
        let u = (s - i as f64 * self.ds) / self.ds;
        let h = self.ds;
        let h00 = (1.0 + 2.0 * u) * (1.0 - u) * (1.0 - u);
        let h10 = u * (1.0 - u) * (1.0 - u);
        let h01 = u * u * (3.0 - 2.0 * u);
        let h11 = u * u * (u - 1.0);
        let (y0, y1) = (&self.states[i], &self.states[i + 1]);
        let (d0, d1) = (&self.derivatives[i], &self.derivatives[i + 1]);
        std::array::from_fn(|k| h00 * y0[k] + h10 * h * d0[k] + h01 * y1[k] + h11 * h * d1[k])
    }

    /// Derivative of the state with respect to arc length at `s`.
    pub fn derivative_at(&self, s: f64) -> [f64; 6] {
        let state = self.state_at(s);
        if s <= PROFILE_START_ARC_LENGTH {
            return [1.0, s, 1.0, 0.0, 0.0, 0.0];
        }
        ProfileSystem {
            bond_number: self.bond_number,
            orientation: self.orientation,
        }
        .rhs(s, &state)
    }

    /// Dimensionless volume and surface area of the body of revolution traced
    /// from the apex to `s_limit`, by the trapezoidal rule over the grid.
    pub fn volume_and_area(&self, s_limit: f64) -> (f64, f64) {
        let s_limit = s_limit.clamp(0.0, self.s_end());
        let mut volume = 0.0;
        let mut area = 0.0;
        let mut prev: Option<(f64, [f64; 6])> = None;
        let nodes = (s_limit / self.ds).floor() as usize;
        let mut grid: Vec<f64> = (0..=nodes).map(|i| i as f64 * self.ds).collect();
        if s_limit - nodes as f64 * self.ds > 0.0 {
            grid.push(s_limit);
        }
        for s in grid {
            let st = self.state_at(s);
            if let Some((s_prev, p)) = prev {
                let h = s - s_prev;
                let dv = |q: &[f64; 6]| PI * q[0] * q[0] * q[2].sin();
                let da = |q: &[f64; 6]| 2.0 * PI * q[0];
                volume += 0.5 * h * (dv(&p) + dv(&st));
                area += 0.5 * h * (da(&p) + da(&st));
            }
            prev = Some((s, st));
        }
        (volume.abs(), area)
    }
}

/// Taylor start near the apex, where `x/s → 1` and the curvature is 1.
fn series_state(s: f64) -> [f64; 6] {
    [s, 0.5 * s * s, s, 0.0, 0.0, 0.0]
}
