use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Side};
use crate::young_laplace::DropOrientation;

/// Number of fitted parameters.
pub const PARAMETER_COUNT: usize = 5;

/// Five-parameter drop model: apex position and radius in pixels, Bond
/// number, and rotation of the symmetry axis in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropParameters {
    pub apex_x: f64,
    pub apex_y: f64,
    pub apex_radius: f64,
    pub bond_number: f64,
    pub rotation: f64,
}

impl DropParameters {
    pub fn to_array(&self) -> [f64; PARAMETER_COUNT] {
        [
            self.apex_x,
            self.apex_y,
            self.apex_radius,
            self.bond_number,
            self.rotation,
        ]
    }

    pub fn from_array(v: [f64; PARAMETER_COUNT]) -> Self {
        Self {
            apex_x: v[0],
            apex_y: v[1],
            apex_radius: v[2],
            bond_number: v[3],
            rotation: v[4],
        }
    }

    /// Candidate `self + delta`; the receiver is left untouched.
    pub fn stepped(&self, delta: &[f64; PARAMETER_COUNT]) -> Self {
        let p = self.to_array();
        Self::from_array(std::array::from_fn(|i| p[i] + delta[i]))
    }

    pub fn is_physical(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
            && self.apex_radius > 0.0
            && self.bond_number >= 0.0
    }

    pub fn apex(&self) -> Point {
        Point::new(self.apex_x, self.apex_y)
    }
}

/// Maps dimensionless model coordinates onto the image for a fixed
/// parameter set.
#[derive(Clone, Copy, Debug)]
pub struct ImageMapping {
    pub params: DropParameters,
    pub orientation: DropOrientation,
    sin_w: f64,
    cos_w: f64,
}

impl ImageMapping {
    pub fn new(params: DropParameters, orientation: DropOrientation) -> Self {
        let (sin_w, cos_w) = params.rotation.sin_cos();
        Self {
            params,
            orientation,
            sin_w,
            cos_w,
        }
    }

    fn side_sign(side: Side) -> f64 {
        match side {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    fn rotate(&self, d: Point) -> Point {
        Point::new(
            self.cos_w * d.x - self.sin_w * d.y,
            self.sin_w * d.x + self.cos_w * d.y,
        )
    }

    fn unrotate(&self, d: Point) -> Point {
        Point::new(
            self.cos_w * d.x + self.sin_w * d.y,
            -self.sin_w * d.x + self.cos_w * d.y,
        )
    }

    /// Unrotated image offset of a dimensionless direction `(x̃, z̃)`.
    fn scaled(&self, x: f64, z: f64, side: Side) -> Point {
        let r0 = self.params.apex_radius;
        Point::new(
            Self::side_sign(side) * r0 * x,
            self.orientation.image_sign() * r0 * z,
        )
    }

    /// Image position of the model point `(x̃, z̃)` on `side`.
    pub fn to_image(&self, x: f64, z: f64, side: Side) -> Point {
        self.params.apex() + self.rotate(self.scaled(x, z, side))
    }

    /// Dimensionless model coordinates of an image point, with the side of
    /// the symmetry axis it falls on.
    pub fn to_model(&self, p: Point) -> (Point, Side) {
        let d = self.unrotate(p - self.params.apex());
        let r0 = self.params.apex_radius;
        let side = if d.x < 0.0 { Side::Left } else { Side::Right };
        (
            Point::new(d.x.abs() / r0, self.orientation.image_sign() * d.y / r0),
            side,
        )
    }

    /// Image-space tangent `∂P/∂s` for the model state at arc length `s`.
    pub fn tangent(&self, phi: f64, side: Side) -> Point {
        let (sin_phi, cos_phi) = phi.sin_cos();
        self.rotate(self.scaled(cos_phi, sin_phi, side))
    }

    /// `∂P/∂p` for each parameter, given `[x, z, φ, x_B, z_B, φ_B]` at the
    /// matched arc length.
    pub fn parameter_derivatives(&self, state: &[f64; 6], side: Side) -> [Point; PARAMETER_COUNT] {
        let [x, z, _, x_b, z_b, _] = *state;
        let r0 = self.params.apex_radius;
        let offset = self.rotate(self.scaled(x, z, side));
        [
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            offset * (1.0 / r0),
            self.rotate(self.scaled(x_b, z_b, side)),
            offset.perp(),
        ]
    }
}
