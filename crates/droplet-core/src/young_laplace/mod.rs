//! Young–Laplace drop-shape model.
//!
//! Two parametrizations are carried side by side:
//!
//! - [`pixel`]: Bashforth–Adams form in image pixels, parametrized by the
//!   tangent angle φ, with capillary length `a` and apex radius `b`.
//! - [`table`]: dimensionless arc-length form with the Bond number as the
//!   only shape parameter, plus the Bond-number sensitivity equations used
//!   for analytic Jacobians.
//!
//! Their Bond numbers are defined differently, see
//! [`crate::consts::PIXEL_BOND_SCALE`].

pub mod pixel;
pub mod table;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use pixel::{
    generate_pixel_profile, generate_pixel_profile_with, pixel_bond_number, PixelProfile,
    PixelSystem,
};
pub use table::{ProfileSystem, ProfileTable};

/// Which way gravity acts relative to the apex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropOrientation {
    /// Hanging from a needle; apex at the bottom of the image.
    #[default]
    Pendant,
    /// Resting on a substrate; apex at the top of the image.
    Sessile,
}

impl DropOrientation {
    /// Sign of the hydrostatic term in `dφ/ds = 2 + σ·Bo·z − sin φ / x`.
    pub fn gravity_sign(self) -> f64 {
        match self {
            Self::Pendant => -1.0,
            Self::Sessile => 1.0,
        }
    }

    /// Image-y direction of increasing model height `z`.
    pub fn image_sign(self) -> f64 {
        match self {
            Self::Pendant => -1.0,
            Self::Sessile => 1.0,
        }
    }
}

impl fmt::Display for DropOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pendant => write!(f, "pendant"),
            Self::Sessile => write!(f, "sessile"),
        }
    }
}
