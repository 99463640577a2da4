use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BOTTOM_FRACTION, DEFAULT_EPS_MULTIPLIER, DEFAULT_JUMP_THRESHOLD, DEFAULT_MIN_SAMPLES,
    DEFAULT_TOP_FRACTION,
};

/// Configuration for contour cleaning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Fraction of the contour's y-extent treated as the apex region.
    #[serde(default = "default_top_fraction")]
    pub top_fraction: f64,
    /// Fraction of each half profile's y-extent searched for the contact point.
    #[serde(default = "default_bottom_fraction")]
    pub bottom_fraction: f64,
    /// Largest gap (pixels) allowed between consecutive ordered points.
    #[serde(default = "default_jump_threshold")]
    pub jump_threshold: f64,
    /// Clustering radius as a multiple of the mean apex point spacing.
    #[serde(default = "default_eps_multiplier")]
    pub eps_multiplier: f64,
    /// Neighbours (self included) needed for a core point.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
}

fn default_top_fraction() -> f64 {
    DEFAULT_TOP_FRACTION
}
fn default_bottom_fraction() -> f64 {
    DEFAULT_BOTTOM_FRACTION
}
fn default_jump_threshold() -> f64 {
    DEFAULT_JUMP_THRESHOLD
}
fn default_eps_multiplier() -> f64 {
    DEFAULT_EPS_MULTIPLIER
}
fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            top_fraction: DEFAULT_TOP_FRACTION,
            bottom_fraction: DEFAULT_BOTTOM_FRACTION,
            jump_threshold: DEFAULT_JUMP_THRESHOLD,
            eps_multiplier: DEFAULT_EPS_MULTIPLIER,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}
