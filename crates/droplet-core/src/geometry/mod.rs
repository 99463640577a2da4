//! Shared planar geometry: points, baselines and curve-distance metrics.

pub mod baseline;
pub mod metrics;
pub mod point;

pub use baseline::Baseline;
pub use metrics::{closest_on_polyline, distance_to_polyline, ErrorMetrics};
pub use point::{mean_spacing, x_extent, y_extent, Point, Side};
