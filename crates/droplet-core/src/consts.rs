/// Minimum point count to use Rayon parallelism for the O(n²) neighbour search.
pub const PARALLEL_POINT_THRESHOLD: usize = 2_048;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Contour cleaning
// ---------------------------------------------------------------------------

/// Fewest raw points a contour may have before apex isolation is attempted.
pub const MIN_CONTOUR_POINTS: usize = 6;

/// Fewest points the top fraction must contain to estimate point spacing.
pub const MIN_APEX_POINTS: usize = 2;

/// Contours shorter than this still clean, but raise a warning.
pub const RECOMMENDED_CONTOUR_POINTS: usize = 50;

/// Default fraction of the y-extent treated as the apex region (20%).
pub const DEFAULT_TOP_FRACTION: f64 = 0.2;

/// Default fraction of a half profile's y-extent searched for the contact point (10%).
pub const DEFAULT_BOTTOM_FRACTION: f64 = 0.1;

/// Default largest allowed gap (pixels) between consecutive ordered points.
pub const DEFAULT_JUMP_THRESHOLD: f64 = 5.0;

/// Default DBSCAN radius as a multiple of the mean apex point spacing.
pub const DEFAULT_EPS_MULTIPLIER: f64 = 3.0;

/// Default DBSCAN core-point neighbour count (the point itself included).
pub const DEFAULT_MIN_SAMPLES: usize = 3;

/// Half-height of a baseline level band, as a multiple of the apex point spacing.
pub const BASELINE_LEVEL_TOLERANCE: f64 = 0.5;

/// Fewest points one half must hold on a single level for it to count as a baseline.
pub const BASELINE_MIN_POINTS: usize = 10;

/// Furthest a contact point is extrapolated onto the baseline, in apex point spacings.
pub const BASELINE_MAX_REACH: f64 = 2.0;

// ---------------------------------------------------------------------------
// Geometric fitters
// ---------------------------------------------------------------------------

/// Samples used to densely resample a fitted closed curve for error metrics.
pub const CURVE_RESAMPLE_POINTS: usize = 3_600;

/// Samples used per side when resampling a fitted polynomial.
pub const POLYNOMIAL_RESAMPLE_POINTS: usize = 1_000;

/// Default number of points next to each contact point used by the polynomial fit.
pub const DEFAULT_POLYNOMIAL_POINTS: usize = 15;

/// Gauss–Newton iterations for the geometric circle refinement.
pub const CIRCLE_REFINE_ITERATIONS: usize = 50;

/// Absolute center step (pixels) below which circle refinement stops.
pub const CIRCLE_REFINE_TOLERANCE: f64 = 1e-10;

// ---------------------------------------------------------------------------
// Young–Laplace model
// ---------------------------------------------------------------------------

/// Scale between the pixel-mode Bond number `b²/a²` and the reported value.
///
/// The pixel-mode formula reports `18·b²/a²` while the physical mode reports
/// `Δρ g R₀² / γ`. Both are kept as-is; they are not reconciled.
pub const PIXEL_BOND_SCALE: f64 = 18.0;

/// Distance from the symmetry axis at which apex integration starts.
pub const APEX_START_OFFSET: f64 = 1e-5;

/// Samples per side requested from the pixel-mode integration.
pub const PIXEL_PROFILE_SAMPLES: usize = 500;

/// Default capillary length guess as a multiple of the circle radius.
pub const INITIAL_CAPILLARY_RATIO: f64 = 3.0;

/// Rows in a freshly generated physical `ProfileTable`.
pub const PROFILE_TABLE_POINTS: usize = 1_000;

/// Dimensionless arc length at which the physical integration starts.
pub const PROFILE_START_ARC_LENGTH: f64 = 1e-6;

/// Relative tolerance for the adaptive ODE integrators.
pub const ODE_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Absolute tolerance for the adaptive ODE integrators.
pub const ODE_ABSOLUTE_TOLERANCE: f64 = 1e-11;

/// Upper bound on integrator steps for a single solve.
pub const ODE_MAX_STEPS: usize = 200_000;

// ---------------------------------------------------------------------------
// Optimizers
// ---------------------------------------------------------------------------

/// Default Nelder–Mead iteration budget per free parameter.
pub const NELDER_MEAD_ITERATIONS_PER_PARAM: usize = 400;

/// Default Nelder–Mead absolute simplex-size tolerance.
pub const NELDER_MEAD_X_TOLERANCE: f64 = 1e-6;

/// Default Nelder–Mead absolute objective-spread tolerance.
pub const NELDER_MEAD_F_TOLERANCE: f64 = 1e-10;

/// Default maximum relative parameter change for Levenberg–Marquardt convergence.
pub const DEFAULT_DELTA_TOL: f64 = 1e-8;

/// Default scaled gradient threshold for Levenberg–Marquardt convergence.
pub const DEFAULT_GRADIENT_TOL: f64 = 1e-10;

/// Default relative objective change treated as converged.
pub const DEFAULT_OBJECTIVE_TOL: f64 = 1e-12;

/// Default Levenberg–Marquardt iteration budget.
pub const DEFAULT_MAX_FITTING_STEPS: usize = 100;

/// Default arc-length Newton tolerance (dimensionless).
pub const DEFAULT_ARCLENGTH_TOL: f64 = 1e-8;

/// Default arc-length Newton iteration budget.
pub const DEFAULT_MAX_ARCLENGTH_STEPS: usize = 10;

/// Default relative parameter change for needle convergence.
pub const DEFAULT_NEEDLE_TOL: f64 = 1e-6;

/// Default needle Gauss–Newton iteration budget.
pub const DEFAULT_NEEDLE_STEPS: usize = 20;

/// Reduction ratio below which the damping factor is increased.
pub const LM_RHO: f64 = 0.25;

/// Reduction ratio above which the damping factor is halved.
pub const LM_SIGMA: f64 = 0.75;

/// Initial arc-length matching window as a fraction of the table's max arc length.
pub const ARCLENGTH_WINDOW_FRACTION: f64 = 0.05;

/// Times the arc-length domain may be extended during one fit.
pub const MAX_DOMAIN_EXTENSIONS: usize = 4;

/// Growth factor applied to the arc-length domain when extended.
pub const DOMAIN_EXTENSION_FACTOR: f64 = 1.5;

/// Default initial Bond number for tensiometry fits.
pub const INITIAL_BOND_NUMBER: f64 = 0.1;

/// Fraction of the pendant profile height used to estimate the apex radius.
pub const APEX_REGION_FRACTION: f64 = 0.2;

// ---------------------------------------------------------------------------
// Physical constants and ML boundary
// ---------------------------------------------------------------------------

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Default density of the drop phase (water) in kg/m³.
pub const DEFAULT_DROP_DENSITY: f64 = 1000.0;

/// Default density of the continuous phase (air) in kg/m³.
pub const DEFAULT_CONTINUOUS_DENSITY: f64 = 1.225;

/// Default needle outer diameter in millimetres.
pub const DEFAULT_NEEDLE_DIAMETER_MM: f64 = 1.27;

/// Default fixed row count of each half profile fed to the ML predictor.
pub const DEFAULT_ML_INPUT_LENGTH: usize = 1_223;
