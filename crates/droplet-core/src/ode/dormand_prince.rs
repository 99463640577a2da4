//! Dormand–Prince 5(4) tableau.

use super::{combine, OdeSystem, StepOutcome};

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (also row 7 of the tableau, FSAL).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth minus fourth order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

/// One Dormand–Prince step of size `h` from `(t, y)` with `k1 = f(t, y)`.
pub(crate) fn step<const N: usize, S: OdeSystem<N>>(
    system: &S,
    t: f64,
    y: &[f64; N],
    k1: &[f64; N],
    h: f64,
) -> StepOutcome<N> {
    let k2 = system.rhs(t + C2 * h, &combine(y, &[(h * A21, k1)]));
    let k3 = system.rhs(t + C3 * h, &combine(y, &[(h * A31, k1), (h * A32, &k2)]));
    let k4 = system.rhs(
        t + C4 * h,
        &combine(y, &[(h * A41, k1), (h * A42, &k2), (h * A43, &k3)]),
    );
    let k5 = system.rhs(
        t + C5 * h,
        &combine(
            y,
            &[(h * A51, k1), (h * A52, &k2), (h * A53, &k3), (h * A54, &k4)],
        ),
    );
    let k6 = system.rhs(
        t + h,
        &combine(
            y,
            &[
                (h * A61, k1),
                (h * A62, &k2),
                (h * A63, &k3),
                (h * A64, &k4),
                (h * A65, &k5),
            ],
        ),
    );
    let y_new = combine(
        y,
        &[
            (h * B1, k1),
            (h * B3, &k3),
            (h * B4, &k4),
            (h * B5, &k5),
            (h * B6, &k6),
        ],
    );
    let k7 = system.rhs(t + h, &y_new);

    let zero = [0.0; N];
    let error = combine(
        &zero,
        &[
            (h * E1, k1),
            (h * E3, &k3),
            (h * E4, &k4),
            (h * E5, &k5),
            (h * E6, &k6),
            (h * E7, &k7),
        ],
    );

    StepOutcome { y: y_new, error }
}
