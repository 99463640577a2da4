use approx::assert_relative_eq;
use droplet_core::ode::{integrate, Integrator, OdeOptions, OdeSystem, Termination};

struct Decay {
    rate: f64,
}

impl OdeSystem<1> for Decay {
    fn rhs(&self, _t: f64, y: &[f64; 1]) -> [f64; 1] {
        [-self.rate * y[0]]
    }
}

struct Oscillator;

impl OdeSystem<2> for Oscillator {
    fn rhs(&self, _t: f64, y: &[f64; 2]) -> [f64; 2] {
        [y[1], -y[0]]
    }
}

#[test]
fn test_dormand_prince_exponential_decay() {
    let trajectory = integrate(&Decay { rate: 1.0 }, 0.0, [1.0], 1.0, &OdeOptions::default(), None);
    assert_eq!(trajectory.termination, Termination::Completed);
    let (t, y) = trajectory.last().unwrap();
    assert_relative_eq!(t, 1.0, epsilon = 1e-12);
    assert_relative_eq!(y[0], (-1.0_f64).exp(), max_relative = 1e-8);
}

#[test]
fn test_rosenbrock_stiff_decay() {
    let options = OdeOptions {
        integrator: Integrator::Rosenbrock,
        rtol: 1e-6,
        atol: 1e-9,
        ..OdeOptions::default()
    };
    let trajectory = integrate(&Decay { rate: 500.0 }, 0.0, [1.0], 0.01, &options, None);
    assert_eq!(trajectory.termination, Termination::Completed);
    let (_, y) = trajectory.last().unwrap();
    assert_relative_eq!(y[0], (-5.0_f64).exp(), max_relative = 1e-3);
}

#[test]
fn test_auto_falls_back_to_rosenbrock_when_stiff() {
    let stiff = Decay { rate: 1e4 };
    let options = |integrator| OdeOptions {
        integrator,
        rtol: 1e-3,
        atol: 1e-6,
        max_steps: 1_000,
        ..OdeOptions::default()
    };

    let explicit = integrate(&stiff, 0.0, [1.0], 1.0, &options(Integrator::DormandPrince), None);
    assert_eq!(explicit.termination, Termination::StepLimit);

    let auto = integrate(&stiff, 0.0, [1.0], 1.0, &options(Integrator::Auto), None);
    assert_eq!(auto.termination, Termination::Completed);
    let (t, y) = auto.last().unwrap();
    assert_relative_eq!(t, 1.0, epsilon = 1e-12);
    assert!(y[0].abs() < 1e-5, "y(1) = {}", y[0]);
}

#[test]
fn test_default_integrator_is_auto() {
    assert_eq!(Integrator::default(), Integrator::Auto);
    assert_eq!(OdeOptions::default().integrator, Integrator::Auto);
}

#[test]
fn test_backward_integration() {
    let trajectory = integrate(&Decay { rate: 1.0 }, 1.0, [1.0], 0.0, &OdeOptions::default(), None);
    let (t, y) = trajectory.last().unwrap();
    assert_relative_eq!(t, 0.0, epsilon = 1e-12);
    assert_relative_eq!(y[0], 1.0_f64.exp(), max_relative = 1e-8);
}

#[test]
fn test_event_stops_at_zero_crossing() {
    let crossing = |_t: f64, y: &[f64; 2]| y[0];
    let trajectory = integrate(
        &Oscillator,
        0.0,
        [1.0, 0.0],
        10.0,
        &OdeOptions::default(),
        Some(&crossing),
    );
    assert_eq!(trajectory.termination, Termination::Event);
    let (t, y) = trajectory.last().unwrap();
    assert_relative_eq!(t, std::f64::consts::FRAC_PI_2, epsilon = 1e-8);
    assert!(y[0].abs() < 1e-8);
}

#[test]
fn test_dense_sampling_between_steps() {
    let options = OdeOptions {
        max_step: 0.1,
        ..OdeOptions::default()
    };
    let trajectory = integrate(&Oscillator, 0.0, [1.0, 0.0], 3.0, &options, None);
    for i in 0..30 {
        let t = 0.05 + 0.1 * i as f64;
        let y = trajectory.sample(t).unwrap();
        assert_relative_eq!(y[0], t.cos(), epsilon = 1e-6);
    }
    assert!(trajectory.sample(3.5).is_none());
}

#[test]
fn test_step_limit() {
    let options = OdeOptions {
        max_steps: 3,
        max_step: 0.01,
        ..OdeOptions::default()
    };
    let trajectory = integrate(&Oscillator, 0.0, [1.0, 0.0], 1.0, &options, None);
    assert_eq!(trajectory.termination, Termination::StepLimit);
    assert!(trajectory.len() <= 4);
}
