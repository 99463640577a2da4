use droplet_core::fit::{
    ContactAngleMethod, ContactAngles, FitResult, FitStatus, PredictedFit, Timing,
};
use droplet_core::error::{FitMode, Warning};
use droplet_core::ode::Integrator;
use droplet_core::pipeline::{AnalysisConfig, AnalysisStage};
use droplet_core::tensiometry::DropOrientation;

#[test]
fn test_default_config_toml_round_trip() {
    let config = AnalysisConfig::default();
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: AnalysisConfig = toml::from_str(&text).unwrap();

    assert_eq!(parsed.methods, config.methods);
    assert_eq!(parsed.clean.jump_threshold, config.clean.jump_threshold);
    assert_eq!(parsed.fit.polynomial.points, config.fit.polynomial.points);
    assert_eq!(parsed.tensiometry.tolerances, config.tensiometry.tolerances);
    assert_eq!(parsed.tensiometry.physical, config.tensiometry.physical);
}

#[test]
fn test_empty_toml_gives_defaults() {
    let parsed: AnalysisConfig = toml::from_str("").unwrap();
    let defaults = AnalysisConfig::default();
    assert_eq!(parsed.methods, ContactAngleMethod::ALL.to_vec());
    assert_eq!(parsed.clean.min_samples, defaults.clean.min_samples);
    assert!(parsed.fit.circle.round_to_pixel);
    assert_eq!(parsed.tensiometry.orientation, DropOrientation::Pendant);
}

#[test]
fn test_partial_toml_overrides_only_named_fields() {
    let text = r#"
        methods = ["Circle", "Ellipse"]

        [clean]
        jump_threshold = 8.0

        [tensiometry]
        orientation = "Sessile"
        integrator = "Rosenbrock"

        [tensiometry.physical]
        drop_density = 1260.0
    "#;
    let parsed: AnalysisConfig = toml::from_str(text).unwrap();
    let defaults = AnalysisConfig::default();

    assert_eq!(
        parsed.methods,
        vec![ContactAngleMethod::Circle, ContactAngleMethod::Ellipse]
    );
    assert_eq!(parsed.clean.jump_threshold, 8.0);
    assert_eq!(parsed.clean.top_fraction, defaults.clean.top_fraction);
    assert_eq!(parsed.tensiometry.orientation, DropOrientation::Sessile);
    assert_eq!(parsed.tensiometry.integrator, Integrator::Rosenbrock);
    assert_eq!(parsed.tensiometry.physical.drop_density, 1260.0);
    assert_eq!(
        parsed.tensiometry.physical.needle_diameter_mm,
        defaults.tensiometry.physical.needle_diameter_mm
    );
}

#[test]
fn test_unknown_method_is_rejected() {
    assert!(toml::from_str::<AnalysisConfig>(r#"methods = ["Spline"]"#).is_err());
}

#[test]
fn test_display_names() {
    assert_eq!(ContactAngleMethod::YoungLaplace.to_string(), "Young-Laplace");
    assert_eq!(ContactAngleMethod::Tangent.to_string(), "Tangent");
    assert_eq!(Integrator::DormandPrince.to_string(), "Dormand-Prince 5(4)");
    assert_eq!(DropOrientation::Sessile.to_string(), "sessile");
    assert_eq!(FitMode::Tensiometry.to_string(), "tensiometry fit");
    assert_eq!(AnalysisStage::Cleaning.to_string(), "Cleaning contours");
}

#[test]
fn test_fit_result_json_round_trip() {
    let result = FitResult::Predicted(PredictedFit {
        angles: ContactAngles {
            left: 101.5,
            right: 99.25,
        },
        timing: Timing {
            cleaning_ms: 1.5,
            fitting_ms: 3.0,
        },
        warnings: vec![Warning::ProfileSubsampled {
            original: 300,
            length: 100,
        }],
    });
    let json = serde_json::to_string(&result).unwrap();
    let back: FitResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.angles(), result.angles());
    assert_eq!(back.timing(), result.timing());
    match back {
        FitResult::Predicted(fit) => assert_eq!(fit.warnings.len(), 1),
        other => panic!("unexpected {}", other.method_name()),
    }

    let status = FitStatus::Converged { iterations: 7 };
    let json = serde_json::to_string(&status).unwrap();
    assert_eq!(serde_json::from_str::<FitStatus>(&json).unwrap(), status);
}
