mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use droplet_core::error::DropletError;
use droplet_core::fit::ContactAngleMethod;
use droplet_core::geometry::Point;
use droplet_core::pipeline::{
    analyze_batch, analyze_batch_reported, analyze_contact_angles, analyze_tension_batch,
    AnalysisConfig, AnalysisStage, ProgressReporter,
};
use droplet_core::tensiometry::{DropOrientation, DropParameters, TensiometryConfig};

#[derive(Default)]
struct CountingReporter {
    stages: Mutex<Vec<String>>,
    advances: AtomicUsize,
    finished: AtomicUsize,
}

impl ProgressReporter for CountingReporter {
    fn begin_stage(&self, stage: AnalysisStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage.to_string());
    }

    fn advance(&self, _items_done: usize) {
        self.advances.fetch_add(1, Ordering::Relaxed);
    }

    fn finish_stage(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }
}

fn geometric_config() -> AnalysisConfig {
    AnalysisConfig {
        methods: vec![
            ContactAngleMethod::Circle,
            ContactAngleMethod::Ellipse,
            ContactAngleMethod::Tangent,
            ContactAngleMethod::Polynomial,
        ],
        ..AnalysisConfig::default()
    }
}

fn frames() -> Vec<Vec<Point>> {
    vec![
        common::reference_drop(),
        common::circular_cap(40.0, 10.0, 241),
        vec![Point::new(0.0, 0.0), Point::new(1.0, -1.0), Point::new(2.0, 0.0)],
        common::elliptical_cap(60.0, 40.0, 20.0, 401),
        common::circular_cap(30.0, 15.0, 181),
    ]
}

#[test]
fn test_single_frame_runs_every_method() {
    let report =
        analyze_contact_angles(&common::reference_drop(), 0, &AnalysisConfig::default()).unwrap();
    assert_eq!(report.outcomes.len(), ContactAngleMethod::ALL.len());
    let methods: Vec<ContactAngleMethod> = report.outcomes.iter().map(|(m, _)| *m).collect();
    assert_eq!(methods, ContactAngleMethod::ALL.to_vec());

    let (_, circle) = report
        .outcomes
        .iter()
        .find(|(m, _)| *m == ContactAngleMethod::Circle)
        .unwrap();
    let circle = circle.as_ref().unwrap();
    assert_abs_diff_eq!(circle.angles().left, 120.0, epsilon = 1.0);
    assert!(report.timing.cleaning_ms >= 0.0);
    assert!(circle.timing().cleaning_ms == report.timing.cleaning_ms);
}

#[test]
fn test_rows_follow_successful_fits() {
    let report = analyze_contact_angles(&common::reference_drop(), 3, &geometric_config()).unwrap();
    assert_eq!(report.frame_index, 3);
    let rows = report.rows();
    assert_eq!(rows.len(), report.successes().count());
    for row in &rows {
        assert!(row.metrics.is_some());
        assert!(row.left_angle > 100.0 && row.left_angle < 140.0, "{row:?}");
    }
}

#[test]
fn test_batch_isolates_failing_frame() {
    let results = analyze_batch(&frames(), &geometric_config());
    assert_eq!(results.len(), 5);
    for (i, result) in results.iter().enumerate() {
        if i == 2 {
            match result {
                Err(DropletError::Frame { frame_index, .. }) => assert_eq!(*frame_index, 2),
                other => panic!("expected a frame error, got {other:?}"),
            }
        } else {
            let report = result.as_ref().unwrap();
            assert_eq!(report.frame_index, i);
            assert_eq!(report.outcomes.len(), 4);
        }
    }
}

#[test]
fn test_batch_matches_single_frame_analysis() {
    let config = geometric_config();
    let frames = frames();
    let batch = analyze_batch(&frames, &config);
    let single = analyze_contact_angles(&frames[3], 3, &config).unwrap();
    let batched = batch[3].as_ref().unwrap();
    for ((_, a), (_, b)) in batched.outcomes.iter().zip(single.outcomes.iter()) {
        let (a, b) = (a.as_ref().unwrap().angles(), b.as_ref().unwrap().angles());
        assert_eq!(a.left, b.left);
        assert_eq!(a.right, b.right);
    }
}

#[test]
fn test_reporter_sees_both_stages() {
    let reporter = Arc::new(CountingReporter::default());
    let frames = frames();
    let results = analyze_batch_reported(&frames, &geometric_config(), reporter.clone());
    assert_eq!(results.len(), frames.len());

    let stages = reporter.stages.lock().unwrap().clone();
    assert_eq!(
        stages,
        vec![
            AnalysisStage::Cleaning.to_string(),
            AnalysisStage::Fitting.to_string()
        ]
    );
    assert!(reporter.advances.load(Ordering::Relaxed) >= frames.len());
    assert_eq!(reporter.finished.load(Ordering::Relaxed), 2);
}

#[test]
fn test_tension_batch_flags_bad_frames() {
    let truth = DropParameters {
        apex_x: 300.0,
        apex_y: 400.0,
        apex_radius: 100.0,
        bond_number: 0.2,
        rotation: 0.0,
    };
    let outline = common::young_laplace_outline(truth, DropOrientation::Pendant, 2.9, 300);
    let frames = vec![outline, Vec::new()];
    let results = analyze_tension_batch(&frames, 127.0, &TensiometryConfig::default());
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(DropletError::Frame { frame_index: 1, .. })
    ));
}
