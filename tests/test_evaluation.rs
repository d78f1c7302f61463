//! Integration test: cross-validated evaluation end-to-end

use foldwise::prelude::*;
use polars::prelude::*;

/// 100 records with a 90/10 binary outcome and two weak numeric features
fn imbalanced_dataset() -> DataFrame {
    let n = 100;
    let y: Vec<i64> = (0..n).map(|i| if i % 10 == 0 { 1 } else { 0 }).collect();
    let x1: Vec<f64> = (0..n).map(|i| (i as f64 / 10.0).sin()).collect();
    let x2: Vec<f64> = (0..n).map(|i| i as f64 / 100.0).collect();
    df!("x1" => &x1, "x2" => &x2, "y" => &y).unwrap()
}

fn oversampled_candidate() -> Candidate {
    let recipe = Recipe::new()
        .then(MedianImpute::all_numeric())
        .then(Oversample::new("y").with_seed(9));
    Candidate::classification("majority_oversampled", recipe, MajorityClass::new())
}

#[test]
fn test_class_imbalance_diagnostic() {
    // The always-predict-majority baseline scores high accuracy but zero
    // sensitivity on an imbalanced outcome - the diagnostic this whole
    // workflow exists to surface.
    let df = imbalanced_dataset();
    let folds = vfold(&df, 5, "y", 42).unwrap();
    let candidates = vec![oversampled_candidate()];

    let evaluator = Evaluator::new(EvaluatorConfig::default()).unwrap();
    let report = evaluator.run(&df, "y", &folds, &candidates).unwrap();
    assert!(report.failed_units().is_empty());

    let summary = report.summarize();
    let metrics = &summary["majority_oversampled"];

    let accuracy = metrics["accuracy"];
    let sensitivity = metrics["sensitivity"];
    assert!(
        accuracy.mean > 0.85,
        "majority baseline should look accurate, got {}",
        accuracy.mean
    );
    assert!(
        sensitivity.mean < 0.05,
        "majority baseline should have near-zero sensitivity, got {}",
        sensitivity.mean
    );
    // Every fold had positives, so sensitivity was defined on all 5
    assert_eq!(sensitivity.n_folds, 5);
}

#[test]
fn test_identical_folds_across_candidates_and_runs() {
    let df = imbalanced_dataset();
    let folds = vfold(&df, 5, "y", 42).unwrap();

    let evaluator = Evaluator::new(EvaluatorConfig::default()).unwrap();
    let report_a = evaluator
        .run(&df, "y", &folds, &[oversampled_candidate()])
        .unwrap();
    let report_b = evaluator
        .run(&df, "y", &folds, &[oversampled_candidate()])
        .unwrap();

    // Same folds + deterministic steps => identical summaries
    assert_eq!(report_a.summarize(), report_b.summarize());
}

#[test]
fn test_confusion_matrices_reported_per_fold() {
    let df = imbalanced_dataset();
    let folds = vfold(&df, 5, "y", 42).unwrap();
    let evaluator = Evaluator::new(EvaluatorConfig::default()).unwrap();
    let report = evaluator
        .run(&df, "y", &folds, &[oversampled_candidate()])
        .unwrap();

    assert_eq!(report.confusions.len(), 5);
    let averaged = report.average_confusion_matrix();
    let avg = averaged["majority_oversampled"];
    // 20 validation records per fold, on average
    assert!((avg.tp + avg.fp + avg.tn + avg.fn_ - 20.0).abs() < 1e-9);
    // Majority baseline never predicts positive
    assert_eq!(avg.tp, 0.0);
    assert_eq!(avg.fp, 0.0);
}

#[test]
fn test_full_workflow_with_holdout() {
    let df = imbalanced_dataset();
    let split = initial_split(&df, "y", 0.8, 7).unwrap();
    assert_eq!(split.training.height() + split.testing.height(), 100);

    let mut holdout = Holdout::new(split, "y");
    let folds = vfold(holdout.training(), 4, "y", 7).unwrap();

    let evaluator = Evaluator::new(EvaluatorConfig::default()).unwrap();
    let report = evaluator
        .run(holdout.training(), "y", &folds, &[oversampled_candidate()])
        .unwrap();
    assert!(report.failed_units().is_empty());

    // Final fit on full training, scored once on the holdout
    let final_report = holdout.evaluate(&oversampled_candidate(), 0.5).unwrap();
    let confusion = final_report.score.confusion.expect("classification confusion");
    assert_eq!(confusion.total(), 20);

    // The holdout is single-use
    let second = holdout.evaluate(&oversampled_candidate(), 0.5);
    assert!(matches!(second, Err(FoldwiseError::HoldoutConsumed)));
}

#[test]
fn test_count_candidate_scored_with_error_metrics() {
    let n = 60;
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let counts: Vec<i64> = (0..n).map(|i| (i % 5) as i64).collect();
    let strata: Vec<i64> = (0..n).map(|i| (i % 2) as i64).collect();
    let df = df!("x" => &x, "n_events" => &counts, "grp" => &strata).unwrap();

    let folds = vfold(&df, 4, "grp", 3).unwrap();
    let candidates = vec![Candidate::count(
        "constant_rate",
        Recipe::new(),
        ConstantRate::new(),
    )];

    let evaluator = Evaluator::new(EvaluatorConfig::default()).unwrap();
    let report = evaluator.run(&df, "n_events", &folds, &candidates).unwrap();
    assert!(report.failed_units().is_empty());

    let summary = report.summarize();
    let metrics = &summary["constant_rate"];
    assert!(metrics.contains_key("rmse"));
    assert!(metrics.contains_key("mae"));
    // No confusion matrices for count outcomes
    assert!(report.confusions.is_empty());
}
