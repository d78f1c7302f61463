//! Integration test: preprocessing recipes end-to-end

use foldwise::prelude::*;
use polars::prelude::*;

fn climbing_df() -> DataFrame {
    df!(
        "age" => &[Some(25.0), None, Some(35.0), Some(45.0), Some(30.0), None, Some(50.0), Some(41.0)],
        "season" => &["spring", "spring", "autumn", "autumn", "spring", "winter", "spring", "autumn"],
        "success" => &[1i64, 0, 0, 0, 1, 0, 0, 0],
    )
    .unwrap()
}

fn full_recipe() -> Recipe {
    Recipe::new()
        .then(MedianImpute::all_numeric())
        .then(CollapseRare::all_categorical(0.25))
        .then(DummyEncode::all_categorical())
        .then(Oversample::new("success").with_seed(11))
}

#[test]
fn test_fit_transform_augments_training_only() {
    let df = climbing_df();
    let (fitted, train) = full_recipe().fit_transform(&df).unwrap();

    // Oversampling raised the minority count: 6 negatives + 6 positives
    assert_eq!(train.height(), 12);
    // Scoring path never changes the row count
    let scored = fitted.transform(&df).unwrap();
    assert_eq!(scored.height(), df.height());
}

#[test]
fn test_recipe_output_is_model_ready() {
    let df = climbing_df();
    let (_, train) = full_recipe().fit_transform(&df).unwrap();

    // No missing values and no raw string columns remain
    for col in train.get_columns() {
        assert_eq!(col.null_count(), 0, "column {} still has nulls", col.name());
        assert!(
            !matches!(col.dtype(), DataType::String),
            "column {} is still a string",
            col.name()
        );
    }
    // Rare "winter" level was pooled before encoding
    assert!(train.column("season_other").is_ok());
    assert!(train.column("season_winter").is_err());
}

#[test]
fn test_transform_learned_nothing_from_scoring_data() {
    let train = climbing_df();
    let fitted = full_recipe().fit(&train).unwrap();

    // A frame with an unseen season level and a missing age
    let test = df!(
        "age" => &[None::<f64>, Some(60.0)],
        "season" => &["monsoon", "spring"],
        "success" => &[1i64, 0],
    )
    .unwrap();

    let out = fitted.transform(&test).unwrap();
    assert_eq!(out.height(), 2);

    // Missing age filled with the *training* median (35.0, 41.0, 45.0, 25.0, 30.0, 50.0 -> 38.0)
    let age = out.column("age").unwrap().f64().unwrap();
    assert!((age.get(0).unwrap() - 38.0).abs() < 1e-9);

    // Unseen level routed through the pooled "other" indicator
    let other = out.column("season_other").unwrap().f64().unwrap();
    assert_eq!(other.get(0), Some(1.0));
}

#[test]
fn test_fitted_recipe_is_deterministic() {
    let df = climbing_df();
    let fitted = full_recipe().fit(&df).unwrap();
    let a = fitted.transform(&df).unwrap();
    let b = fitted.transform(&df).unwrap();
    assert!(a.equals(&b), "transform must be deterministic");
}
