//! Foldwise - Resampled model evaluation
//!
//! This crate provides the machinery for comparing candidate models under
//! V-fold cross-validation:
//! - Stratified train/test splitting and fold generation
//! - Recipe-based, leakage-safe preprocessing (fit on fold-train only)
//! - Pluggable model fitters scored on held-out folds
//! - Classification metrics with explicit handling of undefined values
//! - Per-fold metric records aggregated into mean / standard-error summaries
//! - A single-use final fit and holdout evaluation
//!
//! # Modules
//!
//! - [`dataset`] - Dataset wrapper, CSV ingestion, frame/matrix conversion
//! - [`resample`] - Stratified splits and V-fold partitions
//! - [`preprocess`] - Ordered preprocessing recipes and steps
//! - [`model`] - Fitter contract and baseline fitters
//! - [`metrics`] - Confusion matrix, accuracy, sensitivity, specificity, ROC-AUC
//! - [`evaluate`] - Cross-validated evaluation, aggregation, holdout

pub mod error;

pub mod dataset;
pub mod resample;
pub mod preprocess;
pub mod model;
pub mod metrics;
pub mod evaluate;

pub use error::{FoldwiseError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{FoldwiseError, Result};

    // Data
    pub use crate::dataset::Dataset;

    // Resampling
    pub use crate::resample::{initial_split, vfold, Fold, TrainTestSplit};

    // Preprocessing
    pub use crate::preprocess::{
        CollapseRare, DummyEncode, FittedRecipe, FittedStep, MedianImpute, Oversample, Recipe,
        Step,
    };

    // Models
    pub use crate::model::{ConstantRate, Fitter, FittedModel, MajorityClass};

    // Metrics
    pub use crate::metrics::{score_classifier, ConfusionMatrix, FoldScore, MetricOutcome};

    // Evaluation
    pub use crate::evaluate::{
        Candidate, EvaluationReport, Evaluator, EvaluatorConfig, Holdout, MetricRecord,
        MetricSummary, UnitReport, UnitStatus,
    };
}
