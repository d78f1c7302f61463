//! Cross-validated candidate evaluation
//!
//! Every (candidate, fold) pair is an independent unit of work: fit the
//! candidate's recipe on the fold-train partition, fit its model on the
//! prepared matrix, transform and score the held-out partition. Units run on
//! a worker pool scoped to the evaluation run; a unit failure is recorded in
//! the ledger and does not abort the other units.

mod aggregate;
mod holdout;

pub use aggregate::{
    AveragedConfusion, ConfusionRecord, EvaluationReport, MetricRecord, MetricSummary,
    UnitReport, UnitStatus,
};
pub use holdout::{Holdout, HoldoutReport};

use crate::dataset::{feature_matrix, feature_matrix_for, outcome_array};
use crate::error::{FoldwiseError, Result};
use crate::metrics::{score_classifier, score_regressor, FoldScore};
use crate::model::Fitter;
use crate::preprocess::Recipe;
use crate::resample::Fold;
use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What kind of outcome a candidate predicts, which decides how it is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Binary outcome; scored with confusion-matrix metrics and ROC-AUC
    Classification,
    /// Count or continuous outcome; scored with RMSE and MAE
    Count,
}

/// A named pairing of a preprocessing recipe and a model fitter.
///
/// Candidates are independent; each unit evaluation fits its own recipe and
/// model, so nothing is shared or mutated across folds or candidates.
pub struct Candidate {
    name: String,
    task: Task,
    recipe: Recipe,
    fitter: Box<dyn Fitter>,
}

impl Candidate {
    /// A classification candidate
    pub fn classification(
        name: impl Into<String>,
        recipe: Recipe,
        fitter: impl Fitter + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            task: Task::Classification,
            recipe,
            fitter: Box::new(fitter),
        }
    }

    /// A count-outcome candidate
    pub fn count(name: impl Into<String>, recipe: Recipe, fitter: impl Fitter + 'static) -> Self {
        Self {
            name: name.into(),
            task: Task::Count,
            recipe,
            fitter: Box::new(fitter),
        }
    }

    /// Candidate name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scoring task
    pub fn task(&self) -> Task {
        self.task
    }

    /// Fit this candidate on a training frame and score it on another frame.
    ///
    /// The recipe is fit (and the training side augmented) on `train` only;
    /// `score` goes through the row-preserving transform path. When `fold` is
    /// given, backend faults are wrapped as [`FoldwiseError::FitterFailure`]
    /// naming this candidate and that fold; the holdout path passes `None`
    /// and lets failures propagate untouched (they are fatal there).
    pub(crate) fn fit_and_score(
        &self,
        train: &DataFrame,
        score: &DataFrame,
        outcome: &str,
        threshold: f64,
        fold: Option<usize>,
    ) -> Result<FoldScore> {
        let tag_fitter_fault = |e: FoldwiseError| match fold {
            Some(fold) => FoldwiseError::FitterFailure {
                candidate: self.name.clone(),
                fold,
                message: e.to_string(),
            },
            None => e,
        };

        let (fitted_recipe, prepared) = self.recipe.fit_transform(train)?;

        let (x, columns) = feature_matrix(&prepared, outcome)?;
        let y = outcome_array(&prepared, outcome)?;
        let model = self.fitter.fit(&x, &y).map_err(tag_fitter_fault)?;

        let transformed = fitted_recipe.transform(score)?;
        let x_score = feature_matrix_for(&transformed, &columns)?;
        let y_score = outcome_array(&transformed, outcome)?;

        match self.task {
            Task::Classification => {
                let proba = model.predict_proba(&x_score).map_err(tag_fitter_fault)?;
                score_classifier(&y_score, &proba, threshold)
            }
            Task::Count => {
                let predicted = model.predict(&x_score).map_err(tag_fitter_fault)?;
                score_regressor(&y_score, &predicted)
            }
        }
    }
}

/// Evaluator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Worker threads for unit evaluation; `None` uses the rayon default
    pub n_threads: Option<usize>,
    /// Decision threshold for classification confusion matrices
    pub threshold: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            n_threads: None,
            threshold: 0.5,
        }
    }
}

/// Runs every (candidate, fold) unit on a run-scoped worker pool.
///
/// The pool lives exactly as long as the evaluator; no global execution
/// context is registered or mutated.
pub struct Evaluator {
    config: EvaluatorConfig,
    pool: rayon::ThreadPool,
}

impl Evaluator {
    /// Build an evaluator and its worker pool
    pub fn new(config: EvaluatorConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.n_threads.unwrap_or(0))
            .build()
            .map_err(|e| FoldwiseError::ValidationError(format!("worker pool: {}", e)))?;
        Ok(Self { config, pool })
    }

    /// Evaluate every candidate on every fold of a training frame.
    ///
    /// The same folds are reused for all candidates, so comparisons are over
    /// identical partitions. Per-unit failures land in the report's ledger;
    /// only configuration-level problems (e.g. overlapping fold index
    /// vectors) abort the run.
    pub fn run(
        &self,
        training: &DataFrame,
        outcome: &str,
        folds: &[Fold],
        candidates: &[Candidate],
    ) -> Result<EvaluationReport> {
        if folds.is_empty() {
            return Err(FoldwiseError::ValidationError(
                "no folds to evaluate".to_string(),
            ));
        }

        // Safety net behind the structural guarantee: a fold whose partitions
        // overlap would leak validation rows into preprocessing fits.
        for fold in folds {
            if fold
                .validation_rows
                .iter()
                .any(|row| fold.train_rows.binary_search(row).is_ok())
            {
                return Err(FoldwiseError::Leakage(format!(
                    "fold {} train and validation partitions overlap",
                    fold.index
                )));
            }
        }

        let threshold = self.config.threshold;
        let units: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        let outcomes: Vec<(usize, usize, Result<FoldScore>)> = self.pool.install(|| {
            units
                .par_iter()
                .map(|&(c, f)| {
                    let result = evaluate_unit(training, outcome, &candidates[c], &folds[f], threshold);
                    (c, f, result)
                })
                .collect()
        });

        let mut records = Vec::new();
        let mut confusions = Vec::new();
        let mut ledger = Vec::new();

        for (c, f, result) in outcomes {
            let candidate = candidates[c].name().to_string();
            let fold = folds[f].index;
            match result {
                Ok(score) => {
                    debug!(candidate = %candidate, fold, "unit evaluated");
                    for (metric, outcome) in score.metrics {
                        records.push(MetricRecord {
                            candidate: candidate.clone(),
                            fold,
                            metric,
                            outcome,
                        });
                    }
                    if let Some(matrix) = score.confusion {
                        confusions.push(ConfusionRecord {
                            candidate: candidate.clone(),
                            fold,
                            matrix,
                        });
                    }
                    ledger.push(UnitReport {
                        candidate,
                        fold,
                        status: UnitStatus::Succeeded,
                    });
                }
                Err(e) => {
                    warn!(error = %e, candidate = %candidate, fold, "unit evaluation failed");
                    ledger.push(UnitReport {
                        candidate,
                        fold,
                        status: UnitStatus::Failed(e.to_string()),
                    });
                }
            }
        }

        Ok(EvaluationReport {
            records,
            confusions,
            ledger,
        })
    }
}

/// Evaluate one (candidate, fold) unit
fn evaluate_unit(
    training: &DataFrame,
    outcome: &str,
    candidate: &Candidate,
    fold: &Fold,
    threshold: f64,
) -> Result<FoldScore> {
    let fold_train = fold.train_frame(training)?;
    let fold_validation = fold.validation_frame(training)?;

    candidate.fit_and_score(
        &fold_train,
        &fold_validation,
        outcome,
        threshold,
        Some(fold.index),
    )
}
