//! Final fit and single-use holdout evaluation
//!
//! After cross-validation has compared candidates, the chosen candidate is
//! refit on the full training partition and scored once on the testing
//! partition. That is the only point the test set is touched; a second
//! evaluation attempt returns [`FoldwiseError::HoldoutConsumed`] so the
//! holdout estimate stays unbiased. Failures here are fatal - there is no
//! fallback holdout data.

use super::Candidate;
use crate::error::{FoldwiseError, Result};
use crate::metrics::FoldScore;
use crate::resample::TrainTestSplit;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Result of the one-time holdout evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldoutReport {
    pub candidate: String,
    pub score: FoldScore,
}

/// Owns the training/testing partitions and enforces single use of testing
pub struct Holdout {
    training: DataFrame,
    testing: DataFrame,
    outcome: String,
    consumed: bool,
}

impl Holdout {
    /// Take ownership of an initial split's partitions
    pub fn new(split: TrainTestSplit, outcome: impl Into<String>) -> Self {
        Self {
            training: split.training,
            testing: split.testing,
            outcome: outcome.into(),
            consumed: false,
        }
    }

    /// The training partition, available for fold generation and evaluation
    pub fn training(&self) -> &DataFrame {
        &self.training
    }

    /// Whether the testing partition has already been evaluated
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Fit the candidate on full training data and score it on the holdout.
    ///
    /// The testing partition is marked consumed on entry, so even a failed
    /// attempt counts as the one permitted use.
    pub fn evaluate(&mut self, candidate: &Candidate, threshold: f64) -> Result<HoldoutReport> {
        if self.consumed {
            return Err(FoldwiseError::HoldoutConsumed);
        }
        self.consumed = true;

        info!(candidate = %candidate.name(), "final fit and holdout evaluation");
        let score = candidate.fit_and_score(
            &self.training,
            &self.testing,
            &self.outcome,
            threshold,
            None,
        )?;

        Ok(HoldoutReport {
            candidate: candidate.name().to_string(),
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MajorityClass;
    use crate::preprocess::Recipe;
    use crate::resample::initial_split;
    use polars::prelude::*;

    fn dataset() -> DataFrame {
        let n = 40;
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<i64> = (0..n).map(|i| if i % 4 == 0 { 1 } else { 0 }).collect();
        df!("x" => &x, "y" => &y).unwrap()
    }

    #[test]
    fn test_holdout_evaluates_once() {
        let split = initial_split(&dataset(), "y", 0.75, 5).unwrap();
        let mut holdout = Holdout::new(split, "y");
        let candidate = Candidate::classification("baseline", Recipe::new(), MajorityClass::new());

        let report = holdout.evaluate(&candidate, 0.5).unwrap();
        assert_eq!(report.candidate, "baseline");
        assert!(report.score.confusion.is_some());
        assert!(holdout.is_consumed());
    }

    #[test]
    fn test_second_evaluation_rejected() {
        let split = initial_split(&dataset(), "y", 0.75, 5).unwrap();
        let mut holdout = Holdout::new(split, "y");
        let candidate = Candidate::classification("baseline", Recipe::new(), MajorityClass::new());

        holdout.evaluate(&candidate, 0.5).unwrap();
        let second = holdout.evaluate(&candidate, 0.5);
        assert!(matches!(second, Err(FoldwiseError::HoldoutConsumed)));
    }
}
