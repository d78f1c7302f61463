//! Model fitter contract
//!
//! Fitters are pluggable and opaque: the evaluator only ever calls
//! [`Fitter::fit`] on a preprocessed training matrix and then
//! [`FittedModel::predict`] / [`FittedModel::predict_proba`] on held-out data.
//! Logistic regression, random forests, Poisson and zero-inflated Poisson
//! regressors all plug in from outside through this trait pair; the crate
//! itself ships only trivial baselines (see [`MajorityClass`] and
//! [`ConstantRate`]).

mod baseline;

pub use baseline::{ConstantRate, MajorityClass};

use crate::error::Result;
use ndarray::{Array1, Array2};

/// An unfitted model specification.
///
/// `fit` is stateless with respect to the fitter: every call produces a fresh
/// fitted model, so one fitter can be shared across all folds of a run.
pub trait Fitter: Send + Sync {
    /// Fitter name, used in reports and error messages
    fn name(&self) -> &str;

    /// Fit on a preprocessed training matrix and outcome vector
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Box<dyn FittedModel>>;
}

/// A fitted model, owned by a single fold evaluation and discarded after
/// scoring (except for the final model fit on full training data).
pub trait FittedModel: Send + Sync {
    /// Predicted label (classification) or predicted value (counts/regression)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Positive-class probability for classifiers. Backends without a
    /// probability estimate fall back to the hard prediction, which yields a
    /// degenerate but well-defined ROC curve.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict(x)
    }
}
