//! Baseline fitters
//!
//! These exist as diagnostic floors for candidate comparison: a real model
//! that cannot beat [`MajorityClass`] on sensitivity is learning nothing about
//! the minority class, however good its accuracy looks.

use super::{Fitter, FittedModel};
use crate::error::{FoldwiseError, Result};
use ndarray::{Array1, Array2};

/// Always predicts the majority class seen during fit.
///
/// `predict_proba` returns the positive-class prior, so ROC-AUC over this
/// baseline is undefined-or-0.5 by construction.
#[derive(Debug, Clone, Default)]
pub struct MajorityClass;

impl MajorityClass {
    pub fn new() -> Self {
        Self
    }
}

impl Fitter for MajorityClass {
    fn name(&self) -> &str {
        "majority_class"
    }

    fn fit(&self, _x: &Array2<f64>, y: &Array1<f64>) -> Result<Box<dyn FittedModel>> {
        if y.is_empty() {
            return Err(FoldwiseError::ValidationError(
                "cannot fit on an empty outcome vector".to_string(),
            ));
        }

        let n_pos = y.iter().filter(|&&v| v > 0.5).count();
        let prior = n_pos as f64 / y.len() as f64;
        let label = if prior > 0.5 { 1.0 } else { 0.0 };

        Ok(Box::new(FittedMajorityClass { label, prior }))
    }
}

#[derive(Debug, Clone)]
struct FittedMajorityClass {
    label: f64,
    prior: f64,
}

impl FittedModel for FittedMajorityClass {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(x.nrows(), self.label))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(x.nrows(), self.prior))
    }
}

/// Always predicts the mean outcome seen during fit.
///
/// The count-outcome analogue of [`MajorityClass`]: a Poisson or
/// zero-inflated backend should comfortably beat this on held-out error.
#[derive(Debug, Clone, Default)]
pub struct ConstantRate;

impl ConstantRate {
    pub fn new() -> Self {
        Self
    }
}

impl Fitter for ConstantRate {
    fn name(&self) -> &str {
        "constant_rate"
    }

    fn fit(&self, _x: &Array2<f64>, y: &Array1<f64>) -> Result<Box<dyn FittedModel>> {
        if y.is_empty() {
            return Err(FoldwiseError::ValidationError(
                "cannot fit on an empty outcome vector".to_string(),
            ));
        }
        let rate = y.sum() / y.len() as f64;
        Ok(Box::new(FittedConstantRate { rate }))
    }
}

#[derive(Debug, Clone)]
struct FittedConstantRate {
    rate: f64,
}

impl FittedModel for FittedConstantRate {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(x.nrows(), self.rate))
    }
}
