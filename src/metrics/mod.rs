//! Evaluation metrics
//!
//! Classification metrics are computed from a raw confusion matrix which is
//! kept and reported per fold. A metric whose denominator is empty (e.g.
//! sensitivity on a fold with no positive records) is reported as
//! [`MetricOutcome::Undefined`] - never substituted with a default value.

use crate::error::Result;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric name: area under the ROC curve
pub const ROC_AUC: &str = "roc_auc";
/// Metric name: fraction of correct predictions
pub const ACCURACY: &str = "accuracy";
/// Metric name: true-positive rate
pub const SENSITIVITY: &str = "sensitivity";
/// Metric name: true-negative rate
pub const SPECIFICITY: &str = "specificity";
/// Metric name: root mean squared error
pub const RMSE: &str = "rmse";
/// Metric name: mean absolute error
pub const MAE: &str = "mae";

/// Raw confusion-matrix counts for one fold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Build from counts
    pub fn new(tp: usize, fp: usize, tn: usize, fn_: usize) -> Self {
        Self { tp, fp, tn, fn_ }
    }

    /// Count labels against truth, thresholding predicted scores at `threshold`
    pub fn from_scores(y_true: &Array1<f64>, scores: &Array1<f64>, threshold: f64) -> Self {
        let mut cm = Self::new(0, 0, 0, 0);
        for (t, s) in y_true.iter().zip(scores.iter()) {
            let t_pos = *t > 0.5;
            let p_pos = *s > threshold;
            match (t_pos, p_pos) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    /// Total number of scored records
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// correct / total; `None` when nothing was scored
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some((self.tp + self.tn) as f64 / total as f64)
    }

    /// TP / (TP + FN); `None` when the fold holds no positive records
    pub fn sensitivity(&self) -> Option<f64> {
        let denom = self.tp + self.fn_;
        if denom == 0 {
            return None;
        }
        Some(self.tp as f64 / denom as f64)
    }

    /// TN / (TN + FP); `None` when the fold holds no negative records
    pub fn specificity(&self) -> Option<f64> {
        let denom = self.tn + self.fp;
        if denom == 0 {
            return None;
        }
        Some(self.tn as f64 / denom as f64)
    }
}

/// Area under the ROC curve via a threshold sweep over predicted scores.
///
/// Ties are handled by moving through all equal-score records at once before
/// emitting a curve point; the curve is integrated with the trapezoid rule.
/// `None` when the truth vector holds a single class.
pub fn roc_auc(y_true: &Array1<f64>, scores: &Array1<f64>) -> Option<f64> {
    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..y_true.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut auc = 0.0;
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut prev_tpr = 0.0;
    let mut prev_fpr = 0.0;

    let mut i = 0;
    while i < order.len() {
        // Consume the whole tie group before emitting a point
        let score = scores[order[i]];
        while i < order.len() && scores[order[i]] == score {
            if y_true[order[i]] > 0.5 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }

        let tpr = tp as f64 / n_pos as f64;
        let fpr = fp as f64 / n_neg as f64;
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0;
        prev_tpr = tpr;
        prev_fpr = fpr;
    }

    Some(auc)
}

/// Root mean squared error
pub fn rmse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Option<f64> {
    if y_true.is_empty() {
        return None;
    }
    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    Some(mse.sqrt())
}

/// Mean absolute error
pub fn mae(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Option<f64> {
    if y_true.is_empty() {
        return None;
    }
    Some(
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).abs())
            .sum::<f64>()
            / y_true.len() as f64,
    )
}

/// Outcome of one metric on one fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricOutcome {
    /// The metric evaluated to a number
    Value(f64),
    /// The metric has no defined value on this fold
    Undefined { reason: String },
}

impl MetricOutcome {
    fn from_option(value: Option<f64>, reason: &str) -> Self {
        match value {
            Some(v) => MetricOutcome::Value(v),
            None => MetricOutcome::Undefined {
                reason: reason.to_string(),
            },
        }
    }

    /// The numeric value, if defined
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricOutcome::Value(v) => Some(*v),
            MetricOutcome::Undefined { .. } => None,
        }
    }
}

/// All metric outcomes for one (candidate, fold) scoring step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldScore {
    /// Raw counts, kept for downstream confusion-matrix averaging
    /// (classification only)
    pub confusion: Option<ConfusionMatrix>,
    /// Metric name to outcome
    pub metrics: BTreeMap<String, MetricOutcome>,
}

/// Score a classifier's predicted probabilities against truth.
///
/// The confusion matrix is taken at `threshold`; ROC-AUC sweeps all
/// thresholds.
pub fn score_classifier(
    y_true: &Array1<f64>,
    proba: &Array1<f64>,
    threshold: f64,
) -> Result<FoldScore> {
    let cm = ConfusionMatrix::from_scores(y_true, proba, threshold);

    let mut metrics = BTreeMap::new();
    metrics.insert(
        ROC_AUC.to_string(),
        MetricOutcome::from_option(roc_auc(y_true, proba), "validation holds a single class"),
    );
    metrics.insert(
        ACCURACY.to_string(),
        MetricOutcome::from_option(cm.accuracy(), "no records scored"),
    );
    metrics.insert(
        SENSITIVITY.to_string(),
        MetricOutcome::from_option(cm.sensitivity(), "no positive records in validation"),
    );
    metrics.insert(
        SPECIFICITY.to_string(),
        MetricOutcome::from_option(cm.specificity(), "no negative records in validation"),
    );

    Ok(FoldScore {
        confusion: Some(cm),
        metrics,
    })
}

/// Score point predictions for a count or continuous outcome
pub fn score_regressor(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<FoldScore> {
    let mut metrics = BTreeMap::new();
    metrics.insert(
        RMSE.to_string(),
        MetricOutcome::from_option(rmse(y_true, y_pred), "no records scored"),
    );
    metrics.insert(
        MAE.to_string(),
        MetricOutcome::from_option(mae(y_true, y_pred), "no records scored"),
    );

    Ok(FoldScore {
        confusion: None,
        metrics,
    })
}
