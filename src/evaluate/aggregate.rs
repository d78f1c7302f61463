//! Per-fold metric records and their aggregation

use crate::error::Result;
use crate::metrics::{ConfusionMatrix, MetricOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One metric outcome for one (candidate, fold) unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub candidate: String,
    pub fold: usize,
    pub metric: String,
    pub outcome: MetricOutcome,
}

/// Raw confusion counts for one (candidate, fold) unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfusionRecord {
    pub candidate: String,
    pub fold: usize,
    pub matrix: ConfusionMatrix,
}

/// Success/failure of a single (candidate, fold) evaluation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitStatus {
    Succeeded,
    Failed(String),
}

/// Ledger entry for one evaluation unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub candidate: String,
    pub fold: usize,
    pub status: UnitStatus,
}

/// Mean and standard error of a metric across folds.
///
/// Undefined fold values are excluded entirely: `n_folds` counts only the
/// folds where the metric was defined, and the standard error divides by
/// sqrt of that count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std_error: f64,
    pub n_folds: usize,
}

impl MetricSummary {
    fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std_error = if n < 2 {
            0.0
        } else {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt() / (n as f64).sqrt()
        };
        Self {
            mean,
            std_error,
            n_folds: n,
        }
    }
}

/// Element-wise mean of per-fold confusion counts (not re-normalized)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedConfusion {
    pub tp: f64,
    pub fp: f64,
    pub tn: f64,
    #[serde(rename = "fn")]
    pub fn_: f64,
}

/// Everything a cross-validation run produced: per-fold metric records, raw
/// confusion counts, and the per-unit success/failure ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub records: Vec<MetricRecord>,
    pub confusions: Vec<ConfusionRecord>,
    pub ledger: Vec<UnitReport>,
}

impl EvaluationReport {
    /// Aggregate records into candidate -> metric -> (mean, SE) summaries.
    ///
    /// Folds where a metric was undefined contribute nothing - they are
    /// excluded rather than treated as zero.
    pub fn summarize(&self) -> BTreeMap<String, BTreeMap<String, MetricSummary>> {
        let mut grouped: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
        for record in &self.records {
            if let Some(value) = record.outcome.value() {
                grouped
                    .entry((record.candidate.clone(), record.metric.clone()))
                    .or_default()
                    .push(value);
            }
        }

        let mut summary: BTreeMap<String, BTreeMap<String, MetricSummary>> = BTreeMap::new();
        for ((candidate, metric), values) in grouped {
            summary
                .entry(candidate)
                .or_default()
                .insert(metric, MetricSummary::from_values(&values));
        }
        summary
    }

    /// Element-wise mean of each candidate's per-fold confusion counts
    pub fn average_confusion_matrix(&self) -> BTreeMap<String, AveragedConfusion> {
        let mut grouped: BTreeMap<String, Vec<ConfusionMatrix>> = BTreeMap::new();
        for record in &self.confusions {
            grouped
                .entry(record.candidate.clone())
                .or_default()
                .push(record.matrix);
        }

        grouped
            .into_iter()
            .map(|(candidate, matrices)| {
                let n = matrices.len() as f64;
                let avg = AveragedConfusion {
                    tp: matrices.iter().map(|m| m.tp as f64).sum::<f64>() / n,
                    fp: matrices.iter().map(|m| m.fp as f64).sum::<f64>() / n,
                    tn: matrices.iter().map(|m| m.tn as f64).sum::<f64>() / n,
                    fn_: matrices.iter().map(|m| m.fn_ as f64).sum::<f64>() / n,
                };
                (candidate, avg)
            })
            .collect()
    }

    /// Units that failed, if any
    pub fn failed_units(&self) -> Vec<&UnitReport> {
        self.ledger
            .iter()
            .filter(|u| !matches!(u.status, UnitStatus::Succeeded))
            .collect()
    }

    /// Serialize the full report to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
