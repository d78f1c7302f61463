//! Training-only minority oversampling
//!
//! Duplicates minority-outcome rows until each class reaches `ratio` times the
//! majority count. The duplication happens only on the training-side
//! [`FittedStep::augment`] path; the scoring-side `transform` never changes
//! row counts, so validation and test partitions are never rebalanced.

use super::{FittedStep, Step};
use crate::dataset::{strata_keys, take_rows};
use crate::error::{FoldwiseError, Result};
use polars::prelude::DataFrame;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Oversamples minority outcome classes by duplicating rows at fit time
#[derive(Debug, Clone)]
pub struct Oversample {
    outcome: String,
    ratio: f64,
    seed: u64,
}

impl Oversample {
    /// Create an oversampler keyed on the named outcome column
    pub fn new(outcome: impl Into<String>) -> Self {
        Self {
            outcome: outcome.into(),
            ratio: 1.0,
            seed: 0,
        }
    }

    /// Target minority size as a fraction of the majority count (default 1.0,
    /// i.e. fully balanced)
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Seed for the duplicate-row draws
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Step for Oversample {
    fn name(&self) -> &str {
        "oversample"
    }

    fn fit(&self, df: &DataFrame) -> Result<Box<dyn FittedStep>> {
        let keys = strata_keys(df, &self.outcome)?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for key in &keys {
            *counts.entry(key.clone()).or_insert(0) += 1;
        }
        if counts.len() < 2 {
            return Err(FoldwiseError::PreprocessingError(format!(
                "oversampling needs at least 2 outcome classes, found {}",
                counts.len()
            )));
        }

        let majority = *counts.values().max().unwrap_or(&0);
        let targets: BTreeMap<String, usize> = counts
            .iter()
            .map(|(class, &count)| {
                let target = ((majority as f64 * self.ratio).round() as usize).max(count);
                (class.clone(), target)
            })
            .collect();

        Ok(Box::new(FittedOversample {
            outcome: self.outcome.clone(),
            targets,
            seed: self.seed,
        }))
    }
}

/// Frozen per-class target counts
#[derive(Debug, Clone)]
struct FittedOversample {
    outcome: String,
    targets: BTreeMap<String, usize>,
    seed: u64,
}

impl FittedStep for FittedOversample {
    fn name(&self) -> &str {
        "oversample"
    }

    // Scoring path: rebalancing never applies to validation or test data
    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(df.clone())
    }

    fn augment(&self, df: &DataFrame) -> Result<DataFrame> {
        let keys = strata_keys(df, &self.outcome)?;

        let mut class_rows: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, key) in keys.iter().enumerate() {
            class_rows.entry(key.as_str()).or_default().push(i);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut rows: Vec<usize> = (0..df.height()).collect();

        for (class, class_idx) in &class_rows {
            let target = self.targets.get(*class).copied().unwrap_or(0);
            let n_extra = target.saturating_sub(class_idx.len());
            for _ in 0..n_extra {
                rows.push(class_idx[rng.gen_range(0..class_idx.len())]);
            }
        }

        take_rows(df, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn imbalanced_df() -> DataFrame {
        let y: Vec<i64> = (0..20).map(|i| if i < 2 { 1 } else { 0 }).collect();
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        df!("x" => &x, "y" => &y).unwrap()
    }

    #[test]
    fn test_augment_balances_classes() {
        let df = imbalanced_df();
        let fitted = Oversample::new("y").with_seed(42).fit(&df).unwrap();
        let out = fitted.augment(&df).unwrap();

        // 18 majority + minority duplicated up to 18
        assert_eq!(out.height(), 36);
        let keys = strata_keys(&out, "y").unwrap();
        let n_pos = keys.iter().filter(|k| k.as_str() == "1").count();
        assert_eq!(n_pos, 18);
    }

    #[test]
    fn test_transform_never_adds_rows() {
        let df = imbalanced_df();
        let fitted = Oversample::new("y").with_seed(42).fit(&df).unwrap();
        let out = fitted.transform(&df).unwrap();
        assert_eq!(out.height(), df.height());
    }

    #[test]
    fn test_augment_deterministic() {
        let df = imbalanced_df();
        let fitted = Oversample::new("y").with_seed(7).fit(&df).unwrap();
        let a = fitted.augment(&df).unwrap();
        let b = fitted.augment(&df).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_partial_ratio() {
        let df = imbalanced_df();
        let fitted = Oversample::new("y")
            .with_ratio(0.5)
            .with_seed(1)
            .fit(&df)
            .unwrap();
        let out = fitted.augment(&df).unwrap();

        // Minority target: 0.5 * 18 = 9
        let keys = strata_keys(&out, "y").unwrap();
        let n_pos = keys.iter().filter(|k| k.as_str() == "1").count();
        assert_eq!(n_pos, 9);
    }

    #[test]
    fn test_single_class_rejected_at_fit() {
        let df = df!("x" => &[1.0, 2.0], "y" => &[1i64, 1]).unwrap();
        assert!(Oversample::new("y").fit(&df).is_err());
    }
}
