//! Stratified resampling: initial train/test split and V-fold partitions
//!
//! Both operations are deterministic for a fixed seed and stratify on a named
//! column so the outcome class ratio is preserved across partitions. Folds are
//! generated once per run and reused for every candidate, which is what makes
//! cross-validated comparisons fair.

use crate::dataset::{strata_keys, take_rows};
use crate::error::{FoldwiseError, Result};
use polars::prelude::DataFrame;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// An exclusive partition of a dataset into training and testing frames
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Training partition
    pub training: DataFrame,
    /// Testing (holdout) partition
    pub testing: DataFrame,
    /// Row positions (in the source frame) that went to training
    pub train_rows: Vec<usize>,
    /// Row positions (in the source frame) that went to testing
    pub test_rows: Vec<usize>,
}

/// One fold of a V-fold partition of the training frame.
///
/// Row positions index into the training frame the fold was generated from.
/// Membership is fixed once generated.
#[derive(Debug, Clone)]
pub struct Fold {
    /// Fold number, 0..v
    pub index: usize,
    /// Rows used for fitting (all groups except this fold's)
    pub train_rows: Vec<usize>,
    /// Rows held out for scoring (this fold's group)
    pub validation_rows: Vec<usize>,
}

impl Fold {
    /// Materialize the fitting partition of this fold
    pub fn train_frame(&self, training: &DataFrame) -> Result<DataFrame> {
        take_rows(training, &self.train_rows)
    }

    /// Materialize the held-out partition of this fold
    pub fn validation_frame(&self, training: &DataFrame) -> Result<DataFrame> {
        take_rows(training, &self.validation_rows)
    }
}

/// Group row positions by stratum key, in sorted key order.
///
/// BTreeMap keeps stratum iteration order independent of hash state, which the
/// determinism guarantee relies on.
fn group_by_stratum(df: &DataFrame, strata: &str) -> Result<BTreeMap<String, Vec<usize>>> {
    let keys = strata_keys(df, strata)?;
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, key) in keys.into_iter().enumerate() {
        groups.entry(key).or_default().push(i);
    }
    Ok(groups)
}

/// Stratified train/test split.
///
/// Samples `train_fraction` of each stratum independently so the strata ratio
/// is preserved in both partitions. Fails with [`FoldwiseError::InvalidStrata`]
/// if the strata column has missing values or a stratum has fewer than 2
/// records (a singleton cannot appear on both sides).
pub fn initial_split(
    df: &DataFrame,
    strata: &str,
    train_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(FoldwiseError::ValidationError(format!(
            "train_fraction must be in (0, 1), got {}",
            train_fraction
        )));
    }

    let groups = group_by_stratum(df, strata)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut train_rows = Vec::new();
    let mut test_rows = Vec::new();

    for (key, rows) in &groups {
        if rows.len() < 2 {
            return Err(FoldwiseError::InvalidStrata(format!(
                "stratum '{}' has {} record(s); need at least 2 to split",
                key,
                rows.len()
            )));
        }

        let mut shuffled = rows.clone();
        shuffled.shuffle(&mut rng);

        // Round, then clamp so both partitions get at least one record
        let n_train = ((rows.len() as f64 * train_fraction).round() as usize)
            .clamp(1, rows.len() - 1);

        train_rows.extend_from_slice(&shuffled[..n_train]);
        test_rows.extend_from_slice(&shuffled[n_train..]);
    }

    // Restore source-frame order within each partition
    train_rows.sort_unstable();
    test_rows.sort_unstable();

    Ok(TrainTestSplit {
        training: take_rows(df, &train_rows)?,
        testing: take_rows(df, &test_rows)?,
        train_rows,
        test_rows,
    })
}

/// Stratified V-fold partition of a training frame.
///
/// Each stratum is shuffled (seeded) and dealt round-robin across the v
/// groups; fold i uses group i for validation and the rest for fitting.
pub fn vfold(training: &DataFrame, v: usize, strata: &str, seed: u64) -> Result<Vec<Fold>> {
    if v < 2 {
        return Err(FoldwiseError::ValidationError(format!(
            "v must be at least 2, got {}",
            v
        )));
    }
    if training.height() < v {
        return Err(FoldwiseError::ValidationError(format!(
            "cannot make {} folds from {} records",
            v,
            training.height()
        )));
    }

    let groups = group_by_stratum(training, strata)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut fold_groups: Vec<Vec<usize>> = vec![Vec::new(); v];
    for rows in groups.values() {
        let mut shuffled = rows.clone();
        shuffled.shuffle(&mut rng);
        for (i, row) in shuffled.into_iter().enumerate() {
            fold_groups[i % v].push(row);
        }
    }

    let folds = (0..v)
        .map(|index| {
            let mut validation_rows = fold_groups[index].clone();
            let mut train_rows: Vec<usize> = fold_groups
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .flat_map(|(_, g)| g.iter().copied())
                .collect();
            validation_rows.sort_unstable();
            train_rows.sort_unstable();
            Fold {
                index,
                train_rows,
                validation_rows,
            }
        })
        .collect();

    Ok(folds)
}
