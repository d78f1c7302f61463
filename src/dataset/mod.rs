//! Dataset wrapper and frame/matrix conversion helpers
//!
//! A [`Dataset`] is an immutable tabular frame with exactly one designated
//! outcome column. Everything downstream (splits, folds, recipes, fitters)
//! works on row subsets of its frame; fitters consume `ndarray` matrices
//! produced by the gather helpers in this module.

use crate::error::{FoldwiseError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// A labeled dataset: a tabular frame plus the name of its outcome column.
///
/// Immutable once constructed; resampling and preprocessing always operate on
/// copies of row subsets, never on the dataset itself.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    outcome: String,
}

impl Dataset {
    /// Create a dataset from an existing frame, validating the outcome column
    pub fn new(frame: DataFrame, outcome: impl Into<String>) -> Result<Self> {
        let outcome = outcome.into();
        if frame.column(&outcome).is_err() {
            return Err(FoldwiseError::FeatureNotFound(outcome));
        }
        Ok(Self { frame, outcome })
    }

    /// Load a dataset from a header CSV file
    pub fn from_csv(path: impl AsRef<Path>, outcome: impl Into<String>) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| FoldwiseError::DataError(e.to_string()))?;

        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| FoldwiseError::DataError(e.to_string()))?;

        Self::new(frame, outcome)
    }

    /// The underlying frame
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Name of the outcome column
    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    /// Number of records
    pub fn n_rows(&self) -> usize {
        self.frame.height()
    }
}

/// Materialize a row subset of a frame, in the order given
pub fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = rows.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    df.take(&idx)
        .map_err(|e| FoldwiseError::DataError(e.to_string()))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// Names of the numeric feature columns of a frame, excluding the outcome
pub fn feature_names(df: &DataFrame, outcome: &str) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| col.name().as_str() != outcome && is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Extract the numeric feature columns (everything but the outcome) into a
/// row-major matrix, returning the column order used.
pub fn feature_matrix(df: &DataFrame, outcome: &str) -> Result<(Array2<f64>, Vec<String>)> {
    let names = feature_names(df, outcome);
    let x = feature_matrix_for(df, &names)?;
    Ok((x, names))
}

/// Extract a fixed set of named columns into a row-major matrix.
///
/// Used for validation/test frames so they are gathered with exactly the
/// column set learned on the training side; a missing column is an error,
/// never silently defaulted.
pub fn feature_matrix_for(df: &DataFrame, cols: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = cols.len();

    // Collect all columns as contiguous f64 Vecs
    let col_data: Vec<Vec<f64>> = cols
        .iter()
        .map(|name| {
            let series = df
                .column(name)
                .map_err(|_| FoldwiseError::FeatureNotFound(name.clone()))?;
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    // Build row-major array directly via from_shape_fn
    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

/// Extract the outcome column as an f64 vector; missing outcomes are an error
pub fn outcome_array(df: &DataFrame, outcome: &str) -> Result<Array1<f64>> {
    let series = df
        .column(outcome)
        .map_err(|_| FoldwiseError::FeatureNotFound(outcome.to_string()))?;
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| FoldwiseError::DataError(e.to_string()))?;
    let ca = series_f64
        .f64()
        .map_err(|e| FoldwiseError::DataError(e.to_string()))?;

    let mut values = Vec::with_capacity(ca.len());
    for (i, v) in ca.into_iter().enumerate() {
        match v {
            Some(v) => values.push(v),
            None => {
                return Err(FoldwiseError::DataError(format!(
                    "outcome '{}' is missing at row {}",
                    outcome, i
                )))
            }
        }
    }
    Ok(Array1::from_vec(values))
}

/// String keys of a stratification column, one per row.
///
/// Any missing value is an [`FoldwiseError::InvalidStrata`]: rows without a
/// stratum cannot be allocated to either side of a stratified partition.
pub fn strata_keys(df: &DataFrame, strata: &str) -> Result<Vec<String>> {
    let series = df
        .column(strata)
        .map_err(|_| FoldwiseError::FeatureNotFound(strata.to_string()))?;

    if series.null_count() > 0 {
        return Err(FoldwiseError::InvalidStrata(format!(
            "column '{}' has {} missing values",
            strata,
            series.null_count()
        )));
    }

    let as_str = series
        .cast(&DataType::String)
        .map_err(|e| FoldwiseError::DataError(e.to_string()))?;
    let ca = as_str
        .str()
        .map_err(|e| FoldwiseError::DataError(e.to_string()))?;

    Ok(ca
        .into_iter()
        .map(|v| v.unwrap_or("").to_string())
        .collect())
}
