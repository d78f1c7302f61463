//! Median imputation for numeric columns

use super::{FittedStep, Step};
use crate::error::{FoldwiseError, Result};
use polars::prelude::*;
use std::collections::BTreeMap;

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
    )
}

/// Replaces missing numeric values with the column median learned at fit time
#[derive(Debug, Clone)]
pub struct MedianImpute {
    columns: Option<Vec<String>>,
}

impl MedianImpute {
    /// Impute every numeric column
    pub fn all_numeric() -> Self {
        Self { columns: None }
    }

    /// Impute only the named columns
    pub fn columns(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }

    fn target_columns(&self, df: &DataFrame) -> Vec<String> {
        match &self.columns {
            Some(cols) => cols.clone(),
            None => df
                .get_columns()
                .iter()
                .filter(|c| is_numeric_dtype(c.dtype()))
                .map(|c| c.name().to_string())
                .collect(),
        }
    }
}

impl Step for MedianImpute {
    fn name(&self) -> &str {
        "median_impute"
    }

    fn fit(&self, df: &DataFrame) -> Result<Box<dyn FittedStep>> {
        let mut fills = BTreeMap::new();

        for name in self.target_columns(df) {
            let series = df
                .column(&name)
                .map_err(|_| FoldwiseError::FeatureNotFound(name.clone()))?;
            let as_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?;
            let median = as_f64
                .f64()
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?
                .median()
                .ok_or_else(|| {
                    FoldwiseError::PreprocessingError(format!(
                        "cannot impute '{}': no non-missing values",
                        name
                    ))
                })?;
            fills.insert(name, median);
        }

        Ok(Box::new(FittedMedianImpute { fills }))
    }
}

/// Frozen per-column medians
#[derive(Debug, Clone)]
struct FittedMedianImpute {
    fills: BTreeMap<String, f64>,
}

impl FittedStep for FittedMedianImpute {
    fn name(&self) -> &str {
        "median_impute"
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for (name, fill) in &self.fills {
            let series = result
                .column(name)
                .map_err(|_| FoldwiseError::FeatureNotFound(name.clone()))?;
            let as_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?;
            let ca = as_f64
                .f64()
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?;

            let filled: Float64Chunked = ca
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(*fill)))
                .collect();

            result = result
                .with_column(filled.with_name(name.as_str().into()).into_series())
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }
}
