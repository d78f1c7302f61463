//! Categorical encoding steps: rare-level pooling and one-hot encoding

use super::{FittedStep, Step};
use crate::error::{FoldwiseError, Result};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Label used for pooled infrequent levels
const OTHER_LABEL: &str = "other";

fn string_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| matches!(c.dtype(), DataType::String))
        .map(|c| c.name().to_string())
        .collect()
}

fn str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .map_err(|_| FoldwiseError::FeatureNotFound(name.to_string()))?
        .str()
        .map_err(|e| FoldwiseError::DataError(e.to_string()))
}

/// Pools categorical levels rarer than a frequency threshold into `"other"`.
///
/// The retained level set is learned at fit time; at transform time any level
/// outside that set (including levels never seen in training) maps to
/// `"other"`.
#[derive(Debug, Clone)]
pub struct CollapseRare {
    columns: Option<Vec<String>>,
    threshold: f64,
}

impl CollapseRare {
    /// Pool rare levels in every string column
    pub fn all_categorical(threshold: f64) -> Self {
        Self {
            columns: None,
            threshold,
        }
    }

    /// Pool rare levels in the named columns only
    pub fn columns(
        columns: impl IntoIterator<Item = impl Into<String>>,
        threshold: f64,
    ) -> Self {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
            threshold,
        }
    }

    fn target_columns(&self, df: &DataFrame) -> Vec<String> {
        match &self.columns {
            Some(cols) => cols.clone(),
            None => string_columns(df),
        }
    }
}

impl Step for CollapseRare {
    fn name(&self) -> &str {
        "collapse_rare"
    }

    fn fit(&self, df: &DataFrame) -> Result<Box<dyn FittedStep>> {
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(FoldwiseError::ValidationError(format!(
                "threshold must be in [0, 1), got {}",
                self.threshold
            )));
        }

        let n = df.height() as f64;
        let mut retained = BTreeMap::new();

        for name in self.target_columns(df) {
            let ca = str_column(df, &name)?;
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for value in ca.into_iter().flatten() {
                *counts.entry(value).or_insert(0) += 1;
            }

            let keep: BTreeSet<String> = counts
                .into_iter()
                .filter(|(_, count)| *count as f64 / n >= self.threshold)
                .map(|(level, _)| level.to_string())
                .collect();
            retained.insert(name, keep);
        }

        Ok(Box::new(FittedCollapseRare { retained }))
    }
}

#[derive(Debug, Clone)]
struct FittedCollapseRare {
    retained: BTreeMap<String, BTreeSet<String>>,
}

impl FittedStep for FittedCollapseRare {
    fn name(&self) -> &str {
        "collapse_rare"
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for (name, keep) in &self.retained {
            let ca = str_column(&result, name)?;
            let pooled: StringChunked = ca
                .into_iter()
                .map(|opt| {
                    opt.map(|v| {
                        if keep.contains(v) {
                            v
                        } else {
                            OTHER_LABEL
                        }
                    })
                })
                .collect();

            result = result
                .with_column(pooled.with_name(name.as_str().into()).into_series())
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }
}

/// One-hot encodes string columns into 0/1 indicator columns.
///
/// Level lists are learned at fit time; each level produces a column named
/// `{column}_{level}` and the source column is dropped. A level unseen during
/// fit encodes as all zeros.
#[derive(Debug, Clone)]
pub struct DummyEncode {
    columns: Option<Vec<String>>,
}

impl DummyEncode {
    /// Encode every string column
    pub fn all_categorical() -> Self {
        Self { columns: None }
    }

    /// Encode only the named columns
    pub fn columns(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }

    fn target_columns(&self, df: &DataFrame) -> Vec<String> {
        match &self.columns {
            Some(cols) => cols.clone(),
            None => string_columns(df),
        }
    }
}

impl Step for DummyEncode {
    fn name(&self) -> &str {
        "dummy_encode"
    }

    fn fit(&self, df: &DataFrame) -> Result<Box<dyn FittedStep>> {
        let mut levels = BTreeMap::new();

        for name in self.target_columns(df) {
            let ca = str_column(df, &name)?;
            let unique: BTreeSet<String> = ca
                .into_iter()
                .flatten()
                .map(|v| v.to_string())
                .collect();
            levels.insert(name, unique.into_iter().collect::<Vec<_>>());
        }

        Ok(Box::new(FittedDummyEncode { levels }))
    }
}

#[derive(Debug, Clone)]
struct FittedDummyEncode {
    levels: BTreeMap<String, Vec<String>>,
}

impl FittedStep for FittedDummyEncode {
    fn name(&self) -> &str {
        "dummy_encode"
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for (name, levels) in &self.levels {
            let values: Vec<Option<String>> = str_column(&result, name)?
                .into_iter()
                .map(|opt| opt.map(|v| v.to_string()))
                .collect();

            for level in levels {
                let indicator: Vec<f64> = values
                    .iter()
                    .map(|v| match v {
                        Some(v) if v == level => 1.0,
                        _ => 0.0,
                    })
                    .collect();
                let col_name = format!("{}_{}", name, level);
                result = result
                    .with_column(Column::new(col_name.into(), indicator))
                    .map_err(|e| FoldwiseError::DataError(e.to_string()))?
                    .clone();
            }

            result = result
                .drop(name)
                .map_err(|e| FoldwiseError::DataError(e.to_string()))?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_rare_pools_infrequent_levels() {
        let train = df!(
            "city" => &["NYC", "NYC", "NYC", "NYC", "LA", "LA", "LA", "LA", "SF", "Reno"],
        )
        .unwrap();

        let fitted = CollapseRare::all_categorical(0.2).fit(&train).unwrap();
        let out = fitted.transform(&train).unwrap();
        let ca = out.column("city").unwrap().str().unwrap();

        assert_eq!(ca.get(0), Some("NYC"));
        assert_eq!(ca.get(8), Some("other"));
        assert_eq!(ca.get(9), Some("other"));
    }

    #[test]
    fn test_collapse_rare_maps_unseen_levels_to_other() {
        let train = df!("city" => &["NYC", "NYC", "LA", "LA"]).unwrap();
        let test = df!("city" => &["NYC", "Boston"]).unwrap();

        let fitted = CollapseRare::all_categorical(0.25).fit(&train).unwrap();
        let out = fitted.transform(&test).unwrap();
        let ca = out.column("city").unwrap().str().unwrap();

        assert_eq!(ca.get(0), Some("NYC"));
        assert_eq!(ca.get(1), Some("other"));
    }

    #[test]
    fn test_dummy_encode_levels_from_fit_frame() {
        let train = df!("city" => &["NYC", "LA", "NYC"]).unwrap();
        let test = df!("city" => &["LA", "SF"]).unwrap();

        let fitted = DummyEncode::all_categorical().fit(&train).unwrap();
        let out = fitted.transform(&test).unwrap();

        assert!(out.column("city").is_err());
        let la = out.column("city_LA").unwrap().f64().unwrap();
        let nyc = out.column("city_NYC").unwrap().f64().unwrap();
        assert_eq!(la.get(0), Some(1.0));
        assert_eq!(nyc.get(0), Some(0.0));
        // Unseen level: all indicators zero
        assert_eq!(la.get(1), Some(0.0));
        assert_eq!(nyc.get(1), Some(0.0));
        // No column for a level never seen in training
        assert!(out.column("city_SF").is_err());
    }

    #[test]
    fn test_dummy_encode_preserves_row_count() {
        let train = df!(
            "city" => &["NYC", "LA", "SF", "NYC"],
            "x" => &[1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let fitted = DummyEncode::all_categorical().fit(&train).unwrap();
        let out = fitted.transform(&train).unwrap();
        assert_eq!(out.height(), 4);
        assert!(out.column("x").is_ok());
    }
}
