//! Recipe-based preprocessing
//!
//! A [`Recipe`] is an explicit ordered sequence of named [`Step`]s. Fitting a
//! recipe learns each step's parameters from the frame it is given - and only
//! from that frame - which is what keeps validation and test data out of the
//! learned state.
//!
//! Every fitted step exposes two paths:
//! - [`FittedStep::transform`]: deterministic, row-count preserving; used when
//!   scoring validation or test data.
//! - [`FittedStep::augment`]: the training-side path, which may add rows
//!   (oversampling). Defaults to `transform` for ordinary steps.

mod impute;
mod encode;
mod oversample;

pub use impute::MedianImpute;
pub use encode::{CollapseRare, DummyEncode};
pub use oversample::Oversample;

use crate::error::Result;
use polars::prelude::DataFrame;

/// An unfitted preprocessing step
pub trait Step: Send + Sync {
    /// Step name, used in error messages and reports
    fn name(&self) -> &str;

    /// Learn this step's parameters from a training frame
    fn fit(&self, df: &DataFrame) -> Result<Box<dyn FittedStep>>;
}

/// A fitted preprocessing step: a frozen set of learned parameters
pub trait FittedStep: Send + Sync {
    /// Step name
    fn name(&self) -> &str;

    /// Apply the learned transform. Deterministic, does not mutate its input,
    /// and never changes the row count.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;

    /// Training-side application. Steps that rebalance classes add rows here;
    /// everything else behaves exactly like [`FittedStep::transform`].
    fn augment(&self, df: &DataFrame) -> Result<DataFrame> {
        self.transform(df)
    }
}

/// An ordered sequence of preprocessing steps
#[derive(Default)]
pub struct Recipe {
    steps: Vec<Box<dyn Step>>,
}

impl Recipe {
    /// Create an empty recipe
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step to the recipe
    pub fn then(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Names of the steps, in application order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Fit every step in order on a training frame.
    ///
    /// Each step is fit on the output of the previous steps' training-side
    /// (augment) path, so a step sees its inputs exactly as the model will.
    pub fn fit(&self, training: &DataFrame) -> Result<FittedRecipe> {
        Ok(self.fit_transform(training)?.0)
    }

    /// Fit on a training frame and return the fully prepared training frame
    /// (augment path) alongside the fitted recipe.
    pub fn fit_transform(&self, training: &DataFrame) -> Result<(FittedRecipe, DataFrame)> {
        let mut current = training.clone();
        let mut fitted = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let fitted_step = step.fit(&current)?;
            current = fitted_step.augment(&current)?;
            fitted.push(fitted_step);
        }

        Ok((FittedRecipe { steps: fitted }, current))
    }
}

/// A fitted recipe: frozen learned parameters for every step
pub struct FittedRecipe {
    steps: Vec<Box<dyn FittedStep>>,
}

impl FittedRecipe {
    /// Apply the scoring path of every step in order.
    ///
    /// Row-count preserving; this is the only path validation and test frames
    /// ever go through.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut current = df.clone();
        for step in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sample_df() -> DataFrame {
        df!(
            "age" => &[Some(25.0), None, Some(35.0), Some(45.0)],
            "city" => &["NYC", "LA", "NYC", "SF"],
            "y" => &[1i64, 0, 1, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_recipe_is_identity() {
        let df = sample_df();
        let (fitted, train) = Recipe::new().fit_transform(&df).unwrap();
        assert_eq!(train.height(), df.height());
        let out = fitted.transform(&df).unwrap();
        assert_eq!(out.height(), df.height());
        assert_eq!(out.width(), df.width());
    }

    #[test]
    fn test_recipe_applies_steps_in_order() {
        let df = sample_df();
        let recipe = Recipe::new()
            .then(MedianImpute::all_numeric())
            .then(DummyEncode::all_categorical());
        assert_eq!(recipe.step_names(), vec!["median_impute", "dummy_encode"]);

        let (fitted, train) = recipe.fit_transform(&df).unwrap();
        // Imputed: no nulls left in age
        assert_eq!(train.column("age").unwrap().null_count(), 0);
        // Encoded: city replaced by indicator columns
        assert!(train.column("city").is_err());
        assert!(train.column("city_NYC").is_ok());

        let out = fitted.transform(&df).unwrap();
        assert_eq!(out.height(), df.height());
    }

    #[test]
    fn test_fitted_transform_is_idempotent_on_same_input() {
        let df = sample_df();
        let recipe = Recipe::new()
            .then(MedianImpute::all_numeric())
            .then(DummyEncode::all_categorical());
        let fitted = recipe.fit(&df).unwrap();

        let a = fitted.transform(&df).unwrap();
        let b = fitted.transform(&df).unwrap();
        assert!(a.equals(&b));
    }
}
