//! Error types for the Foldwise evaluation framework

use thiserror::Error;

/// Result type alias for Foldwise operations
pub type Result<T> = std::result::Result<T, FoldwiseError>;

/// Main error type for the Foldwise framework
#[derive(Error, Debug)]
pub enum FoldwiseError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid strata: {0}")]
    InvalidStrata(String),

    #[error("Data leakage: {0}")]
    Leakage(String),

    #[error("Fitter failure for candidate '{candidate}' on fold {fold}: {message}")]
    FitterFailure {
        candidate: String,
        fold: usize,
        message: String,
    },

    #[error("Metric '{metric}' undefined on fold {fold}: {reason}")]
    MetricUndefined {
        metric: String,
        fold: usize,
        reason: String,
    },

    #[error("Holdout data already evaluated; the test set is single-use")]
    HoldoutConsumed,

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Not fitted")]
    NotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for FoldwiseError {
    fn from(err: polars::error::PolarsError) -> Self {
        FoldwiseError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FoldwiseError {
    fn from(err: serde_json::Error) -> Self {
        FoldwiseError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for FoldwiseError {
    fn from(err: ndarray::ShapeError) -> Self {
        FoldwiseError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FoldwiseError::InvalidStrata("stratum 'x' has a single record".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid strata: stratum 'x' has a single record"
        );
    }

    #[test]
    fn test_fitter_failure_names_unit() {
        let err = FoldwiseError::FitterFailure {
            candidate: "logistic".to_string(),
            fold: 3,
            message: "did not converge".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("logistic"));
        assert!(text.contains("fold 3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FoldwiseError = io_err.into();
        assert!(matches!(err, FoldwiseError::IoError(_)));
    }
}
