pub mod churn;
pub mod credit;

use crate::errors::InferError;
use serde::{Deserialize, Serialize};

pub use churn::{
    AddOnService, ChurnRequest, ChurnResponse, ContractType, InternetService, PaymentMethod, YesNo,
};
pub use credit::{CreditCardRequest, SegmentationResponse};

/// Which model family answered a request. Reported the same way whether the
/// artifact or the rule engine produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Knn,
    LogisticRegression,
    Kmeans,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Knn => "knn",
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::Kmeans => "kmeans",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boundary checks applied before a request reaches a predictor.
pub trait Validate {
    fn validate(&self) -> Result<(), InferError>;
}

pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<(), InferError> {
    if !value.is_finite() {
        return Err(InferError::validation(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(InferError::validation(field, "must be greater than or equal to 0"));
    }
    if value > f32::MAX as f64 {
        return Err(InferError::validation(field, "is too large"));
    }
    Ok(())
}

pub(crate) fn check_unit_interval(field: &str, value: f64) -> Result<(), InferError> {
    check_non_negative(field, value)?;
    if value > 1.0 {
        return Err(InferError::validation(field, "must be less than or equal to 1"));
    }
    Ok(())
}

pub(crate) fn check_integer(field: &str, value: f64) -> Result<(), InferError> {
    check_non_negative(field, value)?;
    if value.fract() != 0.0 {
        return Err(InferError::validation(field, "must be an integer"));
    }
    Ok(())
}
