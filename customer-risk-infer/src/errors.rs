use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
pub const MODEL_UNAVAILABLE: &str = "MODEL_UNAVAILABLE";
pub const NOT_FOUND: &str = "NOT_FOUND";

#[derive(Error, Debug)]
pub enum InferError {
    #[error("generic error: {msg}")]
    GenericError { msg: String },

    #[error("model artifact not found at {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("failed to load model artifact {}: {msg}", .path.display())]
    ArtifactLoadError { path: PathBuf, msg: String },

    #[error("input shape mismatch: expected [1, {expected}], got [1, {actual}]")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model output `{name}` missing or malformed: {msg}")]
    OutputError { name: String, msg: String },

    #[error("{model} model unavailable and fallback disabled: {msg}")]
    InferenceUnavailable { model: String, msg: String },

    #[error("field '{field}' {msg}")]
    ValidationError { field: String, msg: String },

    #[error("candle error: {source}")]
    CandleError { source: candle_core::Error },

    #[error("json error: {source}")]
    JsonError { source: serde_json::Error },

    #[error("io error: {source}")]
    IoError { source: std::io::Error },

    #[error("unspecified inference error: {msg}, {source}")]
    UnspecifiedError { msg: String, source: anyhow::Error },
}

impl InferError {
    /// Error kind reported to clients in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            InferError::ValidationError { .. } => VALIDATION_ERROR,
            InferError::InferenceUnavailable { .. } => MODEL_UNAVAILABLE,
            _ => INTERNAL_SERVER_ERROR,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            InferError::ValidationError { .. } => 400,
            InferError::InferenceUnavailable { .. } => 503,
            _ => 500,
        }
    }

    pub fn validation(field: &str, msg: impl Into<String>) -> Self {
        InferError::ValidationError {
            field: field.to_string(),
            msg: msg.into(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// Body returned to clients for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

impl From<String> for InferError {
    fn from(msg: String) -> Self {
        InferError::GenericError { msg }
    }
}

impl From<anyhow::Error> for InferError {
    fn from(err: anyhow::Error) -> Self {
        InferError::UnspecifiedError {
            msg: err.to_string(),
            source: err,
        }
    }
}

impl From<candle_core::Error> for InferError {
    fn from(err: candle_core::Error) -> Self {
        InferError::CandleError { source: err }
    }
}

impl From<serde_json::Error> for InferError {
    fn from(err: serde_json::Error) -> Self {
        InferError::JsonError { source: err }
    }
}

impl From<std::io::Error> for InferError {
    fn from(err: std::io::Error) -> Self {
        InferError::IoError { source: err }
    }
}
