//! Per-task prediction orchestration. A [`Predictor`] settles once on either
//! the model-backed or the rule-based path and serves every request through
//! it.

pub mod churn_knn;
pub mod churn_logreg;
pub mod credit_kmeans;

pub use churn_knn::ChurnKnnTask;
pub use churn_logreg::ChurnLogRegTask;
pub use credit_kmeans::CreditKmeansTask;

use crate::base::{FeatureVector, ModelInfer, RawOutput};
use crate::errors::InferError;
use crate::models::constants::{LABEL_OUTPUT, PROBABILITIES_OUTPUT};
use crate::models::ModelRegistry;
use crate::types::{ChurnResponse, ModelKind};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Whether a task may answer from rules when its model cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Follows the `USE_FALLBACK` setting.
    Configured,
    /// Falls back even when the setting is off.
    Always,
}

/// Observable state of a predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathMode {
    #[serde(rename = "loading")]
    Loading,
    #[serde(rename = "model")]
    ModelBacked,
    #[serde(rename = "fallback")]
    FallbackOnly,
}

impl PathMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathMode::Loading => "loading",
            PathMode::ModelBacked => "model",
            PathMode::FallbackOnly => "fallback",
        }
    }
}

pub enum InferencePath {
    ModelBacked(Arc<dyn ModelInfer + Send + Sync>),
    FallbackOnly,
}

/// One prediction task: how to encode its request, read the model output,
/// and answer without a model.
pub trait PredictTask: Send + Sync + 'static {
    type Request: Send + Sync;
    type Response;

    const KIND: ModelKind;
    const POLICY: FallbackPolicy;
    /// Feature width the paired artifact must accept.
    const FEATURES: usize;

    fn encode(&self, request: &Self::Request) -> FeatureVector;

    fn interpret(&self, output: &RawOutput) -> Result<Self::Response, InferError>;

    fn fallback(&self, request: &Self::Request) -> Self::Response;
}

pub struct Predictor<T: PredictTask> {
    task: T,
    model_path: PathBuf,
    allow_fallback: bool,
    path: OnceCell<InferencePath>,
}

impl<T: PredictTask> Predictor<T> {
    fn unresolved(task: T, model_path: PathBuf, allow_fallback: bool) -> Self {
        Predictor {
            task,
            model_path,
            allow_fallback,
            path: OnceCell::new(),
        }
    }

    /// Loads the artifact before returning. A missing or unusable artifact
    /// leaves the predictor on the fallback path for good.
    pub fn load(task: T, model_path: &Path, allow_fallback: bool, registry: &ModelRegistry) -> Self {
        let predictor = Self::unresolved(task, model_path.to_path_buf(), allow_fallback);
        predictor.resolve(registry);
        predictor
    }

    /// Returns immediately and loads the artifact on the blocking pool.
    /// Requests arriving before the load settles are answered by fallback.
    pub fn spawn(
        task: T,
        model_path: &Path,
        allow_fallback: bool,
        registry: Arc<ModelRegistry>,
    ) -> Arc<Self> {
        let predictor = Arc::new(Self::unresolved(
            task,
            model_path.to_path_buf(),
            allow_fallback,
        ));
        let background = predictor.clone();
        async_std::task::spawn_blocking(move || background.resolve(&registry));
        predictor
    }

    pub fn with_model(
        task: T,
        model: Arc<dyn ModelInfer + Send + Sync>,
        allow_fallback: bool,
    ) -> Self {
        let predictor = Self::unresolved(task, PathBuf::new(), allow_fallback);
        let _ = predictor.path.set(InferencePath::ModelBacked(model));
        predictor
    }

    pub fn fallback_only(task: T, allow_fallback: bool) -> Self {
        let predictor = Self::unresolved(task, PathBuf::new(), allow_fallback);
        let _ = predictor.path.set(InferencePath::FallbackOnly);
        predictor
    }

    fn resolve(&self, registry: &ModelRegistry) -> PathMode {
        let path = match registry.load(&self.model_path).and_then(|session| {
            if session.input_len() != T::FEATURES {
                return Err(InferError::ShapeMismatch {
                    expected: T::FEATURES,
                    actual: session.input_len(),
                });
            }
            Ok(session)
        }) {
            Ok(session) => {
                info!(model = %T::KIND, path = %self.model_path.display(), "model-backed inference enabled");
                InferencePath::ModelBacked(session)
            }
            Err(err) => {
                warn!(
                    model = %T::KIND,
                    path = %self.model_path.display(),
                    error = %err,
                    "model unavailable, serving rule-based fallback"
                );
                InferencePath::FallbackOnly
            }
        };
        let _ = self.path.set(path);
        self.mode()
    }

    pub fn mode(&self) -> PathMode {
        match self.path.get() {
            None => PathMode::Loading,
            Some(InferencePath::ModelBacked(_)) => PathMode::ModelBacked,
            Some(InferencePath::FallbackOnly) => PathMode::FallbackOnly,
        }
    }

    pub fn kind(&self) -> ModelKind {
        T::KIND
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn fallback_permitted(&self) -> bool {
        match T::POLICY {
            FallbackPolicy::Always => true,
            FallbackPolicy::Configured => self.allow_fallback,
        }
    }

    fn unavailable(&self, msg: impl Into<String>) -> InferError {
        InferError::InferenceUnavailable {
            model: T::KIND.to_string(),
            msg: msg.into(),
        }
    }

    fn run_model(
        &self,
        model: &(dyn ModelInfer + Send + Sync),
        request: &T::Request,
    ) -> Result<T::Response, InferError> {
        let features = self.task.encode(request);
        let output = model.infer(&features)?;
        self.task.interpret(&output)
    }

    pub fn predict(&self, request: &T::Request) -> Result<T::Response, InferError> {
        match self.path.get() {
            Some(InferencePath::ModelBacked(model)) => {
                match self.run_model(model.as_ref(), request) {
                    Ok(response) => Ok(response),
                    Err(err) if self.fallback_permitted() => {
                        warn!(model = %T::KIND, error = %err, "model inference failed, using fallback");
                        Ok(self.task.fallback(request))
                    }
                    Err(err) => Err(self.unavailable(err.to_string())),
                }
            }
            Some(InferencePath::FallbackOnly) => {
                if self.fallback_permitted() {
                    Ok(self.task.fallback(request))
                } else {
                    Err(self.unavailable("no model artifact loaded"))
                }
            }
            None => {
                if self.fallback_permitted() {
                    Ok(self.task.fallback(request))
                } else {
                    Err(self.unavailable("model is still loading"))
                }
            }
        }
    }
}

/// Reads a two-class model output into the churn response shape. The
/// reported probability is the one of the predicted class.
pub(crate) fn churn_from_output(
    model: ModelKind,
    output: &RawOutput,
) -> Result<ChurnResponse, InferError> {
    let prediction: u8 = match output.scalar_label(LABEL_OUTPUT)? {
        0 => 0,
        1 => 1,
        other => {
            return Err(InferError::OutputError {
                name: LABEL_OUTPUT.to_string(),
                msg: format!("label {} is not a churn class", other),
            })
        }
    };
    let probabilities = output.values_f64(PROBABILITIES_OUTPUT)?;
    let class_probability = match probabilities.get(prediction as usize) {
        Some(p) if p.is_finite() && probabilities.len() >= 2 => *p,
        _ => {
            return Err(InferError::OutputError {
                name: PROBABILITIES_OUTPUT.to_string(),
                msg: format!("expected two finite class scores, got {:?}", probabilities),
            })
        }
    };
    Ok(ChurnResponse::from_class_probability(
        model,
        prediction,
        class_probability,
    ))
}
