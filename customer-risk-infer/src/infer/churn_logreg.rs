use crate::base::{FeatureVector, RawOutput};
use crate::errors::InferError;
use crate::fallback::{logreg_churn_probability, ChurnVerdict};
use crate::infer::{churn_from_output, FallbackPolicy, PredictTask};
use crate::preprocess::{encode_churn, CHURN_FEATURES};
use crate::types::{ChurnRequest, ChurnResponse, ModelKind};

/// Churn prediction with the logistic regression artifact. This task keeps
/// answering from its hand-set logit when `USE_FALLBACK` is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChurnLogRegTask;

impl PredictTask for ChurnLogRegTask {
    type Request = ChurnRequest;
    type Response = ChurnResponse;

    const KIND: ModelKind = ModelKind::LogisticRegression;
    const POLICY: FallbackPolicy = FallbackPolicy::Always;
    const FEATURES: usize = CHURN_FEATURES;

    fn encode(&self, request: &ChurnRequest) -> FeatureVector {
        encode_churn(request)
    }

    fn interpret(&self, output: &RawOutput) -> Result<ChurnResponse, InferError> {
        churn_from_output(Self::KIND, output)
    }

    fn fallback(&self, request: &ChurnRequest) -> ChurnResponse {
        let verdict = ChurnVerdict::from_churn_probability(logreg_churn_probability(request));
        ChurnResponse::from_class_probability(
            Self::KIND,
            verdict.prediction,
            verdict.class_probability,
        )
    }
}
