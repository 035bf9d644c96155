use crate::base::{FeatureVector, RawOutput};
use crate::errors::InferError;
use crate::fallback::{knn_churn_score, ChurnVerdict};
use crate::infer::{churn_from_output, FallbackPolicy, PredictTask};
use crate::preprocess::{encode_churn, CHURN_FEATURES};
use crate::types::{ChurnRequest, ChurnResponse, ModelKind};

/// Churn prediction with the nearest-neighbour artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChurnKnnTask;

impl PredictTask for ChurnKnnTask {
    type Request = ChurnRequest;
    type Response = ChurnResponse;

    const KIND: ModelKind = ModelKind::Knn;
    const POLICY: FallbackPolicy = FallbackPolicy::Configured;
    const FEATURES: usize = CHURN_FEATURES;

    fn encode(&self, request: &ChurnRequest) -> FeatureVector {
        encode_churn(request)
    }

    fn interpret(&self, output: &RawOutput) -> Result<ChurnResponse, InferError> {
        churn_from_output(Self::KIND, output)
    }

    fn fallback(&self, request: &ChurnRequest) -> ChurnResponse {
        let verdict = ChurnVerdict::from_churn_probability(knn_churn_score(request));
        ChurnResponse::from_class_probability(
            Self::KIND,
            verdict.prediction,
            verdict.class_probability,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::testing::churn_output;
    use crate::types::churn::fixtures::*;

    #[test]
    fn fallback_flags_high_risk_customer() {
        let response = ChurnKnnTask.fallback(&high_risk_churn_request());
        assert_eq!(response.prediction, 1);
        assert_eq!(response.probability, 0.99);
        assert!(response.message.contains("alta"), "{}", response.message);
    }

    #[test]
    fn interpret_reports_probability_of_predicted_class() {
        let response = ChurnKnnTask
            .interpret(&churn_output(0, 2.0 / 3.0, 1.0 / 3.0))
            .unwrap();
        assert_eq!(response.prediction, 0);
        assert_eq!(response.probability, 0.67);

        let response = ChurnKnnTask.interpret(&churn_output(1, 0.4, 0.6)).unwrap();
        assert_eq!(response.prediction, 1);
        assert_eq!(response.probability, 0.6);
    }

    #[test]
    fn interpret_rejects_missing_probabilities() {
        let output = RawOutput::new().with(
            crate::models::constants::LABEL_OUTPUT,
            candle_core::Tensor::new(&[1i64], &candle_core::Device::Cpu).unwrap(),
        );
        assert!(matches!(
            ChurnKnnTask.interpret(&output),
            Err(InferError::OutputError { .. })
        ));
    }
}
