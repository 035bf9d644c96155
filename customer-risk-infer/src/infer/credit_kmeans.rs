use crate::base::{FeatureVector, RawOutput};
use crate::errors::InferError;
use crate::fallback::SegmentRule;
use crate::infer::{FallbackPolicy, PredictTask};
use crate::models::constants::LABEL_OUTPUT;
use crate::preprocess::{encode_credit, CREDIT_FEATURES};
use crate::segments::SegmentTable;
use crate::types::{CreditCardRequest, ModelKind, SegmentationResponse};
use std::sync::Arc;

/// Credit card customer segmentation with the clustering artifact.
#[derive(Debug, Clone)]
pub struct CreditKmeansTask {
    segments: Arc<SegmentTable>,
}

impl CreditKmeansTask {
    pub fn new(segments: Arc<SegmentTable>) -> Self {
        CreditKmeansTask { segments }
    }

    pub fn segments(&self) -> &SegmentTable {
        &self.segments
    }

    fn respond(&self, cluster: i64) -> SegmentationResponse {
        SegmentationResponse {
            model: Self::KIND,
            cluster,
            segment: self.segments.interpret(cluster),
        }
    }
}

impl Default for CreditKmeansTask {
    fn default() -> Self {
        CreditKmeansTask::new(Arc::new(SegmentTable::builtin()))
    }
}

impl PredictTask for CreditKmeansTask {
    type Request = CreditCardRequest;
    type Response = SegmentationResponse;

    const KIND: ModelKind = ModelKind::Kmeans;
    const POLICY: FallbackPolicy = FallbackPolicy::Configured;
    const FEATURES: usize = CREDIT_FEATURES;

    fn encode(&self, request: &CreditCardRequest) -> FeatureVector {
        encode_credit(request)
    }

    fn interpret(&self, output: &RawOutput) -> Result<SegmentationResponse, InferError> {
        let cluster = output.scalar_label(LABEL_OUTPUT)?;
        Ok(self.respond(cluster))
    }

    fn fallback(&self, request: &CreditCardRequest) -> SegmentationResponse {
        self.respond(SegmentRule::classify(request).cluster())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{MockModelInfer, ModelInfer};
    use crate::infer::testing::cluster_output;
    use crate::infer::{PathMode, Predictor};
    use crate::segments::RiskLevel;
    use crate::types::credit::fixtures::*;

    #[test]
    fn fallback_segments_premium_account() {
        let response = CreditKmeansTask::default().fallback(&premium_credit_request());
        assert_eq!(response.cluster, 0);
        assert_eq!(response.segment.cluster, 0);
        assert_eq!(response.segment.risk(), RiskLevel::Low);
    }

    #[test]
    fn unknown_cluster_gets_generic_descriptor() {
        let response = CreditKmeansTask::default()
            .interpret(&cluster_output(42))
            .unwrap();
        assert_eq!(response.cluster, 42);
        assert_eq!(response.segment.name, "Segmento 42");
    }

    #[test]
    fn model_cluster_flows_through_injected_table() {
        let mut model = MockModelInfer::new();
        model
            .expect_infer()
            .withf(|features| features.len() == CREDIT_FEATURES)
            .returning(|_| Ok(cluster_output(3)));
        let predictor = Predictor::with_model(CreditKmeansTask::default(), Arc::new(model), false);
        assert_eq!(predictor.mode(), PathMode::ModelBacked);

        let response = predictor.predict(&premium_credit_request()).unwrap();
        assert_eq!(response.cluster, 3);
        assert_eq!(response.segment.risk(), RiskLevel::High);
    }

    #[test]
    fn oversized_amounts_reach_the_model_as_finite_values() {
        use crate::models::constants::{CENTROIDS_TENSOR, SCORES_OUTPUT};
        use crate::models::ModelSession;
        use candle_core::{Device, Tensor};
        use std::collections::HashMap;
        use std::path::Path;

        let mut request = premium_credit_request();
        request.balance = 1e39;
        let tensor = CreditKmeansTask::default()
            .encode(&request)
            .to_tensor(&Device::Cpu)
            .unwrap();
        let values = tensor.flatten_all().unwrap().to_vec1::<f32>().unwrap();
        assert!(values.iter().all(|v| v.is_finite()), "{:?}", values);

        let mut tensors = HashMap::new();
        tensors.insert(
            CENTROIDS_TENSOR.to_string(),
            Tensor::zeros((5, CREDIT_FEATURES), candle_core::DType::F32, &Device::Cpu).unwrap(),
        );
        let session =
            ModelSession::from_tensors(Path::new("memory"), &tensors, &Device::Cpu).unwrap();
        let output = session.infer(&encode_credit(&request)).unwrap();
        let scores = output.values_f64(SCORES_OUTPUT).unwrap();
        assert!(scores.iter().all(|s| s.is_finite()), "{:?}", scores);
    }

    #[test]
    fn disabled_fallback_fails_without_model() {
        let predictor = Predictor::fallback_only(CreditKmeansTask::default(), false);
        assert!(matches!(
            predictor.predict(&premium_credit_request()),
            Err(InferError::InferenceUnavailable { .. })
        ));
    }
}
