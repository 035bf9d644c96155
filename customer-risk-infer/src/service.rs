use crate::config::ServiceConfig;
use crate::errors::InferError;
use crate::infer::{ChurnKnnTask, ChurnLogRegTask, CreditKmeansTask, PathMode, Predictor};
use crate::models::{device, ModelRegistry};
use crate::segments::SegmentTable;
use crate::types::{
    ChurnRequest, ChurnResponse, CreditCardRequest, SegmentationResponse, Validate,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelHealth {
    pub knn: PathMode,
    pub logistic_regression: PathMode,
    pub kmeans: PathMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub models: ModelHealth,
}

/// The three prediction tasks behind one shared artifact registry.
pub struct PredictionService {
    config: ServiceConfig,
    registry: Arc<ModelRegistry>,
    churn_knn: Arc<Predictor<ChurnKnnTask>>,
    churn_logreg: Arc<Predictor<ChurnLogRegTask>>,
    credit_kmeans: Arc<Predictor<CreditKmeansTask>>,
}

fn segment_table(config: &ServiceConfig) -> Result<Arc<SegmentTable>, InferError> {
    let table = match config.segments_file() {
        Some(path) => SegmentTable::from_json_file(&path)?,
        None => SegmentTable::builtin(),
    };
    Ok(Arc::new(table))
}

fn registry(config: &ServiceConfig) -> Result<Arc<ModelRegistry>, InferError> {
    Ok(Arc::new(ModelRegistry::new(device(config.inference_cpu)?)))
}

impl PredictionService {
    /// Loads every artifact before returning.
    pub fn load(config: ServiceConfig) -> Result<Self, InferError> {
        let registry = registry(&config)?;
        let segments = segment_table(&config)?;
        let allow = config.use_fallback;

        let churn_knn = Arc::new(Predictor::load(
            ChurnKnnTask,
            Path::new(&config.churn_knn_model_path),
            allow,
            &registry,
        ));
        let churn_logreg = Arc::new(Predictor::load(
            ChurnLogRegTask,
            Path::new(&config.churn_logreg_model_path),
            allow,
            &registry,
        ));
        let credit_kmeans = Arc::new(Predictor::load(
            CreditKmeansTask::new(segments),
            Path::new(&config.credit_kmeans_model_path),
            allow,
            &registry,
        ));

        let service = PredictionService {
            config,
            registry,
            churn_knn,
            churn_logreg,
            credit_kmeans,
        };
        info!(models = ?service.health().models, "prediction service loaded");
        Ok(service)
    }

    /// Returns at once; artifacts load in the background and requests are
    /// answered by fallback until each one settles.
    pub fn start(config: ServiceConfig) -> Result<Self, InferError> {
        let registry = registry(&config)?;
        let segments = segment_table(&config)?;
        let allow = config.use_fallback;

        let churn_knn = Predictor::spawn(
            ChurnKnnTask,
            Path::new(&config.churn_knn_model_path),
            allow,
            registry.clone(),
        );
        let churn_logreg = Predictor::spawn(
            ChurnLogRegTask,
            Path::new(&config.churn_logreg_model_path),
            allow,
            registry.clone(),
        );
        let credit_kmeans = Predictor::spawn(
            CreditKmeansTask::new(segments),
            Path::new(&config.credit_kmeans_model_path),
            allow,
            registry.clone(),
        );

        info!(use_fallback = allow, "prediction service started");
        Ok(PredictionService {
            config,
            registry,
            churn_knn,
            churn_logreg,
            credit_kmeans,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn predict_churn_knn(&self, request: &ChurnRequest) -> Result<ChurnResponse, InferError> {
        request.validate()?;
        self.churn_knn.predict(request)
    }

    pub fn predict_churn_logreg(
        &self,
        request: &ChurnRequest,
    ) -> Result<ChurnResponse, InferError> {
        request.validate()?;
        self.churn_logreg.predict(request)
    }

    pub fn predict_credit_segment(
        &self,
        request: &CreditCardRequest,
    ) -> Result<SegmentationResponse, InferError> {
        request.validate()?;
        self.credit_kmeans.predict(request)
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok".to_string(),
            models: ModelHealth {
                knn: self.churn_knn.mode(),
                logistic_regression: self.churn_logreg.mode(),
                kmeans: self.credit_kmeans.mode(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::churn::fixtures::*;
    use crate::types::credit::fixtures::*;

    fn empty_dir_config(dir: &Path, use_fallback: bool) -> ServiceConfig {
        ServiceConfig {
            use_fallback,
            ..ServiceConfig::default().with_model_dir(dir)
        }
    }

    #[test]
    fn missing_artifacts_leave_every_task_on_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let service = PredictionService::load(empty_dir_config(dir.path(), true)).unwrap();

        let health = service.health();
        assert_eq!(health.status, "ok");
        assert_eq!(health.models.knn, PathMode::FallbackOnly);
        assert_eq!(health.models.logistic_regression, PathMode::FallbackOnly);
        assert_eq!(health.models.kmeans, PathMode::FallbackOnly);
        assert!(service.registry().is_empty());

        assert_eq!(
            service
                .predict_churn_knn(&high_risk_churn_request())
                .unwrap()
                .prediction,
            1
        );
        assert_eq!(
            service
                .predict_credit_segment(&premium_credit_request())
                .unwrap()
                .cluster,
            0
        );
    }

    #[test]
    fn disabled_fallback_only_spares_logistic_task() {
        let dir = tempfile::tempdir().unwrap();
        let service = PredictionService::load(empty_dir_config(dir.path(), false)).unwrap();

        assert!(matches!(
            service.predict_churn_knn(&loyal_churn_request()),
            Err(InferError::InferenceUnavailable { .. })
        ));
        assert!(matches!(
            service.predict_credit_segment(&premium_credit_request()),
            Err(InferError::InferenceUnavailable { .. })
        ));
        assert!(service.predict_churn_logreg(&loyal_churn_request()).is_ok());
    }

    #[test]
    fn invalid_request_is_rejected_before_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let service = PredictionService::load(empty_dir_config(dir.path(), true)).unwrap();

        let mut request = loyal_churn_request();
        request.monthly_charge = -1.0;
        let err = service.predict_churn_logreg(&request).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn unreadable_segments_file_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            credit_segments_file: dir
                .path()
                .join("nope.json")
                .to_string_lossy()
                .to_string(),
            ..empty_dir_config(dir.path(), true)
        };
        assert!(PredictionService::load(config).is_err());
    }

    #[test]
    fn health_serializes_mode_names() {
        let report = HealthReport {
            status: "ok".to_string(),
            models: ModelHealth {
                knn: PathMode::ModelBacked,
                logistic_regression: PathMode::FallbackOnly,
                kmeans: PathMode::Loading,
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": "ok",
                "models": {"knn": "model", "logistic_regression": "fallback", "kmeans": "loading"}
            })
        );
    }
}
