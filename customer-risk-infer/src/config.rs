use crate::errors::InferError;
use crate::trace::{parse_level, LogFormat};
use dotenv_config::EnvConfig;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Debug, EnvConfig, Clone)]
pub struct ServiceConfig {
    #[env_config(name = "SERVER_HOST", default = "0.0.0.0")]
    pub server_host: String,

    #[env_config(name = "PORT", default = 3000)]
    pub port: i32,

    #[env_config(name = "CORS_ORIGIN", default = "http://localhost:5173")]
    pub cors_origin: String,

    #[env_config(name = "CHURN_KNN_MODEL_PATH", default = "models/churn_knn.safetensors")]
    pub churn_knn_model_path: String,

    #[env_config(
        name = "CHURN_LOGREG_MODEL_PATH",
        default = "models/churn_logreg.safetensors"
    )]
    pub churn_logreg_model_path: String,

    #[env_config(
        name = "CREDIT_KMEANS_MODEL_PATH",
        default = "models/credit_kmeans.safetensors"
    )]
    pub credit_kmeans_model_path: String,

    // empty selects the built-in segment profiles
    #[env_config(name = "CREDIT_SEGMENTS_FILE", default = "")]
    pub credit_segments_file: String,

    #[env_config(name = "USE_FALLBACK", default = true)]
    pub use_fallback: bool,

    #[env_config(name = "INFERENCE_CPU", default = true)]
    pub inference_cpu: bool,

    #[env_config(name = "LOG_FORMAT", default = "text")]
    pub log_format: String,

    #[env_config(name = "LOG_LEVEL", default = "INFO")]
    pub log_level: String,

    #[env_config(name = "TIMEZONE", default = "UTC")]
    pub timezone: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            server_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: "http://localhost:5173".to_string(),
            churn_knn_model_path: "models/churn_knn.safetensors".to_string(),
            churn_logreg_model_path: "models/churn_logreg.safetensors".to_string(),
            credit_kmeans_model_path: "models/credit_kmeans.safetensors".to_string(),
            credit_segments_file: "".to_string(),
            use_fallback: true,
            inference_cpu: true,
            log_format: "text".to_string(),
            log_level: "INFO".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, InferError> {
        Self::init().map_err(|e| InferError::GenericError {
            msg: format!("invalid configuration: {}", e),
        })
    }

    /// Points every artifact path into `dir`, keeping the default file names.
    pub fn with_model_dir(mut self, dir: &Path) -> Self {
        let join = |name: &str| dir.join(name).to_string_lossy().to_string();
        self.churn_knn_model_path = join("churn_knn.safetensors");
        self.churn_logreg_model_path = join("churn_logreg.safetensors");
        self.credit_kmeans_model_path = join("credit_kmeans.safetensors");
        self
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.port)
    }

    pub fn segments_file(&self) -> Option<PathBuf> {
        match self.credit_segments_file.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        }
    }

    /// Unknown formats render as text.
    pub fn log_format(&self) -> LogFormat {
        self.log_format.parse().unwrap_or(LogFormat::Text)
    }

    pub fn log_level(&self) -> LevelFilter {
        parse_level(&self.log_level)
    }
}
