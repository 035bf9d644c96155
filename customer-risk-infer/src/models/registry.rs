use crate::errors::InferError;
use crate::models::session::ModelSession;
use candle_core::Device;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Process-wide cache of loaded artifacts keyed by canonical path. Loading the
/// same file twice, however it is spelled, yields the same session.
#[derive(Debug)]
pub struct ModelRegistry {
    device: Device,
    sessions: RwLock<HashMap<PathBuf, Arc<ModelSession>>>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        ModelRegistry::new(Device::Cpu)
    }
}

impl ModelRegistry {
    pub fn new(device: Device) -> Self {
        ModelRegistry {
            device,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Cache key: the canonical path when the file exists, otherwise the
    /// path made absolute against the working directory.
    fn absolute(path: &Path) -> PathBuf {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            match std::env::current_dir() {
                Ok(cwd) => cwd.join(path),
                Err(_) => path.to_path_buf(),
            }
        };
        std::fs::canonicalize(&absolute).unwrap_or(absolute)
    }

    pub fn exists(&self, path: &Path) -> bool {
        Self::absolute(path).is_file()
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        let key = Self::absolute(path);
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached session for `path`, loading it on first use.
    /// Failures are not cached; a later call retries the load.
    pub fn load(&self, path: &Path) -> Result<Arc<ModelSession>, InferError> {
        let key = Self::absolute(path);

        if let Some(session) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            debug!(path = %key.display(), "model session cache hit");
            return Ok(session.clone());
        }

        if !key.is_file() {
            return Err(InferError::ArtifactNotFound { path: key });
        }

        let session = Arc::new(ModelSession::from_file(&key, &self.device)?);

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // a concurrent loader may have won the race; keep its session
        let session = sessions.entry(key.clone()).or_insert(session).clone();
        info!(path = %key.display(), input_len = session.scorer().input_len(), "model artifact loaded");
        Ok(session)
    }
}
