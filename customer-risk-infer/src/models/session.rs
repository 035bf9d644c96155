use crate::base::{FeatureVector, ModelInfer, RawOutput};
use crate::errors::InferError;
use crate::models::constants::{
    CENTROIDS_TENSOR, COEFFICIENTS_TENSOR, INTERCEPT_TENSOR, K_TENSOR, LABEL_OUTPUT,
    NEIGHBORS_TENSOR, NEIGHBOR_LABELS_TENSOR, PROBABILITIES_OUTPUT, SCORES_OUTPUT,
};
use candle_core::{DType, Device, Tensor};
use itertools::Itertools;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

fn malformed(msg: impl Into<String>) -> InferError {
    InferError::GenericError { msg: msg.into() }
}

fn required<'a>(
    tensors: &'a HashMap<String, Tensor>,
    name: &str,
) -> Result<&'a Tensor, InferError> {
    tensors
        .get(name)
        .ok_or_else(|| malformed(format!("missing tensor `{}`", name)))
}

/// Scoring function carried by an artifact, selected by its tensor names.
#[derive(Debug, Clone)]
pub enum Scorer {
    /// Binary logistic model; `coefficients` is `[n, 1]`, `intercept` `[1, 1]`.
    Logistic {
        coefficients: Tensor,
        intercept: Tensor,
    },
    /// Uniform-vote k nearest neighbours over `points` `[m, n]`.
    Neighbors {
        points: Tensor,
        labels: Vec<i64>,
        k: usize,
    },
    /// Nearest centroid; `centroids` is `[c, n]`.
    Centroids { centroids: Tensor },
}

impl Scorer {
    pub fn from_tensors(tensors: &HashMap<String, Tensor>) -> Result<Self, InferError> {
        if let Some(coefficients) = tensors.get(COEFFICIENTS_TENSOR) {
            let coefficients = coefficients.to_dtype(DType::F32)?.flatten_all()?;
            let width = coefficients.elem_count();
            if width == 0 {
                return Err(malformed("empty coefficient tensor"));
            }
            let intercept = required(tensors, INTERCEPT_TENSOR)?
                .to_dtype(DType::F32)?
                .flatten_all()?;
            if intercept.elem_count() != 1 {
                return Err(malformed(format!(
                    "intercept must hold one value, found {}",
                    intercept.elem_count()
                )));
            }
            return Ok(Scorer::Logistic {
                coefficients: coefficients.reshape((width, 1))?,
                intercept: intercept.reshape((1, 1))?,
            });
        }

        if let Some(points) = tensors.get(NEIGHBORS_TENSOR) {
            let points = points.to_dtype(DType::F32)?;
            let (rows, width) = points.dims2()?;
            if rows == 0 || width == 0 {
                return Err(malformed("empty neighbour set"));
            }
            let labels = required(tensors, NEIGHBOR_LABELS_TENSOR)?
                .to_dtype(DType::I64)?
                .flatten_all()?
                .to_vec1::<i64>()?;
            if labels.len() != rows {
                return Err(malformed(format!(
                    "{} neighbour labels for {} neighbours",
                    labels.len(),
                    rows
                )));
            }
            if let Some(label) = labels.iter().find(|l| **l != 0 && **l != 1) {
                return Err(malformed(format!("neighbour label {} is not binary", label)));
            }
            let k = required(tensors, K_TENSOR)?
                .to_dtype(DType::I64)?
                .flatten_all()?
                .to_vec1::<i64>()?
                .first()
                .copied()
                .ok_or_else(|| malformed("empty `k` tensor"))?;
            if k < 1 || k as usize > rows {
                return Err(malformed(format!("k = {} outside 1..={}", k, rows)));
            }
            return Ok(Scorer::Neighbors {
                points,
                labels,
                k: k as usize,
            });
        }

        if let Some(centroids) = tensors.get(CENTROIDS_TENSOR) {
            let centroids = centroids.to_dtype(DType::F32)?;
            let (rows, width) = centroids.dims2()?;
            if rows == 0 || width == 0 {
                return Err(malformed("empty centroid set"));
            }
            return Ok(Scorer::Centroids { centroids });
        }

        Err(malformed(format!(
            "unrecognised artifact layout, tensors: [{}]",
            tensors.keys().sorted().join(", ")
        )))
    }

    pub fn input_len(&self) -> usize {
        match self {
            Scorer::Logistic { coefficients, .. } => coefficients.dims()[0],
            Scorer::Neighbors { points, .. } => points.dims()[1],
            Scorer::Centroids { centroids } => centroids.dims()[1],
        }
    }

    pub fn output_names(&self) -> Vec<String> {
        let second = match self {
            Scorer::Logistic { .. } | Scorer::Neighbors { .. } => PROBABILITIES_OUTPUT,
            Scorer::Centroids { .. } => SCORES_OUTPUT,
        };
        vec![LABEL_OUTPUT.to_string(), second.to_string()]
    }

    fn score(&self, input: &Tensor) -> Result<RawOutput, InferError> {
        let device = input.device();
        match self {
            Scorer::Logistic {
                coefficients,
                intercept,
            } => {
                let logit = input.matmul(coefficients)?.broadcast_add(intercept)?;
                let churn = logit.neg()?.exp()?.affine(1.0, 1.0)?.recip()?;
                let stay = churn.affine(-1.0, 1.0)?;
                let probabilities = Tensor::cat(&[&stay, &churn], 1)?;
                let p = churn
                    .flatten_all()?
                    .to_vec1::<f32>()?
                    .first()
                    .copied()
                    .ok_or_else(|| malformed("empty logistic output"))?;
                let label: i64 = if p >= 0.5 { 1 } else { 0 };
                Ok(RawOutput::new()
                    .with(LABEL_OUTPUT, Tensor::new(&[label], device)?)
                    .with(PROBABILITIES_OUTPUT, probabilities))
            }
            Scorer::Neighbors { points, labels, k } => {
                let distances = points.broadcast_sub(input)?.sqr()?.sum(1)?.to_vec1::<f32>()?;
                let votes = distances
                    .iter()
                    .zip(labels.iter())
                    .sorted_by(|a, b| a.0.total_cmp(b.0))
                    .take(*k)
                    .filter(|(_, label)| **label == 1)
                    .count();
                let churn = votes as f32 / *k as f32;
                let stay = 1.0 - churn;
                // ties resolve to the first class
                let label: i64 = if churn > stay { 1 } else { 0 };
                Ok(RawOutput::new()
                    .with(LABEL_OUTPUT, Tensor::new(&[label], device)?)
                    .with(PROBABILITIES_OUTPUT, Tensor::new(&[[stay, churn]], device)?))
            }
            Scorer::Centroids { centroids } => {
                let distances = centroids.broadcast_sub(input)?.sqr()?.sum(1)?;
                let label = distances.argmin(0)?.to_dtype(DType::I64)?.reshape(1)?;
                let scores = distances.sqrt()?.unsqueeze(0)?;
                Ok(RawOutput::new()
                    .with(LABEL_OUTPUT, label)
                    .with(SCORES_OUTPUT, scores))
            }
        }
    }
}

/// Loaded artifact ready to score feature vectors.
#[derive(Debug)]
pub struct ModelSession {
    path: PathBuf,
    scorer: Scorer,
    input_len: usize,
    device: Device,
}

impl ModelSession {
    pub fn from_file(path: &Path, device: &Device) -> Result<Self, InferError> {
        let tensors =
            candle_core::safetensors::load(path, device).map_err(|e| InferError::ArtifactLoadError {
                path: path.to_path_buf(),
                msg: e.to_string(),
            })?;
        Self::from_tensors(path, &tensors, device)
    }

    pub fn from_tensors(
        path: &Path,
        tensors: &HashMap<String, Tensor>,
        device: &Device,
    ) -> Result<Self, InferError> {
        let scorer = Scorer::from_tensors(tensors).map_err(|e| InferError::ArtifactLoadError {
            path: path.to_path_buf(),
            msg: e.to_string(),
        })?;
        let input_len = scorer.input_len();
        Ok(ModelSession {
            path: path.to_path_buf(),
            scorer,
            input_len,
            device: device.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }
}

impl ModelInfer for ModelSession {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn output_names(&self) -> Vec<String> {
        self.scorer.output_names()
    }

    fn infer(&self, features: &FeatureVector) -> Result<RawOutput, InferError> {
        if features.len() != self.input_len {
            return Err(InferError::ShapeMismatch {
                expected: self.input_len,
                actual: features.len(),
            });
        }
        let input = features.to_tensor(&self.device)?;
        let output = self.scorer.score(&input)?;
        debug!(path = %self.path.display(), outputs = ?output.output_names(), "inference done");
        Ok(output)
    }
}
