use crate::errors::InferError;
use candle_core::{DType, Device, Tensor};
use std::collections::HashMap;

/// Ordered numeric encoding of one request, in the column order the paired
/// artifact was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        FeatureVector { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Batch-of-one f32 tensor. Entries that are not finite once narrowed
    /// to f32, including values beyond `f32::MAX`, become 0.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor, InferError> {
        let data = self
            .values
            .iter()
            .map(|v| {
                let x = *v as f32;
                if x.is_finite() {
                    x
                } else {
                    0f32
                }
            })
            .collect::<Vec<f32>>();
        let tensor = Tensor::from_vec(data, (1, self.values.len()), device)?;
        Ok(tensor)
    }
}

/// Named tensors produced by one inference call.
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    names: Vec<String>,
    outputs: HashMap<String, Tensor>,
}

impl RawOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with(mut self, name: &str, tensor: Tensor) -> Self {
        self.insert(name, tensor);
        self
    }

    pub fn insert(&mut self, name: &str, tensor: Tensor) {
        if !self.outputs.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.outputs.insert(name.to_string(), tensor);
    }

    pub fn output_names(&self) -> &Vec<String> {
        &self.names
    }

    pub fn get(&self, name: &str) -> Result<&Tensor, InferError> {
        self.outputs.get(name).ok_or_else(|| InferError::OutputError {
            name: name.to_string(),
            msg: "not produced by model".to_string(),
        })
    }

    /// Flattened values of an output, whatever its dtype.
    pub fn values_f64(&self, name: &str) -> Result<Vec<f64>, InferError> {
        let values = self
            .get(name)?
            .to_dtype(DType::F64)?
            .flatten_all()?
            .to_vec1::<f64>()?;
        Ok(values)
    }

    /// First element of an output rounded to the nearest integer. Integer
    /// labels pass through unchanged, float labels are rounded.
    pub fn scalar_label(&self, name: &str) -> Result<i64, InferError> {
        let values = self.values_f64(name)?;
        match values.first() {
            Some(value) if value.is_finite() => Ok(value.round() as i64),
            Some(value) => Err(InferError::OutputError {
                name: name.to_string(),
                msg: format!("non-finite label {}", value),
            }),
            None => Err(InferError::OutputError {
                name: name.to_string(),
                msg: "empty tensor".to_string(),
            }),
        }
    }
}

/// Scoring capability behind the model-backed prediction path.
#[cfg_attr(test, mockall::automock)]
pub trait ModelInfer {
    /// Number of features the model expects per row.
    fn input_len(&self) -> usize;

    fn output_names(&self) -> Vec<String>;

    fn infer(&self, features: &FeatureVector) -> Result<RawOutput, InferError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_tensor_replaces_non_finite_values() {
        let features = FeatureVector::new(vec![1.5, f64::NAN, f64::INFINITY, -2.0]);
        let tensor = features.to_tensor(&Device::Cpu).unwrap();
        assert_eq!(tensor.dims(), &[1, 4]);
        let values = tensor.to_vec2::<f32>().unwrap();
        assert_eq!(values, vec![vec![1.5, 0.0, 0.0, -2.0]]);
    }

    #[test]
    fn to_tensor_zeroes_values_beyond_f32_range() {
        let features = FeatureVector::new(vec![1e39, -1e39, 1e41 * 0.01388889, 5.0]);
        let values = features
            .to_tensor(&Device::Cpu)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();
        assert!(values.iter().all(|v| v.is_finite()), "{:?}", values);
        assert_eq!(values, vec![0.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn scalar_label_rounds_float_outputs() {
        let device = Device::Cpu;
        let output = RawOutput::new()
            .with("label", Tensor::new(&[2.6f32], &device).unwrap())
            .with("other", Tensor::new(&[3i64], &device).unwrap());
        assert_eq!(output.scalar_label("label").unwrap(), 3);
        assert_eq!(output.scalar_label("other").unwrap(), 3);
        assert_eq!(output.output_names(), &vec!["label".to_string(), "other".to_string()]);
    }

    #[test]
    fn missing_output_is_an_error() {
        let output = RawOutput::new();
        assert!(matches!(
            output.get("probabilities"),
            Err(InferError::OutputError { .. })
        ));
    }
}
