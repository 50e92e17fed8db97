//! ONNX model loader and classifier adapter

use super::{Classification, Classifier};
use anyhow::{anyhow, Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Binary classifier backed by an ONNX Runtime session.
///
/// Expects the layout produced by skl2onnx for scikit-learn classifiers:
/// an int64 `label` output plus a `probabilities` output that is either a
/// float tensor or a `seq(map(int64, float))`.
pub struct OnnxClassifier {
    /// Session needs exclusive access while running
    session: Mutex<Session>,
    input_name: String,
    label_output: String,
    /// Absent when the exported model has no probability output
    proba_output: Option<String>,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load a classifier from an ONNX file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<OnnxClassifier> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| anyhow!("Model {} declares no outputs", path.display()))?;

        let proba_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone());

        info!(
            input = %input_name,
            label = %label_output,
            probabilities = ?proba_output,
            "Model loaded successfully"
        );

        Ok(OnnxClassifier {
            session: Mutex::new(session),
            input_name,
            label_output,
            proba_output,
        })
    }
}

impl OnnxClassifier {
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn label_output(&self) -> &str {
        &self.label_output
    }

    pub fn proba_output(&self) -> Option<&str> {
        self.proba_output.as_deref()
    }

    /// Run the session once on a single row and hand its outputs to `read`
    fn with_outputs<T>(&self, features: &[f64], read: impl FnOnce(&SessionOutputs) -> T) -> Result<T> {
        // Shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let data: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_array((shape, data)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![&self.input_name => input])?;
        Ok(read(&outputs))
    }

    fn extract_label(&self, outputs: &SessionOutputs) -> Result<i64> {
        let output = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| anyhow!("Model produced no '{}' output", self.label_output))?;

        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            return data
                .first()
                .copied()
                .ok_or_else(|| anyhow!("Empty label tensor"));
        }

        // Some exporters emit float class ids
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return data
                .first()
                .map(|&v| v.round() as i64)
                .ok_or_else(|| anyhow!("Empty label tensor"));
        }

        Err(anyhow!("Unsupported label output type: {:?}", output.dtype()))
    }

    /// Extract the positive-class probability.
    /// Handles both tensor outputs (zipmap disabled) and seq(map) outputs (zipmap enabled).
    fn extract_probability(&self, outputs: &SessionOutputs) -> Result<f64> {
        let output_name = self
            .proba_output
            .as_deref()
            .ok_or_else(|| anyhow!("Model does not expose class probabilities"))?;

        let output = outputs
            .get(output_name)
            .ok_or_else(|| anyhow!("Model produced no '{}' output", output_name))?;

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            let prob = probability_from_tensor(&dims, data)?;
            debug!(prob = prob, "Extracted from tensor");
            return Ok(prob);
        }

        let dtype = output.dtype();
        if DynSequenceValueType::can_downcast(&dtype) {
            return extract_from_sequence_map(output);
        }

        Err(anyhow!("Unsupported probability output type: {:?}", dtype))
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f64]) -> Result<i64> {
        self.with_outputs(features, |outputs| self.extract_label(outputs))?
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        self.with_outputs(features, |outputs| self.extract_probability(outputs))?
    }

    fn classify(&self, features: &[f64]) -> Result<Classification> {
        self.with_outputs(features, |outputs| {
            Ok(Classification {
                class_id: self.extract_label(outputs)?,
                probability: self.extract_probability(outputs),
            })
        })?
    }
}

/// Extract probability from seq(map(int64, float)) format
fn extract_from_sequence_map(output: &DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    // Batch size is always 1
    let map_value = maps.first().ok_or_else(|| anyhow!("Empty sequence"))?;
    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 1) {
        debug!(prob = *prob, "Extracted from seq(map)");
        return Ok(widen(*prob));
    }

    // Only class 0 reported
    if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 0) {
        return Ok(1.0 - widen(*prob));
    }

    Err(anyhow!("No probability found in map"))
}

/// Pick the positive-class probability out of a probability tensor.
fn probability_from_tensor(dims: &[i64], data: &[f32]) -> Result<f64> {
    let num_classes = match dims {
        [_batch, classes] => *classes,
        [classes] => *classes,
        _ => return Err(anyhow!("Unexpected probability tensor shape {:?}", dims)),
    };

    let index = match num_classes {
        // [.., num_classes] - positive class is index 1
        n if n >= 2 => 1,
        // [.., 1] - single positive-class probability
        1 => 0,
        _ => return Err(anyhow!("Probability tensor has no classes")),
    };

    data.get(index)
        .map(|&v| widen(v))
        .ok_or_else(|| anyhow!("Probability tensor shorter than its shape"))
}

/// Widen through the shortest decimal that round-trips the f32, so a
/// stored 0.82 is reported as 0.82 rather than 0.8199999928474426.
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}
