//! Inference pipeline shared by the HTTP API and the form surface

use crate::assembler::VectorAssembler;
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::metrics::InferenceMetrics;
use crate::models::{Classifier, ModelLoader, Predictor};
use crate::schema::{FeatureSchema, ModelMetadata};
use crate::types::{PredictionRequest, PredictionResult};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Process-wide inference handle.
///
/// Built once at startup and shared read-only by every request.
pub struct InferencePipeline {
    metadata: ModelMetadata,
    predictor: Predictor,
    metrics: Arc<InferenceMetrics>,
}

impl InferencePipeline {
    /// Build a pipeline around an already loaded classifier
    pub fn new(metadata: ModelMetadata, classifier: Arc<dyn Classifier>) -> Self {
        let predictor = Predictor::new(classifier, metadata.schema.len());
        Self {
            metadata,
            predictor,
            metrics: Arc::new(InferenceMetrics::new()),
        }
    }

    /// Load the descriptor and ONNX model named in the configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let metadata = ModelMetadata::load(&config.model.meta_path)?;

        let classifier = ModelLoader::with_threads(config.model.onnx_threads)
            .load(&config.model.model_path)
            .context("Failed to load model artifact")?;

        info!(
            model_type = %metadata.model_type,
            features = ?metadata.schema.names(),
            "Inference pipeline initialized"
        );

        Ok(Self::new(metadata, Arc::new(classifier)))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.metadata.schema
    }

    pub fn model_type(&self) -> &str {
        &self.metadata.model_type
    }

    pub fn metrics(&self) -> &Arc<InferenceMetrics> {
        &self.metrics
    }

    /// Validate, assemble and classify one request.
    ///
    /// Validation failures are returned before the model is touched.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PipelineError> {
        self.predict_filled(request, &[])
    }

    /// Classify a request where the `filled` features carry service-side
    /// defaults instead of caller input; those skip the range check.
    pub fn predict_filled(
        &self,
        request: &PredictionRequest,
        filled: &[String],
    ) -> Result<PredictionResult, PipelineError> {
        let request_id = Uuid::new_v4();
        let start_time = Instant::now();

        let features = match VectorAssembler::new(self.schema()).assemble_filled(request, filled) {
            Ok(features) => features,
            Err(e) => {
                self.metrics.record_validation_failure();
                warn!(
                    request_id = %request_id,
                    features = ?e.features(),
                    error = %e,
                    "Rejected prediction request"
                );
                return Err(e.into());
            }
        };

        match self.predictor.predict(&features) {
            Ok(result) => {
                let elapsed = start_time.elapsed();
                self.metrics.record_prediction(elapsed, &result);
                info!(
                    request_id = %request_id,
                    label = ?result.label,
                    probability = ?result.probability,
                    processing_time_us = elapsed.as_micros(),
                    "Prediction served"
                );
                Ok(result)
            }
            Err(e) => {
                self.metrics.record_internal_error();
                error!(request_id = %request_id, error = %e, "Inference failed");
                Err(e.into())
            }
        }
    }
}
