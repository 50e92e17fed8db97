//! Predictor: invokes the classifier and normalizes its output

use super::{Classification, Classifier};
use crate::error::InternalPredictionError;
use crate::types::{FeatureVector, PredictionResult, RiskLabel};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Runs a loaded classifier on assembled feature vectors.
///
/// Stateless given the classifier; safe to share across requests.
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    feature_count: usize,
}

impl Predictor {
    /// Create a predictor expecting vectors of `feature_count` elements
    pub fn new(classifier: Arc<dyn Classifier>, feature_count: usize) -> Self {
        Self {
            classifier,
            feature_count,
        }
    }

    /// Classify a feature vector.
    ///
    /// A failure to obtain the probability degrades the result (probability
    /// becomes `None`); only a failure of the label itself is an error.
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, InternalPredictionError> {
        if features.len() != self.feature_count {
            return Err(InternalPredictionError::new(format!(
                "feature vector has {} elements, model expects {}",
                features.len(),
                self.feature_count
            )));
        }

        let Classification {
            class_id,
            probability,
        } = self.classifier.classify(features.as_slice()).map_err(|e| {
            error!(error = %e, "Model classification failed");
            InternalPredictionError::new(e.to_string())
        })?;

        let label = RiskLabel::from_class(class_id).ok_or_else(|| {
            error!(class_id = class_id, "Model returned a non-binary class");
            InternalPredictionError::new(format!("model returned unexpected class {}", class_id))
        })?;

        let probability = match probability {
            Ok(p) if p.is_finite() && (0.0..=1.0).contains(&p) => Some(p),
            Ok(p) => {
                warn!(probability = p, "Model returned an out-of-range probability, omitting it");
                None
            }
            Err(e) => {
                warn!(error = %e, "Probability unavailable, returning label only");
                None
            }
        };

        debug!(label = ?label, probability = ?probability, "Prediction complete");

        Ok(PredictionResult { label, probability })
    }
}
