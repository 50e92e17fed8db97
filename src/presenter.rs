//! Maps prediction results to their external shapes

use crate::types::{PredictionResult, RiskLabel};
use serde::{Deserialize, Serialize};

/// JSON body returned by `POST /predict`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiPrediction {
    pub heart_disease: bool,
    /// Serialized as `null` when the model gave no probability
    pub probability: Option<f64>,
}

impl From<PredictionResult> for ApiPrediction {
    fn from(result: PredictionResult) -> Self {
        Self {
            heart_disease: result.label.is_positive(),
            probability: result.probability,
        }
    }
}

/// Human-facing risk class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    High,
    Low,
}

/// Message shown in the form's result panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMessage {
    pub class: RiskClass,
    pub text: String,
}

impl From<PredictionResult> for RiskMessage {
    fn from(result: PredictionResult) -> Self {
        let (class, headline) = match result.label {
            RiskLabel::Positive => (RiskClass::High, "⚠️ High risk of heart disease!"),
            RiskLabel::Negative => (RiskClass::Low, "✅ Low risk of heart disease"),
        };

        let text = match result.probability {
            Some(p) => format!("{} (Probability: {:.2})", headline, p),
            None => headline.to_string(),
        };

        Self { class, text }
    }
}
