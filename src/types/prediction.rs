//! Prediction result data structures

use serde::{Deserialize, Serialize};

/// Discrete classifier outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
    /// Heart disease predicted (class 1)
    Positive,
    /// No heart disease predicted (class 0)
    Negative,
}

impl RiskLabel {
    /// Map a raw binary class id to a label.
    ///
    /// Returns `None` for anything other than 0 or 1.
    pub fn from_class(class_id: i64) -> Option<Self> {
        match class_id {
            1 => Some(RiskLabel::Positive),
            0 => Some(RiskLabel::Negative),
            _ => None,
        }
    }

    pub fn is_positive(self) -> bool {
        self == RiskLabel::Positive
    }
}

/// Normalized output of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: RiskLabel,
    /// Positive-class probability in [0, 1], absent when the model
    /// could not produce one
    pub probability: Option<f64>,
}

impl PredictionResult {
    pub fn new(label: RiskLabel, probability: Option<f64>) -> Self {
        Self { label, probability }
    }

    /// True when the probability could not be obtained
    pub fn is_degraded(&self) -> bool {
        self.probability.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_class() {
        assert_eq!(RiskLabel::from_class(1), Some(RiskLabel::Positive));
        assert_eq!(RiskLabel::from_class(0), Some(RiskLabel::Negative));
        assert_eq!(RiskLabel::from_class(2), None);
        assert_eq!(RiskLabel::from_class(-1), None);
    }

    #[test]
    fn test_degraded_result() {
        let result = PredictionResult::new(RiskLabel::Positive, None);
        assert!(result.is_degraded());
        assert!(result.label.is_positive());
    }
}
