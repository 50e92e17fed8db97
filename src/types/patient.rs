//! Typed patient record for the 13 standard features

use super::request::PredictionRequest;
use serde::{Deserialize, Serialize};

/// One patient's measurements, field names matching the standard schema
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    /// Age in years
    pub age: f64,
    /// Sex (0 = female, 1 = male)
    pub sex: f64,
    /// Chest pain type (0-3)
    pub cp: f64,
    /// Resting blood pressure (mm Hg)
    pub trestbps: f64,
    /// Serum cholesterol (mg/dl)
    pub chol: f64,
    /// Fasting blood sugar > 120 mg/dl (0/1)
    pub fbs: f64,
    /// Resting ECG result (0-2)
    pub restecg: f64,
    /// Maximum heart rate achieved
    pub thalach: f64,
    /// Exercise induced angina (0/1)
    pub exang: f64,
    /// ST depression induced by exercise relative to rest
    pub oldpeak: f64,
    /// Slope of the peak exercise ST segment (0-2)
    pub slope: f64,
    /// Major vessels colored by fluoroscopy (0-4)
    pub ca: f64,
    /// Thalassemia (0-3)
    pub thal: f64,
}

impl PatientRecord {
    /// Values paired with their feature names, in training order
    pub fn fields(&self) -> [(&'static str, f64); 13] {
        [
            ("age", self.age),
            ("sex", self.sex),
            ("cp", self.cp),
            ("trestbps", self.trestbps),
            ("chol", self.chol),
            ("fbs", self.fbs),
            ("restecg", self.restecg),
            ("thalach", self.thalach),
            ("exang", self.exang),
            ("oldpeak", self.oldpeak),
            ("slope", self.slope),
            ("ca", self.ca),
            ("thal", self.thal),
        ]
    }
}

impl From<PatientRecord> for PredictionRequest {
    fn from(record: PatientRecord) -> Self {
        record
            .fields()
            .into_iter()
            .fold(PredictionRequest::new(), |request, (name, value)| {
                request.with(name, value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dictionary::standard_feature_names;

    fn record() -> PatientRecord {
        PatientRecord {
            age: 63.0,
            sex: 1.0,
            cp: 3.0,
            trestbps: 145.0,
            chol: 233.0,
            fbs: 1.0,
            restecg: 0.0,
            thalach: 150.0,
            exang: 0.0,
            oldpeak: 2.3,
            slope: 0.0,
            ca: 0.0,
            thal: 1.0,
        }
    }

    #[test]
    fn test_fields_follow_standard_order() {
        let names: Vec<&str> = record().fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, standard_feature_names());
    }

    #[test]
    fn test_into_request() {
        let request = PredictionRequest::from(record());

        assert_eq!(request.len(), 13);
        assert_eq!(request.get("oldpeak").and_then(|v| v.as_f64()), Some(2.3));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let mut value = serde_json::to_value(record()).unwrap();
        value["bmi"] = serde_json::json!(27.0);

        assert!(serde_json::from_value::<PatientRecord>(value).is_err());
    }
}
