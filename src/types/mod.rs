//! Type definitions for the heart risk service

pub mod dictionary;
pub mod patient;
pub mod prediction;
pub mod request;

pub use dictionary::{FeatureKind, FeatureSpec, HEART_FEATURES};
pub use patient::PatientRecord;
pub use prediction::{PredictionResult, RiskLabel};
pub use request::{FeatureVector, PredictionRequest};
