//! Error types for the heart risk service

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the feature-order descriptor. Fatal at startup.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("failed to read model descriptor {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model descriptor {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model descriptor {path} lists no features")]
    EmptyFeatures { path: PathBuf },

    #[error("model descriptor {path} lists feature '{name}' more than once")]
    DuplicateFeature { path: PathBuf, name: String },
}

/// A present but unusable feature value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidValue {
    pub feature: String,
    pub reason: String,
}

/// Caller-input problems, all collected from one request
#[derive(Debug, Clone, Default, PartialEq, Error, Serialize)]
pub struct ValidationError {
    pub missing_features: Vec<String>,
    pub invalid_values: Vec<InvalidValue>,
    pub unexpected_features: Vec<String>,
}

impl ValidationError {
    pub fn is_empty(&self) -> bool {
        self.missing_features.is_empty()
            && self.invalid_values.is_empty()
            && self.unexpected_features.is_empty()
    }

    /// Every feature name the error mentions
    pub fn features(&self) -> Vec<&str> {
        self.missing_features
            .iter()
            .map(String::as_str)
            .chain(self.invalid_values.iter().map(|v| v.feature.as_str()))
            .chain(self.unexpected_features.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing_features.is_empty() {
            parts.push(format!("missing features: {}", self.missing_features.join(", ")));
        }
        if !self.invalid_values.is_empty() {
            let invalid: Vec<String> = self
                .invalid_values
                .iter()
                .map(|v| format!("{} ({})", v.feature, v.reason))
                .collect();
            parts.push(format!("invalid values: {}", invalid.join(", ")));
        }
        if !self.unexpected_features.is_empty() {
            parts.push(format!(
                "unexpected features: {}",
                self.unexpected_features.join(", ")
            ));
        }
        write!(f, "invalid prediction request: {}", parts.join("; "))
    }
}

/// The model invocation itself failed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("internal prediction error: {message}")]
pub struct InternalPredictionError {
    pub message: String,
}

impl InternalPredictionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error returned by the inference pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Internal(#[from] InternalPredictionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError {
            missing_features: vec!["thal".to_string()],
            invalid_values: vec![InvalidValue {
                feature: "age".to_string(),
                reason: "expected a number".to_string(),
            }],
            unexpected_features: vec![],
        };

        assert!(!err.is_empty());
        assert_eq!(
            err.to_string(),
            "invalid prediction request: missing features: thal; invalid values: age (expected a number)"
        );
        assert_eq!(err.features(), vec!["thal", "age"]);
    }

    #[test]
    fn test_empty_validation_error() {
        assert!(ValidationError::default().is_empty());
    }
}
