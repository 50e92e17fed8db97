//! Prediction request and feature vector data structures

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-supplied feature values, keyed by feature name.
///
/// Values are kept as raw JSON so the assembler can report every
/// missing or non-numeric field at once instead of failing on the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionRequest {
    values: Map<String, Value>,
}

impl PredictionRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a single feature value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a feature value, replacing any previous one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up the raw value supplied for a feature
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Feature names present in the request, in key order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for PredictionRequest {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// Ordered numeric model input, positionally aligned to a `FeatureSchema`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl std::ops::Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserializes_from_flat_object() {
        let request: PredictionRequest =
            serde_json::from_value(json!({"age": 63, "sex": 1})).unwrap();

        assert_eq!(request.len(), 2);
        assert_eq!(request.get("age"), Some(&json!(63)));
        assert!(request.contains("sex"));
        assert!(!request.contains("thal"));
    }

    #[test]
    fn test_feature_vector_indexing() {
        let vector = FeatureVector::new(vec![63.0, 1.0, 2.3]);

        assert_eq!(vector.len(), 3);
        assert_eq!(vector[2], 2.3);
        assert_eq!(vector.as_slice(), &[63.0, 1.0, 2.3]);
    }
}
