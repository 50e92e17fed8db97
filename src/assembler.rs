//! Vector assembly for model inference.
//!
//! Turns a name-keyed prediction request into the fixed-order feature
//! vector the model was trained on. Order comes from the loaded
//! `FeatureSchema`, never from the request.

use crate::error::{InvalidValue, ValidationError};
use crate::schema::FeatureSchema;
use crate::types::dictionary;
use crate::types::{FeatureVector, PredictionRequest};
use serde_json::Value;

/// Assembles feature vectors in schema order.
pub struct VectorAssembler<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> VectorAssembler<'a> {
    pub fn new(schema: &'a FeatureSchema) -> Self {
        Self { schema }
    }

    /// Build the feature vector for a request.
    ///
    /// Every problem is collected before returning, so a caller sees all
    /// missing, invalid and unexpected fields at once.
    pub fn assemble(&self, request: &PredictionRequest) -> Result<FeatureVector, ValidationError> {
        self.assemble_filled(request, &[])
    }

    /// Like `assemble`, but values for the `filled` features were supplied
    /// by the service rather than the caller, so they skip the dictionary
    /// range check. They still have to be finite numbers.
    pub fn assemble_filled(
        &self,
        request: &PredictionRequest,
        filled: &[String],
    ) -> Result<FeatureVector, ValidationError> {
        let mut values = Vec::with_capacity(self.schema.len());
        let mut error = ValidationError::default();

        for name in self.schema.iter() {
            match request.get(name) {
                None => error.missing_features.push(name.to_string()),
                Some(raw) => match coerce(name, raw, !filled.iter().any(|f| f == name)) {
                    Ok(value) => values.push(value),
                    Err(reason) => error.invalid_values.push(InvalidValue {
                        feature: name.to_string(),
                        reason,
                    }),
                },
            }
        }

        error.unexpected_features = request
            .names()
            .filter(|name| !self.schema.contains(name))
            .map(str::to_string)
            .collect();

        if error.is_empty() {
            Ok(FeatureVector::new(values))
        } else {
            Err(error)
        }
    }
}

/// Coerce a raw request value to a finite number, checked against the
/// feature's dictionary constraint when `checked` is set.
fn coerce(name: &str, raw: &Value, checked: bool) -> Result<f64, String> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| format!("expected a number, got {}", describe(raw)))?;

    if let Some(spec) = dictionary::lookup(name).filter(|_| checked) {
        spec.check(value)?;
    }

    Ok(value)
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(names: &[&str]) -> FeatureSchema {
        FeatureSchema::new(names.iter().copied()).unwrap()
    }

    fn full_request() -> PredictionRequest {
        serde_json::from_value(json!({
            "age": 63, "sex": 1, "cp": 3, "trestbps": 145, "chol": 233, "fbs": 1,
            "restecg": 0, "thalach": 150, "exang": 0, "oldpeak": 2.3, "slope": 0,
            "ca": 0, "thal": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_two_feature_vector() {
        let schema = schema(&["age", "sex"]);
        let request = PredictionRequest::new().with("age", 63).with("sex", 1);

        let vector = VectorAssembler::new(&schema).assemble(&request).unwrap();

        assert_eq!(vector.as_slice(), &[63.0, 1.0]);
    }

    #[test]
    fn test_vector_follows_schema_order() {
        let request = full_request();
        let mut names = dictionary::standard_feature_names();
        names.reverse();
        let schema = schema(&names);

        let vector = VectorAssembler::new(&schema).assemble(&request).unwrap();

        assert_eq!(vector.len(), schema.len());
        for (i, name) in schema.iter().enumerate() {
            assert_eq!(vector[i], request.get(name).unwrap().as_f64().unwrap(), "{name}");
        }
    }

    #[test]
    fn test_missing_feature_is_reported_not_zero_filled() {
        let schema = schema(&dictionary::standard_feature_names());
        for name in schema.iter() {
            let mut values = serde_json::to_value(full_request()).unwrap();
            values.as_object_mut().unwrap().remove(name);
            let request: PredictionRequest = serde_json::from_value(values).unwrap();

            let err = VectorAssembler::new(&schema).assemble(&request).unwrap_err();

            assert_eq!(err.missing_features, vec![name.to_string()]);
            assert!(err.invalid_values.is_empty());
            assert!(err.unexpected_features.is_empty());
        }
    }

    #[test]
    fn test_all_problems_reported_together() {
        let schema = schema(&["age", "sex", "chol", "thal"]);
        let request = PredictionRequest::new()
            .with("age", "sixty")
            .with("sex", true)
            .with("bmi", 27.5);

        let err = VectorAssembler::new(&schema).assemble(&request).unwrap_err();

        assert_eq!(err.missing_features, vec!["chol", "thal"]);
        let invalid: Vec<&str> = err.invalid_values.iter().map(|v| v.feature.as_str()).collect();
        assert_eq!(invalid, vec!["age", "sex"]);
        assert_eq!(err.invalid_values[1].reason, "expected a number, got true");
        assert_eq!(err.unexpected_features, vec!["bmi"]);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let schema = schema(&["age", "oldpeak"]);
        let request = PredictionRequest::new().with("age", "63").with("oldpeak", " 2.3 ");

        let vector = VectorAssembler::new(&schema).assemble(&request).unwrap();

        assert_eq!(vector.as_slice(), &[63.0, 2.3]);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let schema = schema(&["age", "thal"]);
        let request = PredictionRequest::new().with("age", 250).with("thal", 9);

        let err = VectorAssembler::new(&schema).assemble(&request).unwrap_err();

        assert_eq!(err.invalid_values.len(), 2);
        assert_eq!(err.invalid_values[0].reason, "must be between 1 and 120");
    }

    #[test]
    fn test_unknown_features_only_need_to_be_numeric() {
        let schema = schema(&["bmi"]);
        let request = PredictionRequest::new().with("bmi", -4.0);

        let vector = VectorAssembler::new(&schema).assemble(&request).unwrap();

        assert_eq!(vector.as_slice(), &[-4.0]);
    }

    #[test]
    fn test_null_is_invalid() {
        let schema = schema(&["age"]);
        let request = PredictionRequest::new().with("age", Value::Null);

        let err = VectorAssembler::new(&schema).assemble(&request).unwrap_err();

        assert_eq!(err.invalid_values[0].reason, "expected a number, got null");
    }

    #[test]
    fn test_filled_values_skip_range_check() {
        let schema = schema(&["age", "chol", "sex"]);
        let request = PredictionRequest::new()
            .with("age", 0.0)
            .with("chol", 0.0)
            .with("sex", 1);
        let filled = vec!["age".to_string()];

        let err = VectorAssembler::new(&schema)
            .assemble_filled(&request, &filled)
            .unwrap_err();
        let invalid: Vec<&str> = err.invalid_values.iter().map(|v| v.feature.as_str()).collect();
        assert_eq!(invalid, vec!["chol"]);

        let filled = vec!["age".to_string(), "chol".to_string()];
        let vector = VectorAssembler::new(&schema)
            .assemble_filled(&request, &filled)
            .unwrap();
        assert_eq!(vector.as_slice(), &[0.0, 0.0, 1.0]);
    }
}
