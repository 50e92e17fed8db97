//! Interactive form surface.
//!
//! Builds one input per schema feature, fills blank fields with the
//! configured default, and runs the completed request through the shared
//! pipeline. Filled values are not range-checked, typed ones are. API
//! callers never get this fill; see `assembler`.

use crate::error::{InvalidValue, PipelineError, ValidationError};
use crate::pipeline::InferencePipeline;
use crate::presenter::{RiskClass, RiskMessage};
use crate::schema::FeatureSchema;
use crate::types::dictionary::{self, FeatureKind};
use crate::types::PredictionRequest;
use std::collections::HashMap;
use std::fmt::Write;
use tracing::debug;

/// Input widget for one feature
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: f64,
    },
    Select {
        options: Vec<(i64, String)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub widget: Widget,
}

/// Ordered form fields, one per schema feature
#[derive(Debug, Clone, PartialEq)]
pub struct FormLayout {
    pub fields: Vec<FormField>,
    /// Value pre-filled into every field and used for blank submissions
    pub default_value: f64,
}

impl FormLayout {
    pub fn from_schema(schema: &FeatureSchema, default_value: f64) -> Self {
        let fields = schema
            .iter()
            .map(|name| match dictionary::lookup(name) {
                Some(spec) => FormField {
                    name: name.to_string(),
                    label: spec.label.to_string(),
                    widget: match spec.kind {
                        FeatureKind::Numeric { min, max, step } => Widget::Number {
                            min: Some(min),
                            max: Some(max),
                            step,
                        },
                        FeatureKind::Categorical { options } => Widget::Select {
                            options: options
                                .iter()
                                .map(|(code, label)| (*code, label.to_string()))
                                .collect(),
                        },
                    },
                },
                None => FormField {
                    name: name.to_string(),
                    label: title_case(name),
                    widget: Widget::Number {
                        min: None,
                        max: None,
                        step: 0.1,
                    },
                },
            })
            .collect();

        Self {
            fields,
            default_value,
        }
    }
}

/// "resting_bp" -> "Resting Bp"
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// A completed form submission
#[derive(Debug, Clone, PartialEq)]
pub struct FormRequest {
    pub request: PredictionRequest,
    /// Features that took the configured default
    pub filled: Vec<String>,
}

/// Result of a form submission
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Prediction(RiskMessage),
    Rejected(ValidationError),
    Failed,
}

/// Form handler over the shared pipeline
pub struct FormAdapter<'a> {
    pipeline: &'a InferencePipeline,
    unset_default: f64,
}

impl<'a> FormAdapter<'a> {
    pub fn new(pipeline: &'a InferencePipeline, unset_default: f64) -> Self {
        Self {
            pipeline,
            unset_default,
        }
    }

    pub fn layout(&self) -> FormLayout {
        FormLayout::from_schema(self.pipeline.schema(), self.unset_default)
    }

    /// Turn submitted text fields into a complete request.
    ///
    /// Blank or absent fields take the configured default; non-numeric
    /// text is rejected. Fields outside the schema are ignored.
    pub fn build_request(&self, submitted: &HashMap<String, String>) -> Result<FormRequest, ValidationError> {
        let mut request = PredictionRequest::new();
        let mut filled = Vec::new();
        let mut error = ValidationError::default();

        for name in self.pipeline.schema().iter() {
            match submitted.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
                None => {
                    debug!(feature = %name, default = self.unset_default, "Filling unset form field");
                    request.insert(name, self.unset_default);
                    filled.push(name.to_string());
                }
                Some(text) => match text.parse::<f64>() {
                    Ok(value) if value.is_finite() => request.insert(name, value),
                    _ => error.invalid_values.push(InvalidValue {
                        feature: name.to_string(),
                        reason: format!("expected a number, got \"{}\"", text),
                    }),
                },
            }
        }

        if error.is_empty() {
            Ok(FormRequest { request, filled })
        } else {
            Err(error)
        }
    }

    pub fn submit(&self, submitted: &HashMap<String, String>) -> FormOutcome {
        let form = match self.build_request(submitted) {
            Ok(form) => form,
            Err(e) => return FormOutcome::Rejected(e),
        };

        match self.pipeline.predict_filled(&form.request, &form.filled) {
            Ok(result) => FormOutcome::Prediction(RiskMessage::from(result)),
            Err(PipelineError::Validation(e)) => FormOutcome::Rejected(e),
            Err(PipelineError::Internal(_)) => FormOutcome::Failed,
        }
    }
}

/// Render the form page with an optional result panel
pub fn render_page(layout: &FormLayout, outcome: Option<&FormOutcome>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Heart Disease Prediction</title>\n</head>\n<body>\n");
    html.push_str("<h1>Heart Disease Prediction</h1>\n");
    html.push_str("<p>Enter patient details to predict the risk of heart disease.</p>\n");
    html.push_str("<form method=\"post\" action=\"/\">\n");

    for field in &layout.fields {
        let name = escape(&field.name);
        let _ = write!(
            html,
            "<p><label for=\"{name}\">{}</label><br>\n",
            escape(&field.label)
        );
        match &field.widget {
            Widget::Number { min, max, step } => {
                // Out-of-range defaults fail browser validation; leave them blank
                let default = layout.default_value;
                let in_range = min.map_or(true, |min| default >= min) && max.map_or(true, |max| default <= max);
                let value = if in_range { default.to_string() } else { String::new() };
                let _ = write!(
                    html,
                    "<input type=\"number\" id=\"{name}\" name=\"{name}\" value=\"{value}\" placeholder=\"{default}\" step=\"{step}\""
                );
                if let Some(min) = min {
                    let _ = write!(html, " min=\"{}\"", min);
                }
                if let Some(max) = max {
                    let _ = write!(html, " max=\"{}\"", max);
                }
                html.push_str("></p>\n");
            }
            Widget::Select { options } => {
                let _ = writeln!(html, "<select id=\"{name}\" name=\"{name}\">");
                for (code, label) in options {
                    let _ = writeln!(
                        html,
                        "<option value=\"{code}\">{code}: {}</option>",
                        escape(label)
                    );
                }
                html.push_str("</select></p>\n");
            }
        }
    }

    html.push_str("<button type=\"submit\">Predict</button>\n</form>\n");

    match outcome {
        Some(FormOutcome::Prediction(message)) => {
            let _ = writeln!(
                html,
                "<div class=\"result {}\">{}</div>",
                match message.class {
                    RiskClass::High => "high",
                    RiskClass::Low => "low",
                },
                escape(&message.text)
            );
        }
        Some(FormOutcome::Rejected(e)) => {
            let _ = writeln!(html, "<div class=\"result error\">{}</div>", escape(&e.to_string()));
        }
        Some(FormOutcome::Failed) => {
            html.push_str("<div class=\"result error\">Prediction failed, please try again.</div>\n");
        }
        None => {}
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classifier;
    use crate::schema::ModelMetadata;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingClassifier {
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl Classifier for RecordingClassifier {
        fn predict(&self, features: &[f64]) -> anyhow::Result<i64> {
            self.seen.lock().unwrap().push(features.to_vec());
            Ok(0)
        }

        fn predict_proba(&self, _features: &[f64]) -> anyhow::Result<f64> {
            Ok(0.1234)
        }
    }

    fn pipeline(names: &[&str], classifier: Arc<RecordingClassifier>) -> InferencePipeline {
        InferencePipeline::new(
            ModelMetadata {
                model_type: "RandomForestClassifier".to_string(),
                schema: FeatureSchema::new(names.iter().copied()).unwrap(),
            },
            classifier,
        )
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_layout_follows_schema() {
        let schema = FeatureSchema::new(["age", "sex", "resting_bp"]).unwrap();

        let layout = FormLayout::from_schema(&schema, 0.0);

        let names: Vec<&str> = layout.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["age", "sex", "resting_bp"]);
        assert_eq!(layout.fields[0].label, "Age (years)");
        assert!(matches!(layout.fields[1].widget, Widget::Select { .. }));
        assert_eq!(layout.fields[2].label, "Resting Bp");
        assert_eq!(
            layout.fields[2].widget,
            Widget::Number { min: None, max: None, step: 0.1 }
        );
    }

    #[test]
    fn test_blank_fields_use_configured_default() {
        let classifier = Arc::new(RecordingClassifier::default());
        let pipeline = pipeline(&["bmi", "score"], classifier.clone());
        let adapter = FormAdapter::new(&pipeline, 0.0);

        let outcome = adapter.submit(&fields(&[("bmi", "27.5"), ("score", "  ")]));

        assert_eq!(*classifier.seen.lock().unwrap(), vec![vec![27.5, 0.0]]);
        match outcome {
            FormOutcome::Prediction(message) => {
                assert_eq!(message.class, RiskClass::Low);
                assert_eq!(message.text, "✅ Low risk of heart disease (Probability: 0.12)");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_text_rejected() {
        let classifier = Arc::new(RecordingClassifier::default());
        let pipeline = pipeline(&["bmi"], classifier.clone());
        let adapter = FormAdapter::new(&pipeline, 0.0);

        let outcome = adapter.submit(&fields(&[("bmi", "heavy")]));

        match outcome {
            FormOutcome::Rejected(e) => assert_eq!(e.invalid_values[0].feature, "bmi"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(classifier.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_blank_age_is_filled_and_predicted() {
        let classifier = Arc::new(RecordingClassifier::default());
        let pipeline = pipeline(&["age", "trestbps", "sex"], classifier.clone());
        let adapter = FormAdapter::new(&pipeline, 0.0);

        let outcome = adapter.submit(&fields(&[("age", ""), ("sex", "1")]));

        assert!(matches!(outcome, FormOutcome::Prediction(_)), "{outcome:?}");
        assert_eq!(*classifier.seen.lock().unwrap(), vec![vec![0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_typed_values_still_range_checked() {
        let classifier = Arc::new(RecordingClassifier::default());
        let pipeline = pipeline(&["age", "sex"], classifier.clone());
        let adapter = FormAdapter::new(&pipeline, 0.0);

        let outcome = adapter.submit(&fields(&[("age", "0"), ("sex", "")]));

        match outcome {
            FormOutcome::Rejected(e) => {
                assert_eq!(e.invalid_values.len(), 1);
                assert_eq!(e.invalid_values[0].feature, "age");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(classifier.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_build_request_records_filled_fields() {
        let pipeline = pipeline(&["age", "sex", "chol"], Arc::new(RecordingClassifier::default()));
        let adapter = FormAdapter::new(&pipeline, 0.0);

        let form = adapter.build_request(&fields(&[("sex", "1")])).unwrap();

        assert_eq!(form.filled, vec!["age", "chol"]);
        assert_eq!(form.request.len(), 3);
    }

    #[test]
    fn test_render_page() {
        let schema = FeatureSchema::new(["age", "sex"]).unwrap();
        let layout = FormLayout::from_schema(&schema, 0.0);
        let outcome = FormOutcome::Prediction(RiskMessage {
            class: RiskClass::High,
            text: "⚠️ High risk of heart disease!".to_string(),
        });

        let html = render_page(&layout, Some(&outcome));

        assert!(html.contains("name=\"age\" value=\"\" placeholder=\"0\" step=\"1\" min=\"1\" max=\"120\""));
        assert!(html.contains("<option value=\"1\">1: Male</option>"));
        assert!(html.contains("<div class=\"result high\">⚠️ High risk of heart disease!</div>"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("max_heart_rate"), "Max Heart Rate");
        assert_eq!(title_case("ca"), "Ca");
    }
}
