//! Data dictionary for the standard heart disease features
//!
//! Provides display labels and basic range constraints for the 13 UCI
//! heart disease features. Features missing from the dictionary are still
//! accepted by the pipeline; they only get the generic numeric checks.

/// Accepted values for a single feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureKind {
    /// Continuous or integer measurement within an inclusive range
    Numeric { min: f64, max: f64, step: f64 },
    /// Coded category; each entry is (code, human label)
    Categorical { options: &'static [(i64, &'static str)] },
}

/// Data dictionary entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    /// Check a value against this feature's constraint.
    ///
    /// Returns a human-readable reason when the value is rejected.
    pub fn check(&self, value: f64) -> Result<(), String> {
        match self.kind {
            FeatureKind::Numeric { min, max, .. } => {
                if value < min || value > max {
                    return Err(format!("must be between {} and {}", min, max));
                }
            }
            FeatureKind::Categorical { options } => {
                let known = value.fract() == 0.0
                    && options.iter().any(|(code, _)| *code as f64 == value);
                if !known {
                    let codes: Vec<String> =
                        options.iter().map(|(code, _)| code.to_string()).collect();
                    return Err(format!("must be one of {}", codes.join(", ")));
                }
            }
        }
        Ok(())
    }
}

/// Standard UCI heart disease features, in training order
pub const HEART_FEATURES: [FeatureSpec; 13] = [
    FeatureSpec {
        name: "age",
        label: "Age (years)",
        kind: FeatureKind::Numeric { min: 1.0, max: 120.0, step: 1.0 },
    },
    FeatureSpec {
        name: "sex",
        label: "Sex",
        kind: FeatureKind::Categorical { options: &[(0, "Female"), (1, "Male")] },
    },
    FeatureSpec {
        name: "cp",
        label: "Chest pain type",
        kind: FeatureKind::Categorical {
            options: &[
                (0, "Typical angina"),
                (1, "Atypical angina"),
                (2, "Non-anginal pain"),
                (3, "Asymptomatic"),
            ],
        },
    },
    FeatureSpec {
        name: "trestbps",
        label: "Resting blood pressure (mm Hg)",
        kind: FeatureKind::Numeric { min: 50.0, max: 250.0, step: 1.0 },
    },
    FeatureSpec {
        name: "chol",
        label: "Serum cholesterol (mg/dl)",
        kind: FeatureKind::Numeric { min: 100.0, max: 600.0, step: 1.0 },
    },
    FeatureSpec {
        name: "fbs",
        label: "Fasting blood sugar > 120 mg/dl",
        kind: FeatureKind::Categorical { options: &[(0, "No"), (1, "Yes")] },
    },
    FeatureSpec {
        name: "restecg",
        label: "Resting ECG result",
        kind: FeatureKind::Categorical {
            options: &[
                (0, "Normal"),
                (1, "ST-T wave abnormality"),
                (2, "Left ventricular hypertrophy"),
            ],
        },
    },
    FeatureSpec {
        name: "thalach",
        label: "Maximum heart rate achieved",
        kind: FeatureKind::Numeric { min: 50.0, max: 250.0, step: 1.0 },
    },
    FeatureSpec {
        name: "exang",
        label: "Exercise induced angina",
        kind: FeatureKind::Categorical { options: &[(0, "No"), (1, "Yes")] },
    },
    FeatureSpec {
        name: "oldpeak",
        label: "ST depression induced by exercise",
        kind: FeatureKind::Numeric { min: 0.0, max: 10.0, step: 0.1 },
    },
    FeatureSpec {
        name: "slope",
        label: "Slope of peak exercise ST segment",
        kind: FeatureKind::Categorical {
            options: &[(0, "Upsloping"), (1, "Flat"), (2, "Downsloping")],
        },
    },
    FeatureSpec {
        name: "ca",
        label: "Major vessels colored by fluoroscopy",
        kind: FeatureKind::Categorical {
            options: &[(0, "0"), (1, "1"), (2, "2"), (3, "3"), (4, "4")],
        },
    },
    FeatureSpec {
        name: "thal",
        label: "Thalassemia",
        kind: FeatureKind::Categorical {
            options: &[
                (0, "Unknown"),
                (1, "Fixed defect"),
                (2, "Normal"),
                (3, "Reversible defect"),
            ],
        },
    },
];

/// Find the dictionary entry for a feature name
pub fn lookup(name: &str) -> Option<&'static FeatureSpec> {
    HEART_FEATURES.iter().find(|spec| spec.name == name)
}

/// Feature names in training order
pub fn standard_feature_names() -> Vec<&'static str> {
    HEART_FEATURES.iter().map(|spec| spec.name).collect()
}
