//! Feature schema loading
//!
//! The descriptor written next to the trained model fixes the order in
//! which features must be fed to it:
//!
//! ```json
//! { "model_type": "RandomForestClassifier", "features": ["age", "sex", "..."] }
//! ```

use crate::error::SchemaLoadError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Ordered, unique, non-empty list of feature names.
///
/// The order is load-bearing: it must match the column order the model
/// was trained with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated name lists.
    ///
    /// On error, returns the name that was duplicated, or `None` if the list was empty.
    pub fn new<I, S>(names: I) -> Result<Self, Option<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(None);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Some(name.clone()));
            }
        }

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Model metadata loaded at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    /// Model kind label, for diagnostics only
    pub model_type: String,
    pub schema: FeatureSchema,
}

#[derive(Debug, Deserialize)]
struct Descriptor {
    #[serde(default)]
    model_type: Option<String>,
    features: Vec<String>,
}

impl ModelMetadata {
    /// Load metadata from a JSON descriptor file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let metadata = Self::parse(&contents, path)?;

        info!(
            path = %path.display(),
            model_type = %metadata.model_type,
            features = metadata.schema.len(),
            "Model descriptor loaded"
        );

        Ok(metadata)
    }

    /// Parse descriptor contents; `path` is used for error reporting only
    pub fn parse(contents: &str, path: &Path) -> Result<Self, SchemaLoadError> {
        let descriptor: Descriptor =
            serde_json::from_str(contents).map_err(|source| SchemaLoadError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let schema = FeatureSchema::new(descriptor.features).map_err(|dup| match dup {
            Some(name) => SchemaLoadError::DuplicateFeature {
                path: path.to_path_buf(),
                name,
            },
            None => SchemaLoadError::EmptyFeatures {
                path: path.to_path_buf(),
            },
        })?;

        Ok(Self {
            model_type: descriptor
                .model_type
                .unwrap_or_else(|| "unknown".to_string()),
            schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn descriptor_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_descriptor() {
        let file = descriptor_file(
            r#"{"model_type": "RandomForestClassifier", "features": ["age", "sex", "cp"]}"#,
        );

        let metadata = ModelMetadata::load(file.path()).unwrap();

        assert_eq!(metadata.model_type, "RandomForestClassifier");
        assert_eq!(metadata.schema.names(), &["age", "sex", "cp"]);
    }

    #[test]
    fn test_missing_model_type_defaults_to_unknown() {
        let file = descriptor_file(r#"{"features": ["age"]}"#);

        let metadata = ModelMetadata::load(file.path()).unwrap();

        assert_eq!(metadata.model_type, "unknown");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelMetadata::load(dir.path().join("meta.json")).unwrap_err();

        assert!(matches!(err, SchemaLoadError::Read { .. }));
    }

    #[test]
    fn test_malformed_descriptor() {
        for contents in ["not json", r#"{"model_type": "rf"}"#, r#"{"features": [1, 2]}"#] {
            let file = descriptor_file(contents);
            let err = ModelMetadata::load(file.path()).unwrap_err();
            assert!(
                matches!(err, SchemaLoadError::Malformed { .. }),
                "expected malformed for {contents}"
            );
        }
    }

    #[test]
    fn test_empty_features() {
        let file = descriptor_file(r#"{"model_type": "rf", "features": []}"#);

        let err = ModelMetadata::load(file.path()).unwrap_err();

        assert!(matches!(err, SchemaLoadError::EmptyFeatures { .. }));
    }

    #[test]
    fn test_duplicate_features() {
        let file = descriptor_file(r#"{"features": ["age", "sex", "age"]}"#);

        let err = ModelMetadata::load(file.path()).unwrap_err();

        match err {
            SchemaLoadError::DuplicateFeature { name, .. } => assert_eq!(name, "age"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bundled_descriptor_matches_standard_features() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("model/meta.json");

        let metadata = ModelMetadata::load(path).unwrap();

        let names: Vec<&str> = metadata.schema.iter().collect();
        assert_eq!(names, crate::types::dictionary::standard_feature_names());
    }
}
