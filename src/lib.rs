//! Heart Risk Service Library
//!
//! Predicts heart-disease risk from 13 clinical measurements using an
//! ONNX classifier. The HTTP API and the HTML form share one inference
//! pipeline: schema-ordered vector assembly, model invocation and result
//! shaping.

pub mod api;
pub mod assembler;
pub mod config;
pub mod error;
pub mod form;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod presenter;
pub mod schema;
pub mod types;

pub use config::AppConfig;
pub use error::{InternalPredictionError, PipelineError, SchemaLoadError, ValidationError};
pub use models::{Classification, Classifier, OnnxClassifier, Predictor};
pub use pipeline::InferencePipeline;
pub use schema::{FeatureSchema, ModelMetadata};
pub use types::{FeatureVector, PredictionRequest, PredictionResult, RiskLabel};
