//! HTTP API
//!
//! Thin adapter over `InferencePipeline`: JSON endpoints for programmatic
//! callers plus the HTML form at `/`.

use crate::error::{PipelineError, ValidationError};
use crate::form::{render_page, FormAdapter};
use crate::metrics::MetricsSnapshot;
use crate::pipeline::InferencePipeline;
use crate::presenter::ApiPrediction;
use crate::types::PredictionRequest;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InferencePipeline>,
    /// Fill value for blank form fields
    pub unset_default: f64,
}

impl AppState {
    pub fn new(pipeline: Arc<InferencePipeline>, unset_default: f64) -> Self {
        Self {
            pipeline,
            unset_default,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page).post(form_submit))
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/predict", post(predict))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Response Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub model_type: String,
    pub features: Vec<String>,
}

/// One field-level problem in a rejected request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ErrorDetail {
    fn body_field(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub detail: Vec<ErrorDetail>,
}

impl From<&ValidationError> for ValidationResponse {
    fn from(error: &ValidationError) -> Self {
        let missing = error
            .missing_features
            .iter()
            .map(|f| ErrorDetail::body_field(f, "Field required", "missing"));
        let invalid = error
            .invalid_values
            .iter()
            .map(|v| ErrorDetail::body_field(&v.feature, v.reason.clone(), "value_error"));
        let unexpected = error
            .unexpected_features
            .iter()
            .map(|f| ErrorDetail::body_field(f, "Extra inputs are not permitted", "extra_forbidden"));

        Self {
            detail: missing.chain(invalid).chain(unexpected).collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error returned by JSON handlers
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    MalformedBody { status: StatusCode, message: String },
    Internal,
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::Validation(e) => ApiError::Validation(e),
            PipelineError::Internal(_) => ApiError::Internal,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            // Content-type problems keep their own status; body problems are 422
            StatusCode::UNSUPPORTED_MEDIA_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError::MalformedBody {
            status,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationResponse::from(&e)),
            )
                .into_response(),
            ApiError::MalformedBody { status, message } => (
                status,
                Json(ValidationResponse {
                    detail: vec![ErrorDetail {
                        loc: vec!["body".to_string()],
                        msg: message,
                        kind: "json_invalid".to_string(),
                    }],
                }),
            )
                .into_response(),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "detail": "internal prediction error" })),
            )
                .into_response(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /health - Liveness check
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /info - Model type and feature order
async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        model_type: state.pipeline.model_type().to_string(),
        features: state.pipeline.schema().names().to_vec(),
    })
}

/// POST /predict - Classify one patient
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<ApiPrediction>, ApiError> {
    let Json(request) = payload?;
    let result = state.pipeline.predict(&request)?;
    Ok(Json(ApiPrediction::from(result)))
}

/// GET /metrics - Counter snapshot
async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.pipeline.metrics().snapshot())
}

/// GET / - Empty form
async fn form_page(State(state): State<AppState>) -> Html<String> {
    let adapter = FormAdapter::new(&state.pipeline, state.unset_default);
    Html(render_page(&adapter.layout(), None))
}

/// POST / - Form submission
async fn form_submit(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Html<String> {
    let adapter = FormAdapter::new(&state.pipeline, state.unset_default);
    let outcome = adapter.submit(&fields);
    Html(render_page(&adapter.layout(), Some(&outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidValue;

    #[test]
    fn test_validation_response_lists_every_field() {
        let error = ValidationError {
            missing_features: vec!["thal".to_string()],
            invalid_values: vec![InvalidValue {
                feature: "age".to_string(),
                reason: "must be between 1 and 120".to_string(),
            }],
            unexpected_features: vec!["bmi".to_string()],
        };

        let response = ValidationResponse::from(&error);

        let locs: Vec<&str> = response.detail.iter().map(|d| d.loc[1].as_str()).collect();
        assert_eq!(locs, vec!["thal", "age", "bmi"]);
        assert_eq!(response.detail[0].kind, "missing");
        assert_eq!(response.detail[2].kind, "extra_forbidden");
    }
}
