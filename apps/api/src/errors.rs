use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::schema::SchemaViolation;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required credential or endpoint is not configured. Never retried.
    #[error("Missing configuration: {0}")]
    MissingCredential(String),

    /// Stage 1 gave up after its retry budget. Carries the last raw model output.
    #[error("Extraction failed after {attempts} attempts")]
    ExtractionFailed { attempts: u32, last_output: String },

    #[error("Schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// Stage 2 gave up, or the classifier answered with an invalid verdict.
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MissingCredential(msg) => {
                tracing::error!("Missing configuration: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MISSING_CREDENTIAL",
                    "The service is not configured to reach its model backends".to_string(),
                )
            }
            AppError::ExtractionFailed {
                attempts,
                last_output,
            } => {
                tracing::error!("Extraction failed after {attempts} attempts");
                tracing::debug!("Last extraction output: {last_output}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_FAILED",
                    "Could not extract structured fields from the job description".to_string(),
                )
            }
            AppError::SchemaViolation(v) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "SCHEMA_VIOLATION",
                v.to_string(),
            ),
            AppError::PredictionFailed(cause) => {
                tracing::error!("Prediction failed: {cause}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PREDICTION_FAILED",
                    "The fraud classifier could not produce a verdict".to_string(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The language model could not be reached".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
