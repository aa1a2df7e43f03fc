//! Axum route handlers for the submission API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::pipeline::{self, accept_form, accept_fragment, SubmissionOutcome};
use crate::schema::{ExtractionFragment, PredictionVerdict};
use crate::state::AppState;
use crate::verdict_view::VerdictView;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReformatRequest {
    pub description: String,
}

/// Form values plus the fragment a previous `/reformat` call returned.
/// Both are validated by the contract layer, not by serde.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub form: Value,
    pub extraction: Value,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub verdict: PredictionVerdict,
    pub display: VerdictView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/reformat
///
/// Stage 1 only: free-text description → extraction fragment.
pub async fn handle_reformat(
    State(state): State<AppState>,
    Json(request): Json<ReformatRequest>,
) -> Result<Json<ExtractionFragment>, AppError> {
    let fragment = pipeline::reformat(state.llm.as_ref(), &request.description).await?;
    Ok(Json(fragment))
}

/// POST /api/v1/predict
///
/// Reconciles the form with an existing fragment and asks the classifier.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let raw = accept_form(&request.form)?;
    let fragment = accept_fragment(&request.extraction)?;

    let (_, verdict) = pipeline::predict(state.predictor.as_ref(), &raw, &fragment).await?;
    let display = VerdictView::from(&verdict);

    Ok(Json(PredictResponse { verdict, display }))
}

/// POST /api/v1/submit
///
/// Full pipeline from a raw form (including its description).
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(form): Json<Value>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    let outcome =
        pipeline::run_submission(state.llm.as_ref(), state.predictor.as_ref(), &form).await?;
    Ok(Json(outcome))
}
