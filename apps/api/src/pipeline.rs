//! Submission pipeline — sequences the two stages.
//!
//! Flow: validate form → extract (stage 1) → reconcile → validate record →
//!       predict (stage 2). A stage-1 failure returns before anything is sent
//!       to the classifier.

use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract;
use crate::llm_client::ChatModel;
use crate::prediction::Predictor;
use crate::reconcile::{description_of, job_id_of, normalize_fragment, reconcile};
use crate::schema::{
    validate_fragment, validate_job_record, validate_raw_form, ExtractionFragment, JobRecord,
    PredictionVerdict, RawFormRecord, SchemaViolation, ROOT,
};
use crate::verdict_view::VerdictView;

/// Everything one full submission produced.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub extraction: ExtractionFragment,
    pub record: JobRecord,
    pub verdict: PredictionVerdict,
    pub display: VerdictView,
}

/// Validates an untrusted form value and gives it a job id if it has none.
pub fn accept_form(form: &Value) -> Result<RawFormRecord, AppError> {
    let mut raw = validate_raw_form(form)?;
    if job_id_of(&raw).trim().is_empty() {
        raw.insert("job_id", Value::String(Uuid::new_v4().to_string()));
    }
    Ok(raw)
}

/// Normalizes then validates an extraction fragment supplied by a caller.
pub fn accept_fragment(fragment: &Value) -> Result<ExtractionFragment, AppError> {
    let obj = fragment
        .as_object()
        .ok_or_else(|| SchemaViolation::new(ROOT, "a JSON object"))?;
    Ok(validate_fragment(&normalize_fragment(obj))?)
}

/// Reconciles, then checks the result against the classifier contract.
pub fn assemble_record(
    raw: &RawFormRecord,
    fragment: &ExtractionFragment,
) -> Result<JobRecord, AppError> {
    let record = reconcile(raw, fragment);
    let value = serde_json::to_value(&record)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize record: {e}")))?;
    Ok(validate_job_record(&value)?)
}

/// Stage 1 on its own.
pub async fn reformat(
    model: &dyn ChatModel,
    description: &str,
) -> Result<ExtractionFragment, AppError> {
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }
    extract(model, description).await
}

/// Reconcile + stage 2 for a form whose extraction already happened.
pub async fn predict(
    predictor: &dyn Predictor,
    raw: &RawFormRecord,
    fragment: &ExtractionFragment,
) -> Result<(JobRecord, PredictionVerdict), AppError> {
    let record = assemble_record(raw, fragment)?;
    info!("Submitting job {} to {} classifier", record.job_id, predictor.backend());
    let verdict = predictor.predict(&record).await?;
    Ok((record, verdict))
}

/// Full submission: extraction, reconciliation and prediction in order.
pub async fn run_submission(
    model: &dyn ChatModel,
    predictor: &dyn Predictor,
    form: &Value,
) -> Result<SubmissionOutcome, AppError> {
    let raw = accept_form(form)?;
    let job_id = job_id_of(&raw);

    let extraction = reformat(model, &description_of(&raw)).await?;
    info!("Stage 1 complete for job {job_id}");

    let (record, verdict) = predict(predictor, &raw, &extraction).await?;
    info!("Stage 2 complete for job {job_id}: is_fake={}", verdict.is_fake);

    let display = VerdictView::from(&verdict);
    Ok(SubmissionOutcome {
        extraction,
        record,
        verdict,
        display,
    })
}
