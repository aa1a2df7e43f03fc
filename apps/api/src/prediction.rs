//! Prediction Client — submits the assembled `JobRecord` to the fraud
//! classifier and returns a validated `PredictionVerdict`.
//!
//! Default: `HttpPredictor` (POST `{base}/predict`, bounded retry).
//! Offline: `MockPredictor` (fixed verdict, no network).
//!
//! `AppState` holds an `Arc<dyn Predictor>`, chosen at startup via config.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::schema::{validate_verdict, JobRecord, PredictionVerdict, SchemaViolation};

#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, record: &JobRecord) -> Result<PredictionVerdict, AppError>;

    /// "http" | "mock" — for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Retry policy
// ────────────────────────────────────────────────────────────────────────────

/// Attempt cap, per-attempt timeout and linear backoff step.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(15),
            backoff_step: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based): `attempt × step`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Total sleep when every attempt fails. No delay follows the last one.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts).map(|a| self.backoff_after(a)).sum()
    }
}

/// Why a single classifier attempt did not produce a verdict.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier responded with status {0}")]
    Status(u16),

    #[error("response body is not JSON: {0}")]
    Body(serde_json::Error),

    #[error("invalid verdict: {0}")]
    Schema(#[from] SchemaViolation),
}

// ────────────────────────────────────────────────────────────────────────────
// HttpPredictor
// ────────────────────────────────────────────────────────────────────────────

pub struct HttpPredictor {
    client: Client,
    endpoint: String,
    policy: RetryPolicy,
}

impl HttpPredictor {
    pub fn new(base_url: &str, policy: RetryPolicy) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/predict", base_url.trim_end_matches('/')),
            policy,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn attempt_once(&self, record: &JobRecord) -> Result<PredictionVerdict, AttemptError> {
        let exchange = async {
            let response = self.client.post(&self.endpoint).json(record).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(AttemptError::Status(status.as_u16()));
            }
            let bytes = response.bytes().await?;
            serde_json::from_slice::<Value>(&bytes).map_err(AttemptError::Body)
        };

        let body = tokio::time::timeout(self.policy.timeout, exchange)
            .await
            .map_err(|_| AttemptError::Timeout(self.policy.timeout))??;

        Ok(validate_verdict(&adapt_legacy_verdict(body))?)
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, record: &JobRecord) -> Result<PredictionVerdict, AppError> {
        let verdict = retry_with_backoff(&self.policy, |_| self.attempt_once(record)).await?;
        info!(
            "Classifier verdict: is_fake={} probability={}",
            verdict.is_fake, verdict.probability
        );
        Ok(verdict)
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

/// Runs `attempt` up to `policy.max_attempts` times, sleeping
/// `backoff_after(n)` after failed attempt `n`. Only the last failure is
/// reported.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<T, AppError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let max = policy.max_attempts;

    for n in 1..=max {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) if n < max => {
                let delay = policy.backoff_after(n);
                warn!(
                    "Classifier attempt {n}/{max} failed: {e}; retrying after {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(AppError::PredictionFailed(format!("attempt {n}/{max}: {e}")));
            }
        }
    }

    Err(AppError::PredictionFailed(
        "no classifier attempts configured".to_string(),
    ))
}

/// Older classifier builds answered `{fraudulent, confidence}` where
/// `confidence` was the numeric probability. Renames those to the canonical
/// `{is_fake, probability}`; anything else passes through untouched.
pub fn adapt_legacy_verdict(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        if !obj.contains_key("is_fake") {
            if let Some(label) = obj.remove("fraudulent") {
                obj.insert("is_fake".to_string(), label);
            }
        }
        if !obj.contains_key("probability") && obj.get("confidence").is_some_and(Value::is_number)
        {
            if let Some(p) = obj.remove("confidence") {
                obj.insert("probability".to_string(), p);
            }
        }
    }
    value
}

// ────────────────────────────────────────────────────────────────────────────
// MockPredictor
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic stand-in for the classifier.
pub struct MockPredictor;

impl MockPredictor {
    pub fn verdict() -> PredictionVerdict {
        PredictionVerdict {
            is_fake: false,
            probability: 0.99,
            confidence: Some("Low".to_string()),
            explanation: Some("This is a mock prediction.".to_string()),
        }
    }
}

#[async_trait]
impl Predictor for MockPredictor {
    async fn predict(&self, _record: &JobRecord) -> Result<PredictionVerdict, AppError> {
        Ok(Self::verdict())
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}
