//! End-to-end submission scenarios through the public library API.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use jobguard_api::decoder::decode;
use jobguard_api::errors::AppError;
use jobguard_api::extraction::extract;
use jobguard_api::llm_client::{ChatModel, LlmError};
use jobguard_api::pipeline::{accept_form, assemble_record, run_submission};
use jobguard_api::prediction::{HttpPredictor, Predictor, RetryPolicy};
use jobguard_api::verdict_view::VerdictView;

struct Replay(Mutex<VecDeque<String>>);

impl Replay {
    fn new(replies: &[&str]) -> Self {
        Self(Mutex::new(replies.iter().map(|r| r.to_string()).collect()))
    }
}

#[async_trait]
impl ChatModel for Replay {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        Ok(self.0.lock().unwrap().pop_front().unwrap_or_default())
    }
}

async fn classifier(delay: Duration, reply: Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/predict",
        post(move |Json(_body): Json<Value>| {
            let counter = counter.clone();
            let reply = reply.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                (StatusCode::OK, Json(reply))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

#[tokio::test]
async fn scenario_form_is_reconciled_into_typed_record() {
    let form = accept_form(&json!({
        "title": "Engineer",
        "minSalary": "50000",
        "maxSalary": "100000",
        "telecommuting": "true",
        "description": "Join our team..."
    }))
    .unwrap();

    let model = Replay::new(&[
        r#"{"company_profile": "", "description": "Join our team...", "requirements": ""}"#,
    ]);
    let fragment = extract(&model, "Join our team...").await.unwrap();
    assert_eq!(fragment.company_profile, "");
    assert_eq!(fragment.description, "Join our team...");
    assert_eq!(fragment.requirements, "");

    let record = assemble_record(&form, &fragment).unwrap();
    assert!(record.telecommuting);
    assert_eq!(record.min_salary, 50000.0);

    let wire = serde_json::to_value(&record).unwrap();
    assert_eq!(wire["min_salary"], json!(50000.0));
    assert_eq!(wire["telecommuting"], json!(true));
}

#[tokio::test]
async fn scenario_fenced_model_output_is_decoded() {
    let completion =
        "```json\n{\"company_profile\":\"Acme\",\"description\":\"d\",\"requirements\":\"r\"}\n```";

    assert_eq!(
        decode(completion).unwrap(),
        json!({"company_profile": "Acme", "description": "d", "requirements": "r"})
    );

    let fragment = extract(&Replay::new(&[completion]), "text").await.unwrap();
    assert_eq!(fragment.company_profile, "Acme");
}

#[tokio::test]
async fn scenario_classifier_timeouts_exhaust_three_attempts() {
    let (base, hits) = classifier(
        Duration::from_secs(5),
        json!({"is_fake": false, "probability": 0.2}),
    )
    .await;
    let predictor = HttpPredictor::new(
        &base,
        RetryPolicy {
            timeout: Duration::from_millis(150),
            ..RetryPolicy::default()
        },
    )
    .unwrap();

    let form = accept_form(&json!({"title": "Engineer", "description": "Join our team..."})).unwrap();
    let record = assemble_record(&form, &Default::default()).unwrap();

    let started = std::time::Instant::now();
    let err = predictor.predict(&record).await.unwrap_err();
    assert!(matches!(err, AppError::PredictionFailed(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() >= Duration::from_millis(150 * 3 + 300 + 600));
}

#[tokio::test]
async fn scenario_fake_verdict_is_rendered() {
    let (base, _) = classifier(
        Duration::ZERO,
        json!({"is_fake": true, "probability": 0.87, "confidence": "High", "explanation": "Suspicious salary"}),
    )
    .await;
    let predictor = HttpPredictor::new(&base, RetryPolicy::default()).unwrap();
    let model = Replay::new(&[
        r#"{"company_profile": "", "description": "Join our team...", "requirements": ""}"#,
    ]);

    let outcome = run_submission(
        &model,
        &predictor,
        &json!({"title": "Engineer", "maxSalary": 999999, "description": "Join our team..."}),
    )
    .await
    .unwrap();

    let view = VerdictView::from(&outcome.verdict);
    assert_eq!(view.label, "Fake");
    assert_eq!(view.probability_percent, 87);
    assert_eq!(view.confidence, "High");
    assert_eq!(outcome.display, view);
}
