use std::sync::Arc;

use crate::llm_client::ChatModel;
use crate::prediction::Predictor;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; nothing in here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    /// Stage-1 model. `LlmClient` in production, scripted in tests.
    pub llm: Arc<dyn ChatModel>,
    /// Stage-2 classifier. `HttpPredictor` or `MockPredictor`, picked by `PREDICTOR_MODE`.
    pub predictor: Arc<dyn Predictor>,
}
