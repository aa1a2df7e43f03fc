pub mod health;
pub mod submission;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/reformat", post(submission::handle_reformat))
        .route("/api/v1/predict", post(submission::handle_predict))
        .route("/api/v1/submit", post(submission::handle_submit))
        .with_state(state)
}
