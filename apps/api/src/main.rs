use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobguard_api::config::{Config, PredictorMode};
use jobguard_api::llm_client::LlmClient;
use jobguard_api::prediction::{HttpPredictor, MockPredictor, Predictor, RetryPolicy};
use jobguard_api::routes::build_router;
use jobguard_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing credentials)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "jobguard_api={level},tower_http={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobGuard API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(&config.llm)?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize classifier backend
    let predictor: Arc<dyn Predictor> = match &config.predictor {
        PredictorMode::Http { base_url } => {
            let predictor = HttpPredictor::new(base_url, RetryPolicy::default())?;
            info!("Classifier endpoint: {}", predictor.endpoint());
            Arc::new(predictor)
        }
        PredictorMode::Mock => {
            info!("Classifier running in mock mode");
            Arc::new(MockPredictor)
        }
    };

    let state = AppState {
        llm: Arc::new(llm),
        predictor,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
