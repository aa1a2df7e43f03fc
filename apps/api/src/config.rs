use anyhow::{Context, Result};

use crate::errors::AppError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Which classifier backend `/predict` talks to.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictorMode {
    /// POST to `{FASTAPI_URL}/predict`.
    Http { base_url: String },
    /// Fixed verdict, no network.
    Mock,
}

/// Language model settings. Shared by the server and the extraction CLI.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(LlmConfig {
            api_key: require_env("OPENAI_API_KEY")?,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
        })
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub predictor: PredictorMode,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm: LlmConfig::from_env()?,
            predictor: predictor_mode_from_env()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn predictor_mode_from_env() -> Result<PredictorMode> {
    let mode = std::env::var("PREDICTOR_MODE").unwrap_or_else(|_| "http".to_string());
    match mode.trim().to_ascii_lowercase().as_str() {
        "mock" => Ok(PredictorMode::Mock),
        "http" => Ok(PredictorMode::Http {
            base_url: require_env("FASTAPI_URL")?,
        }),
        other => anyhow::bail!("PREDICTOR_MODE must be 'http' or 'mock', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String, AppError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::MissingCredential(format!(
            "Required environment variable '{key}' is not set"
        ))),
    }
}
