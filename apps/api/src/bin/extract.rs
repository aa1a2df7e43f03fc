//! Reads a job description from stdin and prints the extracted fields as JSON.
//!
//! Exit codes: 0 success, 1 extraction failure, 2 empty input.

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use jobguard_api::config::LlmConfig;
use jobguard_api::errors::AppError;
use jobguard_api::extraction::extract;
use jobguard_api::llm_client::LlmClient;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("Failed to read stdin: {e}");
        return ExitCode::from(2);
    }

    let text = input.trim();
    if text.is_empty() {
        eprintln!("No input provided on stdin.");
        return ExitCode::from(2);
    }

    match run(text).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Extraction failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(text: &str) -> Result<String> {
    let config = LlmConfig::from_env()?;
    let llm = LlmClient::new(&config).context("Failed to build LLM client")?;
    let fragment = match extract(&llm, text).await {
        Ok(fragment) => fragment,
        Err(AppError::ExtractionFailed {
            attempts,
            last_output,
        }) => anyhow::bail!(
            "Could not parse JSON after {attempts} attempts. Last response:\n{last_output}"
        ),
        Err(e) => return Err(e.into()),
    };
    serde_json::to_string_pretty(&fragment).context("Failed to serialize fragment")
}
