//! Extraction Client — turns a free-text job description into an
//! `ExtractionFragment` via the language model.
//!
//! Flow: build prompt → complete → tolerant decode → normalize → validate.
//! Unusable completions are retried with a reminder appended to the prompt.

pub mod prompts;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::decoder::decode;
use crate::errors::AppError;
use crate::llm_client::ChatModel;
use crate::reconcile::normalize_fragment;
use crate::schema::{validate_fragment, ExtractionFragment};

use prompts::{EXTRACTION_PROMPT_TEMPLATE, EXTRACTION_SYSTEM, JSON_ONLY_REMINDER};

pub const MAX_EXTRACTION_ATTEMPTS: u32 = 3;

/// Loop state for one extraction. The prompt grows by one reminder per retry.
#[derive(Debug)]
struct Attempt {
    number: u32,
    prompt: String,
}

impl Attempt {
    fn first(description: &str) -> Self {
        Self {
            number: 1,
            prompt: build_prompt(description),
        }
    }

    fn retry(self) -> Self {
        Self {
            number: self.number + 1,
            prompt: self.prompt + JSON_ONLY_REMINDER,
        }
    }
}

pub fn build_prompt(description: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace("{description}", description)
}

/// Extracts company profile, description and requirements from `description`.
///
/// Fails with `ExtractionFailed` (carrying the last completion) once
/// `MAX_EXTRACTION_ATTEMPTS` completions were unusable. Transport errors from
/// the model are not retried here; the client already retried them.
pub async fn extract(
    model: &dyn ChatModel,
    description: &str,
) -> Result<ExtractionFragment, AppError> {
    let mut attempt = Attempt::first(description);

    let last_output = loop {
        let raw = model
            .complete(EXTRACTION_SYSTEM, &attempt.prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Extraction call failed: {e}")))?;
        debug!("Extraction attempt {} raw output: {raw}", attempt.number);

        match interpret(&raw) {
            Ok(fragment) => {
                info!("Extraction succeeded on attempt {}", attempt.number);
                return Ok(fragment);
            }
            Err(reason) => {
                warn!(
                    "Extraction attempt {}/{} unusable: {reason}",
                    attempt.number, MAX_EXTRACTION_ATTEMPTS
                );
            }
        }

        if attempt.number >= MAX_EXTRACTION_ATTEMPTS {
            break raw;
        }
        attempt = attempt.retry();
    };

    Err(AppError::ExtractionFailed {
        attempts: MAX_EXTRACTION_ATTEMPTS,
        last_output,
    })
}

/// Decodes one completion into a validated fragment, or says why it can't.
fn interpret(raw: &str) -> Result<ExtractionFragment, String> {
    match decode(raw).map_err(|e| e.to_string())? {
        Value::Object(obj) => {
            validate_fragment(&normalize_fragment(&obj)).map_err(|e| e.to_string())
        }
        Value::Array(_) => Err("completion is a JSON array, not an object".to_string()),
        _ => Err("completion is not a JSON object".to_string()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::LlmError;

    /// Replays canned completions and records every prompt it was sent.
    pub(crate) struct ScriptedModel {
        replies: Mutex<VecDeque<String>>,
        pub prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedModel {
        pub(crate) fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    struct DownModel;

    #[async_trait]
    impl ChatModel for DownModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 401,
                message: "invalid api key".to_string(),
            })
        }
    }

    const GOOD: &str = r#"{"company_profile": "Acme", "description": "d", "requirements": "r"}"#;

    #[tokio::test]
    async fn test_first_attempt_success() {
        let model = ScriptedModel::new(&[GOOD]);
        let fragment = extract(&model, "We are hiring").await.unwrap();
        assert_eq!(fragment.company_profile, "Acme");
        assert_eq!(model.calls(), 1);

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, EXTRACTION_SYSTEM);
        assert!(prompts[0].1.contains("We are hiring"));
        assert!(!prompts[0].1.contains("{description}"));
    }

    #[tokio::test]
    async fn test_fenced_completion() {
        let model = ScriptedModel::new(&[
            "```json\n{\"company_profile\":\"Acme\",\"description\":\"d\",\"requirements\":\"r\"}\n```",
        ]);
        let fragment = extract(&model, "text").await.unwrap();
        assert_eq!(
            fragment,
            ExtractionFragment {
                company_profile: "Acme".to_string(),
                description: "d".to_string(),
                requirements: "r".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_null_fields_become_empty() {
        let model = ScriptedModel::new(&[
            r#"{"company_profile": null, "description": "Join our team...", "requirements": null}"#,
        ]);
        let fragment = extract(&model, "Join our team...").await.unwrap();
        assert_eq!(fragment.company_profile, "");
        assert_eq!(fragment.description, "Join our team...");
        assert_eq!(fragment.requirements, "");
    }

    #[tokio::test]
    async fn test_retry_appends_reminder() {
        let model = ScriptedModel::new(&["Sorry, I can't.", "[1, 2, 3]", GOOD]);
        let fragment = extract(&model, "text").await.unwrap();
        assert_eq!(fragment.requirements, "r");
        assert_eq!(model.calls(), 3);

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts[0].1.matches(JSON_ONLY_REMINDER).count(), 0);
        assert_eq!(prompts[1].1.matches(JSON_ONLY_REMINDER).count(), 1);
        assert_eq!(prompts[2].1.matches(JSON_ONLY_REMINDER).count(), 2);
        assert!(prompts[2].1.starts_with(&prompts[0].1));
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_output() {
        let model = ScriptedModel::new(&["nope", "still nope", "[\"array\"]", GOOD]);
        let err = extract(&model, "text").await.unwrap_err();
        match err {
            AppError::ExtractionFailed {
                attempts,
                last_output,
            } => {
                assert_eq!(attempts, MAX_EXTRACTION_ATTEMPTS);
                assert_eq!(last_output, "[\"array\"]");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_retried() {
        let model = ScriptedModel::new(&[
            r#"{"company_profile": ["a"], "description": "d", "requirements": "r"}"#,
            GOOD,
        ]);
        let fragment = extract(&model, "text").await.unwrap();
        assert_eq!(fragment.company_profile, "Acme");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let err = extract(&DownModel, "text").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[test]
    fn test_build_prompt_embeds_shape_and_text() {
        let prompt = build_prompt("Remote role at Acme");
        assert!(prompt.contains("\"company_profile\": string"));
        assert!(prompt.contains("---\nRemote role at Acme\n---"));
    }
}
