// Extraction prompt templates.
// Replace `{description}` in the user template before sending.

pub const EXTRACTION_SYSTEM: &str = "\
You are an information extraction engine.

Your only job is to read the \"About the Job\" section of a job posting \
and extract structured information from it.

Rules:
- No explanations, no commentary.
- If you don't know something, return an empty string.
- MUST return valid JSON only.
- NEVER predict whether the posting is fraudulent. Do not add a \"fraudulent\" field.";

pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract structured information from the following job description.

Return EXACTLY this JSON structure:

{
  "company_profile": string,
  "description": string,
  "requirements": string
}

IMPORTANT:
- If a field is missing in the text, set it to "".
- Output ONLY a JSON object. No markdown or extra text.

The given "About the Job" section:
---
{description}
---"#;

/// Appended to the user instruction after each unparseable completion.
pub const JSON_ONLY_REMINDER: &str = "\n\nReminder: Return ONLY JSON.";
