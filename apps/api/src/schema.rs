//! Contract layer — the record shapes that cross stage boundaries, and a strict
//! validator per shape.
//!
//! Validators never coerce. Lenient translation (aliases, `"true"` → `true`,
//! `null` → `""`) belongs to `reconcile` and runs before these checks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A boundary value did not match its contract.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field '{field}' must be {expected}")]
pub struct SchemaViolation {
    pub field: String,
    pub expected: String,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

/// Field name used when the value itself (not one of its members) is wrong.
pub const ROOT: &str = "$";

// ────────────────────────────────────────────────────────────────────────────
// RawFormRecord
// ────────────────────────────────────────────────────────────────────────────

/// User-entered form values, still loosely typed and under whichever naming
/// convention the form used. Only scalar values are accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFormRecord {
    fields: Map<String, Value>,
}

impl RawFormRecord {
    /// Returns the first value among `names` that is neither null nor a blank string.
    pub fn lookup(&self, names: &[&str]) -> Option<&Value> {
        names
            .iter()
            .filter_map(|name| self.fields.get(*name))
            .find(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }
}

pub fn validate_raw_form(value: &Value) -> Result<RawFormRecord, SchemaViolation> {
    let obj = as_object(value)?;
    for (name, v) in obj {
        if v.is_array() || v.is_object() {
            return Err(SchemaViolation::new(
                name.as_str(),
                "a string, number, boolean or null",
            ));
        }
    }
    Ok(RawFormRecord {
        fields: obj.clone(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Required education
// ────────────────────────────────────────────────────────────────────────────

/// Education levels the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationLevel {
    Unspecified,
    HighSchool,
    SomeHighSchool,
    SomeCollege,
    Associate,
    Bachelors,
    Masters,
    Doctorate,
    Professional,
    Vocational,
    VocationalHsDiploma,
    VocationalDegree,
    Certification,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 13] = [
        EducationLevel::Unspecified,
        EducationLevel::HighSchool,
        EducationLevel::SomeHighSchool,
        EducationLevel::SomeCollege,
        EducationLevel::Associate,
        EducationLevel::Bachelors,
        EducationLevel::Masters,
        EducationLevel::Doctorate,
        EducationLevel::Professional,
        EducationLevel::Vocational,
        EducationLevel::VocationalHsDiploma,
        EducationLevel::VocationalDegree,
        EducationLevel::Certification,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EducationLevel::Unspecified => "Unspecified",
            EducationLevel::HighSchool => "High School or equivalent",
            EducationLevel::SomeHighSchool => "Some High School Coursework",
            EducationLevel::SomeCollege => "Some College Coursework Completed",
            EducationLevel::Associate => "Associate Degree",
            EducationLevel::Bachelors => "Bachelor's Degree",
            EducationLevel::Masters => "Master's Degree",
            EducationLevel::Doctorate => "Doctorate",
            EducationLevel::Professional => "Professional",
            EducationLevel::Vocational => "Vocational",
            EducationLevel::VocationalHsDiploma => "Vocational - HS Diploma",
            EducationLevel::VocationalDegree => "Vocational - Degree",
            EducationLevel::Certification => "Certification",
        }
    }

    /// Case-insensitive match against the level names.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(text))
    }
}

/// The form has modelled this field both as a checkbox and as a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredEducation {
    Flag(bool),
    Level(EducationLevel),
}

impl Default for RequiredEducation {
    fn default() -> Self {
        RequiredEducation::Flag(false)
    }
}

impl RequiredEducation {
    /// Classifier representation: level name, "Unspecified" for a bare `true`, "" otherwise.
    pub fn as_classifier_str(self) -> &'static str {
        match self {
            RequiredEducation::Level(level) => level.as_str(),
            RequiredEducation::Flag(true) => EducationLevel::Unspecified.as_str(),
            RequiredEducation::Flag(false) => "",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ExtractionFragment
// ────────────────────────────────────────────────────────────────────────────

/// Stage-1 output. An empty string means "not found in the text".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFragment {
    pub company_profile: String,
    pub description: String,
    pub requirements: String,
}

pub const FRAGMENT_FIELDS: [&str; 3] = ["company_profile", "description", "requirements"];

pub fn validate_fragment(value: &Value) -> Result<ExtractionFragment, SchemaViolation> {
    let obj = as_object(value)?;
    Ok(ExtractionFragment {
        company_profile: string_field(obj, "company_profile")?,
        description: string_field(obj, "description")?,
        requirements: string_field(obj, "requirements")?,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// JobRecord
// ────────────────────────────────────────────────────────────────────────────

/// The assembled classifier input. Canonical names are snake_case; flags are
/// booleans and salary bounds are numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub title: String,
    pub location: String,
    pub employment_type: String,
    pub industry: String,
    pub department: String,
    pub function: String,
    pub min_salary: f64,
    pub max_salary: f64,
    pub company_profile: String,
    pub description: String,
    pub requirements: String,
    pub benefits: String,
    pub telecommuting: bool,
    pub has_company_logo: bool,
    pub has_questions: bool,
    pub required_education: String,
    pub required_experience: String,
}

pub fn validate_job_record(value: &Value) -> Result<JobRecord, SchemaViolation> {
    let obj = as_object(value)?;
    Ok(JobRecord {
        job_id: string_field(obj, "job_id")?,
        title: string_field(obj, "title")?,
        location: string_field(obj, "location")?,
        employment_type: string_field(obj, "employment_type")?,
        industry: string_field(obj, "industry")?,
        department: string_field(obj, "department")?,
        function: string_field(obj, "function")?,
        min_salary: salary_field(obj, "min_salary")?,
        max_salary: salary_field(obj, "max_salary")?,
        company_profile: string_field(obj, "company_profile")?,
        description: string_field(obj, "description")?,
        requirements: string_field(obj, "requirements")?,
        benefits: string_field(obj, "benefits")?,
        telecommuting: bool_field(obj, "telecommuting")?,
        has_company_logo: bool_field(obj, "has_company_logo")?,
        has_questions: bool_field(obj, "has_questions")?,
        required_education: string_field(obj, "required_education")?,
        required_experience: string_field(obj, "required_experience")?,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// PredictionVerdict
// ────────────────────────────────────────────────────────────────────────────

/// Classifier judgment. `probability` is the probability that the posting is fake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionVerdict {
    pub is_fake: bool,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

pub fn validate_verdict(value: &Value) -> Result<PredictionVerdict, SchemaViolation> {
    let obj = as_object(value)?;
    let probability = obj
        .get("probability")
        .and_then(Value::as_f64)
        .filter(|p| (0.0..=1.0).contains(p))
        .ok_or_else(|| SchemaViolation::new("probability", "a number in [0, 1]"))?;

    Ok(PredictionVerdict {
        is_fake: bool_field(obj, "is_fake")?,
        probability,
        confidence: optional_string_field(obj, "confidence")?,
        explanation: optional_string_field(obj, "explanation")?,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

fn as_object(value: &Value) -> Result<&Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| SchemaViolation::new(ROOT, "a JSON object"))
}

fn string_field(obj: &Map<String, Value>, field: &str) -> Result<String, SchemaViolation> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SchemaViolation::new(field, "a string"))
}

fn optional_string_field(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, SchemaViolation> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaViolation::new(field, "a string or null")),
    }
}

fn bool_field(obj: &Map<String, Value>, field: &str) -> Result<bool, SchemaViolation> {
    obj.get(field)
        .and_then(Value::as_bool)
        .ok_or_else(|| SchemaViolation::new(field, "a boolean"))
}

fn salary_field(obj: &Map<String, Value>, field: &str) -> Result<f64, SchemaViolation> {
    obj.get(field)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .ok_or_else(|| SchemaViolation::new(field, "a finite number"))
}
