//! Record Reconciler — the only place where field names and value types are
//! translated between the form, the extractor and the classifier.
//!
//! Everything here is total: unrecognized input degrades to `""`, `0` or
//! `false`. A slightly worse prediction beats a rejected submission.

use serde_json::{Map, Value};

use crate::schema::{
    EducationLevel, ExtractionFragment, JobRecord, RawFormRecord, RequiredEducation,
    FRAGMENT_FIELDS,
};

// Accepted names per concept. The first entry is the UI (camelCase) spelling
// where one exists; the canonical output name is the JobRecord field.
const JOB_ID: &[&str] = &["jobId", "job_id"];
const TITLE: &[&str] = &["title"];
const LOCATION: &[&str] = &["location"];
const EMPLOYMENT_TYPE: &[&str] = &["employmentType", "employment_type"];
const INDUSTRY: &[&str] = &["industry"];
const DEPARTMENT: &[&str] = &["department"];
const FUNCTION: &[&str] = &["function", "functionField", "function_field"];
const MIN_SALARY: &[&str] = &["minSalary", "min_salary"];
const MAX_SALARY: &[&str] = &["maxSalary", "max_salary"];
const SALARY_RANGE: &[&str] = &["salaryRange", "salary_range"];
const DESCRIPTION: &[&str] = &["description", "aboutTheJob", "jobDescription"];
const BENEFITS: &[&str] = &["benefits"];
const TELECOMMUTING: &[&str] = &["telecommuting"];
const HAS_COMPANY_LOGO: &[&str] = &["hasCompanyLogo", "has_company_logo"];
const HAS_QUESTIONS: &[&str] = &["hasQuestions", "has_questions"];
const REQUIRED_EDUCATION: &[&str] = &["requiredEducation", "required_education"];
const REQUIRED_EXPERIENCE: &[&str] = &["requiredExperience", "required_experience"];

/// Merges form input and the extraction fragment into the classifier record.
pub fn reconcile(raw: &RawFormRecord, fragment: &ExtractionFragment) -> JobRecord {
    let (min_salary, max_salary) = salary_bounds(raw);

    JobRecord {
        job_id: coerce_text(raw.lookup(JOB_ID)),
        title: coerce_text(raw.lookup(TITLE)),
        location: normalize_location(&coerce_text(raw.lookup(LOCATION))),
        employment_type: normalize_employment_type(&coerce_text(raw.lookup(EMPLOYMENT_TYPE))),
        industry: coerce_text(raw.lookup(INDUSTRY)),
        department: coerce_text(raw.lookup(DEPARTMENT)),
        function: coerce_text(raw.lookup(FUNCTION)),
        min_salary,
        max_salary,
        company_profile: fragment.company_profile.clone(),
        description: fragment.description.clone(),
        requirements: fragment.requirements.clone(),
        benefits: coerce_text(raw.lookup(BENEFITS)),
        telecommuting: coerce_flag(raw.lookup(TELECOMMUTING)),
        has_company_logo: coerce_flag(raw.lookup(HAS_COMPANY_LOGO)),
        has_questions: coerce_flag(raw.lookup(HAS_QUESTIONS)),
        required_education: coerce_education(raw.lookup(REQUIRED_EDUCATION))
            .as_classifier_str()
            .to_string(),
        required_experience: coerce_text(raw.lookup(REQUIRED_EXPERIENCE)),
    }
}

pub fn job_id_of(raw: &RawFormRecord) -> String {
    coerce_text(raw.lookup(JOB_ID))
}

/// Free-text description the form collected for stage 1.
pub fn description_of(raw: &RawFormRecord) -> String {
    coerce_text(raw.lookup(DESCRIPTION))
}

/// Maps missing or `null` extraction fields to `""`. Other values are left
/// for the contract layer to accept or reject.
pub fn normalize_fragment(obj: &Map<String, Value>) -> Value {
    let normalized = FRAGMENT_FIELDS
        .iter()
        .map(|field| {
            let value = match obj.get(*field) {
                None | Some(Value::Null) => Value::String(String::new()),
                Some(v) => v.clone(),
            };
            (field.to_string(), value)
        })
        .collect();
    Value::Object(normalized)
}

/// `true`, `"true"`, `1` and `"1"` are true. Everything else is false.
pub fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s == "true" || s == "1",
        _ => false,
    }
}

/// Numbers and numeric strings (thousands separators allowed) keep their
/// value, sign included; anything else is 0.
pub fn coerce_salary(value: Option<&Value>) -> f64 {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_amount(s),
        _ => None,
    };
    amount.filter(|n| n.is_finite()).unwrap_or(0.0)
}

pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn coerce_education(value: Option<&Value>) -> RequiredEducation {
    if let Some(Value::String(s)) = value {
        if let Some(level) = EducationLevel::parse(s) {
            return RequiredEducation::Level(level);
        }
    }
    RequiredEducation::Flag(coerce_flag(value))
}

/// Buckets free-form employment types into the labels the classifier saw in
/// training. Unknown values are kept (trimmed).
pub fn normalize_employment_type(text: &str) -> String {
    let lower = text.to_lowercase();
    let bucket = if lower.contains("full") {
        "Full-time"
    } else if lower.contains("part") {
        "Part-time"
    } else if lower.contains("contract") {
        "Contract"
    } else if lower.contains("temp") {
        "Temporary"
    } else if lower.contains("intern") {
        "Internship"
    } else {
        return text.trim().to_string();
    };
    bucket.to_string()
}

/// "United States (Remote)" → "United States".
pub fn normalize_location(text: &str) -> String {
    match text.split_once('(') {
        Some((head, _)) => head.trim().to_string(),
        None => text.trim().to_string(),
    }
}

fn salary_bounds(raw: &RawFormRecord) -> (f64, f64) {
    let min = raw.lookup(MIN_SALARY);
    let max = raw.lookup(MAX_SALARY);

    if min.is_none() && max.is_none() {
        if let Some(Value::String(range)) = raw.lookup(SALARY_RANGE) {
            if let Some((low, high)) = range.split_once('-') {
                return (
                    parse_amount(low).unwrap_or(0.0),
                    parse_amount(high).unwrap_or(0.0),
                );
            }
        }
    }

    (coerce_salary(min), coerce_salary(max))
}

fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
