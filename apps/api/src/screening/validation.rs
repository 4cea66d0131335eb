//! Field validators for the contact-collection stages.
//!
//! Every validator is pure and total: it returns the normalised value or a
//! `ValidationFailure` with a reason the candidate can act on.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Upper bound on declared professional experience.
pub const MAX_YEARS_EXPERIENCE: f32 = 50.0;

const EMAIL_MIN_LEN: usize = 5;
const EMAIL_MAX_LEN: usize = 254;

static RE_EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").ok());

// Counted after separators are removed.
static RE_PHONE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\+?\d{2,15}$").ok());

static RE_PHONE_SEPARATORS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[\s\-().]").ok());

static RE_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    Experience,
    Position,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {field:?}: {reason}")]
pub struct ValidationFailure {
    pub field: Field,
    pub reason: String,
}

impl ValidationFailure {
    fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub fn validate_name(input: &str) -> Result<String, ValidationFailure> {
    let collapsed = collapse_whitespace(input);
    if collapsed.is_empty() {
        return Err(ValidationFailure::new(
            Field::Name,
            "Please tell me your full name.",
        ));
    }
    Ok(title_case(&collapsed))
}

pub fn validate_email(input: &str) -> Result<String, ValidationFailure> {
    let email = input.trim();
    let len_ok = (EMAIL_MIN_LEN..=EMAIL_MAX_LEN).contains(&email.len());
    let matches = RE_EMAIL.as_ref().is_some_and(|re| re.is_match(email));

    if !len_ok || !matches {
        return Err(ValidationFailure::new(
            Field::Email,
            "Please provide a valid email address (e.g., name@company.com).",
        ));
    }
    Ok(email.to_lowercase())
}

pub fn validate_phone(input: &str) -> Result<String, ValidationFailure> {
    let trimmed = input.trim();
    let compact = match RE_PHONE_SEPARATORS.as_ref() {
        Some(re) => re.replace_all(trimmed, "").into_owned(),
        None => trimmed.to_string(),
    };

    if !RE_PHONE.as_ref().is_some_and(|re| re.is_match(&compact)) {
        return Err(ValidationFailure::new(
            Field::Phone,
            "Please provide a valid phone number using digits only, optionally starting with +.",
        ));
    }
    Ok(compact)
}

/// Accepts "3", "3 years", "about 2.5 years". The first number found wins.
pub fn validate_experience(input: &str) -> Result<f32, ValidationFailure> {
    let first_number = RE_NUMBER
        .as_ref()
        .and_then(|re| re.find(input))
        .and_then(|m| m.as_str().parse::<f32>().ok());

    match first_number {
        Some(years) if (0.0..=MAX_YEARS_EXPERIENCE).contains(&years) => Ok(years),
        Some(_) => Err(ValidationFailure::new(
            Field::Experience,
            format!("Years of experience must be between 0 and {MAX_YEARS_EXPERIENCE}."),
        )),
        None => Err(ValidationFailure::new(
            Field::Experience,
            "Please provide your years of experience as a number (e.g., '3' or '5 years').",
        )),
    }
}

pub fn validate_position(input: &str) -> Result<String, ValidationFailure> {
    let collapsed = collapse_whitespace(input);
    if collapsed.is_empty() {
        return Err(ValidationFailure::new(
            Field::Position,
            "Please tell me which position you are interested in.",
        ));
    }
    Ok(title_case(&collapsed))
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-cases the first letter of each word and leaves the rest as typed.
fn title_case(input: &str) -> String {
    input
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
