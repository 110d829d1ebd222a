//! Pure input validators invoked at the handler boundary, before any core
//! operation runs. Each returns a structured failure naming the offending
//! field; `collect` folds a batch of checks into one API error.

use std::collections::HashMap;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

fn err(field: &'static str, message: impl Into<String>) -> Result<(), FieldError> {
    Err(FieldError { field, message: message.into() })
}

const TITLE_SYMBOLS: &str = ".,-()/%&'!?+#\":";

/// Names and titles: 2..=255 characters, letters, digits, spaces and common
/// punctuation.
pub fn validate_title(field: &'static str, value: &str) -> Result<(), FieldError> {
    let len = value.chars().count();
    if !(2..=255).contains(&len) {
        return err(field, "Size must be between 2 and 255 characters");
    }
    if !value.chars().all(|c| c.is_alphanumeric() || c == ' ' || TITLE_SYMBOLS.contains(c)) {
        return err(field, "Contains invalid symbols");
    }
    Ok(())
}

pub fn validate_optional_title(field: &'static str, value: Option<&str>) -> Result<(), FieldError> {
    match value {
        Some(v) => validate_title(field, v),
        None => Ok(()),
    }
}

pub fn validate_optional_description(field: &'static str, value: Option<&str>) -> Result<(), FieldError> {
    let Some(value) = value else { return Ok(()) };
    let len = value.chars().count();
    if !(2..=255).contains(&len) {
        return err(field, "Size must be between 2 and 255 characters");
    }
    if !value.chars().all(|c| c.is_alphanumeric() || c == ' ' || TITLE_SYMBOLS.contains(c)) {
        return err(field, "Contains invalid symbols");
    }
    Ok(())
}

/// External references must be absolute http(s) URLs.
pub fn validate_ref_url(field: &'static str, value: &str) -> Result<(), FieldError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => err(field, "Must be a valid http or https URL"),
    }
}

pub fn validate_optional_ref_url(field: &'static str, value: Option<&str>) -> Result<(), FieldError> {
    match value {
        Some(v) => validate_ref_url(field, v),
        None => Ok(()),
    }
}

pub fn validate_username(field: &'static str, value: &str) -> Result<(), FieldError> {
    let len = value.chars().count();
    if !(2..=64).contains(&len) {
        return err(field, "Size must be between 2 and 64 characters");
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.') {
        return err(field, "Only letters, digits, hyphens, underscores and dots are allowed");
    }
    Ok(())
}

pub fn validate_email(field: &'static str, value: &str) -> Result<(), FieldError> {
    let len = value.chars().count();
    let well_formed = len <= 255
        && value.split('@').count() == 2
        && value.split('@').all(|part| !part.is_empty())
        && value.rsplit('@').next().is_some_and(|domain| domain.contains('.'));
    if !well_formed {
        return err(field, "Must be a valid email address");
    }
    Ok(())
}

pub fn validate_password(field: &'static str, value: &str) -> Result<(), FieldError> {
    let len = value.chars().count();
    if !(8..=64).contains(&len) {
        return err(field, "Size must be between 8 and 64 characters");
    }
    if !value.chars().any(|c| c.is_ascii_alphabetic()) || !value.chars().any(|c| c.is_ascii_digit()) {
        return err(field, "Must contain at least one letter and one digit");
    }
    Ok(())
}

/// Run a batch of checks; on any failure, produce one validation error with
/// per-field messages.
pub fn collect(checks: impl IntoIterator<Item = Result<(), FieldError>>) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();
    for check in checks {
        if let Err(failure) = check {
            field_errors.entry(failure.field.to_string()).or_insert(failure.message);
        }
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Validation failed", Some(field_errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_accept_common_punctuation() {
        assert!(validate_title("title", "Push-up (wide grip), level 2").is_ok());
        assert!(validate_title("title", "Warm-up: 5 min").is_ok());
    }

    #[test]
    fn titles_reject_control_and_angle_brackets() {
        assert!(validate_title("title", "<script>").is_err());
        assert!(validate_title("title", "a").is_err());
        let long = "x".repeat(256);
        assert!(validate_title("title", &long).is_err());
    }

    #[test]
    fn ref_urls_must_be_http() {
        assert!(validate_ref_url("ref", "https://example.com/video").is_ok());
        assert!(validate_ref_url("ref", "ftp://example.com").is_err());
        assert!(validate_ref_url("ref", "not a url").is_err());
    }

    #[test]
    fn emails_are_shape_checked() {
        assert!(validate_email("email", "user@example.com").is_ok());
        assert!(validate_email("email", "user@localhost").is_err());
        assert!(validate_email("email", "userexample.com").is_err());
        assert!(validate_email("email", "@example.com").is_err());
    }

    #[test]
    fn passwords_need_letters_and_digits() {
        assert!(validate_password("password", "abcd1234").is_ok());
        assert!(validate_password("password", "abcdefgh").is_err());
        assert!(validate_password("password", "12345678").is_err());
        assert!(validate_password("password", "a1").is_err());
    }

    #[test]
    fn collect_folds_failures_per_field() {
        let result = collect([
            validate_title("title", "x"),
            validate_ref_url("ref", "nope"),
            validate_optional_description("description", None),
        ]);
        let Err(ApiError::ValidationError { field_errors: Some(errors), .. }) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("ref"));
    }
}
