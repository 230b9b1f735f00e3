//! Form field validation and formatting.
//!
//! Brazilian formats: phones are 10 or 11 digits (`(11) 99999-9999`), CEP
//! postal codes are 8 digits (`01310-100`).
//! Validation only looks at the digits, so formatted and raw input are
//! accepted alike.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::types::Email;

static PHONE_10: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{4})(\d{4})$").expect("phone pattern is valid"));
static PHONE_11: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{5})(\d{4})$").expect("phone pattern is valid"));

/// Keep only ASCII digits.
#[must_use]
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Whether the input is a syntactically valid email.
#[must_use]
pub fn is_valid_email(input: &str) -> bool {
    Email::parse(input).is_ok()
}

/// Whether the input holds a 10 or 11 digit phone number.
#[must_use]
pub fn is_valid_phone(input: &str) -> bool {
    (10..=11).contains(&digits_only(input).len())
}

/// Whether the input holds an 8 digit CEP.
#[must_use]
pub fn is_valid_cep(input: &str) -> bool {
    digits_only(input).len() == 8
}

/// Format a CEP as `00000-000`, leaving short input as bare digits.
#[must_use]
pub fn format_cep(input: &str) -> String {
    let digits = digits_only(input);
    if digits.len() <= 5 {
        return digits;
    }
    let (head, tail) = digits.split_at(5);
    let tail: String = tail.chars().take(3).collect();
    format!("{head}-{tail}")
}

/// Format a phone as `(11) 9999-9999` or `(11) 99999-9999`.
///
/// Input that is not a complete phone number is returned as bare digits.
#[must_use]
pub fn format_phone(input: &str) -> String {
    let digits = digits_only(input);
    let pattern = if digits.len() <= 10 { &PHONE_10 } else { &PHONE_11 };
    pattern.replace(&digits, "($1) $2-$3").into_owned()
}

/// A validation failure tied to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name.
    pub field: &'static str,
    /// User-facing message.
    pub message: String,
}

/// Field-scoped validation errors, rendered inline next to each input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record an error for `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record an error for `field` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// All errors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when empty, otherwise the errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&joined.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation_counts_digits() {
        assert!(is_valid_phone("(11) 99999-9999"));
        assert!(is_valid_phone("1133334444"));
        assert!(!is_valid_phone("999-9999"));
        assert!(!is_valid_phone("119999999999"));
    }

    #[test]
    fn test_cep_validation() {
        assert!(is_valid_cep("01310-100"));
        assert!(!is_valid_cep("0131-010"));
    }

    #[test]
    fn test_format_cep() {
        assert_eq!(format_cep("01310100"), "01310-100");
        assert_eq!(format_cep("013"), "013");
        assert_eq!(format_cep("0131010099"), "01310-100");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("11999998888"), "(11) 99999-8888");
        assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
        assert_eq!(format_phone("(11) 99999-8888"), "(11) 99999-8888");
        assert_eq!(format_phone("1199"), "1199");
    }

    #[test]
    fn test_field_errors_lookup() {
        let mut errors = FieldErrors::new();
        errors.check(true, "name", "unused");
        errors.check(false, "email", "Email inválido");
        assert_eq!(errors.get("email"), Some("Email inválido"));
        assert_eq!(errors.get("name"), None);
        assert!(errors.clone().into_result(()).is_err());
        assert!(FieldErrors::new().into_result(1).is_ok());
    }
}
