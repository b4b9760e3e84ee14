//! Common validation utilities

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Validation error with field-level details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) {
        self.add(ValidationError::new(field, message, code));
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Fold another collection in, prefixing its fields (e.g. `mail.host`)
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for error in other.errors {
            self.add(ValidationError {
                field: format!("{}.{}", prefix, error.field),
                ..error
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn to_field_errors(&self) -> HashMap<String, Vec<String>> {
        let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
        for error in &self.errors {
            field_errors
                .entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }
        field_errors
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Trait for types that can be validated
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Common validation functions
pub mod validators {
    /// Check if a string is not empty
    pub fn not_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Check if a string length is within bounds
    pub fn length_between(value: &str, min: usize, max: usize) -> bool {
        let len = value.len();
        len >= min && len <= max
    }

    /// Check if a URL uses one of the given schemes
    pub fn has_scheme(url: &str, schemes: &[&str]) -> bool {
        schemes
            .iter()
            .any(|scheme| url.starts_with(&format!("{}://", scheme)) || url.starts_with(&format!("{}:", scheme)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_and_display() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add_error("host", "must not be empty", "required");
        errors.add_error("port", "must be greater than zero", "range");

        assert!(errors.has_errors());
        assert!(errors.has_field("host"));
        assert_eq!(errors.to_string(), "host: must not be empty; port: must be greater than zero");
        assert_eq!(errors.to_field_errors()["port"], vec!["must be greater than zero"]);
    }

    #[test]
    fn test_merge_prefixed() {
        let mut inner = ValidationErrors::new();
        inner.add_error("host", "must not be empty", "required");

        let mut outer = ValidationErrors::new();
        outer.merge_prefixed("mail", inner);

        assert!(outer.has_field("mail.host"));
        assert!(outer.into_result().is_err());
    }

    #[test]
    fn test_validators() {
        assert!(validators::not_empty("x"));
        assert!(!validators::not_empty("   "));
        assert!(validators::length_between("abc", 1, 3));
        assert!(!validators::length_between("abcd", 1, 3));
        assert!(validators::has_scheme("redis://localhost", &["redis", "rediss"]));
        assert!(validators::has_scheme("sqlite::memory:", &["sqlite"]));
        assert!(!validators::has_scheme("http://x", &["redis"]));
    }
}
