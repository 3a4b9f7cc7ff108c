//! Request validation.
//!
//! Payloads are checked here, before anything reaches a store. Every failure
//! is a structured [`FieldError`] so that clients get the full list at once.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid username regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// What is wrong with a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    Empty,
    TooShort { min: usize },
    TooLong { max: usize },
    OutOfRange { min: f64, max: f64 },
    InvalidFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(flatten)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.field;
        match &self.kind {
            FieldErrorKind::Required => write!(f, "{field} is required"),
            FieldErrorKind::Empty => write!(f, "{field} must not be empty"),
            FieldErrorKind::TooShort { min } => {
                write!(f, "{field} must be at least {min} characters")
            }
            FieldErrorKind::TooLong { max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            FieldErrorKind::OutOfRange { min, max } => {
                write!(f, "{field} must be between {min} and {max}")
            }
            FieldErrorKind::InvalidFormat => write!(f, "{field} has an invalid format"),
        }
    }
}

/// One or more field errors from validating a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether any error concerns `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn kind_of(&self, field: &str) -> Option<&FieldErrorKind> {
        self.0.iter().find(|e| e.field == field).map(|e| &e.kind)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by request payloads.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Collects field errors for one payload.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, kind: FieldErrorKind) {
        self.errors.push(FieldError::new(field, kind));
    }

    /// A required string: present, non-blank, within `min..=max` characters.
    pub fn required_text(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        match value {
            None => self.push(field, FieldErrorKind::Required),
            Some(text) if text.trim().is_empty() => self.push(field, FieldErrorKind::Empty),
            Some(text) => self.length(field, text.trim(), min, max),
        }
    }

    /// An optional string: when present, at most `max` characters.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(text) = value {
            self.length(field, text.trim(), 0, max);
        }
    }

    pub fn length(&mut self, field: &str, text: &str, min: usize, max: usize) {
        let len = text.chars().count();
        if len < min {
            self.push(field, FieldErrorKind::TooShort { min });
        } else if len > max {
            self.push(field, FieldErrorKind::TooLong { max });
        }
    }

    /// An optional number: when present, within `min..=max`.
    pub fn optional_range(&mut self, field: &str, value: Option<f64>, min: f64, max: f64) {
        if let Some(number) = value
            && !(min..=max).contains(&number)
        {
            self.push(field, FieldErrorKind::OutOfRange { min, max });
        }
    }

    pub fn pattern(&mut self, field: &str, text: &str, re: &Regex) {
        if !re.is_match(text) {
            self.push(field, FieldErrorKind::InvalidFormat);
        }
    }

    pub fn username(&mut self, field: &str, value: Option<&str>) {
        self.required_text(field, value, 3, 30);
        if let Some(text) = value
            && !text.trim().is_empty()
        {
            self.pattern(field, text, &USERNAME_RE);
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        self.required_text(field, value, 3, 254);
        if let Some(text) = value
            && !text.trim().is_empty()
        {
            self.pattern(field, text.trim(), &EMAIL_RE);
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        let mut v = Validator::new();
        v.required_text("a", None, 1, 10);
        v.required_text("b", Some("   "), 1, 10);
        v.required_text("c", Some("ok"), 1, 10);
        v.required_text("d", Some("far too long for this"), 1, 10);
        v.required_text("e", Some("ab"), 3, 10);

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.kind_of("a"), Some(&FieldErrorKind::Required));
        assert_eq!(errors.kind_of("b"), Some(&FieldErrorKind::Empty));
        assert!(!errors.has("c"));
        assert_eq!(errors.kind_of("d"), Some(&FieldErrorKind::TooLong { max: 10 }));
        assert_eq!(errors.kind_of("e"), Some(&FieldErrorKind::TooShort { min: 3 }));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut v = Validator::new();
        v.required_text("name", Some("Märzen"), 1, 6);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_optional_range() {
        let mut v = Validator::new();
        v.optional_range("abv", None, 0.0, 70.0);
        v.optional_range("ibu", Some(120.0), 0.0, 120.0);
        v.optional_range("low", Some(-0.5), 0.0, 70.0);
        v.optional_range("nan", Some(f64::NAN), 0.0, 70.0);

        let errors = v.finish().unwrap_err();
        assert!(!errors.has("abv"));
        assert!(!errors.has("ibu"));
        assert!(errors.has("low"));
        assert!(errors.has("nan"));
    }

    #[test]
    fn test_username_and_email() {
        let mut v = Validator::new();
        v.username("good_user", Some("hop-head_42"));
        v.username("bad_user", Some("no spaces"));
        v.email("good_email", Some("brewer@example.com"));
        v.email("bad_email", Some("brewer.example.com"));

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.errors().len(), 2);
        assert_eq!(errors.kind_of("bad_user"), Some(&FieldErrorKind::InvalidFormat));
        assert_eq!(errors.kind_of("bad_email"), Some(&FieldErrorKind::InvalidFormat));
    }

    #[test]
    fn test_display_lists_every_error() {
        let errors = ValidationErrors(vec![
            FieldError::new("name", FieldErrorKind::Required),
            FieldError::new("abv", FieldErrorKind::OutOfRange { min: 0.0, max: 70.0 }),
        ]);
        assert_eq!(
            errors.to_string(),
            "validation failed: name is required; abv must be between 0 and 70"
        );
    }

    #[test]
    fn test_field_error_serialization() {
        let error = FieldError::new("ibu", FieldErrorKind::TooLong { max: 5 });
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["field"], "ibu");
        assert_eq!(json["kind"], "too_long");
        assert_eq!(json["max"], 5);
    }
}
