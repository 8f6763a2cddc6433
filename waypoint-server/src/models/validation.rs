//! Validation errors and field checks shared by the create requests

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Names, titles, short labels
pub const MAX_SHORT_LEN: usize = 200;
/// URLs and contact fields
pub const MAX_URL_LEN: usize = 2048;
/// Descriptions, blog content, cover letters
pub const MAX_LONG_LEN: usize = 20_000;
/// Entries in list fields such as `requirements` or `tags`
pub const MAX_LIST_ITEMS: usize = 50;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()./-]{5,24}$").expect("invalid phone regex"));

/// Validation error for inbound records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// List field has too many entries
    TooMany { field: &'static str, max: usize },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Number outside the accepted range
    OutOfRange { field: &'static str, min: i64, max: i64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::TooMany { field, max } => {
                write!(f, "{} cannot have more than {} entries", field, max)
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::OutOfRange { field, min, max } => {
                write!(f, "{} must be between {} and {}", field, min, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim a required string, rejecting blanks and overlong values.
pub fn required(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional string; blank becomes absent.
pub fn optional(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => required(field, &v, max).map(Some),
        _ => Ok(None),
    }
}

/// Trim every entry of a list field, dropping blanks.
pub fn string_list(
    field: &'static str,
    values: Vec<String>,
    max_len: usize,
) -> Result<Vec<String>, ValidationError> {
    let items: Vec<String> = values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| required(field, v, max_len))
        .collect::<Result<_, _>>()?;
    if items.len() > MAX_LIST_ITEMS {
        return Err(ValidationError::TooMany {
            field,
            max: MAX_LIST_ITEMS,
        });
    }
    Ok(items)
}

/// Required e-mail address in `local@domain.tld` form.
pub fn email(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = required(field, value, MAX_SHORT_LEN)?;
    if !EMAIL_RE.is_match(&value) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must be a valid e-mail address",
        });
    }
    Ok(value)
}

/// Required phone number: digits with optional leading `+` and separators.
pub fn phone(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = required(field, value, MAX_SHORT_LEN)?;
    if !PHONE_RE.is_match(&value) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must be a phone number of 5 to 24 digits and separators",
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 200,
        };
        assert_eq!(err.to_string(), "title exceeds maximum length of 200 characters");

        let err = ValidationError::OutOfRange {
            field: "rating",
            min: 1,
            max: 5,
        };
        assert_eq!(err.to_string(), "rating must be between 1 and 5");
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Canada ", 10).unwrap(), "Canada");
        assert_eq!(
            required("name", "   ", 10).unwrap_err(),
            ValidationError::Empty { field: "name" }
        );
        assert!(matches!(
            required("name", "abcdefghijk", 10).unwrap_err(),
            ValidationError::TooLong { max: 10, .. }
        ));
    }

    #[test]
    fn optional_blank_is_none() {
        assert_eq!(optional("city", Some("  ".into()), 10).unwrap(), None);
        assert_eq!(optional("city", None, 10).unwrap(), None);
        assert_eq!(
            optional("city", Some(" Perth ".into()), 10).unwrap(),
            Some("Perth".to_string())
        );
    }

    #[test]
    fn string_list_drops_blanks() {
        let items = string_list("tags", vec!["visa".into(), " ".into(), " tips ".into()], 20).unwrap();
        assert_eq!(items, vec!["visa", "tips"]);

        let many = vec!["x".to_string(); MAX_LIST_ITEMS + 1];
        assert!(matches!(
            string_list("tags", many, 20).unwrap_err(),
            ValidationError::TooMany { .. }
        ));
    }

    #[test]
    fn email_format() {
        assert!(email("email", "asha@example.com").is_ok());
        assert!(email("email", "asha@example").is_err());
        assert!(email("email", "asha example.com").is_err());
        assert!(matches!(
            email("email", "").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn phone_format() {
        assert!(phone("phone", "+61 400 123 456").is_ok());
        assert!(phone("phone", "(02) 9876-5432").is_ok());
        assert!(phone("phone", "call me").is_err());
        assert!(phone("phone", "123").is_err());
    }
}
