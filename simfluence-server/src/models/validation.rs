//! Validation error types

use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Field is empty or absent when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., email, URL)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Invalid enum variant
    InvalidVariant { field: &'static str, value: String },

    /// Count or score below zero
    Negative { field: &'static str },

    /// Request body could not be decoded
    MalformedBody { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} is required", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::InvalidVariant { field, value } => {
                write!(f, "invalid {} value: '{}'", field, value)
            }
            Self::Negative { field } => write!(f, "{} must not be negative", field),
            Self::MalformedBody { message } => write!(f, "malformed request body: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Reject a negative optional count.
pub fn non_negative<T>(field: &'static str, value: Option<T>) -> Result<Option<T>, ValidationError>
where
    T: PartialOrd + Default + Copy,
{
    match value {
        Some(v) if v < T::default() => Err(ValidationError::Negative { field }),
        other => Ok(other),
    }
}

/// Trimmed, non-empty text with a length cap.
pub fn required_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Like [`required_text`] but absent or blank input yields `None`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => required_text(field, Some(s), max).map(Some),
    }
}
