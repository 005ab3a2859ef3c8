//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email address is malformed")]
    InvalidEmail,

    #[error("Password is required")]
    MissingPassword,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),
}

impl UserValidationError {
    /// Field the failure is scoped to
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::MissingPassword | Self::PasswordTooShort(_) => "password",
        }
    }
}

impl From<UserValidationError> for DomainError {
    fn from(error: UserValidationError) -> Self {
        DomainError::invalid_field(error.field(), error.to_string())
    }
}

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Validate an email address
///
/// Rules:
/// - Cannot be empty
/// - One `@`, a non-empty local part and a dotted domain, no whitespace
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a password against the configured minimum length
pub fn validate_password(
    password: Option<&str>,
    min_length: usize,
) -> Result<(), UserValidationError> {
    let password = match password {
        Some(p) if !p.is_empty() => p,
        _ => return Err(UserValidationError::MissingPassword),
    };

    if password.chars().count() < min_length {
        return Err(UserValidationError::PasswordTooShort(min_length));
    }

    Ok(())
}
