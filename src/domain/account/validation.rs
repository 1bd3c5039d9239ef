//! Account field validation

use thiserror::Error;
use validator::ValidateEmail;

/// Errors that can occur during account validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountValidationError {
    #[error("Handle cannot be empty")]
    EmptyHandle,

    #[error("Handle is too short. Minimum length is {0} characters")]
    HandleTooShort(usize),

    #[error("Handle exceeds maximum length of {0} characters")]
    HandleTooLong(usize),

    #[error("Handle contains invalid character: '{0}'. Only alphanumeric characters, underscores, and hyphens are allowed")]
    InvalidHandleCharacter(char),

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Password should be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MIN_HANDLE_LENGTH: usize = 3;
const MAX_HANDLE_LENGTH: usize = 50;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a login handle
///
/// Rules:
/// - Minimum 3 characters
/// - Maximum 50 characters
/// - Only alphanumeric characters, underscores, and hyphens
pub fn validate_handle(handle: &str) -> Result<(), AccountValidationError> {
    if handle.is_empty() {
        return Err(AccountValidationError::EmptyHandle);
    }

    if handle.len() < MIN_HANDLE_LENGTH {
        return Err(AccountValidationError::HandleTooShort(MIN_HANDLE_LENGTH));
    }

    if handle.len() > MAX_HANDLE_LENGTH {
        return Err(AccountValidationError::HandleTooLong(MAX_HANDLE_LENGTH));
    }

    for c in handle.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
            return Err(AccountValidationError::InvalidHandleCharacter(c));
        }
    }

    Ok(())
}

/// Validate an email address shape
pub fn validate_email(email: &str) -> Result<(), AccountValidationError> {
    if !email.validate_email() {
        return Err(AccountValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a password against the configured minimum length
pub fn validate_password(password: &str, min_length: usize) -> Result<(), AccountValidationError> {
    if password.len() < min_length {
        return Err(AccountValidationError::PasswordTooShort(min_length));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AccountValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
