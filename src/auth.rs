//! Simulated sign-in and registration.
//!
//! Nothing is persisted: login compares against the configured demo account
//! and a valid registration only reports success.

use serde::Deserialize;
use thiserror::Error;

use crate::config::DemoAccount;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Validation failures. `Display` is the message shown next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Please enter both username and password.")]
    MissingCredentials,
    #[error("Invalid username or password. Please try again.")]
    InvalidCredentials,
    #[error("All fields are required for registration.")]
    MissingFields,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Password must be at least 8 characters long.")]
    PasswordTooShort,
    #[error("Could not read the submitted form. Please try again.")]
    UnreadableForm,
}

/// Returns the trimmed username on success.
pub fn check_login(form: &LoginForm, account: &DemoAccount) -> Result<String, AuthError> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    if username == account.username && form.password == account.password {
        Ok(username.to_string())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Checks run in order: presence, confirmation match, length. Username
/// content is not inspected beyond presence.
pub fn validate_registration(form: &SignupForm) -> Result<String, AuthError> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() || form.confirm_password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if form.password != form.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }
    if form.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(username.to_string())
}
