//! Password auth service: login, sign-up, sign-out against the provider.

use serde::Deserialize;

use crate::backend::{AuthSession, Backend, BackendError};
use crate::error::AppError;

const MIN_FULL_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return None;
    }
    if normalized.chars().any(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

/// Validate login input, returning the normalized email.
///
/// # Errors
///
/// `VALIDATION_ERROR` for a malformed email or an empty password.
pub fn validate_login(input: &LoginInput) -> Result<String, AppError> {
    let email = normalize_email(&input.email).ok_or_else(|| AppError::validation("invalid email"))?;
    if input.password.is_empty() {
        return Err(AppError::validation("password is required"));
    }
    Ok(email)
}

/// Validate sign-up input, returning `(full_name, email)` trimmed/normalized.
///
/// # Errors
///
/// `VALIDATION_ERROR` naming the first failing field.
pub fn validate_sign_up(input: &SignUpInput) -> Result<(String, String), AppError> {
    let full_name = input.full_name.trim();
    if full_name.chars().count() < MIN_FULL_NAME_LEN {
        return Err(AppError::validation("name is too short"));
    }
    let email = normalize_email(&input.email).ok_or_else(|| AppError::validation("invalid email"))?;
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok((full_name.to_owned(), email))
}

/// Exchange email + password for a provider session.
///
/// # Errors
///
/// `VALIDATION_ERROR` for bad input, `UNAUTHORIZED` when the provider refuses
/// the credentials, `INTERNAL_ERROR` otherwise.
pub async fn login(backend: &dyn Backend, input: &LoginInput) -> Result<AuthSession, AppError> {
    let email = validate_login(input)?;
    match backend.sign_in_with_password(&email, &input.password).await {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "user logged in");
            Ok(session)
        }
        Err(BackendError::Rejected(message)) => Err(AppError::unauthorized(message)),
        Err(e) => {
            tracing::error!(error = %e, "password sign-in failed");
            Err(AppError::internal("login failed"))
        }
    }
}

/// Register a new user. The provider creates the profile from `full_name`.
///
/// # Errors
///
/// `VALIDATION_ERROR` for bad input, `INTERNAL_ERROR` for any provider failure.
pub async fn sign_up(backend: &dyn Backend, input: &SignUpInput) -> Result<(), AppError> {
    let (full_name, email) = validate_sign_up(input)?;
    match backend.sign_up(&email, &input.password, &full_name).await {
        Ok(()) => {
            tracing::info!(%email, "user signed up");
            Ok(())
        }
        Err(BackendError::Rejected(message)) => Err(AppError::internal(message)),
        Err(e) => {
            tracing::error!(error = %e, "sign-up failed");
            Err(AppError::internal("sign-up failed"))
        }
    }
}

/// Revoke the session at the provider. Best effort: cookies are cleared by
/// the caller regardless.
pub async fn sign_out(backend: &dyn Backend, access_token: &str) {
    if let Err(e) = backend.sign_out(access_token).await {
        tracing::warn!(error = %e, "provider sign-out failed");
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
