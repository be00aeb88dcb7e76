//! GoTrue auth API: user lookup, token grants, sign-up, logout.

use reqwest::Method;
use serde::Deserialize;

use super::types::{AuthIdentity, AuthSession, BackendError, SessionTokens};
use super::{SupabaseClient, ensure_success, send};

impl SupabaseClient {
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    pub(super) async fn fetch_user(&self, access_token: &str) -> Result<Option<AuthIdentity>, BackendError> {
        let builder = self.request(Method::GET, &self.auth_url("user"), Some(access_token));
        let (status, body) = send(builder).await?;
        if is_rejection(status) {
            return Ok(None);
        }
        parse_user(&ensure_success(status, body)?).map(Some)
    }

    pub(super) async fn refresh_token_grant(&self, refresh_token: &str) -> Result<Option<AuthSession>, BackendError> {
        let builder = self
            .request(Method::POST, &self.auth_url("token?grant_type=refresh_token"), None)
            .json(&serde_json::json!({ "refresh_token": refresh_token }));
        let (status, body) = send(builder).await?;
        // GoTrue answers an unknown or revoked refresh token with 400.
        if status == 400 || is_rejection(status) {
            return Ok(None);
        }
        parse_session(&ensure_success(status, body)?).map(Some)
    }

    pub(super) async fn password_grant(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let builder = self
            .request(Method::POST, &self.auth_url("token?grant_type=password"), None)
            .json(&serde_json::json!({ "email": email, "password": password }));
        let (status, body) = send(builder).await?;
        if (400..500).contains(&status) {
            return Err(BackendError::Rejected(error_message(&body)));
        }
        parse_session(&ensure_success(status, body)?)
    }

    pub(super) async fn signup(&self, email: &str, password: &str, full_name: &str) -> Result<(), BackendError> {
        let builder = self
            .request(Method::POST, &self.auth_url("signup"), None)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }));
        let (status, body) = send(builder).await?;
        if (400..500).contains(&status) {
            return Err(BackendError::Rejected(error_message(&body)));
        }
        ensure_success(status, body).map(|_| ())
    }

    pub(super) async fn logout(&self, access_token: &str) -> Result<(), BackendError> {
        let builder = self.request(Method::POST, &self.auth_url("logout"), Some(access_token));
        let (status, body) = send(builder).await?;
        // An already-invalid token is as good as logged out.
        if is_rejection(status) {
            return Ok(());
        }
        ensure_success(status, body).map(|_| ())
    }
}

fn is_rejection(status: u16) -> bool {
    status == 401 || status == 403
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    user: AuthIdentity,
}

fn default_expires_in() -> i64 {
    3600
}

pub(crate) fn parse_user(json: &str) -> Result<AuthIdentity, BackendError> {
    serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))
}

pub(crate) fn parse_session(json: &str) -> Result<AuthSession, BackendError> {
    let resp: TokenResponse = serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))?;
    Ok(AuthSession {
        tokens: SessionTokens {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            expires_in: resp.expires_in,
        },
        user: resp.user,
    })
}

/// Pull a human-readable message out of a GoTrue error body. The field name
/// differs between endpoints and server versions.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_owned();
    };
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map_or_else(|| body.trim().to_owned(), str::to_owned)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
