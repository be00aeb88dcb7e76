//! Auth routes: password login, sign-up, logout, and the `AuthUser` extractor.

use std::sync::Arc;

use axum::Extension;
use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::extract::ApiJson;
use crate::backend::{AuthIdentity, Backend};
use crate::error::AppError;
use crate::services::auth as auth_svc;
use crate::session::{self, ACCESS_TOKEN_COOKIE, ORG_COOKIE, REFRESH_TOKEN_COOKIE, UserSession};
use crate::state::AppState;

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Signed-in caller plus the provider handle to act for them.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub session: UserSession,
    pub backend: Arc<dyn Backend>,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let backend = AppState::from_ref(state).backend()?;
        let session = parts
            .extensions
            .get::<UserSession>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("not signed in"))?;
        Ok(Self { session, backend })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login`: password sign-in, sets session cookies.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<auth_svc::LoginInput>,
) -> Result<Response, AppError> {
    let backend = state.backend()?;
    let session = auth_svc::login(backend.as_ref(), &input).await?;

    let [access, refresh] = session::session_cookies(&session.tokens, state.cookie_secure);
    let jar = CookieJar::new().add(access).add(refresh);
    Ok((jar, Json(json!({ "success": true }))).into_response())
}

/// `POST /api/auth/signup`: register; the caller logs in afterwards.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<auth_svc::SignUpInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let backend = state.backend()?;
    auth_svc::sign_up(backend.as_ref(), &input).await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/auth/logout`: revoke at the provider, clear every cookie.
pub async fn logout(State(state): State<AppState>, session: Option<Extension<UserSession>>) -> impl IntoResponse {
    if let (Some(backend), Some(Extension(session))) = (state.backend.as_deref(), session) {
        auth_svc::sign_out(backend, &session.access_token).await;
    }

    let secure = state.cookie_secure;
    let jar = CookieJar::new()
        .add(session::clear_cookie(ACCESS_TOKEN_COOKIE, secure))
        .add(session::clear_cookie(REFRESH_TOKEN_COOKIE, secure))
        .add(session::clear_cookie(ORG_COOKIE, secure));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me`: return current identity.
pub async fn me(auth: AuthUser) -> Json<AuthIdentity> {
    Json(auth.session.user)
}
