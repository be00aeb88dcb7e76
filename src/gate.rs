//! Tenant-resolution gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs once per request, in front of every route. It refreshes the caller's
//! provider session, then for protected areas makes sure the caller is signed
//! in and has an active organization pointer, redirecting to `/login`,
//! `/onboarding` or `/dashboard` as needed.
//!
//! DESIGN
//! ======
//! Session resolution and the tenancy decision are separate steps. The
//! decision (`evaluate`) reads only the path, the resolved session and the
//! org cookie, and asks the provider at most one question: the caller's
//! earliest membership. The org cookie itself is never checked against the
//! provider here; row-level authorization on every data call covers that.
//!
//! ERROR HANDLING
//! ==============
//! The gate fails open. Missing backend config, an unreachable auth provider,
//! or a failed membership lookup are logged and the request continues without
//! redirect or new org cookie.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::backend::Backend;
use crate::session::{self, ACCESS_TOKEN_COOKIE, ActiveOrganization, REFRESH_TOKEN_COOKIE, UserSession};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";
pub const ONBOARDING_PATH: &str = "/onboarding";
pub const DASHBOARD_PATH: &str = "/dashboard";

const PROTECTED_PREFIXES: [&str; 4] = ["/dashboard", "/app", "/admin", "/onboarding"];
const STATIC_PREFIXES: [&str; 2] = ["/static/", "/assets/"];
const STATIC_EXTENSIONS: [&str; 6] = [".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp"];

// =============================================================================
// ROUTE CLASSIFICATION
// =============================================================================

#[must_use]
pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Paths the gate never looks at: asset directories, the favicon, images.
#[must_use]
pub fn is_static_asset(path: &str) -> bool {
    if path == "/favicon.ico" || STATIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    let lower = path.to_ascii_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

// =============================================================================
// SESSION RESOLUTION
// =============================================================================

/// Outcome of validating / refreshing the session cookies.
#[derive(Debug, Default)]
pub struct ResolvedSession {
    pub session: Option<UserSession>,
    /// Cookies to send back: refreshed tokens, or clears for dead ones.
    pub cookies: Vec<Cookie<'static>>,
}

/// Validate the access token cookie, falling back to the refresh token.
pub async fn resolve_session(backend: &dyn Backend, jar: &CookieJar, secure: bool) -> ResolvedSession {
    let mut resolved = ResolvedSession::default();

    if let Some(token) = session::access_token(jar) {
        match backend.get_user(token).await {
            Ok(Some(user)) => {
                resolved.session = Some(UserSession { user, access_token: token.to_owned() });
                return resolved;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "auth provider user lookup failed");
                return resolved;
            }
        }
    }

    let Some(refresh) = session::refresh_token(jar) else {
        if session::access_token(jar).is_some() {
            resolved
                .cookies
                .push(session::clear_cookie(ACCESS_TOKEN_COOKIE, secure));
        }
        return resolved;
    };

    match backend.refresh_session(refresh).await {
        Ok(Some(fresh)) => {
            tracing::debug!(user_id = %fresh.user.id, "session refreshed");
            resolved
                .cookies
                .extend(session::session_cookies(&fresh.tokens, secure));
            resolved.session = Some(UserSession { user: fresh.user, access_token: fresh.tokens.access_token });
        }
        Ok(None) => {
            resolved
                .cookies
                .push(session::clear_cookie(ACCESS_TOKEN_COOKIE, secure));
            resolved
                .cookies
                .push(session::clear_cookie(REFRESH_TOKEN_COOKIE, secure));
        }
        Err(e) => {
            tracing::warn!(error = %e, "session refresh failed");
        }
    }

    resolved
}

// =============================================================================
// TENANCY DECISION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GateOutcome {
    /// Path to redirect to, if any.
    pub redirect: Option<&'static str>,
    /// Organization to write into the pointer cookie, if any.
    pub set_org: Option<Uuid>,
}

impl GateOutcome {
    fn pass() -> Self {
        Self::default()
    }

    fn redirect(target: &'static str) -> Self {
        Self { redirect: Some(target), set_org: None }
    }
}

/// Decide what to do with a request to `path`.
pub async fn evaluate(
    backend: &dyn Backend,
    path: &str,
    session: Option<&UserSession>,
    org_cookie: Option<&str>,
) -> GateOutcome {
    if !is_protected(path) {
        return GateOutcome::pass();
    }

    let Some(session) = session else {
        return GateOutcome::redirect(LOGIN_PATH);
    };

    let is_onboarding = path == ONBOARDING_PATH;

    if org_cookie.is_some() {
        // An active organization means onboarding is already done.
        return if is_onboarding { GateOutcome::redirect(DASHBOARD_PATH) } else { GateOutcome::pass() };
    }

    match backend
        .first_membership(&session.access_token, session.user.id)
        .await
    {
        Ok(Some(org_id)) => GateOutcome {
            redirect: is_onboarding.then_some(DASHBOARD_PATH),
            set_org: Some(org_id),
        },
        Ok(None) if is_onboarding => GateOutcome::pass(),
        Ok(None) => GateOutcome::redirect(ONBOARDING_PATH),
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, %path, "membership lookup failed");
            GateOutcome::pass()
        }
    }
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

/// Axum middleware wired with `middleware::from_fn_with_state`.
pub async fn tenant_gate(State(state): State<AppState>, jar: CookieJar, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if is_static_asset(&path) {
        return next.run(request).await;
    }

    let Some(backend) = state.backend.clone() else {
        tracing::error!(%path, "backend env vars missing (SUPABASE_URL / SUPABASE_PUBLISHABLE_KEY); passing request through");
        return next.run(request).await;
    };

    let ResolvedSession { session, mut cookies } = resolve_session(backend.as_ref(), &jar, state.cookie_secure).await;
    let org_cookie = session::current_org_id(&jar);
    let outcome = evaluate(backend.as_ref(), &path, session.as_ref(), org_cookie).await;

    let mut active_org = org_cookie.map(str::to_owned);
    if let Some(org_id) = outcome.set_org {
        tracing::info!(%org_id, "active organization restored from membership");
        let org_id = org_id.to_string();
        cookies.push(session::org_cookie(&org_id, state.cookie_secure));
        active_org = Some(org_id);
    }

    if let Some(target) = outcome.redirect {
        let location = match request.uri().query() {
            Some(query) => format!("{target}?{query}"),
            None => target.to_owned(),
        };
        tracing::debug!(from = %path, to = %location, "gate redirect");
        return session::append_cookies(Redirect::temporary(&location).into_response(), cookies);
    }

    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }
    if let Some(org_id) = active_org {
        request
            .extensions_mut()
            .insert(ActiveOrganization(org_id));
    }
    let response = next.run(request).await;
    session::append_cookies(response, cookies)
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
