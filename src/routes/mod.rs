//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the page-model endpoints and the JSON API under a single
//! Axum router. The tenant gate wraps every route, so handlers behind a
//! protected prefix can rely on a `UserSession` in request extensions.

pub mod auth;
pub mod extract;
pub mod organizations;
pub mod pages;
pub mod profile;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::gate;
use crate::state::AppState;

/// Full application router: pages + API behind the tenant gate.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", get(pages::login_page))
        .route("/signup", get(pages::signup_page))
        .route("/onboarding", get(pages::onboarding_page))
        .route("/dashboard", get(pages::dashboard_page))
        .route("/dashboard/profile", get(pages::profile_page))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/organizations",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route("/api/organizations/switch", post(organizations::switch_organization))
        .route("/api/organizations/{id}", get(organizations::get_organization))
        .route("/api/profile", get(profile::get_profile).patch(profile::update_profile))
        .route("/api/profile/avatar", post(profile::upload_avatar))
        .layer(middleware::from_fn_with_state(state.clone(), gate::tenant_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
