//! Page-model endpoints.
//!
//! Each page route returns the JSON a client needs to render that screen.
//! `/onboarding` and `/dashboard*` sit behind the gate, so by the time these
//! handlers run the caller is signed in and, outside onboarding, has an
//! active organization.

use axum::Extension;
use axum::response::Json;
use serde::Serialize;

use super::auth::AuthUser;
use crate::backend::{Organization, Profile};
use crate::error::AppError;
use crate::services::{organization as org_svc, profile as profile_svc};
use crate::session::ActiveOrganization;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPage {
    pub page: &'static str,
    pub action: &'static str,
    pub alternate_href: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingPage {
    pub page: &'static str,
    pub action: &'static str,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPage {
    pub profile: Profile,
    pub organizations: Vec<Organization>,
    pub current_org_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePage {
    pub profile: Profile,
    pub email: Option<String>,
    pub organizations: Vec<Organization>,
    pub current_org_id: Option<String>,
}

/// `GET /login`
pub async fn login_page() -> Json<FormPage> {
    Json(FormPage { page: "login", action: "/api/auth/login", alternate_href: "/signup" })
}

/// `GET /signup`
pub async fn signup_page() -> Json<FormPage> {
    Json(FormPage { page: "signup", action: "/api/auth/signup", alternate_href: "/login" })
}

/// `GET /onboarding`: only reached by signed-in users with no organization.
pub async fn onboarding_page(auth: AuthUser) -> Json<OnboardingPage> {
    Json(OnboardingPage { page: "onboarding", action: "/api/organizations", email: auth.session.user.email })
}

/// `GET /dashboard`
pub async fn dashboard_page(
    auth: AuthUser,
    active: Option<Extension<ActiveOrganization>>,
) -> Result<Json<DashboardPage>, AppError> {
    let backend = auth.backend.as_ref();
    let profile = profile_svc::get_current_profile(backend, &auth.session).await?;
    let organizations = org_svc::list_user_organizations(backend, &auth.session).await;
    Ok(Json(DashboardPage {
        profile,
        organizations,
        current_org_id: active.map(|Extension(ActiveOrganization(id))| id),
    }))
}

/// `GET /dashboard/profile`: profile settings, with the auth email that the
/// public profile row does not carry.
pub async fn profile_page(
    auth: AuthUser,
    active: Option<Extension<ActiveOrganization>>,
) -> Result<Json<ProfilePage>, AppError> {
    let backend = auth.backend.as_ref();
    let profile = profile_svc::get_current_profile(backend, &auth.session).await?;
    let organizations = org_svc::list_user_organizations(backend, &auth.session).await;
    Ok(Json(ProfilePage {
        profile,
        email: auth.session.user.email.clone(),
        organizations,
        current_org_id: active.map(|Extension(ActiveOrganization(id))| id),
    }))
}
