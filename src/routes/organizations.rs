//! Organization routes: list, create, fetch, switch active tenant.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use uuid::Uuid;

use super::auth::AuthUser;
use super::extract::{ApiJson, ApiPath};
use crate::backend::{Organization, OrganizationRow};
use crate::error::AppError;
use crate::services::organization as org_svc;
use crate::session;
use crate::state::AppState;

/// `GET /api/organizations`: caller's organizations with their role.
pub async fn list_organizations(auth: AuthUser) -> Json<Vec<Organization>> {
    Json(org_svc::list_user_organizations(auth.backend.as_ref(), &auth.session).await)
}

/// `POST /api/organizations`: create, then make it the active organization.
pub async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<org_svc::CreateOrganizationInput>,
) -> Result<Response, AppError> {
    let row = org_svc::create_organization(auth.backend.as_ref(), &auth.session, &input.name).await?;
    let jar = CookieJar::new().add(session::org_cookie(&row.id.to_string(), state.cookie_secure));
    Ok((StatusCode::CREATED, jar, Json(json!({ "success": true, "orgId": row.id }))).into_response())
}

/// `GET /api/organizations/{id}`
pub async fn get_organization(auth: AuthUser, ApiPath(id): ApiPath<Uuid>) -> Result<Json<OrganizationRow>, AppError> {
    org_svc::get_organization(auth.backend.as_ref(), &auth.session, id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("organization not found"))
}

/// `POST /api/organizations/switch`: point `current_org_id` at a membership.
pub async fn switch_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(input): ApiJson<org_svc::SwitchOrganizationInput>,
) -> Result<Response, AppError> {
    let org_id = org_svc::switch_organization(auth.backend.as_ref(), &auth.session, input.org_id).await?;
    let jar = CookieJar::new().add(session::org_cookie(&org_id.to_string(), state.cookie_secure));
    Ok((jar, Json(json!({ "orgId": org_id }))).into_response())
}
