//! Organization service: create, list, look up and switch tenants.
//!
//! Every call runs under the caller's access token, so the provider's
//! row-level policies decide which rows are visible. Membership is the only
//! thing this module checks itself, on switch.

use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::{Backend, MembershipRole, NewMembership, NewOrganization, Organization, OrganizationRow};
use crate::error::AppError;
use crate::session::UserSession;

const MIN_NAME_LEN: usize = 3;
const SLUG_SUFFIX_LEN: usize = 5;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationInput {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchOrganizationInput {
    pub org_id: Uuid,
}

// =============================================================================
// VALIDATION / SLUGS
// =============================================================================

/// Trimmed organization name, at least three characters.
///
/// # Errors
///
/// `VALIDATION_ERROR` when the trimmed name is too short.
pub fn validate_org_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(AppError::validation("organization name must be at least 3 characters"));
    }
    Ok(name.to_owned())
}

/// Lowercase the name and replace every char outside `[a-z0-9]` with `-`.
#[must_use]
pub fn slug_base(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect()
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SLUG_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect()
}

/// `slug_base(name)` plus `-` and a random base-36 suffix. Uniqueness is left
/// to the provider's unique index.
#[must_use]
pub fn make_slug(name: &str) -> String {
    format!("{}-{}", slug_base(name), random_suffix())
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Create an organization and make the caller its owner.
///
/// The organization row is not rolled back if the membership insert fails.
///
/// # Errors
///
/// `VALIDATION_ERROR` for a bad name, `INTERNAL_ERROR` if either insert fails.
pub async fn create_organization(
    backend: &dyn Backend,
    session: &UserSession,
    name: &str,
) -> Result<OrganizationRow, AppError> {
    let name = validate_org_name(name)?;
    let new_org = NewOrganization { slug: make_slug(&name), name, owner_id: session.user.id };

    let row = backend
        .insert_organization(&session.access_token, &new_org)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %session.user.id, "organization insert failed");
            AppError::internal("failed to create organization")
        })?;

    let membership = NewMembership { org_id: row.id, user_id: session.user.id, role: MembershipRole::Owner };
    backend
        .insert_membership(&session.access_token, &membership)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, org_id = %row.id, user_id = %session.user.id, "owner membership insert failed");
            AppError::internal("failed to create organization membership")
        })?;

    tracing::info!(
        org_id = %row.id,
        slug = %row.slug,
        user_id = %session.user.id,
        role = membership.role.as_str(),
        "organization created"
    );
    Ok(row)
}

/// Organizations the caller belongs to, ordered by name. Provider failures
/// yield an empty list.
pub async fn list_user_organizations(backend: &dyn Backend, session: &UserSession) -> Vec<Organization> {
    match backend
        .list_organizations(&session.access_token, session.user.id)
        .await
    {
        Ok(orgs) => orgs,
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, "organization list failed");
            Vec::new()
        }
    }
}

/// Organization by id. Provider failures are logged and read as absent, as
/// are rows hidden by row-level policy.
pub async fn get_organization(backend: &dyn Backend, session: &UserSession, org_id: Uuid) -> Option<OrganizationRow> {
    match backend.get_organization(&session.access_token, org_id).await {
        Ok(row) => row,
        Err(e) => {
            tracing::error!(error = %e, %org_id, "organization lookup failed");
            None
        }
    }
}

/// Confirm the caller is a member of `org_id` before it becomes the active
/// organization. Returns the id to store in the pointer cookie.
///
/// # Errors
///
/// `FORBIDDEN` when the caller is not a member, `INTERNAL_ERROR` when the
/// membership list cannot be read.
pub async fn switch_organization(backend: &dyn Backend, session: &UserSession, org_id: Uuid) -> Result<Uuid, AppError> {
    let orgs = backend
        .list_organizations(&session.access_token, session.user.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %session.user.id, "membership check failed");
            AppError::internal("failed to verify membership")
        })?;

    if !orgs.iter().any(|org| org.id == org_id) {
        tracing::warn!(%org_id, user_id = %session.user.id, "switch to non-member organization refused");
        return Err(AppError::forbidden("not a member of this organization"));
    }

    tracing::info!(%org_id, user_id = %session.user.id, "active organization switched");
    Ok(org_id)
}

#[cfg(test)]
#[path = "organization_test.rs"]
mod tests;
