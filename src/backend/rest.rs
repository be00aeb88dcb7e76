//! PostgREST data API: memberships, organizations, profiles.
//!
//! Row-level authorization is enforced by the provider: every call carries
//! the caller's access token, so the filters here narrow results but never
//! widen them.

use reqwest::Method;
use serde::Deserialize;
use uuid::Uuid;

use super::types::{
    BackendError, MembershipRole, NewMembership, NewOrganization, Organization, OrganizationRow, Profile, ProfileUpdate,
};
use super::{SupabaseClient, ensure_success, send};

/// Organizations joined to the caller's membership role. `!inner` drops
/// organizations with no matching membership row.
const ORGANIZATION_WITH_ROLE_SELECT: &str = "id,name,slug,avatar_url,memberships!inner(role)";

impl SupabaseClient {
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    pub(super) async fn select_first_membership(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, BackendError> {
        let builder = self
            .request(Method::GET, &self.rest_url("memberships"), Some(access_token))
            .query(&[
                ("select", "org_id".to_owned()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.asc,org_id.asc".to_owned()),
                ("limit", "1".to_owned()),
            ]);
        let (status, body) = send(builder).await?;
        parse_first_membership(&ensure_success(status, body)?)
    }

    pub(super) async fn select_organizations(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Vec<Organization>, BackendError> {
        let builder = self
            .request(Method::GET, &self.rest_url("organizations"), Some(access_token))
            .query(&[
                ("select", ORGANIZATION_WITH_ROLE_SELECT.to_owned()),
                ("memberships.user_id", format!("eq.{user_id}")),
                ("order", "name.asc".to_owned()),
            ]);
        let (status, body) = send(builder).await?;
        parse_organizations(&ensure_success(status, body)?)
    }

    pub(super) async fn insert_organization_row(
        &self,
        access_token: &str,
        org: &NewOrganization,
    ) -> Result<OrganizationRow, BackendError> {
        let builder = self
            .request(Method::POST, &self.rest_url("organizations"), Some(access_token))
            .header("Prefer", "return=representation")
            .json(org);
        let (status, body) = send(builder).await?;
        first_row(&ensure_success(status, body)?)
    }

    pub(super) async fn insert_membership_row(
        &self,
        access_token: &str,
        membership: &NewMembership,
    ) -> Result<(), BackendError> {
        let builder = self
            .request(Method::POST, &self.rest_url("memberships"), Some(access_token))
            .header("Prefer", "return=minimal")
            .json(membership);
        let (status, body) = send(builder).await?;
        ensure_success(status, body).map(|_| ())
    }

    pub(super) async fn select_organization(
        &self,
        access_token: &str,
        org_id: Uuid,
    ) -> Result<Option<OrganizationRow>, BackendError> {
        let builder = self
            .request(Method::GET, &self.rest_url("organizations"), Some(access_token))
            .query(&[("select", "*".to_owned()), ("id", format!("eq.{org_id}")), ("limit", "1".to_owned())]);
        let (status, body) = send(builder).await?;
        optional_row(&ensure_success(status, body)?)
    }

    pub(super) async fn select_profile(&self, access_token: &str, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        let builder = self
            .request(Method::GET, &self.rest_url("profiles"), Some(access_token))
            .query(&[("select", "*".to_owned()), ("id", format!("eq.{user_id}")), ("limit", "1".to_owned())]);
        let (status, body) = send(builder).await?;
        optional_row(&ensure_success(status, body)?)
    }

    pub(super) async fn patch_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError> {
        let builder = self
            .request(Method::PATCH, &self.rest_url("profiles"), Some(access_token))
            .query(&[("id", format!("eq.{user_id}"))])
            .header("Prefer", "return=representation")
            .json(update);
        let (status, body) = send(builder).await?;
        first_row(&ensure_success(status, body)?)
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
struct MembershipOrgRow {
    org_id: Uuid,
}

#[derive(Deserialize)]
struct MembershipRoleRow {
    role: MembershipRole,
}

#[derive(Deserialize)]
struct OrganizationWithMemberships {
    id: Uuid,
    name: String,
    slug: String,
    #[serde(default)]
    avatar_url: Option<String>,
    memberships: Vec<MembershipRoleRow>,
}

fn parse_rows<T: serde::de::DeserializeOwned>(json: &str) -> Result<Vec<T>, BackendError> {
    serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))
}

pub(crate) fn optional_row<T: serde::de::DeserializeOwned>(json: &str) -> Result<Option<T>, BackendError> {
    Ok(parse_rows(json)?.into_iter().next())
}

pub(crate) fn first_row<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, BackendError> {
    optional_row(json)?.ok_or_else(|| BackendError::Parse("no rows returned".into()))
}

pub(crate) fn parse_first_membership(json: &str) -> Result<Option<Uuid>, BackendError> {
    Ok(optional_row::<MembershipOrgRow>(json)?.map(|row| row.org_id))
}

pub(crate) fn parse_organizations(json: &str) -> Result<Vec<Organization>, BackendError> {
    let rows: Vec<OrganizationWithMemberships> = parse_rows(json)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let role = row.memberships.first()?.role;
            Some(Organization { id: row.id, name: row.name, slug: row.slug, avatar_url: row.avatar_url, role })
        })
        .collect())
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
