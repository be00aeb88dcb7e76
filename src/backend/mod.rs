//! Backend: HTTP adapter for the hosted auth / data / storage provider.
//!
//! DESIGN
//! ======
//! `SupabaseClient` owns one pooled `reqwest::Client` and speaks to three
//! provider surfaces: `/auth/v1` (GoTrue), `/rest/v1` (PostgREST) and
//! `/storage/v1`. Each surface lives in its own file with pure parsing
//! functions for testability. Callers only see the [`Backend`] trait, so the
//! gate and the services run unchanged against the in-memory test double.
//!
//! Every request carries the publishable key as `apikey`; the bearer is the
//! caller's access token when one exists (so row-level authorization applies)
//! and the publishable key otherwise.

pub mod auth;
#[cfg(test)]
pub mod mock;
pub mod rest;
pub mod storage;
pub mod types;

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use uuid::Uuid;

use crate::config::BackendConfig;
pub use types::{
    AuthIdentity, AuthSession, Backend, BackendError, MembershipRole, NewMembership, NewOrganization, Organization,
    OrganizationRow, Profile, ProfileUpdate, SessionTokens,
};

// =============================================================================
// CLIENT
// =============================================================================

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.url.clone(), api_key: config.key.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: &str, bearer: Option<&str>) -> RequestBuilder {
        let bearer = bearer.unwrap_or(&self.api_key);
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }
}

/// Send a request and return `(status, body)` without judging the status.
async fn send(builder: RequestBuilder) -> Result<(u16, String), BackendError> {
    let response = builder
        .send()
        .await
        .map_err(|e| BackendError::Request(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::Request(e.to_string()))?;
    Ok((status, text))
}

fn ensure_success(status: u16, body: String) -> Result<String, BackendError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(BackendError::Response { status, body })
    }
}

// =============================================================================
// TRAIT IMPL
// =============================================================================

#[async_trait::async_trait]
impl Backend for SupabaseClient {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthIdentity>, BackendError> {
        self.fetch_user(access_token).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Option<AuthSession>, BackendError> {
        self.refresh_token_grant(refresh_token).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        self.password_grant(email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<(), BackendError> {
        self.signup(email, password, full_name).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.logout(access_token).await
    }

    async fn first_membership(&self, access_token: &str, user_id: Uuid) -> Result<Option<Uuid>, BackendError> {
        self.select_first_membership(access_token, user_id).await
    }

    async fn list_organizations(&self, access_token: &str, user_id: Uuid) -> Result<Vec<Organization>, BackendError> {
        self.select_organizations(access_token, user_id).await
    }

    async fn insert_organization(
        &self,
        access_token: &str,
        org: &NewOrganization,
    ) -> Result<OrganizationRow, BackendError> {
        self.insert_organization_row(access_token, org).await
    }

    async fn insert_membership(&self, access_token: &str, membership: &NewMembership) -> Result<(), BackendError> {
        self.insert_membership_row(access_token, membership).await
    }

    async fn get_organization(&self, access_token: &str, org_id: Uuid) -> Result<Option<OrganizationRow>, BackendError> {
        self.select_organization(access_token, org_id).await
    }

    async fn get_profile(&self, access_token: &str, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        self.select_profile(access_token, user_id).await
    }

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError> {
        self.patch_profile(access_token, user_id, update).await
    }

    async fn upload_object(
        &self,
        access_token: &str,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        self.put_object(access_token, bucket, name, bytes, content_type)
            .await
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        storage::public_object_url(&self.base_url, bucket, name)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
