//! Backend types: provider-neutral identities, rows, and errors.
//!
//! These mirror what the hosted auth / data / storage APIs return. Rows keep
//! the provider's snake_case column names so they deserialize without renames.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend client operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request to the provider failed.
    #[error("backend request failed: {0}")]
    Request(String),

    /// The provider returned a non-success HTTP status.
    #[error("backend response error: status {status}")]
    Response { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("backend response parse failed: {0}")]
    Parse(String),

    /// The provider refused the credentials or the sign-up.
    #[error("rejected by provider: {0}")]
    Rejected(String),
}

// =============================================================================
// AUTH
// =============================================================================

/// Identity resolved from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token pair issued by the provider's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// A fresh session: tokens plus the user they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub tokens: SessionTokens,
    pub user: AuthIdentity,
}

// =============================================================================
// ORGANIZATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    Owner,
    Admin,
    Member,
}

impl MembershipRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

/// A row of the `organizations` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

/// An organization as seen by one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub avatar_url: Option<String>,
    pub role: MembershipRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrganization {
    pub name: String,
    pub slug: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMembership {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
}

// =============================================================================
// PROFILES
// =============================================================================

/// A row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Partial profile update. Absent fields are left untouched;
/// `avatar_url: Some(None)` writes `null` and removes the avatar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<Option<String>>,
    pub updated_at: String,
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Provider-neutral async trait for the hosted auth + data + storage service.
/// Held as `Arc<dyn Backend>` so handlers and the gate can be tested against
/// an in-memory implementation.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Resolve the user behind an access token. `Ok(None)` when the provider
    /// rejects the token.
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthIdentity>, BackendError>;

    /// Exchange a refresh token for a new session. `Ok(None)` when the
    /// provider rejects the refresh token.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Option<AuthSession>, BackendError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    /// Register a user. `full_name` travels as user metadata; the provider
    /// creates the profile row from it.
    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<(), BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// The organization of the user's earliest membership, if any.
    async fn first_membership(&self, access_token: &str, user_id: Uuid) -> Result<Option<Uuid>, BackendError>;

    /// Organizations the user is a member of, ordered by name.
    async fn list_organizations(&self, access_token: &str, user_id: Uuid) -> Result<Vec<Organization>, BackendError>;

    async fn insert_organization(
        &self,
        access_token: &str,
        org: &NewOrganization,
    ) -> Result<OrganizationRow, BackendError>;

    async fn insert_membership(&self, access_token: &str, membership: &NewMembership) -> Result<(), BackendError>;

    async fn get_organization(&self, access_token: &str, org_id: Uuid) -> Result<Option<OrganizationRow>, BackendError>;

    async fn get_profile(&self, access_token: &str, user_id: Uuid) -> Result<Option<Profile>, BackendError>;

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError>;

    /// Upload (upsert) an object into a storage bucket.
    async fn upload_object(
        &self,
        access_token: &str,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError>;

    /// Public URL of an object in a public bucket.
    fn public_url(&self, bucket: &str, name: &str) -> String;
}
