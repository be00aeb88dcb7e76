//! Profile service: read/update the caller's profile and upload avatars.

use rand::Rng;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::backend::{Backend, Profile, ProfileUpdate};
use crate::error::AppError;
use crate::session::UserSession;

pub const AVATAR_BUCKET: &str = "avatars";

const MIN_FULL_NAME_LEN: usize = 2;
const DEFAULT_AVATAR_EXT: &str = "bin";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Validate input into a partial update. The avatar change is `None` when the
/// field is absent, `Some(None)` for an empty string (remove the avatar), and
/// `Some(Some(url))` otherwise.
///
/// # Errors
///
/// `VALIDATION_ERROR` for a short name or a non-absolute avatar URL.
pub fn validate_profile(input: &ProfileInput) -> Result<(String, Option<Option<String>>), AppError> {
    let full_name = input.full_name.trim();
    if full_name.chars().count() < MIN_FULL_NAME_LEN {
        return Err(AppError::validation("name is too short"));
    }

    let avatar_url = match input.avatar_url.as_deref().map(str::trim) {
        None => None,
        Some("") => Some(None),
        Some(url) => {
            reqwest::Url::parse(url).map_err(|_| AppError::validation("avatar URL must be an absolute URL"))?;
            Some(Some(url.to_owned()))
        }
    };

    Ok((full_name.to_owned(), avatar_url))
}

fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        tracing::error!(error = %e, "timestamp formatting failed");
        AppError::internal("failed to update profile")
    })
}

/// # Errors
///
/// `NOT_FOUND` when the provider has no profile row, `INTERNAL_ERROR` when
/// the lookup fails.
pub async fn get_current_profile(backend: &dyn Backend, session: &UserSession) -> Result<Profile, AppError> {
    match backend
        .get_profile(&session.access_token, session.user.id)
        .await
    {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => Err(AppError::not_found("profile not found")),
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, "profile lookup failed");
            Err(AppError::internal("failed to load profile"))
        }
    }
}

/// Apply a validated update and stamp `updated_at`.
///
/// # Errors
///
/// `VALIDATION_ERROR` for bad input, `INTERNAL_ERROR` when the write fails.
pub async fn update_profile(
    backend: &dyn Backend,
    session: &UserSession,
    input: &ProfileInput,
) -> Result<Profile, AppError> {
    let (full_name, avatar_url) = validate_profile(input)?;
    let update = ProfileUpdate { full_name: Some(full_name), avatar_url, updated_at: now_rfc3339()? };
    write_profile(backend, session, &update).await
}

async fn write_profile(backend: &dyn Backend, session: &UserSession, update: &ProfileUpdate) -> Result<Profile, AppError> {
    match backend
        .update_profile(&session.access_token, session.user.id, update)
        .await
    {
        Ok(profile) => {
            tracing::info!(user_id = %session.user.id, "profile updated");
            Ok(profile)
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, "profile update failed");
            Err(AppError::internal("failed to update profile"))
        }
    }
}

/// `{user_id}-{random}.{ext}`, extension taken from the uploaded file name.
#[must_use]
pub fn avatar_object_name(session: &UserSession, file_name: Option<&str>) -> String {
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_AVATAR_EXT.to_owned());
    let random: u64 = rand::rng().random();
    format!("{}-{random:x}.{ext}", session.user.id)
}

/// Store the image in the public avatars bucket and point the profile at it.
/// Returns the public URL.
///
/// # Errors
///
/// `VALIDATION_ERROR` for an empty file, `INTERNAL_ERROR` when the upload or
/// the profile write fails.
pub async fn upload_avatar(backend: &dyn Backend, session: &UserSession, upload: AvatarUpload) -> Result<String, AppError> {
    if upload.bytes.is_empty() {
        return Err(AppError::validation("avatar file is empty"));
    }

    let name = avatar_object_name(session, upload.file_name.as_deref());
    let content_type = upload
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_owned());
    let size = upload.bytes.len();

    backend
        .upload_object(&session.access_token, AVATAR_BUCKET, &name, upload.bytes, &content_type)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, object = %name, "avatar upload failed");
            AppError::internal("failed to upload avatar")
        })?;
    tracing::info!(object = %name, size, "avatar uploaded");

    let url = backend.public_url(AVATAR_BUCKET, &name);
    let update = ProfileUpdate { full_name: None, avatar_url: Some(Some(url.clone())), updated_at: now_rfc3339()? };
    write_profile(backend, session, &update).await?;
    Ok(url)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
