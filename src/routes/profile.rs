//! Profile routes.

use axum::extract::Multipart;
use axum::response::Json;
use serde_json::json;

use super::auth::AuthUser;
use super::extract::ApiJson;
use crate::backend::Profile;
use crate::error::AppError;
use crate::services::profile as profile_svc;

const AVATAR_FIELD: &str = "file";

/// `GET /api/profile`
pub async fn get_profile(auth: AuthUser) -> Result<Json<Profile>, AppError> {
    profile_svc::get_current_profile(auth.backend.as_ref(), &auth.session)
        .await
        .map(Json)
}

/// `PATCH /api/profile`: JSON `{ fullName, avatarUrl? }`.
pub async fn update_profile(
    auth: AuthUser,
    ApiJson(input): ApiJson<profile_svc::ProfileInput>,
) -> Result<Json<Profile>, AppError> {
    profile_svc::update_profile(auth.backend.as_ref(), &auth.session, &input)
        .await
        .map(Json)
}

/// `POST /api/profile/avatar`: multipart form with a `file` part.
pub async fn upload_avatar(auth: AuthUser, mut multipart: Multipart) -> Result<Json<serde_json::Value>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("failed to read upload: {e}")))?;
        upload = Some(profile_svc::AvatarUpload { file_name, content_type, bytes: bytes.to_vec() });
        break;
    }

    let upload = upload.ok_or_else(|| AppError::validation("missing `file` field"))?;
    let url = profile_svc::upload_avatar(auth.backend.as_ref(), &auth.session, upload).await?;
    Ok(Json(json!({ "avatarUrl": url })))
}
