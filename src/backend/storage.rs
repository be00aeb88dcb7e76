//! Storage API: object upload and public URLs.

use reqwest::Method;

use super::types::BackendError;
use super::{SupabaseClient, ensure_success, send};

const OBJECT_CACHE_CONTROL: &str = "max-age=3600";

impl SupabaseClient {
    pub(super) async fn put_object(
        &self,
        access_token: &str,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let url = format!("{}/storage/v1/object/{bucket}/{name}", self.base_url);
        let builder = self
            .request(Method::POST, &url, Some(access_token))
            .header("x-upsert", "true")
            .header("cache-control", OBJECT_CACHE_CONTROL)
            .header("content-type", content_type)
            .body(bytes);
        let (status, body) = send(builder).await?;
        ensure_success(status, body).map(|_| ())
    }
}

#[must_use]
pub fn public_object_url(base_url: &str, bucket: &str, name: &str) -> String {
    format!("{base_url}/storage/v1/object/public/{bucket}/{name}")
}
