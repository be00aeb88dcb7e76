use super::*;

#[test]
fn codes_map_to_default_statuses() {
    assert_eq!(AppError::not_found("x").status, StatusCode::NOT_FOUND);
    assert_eq!(AppError::unauthorized("x").status, StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::forbidden("x").status, StatusCode::FORBIDDEN);
    assert_eq!(AppError::validation("x").status, StatusCode::BAD_REQUEST);
    assert_eq!(AppError::internal("x").status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn code_strings_match_serde_names() {
    for code in [
        ErrorCode::NotFound,
        ErrorCode::Unauthorized,
        ErrorCode::Forbidden,
        ErrorCode::ValidationError,
        ErrorCode::InternalError,
    ] {
        let json = serde_json::to_value(code).unwrap();
        assert_eq!(json, serde_json::Value::String(code.as_str().to_owned()));
    }
}

#[test]
fn to_response_carries_triple() {
    let body = AppError::validation("name too short").to_response();
    assert_eq!(body.message, "name too short");
    assert_eq!(body.code, ErrorCode::ValidationError);
    assert_eq!(body.status, 400);
}

#[test]
fn backend_unavailable_is_internal_with_503() {
    let err = AppError::backend_unavailable();
    assert_eq!(err.code, ErrorCode::InternalError);
    assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn into_response_renders_json_body() {
    use http_body_util::BodyExt;

    let resp = AppError::forbidden("not a member").into_response();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "not a member");
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(body["status"], 403);
}

#[test]
fn display_leads_with_code() {
    assert_eq!(AppError::not_found("no such org").to_string(), "NOT_FOUND: no such org");
}
