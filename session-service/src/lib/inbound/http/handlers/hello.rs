use auth::ExtraInfo;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedSession;

/// Protected resource echoing the caller's session.
pub async fn hello(
    Extension(session): Extension<AuthenticatedSession>,
) -> Result<ApiSuccess<HelloResponseData>, ApiError> {
    Ok(ApiSuccess::new(
        StatusCode::OK,
        HelloResponseData {
            message: format!("Hello, {}", session.username),
            account_id: session.account_id.to_string(),
            session_id: session.session_id.to_string(),
            roles: session.roles,
            extra: session.extra,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelloResponseData {
    pub message: String,
    pub account_id: String,
    pub session_id: String,
    pub roles: Vec<String>,
    pub extra: ExtraInfo,
}
