use auth::ExtraInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

use super::handlers::ApiError;
use super::handlers::ApiResponseBody;
use crate::account::models::AccountId;
use crate::inbound::http::router::AppState;
use crate::session::models::SessionClaim;
use crate::session::models::SessionId;
use crate::session::ports::SessionServicePort;

/// Extension type carrying the caller's verified session in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub account_id: AccountId,
    pub username: String,
    pub roles: Vec<String>,
    pub session_id: SessionId,
    pub extra: ExtraInfo,
}

impl From<SessionClaim> for AuthenticatedSession {
    fn from(claim: SessionClaim) -> Self {
        Self {
            account_id: claim.account_id,
            username: claim.username,
            roles: claim.roles,
            session_id: claim.session_id,
            extra: claim.extra,
        }
    }
}

/// Middleware that checks the bearer access token, including session staleness,
/// and adds the session to request extensions
pub async fn authenticate<S: SessionServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?.to_string();

    let claim = state.session_service.authorize(&token).await.map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        ApiError::from(e).into_response()
    })?;

    req.extensions_mut()
        .insert(AuthenticatedSession::from(claim));

    Ok(next.run(req).await)
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponseBody::new_error(
            StatusCode::UNAUTHORIZED,
            message.to_string(),
        )),
    )
        .into_response()
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization header format. Expected: Bearer <token>"))
}
