use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::session::models::Challenge;
use crate::session::ports::SessionServicePort;

pub async fn issue_challenge<S: SessionServicePort>(
    State(state): State<AppState<S>>,
) -> Result<ApiSuccess<ChallengeResponseData>, ApiError> {
    state
        .session_service
        .issue_challenge()
        .await
        .map_err(ApiError::from)
        .map(|ref challenge| ApiSuccess::new(StatusCode::OK, challenge.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeResponseData {
    pub challenge_id: String,
    pub prompt: String,
    pub expires_in_seconds: u64,
}

impl From<&Challenge> for ChallengeResponseData {
    fn from(challenge: &Challenge) -> Self {
        Self {
            challenge_id: challenge.id.to_string(),
            prompt: challenge.prompt.clone(),
            expires_in_seconds: challenge.expires_in_seconds,
        }
    }
}
