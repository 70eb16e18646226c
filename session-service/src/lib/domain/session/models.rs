use std::fmt;

use auth::ExtraInfo;
use auth::SessionClaims;
use auth::TokenKind;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use uuid::Uuid;

use crate::account::models::AccountId;
use crate::session::errors::AuthError;
use crate::session::errors::IdentifierError;

/// Session identifier minted at login and kept across refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdentifierError> {
        Uuid::parse_str(s)
            .map(SessionId)
            .map_err(|e| IdentifierError::InvalidFormat(e.to_string()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Login context a verification code is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChallengeId(pub Uuid);

impl ChallengeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdentifierError> {
        Uuid::parse_str(s)
            .map(ChallengeId)
            .map_err(|e| IdentifierError::InvalidFormat(e.to_string()))
    }
}

impl Default for ChallengeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outstanding human-verification challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub id: ChallengeId,
    /// Text of the puzzle, e.g. `7 + 3 = ?`
    pub prompt: String,
    pub expires_in_seconds: u64,
}

/// Claim set of an issued session.
///
/// Never mutated once issued; a refresh yields a new value with a new window and
/// the same `session_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaim {
    pub account_id: AccountId,
    pub username: String,
    pub roles: Vec<String>,
    pub session_id: SessionId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub extra: ExtraInfo,
}

impl SessionClaim {
    /// Wire form of this claim for the given token class.
    pub fn to_wire(&self, kind: TokenKind) -> SessionClaims {
        SessionClaims::new(
            self.account_id,
            &self.username,
            self.roles.clone(),
            self.session_id,
            kind,
            self.issued_at,
            self.expires_at,
        )
        .with_extra(self.extra.clone())
    }
}

impl TryFrom<SessionClaims> for SessionClaim {
    type Error = AuthError;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        let account_id = AccountId::from_string(&claims.sub).map_err(|_| AuthError::Malformed)?;
        let session_id = SessionId::from_string(&claims.sid).map_err(|_| AuthError::Malformed)?;
        let issued_at = millis_to_datetime(claims.login_time)?;
        let expires_at = millis_to_datetime(claims.expire_time)?;

        Ok(Self {
            account_id,
            username: claims.username,
            roles: claims.roles,
            session_id,
            issued_at,
            expires_at,
            extra: claims.extra,
        })
    }
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, AuthError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(AuthError::Malformed)
}

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Credentials and verification answer submitted for a login.
#[derive(Debug)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
    pub challenge_id: ChallengeId,
    pub code: String,
}

impl LoginCommand {
    pub fn new(username: String, password: String, challenge_id: ChallengeId, code: String) -> Self {
        Self {
            username,
            password,
            challenge_id,
            code,
        }
    }
}

/// Steps of a login attempt, used to tag rejections in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    AwaitingCode,
    AwaitingCredentials,
    SessionGuard,
    Issuing,
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            LoginStage::AwaitingCode => "awaiting_code",
            LoginStage::AwaitingCredentials => "awaiting_credentials",
            LoginStage::SessionGuard => "session_guard",
            LoginStage::Issuing => "issuing",
        };
        f.write_str(stage)
    }
}
