use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::extra::ExtraInfo;

/// Type discriminator embedded in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// The other token class.
    pub fn counterpart(self) -> Self {
        match self {
            TokenKind::Access => TokenKind::Refresh,
            TokenKind::Refresh => TokenKind::Access,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claim set signed into access and refresh tokens.
///
/// `iat`/`exp` are the standard second-precision JWT claims checked by the
/// decoder. `login_time`/`expire_time` carry the same window in milliseconds so
/// two windows opened within the same second still compare correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (account identifier)
    pub sub: String,

    pub username: String,

    #[serde(default)]
    pub roles: Vec<String>,

    /// Session identifier, stable across refreshes
    pub sid: String,

    pub typ: TokenKind,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Issued at (Unix timestamp, milliseconds)
    pub login_time: i64,

    /// Expiration time (Unix timestamp, milliseconds)
    pub expire_time: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "ExtraInfo::is_empty")]
    pub extra: ExtraInfo,
}

impl SessionClaims {
    /// Build wire claims for a validity window.
    ///
    /// `exp` is rounded up to the next whole second so the standard claim never
    /// expires before the millisecond window does.
    pub fn new(
        subject: impl ToString,
        username: impl ToString,
        roles: Vec<String>,
        session_id: impl ToString,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let expire_time = expires_at.timestamp_millis();
        Self {
            sub: subject.to_string(),
            username: username.to_string(),
            roles,
            sid: session_id.to_string(),
            typ: kind,
            iat: issued_at.timestamp(),
            exp: (expire_time + 999).div_euclid(1000),
            login_time: issued_at.timestamp_millis(),
            expire_time,
            iss: None,
            extra: ExtraInfo::new(),
        }
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl ToString) -> Self {
        self.iss = Some(iss.to_string());
        self
    }

    /// Attach extra information.
    pub fn with_extra(mut self, extra: ExtraInfo) -> Self {
        self.extra = extra;
        self
    }

    /// Check if the millisecond window has elapsed.
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expire_time <= now_millis
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;

    use super::*;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let issued = Utc.timestamp_millis_opt(1_700_000_000_250).unwrap();
        (issued, issued + Duration::seconds(30))
    }

    #[test]
    fn test_new_claims() {
        let (issued, expires) = window();
        let claims = SessionClaims::new(
            "acc-1",
            "alice",
            vec!["ROLE_USER".to_string()],
            "sid-1",
            TokenKind::Access,
            issued,
            expires,
        );

        assert_eq!(claims.sub, "acc-1");
        assert_eq!(claims.sid, "sid-1");
        assert_eq!(claims.login_time, 1_700_000_000_250);
        assert_eq!(claims.expire_time, 1_700_000_030_250);
        assert_eq!(claims.iat, 1_700_000_000);
        // Rounded up so the standard claim outlives the millisecond window
        assert_eq!(claims.exp, 1_700_000_031);
    }

    #[test]
    fn test_is_expired() {
        let (issued, expires) = window();
        let claims = SessionClaims::new(
            "acc-1",
            "alice",
            vec![],
            "sid-1",
            TokenKind::Refresh,
            issued,
            expires,
        );

        assert!(!claims.is_expired(1_700_000_030_249));
        assert!(claims.is_expired(1_700_000_030_250));
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Refresh).unwrap(),
            "\"refresh\""
        );
        assert_eq!(TokenKind::Access.to_string(), "access");
    }
}
