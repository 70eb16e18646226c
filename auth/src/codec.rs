use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;
use crate::jwt::TokenKind;

/// Codec construction errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Refresh TTL ({refresh}s) must exceed access TTL ({access}s)")]
    InvalidTtl { access: i64, refresh: i64 },

    #[error("Access TTL must be positive, got {0}ms")]
    NonPositiveTtl(i64),

    #[error("Token lifetime is too large to represent")]
    TtlOutOfRange,

    #[error("Access and refresh handlers must both be able to sign")]
    MissingSigningKey,
}

/// Signing handler and lifetime for one token class.
#[derive(Debug)]
pub struct TokenPolicy {
    handler: JwtHandler,
    ttl: Duration,
}

impl TokenPolicy {
    pub fn new(handler: JwtHandler, ttl: Duration) -> Self {
        Self { handler, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Issues and parses access/refresh tokens.
///
/// Access and refresh tokens are signed with separate keys and carry a type
/// discriminator, so one class can never be presented as the other.
#[derive(Debug)]
pub struct TokenCodec {
    access: TokenPolicy,
    refresh: TokenPolicy,
    issuer: Option<String>,
}

impl TokenCodec {
    /// Create a codec.
    ///
    /// # Errors
    /// * `NonPositiveTtl` - Access lifetime is zero or negative
    /// * `InvalidTtl` - Refresh lifetime does not exceed access lifetime
    /// * `TtlOutOfRange` - A window opened now would end past the representable range
    /// * `MissingSigningKey` - A verify-only handler was supplied
    pub fn new(access: TokenPolicy, refresh: TokenPolicy) -> Result<Self, CodecError> {
        if access.ttl <= Duration::zero() {
            return Err(CodecError::NonPositiveTtl(access.ttl.num_milliseconds()));
        }
        if refresh.ttl <= access.ttl {
            return Err(CodecError::InvalidTtl {
                access: access.ttl.num_seconds(),
                refresh: refresh.ttl.num_seconds(),
            });
        }
        if Utc::now().checked_add_signed(refresh.ttl).is_none() {
            return Err(CodecError::TtlOutOfRange);
        }
        if !access.handler.can_sign() || !refresh.handler.can_sign() {
            return Err(CodecError::MissingSigningKey);
        }

        Ok(Self {
            access,
            refresh,
            issuer: None,
        })
    }

    /// Set the issuer stamped into every token.
    pub fn with_issuer(mut self, issuer: impl ToString) -> Self {
        self.issuer = Some(issuer.to_string());
        self
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        self.policy(kind).ttl
    }

    /// Re-window claims for a token class starting at `start`.
    ///
    /// The window end saturates at the latest representable instant.
    pub fn stamp(
        &self,
        mut claims: SessionClaims,
        kind: TokenKind,
        start: DateTime<Utc>,
    ) -> SessionClaims {
        let expires_at = start
            .checked_add_signed(self.policy(kind).ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let expire_time = expires_at.timestamp_millis();

        claims.typ = kind;
        claims.iat = start.timestamp();
        claims.login_time = start.timestamp_millis();
        claims.expire_time = expire_time;
        claims.exp = (expire_time + 999).div_euclid(1000);
        if claims.iss.is_none() {
            claims.iss = self.issuer.clone();
        }
        claims
    }

    /// Sign claims as the given token class.
    ///
    /// The validity window already on the claims is kept as is.
    pub fn issue(&self, mut claims: SessionClaims, kind: TokenKind) -> Result<String, JwtError> {
        claims.typ = kind;
        self.policy(kind).handler.encode(&claims)
    }

    /// Verify and decode a token of the given class.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not verify with this class's key
    /// * `TokenExpired` - Token window has elapsed
    /// * `Malformed` - Token cannot be decoded or carries the wrong type
    pub fn parse(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, JwtError> {
        let claims: SessionClaims = match self.policy(kind).handler.decode(token) {
            Ok(claims) => claims,
            Err(JwtError::InvalidSignature) if self.signed_as(token, kind.counterpart()) => {
                return Err(JwtError::Malformed(format!(
                    "Expected {} token, got {}",
                    kind,
                    kind.counterpart()
                )));
            }
            Err(e) => return Err(e),
        };

        if claims.typ != kind {
            return Err(JwtError::Malformed(format!(
                "Expected {} token, got {}",
                kind, claims.typ
            )));
        }
        if claims.is_expired(Utc::now().timestamp_millis()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }

    /// Build a refresh token from a valid access token.
    ///
    /// The refresh window opens at the access token's issue time, so both tokens of
    /// a pair share a start and differ only in lifetime and type.
    pub fn derive_refresh(&self, access_token: &str) -> Result<String, JwtError> {
        let claims = self.parse(access_token, TokenKind::Access)?;
        let start = Utc
            .timestamp_millis_opt(claims.login_time)
            .single()
            .ok_or_else(|| JwtError::Malformed("Invalid login_time".to_string()))?;

        let claims = self.stamp(claims, TokenKind::Refresh, start);
        self.issue(claims, TokenKind::Refresh)
    }

    /// Mint a fresh access token from (already verified) claims, windowed from now.
    ///
    /// The new window opens at least one millisecond after the claims' start, so a
    /// reissue within the same millisecond as login still ends strictly later.
    pub fn reissue_access(&self, claims: SessionClaims) -> Result<String, JwtError> {
        let earliest = Utc
            .timestamp_millis_opt(claims.login_time.saturating_add(1))
            .single()
            .ok_or_else(|| JwtError::Malformed("Invalid login_time".to_string()))?;
        let claims = self.stamp(claims, TokenKind::Access, Utc::now().max(earliest));
        self.issue(claims, TokenKind::Access)
    }

    /// Whether the other class's key verifies the token, expired or not.
    fn signed_as(&self, token: &str, kind: TokenKind) -> bool {
        matches!(
            self.policy(kind).handler.decode::<SessionClaims>(token),
            Ok(_) | Err(JwtError::TokenExpired)
        )
    }

    fn policy(&self, kind: TokenKind) -> &TokenPolicy {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}
