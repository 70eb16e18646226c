use chrono::Utc;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;
use crate::jwt::SigningAlgorithm;
use crate::jwt::TokenKind;

/// Resource-server side access token check.
///
/// Holds only the verify key, so it can read the claim set of an access token
/// but cannot mint one.
#[derive(Debug)]
pub struct TokenVerifier {
    handler: JwtHandler,
}

impl TokenVerifier {
    pub fn new(algorithm: SigningAlgorithm, verify_key: &[u8]) -> Result<Self, JwtError> {
        Ok(Self {
            handler: JwtHandler::verifier(algorithm, verify_key)?,
        })
    }

    /// Verify an access token and return its claims.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not verify
    /// * `TokenExpired` - Token window has elapsed
    /// * `Malformed` - Token cannot be decoded or is not an access token
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let claims: SessionClaims = self.handler.decode(token)?;

        if claims.typ != TokenKind::Access {
            return Err(JwtError::Malformed(format!(
                "Expected access token, got {}",
                claims.typ
            )));
        }
        if claims.is_expired(Utc::now().timestamp_millis()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}
