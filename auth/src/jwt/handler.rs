use std::fmt;
use std::str::FromStr;

use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Signing algorithms accepted from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SigningAlgorithm {
    HS256,
    RS256,
}

impl FromStr for SigningAlgorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(SigningAlgorithm::HS256),
            "RS256" => Ok(SigningAlgorithm::RS256),
            other => Err(JwtError::InvalidKey(format!(
                "Unsupported algorithm: {}",
                other
            ))),
        }
    }
}

impl From<SigningAlgorithm> for Algorithm {
    fn from(algorithm: SigningAlgorithm) -> Self {
        match algorithm {
            SigningAlgorithm::HS256 => Algorithm::HS256,
            SigningAlgorithm::RS256 => Algorithm::RS256,
        }
    }
}

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type to allow callers to define their own token payload.
/// A handler built with [`JwtHandler::verifier`] holds only the verify key and can
/// decode but never sign, which is what a resource server needs.
pub struct JwtHandler {
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtHandler")
            .field("algorithm", &self.algorithm)
            .field("can_sign", &self.encoding_key.is_some())
            .finish()
    }
}

impl JwtHandler {
    /// Create a new HS256 JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: Some(EncodingKey::from_secret(secret)),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Create an RS256 handler from PEM encoded key material.
    ///
    /// # Arguments
    /// * `signing_pem` - RSA private key (PKCS#1 or PKCS#8)
    /// * `verify_pem` - Matching RSA public key
    ///
    /// # Errors
    /// * `InvalidKey` - Either key could not be parsed
    pub fn from_rsa_pem(signing_pem: &[u8], verify_pem: &[u8]) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(signing_pem)
            .map_err(|e| JwtError::InvalidKey(format!("Signing key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(verify_pem)
            .map_err(|e| JwtError::InvalidKey(format!("Verify key: {}", e)))?;

        Ok(Self {
            encoding_key: Some(encoding_key),
            decoding_key,
            algorithm: Algorithm::RS256,
        })
    }

    /// Build a handler from configuration values.
    ///
    /// For HS256 the signing key is the shared secret and `verify_key` is ignored.
    /// For RS256 both keys are PEM text.
    pub fn from_config(
        algorithm: SigningAlgorithm,
        signing_key: &str,
        verify_key: Option<&str>,
    ) -> Result<Self, JwtError> {
        match algorithm {
            SigningAlgorithm::HS256 => Ok(Self::new(signing_key.as_bytes())),
            SigningAlgorithm::RS256 => {
                let verify_key = verify_key.ok_or_else(|| {
                    JwtError::InvalidKey("RS256 requires a verify key".to_string())
                })?;
                Self::from_rsa_pem(signing_key.as_bytes(), verify_key.as_bytes())
            }
        }
    }

    /// Create a verify-only handler.
    ///
    /// # Arguments
    /// * `algorithm` - Algorithm tokens were signed with
    /// * `verify_key` - Shared secret (HS256) or PEM public key (RS256)
    ///
    /// # Errors
    /// * `InvalidKey` - Public key could not be parsed
    pub fn verifier(algorithm: SigningAlgorithm, verify_key: &[u8]) -> Result<Self, JwtError> {
        let decoding_key = match algorithm {
            SigningAlgorithm::HS256 => DecodingKey::from_secret(verify_key),
            SigningAlgorithm::RS256 => DecodingKey::from_rsa_pem(verify_key)
                .map_err(|e| JwtError::InvalidKey(format!("Verify key: {}", e)))?,
        };

        Ok(Self {
            encoding_key: None,
            decoding_key,
            algorithm: algorithm.into(),
        })
    }

    pub fn can_sign(&self) -> bool {
        self.encoding_key.is_some()
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `MissingSigningKey` - Handler is verify-only
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or(JwtError::MissingSigningKey)?;
        let header = Header::new(self.algorithm);

        encode(&header, claims, encoding_key).map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// The `exp` claim is required and checked with zero leeway.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not verify or algorithm was swapped
    /// * `TokenExpired` - Token has expired
    /// * `Malformed` - Token structure or claims could not be decoded
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;

        let token_data =
            decode::<T>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::Malformed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const SIGNING_PEM: &[u8] = include_bytes!("../../fixtures/signing.pem");
    const VERIFY_PEM: &[u8] = include_bytes!("../../fixtures/verify.pem");

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestClaims {
        sub: String,
        role: String,
        exp: i64,
    }

    fn claims(exp_offset: i64) -> TestClaims {
        TestClaims {
            sub: "user123".to_string(),
            role: "admin".to_string(),
            exp: Utc::now().timestamp() + exp_offset,
        }
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let claims = claims(60);

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded: TestClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let result = handler.decode::<TestClaims>("invalid.token.here");
        assert!(matches!(result, Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1.encode(&claims(60)).expect("Failed to encode token");

        let result = handler2.decode::<TestClaims>(&token);
        assert_eq!(result.unwrap_err(), JwtError::InvalidSignature);
    }

    #[test]
    fn test_decode_expired() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let token = handler.encode(&claims(-10)).expect("Failed to encode token");

        let result = handler.decode::<TestClaims>(&token);
        assert_eq!(result.unwrap_err(), JwtError::TokenExpired);
    }

    #[test]
    fn test_rsa_verifier_only_holds_public_key() {
        let signer = JwtHandler::from_rsa_pem(SIGNING_PEM, VERIFY_PEM).expect("Invalid keys");
        let verifier =
            JwtHandler::verifier(SigningAlgorithm::RS256, VERIFY_PEM).expect("Invalid key");

        assert!(signer.can_sign());
        assert!(!verifier.can_sign());

        let claims = claims(60);
        let token = signer.encode(&claims).expect("Failed to encode token");
        let decoded: TestClaims = verifier.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);

        assert_eq!(
            verifier.encode(&claims).unwrap_err(),
            JwtError::MissingSigningKey
        );
    }

    #[test]
    fn test_algorithm_swap_rejected() {
        // An HS256 token must not verify against an RS256 verifier
        let hs = JwtHandler::new(VERIFY_PEM);
        let verifier =
            JwtHandler::verifier(SigningAlgorithm::RS256, VERIFY_PEM).expect("Invalid key");

        let token = hs.encode(&claims(60)).expect("Failed to encode token");
        assert_eq!(
            verifier.decode::<TestClaims>(&token).unwrap_err(),
            JwtError::InvalidSignature
        );
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(
            "rs256".parse::<SigningAlgorithm>().unwrap(),
            SigningAlgorithm::RS256
        );
        assert!("none".parse::<SigningAlgorithm>().is_err());
    }
}
