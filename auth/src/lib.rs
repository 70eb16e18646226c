//! Token and credential primitives for the session service
//!
//! Provides:
//! - Password hashing (Argon2id)
//! - JWT signing and verification (HS256 or RS256)
//! - An access/refresh token codec with separate keys and lifetimes per token class
//! - A verify-only access token checker for resource servers
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{PasswordError, PasswordHasher};
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.check("my_password", &hash).is_ok());
//! assert_eq!(hasher.check("other", &hash), Err(PasswordError::Mismatch));
//! ```
//!
//! ## Token Pair
//! ```
//! use auth::{JwtHandler, SessionClaims, TokenCodec, TokenKind, TokenPolicy};
//! use chrono::{Duration, Utc};
//!
//! let codec = TokenCodec::new(
//!     TokenPolicy::new(JwtHandler::new(b"access_key_at_least_32_bytes_long!"), Duration::minutes(15)),
//!     TokenPolicy::new(JwtHandler::new(b"refresh_key_at_least_32_bytes_long"), Duration::days(7)),
//! )
//! .unwrap();
//!
//! let now = Utc::now();
//! let claims = SessionClaims::new("42", "alice", vec![], "sid", TokenKind::Access, now, now);
//! let access = codec.issue(codec.stamp(claims, TokenKind::Access, now), TokenKind::Access).unwrap();
//! let refresh = codec.derive_refresh(&access).unwrap();
//!
//! let claims = codec.parse(&refresh, TokenKind::Refresh).unwrap();
//! assert_eq!(claims.sid, "sid");
//! ```

pub mod codec;
pub mod jwt;
pub mod password;
pub mod verifier;

// Re-export commonly used items
pub use codec::CodecError;
pub use codec::TokenCodec;
pub use codec::TokenPolicy;
pub use jwt::ExtraInfo;
pub use jwt::ExtraInfoError;
pub use jwt::ExtraValue;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use jwt::SigningAlgorithm;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use verifier::TokenVerifier;
