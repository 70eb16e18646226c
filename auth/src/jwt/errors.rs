use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Handler has no signing key")]
    MissingSigningKey,

    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

/// Error type for the bounded extra-info map carried in tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtraInfoError {
    #[error("Too many extra entries: maximum {max}")]
    TooManyEntries { max: usize },

    #[error("Extra key length must be between 1 and {max} characters, got {actual}")]
    InvalidKey { max: usize, actual: usize },
}
