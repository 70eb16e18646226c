use std::time::Duration;

use async_trait::async_trait;

use crate::account::models::RegisterCommand;
use crate::account::models::Username;
use crate::session::errors::AuthError;
use crate::session::errors::CacheError;
use crate::session::models::Challenge;
use crate::session::models::LoginCommand;
use crate::session::models::SessionClaim;
use crate::session::models::TokenPair;

/// Port for session operations exposed to inbound adapters.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Open a verification challenge for a new login context.
    ///
    /// # Errors
    /// * `AuthenticationError` - Shared store unavailable
    async fn issue_challenge(&self) -> Result<Challenge, AuthError>;

    /// Authenticate and open a session.
    ///
    /// # Returns
    /// Access and refresh token pair
    ///
    /// # Errors
    /// * `CodeExpired` / `CodeMismatch` - Verification answer rejected
    /// * `UserNotFound` / `BadCredentials` - Credential check rejected
    /// * `AlreadyLoggedIn` - Account has a current session
    /// * `AuthenticationError` - Backend failure
    async fn login(&self, command: LoginCommand) -> Result<TokenPair, AuthError>;

    /// Mint a new access token from a refresh token.
    ///
    /// # Errors
    /// * `InvalidSignature` / `Expired` / `Malformed` - Refresh token rejected
    /// * `SessionSuperseded` - A newer login replaced this session
    /// * `AuthenticationError` - Backend failure
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Create an account.
    ///
    /// # Errors
    /// * `AccountExists` - Username is already registered
    /// * `InvalidInput` - Selected role does not exist
    /// * `AuthenticationError` - Backend failure
    async fn register(&self, command: RegisterCommand) -> Result<Username, AuthError>;

    /// Check an access token presented to a protected resource.
    ///
    /// # Errors
    /// * `InvalidSignature` / `Expired` / `Malformed` - Access token rejected
    /// * `SessionSuperseded` - A newer login replaced this session
    /// * `AuthenticationError` - Backend failure
    async fn authorize(&self, access_token: &str) -> Result<SessionClaim, AuthError>;
}

/// Shared key-value store with per-entry expiry.
///
/// Every operation is atomic per key. An absent or expired key reads as `None`;
/// no call waits for a key to appear.
#[async_trait]
pub trait KeyValueCache: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value, replacing any previous one, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Fetch and delete in one step.
    async fn take(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// # Returns
    /// Whether a live entry was removed
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}
