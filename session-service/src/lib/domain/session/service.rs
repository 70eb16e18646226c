use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::ExtraInfo;
use auth::PasswordError;
use auth::TokenCodec;
use auth::TokenKind;
use chrono::Utc;

use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::RegisterCommand;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;
use crate::session::errors::AuthError;
use crate::session::models::Challenge;
use crate::session::models::ChallengeId;
use crate::session::models::LoginCommand;
use crate::session::models::LoginStage;
use crate::session::models::SessionClaim;
use crate::session::models::SessionId;
use crate::session::models::TokenPair;
use crate::session::ports::KeyValueCache;
use crate::session::ports::SessionServicePort;
use crate::session::registry::SessionRegistry;
use crate::session::verification::VerificationCodeCache;

/// Tunables for [`SessionService`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Lifetime of an issued verification code
    pub verification_ttl: Duration,
    /// Namespace for every key written to the shared store
    pub key_prefix: String,
    /// Reject refreshes for a session a newer login has replaced
    pub refresh_requires_current_session: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            verification_ttl: Duration::from_secs(120),
            key_prefix: "session-service:".to_string(),
            refresh_requires_current_session: true,
        }
    }
}

/// Domain service implementation for session operations.
///
/// Holds no per-request state; everything a login needs travels through the call
/// chain, and shared state lives in the injected store.
pub struct SessionService<AR, C>
where
    AR: AccountRepository,
    C: KeyValueCache,
{
    repository: Arc<AR>,
    codes: VerificationCodeCache<C>,
    registry: SessionRegistry<C>,
    codec: Arc<TokenCodec>,
    password_hasher: auth::PasswordHasher,
    refresh_requires_current_session: bool,
}

impl<AR, C> SessionService<AR, C>
where
    AR: AccountRepository,
    C: KeyValueCache,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store
    /// * `cache` - Shared store backing verification codes and the session registry
    /// * `codec` - Token issuing and parsing
    /// * `settings` - Code lifetime, key namespace and refresh policy
    pub fn new(
        repository: Arc<AR>,
        cache: Arc<C>,
        codec: Arc<TokenCodec>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            repository,
            codes: VerificationCodeCache::new(
                Arc::clone(&cache),
                settings.verification_ttl,
                settings.key_prefix.clone(),
            ),
            registry: SessionRegistry::new(cache, settings.key_prefix),
            codec,
            password_hasher: auth::PasswordHasher::new(),
            refresh_requires_current_session: settings.refresh_requires_current_session,
        }
    }

    /// Look up the account and check its password.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        // A name that could never have been registered cannot exist
        let username =
            Username::new(username.to_string()).map_err(|_| AuthError::UserNotFound)?;

        let account = self
            .repository
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        match self.password_hasher.check(password, &account.password_hash) {
            Ok(()) => Ok(account),
            Err(PasswordError::Mismatch) => Err(AuthError::BadCredentials),
            Err(e) => {
                tracing::error!(account_id = %account.id, error = %e, "Stored password hash unusable");
                Err(AuthError::AuthenticationError(
                    "Credential check failed".to_string(),
                ))
            }
        }
    }

    /// Mint the token pair for a new session.
    fn issue_pair(&self, account: &Account, session_id: SessionId) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.codec.ttl(TokenKind::Access))
            .ok_or_else(|| AuthError::AuthenticationError("Invalid access TTL".to_string()))?;
        let extra = ExtraInfo::new()
            .with("authenticated_at", now.timestamp_millis())
            .map_err(|e| AuthError::AuthenticationError(e.to_string()))?;

        let claim = SessionClaim {
            account_id: account.id,
            username: account.username.to_string(),
            roles: account.role_names(),
            session_id,
            issued_at: now,
            expires_at,
            extra,
        };

        let wire = self
            .codec
            .stamp(claim.to_wire(TokenKind::Access), TokenKind::Access, now);
        let access_token = self.codec.issue(wire, TokenKind::Access)?;
        let refresh_token = self.codec.derive_refresh(&access_token)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn access_ttl(&self) -> Result<Duration, AuthError> {
        self.codec
            .ttl(TokenKind::Access)
            .to_std()
            .map_err(|e| AuthError::AuthenticationError(format!("Invalid access TTL: {}", e)))
    }

    fn rejected(stage: LoginStage, username: &str, err: AuthError) -> AuthError {
        match &err {
            AuthError::AuthenticationError(_) => {
                tracing::error!(stage = %stage, username = %username, error = %err, "Login failed");
            }
            _ => {
                tracing::info!(stage = %stage, username = %username, error = %err, "Login rejected");
            }
        }
        err
    }
}

#[async_trait]
impl<AR, C> SessionServicePort for SessionService<AR, C>
where
    AR: AccountRepository,
    C: KeyValueCache,
{
    async fn issue_challenge(&self) -> Result<Challenge, AuthError> {
        self.codes.issue(&ChallengeId::new()).await
    }

    async fn login(&self, command: LoginCommand) -> Result<TokenPair, AuthError> {
        let LoginCommand {
            username,
            password,
            challenge_id,
            code,
        } = command;

        // Consumed before anything else, whatever the later outcome
        self.codes
            .consume_and_validate(&challenge_id, &code)
            .await
            .map_err(|e| Self::rejected(LoginStage::AwaitingCode, &username, e))?;

        let account = self
            .authenticate(&username, &password)
            .await
            .map_err(|e| Self::rejected(LoginStage::AwaitingCredentials, &username, e))?;

        let session_id = SessionId::new();
        let active = self
            .registry
            .check_before_login(&account.id, &session_id)
            .await
            .map_err(|e| Self::rejected(LoginStage::SessionGuard, &username, e.into()))?;
        if active {
            return Err(Self::rejected(
                LoginStage::SessionGuard,
                &username,
                AuthError::AlreadyLoggedIn,
            ));
        }

        let pair = self
            .issue_pair(&account, session_id)
            .map_err(|e| Self::rejected(LoginStage::Issuing, &username, e))?;

        let ttl = self
            .access_ttl()
            .map_err(|e| Self::rejected(LoginStage::Issuing, &username, e))?;
        self.registry
            .record_session(&account.id, &session_id, ttl)
            .await
            .map_err(|e| Self::rejected(LoginStage::Issuing, &username, e.into()))?;

        tracing::info!(
            account_id = %account.id,
            session_id = %session_id,
            "Session opened"
        );
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.codec.parse(refresh_token, TokenKind::Refresh)?;
        let claim = SessionClaim::try_from(claims.clone())?;

        if self.refresh_requires_current_session
            && self
                .registry
                .is_stale(&claim.account_id, &claim.session_id)
                .await?
        {
            tracing::info!(
                account_id = %claim.account_id,
                session_id = %claim.session_id,
                "Refresh rejected for superseded session"
            );
            return Err(AuthError::SessionSuperseded);
        }

        let access_token = self.codec.reissue_access(claims)?;

        tracing::debug!(
            account_id = %claim.account_id,
            session_id = %claim.session_id,
            "Access token refreshed"
        );
        Ok(access_token)
    }

    async fn register(&self, command: RegisterCommand) -> Result<Username, AuthError> {
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(AuthError::AccountExists);
        }

        let password_hash = self.password_hasher.hash(&command.password).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AuthError::AuthenticationError("Password hashing failed".to_string())
        })?;

        let account = Account {
            id: AccountId::new(),
            username: command.username,
            password_hash,
            roles: vec![command.role],
            created_at: Utc::now(),
        };

        let created = self.repository.create(account).await?;

        tracing::info!(account_id = %created.id, username = %created.username, "Account registered");
        Ok(created.username)
    }

    async fn authorize(&self, access_token: &str) -> Result<SessionClaim, AuthError> {
        let claims = self.codec.parse(access_token, TokenKind::Access)?;
        let claim = SessionClaim::try_from(claims)?;

        if self
            .registry
            .is_stale(&claim.account_id, &claim.session_id)
            .await?
        {
            return Err(AuthError::SessionSuperseded);
        }

        Ok(claim)
    }
}
